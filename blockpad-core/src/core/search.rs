//! Full-text search over page titles and block content.
//!
//! There is no index: every query scans every page. Content matches are
//! ranked by a [`RelevanceScorer`]; [`HeuristicScorer`] is the default.

use crate::core::block::{search_in_block, Block, BlockType};
use crate::core::editor::{Key, KeyEvent};
use crate::core::page::Page;
use chrono::{DateTime, Utc};
use log::debug;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Characters of matched block text carried in a result before truncation.
pub const SNIPPET_CHARS: usize = 150;

/// Maximum number of entries returned by [`SearchEngine::suggestions`].
pub const MAX_SUGGESTIONS: usize = 5;

/// Score of a title match starting at the first character.
pub const TITLE_PREFIX_SCORE: u8 = 100;

/// Score of a title match anywhere else in the title.
pub const TITLE_MATCH_SCORE: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Title,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub page_id: String,
    pub page_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_content: Option<String>,
    pub match_type: MatchType,
    /// Relevance in `0..=100`.
    pub score: u8,
}

impl SearchResult {
    fn dedup_key(&self) -> (String, String) {
        (
            self.page_id.clone(),
            self.block_id.clone().unwrap_or_else(|| "title".to_string()),
        )
    }
}

/// Ranks how well a piece of text matches a query.
pub trait RelevanceScorer {
    /// Returns a score in `0..=100`.
    fn score(&self, content: &str, query: &str) -> u8;
}

/// Phrase and word overlap heuristic.
///
/// +50 when the text contains the query, +30 more when it starts with it.
/// Then, for every (query word, text word) pair, +10 when the text word
/// contains the query word and +10 more when they are equal. Text words are
/// split on single spaces only, so line breaks stay inside a word. Capped at 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl RelevanceScorer for HeuristicScorer {
    fn score(&self, content: &str, query: &str) -> u8 {
        let content = content.to_lowercase();
        let query = query.to_lowercase();
        let mut score: u32 = 0;

        if let Some(pos) = content.find(&query) {
            score += 50;
            if pos == 0 {
                score += 30;
            }
        }

        for word in query.split_whitespace() {
            for content_word in content.split(' ') {
                if content_word.contains(word) {
                    score += 10;
                    if content_word == word {
                        score += 10;
                    }
                }
            }
            if score >= 100 {
                break;
            }
        }

        score.min(100) as u8
    }
}

/// Page-level filters applied before [`SearchEngine::search_with_filters`] matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Keep pages carrying at least one of these tags. Empty keeps all.
    pub tags: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub favorites_only: bool,
}

impl SearchFilters {
    pub fn accepts(&self, page: &Page) -> bool {
        if self.favorites_only && !page.properties.is_favorite {
            return false;
        }
        if !self.tags.is_empty() && !page.properties.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if self.created_after.is_some_and(|start| page.created_at < start) {
            return false;
        }
        if self.created_before.is_some_and(|end| page.created_at > end) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchEngine<S = HeuristicScorer> {
    scorer: S,
}

impl SearchEngine<HeuristicScorer> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: RelevanceScorer> SearchEngine<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Searches titles and block content of `pages`.
    ///
    /// Title matches score 100 at the start of the title and 90 elsewhere.
    /// Results are deduplicated per (page, block) and sorted by descending
    /// score, keeping scan order among equal scores.
    pub fn search(&self, pages: &[Page], query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let term = query.to_lowercase();
        let results = pages
            .iter()
            .flat_map(|page| {
                let title = page.title.to_lowercase().find(&term).map(|pos| {
                    let score = if pos == 0 {
                        TITLE_PREFIX_SCORE
                    } else {
                        TITLE_MATCH_SCORE
                    };
                    title_result(page, score)
                });
                title.into_iter().chain(self.content_results(page, &term))
            })
            .collect();
        rank(results)
    }

    /// Like [`search`](Self::search), restricted to pages accepted by
    /// `filters`, with title matches ranked by the scorer.
    pub fn search_with_filters(
        &self,
        pages: &[Page],
        query: &str,
        filters: &SearchFilters,
    ) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let term = query.to_lowercase();
        let results = pages
            .iter()
            .filter(|page| filters.accepts(page))
            .flat_map(|page| {
                let title = page
                    .title
                    .to_lowercase()
                    .contains(&term)
                    .then(|| title_result(page, self.scorer.score(&page.title, &term)));
                title.into_iter().chain(self.content_results(page, &term))
            })
            .collect();
        rank(results)
    }

    fn content_results<'a>(
        &'a self,
        page: &'a Page,
        term: &'a str,
    ) -> impl Iterator<Item = SearchResult> + 'a {
        page.blocks
            .iter()
            .filter(move |block| search_in_block(block, term))
            .map(move |block| {
                let text = matched_text(block);
                SearchResult {
                    page_id: page.id.clone(),
                    page_title: page.title.clone(),
                    block_id: Some(block.id.clone()),
                    block_content: Some(snippet(&text)),
                    match_type: MatchType::Content,
                    score: self.scorer.score(&text, term),
                }
            })
    }

    /// Up to five distinct page titles and tags containing `partial`.
    pub fn suggestions(&self, pages: &[Page], partial: &str) -> Vec<String> {
        if partial.trim().is_empty() {
            return Vec::new();
        }
        let term = partial.to_lowercase();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        let candidates = pages.iter().flat_map(|page| {
            std::iter::once(&page.title).chain(page.properties.tags.iter())
        });
        for candidate in candidates {
            if candidate.to_lowercase().contains(&term) && seen.insert(candidate.as_str()) {
                out.push(candidate.clone());
                if out.len() == MAX_SUGGESTIONS {
                    break;
                }
            }
        }
        out
    }
}

fn title_result(page: &Page, score: u8) -> SearchResult {
    SearchResult {
        page_id: page.id.clone(),
        page_title: page.title.clone(),
        block_id: None,
        block_content: None,
        match_type: MatchType::Title,
        score,
    }
}

/// Text a content match is scored and previewed on.
fn matched_text(block: &Block) -> String {
    if !block.content.is_empty() {
        return block.content.clone();
    }
    if block.block_type.is_list() {
        let joined = block
            .list_items()
            .iter()
            .map(|item| item.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }
    }
    if block.block_type == BlockType::Image {
        return block.properties.image_alt.clone().unwrap_or_default();
    }
    String::new()
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn rank(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut unique: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect();
    // Stable: equal scores keep scan order.
    unique.sort_by(|a, b| b.score.cmp(&a.score));
    unique
}

/// Results of one page, as shown under a page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGroup {
    pub page_id: String,
    pub page_title: String,
    pub results: Vec<SearchResult>,
}

impl SearchGroup {
    pub fn header(&self) -> String {
        match self.results.len() {
            1 => "1 match".to_string(),
            n => format!("{n} matches"),
        }
    }
}

/// Groups ranked results by page, pages in order of their best result.
pub fn group_by_page(results: &[SearchResult]) -> Vec<SearchGroup> {
    let mut groups: Vec<SearchGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for result in results {
        let slot = *index.entry(result.page_id.as_str()).or_insert_with(|| {
            groups.push(SearchGroup {
                page_id: result.page_id.clone(),
                page_title: result.page_title.clone(),
                results: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].results.push(result.clone());
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    pub text: String,
    pub is_match: bool,
}

impl HighlightSpan {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: false,
        }
    }
}

/// Splits `text` into plain and matched spans, matching `query` literally
/// and case-insensitively.
///
/// Empty spans are omitted, so spans do not strictly alternate: a leading
/// match comes first and back-to-back matches are adjacent. Render by
/// [`HighlightSpan::is_match`], not by position.
pub fn highlight(text: &str, query: &str) -> Vec<HighlightSpan> {
    if query.trim().is_empty() {
        return vec![HighlightSpan::plain(text)];
    }
    let re = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            debug!("Highlight pattern rejected: {e}");
            return vec![HighlightSpan::plain(text)];
        }
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            spans.push(HighlightSpan::plain(&text[last..m.start()]));
        }
        spans.push(HighlightSpan {
            text: m.as_str().to_string(),
            is_match: true,
        });
        last = m.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(HighlightSpan::plain(&text[last..]));
    }
    spans
}

/// Open/closed state and query of the search panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub is_open: bool,
}

impl SearchState {
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Closing also clears the query.
    pub fn close(&mut self) {
        self.is_open = false;
        self.query.clear();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Modifier+`/` opens search; Escape closes an open search.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if event.has_modifier() && event.key == Key::Char('/') {
            self.open();
            return true;
        }
        if event.key == Key::Escape && self.is_open {
            self.close();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::{create_empty_block, create_image_block, create_list_block};
    use chrono::Duration;

    fn page(title: &str, blocks: Vec<Block>) -> Page {
        let mut page = Page::new(title, None);
        page.blocks = blocks;
        page
    }

    fn text(content: &str) -> Block {
        Block {
            content: content.to_string(),
            ..create_empty_block(BlockType::Paragraph)
        }
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let pages = vec![page("Anything", vec![text("at all")])];
        let engine = SearchEngine::new();
        assert!(engine.search(&pages, "").is_empty());
        assert!(engine.search(&pages, "   ").is_empty());
    }

    #[test]
    fn test_title_scores() {
        let pages = vec![
            page("Planning notes", vec![text("")]),
            page("Q4 Planning", vec![text("")]),
        ];
        let results = SearchEngine::new().search(&pages, "planning");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page_title, "Planning notes");
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1].page_title, "Q4 Planning");
        assert_eq!(results[1].score, 90);
        assert!(results.iter().all(|r| r.match_type == MatchType::Title));
    }

    #[test]
    fn test_list_item_content_match() {
        let list = create_list_block(BlockType::BulletList, ["Reduce onboarding time"]);
        let block_id = list.id.clone();
        let pages = vec![page("Q4 Planning", vec![list])];

        let results = SearchEngine::new().search(&pages, "onboarding");
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.match_type, MatchType::Content);
        assert_eq!(result.block_id.as_deref(), Some(block_id.as_str()));
        assert!(result.block_content.as_deref().unwrap().contains("onboarding"));
        assert!(result.score >= 50);
    }

    #[test]
    fn test_title_and_content_both_reported() {
        let pages = vec![page("Roadmap", vec![text("roadmap review")])];
        let results = SearchEngine::new().search(&pages, "roadmap");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].match_type, MatchType::Title);
        assert_eq!(results[1].match_type, MatchType::Content);
    }

    #[test]
    fn test_image_alt_match() {
        let pages = vec![page("Gallery", vec![create_image_block("cat.png", "A sleepy cat")])];
        let results = SearchEngine::new().search(&pages, "sleepy");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].block_content.as_deref(), Some("A sleepy cat"));
    }

    #[test]
    fn test_heuristic_scorer() {
        let scorer = HeuristicScorer;
        // Prefix phrase (80) + exact word (20).
        assert_eq!(scorer.score("design review", "design"), 100);
        // Mid-text phrase (50) + exact word (20).
        assert_eq!(scorer.score("the design", "design"), 70);
        // Word overlap only.
        assert_eq!(scorer.score("designer", "sign"), 60);
        assert_eq!(scorer.score("alpha beta", "gamma"), 0);
        assert_eq!(scorer.score("a a a a a a a", "a"), 100);
    }

    #[test]
    fn test_heuristic_scorer_keeps_line_breaks_inside_words() {
        let scorer = HeuristicScorer;
        // Phrase (50) + "foo\nbar" contains "bar" (10), never an exact word.
        assert_eq!(scorer.score("foo\nbar", "bar"), 60);
        assert_eq!(scorer.score("fn main() {\n\tlet x = 1;\n}", "x"), 70);
        // Repeated query spaces do not produce empty words.
        assert_eq!(scorer.score("alpha beta", "  gamma  "), 0);
    }

    #[test]
    fn test_sort_is_stable_for_equal_scores() {
        let first = text("x marks");
        let second = text("x marks");
        let (a, b) = (first.id.clone(), second.id.clone());
        let pages = vec![page("Map", vec![first, second])];
        let results = SearchEngine::new().search(&pages, "marks");
        assert_eq!(results[0].block_id.as_deref(), Some(a.as_str()));
        assert_eq!(results[1].block_id.as_deref(), Some(b.as_str()));
    }

    #[test]
    fn test_long_content_is_truncated() {
        let long = format!("needle {}", "é".repeat(200));
        let pages = vec![page("Long", vec![text(&long)])];
        let results = SearchEngine::new().search(&pages, "needle");
        let preview = results[0].block_content.as_deref().unwrap();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), SNIPPET_CHARS + 3);
    }

    struct Flat;

    impl RelevanceScorer for Flat {
        fn score(&self, _content: &str, _query: &str) -> u8 {
            42
        }
    }

    #[test]
    fn test_custom_scorer() {
        let pages = vec![page("Notes", vec![text("notes here")])];
        let engine = SearchEngine::with_scorer(Flat);
        let results = engine.search(&pages, "notes");
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1].score, 42);

        let filtered = engine.search_with_filters(&pages, "notes", &SearchFilters::default());
        assert!(filtered.iter().all(|r| r.score == 42));
    }

    #[test]
    fn test_search_with_filters() {
        let mut tagged = page("Sprint notes", vec![text("sprint goals")]);
        tagged.properties.tags = vec!["work".to_string()];
        tagged.properties.is_favorite = true;
        let mut old = page("Old sprint", vec![text("")]);
        old.created_at = Utc::now() - Duration::days(30);
        let pages = vec![tagged.clone(), old.clone()];
        let engine = SearchEngine::new();

        let by_tag = SearchFilters {
            tags: vec!["work".to_string()],
            ..SearchFilters::default()
        };
        let results = engine.search_with_filters(&pages, "sprint", &by_tag);
        assert!(results.iter().all(|r| r.page_id == tagged.id));
        assert_eq!(results.len(), 2);

        let favorites = SearchFilters {
            favorites_only: true,
            ..SearchFilters::default()
        };
        assert!(engine
            .search_with_filters(&pages, "old", &favorites)
            .is_empty());

        let recent = SearchFilters {
            created_after: Some(Utc::now() - Duration::days(7)),
            ..SearchFilters::default()
        };
        let results = engine.search_with_filters(&pages, "sprint", &recent);
        assert!(results.iter().all(|r| r.page_id != old.id));

        let before = SearchFilters {
            created_before: Some(Utc::now() - Duration::days(7)),
            ..SearchFilters::default()
        };
        let results = engine.search_with_filters(&pages, "sprint", &before);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].page_id, old.id);
    }

    #[test]
    fn test_suggestions() {
        let mut a = page("Design doc", vec![]);
        a.properties.tags = vec!["design".to_string(), "docs".to_string()];
        let b = page("Design doc", vec![]);
        let pages = vec![a, b];
        let engine = SearchEngine::new();

        assert_eq!(
            engine.suggestions(&pages, "des"),
            vec!["Design doc".to_string(), "design".to_string()]
        );
        assert!(engine.suggestions(&pages, " ").is_empty());

        let many: Vec<Page> = (0..8).map(|i| page(&format!("Note {i}"), vec![])).collect();
        assert_eq!(engine.suggestions(&many, "note").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_group_by_page() {
        let pages = vec![
            page("Alpha", vec![text("alpha one"), text("alpha two")]),
            page("Beta", vec![text("alpha three")]),
        ];
        let results = SearchEngine::new().search(&pages, "alpha");
        let groups = group_by_page(&results);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].page_title, "Alpha");
        assert_eq!(groups[0].header(), "3 matches");
        assert_eq!(groups[1].header(), "1 match");
        let total: usize = groups.iter().map(|g| g.results.len()).sum();
        assert_eq!(total, results.len());
    }

    #[test]
    fn test_highlight() {
        let spans = highlight("Plan the plan (v2)", "plan");
        let rendered: Vec<(&str, bool)> = spans.iter().map(|s| (s.text.as_str(), s.is_match)).collect();
        assert_eq!(
            rendered,
            vec![("Plan", true), (" the ", false), ("plan", true), (" (v2)", false)]
        );

        let spans = highlight("cost (v2) total", "(v2)");
        assert_eq!(spans[1].text, "(v2)");
        assert!(spans[1].is_match);

        assert_eq!(highlight("whole", ""), vec![HighlightSpan::plain("whole")]);
        assert_eq!(highlight("whole", "zzz"), vec![HighlightSpan::plain("whole")]);

        let adjacent = highlight("aab", "a");
        let flags: Vec<bool> = adjacent.iter().map(|s| s.is_match).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_search_state_keys() {
        let mut state = SearchState::default();
        assert!(!state.handle_key(&KeyEvent::new(Key::Escape)));
        assert!(state.handle_key(&KeyEvent::with_modifier(Key::Char('/'))));
        assert!(state.is_open);
        state.set_query("plan");
        assert!(state.handle_key(&KeyEvent::new(Key::Escape)));
        assert!(!state.is_open);
        assert!(state.query.is_empty());
    }
}
