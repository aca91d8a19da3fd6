//! Full-text search over an index.

use serde::Serialize;

use crate::index::Index;
use crate::item::Item;
use crate::route::Route;

/// A single search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Route of the matching item.
    pub route: Route,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
    /// Relevance score (higher is better).
    pub score: u32,
}

/// Full-text query over an index snapshot.
pub trait Searcher: Send + Sync {
    /// Return at most `limit` hits for `query`, best first.
    fn search(&self, index: &Index, query: &str, limit: usize) -> Vec<SearchHit>;
}

const TITLE_WEIGHT: u32 = 8;
const TAG_WEIGHT: u32 = 5;
const DESCRIPTION_WEIGHT: u32 = 3;
/// Body matches count once per occurrence, up to this many.
const BODY_HIT_CAP: u32 = 10;

/// Case-insensitive keyword search.
///
/// Every query term must match somewhere in the item (title, tags,
/// description or body). Ties are broken by route.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSearcher;

impl KeywordSearcher {
    fn score(item: &Item, terms: &[String]) -> Option<u32> {
        let title = item.title.to_lowercase();
        let description = item.description.to_lowercase();
        let body = item.body.to_lowercase();

        let mut total = 0;
        for term in terms {
            let mut score = 0;
            if title.contains(term.as_str()) {
                score += TITLE_WEIGHT;
            }
            if item.meta.tags.iter().any(|t| t.name() == term) {
                score += TAG_WEIGHT;
            }
            if description.contains(term.as_str()) {
                score += DESCRIPTION_WEIGHT;
            }
            let body_hits = body.matches(term.as_str()).take(BODY_HIT_CAP as usize).count();
            score += u32::try_from(body_hits).unwrap_or(BODY_HIT_CAP);

            if score == 0 {
                return None;
            }
            total += score;
        }
        Some(total)
    }
}

impl Searcher for KeywordSearcher {
    fn search(&self, index: &Index, query: &str, limit: usize) -> Vec<SearchHit> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = index
            .items()
            .into_iter()
            .filter_map(|item| {
                Self::score(item, &terms).map(|score| SearchHit {
                    route: item.route.clone(),
                    title: item.title.clone(),
                    description: item.description.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.route.cmp(&b.route)));
        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::item::{ItemType, MetaData};
    use crate::tag::Tag;

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    fn index() -> Index {
        let tagged = MetaData {
            tags: [Tag::new("tokio").unwrap()].into_iter().collect(),
            ..MetaData::default()
        };
        let root = Item::new(Route::root(), "Home", ItemType::Repository)
            .with_child(
                Item::new(route("async"), "Async Rust", ItemType::Document)
                    .with_body("Futures and executors.")
                    .with_meta(tagged),
            )
            .with_child(
                Item::new(route("intro"), "Introduction", ItemType::Document)
                    .with_description("Getting started with Rust")
                    .with_body("rust rust rust"),
            );
        Index::new(root)
    }

    fn routes(hits: &[SearchHit]) -> Vec<String> {
        hits.iter().map(|h| h.route.value()).collect()
    }

    #[test]
    fn test_title_match_ranks_first() {
        let hits = KeywordSearcher.search(&index(), "Rust", 10);

        assert_eq!(routes(&hits), vec!["async", "intro"]);
        assert_eq!(hits[0].score, TITLE_WEIGHT);
        assert_eq!(hits[1].score, DESCRIPTION_WEIGHT + 3);
    }

    #[test]
    fn test_all_terms_must_match() {
        let hits = KeywordSearcher.search(&index(), "rust futures", 10);

        assert_eq!(routes(&hits), vec!["async"]);
    }

    #[test]
    fn test_tag_match() {
        let hits = KeywordSearcher.search(&index(), "tokio", 10);

        assert_eq!(routes(&hits), vec!["async"]);
        assert_eq!(hits[0].score, TAG_WEIGHT);
    }

    #[test]
    fn test_limit_and_empty_query() {
        assert_eq!(KeywordSearcher.search(&index(), "rust", 1).len(), 1);
        assert!(KeywordSearcher.search(&index(), "   ", 10).is_empty());
        assert!(KeywordSearcher.search(&index(), "missing", 10).is_empty());
    }
}
