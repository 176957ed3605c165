//! Listing, search and sort for packs.
//!
//! A listing runs in four steps:
//!
//! ```text
//! all packs ─► drop hidden ─► search + category filter ─► sort ─► start/limit page
//! ```
//!
//! Filtering happens before paging, so every page is full until the
//! results run out. Equal sort keys fall back to friendly id so pages stay
//! stable between requests.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::model::{Pack, PackSummary};

/// Default page size.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page a caller may request.
pub const MAX_LIMIT: usize = 100;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most downloads today first.
    Trending,
    /// Most downloads overall first.
    #[default]
    Downloads,
    /// Display name, A to Z.
    Alphabetically,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Trending => "trending",
            SortOrder::Downloads => "downloads",
            SortOrder::Alphabetically => "alphabetically",
        }
    }

    fn compare(&self, a: &Pack, b: &Pack) -> Ordering {
        let primary = match self {
            SortOrder::Trending => b
                .stats
                .downloads
                .today
                .cmp(&a.stats.downloads.today),
            SortOrder::Downloads => b
                .stats
                .downloads
                .total
                .cmp(&a.stats.downloads.total),
            SortOrder::Alphabetically => a
                .data
                .display
                .name
                .to_lowercase()
                .cmp(&b.data.display.name.to_lowercase()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(SortOrder::Trending),
            "downloads" => Ok(SortOrder::Downloads),
            "alphabetically" => Ok(SortOrder::Alphabetically),
            other => Err(CatalogError::BadRequest(format!(
                "Unknown sort '{}'; expected trending, downloads or alphabetically",
                other
            ))),
        }
    }
}

/// Parameters of a pack listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: SortOrder,
    pub limit: usize,
    pub start: usize,
    pub categories: Vec<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            start: 0,
            categories: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, start: usize, limit: usize) -> Self {
        self.start = start;
        self.limit = limit;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Build a query from raw query-string pairs.
    ///
    /// `category` may repeat. Unknown keys are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = ListQuery::default();
        for (key, value) in pairs {
            match key {
                "search" => query.search = Some(value.to_string()),
                "sort" => query.sort = value.parse()?,
                "limit" => query.limit = parse_number("limit", value)?,
                "start" => query.start = parse_number("start", value)?,
                "category" => query.categories.push(value.to_string()),
                _ => {}
            }
        }
        query.validate()?;
        Ok(query)
    }

    /// Check that the page size is within `1..=MAX_LIMIT`.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(CatalogError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(())
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a pack passes the visibility, search and category filters.
    pub fn matches(&self, pack: &Pack) -> bool {
        if !pack.is_listed() {
            return false;
        }
        if !pack.data.has_categories(&self.categories) {
            return false;
        }
        match self.search_term() {
            Some(term) => search_indices(pack).contains(&term),
            None => true,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, CatalogError> {
    value
        .parse()
        .map_err(|_| CatalogError::BadRequest(format!("{} must be a non-negative integer", key)))
}

/// Terms a search can match for a pack.
///
/// The lowercase friendly id, the lowercase display name, and each word of
/// the display name.
pub fn search_indices(pack: &Pack) -> Vec<String> {
    let name = pack.data.display.name.to_lowercase();
    let mut indices = vec![pack.id.to_lowercase(), name.clone()];
    for word in name.split_whitespace() {
        let word = word.to_string();
        if !indices.contains(&word) {
            indices.push(word);
        }
    }
    indices
}

/// Filter, sort and page `packs`.
pub fn list(packs: &[Pack], query: &ListQuery) -> Vec<PackSummary> {
    let mut matched: Vec<&Pack> = packs.iter().filter(|p| query.matches(p)).collect();
    matched.sort_by(|a, b| query.sort.compare(a, b));
    matched
        .into_iter()
        .skip(query.start)
        .take(query.limit)
        .map(Pack::summary)
        .collect()
}

/// Number of packs the query would list, ignoring paging.
pub fn count(packs: &[Pack], query: &ListQuery) -> usize {
    packs.iter().filter(|p| query.matches(p)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackData, UserId};
    use chrono::Utc;

    fn pack(id: &str, name: &str, total: u64, today: u64, categories: &[&str]) -> Pack {
        let mut data = PackData::new(id, name);
        data.categories = categories.iter().map(|c| c.to_string()).collect();
        let mut pack = Pack::new(
            format!("doc-{}", id),
            id,
            UserId::new("owner"),
            data,
            Utc::now(),
        );
        pack.stats.downloads.total = total;
        pack.stats.downloads.today = today;
        pack
    }

    fn catalog() -> Vec<Pack> {
        vec![
            pack("tcc", "The Creeper Collection", 500, 1, &["Extensive"]),
            pack("dpu", "Datapack Utilities", 900, 2, &["Utility", "Library"]),
            pack("lantern", "Lantern Load", 900, 9, &["Library"]),
            pack("zebra", "zebra mobs", 10, 50, &["Extensive", "Mobs"]),
        ]
    }

    fn ids(rows: &[PackSummary]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_downloads_with_id_tiebreak() {
        let rows = list(&catalog(), &ListQuery::default());
        assert_eq!(ids(&rows), vec!["dpu", "lantern", "tcc", "zebra"]);
    }

    #[test]
    fn test_trending_sort() {
        let rows = list(&catalog(), &ListQuery::default().with_sort(SortOrder::Trending));
        assert_eq!(ids(&rows), vec!["zebra", "lantern", "dpu", "tcc"]);
    }

    #[test]
    fn test_alphabetical_sort_ignores_case() {
        let query = ListQuery::default().with_sort(SortOrder::Alphabetically);
        let rows = list(&catalog(), &query);
        assert_eq!(ids(&rows), vec!["dpu", "lantern", "tcc", "zebra"]);
    }

    #[test]
    fn test_search_matches_id_name_and_words() {
        let packs = catalog();
        let by_id = list(&packs, &ListQuery::default().with_search("TCC"));
        assert_eq!(ids(&by_id), vec!["tcc"]);

        let by_word = list(&packs, &ListQuery::default().with_search("creeper"));
        assert_eq!(ids(&by_word), vec!["tcc"]);

        let by_name = list(&packs, &ListQuery::default().with_search("lantern load"));
        assert_eq!(ids(&by_name), vec!["lantern"]);

        let partial = list(&packs, &ListQuery::default().with_search("creep"));
        assert!(partial.is_empty());

        let blank = list(&packs, &ListQuery::default().with_search("  "));
        assert_eq!(blank.len(), 4);
    }

    #[test]
    fn test_category_filter_requires_every_category() {
        let packs = catalog();
        let query = ListQuery::default().with_category("Library");
        assert_eq!(ids(&list(&packs, &query)), vec!["dpu", "lantern"]);

        let query = ListQuery::default()
            .with_category("Library")
            .with_category("Utility");
        assert_eq!(ids(&list(&packs, &query)), vec!["dpu"]);
    }

    #[test]
    fn test_filter_runs_before_paging() {
        let packs = catalog();
        let query = ListQuery::default().with_category("Extensive").with_page(1, 1);
        assert_eq!(ids(&list(&packs, &query)), vec!["zebra"]);
        assert_eq!(count(&packs, &query), 2);
    }

    #[test]
    fn test_hidden_packs_are_not_listed() {
        let mut packs = catalog();
        packs[0].data.display.hidden = true;
        let rows = list(&packs, &ListQuery::default().with_search("tcc"));
        assert!(rows.is_empty());
        assert_eq!(count(&packs, &ListQuery::default()), 3);
    }

    #[test]
    fn test_from_pairs_parses_repeated_categories() {
        let query = ListQuery::from_pairs(vec![
            ("search", "tcc"),
            ("sort", "trending"),
            ("limit", "5"),
            ("start", "10"),
            ("category", "A"),
            ("category", "B"),
            ("token", "ignored"),
        ])
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("tcc"));
        assert_eq!(query.sort, SortOrder::Trending);
        assert_eq!(query.limit, 5);
        assert_eq!(query.start, 10);
        assert_eq!(query.categories, vec!["A", "B"]);
    }

    #[test]
    fn test_from_pairs_rejects_bad_values() {
        assert!(ListQuery::from_pairs(vec![("limit", "0")]).is_err());
        assert!(ListQuery::from_pairs(vec![("limit", "101")]).is_err());
        assert!(ListQuery::from_pairs(vec![("limit", "100")]).is_ok());
        assert!(ListQuery::from_pairs(vec![("start", "-1")]).is_err());
        assert!(ListQuery::from_pairs(vec![("sort", "newest")]).is_err());
    }
}
