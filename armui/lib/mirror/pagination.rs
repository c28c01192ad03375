use serde::{Deserialize, Serialize};

use crate::{ArmUiError, ArmUiResult};

use super::Job;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Page size used when the caller does not say.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Filters and page selection for the job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Jobs per page, 1 to [`MAX_PER_PAGE`].
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Exact status, ignoring case.
    #[serde(default)]
    pub status: Option<String>,

    /// Exact video type, ignoring case.
    #[serde(default)]
    pub video_type: Option<String>,

    /// Text contained in any of the title columns or the disc label, ignoring case.
    #[serde(default)]
    pub search: Option<String>,
}

/// One page of jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPage {
    /// Jobs on this page.
    pub jobs: Vec<Job>,

    /// Jobs matching the filters across all pages.
    pub total: u64,

    /// The page returned.
    pub page: u32,

    /// The page size used.
    pub per_page: u32,

    /// Number of pages, at least 1.
    pub pages: u64,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl JobQuery {
    /// Creates a query for `page` with `per_page` jobs and no filters.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            status: None,
            video_type: None,
            search: None,
        }
    }

    /// Rejects page numbers below 1 and page sizes outside 1 to [`MAX_PER_PAGE`].
    pub fn validate(&self) -> ArmUiResult<()> {
        if self.page < 1 {
            return Err(ArmUiError::InvalidArgument("page must be at least 1".into()));
        }

        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(ArmUiError::InvalidArgument(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        Ok(())
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// The status filter, if set and not blank.
    pub fn status_filter(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    /// The video type filter, if set and not blank.
    pub fn video_type_filter(&self) -> Option<&str> {
        non_blank(self.video_type.as_deref())
    }

    /// The search term, if set and not blank.
    pub fn search_filter(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

impl JobPage {
    /// Assembles a page from the rows and total returned for `query`.
    pub fn new(query: &JobQuery, jobs: Vec<Job>, total: u64) -> Self {
        Self {
            jobs,
            total,
            page: query.page,
            per_page: query.per_page,
            pages: page_count(total, query.per_page),
        }
    }

    /// An empty page for `query`.
    pub fn empty(query: &JobQuery) -> Self {
        Self::new(query, Vec::new(), 0)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Number of pages needed for `total` rows, never less than 1.
pub fn page_count(total: u64, per_page: u32) -> u64 {
    let per_page = u64::from(per_page.max(1));
    total.div_ceil(per_page).max(1)
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for JobQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(47, 10), 5);
        assert_eq!(page_count(50, 10), 5);
        assert_eq!(page_count(51, 10), 6);
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(0, 100), 1);
        assert_eq!(page_count(1, 1), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(JobQuery::new(3, 10).offset(), 20);
        assert_eq!(JobQuery::new(1, 25).offset(), 0);
    }

    #[test]
    fn test_validate() {
        assert!(JobQuery::new(1, 1).validate().is_ok());
        assert!(JobQuery::new(1, 100).validate().is_ok());
        assert!(JobQuery::new(0, 10).validate().is_err());
        assert!(JobQuery::new(1, 0).validate().is_err());
        assert!(JobQuery::new(1, 101).validate().is_err());
    }

    #[test]
    fn test_filters_ignore_blank_values() {
        let query = JobQuery {
            status: Some("  ".into()),
            search: Some(" matrix ".into()),
            ..Default::default()
        };
        assert_eq!(query.status_filter(), None);
        assert_eq!(query.video_type_filter(), None);
        assert_eq!(query.search_filter(), Some("matrix"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done"), r"100\%\_done");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_empty_page() {
        let page = JobPage::empty(&JobQuery::new(2, 10));
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 1);
        assert_eq!(page.page, 2);
        assert!(page.jobs.is_empty());
    }
}
