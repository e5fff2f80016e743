use serde::{Deserialize, Serialize};
use crate::types::AnnouncementReference;
use crate::Result;

/// Named fields located on a detail page. Anything not found is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub title: Option<String>,
    /// Date text exactly as found on the page, not yet interpreted.
    pub published: Option<String>,
    pub canonical_url: Option<String>,
    pub summary: Option<String>,
}

/// Maps raw page content to structured data. Implementations hold all
/// site-specific markup knowledge so it can be tested against saved pages.
pub trait FieldExtractor: Send + Sync {
    /// Returns the name of the site profile
    fn name(&self) -> &str;

    /// Returns the announcement references on a listing page, deduplicated
    /// by URL in first-seen order.
    ///
    /// Fails with a parse error when the listing structure is missing; a
    /// listing with no announcements is not an error.
    fn extract_references(&self, page: &str, page_url: &str) -> Result<Vec<AnnouncementReference>>;

    /// Locates the fields of a detail page.
    fn extract_fields(&self, page: &str, page_url: &str) -> Result<ExtractedFields>;
}
