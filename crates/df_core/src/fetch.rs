use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `url` and returns its body as text.
    ///
    /// Network failures, timeouts and non-success statuses are all errors.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
