pub mod cli;
pub mod http;
pub mod manager;
pub mod scrapers;

pub use http::HttpFetcher;
pub use manager::{FeedManager, RunReport};
pub use scrapers::{get_extractor, SelectorExtractor, SelectorProfile};

pub use cli::{HumanDuration, ScraperArgs};
