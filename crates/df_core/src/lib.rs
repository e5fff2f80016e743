pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod types;

pub use config::{Config, FeedConfig};
pub use error::Error;
pub use extract::{ExtractedFields, FieldExtractor};
pub use fetch::PageFetcher;
pub use types::{
    order_newest_first, AnnouncementEntry, AnnouncementReference, DuplicateEntry, EntryOutcome,
    FeedDocument, FeedMetadata, PartitionedOutcomes, SkippedEntry,
};

pub type Result<T> = std::result::Result<T, Error>;
