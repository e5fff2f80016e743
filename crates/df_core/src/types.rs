use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A title and link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementReference {
    pub title: String,
    pub url: String,
}

/// One announcement ready for feed inclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementEntry {
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub url: String,
    pub reason: String,
}

/// An extracted entry dropped because an earlier one has the same link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    /// Listing URL of the dropped entry.
    pub url: String,
    /// Link shared with the entry that was kept.
    pub duplicate_of: String,
}

/// What happened to a single reference once its detail page was processed.
#[derive(Debug, Clone)]
pub enum EntryOutcome {
    Extracted {
        /// URL the entry was listed under, before any canonical link.
        reference: String,
        entry: AnnouncementEntry,
    },
    Skipped(SkippedEntry),
}

/// Outcomes sorted into what goes in the feed and what does not.
#[derive(Debug, Clone, Default)]
pub struct PartitionedOutcomes {
    pub entries: Vec<AnnouncementEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub duplicates: Vec<DuplicateEntry>,
}

impl EntryOutcome {
    /// Splits outcomes into kept entries, skips and duplicates. An entry
    /// whose link was already seen is a duplicate. Input order is preserved.
    pub fn partition(outcomes: Vec<EntryOutcome>) -> PartitionedOutcomes {
        let mut seen = std::collections::HashSet::new();
        let mut result = PartitionedOutcomes::default();

        for outcome in outcomes {
            match outcome {
                EntryOutcome::Extracted { reference, entry } => {
                    if seen.insert(entry.url.clone()) {
                        result.entries.push(entry);
                    } else {
                        result.duplicates.push(DuplicateEntry {
                            url: reference,
                            duplicate_of: entry.url,
                        });
                    }
                }
                EntryOutcome::Skipped(skip) => result.skipped.push(skip),
            }
        }

        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetadata {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: Option<String>,
    pub generator: Option<String>,
}

/// The feed for one run: metadata plus entries ordered newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub metadata: FeedMetadata,
    pub built_at: DateTime<Utc>,
    entries: Vec<AnnouncementEntry>,
}

impl FeedDocument {
    pub fn new(
        metadata: FeedMetadata,
        mut entries: Vec<AnnouncementEntry>,
        built_at: DateTime<Utc>,
    ) -> Self {
        order_newest_first(&mut entries);
        Self {
            metadata,
            built_at,
            entries,
        }
    }

    pub fn entries(&self) -> &[AnnouncementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dated entries first, newest to oldest, then undated ones. The sort is
/// stable so ties and undated entries keep listing order.
pub fn order_newest_first(entries: &mut [AnnouncementEntry]) {
    entries.sort_by(|a, b| match (&a.published_at, &b.published_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
