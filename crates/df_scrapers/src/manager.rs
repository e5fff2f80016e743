use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use df_core::{
    AnnouncementEntry, AnnouncementReference, Config, DuplicateEntry, EntryOutcome, Error,
    FeedDocument, FeedMetadata, FieldExtractor, PageFetcher, PartitionedOutcomes, Result,
    SkippedEntry,
};
use df_feed::OutputTarget;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::scrapers::dates::parse_published;

const GENERATOR: &str = concat!("duyuru-feed ", env!("CARGO_PKG_VERSION"));

/// Outcome of one run: the document plus every entry left out of it.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub document: FeedDocument,
    pub listed: usize,
    pub skipped: Vec<SkippedEntry>,
    pub duplicates: Vec<DuplicateEntry>,
}

/// Runs the list → extract → build pipeline for one configuration.
pub struct FeedManager {
    config: Config,
    listing: Url,
    offset: FixedOffset,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn FieldExtractor>,
    semaphore: Arc<Semaphore>,
}

impl FeedManager {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            listing: Url::parse(&config.listing_url)?,
            offset: config.utc_offset()?,
            semaphore: Arc::new(Semaphore::new(config.concurrency)),
            config,
            fetcher,
            extractor,
        })
    }

    /// Fetches the listing page and returns at most `max_items` references.
    ///
    /// Any failure here is a listing failure: nothing can be built without it.
    pub async fn list_references(&self) -> Result<Vec<AnnouncementReference>> {
        let url = &self.config.listing_url;
        info!("📋 Fetching listing {}", url);

        let page = self
            .fetcher
            .fetch_page(url)
            .await
            .map_err(|e| Error::listing(url.as_str(), e))?;
        let mut references = self
            .extractor
            .extract_references(&page, url)
            .map_err(|e| Error::listing(url.as_str(), e))?;

        info!("🔗 Found {} announcement links", references.len());
        references.truncate(self.config.max_items);
        Ok(references)
    }

    /// Fetches one detail page and builds its entry.
    ///
    /// Only an unreachable page or a missing title fails; a missing date
    /// or summary just leaves that field empty.
    pub async fn extract_entry(&self, reference: &AnnouncementReference) -> Result<AnnouncementEntry> {
        let page = self.fetcher.fetch_page(&reference.url).await?;
        let fields = self.extractor.extract_fields(&page, &reference.url)?;

        let title = fields
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::parse(reference.url.as_str(), "no extractable title"))?;

        let published_at = fields
            .published
            .as_deref()
            .and_then(|raw| {
                let parsed = parse_published(raw, self.offset);
                if parsed.is_none() {
                    debug!("Unrecognised date {:?} on {}", raw, reference.url);
                }
                parsed
            });

        let url = match fields.canonical_url {
            Some(canonical) if self.is_usable_canonical(&canonical, &reference.url) => canonical,
            Some(canonical) => {
                debug!("Ignoring canonical {} on {}", canonical, reference.url);
                reference.url.clone()
            }
            None => reference.url.clone(),
        };

        Ok(AnnouncementEntry {
            title,
            url,
            published_at,
            summary: fields.summary.unwrap_or_default(),
        })
    }

    /// A canonical link replaces the listing URL only when it is on the same
    /// host and is neither the site root nor the listing page.
    fn is_usable_canonical(&self, canonical: &str, reference: &str) -> bool {
        let (Ok(canonical), Ok(reference)) = (Url::parse(canonical), Url::parse(reference)) else {
            return false;
        };
        let path = canonical.path().trim_end_matches('/');
        canonical.host_str() == reference.host_str()
            && !path.is_empty()
            && !(canonical.host_str() == self.listing.host_str()
                && path == self.listing.path().trim_end_matches('/'))
    }

    /// Extracts every reference, at most `concurrency` at a time.
    ///
    /// Failures become skips instead of errors. Whatever is still running
    /// at `deadline` is dropped and reported as skipped. The result is in
    /// reference order regardless of completion order.
    pub async fn collect_entries(
        &self,
        references: &[AnnouncementReference],
        deadline: Instant,
    ) -> Vec<EntryOutcome> {
        let futures = references.iter().map(|reference| {
            let semaphore = self.semaphore.clone();
            async move {
                let work = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| Error::Fetch {
                            url: reference.url.clone(),
                            reason: e.to_string(),
                        })?;
                    debug!("📰 Processing {}", reference.url);
                    self.extract_entry(reference).await
                };

                let reason = match timeout_at(deadline, work).await {
                    Ok(Ok(entry)) => {
                        return EntryOutcome::Extracted {
                            reference: reference.url.clone(),
                            entry,
                        }
                    }
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => "run budget exhausted before the page was processed".to_string(),
                };
                warn!("⏭️ Skipping {}: {}", reference.url, reason);
                EntryOutcome::Skipped(SkippedEntry {
                    url: reference.url.clone(),
                    reason,
                })
            }
        });

        join_all(futures).await
    }

    pub fn metadata(&self) -> FeedMetadata {
        FeedMetadata {
            title: self.config.feed.title.clone(),
            link: self.config.channel_link().to_string(),
            description: self.config.feed.description.clone(),
            language: self.config.feed.language.clone(),
            generator: Some(GENERATOR.to_string()),
        }
    }

    /// Runs the whole pipeline and returns the assembled document.
    pub async fn run(&self) -> Result<RunReport> {
        let deadline = Instant::now()
            .checked_add(self.config.run_budget())
            .ok_or_else(|| {
                Error::Config(format!("run budget too large: {}s", self.config.run_budget_secs))
            })?;

        let references = match timeout_at(deadline, self.list_references()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::listing(
                    self.config.listing_url.as_str(),
                    Error::Timeout {
                        url: self.config.listing_url.clone(),
                    },
                ))
            }
        };

        let outcomes = self.collect_entries(&references, deadline).await;
        let PartitionedOutcomes {
            entries,
            skipped,
            duplicates,
        } = EntryOutcome::partition(outcomes);
        for duplicate in &duplicates {
            warn!(
                "⏭️ Dropping {}: same link as an earlier entry ({})",
                duplicate.url, duplicate.duplicate_of
            );
        }
        let document = FeedDocument::new(self.metadata(), entries, Utc::now());

        Ok(RunReport {
            document,
            listed: references.len(),
            skipped,
            duplicates,
        })
    }

    /// Runs the pipeline and publishes the result. Nothing is written when
    /// the run fails.
    pub async fn run_and_publish(&self, target: &OutputTarget) -> Result<RunReport> {
        let report = self.run().await?;
        let bytes = df_feed::publish(&report.document, target)?;
        debug!("Published {} bytes", bytes);
        Ok(report)
    }
}
