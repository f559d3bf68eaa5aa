//! Crawl coordinator - main crawl orchestration logic
//!
//! This module drives a crawl through its phases:
//! - Bootstrapping: fetch page 1 to learn the page count
//! - Fanning out: one worker per remaining page
//! - Collecting: fan-in under a per-await timeout
//! - Sorting: merge all batches and order them by id
//!
//! Only a bootstrap failure is fatal. A page that fails or times out
//! contributes no records and the crawl carries on.

use crate::comic::{sort_by_id, ComicRecord};
use crate::config::CrawlerConfig;
use crate::crawler::dimensions::{DimensionInspector, FileCommandInspector};
use crate::crawler::pipeline::PagePipeline;
use crate::crawler::transport::{ReqwestTransport, Transport};
use crate::state::CrawlPhase;
use crate::CrawlError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    pipeline: Arc<PagePipeline>,
    base_url: Url,
    timeout: Duration,
    max_concurrent_pages: Option<usize>,
}

/// What a page worker hands back to the coordinator
#[derive(Debug)]
enum PageOutcome {
    Completed { page: u32, records: Vec<ComicRecord> },
    Failed { page: u32, error: CrawlError },
    Cancelled { page: u32 },
}

/// Per-run counters, logged when the crawl finishes
#[derive(Debug, Default)]
struct CollectStats {
    completed: u32,
    failed: u32,
    timed_out: u32,
    aborted: u32,
}

impl Coordinator {
    /// Creates a coordinator using the real HTTP client and the `file` utility
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - The base URL or the HTTP client is invalid
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let transport = ReqwestTransport::from_config(config)?;
        Self::with_components(
            config,
            Arc::new(transport),
            Arc::new(FileCommandInspector::default()),
        )
    }

    /// Creates a coordinator with an injected transport and inspector
    pub fn with_components(
        config: &CrawlerConfig,
        transport: Arc<dyn Transport>,
        inspector: Arc<dyn DimensionInspector>,
    ) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&config.base_url)?;
        let pipeline = PagePipeline::new(transport, inspector, config.user_agent.clone());

        Ok(Self {
            pipeline: Arc::new(pipeline),
            base_url,
            timeout: config.timeout(),
            max_concurrent_pages: config.max_concurrent_pages.map(|n| n as usize),
        })
    }

    /// Returns the listing URL of the given page
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("p", &page.to_string());
        url
    }

    /// Crawls the whole archive
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ComicRecord>)` - All collected comics, ascending by id
    /// * `Err(CrawlError)` - Page 1 could not be fetched or has no pagination
    pub async fn crawl_all(&self) -> Result<Vec<ComicRecord>, CrawlError> {
        let start_time = Instant::now();
        let mut phase = CrawlPhase::Bootstrapping;
        tracing::debug!("Crawl phase: {}", phase);

        let first_url = self.page_url(1);
        let bootstrap = self.pipeline.run(first_url.as_str()).await.map_err(|e| {
            tracing::error!("Bootstrap fetch of {} failed: {}", first_url, e);
            e
        })?;

        let max_page_index = bootstrap.max_page_index;
        let mut comics = bootstrap.records;
        tracing::info!(
            "Page 1 lists {} comics, archive has {} pages",
            comics.len(),
            max_page_index
        );

        advance(&mut phase, CrawlPhase::FanningOut);
        let cancel = CancellationToken::new();
        let mut workers = self.spawn_workers(max_page_index, &cancel);

        advance(&mut phase, CrawlPhase::Collecting);
        let expected = max_page_index.saturating_sub(1);
        let mut stats = CollectStats::default();

        for slot in 1..=expected {
            match tokio::time::timeout(self.timeout, workers.join_next()).await {
                Ok(Some(Ok(outcome))) => merge_outcome(outcome, &mut comics, &mut stats),
                Ok(Some(Err(e))) => {
                    tracing::warn!("Page worker aborted: {}", e);
                    stats.aborted += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Timed out after {:?} waiting for page result {}/{}, skipping",
                        self.timeout,
                        slot,
                        expected
                    );
                    stats.timed_out += 1;
                }
            }
        }

        // Anything still running has lost its slot
        cancel.cancel();
        if !workers.is_empty() {
            tracing::debug!("Cancelling {} unfinished page workers", workers.len());
        }
        workers.shutdown().await;

        advance(&mut phase, CrawlPhase::Sorting);
        sort_by_id(&mut comics);

        advance(&mut phase, CrawlPhase::Done);
        tracing::info!(
            "Crawl completed: {} comics from {} of {} pages in {:?} ({} failed, {} timed out, {} aborted)",
            comics.len(),
            stats.completed + 1,
            max_page_index.max(1),
            start_time.elapsed(),
            stats.failed,
            stats.timed_out,
            stats.aborted
        );

        Ok(comics)
    }

    /// Launches one worker per page in `2..=max_page_index`
    fn spawn_workers(
        &self,
        max_page_index: u32,
        cancel: &CancellationToken,
    ) -> JoinSet<PageOutcome> {
        let permits = self
            .max_concurrent_pages
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let mut workers = JoinSet::new();

        for page in 2..=max_page_index {
            let url = self.page_url(page);
            let pipeline = Arc::clone(&self.pipeline);
            let permits = permits.clone();
            let token = cancel.child_token();

            workers.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => PageOutcome::Cancelled { page },
                    outcome = run_page(pipeline, permits, page, url) => outcome,
                }
            });
        }

        tracing::debug!("Launched {} page workers", workers.len());
        workers
    }
}

/// Fetches and extracts one page, waiting for a worker slot if the pool is
/// bounded
async fn run_page(
    pipeline: Arc<PagePipeline>,
    permits: Option<Arc<Semaphore>>,
    page: u32,
    url: Url,
) -> PageOutcome {
    let _permit = match permits {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => return PageOutcome::Cancelled { page },
        },
        None => None,
    };

    match pipeline.run(url.as_str()).await {
        Ok(extraction) => PageOutcome::Completed {
            page,
            records: extraction.records,
        },
        Err(error) => PageOutcome::Failed { page, error },
    }
}

/// Adds a worker's records to the result set
fn merge_outcome(outcome: PageOutcome, comics: &mut Vec<ComicRecord>, stats: &mut CollectStats) {
    match outcome {
        PageOutcome::Completed { page, records } => {
            tracing::debug!("Page {} contributed {} comics", page, records.len());
            comics.extend(records);
            stats.completed += 1;
        }
        PageOutcome::Failed { page, error } => {
            tracing::warn!("Page {} failed, skipping: {}", page, error);
            stats.failed += 1;
        }
        PageOutcome::Cancelled { page } => {
            tracing::warn!("Page {} was cancelled", page);
            stats.aborted += 1;
        }
    }
}

fn advance(phase: &mut CrawlPhase, next: CrawlPhase) {
    debug_assert!(
        phase.can_transition_to(next),
        "invalid crawl phase transition {} -> {}",
        phase,
        next
    );
    tracing::debug!("Crawl phase: {} -> {}", phase, next);
    *phase = next;
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use kaenguru_crawler::config::CrawlerConfig;
/// use kaenguru_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let comics = run_crawl(&CrawlerConfig::default()).await?;
/// println!("{} comics", comics.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &CrawlerConfig) -> Result<Vec<ComicRecord>, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.crawl_all().await
}
