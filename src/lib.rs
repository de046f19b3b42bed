use scraper::Html;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub mod config;
pub mod fetch;
pub mod skiresort;

mod error;
mod utils;

pub use config::Config;
pub use error::CrawlerError;
pub use fetch::HttpFetcher;

use skiresort::{
    assemble, last_page_number, listing_entries, page_url, test_result_page_url,
    trail_map_page_url, DetailPage, ListingEntry, ResortParts, ResortRecord,
};

/// Fetches one page. Any failure (network error, bad status, non-HTML body)
/// comes back as `None` and never as an error.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Records collected during one run, in the order they were scraped.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    records: Vec<ResortRecord>,
    skipped: usize,
}

impl RunAccumulator {
    pub fn push(&mut self, record: ResortRecord) {
        self.records.push(record);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn records(&self) -> &[ResortRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub records: usize,
    pub skipped: usize,
    pub output_path: PathBuf,
}

fn parse(content: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(content))
}

/// Scrapes the listing pages until `shutdown` resolves or the configured
/// page/resort limits are reached, then writes whatever was collected.
///
/// A resort still being fetched when `shutdown` fires is dropped, never
/// written half-done.
pub async fn run_scrapper<F, S>(
    config: &Config,
    fetcher: &F,
    shutdown: S,
) -> Result<RunSummary, CrawlerError>
where
    F: Fetcher + ?Sized,
    S: Future<Output = ()>,
{
    let mut accumulator = RunAccumulator::default();

    let outcome = {
        let walk = walk(config, fetcher, &mut accumulator);
        tokio::select! {
            () = walk => RunOutcome::Completed,
            () = shutdown => RunOutcome::Interrupted,
        }
    };

    if accumulator.is_empty() {
        warn!("No resorts scraped, writing an empty dataset");
    }
    match outcome {
        RunOutcome::Completed => info!(
            "Data scraping completed. Total resorts scraped: {}",
            accumulator.len()
        ),
        RunOutcome::Interrupted => warn!(
            "Scraping interrupted. Saving {} resorts",
            accumulator.len()
        ),
    }

    skiresort::sink_for(&config.output_path)
        .write(accumulator.records(), &config.output_path)?;
    info!("Data saved to {}", config.output_path.display());

    Ok(RunSummary {
        outcome,
        records: accumulator.len(),
        skipped: accumulator.skipped(),
        output_path: config.output_path.clone(),
    })
}

async fn walk<F>(config: &Config, fetcher: &F, accumulator: &mut RunAccumulator)
where
    F: Fetcher + ?Sized,
{
    let mut attempted = 0;
    let mut last_page = config.max_pages;
    let mut page = 1;

    while page <= last_page && attempted < config.max_resorts {
        let listing_url = page_url(&config.start_url, page);
        info!("Scraping page {} of {}", page, last_page);

        let (entries, detected) = match fetcher.fetch(&listing_url).await {
            Some(content) => {
                let doc = parse(&content);
                (
                    listing_entries(&doc, &config.site_origin),
                    last_page_number(&doc),
                )
            }
            None => {
                warn!("Skip listing page {}", listing_url);
                page += 1;
                continue;
            }
        };
        // The page browser may only show a window of pages, so every listing
        // page can move the end of the walk, within `max_pages`.
        if let Some(detected) = detected {
            last_page = config.max_pages.min(detected.max(page));
        }
        debug!("{} resorts listed on {}", entries.len(), listing_url);

        for entry in entries {
            if attempted >= config.max_resorts {
                break;
            }
            attempted += 1;
            info!("[{}] Processing resort {}", attempted, entry.url);

            match scrape_resort(config, fetcher, entry).await {
                Some(record) => {
                    info!("[{}] Insert Result {}", accumulator.len() + 1, record.url);
                    debug!("\n{}", record);
                    accumulator.push(record);
                }
                None => accumulator.skip(),
            }
        }

        page += 1;
    }
}

/// Detail page first, then its trail map and test result pages. `None` when
/// the detail page itself is unusable.
async fn scrape_resort<F>(config: &Config, fetcher: &F, entry: ListingEntry) -> Option<ResortRecord>
where
    F: Fetcher + ?Sized,
{
    let origin = config.site_origin.as_str();

    let Some(content) = fetcher.fetch(&entry.url).await else {
        warn!("Skip resort {}: detail page unavailable", entry.url);
        return None;
    };
    let Some(detail) = DetailPage::extract(&parse(&content), &entry.url, origin) else {
        warn!("Skip resort {}: no resort id in url", entry.url);
        return None;
    };

    let trail_map_url = fetcher
        .fetch(&trail_map_page_url(origin, &detail.id))
        .await
        .and_then(|content| DetailPage::trail_map_link(&parse(&content), origin));

    let quality_scores = fetcher
        .fetch(&test_result_page_url(&detail.url))
        .await
        .map(|content| DetailPage::quality_scores(&parse(&content)))
        .unwrap_or_default();

    Some(assemble(ResortParts {
        location: entry.location,
        trail_map_url,
        quality_scores,
        ..ResortParts::from(detail)
    }))
}
