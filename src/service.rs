use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::{error, info, warn};

use crate::config::{ScraperConfig, SearchParameters};
use crate::error::ScraperError;
use crate::listing::{Harvest, JobScraper, Source, StopReason};
use crate::traits::Scraper;

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub source: Source,
    pub params: SearchParameters,
    pub config: ScraperConfig,
}

impl ScrapeRequest {
    pub fn new(source: Source, query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            source,
            params: SearchParameters::new(query, location),
            config: ScraperConfig::default(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: i64) -> Self {
        self.params.max_pages = max_pages;
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }
}

/// スクレイピング結果
#[derive(Debug)]
pub struct ScrapeResult {
    /// 保存先（0件なら None）
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub records: usize,
    pub pages_visited: u32,
    pub stop: StopReason,
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 収集結果を保存し、途中で失敗していればそのエラーを返す
fn finish(
    scraper: &JobScraper,
    params: &SearchParameters,
    harvest: Harvest,
) -> Result<ScrapeResult, ScraperError> {
    let Harvest {
        records,
        pages_visited,
        stop,
    } = harvest;

    if let StopReason::Failed { page, error } = stop {
        if !records.is_empty() {
            if let Err(e) = scraper.save(&records, params) {
                warn!("Failed to save partial results: {}", e);
            }
        }
        error!(
            "Scrape aborted on page {} ({} jobs collected): {}",
            page,
            records.len(),
            error
        );
        return Err(error);
    }

    let (json_path, csv_path) = if records.is_empty() {
        warn!("No jobs were found to save");
        (None, None)
    } else {
        let (json, csv) = scraper.save(&records, params)?;
        (Some(json), Some(csv))
    };

    info!(
        "Scrape finished: {} jobs from {} pages ({:?})",
        records.len(),
        pages_visited,
        stop
    );
    Ok(ScrapeResult {
        json_path,
        csv_path,
        records: records.len(),
        pages_visited,
        stop,
    })
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "Scrape request received: source={}, query={}, location={}",
            req.source, req.params.query, req.params.location
        );

        Box::pin(async move {
            let mut scraper = JobScraper::new(req.source, req.config);
            let harvest = scraper.execute(&req.params).await?;
            finish(&scraper, &req.params, harvest)
        })
    }
}
