//! 一覧ページのページ送り

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{SearchParameters, DEFAULT_RESULTS_TIMEOUT};
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::delay::PolitenessDelay;
use super::extract::Extractor;
use super::source::SourceProfile;
use super::types::{Harvest, StopReason};

pub struct Pager {
    profile: &'static SourceProfile,
    extractor: Extractor,
    delay: PolitenessDelay,
    results_timeout: Duration,
}

impl Pager {
    pub fn new(profile: &'static SourceProfile) -> Result<Self, ScraperError> {
        Ok(Self {
            profile,
            extractor: Extractor::new(&profile.fields)?,
            delay: profile.delay,
            results_timeout: DEFAULT_RESULTS_TIMEOUT,
        })
    }

    pub fn with_delay(mut self, delay: PolitenessDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_results_timeout(mut self, timeout: Duration) -> Self {
        self.results_timeout = timeout;
        self
    }

    /// 1〜max_pages ページを順に処理する
    ///
    /// 失敗しても途中までのレコードは `Harvest` に残る。
    pub async fn run<D>(&self, params: &SearchParameters, driver: &mut D) -> Harvest
    where
        D: PageDriver + ?Sized,
    {
        let mut harvest = Harvest::default();
        if params.max_pages <= 0 {
            info!("max_pages={} - nothing to scrape", params.max_pages);
            return harvest;
        }
        let max_pages = u32::try_from(params.max_pages).unwrap_or(u32::MAX);
        let source = self.profile.name;

        for page in 1..=max_pages {
            let url = self
                .profile
                .listing_url(&params.query, &params.location, page);
            info!("[{}] Scraping page {}: {}", source, page, url);

            harvest.pages_visited += 1;
            if let Err(e) = driver.navigate(&url).await {
                error!("[{}] Navigation failed on page {}: {}", source, page, e);
                harvest.stop = StopReason::Failed { page, error: e };
                return harvest;
            }

            match driver
                .wait_for_selector(self.profile.results_marker, self.results_timeout)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    info!(
                        "[{}] Results marker '{}' not found on page {}, stopping",
                        source, self.profile.results_marker, page
                    );
                    harvest.stop = StopReason::NoResults { page };
                    return harvest;
                }
                Err(e) => {
                    error!("[{}] Waiting for results failed on page {}: {}", source, page, e);
                    harvest.stop = StopReason::Failed { page, error: e };
                    return harvest;
                }
            }

            let html = match driver.content().await {
                Ok(html) => html,
                Err(e) => {
                    warn!("[{}] Error extracting jobs from page {}: {}", source, page, e);
                    String::new()
                }
            };

            let records = self.extractor.extract(&html, &url);
            if records.is_empty() {
                info!("[{}] No jobs found on page {}", source, page);
                harvest.stop = StopReason::EmptyPage { page };
                return harvest;
            }

            let found = records.len();
            harvest.records.extend(records);
            info!(
                "[{}] Found {} jobs on page {}. Total jobs: {}",
                source,
                found,
                page,
                harvest.records.len()
            );

            if page == max_pages {
                harvest.stop = StopReason::PageLimit;
                return harvest;
            }

            match self.profile.pagination.has_next_page(&html, page) {
                Ok(true) => {}
                Ok(false) => {
                    info!("[{}] No next page after page {}", source, page);
                    harvest.stop = StopReason::NoNextPage { page };
                    return harvest;
                }
                Err(e) => {
                    warn!("[{}] Pagination check failed on page {}: {}", source, page, e);
                    harvest.stop = StopReason::NoNextPage { page };
                    return harvest;
                }
            }

            self.delay.wait().await;
        }

        harvest
    }
}
