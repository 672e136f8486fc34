//! 求人サイトスクレイパー実装

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::{ScraperConfig, SearchParameters};
use crate::error::ScraperError;
use crate::persist;
use crate::session::{BrowserSession, RequestPolicy};
use crate::traits::Scraper;

use super::delay::PolitenessDelay;
use super::pager::Pager;
use super::source::Source;
use super::types::{Harvest, ListingRecord};

/// 求人サイトスクレイパー
pub struct JobScraper {
    source: Source,
    config: ScraperConfig,
    policy: RequestPolicy,
    session: Option<BrowserSession>,
}

impl JobScraper {
    pub fn new(source: Source, config: ScraperConfig) -> Self {
        Self {
            source,
            config,
            policy: RequestPolicy::default(),
            session: None,
        }
    }

    pub fn with_policy(mut self, policy: RequestPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    fn pager(&self) -> Result<Pager, ScraperError> {
        let mut pager = Pager::new(self.source.profile())?
            .with_results_timeout(self.config.results_timeout);
        if let Some((min, max)) = self.config.delay {
            pager = pager.with_delay(PolitenessDelay::new(min, max));
        }
        Ok(pager)
    }

    /// 出力ファイルのパス (`<slug>_jobs.json`, `<slug>_jobs.csv`)
    pub fn output_paths(&self, params: &SearchParameters) -> (PathBuf, PathBuf) {
        let slug = output_slug(&params.location, self.source);
        let dir = &self.config.output_dir;
        (
            dir.join(format!("{}_jobs.json", slug)),
            dir.join(format!("{}_jobs.csv", slug)),
        )
    }

    /// JSONとCSVを保存
    pub fn save(
        &self,
        records: &[ListingRecord],
        params: &SearchParameters,
    ) -> Result<(PathBuf, PathBuf), ScraperError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let (json_path, csv_path) = self.output_paths(params);
        persist::write_json(records, &json_path)?;
        persist::write_csv(records, &csv_path)?;
        Ok((json_path, csv_path))
    }
}

/// "London" + Reed -> "london_reed"
pub fn output_slug(location: &str, source: Source) -> String {
    let location = location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    if location.is_empty() {
        source.to_string()
    } else {
        format!("{}_{}", location, source)
    }
}

#[async_trait]
impl Scraper for JobScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        if self.session.is_some() {
            debug!("Browser session already running");
            return Ok(());
        }
        let session = BrowserSession::launch(&self.config, self.policy.clone()).await?;
        self.session = Some(session);
        Ok(())
    }

    async fn search(&mut self, params: &SearchParameters) -> Result<Harvest, ScraperError> {
        let pager = self.pager()?;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))?;

        info!(
            "Searching {} for '{}' in '{}' (max_pages={})",
            self.source, params.query, params.location, params.max_pages
        );
        Ok(pager.run(params, session).await)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}
