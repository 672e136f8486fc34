//! chromiumoxide によるブラウザセッション

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::policy::{RequestPolicy, ResourceKind};

/// デスクトップ版Chromeとして名乗る
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// ネットワークアイドル判定のインターバル（ミリ秒）
const NETWORK_IDLE_CHECK_INTERVAL_MS: u64 = 500;
/// 連続してアイドルと判定された回数がこれに達したら完了
const REQUIRED_IDLE_CHECKS: u32 = 3;
/// 要素出現のポーリング間隔（ミリ秒）
const SELECTOR_POLL_INTERVAL_MS: u64 = 250;

/// ブラウザ1プロセス + ページ1枚
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    interceptor: JoinHandle<()>,
    user_data_dir: PathBuf,
    navigation_timeout: Duration,
    debug: bool,
}

impl BrowserSession {
    /// ブラウザを起動し、UA設定とリクエスト遮断を済ませたページを用意する
    pub async fn launch(
        config: &ScraperConfig,
        policy: RequestPolicy,
    ) -> Result<Self, ScraperError> {
        info!("Initializing browser...");

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("job-scraper-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800)
            .no_sandbox()
            .request_timeout(config.navigation_timeout)
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-web-security")
            .arg("--disable-features=IsolateOrigins,site-per-process");

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        page.execute(SetUserAgentOverrideParams::new(USER_AGENT))
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("UA設定エラー: {}", e)))?;

        let interceptor = intercept_requests(&page, policy).await?;

        info!("Browser initialized successfully");
        Ok(Self {
            browser,
            page,
            handler,
            interceptor,
            user_data_dir,
            navigation_timeout: config.navigation_timeout,
            debug: config.debug,
        })
    }

    /// ブラウザを終了し、一時ディレクトリを片付ける
    pub async fn close(mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");
        self.interceptor.abort();

        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ終了エラー: {}", e)));

        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser process: {}", e);
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            debug!("Failed to remove {:?}: {}", self.user_data_dir, e);
        }

        info!("Browser closed");
        closed
    }

    /// 現在のページのスクリーンショットをdebugログに出す
    async fn log_screenshot(&self) {
        match self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            Ok(screenshot) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
                debug!("Page screenshot: data:image/png;base64,{}", encoded);
            }
            Err(e) => debug!("Failed to take screenshot: {}", e),
        }
    }
}

/// Fetch ドメインで全リクエストを一時停止させ、ポリシーに従って中断か続行を返す
async fn intercept_requests(
    page: &Page,
    policy: RequestPolicy,
) -> Result<JoinHandle<()>, ScraperError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| ScraperError::BrowserInit(format!("リクエスト監視エラー: {}", e)))?;

    page.execute(EnableParams::default())
        .await
        .map_err(|e| ScraperError::BrowserInit(format!("リクエスト監視エラー: {}", e)))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let kind = ResourceKind::from(&event.resource_type);
            let result = if policy.should_block(kind, &event.request.url) {
                debug!("Blocked {:?} request: {}", kind, event.request.url);
                page.execute(FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            };

            if let Err(e) = result {
                debug!("Failed to resolve paused request: {}", e);
            }
        }
    }))
}

/// ネットワークリクエストがアイドル状態になるまで待機
///
/// 上限は呼び出し側の `timeout` で決める。
async fn wait_request_idle(page: &Page) {
    let start = Instant::now();
    let mut idle_count = 0;

    loop {
        let result = page
            .evaluate(
                r#"
                (() => {
                    // 直近500ms以内に開始され、まだ終わっていないリソース
                    const entries = performance.getEntriesByType('resource');
                    const now = performance.now();
                    const recentRequests = entries.filter(e => {
                        return (now - e.startTime) < 500 && e.duration === 0;
                    });
                    return recentRequests.length === 0;
                })()
            "#,
            )
            .await;

        match result {
            Ok(val) => {
                if val.into_value::<bool>().unwrap_or(false) {
                    idle_count += 1;
                    if idle_count >= REQUIRED_IDLE_CHECKS {
                        debug!("Network idle after {:?}", start.elapsed());
                        return;
                    }
                } else {
                    idle_count = 0;
                }
            }
            Err(e) => {
                debug!("Network idle check error: {}", e);
                idle_count = 0;
            }
        }

        sleep(Duration::from_millis(NETWORK_IDLE_CHECK_INTERVAL_MS)).await;
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        let page = &self.page;
        let load = async {
            page.goto(url)
                .await
                .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;
            wait_request_idle(page).await;
            Ok::<(), ScraperError>(())
        };

        match timeout(self.navigation_timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(ScraperError::Timeout(format!(
                "{} が{:?}以内に読み込まれませんでした",
                url, self.navigation_timeout
            ))),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        wait: Duration,
    ) -> Result<bool, ScraperError> {
        let deadline = Instant::now() + wait;

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                warn!("'{}' did not appear within {:?}", selector, wait);
                if self.debug {
                    self.log_screenshot().await;
                }
                return Ok(false);
            }
            sleep(Duration::from_millis(SELECTOR_POLL_INTERVAL_MS)).await;
        }
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.page
            .content()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }
}
