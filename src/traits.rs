use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::SearchParameters;
use crate::error::ScraperError;
use crate::listing::Harvest;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化（起動済みなら何もしない）
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// 検索結果をページ送りしながら収集
    async fn search(&mut self, params: &SearchParameters) -> Result<Harvest, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → search → close）
    ///
    /// close は成功・失敗どちらの経路でも実行する。
    async fn execute(&mut self, params: &SearchParameters) -> Result<Harvest, ScraperError> {
        let result = match self.initialize().await {
            Ok(()) => self.search(params).await,
            Err(e) => Err(e),
        };

        if let Err(e) = self.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        result
    }
}

/// ページ送りに必要なブラウザ操作
///
/// 本番は `BrowserSession`（chromiumoxide）、テストでは固定HTMLを返す実装を使う。
#[async_trait]
pub trait PageDriver: Send {
    /// URLへ遷移し、ネットワークが落ち着くまで待つ
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// 要素の出現を待つ。`timeout` 内に現れなければ `Ok(false)`
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// 現在のDOMをHTML文字列で取得
    async fn content(&mut self) -> Result<String, ScraperError>;
}
