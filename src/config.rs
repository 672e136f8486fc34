use std::path::PathBuf;
use std::time::Duration;

/// ナビゲーション（ネットワークアイドル待機を含む）のタイムアウト
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// 検索結果マーカー要素の待機タイムアウト
pub const DEFAULT_RESULTS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub output_dir: PathBuf,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub results_timeout: Duration,
    /// Chrome実行ファイル（未指定ならchromiumoxideの自動検出）
    pub chrome_path: Option<PathBuf>,
    /// 結果が出ない時にスクリーンショットをdebugログへ出す
    pub debug: bool,
    /// ページ間待機の上書き (min, max)。未指定ならサイトごとの既定値
    pub delay: Option<(Duration, Duration)>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            results_timeout: DEFAULT_RESULTS_TIMEOUT,
            chrome_path: std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .ok()
                .map(PathBuf::from),
            debug: false,
            delay: None,
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_results_timeout(mut self, timeout: Duration) -> Self {
        self.results_timeout = timeout;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.delay = Some((min, max));
        self
    }
}

/// 検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub query: String,
    pub location: String,
    /// 0以下なら何も取得しない
    pub max_pages: i64,
}

impl SearchParameters {
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            max_pages: 1,
        }
    }

    pub fn with_max_pages(mut self, max_pages: i64) -> Self {
        self.max_pages = max_pages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_headless(false)
            .with_output_dir("/tmp/jobs")
            .with_navigation_timeout(Duration::from_secs(45))
            .with_delay(Duration::ZERO, Duration::ZERO);

        assert!(!config.headless);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/jobs"));
        assert_eq!(config.navigation_timeout, Duration::from_secs(45));
        assert_eq!(config.results_timeout, DEFAULT_RESULTS_TIMEOUT);
        assert_eq!(config.delay, Some((Duration::ZERO, Duration::ZERO)));
    }

    #[test]
    fn test_search_parameters_default_one_page() {
        let params = SearchParameters::new("javascript developer", "london");
        assert_eq!(params.max_pages, 1);
        assert_eq!(params.with_max_pages(3).max_pages, 3);
    }
}
