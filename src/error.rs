use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("セレクタ解析エラー: {0}")]
    Selector(String),

    #[error("抽出エラー: {0}")]
    Extraction(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("保存する求人がありません")]
    NothingToSave,

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("APIエラー: {0}")]
    Api(String),

    #[error("設定エラー: {0}")]
    Config(String),
}

impl ScraperError {
    /// 一時的な障害かどうか（呼び出し側の再試行判断用）
    pub fn is_retryable(&self) -> bool {
        match self {
            ScraperError::Navigation(_) | ScraperError::Timeout(_) => true,
            ScraperError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
