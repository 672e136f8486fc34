//! 求人スクレイパーライブラリ
//!
//! - Reed / Indeed の検索結果をヘッドレスブラウザでページ送りしながら収集
//! - JSON / CSV に保存
//! - 交通データAPI (ODPT, RapidAPI) と Overpass API の簡易クライアント
//!
//! # 求人スクレイパー使用例
//!
//! ```rust,ignore
//! use job_scraper::{ScraperService, ScrapeRequest, Source};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new(Source::Reed, "javascript developer", "london")
//!         .with_max_pages(2)
//!         .with_output_dir("./jobs");
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("{} jobs saved to {:?}", result.records, result.json_path);
//! }
//! ```
//!
//! # ページ送りだけ使う例
//!
//! ```rust,ignore
//! use job_scraper::{JobScraper, Scraper, ScraperConfig, SearchParameters, Source};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut scraper = JobScraper::new(Source::Indeed, ScraperConfig::new());
//!     let params = SearchParameters::new("rust", "leeds").with_max_pages(3);
//!
//!     let harvest = scraper.execute(&params).await.unwrap();
//!     println!("Jobs: {} ({:?})", harvest.records.len(), harvest.stop);
//! }
//! ```

pub mod config;
pub mod error;
pub mod listing;
pub mod overpass;
pub mod persist;
pub mod service;
pub mod session;
pub mod traits;
pub mod transit;

// 主要な型をリエクスポート
pub use config::{ScraperConfig, SearchParameters};
pub use error::{Result, ScraperError};
pub use listing::{Harvest, JobScraper, ListingRecord, Source, StopReason};
pub use service::{ScrapeRequest, ScrapeResult, ScraperService};
pub use session::{BrowserSession, RequestPolicy};
pub use traits::{PageDriver, Scraper};

// 外部APIクライアント
pub use overpass::{Building, OverpassClient};
pub use transit::{DirectionsQuery, TransitClient, TransitConfig, TransportType};
