//! 求人一覧スクレイパーモジュール
//!
//! ページ送りしながら求人カードを読み取り、JSON/CSVに保存する

mod delay;
mod extract;
mod pager;
mod scraper;
mod source;
mod types;

pub use delay::PolitenessDelay;
pub use extract::Extractor;
pub use pager::Pager;
pub use self::scraper::{output_slug, JobScraper};
pub use source::{FieldMap, Pagination, Source, SourceProfile, INDEED, REED};
pub use types::{Field, Harvest, ListingRecord, StopReason};
