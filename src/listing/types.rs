//! 求人一覧関連の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// 求人1件分のレコード
///
/// シリアライズ時のキー順 = フィールド宣言順（CSVヘッダーもこの順になる）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    /// 求人概要 (Indeed)
    pub description: String,
    /// 掲載者・掲載日 (Reed は "posted by"、Indeed は日付)
    pub posted: String,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
}

impl ListingRecord {
    /// 全フィールド空のレコードを作成（scrapedAtのみ設定）
    pub fn empty(scraped_at: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            location: String::new(),
            salary: String::new(),
            description: String::new(),
            posted: String::new(),
            source_url: String::new(),
            scraped_at,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.title = value,
            Field::Company => self.company = value,
            Field::Location => self.location = value,
            Field::Salary => self.salary = value,
            Field::Description => self.description = value,
            Field::Posted => self.posted = value,
        }
    }
}

/// カード内のテキスト項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    Salary,
    Description,
    Posted,
}

/// ページ送りを終了した理由
#[derive(Debug)]
pub enum StopReason {
    /// 指定ページ数に到達（max_pages <= 0 を含む）
    PageLimit,
    /// 結果マーカー要素が現れなかった
    NoResults { page: u32 },
    /// 有効な求人が0件
    EmptyPage { page: u32 },
    /// 次ページへのリンクがない
    NoNextPage { page: u32 },
    /// ナビゲーション失敗・タイムアウト（それまでのレコードは保持）
    Failed { page: u32, error: ScraperError },
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::Failed { .. })
    }
}

/// 1回の検索実行の結果
#[derive(Debug)]
pub struct Harvest {
    pub records: Vec<ListingRecord>,
    /// 遷移したページ数
    pub pages_visited: u32,
    pub stop: StopReason,
}

impl Default for Harvest {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            pages_visited: 0,
            stop: StopReason::PageLimit,
        }
    }
}
