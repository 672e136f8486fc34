//! 求人サイトごとの定義（URL規則・セレクタ・ページ送り）
//!
//! 新しいサイトへの対応は `SourceProfile` を1つ追加するだけで済むようにする。
//! 制御フローは `Pager` 側で共通。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::error::ScraperError;

use super::delay::PolitenessDelay;
use super::types::Field;

/// カードとその中の項目のセレクタ
#[derive(Debug)]
pub struct FieldMap {
    /// 求人カード1件を表す要素
    pub card: &'static str,
    /// カード内の各項目（最初に一致した要素のテキスト）
    pub fields: &'static [(Field, &'static str)],
    /// 求人詳細へのリンク（href を sourceUrl にする）
    pub link: Option<&'static str>,
}

/// ページ送りの規則
#[derive(Debug)]
pub enum Pagination {
    /// `/jobs/{query}-jobs-in-{location}?pageno={n}` 形式。
    /// ページネーション要素に次ページのリンクがある間だけ続行
    PathSegment {
        container: &'static str,
        active: &'static str,
        page_attr: &'static str,
    },
    /// `/jobs?q=..&l=..&start={offset}` 形式。次ページ判定なし
    Offset { step: u32 },
}

impl Pagination {
    /// `current` ページのHTMLに次ページへのリンクがあるか
    ///
    /// 現在ページはページネーション内のアクティブ要素から読み、読めなければ `current` を使う。
    pub fn has_next_page(&self, html: &str, current: u32) -> Result<bool, ScraperError> {
        match self {
            Pagination::Offset { .. } => Ok(true),
            Pagination::PathSegment {
                container,
                active,
                page_attr,
            } => {
                let container_sel = parse_selector(container)?;
                let active_sel = parse_selector(active)?;

                let document = Html::parse_document(html);
                let Some(pagination) = document.select(&container_sel).next() else {
                    return Ok(false);
                };

                let active_page = pagination
                    .select(&active_sel)
                    .next()
                    .and_then(|el| el.text().collect::<String>().trim().parse::<u32>().ok())
                    .unwrap_or(current);

                let next_sel = parse_selector(&format!(
                    "a[{}=\"{}\"]",
                    page_attr,
                    active_page + 1
                ))?;
                Ok(pagination.select(&next_sel).next().is_some())
            }
        }
    }
}

/// 求人サイト1つ分の定義
#[derive(Debug)]
pub struct SourceProfile {
    /// 出力ファイル名にも使う短い名前
    pub name: &'static str,
    pub base_url: &'static str,
    /// 検索結果が読み込まれたことを示す要素
    pub results_marker: &'static str,
    pub fields: FieldMap,
    pub pagination: Pagination,
    pub delay: PolitenessDelay,
}

impl SourceProfile {
    /// 検索条件とページ番号（1始まり）から一覧ページのURLを組み立てる
    pub fn listing_url(&self, query: &str, location: &str, page: u32) -> String {
        match self.pagination {
            Pagination::PathSegment { .. } => {
                let url = format!(
                    "{}/jobs/{}-jobs-in-{}",
                    self.base_url,
                    path_slug(query),
                    path_slug(location)
                );
                if page > 1 {
                    format!("{}?pageno={}", url, page)
                } else {
                    url
                }
            }
            Pagination::Offset { step } => format!(
                "{}/jobs?q={}&l={}&start={}",
                self.base_url,
                urlencoding::encode(query),
                urlencoding::encode(location),
                page.saturating_sub(1).saturating_mul(step)
            ),
        }
    }
}

/// "JavaScript Developer" -> "javascript-developer"
fn path_slug(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join("-");
    urlencoding::encode(&joined.to_lowercase()).into_owned()
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{}: {:?}", css, e)))
}

pub static REED: SourceProfile = SourceProfile {
    name: "reed",
    base_url: "https://www.reed.co.uk",
    results_marker: "#server-results",
    fields: FieldMap {
        card: "#server-results article.card",
        fields: &[
            (Field::Title, "h2.job-result-heading__title"),
            (Field::Company, ".job-result-company__name"),
            (Field::Location, ".job-metadata__item--location"),
            (Field::Salary, ".job-metadata__item--salary"),
            (Field::Posted, "div.job-result-heading__posted-by"),
        ],
        link: Some("h2.job-result-heading__title a"),
    },
    pagination: Pagination::PathSegment {
        container: ".pagination",
        active: ".active",
        page_attr: "data-page",
    },
    delay: PolitenessDelay::new(Duration::from_millis(1000), Duration::from_millis(3000)),
};

pub static INDEED: SourceProfile = SourceProfile {
    name: "indeed",
    base_url: "https://uk.indeed.com",
    results_marker: ".job_seen_beacon",
    fields: FieldMap {
        card: ".job_seen_beacon",
        fields: &[
            (Field::Title, ".jobTitle"),
            (Field::Company, ".companyName"),
            (Field::Location, ".companyLocation"),
            (Field::Salary, ".metadata.salary-snippet-container"),
            (Field::Description, ".job-snippet"),
            (Field::Posted, ".date"),
        ],
        link: Some("a.jcs-JobTitle"),
    },
    pagination: Pagination::Offset { step: 10 },
    delay: PolitenessDelay::new(Duration::from_millis(2000), Duration::from_millis(5000)),
};

/// 対応している求人サイト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Reed,
    Indeed,
}

impl Source {
    pub fn profile(&self) -> &'static SourceProfile {
        match self {
            Source::Reed => &REED,
            Source::Indeed => &INDEED,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for Source {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reed" => Ok(Source::Reed),
            "indeed" => Ok(Source::Indeed),
            other => Err(ScraperError::Config(format!("未対応のサイト: {}", other))),
        }
    }
}
