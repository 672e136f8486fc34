//! 一覧ページHTMLから求人レコードを取り出す

use chrono::Utc;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ScraperError;

use super::source::{parse_selector, FieldMap};
use super::types::{Field, ListingRecord};

/// セレクタをコンパイル済みの抽出器
#[derive(Debug)]
pub struct Extractor {
    card: Selector,
    fields: Vec<(Field, Selector)>,
    link: Option<Selector>,
}

impl Extractor {
    pub fn new(map: &FieldMap) -> Result<Self, ScraperError> {
        let fields = map
            .fields
            .iter()
            .map(|(field, css)| parse_selector(css).map(|selector| (*field, selector)))
            .collect::<Result<Vec<_>, ScraperError>>()?;

        Ok(Self {
            card: parse_selector(map.card)?,
            fields,
            link: map.link.map(parse_selector).transpose()?,
        })
    }

    /// ページ内の全カードを DOM 順に読み取る
    ///
    /// 見つからない項目は空文字。タイトルが空のカードは捨てる。
    /// リンクは `page_url` 基準で絶対URLにする。
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        let records: Vec<ListingRecord> = document
            .select(&self.card)
            .map(|card| {
                let mut record = ListingRecord::empty(Utc::now());
                for (field, selector) in &self.fields {
                    record.set(*field, first_text(card, selector));
                }
                if let Some(link) = &self.link {
                    record.source_url = first_href(card, link, base.as_ref());
                }
                record
            })
            .filter(|record| !record.title.is_empty())
            .collect();

        debug!("Extracted {} listings from {}", records.len(), page_url);
        records
    }
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn first_href(card: ElementRef<'_>, selector: &Selector, base: Option<&Url>) -> String {
    let Some(href) = card
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
    else {
        return String::new();
    };

    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::source::{INDEED, REED};

    fn reed_card(title: &str, company: &str) -> String {
        format!(
            r#"<article class="card">
                <h2 class="job-result-heading__title"><a href="/jobs/{slug}/123">{title}</a></h2>
                <div class="job-result-heading__posted-by"> Posted today by <a>{company}</a> </div>
                <a class="job-result-company__name">{company}</a>
                <ul>
                    <li class="job-metadata__item--location">London</li>
                    <li class="job-metadata__item--salary">£50,000 - £60,000 per annum</li>
                </ul>
            </article>"#,
            slug = title.to_lowercase().replace(' ', "-"),
            title = title,
            company = company
        )
    }

    #[test]
    fn test_extract_reed_cards_in_dom_order() {
        let html = format!(
            r#"<html><body><div id="server-results">{}{}</div></body></html>"#,
            reed_card("Senior JavaScript Developer", "Acme"),
            reed_card("Node Engineer", "Globex")
        );
        let extractor = Extractor::new(&REED.fields).unwrap();
        let records = extractor.extract(&html, "https://www.reed.co.uk/jobs/js-jobs-in-london");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Senior JavaScript Developer");
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].location, "London");
        assert_eq!(records[0].salary, "£50,000 - £60,000 per annum");
        assert_eq!(records[0].posted, "Posted today by Acme");
        assert_eq!(
            records[0].source_url,
            "https://www.reed.co.uk/jobs/senior-javascript-developer/123"
        );
        assert_eq!(records[1].title, "Node Engineer");
        assert!(records[0].scraped_at <= records[1].scraped_at);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let html = r#"<div class="job_seen_beacon"><h2 class="jobTitle">Rust Developer</h2></div>"#;
        let extractor = Extractor::new(&INDEED.fields).unwrap();
        let records = extractor.extract(html, "https://uk.indeed.com/jobs?q=rust");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "Rust Developer");
        assert_eq!(record.company, "");
        assert_eq!(record.location, "");
        assert_eq!(record.salary, "");
        assert_eq!(record.description, "");
        assert_eq!(record.posted, "");
        assert_eq!(record.source_url, "");
    }

    #[test]
    fn test_cards_without_title_are_dropped() {
        let html = r#"
            <div class="job_seen_beacon"><span class="companyName">No Title Ltd</span></div>
            <div class="job_seen_beacon"><h2 class="jobTitle">   </h2></div>
            <div class="job_seen_beacon"><h2 class="jobTitle">Kept</h2>
                <a class="jcs-JobTitle" href="/viewjob?jk=abc">Kept</a>
                <div class="job-snippet"> Build things. </div>
                <span class="date">Posted 3 days ago</span>
            </div>"#;
        let extractor = Extractor::new(&INDEED.fields).unwrap();
        let records = extractor.extract(html, "https://uk.indeed.com/jobs?q=x&start=0");

        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| !r.title.is_empty()));
        assert_eq!(records[0].description, "Build things.");
        assert_eq!(records[0].posted, "Posted 3 days ago");
        assert_eq!(records[0].source_url, "https://uk.indeed.com/viewjob?jk=abc");
    }

    #[test]
    fn test_no_cards_yields_empty() {
        let extractor = Extractor::new(&REED.fields).unwrap();
        assert!(extractor
            .extract("<div id=\"server-results\"></div>", "https://www.reed.co.uk/")
            .is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let map = FieldMap {
            card: "div[",
            fields: &[],
            link: None,
        };
        assert!(matches!(Extractor::new(&map), Err(ScraperError::Selector(_))));
    }
}
