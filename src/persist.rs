//! 収集したレコードのJSON/CSV保存

use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::ScraperError;

/// 整形済みJSON配列（2スペースインデント）
pub fn to_json_string<T: Serialize>(records: &[T]) -> Result<String, ScraperError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// CSV文字列
///
/// ヘッダーは先頭レコードのキー（引用符なし）。各行は同じキー順の値を
/// すべてダブルクォートで囲み、内部の `"` は `""` にする。行区切りは `\n`。
pub fn to_csv_string<T: Serialize>(records: &[T]) -> Result<String, ScraperError> {
    let first = records.first().ok_or(ScraperError::NothingToSave)?;
    let headers: Vec<String> = match serde_json::to_value(first)? {
        Value::Object(map) => map.keys().cloned().collect(),
        other => {
            return Err(ScraperError::Extraction(format!(
                "レコードがオブジェクトではありません: {}",
                other
            )))
        }
    };

    let mut header_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header_writer.write_record(&headers)?;
    let buffer = header_writer
        .into_inner()
        .map_err(|e| ScraperError::FileIO(e.into_error()))?;

    let mut row_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);
    for record in records {
        let value = serde_json::to_value(record)?;
        let row: Vec<String> = headers
            .iter()
            .map(|key| match value.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        row_writer.write_record(&row)?;
    }
    let mut buffer = row_writer
        .into_inner()
        .map_err(|e| ScraperError::FileIO(e.into_error()))?;

    if buffer.last() == Some(&b'\n') {
        buffer.pop();
    }
    String::from_utf8(buffer).map_err(|e| ScraperError::Extraction(e.to_string()))
}

/// JSONで保存（上書き）。0件なら `[]`
pub fn write_json<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<(), ScraperError> {
    let path = path.as_ref();
    std::fs::write(path, to_json_string(records)?)?;
    info!("Saved {} jobs to {:?}", records.len(), path);
    Ok(())
}

/// CSVで保存（上書き）。0件なら `NothingToSave` でファイルは作らない
pub fn write_csv<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<(), ScraperError> {
    let path = path.as_ref();
    std::fs::write(path, to_csv_string(records)?)?;
    info!("Saved {} jobs to {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::listing::ListingRecord;

    fn record(title: &str) -> ListingRecord {
        let mut record = ListingRecord::empty(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        record.title = title.to_string();
        record.company = "Acme".to_string();
        record.source_url = "https://www.reed.co.uk/jobs/1".to_string();
        record
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("job-scraper-persist-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_csv_header_from_record_keys() {
        let csv = to_csv_string(&[record("Dev")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "title,company,location,salary,description,posted,sourceUrl,scrapedAt"
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""Dev","Acme","","","","","https://www.reed.co.uk/jobs/1","2024-05-01T09:30:00Z""#
        );
        assert!(lines.next().is_none());
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_csv_escapes_embedded_quotes() {
        let csv = to_csv_string(&[record(r#""a"b""#)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#""""a""b""","#), "row was {}", row);

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let parsed = reader.records().next().unwrap().unwrap();
        assert_eq!(&parsed[0], r#""a"b""#);
    }

    #[test]
    fn test_csv_empty_is_nothing_to_save() {
        let path = temp_path("empty.csv");
        let _ = std::fs::remove_file(&path);

        let result = write_csv::<ListingRecord>(&[], &path);
        assert!(matches!(result, Err(ScraperError::NothingToSave)));
        assert!(!path.exists());
    }

    #[test]
    fn test_json_empty_writes_brackets() {
        let path = temp_path("empty.json");
        write_json::<ListingRecord>(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_json_round_trip() {
        let records = vec![record("First"), record(r#"Second "quoted""#)];
        let path = temp_path("roundtrip.json");
        write_json(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"), "not pretty printed: {}", text);
        let parsed: Vec<ListingRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let path = temp_path("overwrite.csv");
        write_csv(&[record("One"), record("Two")], &path).unwrap();
        write_csv(&[record("Three")], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Three"));
        assert!(!text.contains("One"));
    }
}
