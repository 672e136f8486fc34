//! 交通データAPIクライアント
//!
//! - 東京の公共交通オープンデータ (ODPT): 列車・バス・フライト情報
//! - RapidAPI (transithq): 乗換案内
//!
//! APIキーは環境変数から渡す。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ScraperError;

pub const ODPT_BASE_URL: &str = "https://api.tokyometroapp.jp/api/v2/datapoints";
pub const DIRECTIONS_HOST: &str = "transithq.p.rapidapi.com";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 取得対象の交通種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportType {
    Train,
    Bus,
    Aircraft,
}

impl TransportType {
    pub const ALL: [TransportType; 3] = [
        TransportType::Train,
        TransportType::Bus,
        TransportType::Aircraft,
    ];

    /// ODPT の rdf:type
    pub fn rdf_type(&self) -> &'static str {
        match self {
            TransportType::Train => "odpt:Train",
            TransportType::Bus => "odpt:Bus",
            TransportType::Aircraft => "odpt:FlightStatus",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransportType::Train => "Train",
            TransportType::Bus => "Bus",
            TransportType::Aircraft => "Aircraft",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportType {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(TransportType::Train),
            "bus" => Ok(TransportType::Bus),
            "aircraft" | "flight" => Ok(TransportType::Aircraft),
            other => Err(ScraperError::Config(format!("無効な交通種別: {}", other))),
        }
    }
}

/// 交通APIの設定
#[derive(Debug, Clone)]
pub struct TransitConfig {
    pub odpt_consumer_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub odpt_base_url: String,
    pub directions_host: String,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            odpt_consumer_key: None,
            rapidapi_key: None,
            odpt_base_url: ODPT_BASE_URL.to_string(),
            directions_host: DIRECTIONS_HOST.to_string(),
        }
    }
}

impl TransitConfig {
    /// `ODPT_CONSUMER_KEY` / `RAPIDAPI_KEY` から読み込む
    pub fn from_env() -> Self {
        Self {
            odpt_consumer_key: std::env::var("ODPT_CONSUMER_KEY").ok(),
            rapidapi_key: std::env::var("RAPIDAPI_KEY").ok(),
            ..Default::default()
        }
    }

    pub fn with_odpt_consumer_key(mut self, key: impl Into<String>) -> Self {
        self.odpt_consumer_key = Some(key.into());
        self
    }

    pub fn with_rapidapi_key(mut self, key: impl Into<String>) -> Self {
        self.rapidapi_key = Some(key.into());
        self
    }
}

/// 乗換案内の検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionsQuery {
    pub origin: String,
    pub destination: String,
    pub language: String,
}

impl DirectionsQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            language: "ja".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

pub struct TransitClient {
    config: TransitConfig,
    client: Client,
}

impl TransitClient {
    pub fn new(config: TransitConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { config, client })
    }

    fn odpt_url(&self, transport: TransportType) -> Result<Url, ScraperError> {
        let key = self
            .config
            .odpt_consumer_key
            .as_deref()
            .ok_or_else(|| ScraperError::Config("ODPT_CONSUMER_KEY が設定されていません".into()))?;

        Url::parse_with_params(
            &self.config.odpt_base_url,
            &[("rdf:type", transport.rdf_type()), ("acl:consumerKey", key)],
        )
        .map_err(|e| ScraperError::Config(format!("ODPT URL: {}", e)))
    }

    fn directions_url(&self, query: &DirectionsQuery) -> Result<Url, ScraperError> {
        Url::parse_with_params(
            &format!("https://{}/directions", self.config.directions_host),
            &[
                ("origin", query.origin.as_str()),
                ("language", query.language.as_str()),
                ("destination", query.destination.as_str()),
            ],
        )
        .map_err(|e| ScraperError::Config(format!("directions URL: {}", e)))
    }

    /// 1種別分の生JSONを取得
    pub async fn fetch_transport_data(&self, transport: TransportType) -> Result<Value, ScraperError> {
        let url = self.odpt_url(transport)?;
        debug!("Fetching {} data", transport);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Api(format!(
                "Failed to fetch data for {}: {}",
                transport, status
            )));
        }

        let data: Value = response.json().await?;
        info!("Fetched {} data", transport);
        Ok(data)
    }

    /// 全種別を順に取得。失敗した種別はログに出して飛ばす
    pub async fn fetch_all(&self) -> BTreeMap<String, Value> {
        let mut results = BTreeMap::new();
        for transport in TransportType::ALL {
            match self.fetch_transport_data(transport).await {
                Ok(data) => {
                    results.insert(transport.to_string(), data);
                }
                Err(e) => error!("Failed to fetch data for {}: {}", transport, e),
            }
        }
        results
    }

    /// 乗換案内の生JSONを取得
    pub async fn fetch_directions(&self, query: &DirectionsQuery) -> Result<Value, ScraperError> {
        let key = self
            .config
            .rapidapi_key
            .as_deref()
            .ok_or_else(|| ScraperError::Config("RAPIDAPI_KEY が設定されていません".into()))?;
        let url = self.directions_url(query)?;
        debug!("Fetching directions {} -> {}", query.origin, query.destination);

        let body = self
            .client
            .get(url)
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", &self.config.directions_host)
            .send()
            .await?
            .text()
            .await?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_types() {
        assert_eq!(TransportType::Train.rdf_type(), "odpt:Train");
        assert_eq!(TransportType::Bus.rdf_type(), "odpt:Bus");
        assert_eq!(TransportType::Aircraft.rdf_type(), "odpt:FlightStatus");
    }

    #[test]
    fn test_transport_type_from_str() {
        assert_eq!("Train".parse::<TransportType>().unwrap(), TransportType::Train);
        assert_eq!("flight".parse::<TransportType>().unwrap(), TransportType::Aircraft);
        assert!(matches!(
            "ferry".parse::<TransportType>(),
            Err(ScraperError::Config(_))
        ));
    }

    #[test]
    fn test_odpt_url_carries_key_and_type() {
        let client =
            TransitClient::new(TransitConfig::default().with_odpt_consumer_key("secret")).unwrap();
        let url = client.odpt_url(TransportType::Bus).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.as_str().starts_with(ODPT_BASE_URL));
        assert!(pairs.contains(&("rdf:type".into(), "odpt:Bus".into())));
        assert!(pairs.contains(&("acl:consumerKey".into(), "secret".into())));
    }

    #[test]
    fn test_directions_url() {
        let client = TransitClient::new(TransitConfig::default()).unwrap();
        let url = client
            .directions_url(&DirectionsQuery::new("shinjuku", "chiba"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://transithq.p.rapidapi.com/directions?origin=shinjuku&language=ja&destination=chiba"
        );
    }

    #[tokio::test]
    async fn test_missing_keys_fail_before_request() {
        let client = TransitClient::new(TransitConfig::default()).unwrap();
        assert!(matches!(
            client.fetch_transport_data(TransportType::Train).await,
            Err(ScraperError::Config(_))
        ));
        assert!(matches!(
            client
                .fetch_directions(&DirectionsQuery::new("shinjuku", "chiba"))
                .await,
            Err(ScraperError::Config(_))
        ));
        assert!(client.fetch_all().await.is_empty());
    }
}
