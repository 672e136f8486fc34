//! OpenStreetMap Overpass API から周辺の建物ポリゴンを取得

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScraperError;

pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
/// 検索半径（メートル）
pub const DEFAULT_RADIUS_M: u32 = 1200;
/// building:levels が無い場合の高さ
pub const DEFAULT_HEIGHT: u32 = 10;
/// 1階あたりの高さ
pub const LEVEL_HEIGHT: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// 閉じたポリゴン（[lon, lat] の列）と推定高さ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub polygon: Vec<[f64; 2]>,
    pub height: u32,
}

/// `(lat, lng)` 周辺の建物を取る Overpass QL
pub fn building_query(lat: f64, lng: f64, radius_m: u32) -> String {
    format!(
        "[out:json];(way[\"building\"](around:{},{},{}););out body;>;out skel qt;",
        radius_m, lat, lng
    )
}

/// way と node の一覧から建物ポリゴンを組み立てる
///
/// 未知の node を参照する way は捨てる。始点と終点が違えば始点を末尾に足して閉じる。
pub fn buildings_from_elements(elements: &[Element]) -> Vec<Building> {
    let nodes: HashMap<i64, [f64; 2]> = elements
        .iter()
        .filter_map(|el| match el {
            Element::Node { id, lat, lon } => Some((*id, [*lon, *lat])),
            _ => None,
        })
        .collect();

    elements
        .iter()
        .filter_map(|el| {
            let Element::Way { id, nodes: refs, tags } = el else {
                return None;
            };

            let mut polygon = refs
                .iter()
                .map(|node_id| nodes.get(node_id).copied())
                .collect::<Option<Vec<_>>>()
                .or_else(|| {
                    debug!("Way {} references unknown nodes, skipping", id);
                    None
                })?;

            let first = *polygon.first()?;
            if polygon.last() != Some(&first) {
                polygon.push(first);
            }

            let name = tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            let height = tags
                .get("building:levels")
                .and_then(|levels| levels.trim().parse::<u32>().ok())
                .and_then(|levels| levels.checked_mul(LEVEL_HEIGHT))
                .unwrap_or(DEFAULT_HEIGHT);

            Some(Building {
                name,
                polygon,
                height,
            })
        })
        .collect()
}

pub struct OverpassClient {
    client: Client,
    base_url: String,
    radius_m: u32,
}

impl OverpassClient {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            base_url: OVERPASS_URL.to_string(),
            radius_m: DEFAULT_RADIUS_M,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub async fn fetch_buildings(&self, lat: f64, lng: f64) -> Result<Vec<Building>, ScraperError> {
        let query = building_query(lat, lng, self.radius_m);
        debug!("Overpass query: {}", query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let data: OverpassResponse = response.json().await?;

        let buildings = buildings_from_elements(&data.elements);
        info!("Fetched {} buildings around ({}, {})", buildings.len(), lat, lng);
        Ok(buildings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 1, "nodes": [10, 11, 12],
             "tags": {"building": "yes", "name": "Tower", "building:levels": "12"}},
            {"type": "way", "id": 2, "nodes": [10, 11, 12, 10], "tags": {"building": "house"}},
            {"type": "way", "id": 3, "nodes": [10, 99], "tags": {"building": "yes"}},
            {"type": "node", "id": 10, "lat": 35.0, "lon": 139.0},
            {"type": "node", "id": 11, "lat": 35.1, "lon": 139.0},
            {"type": "node", "id": 12, "lat": 35.1, "lon": 139.1},
            {"type": "relation", "id": 7, "members": []}
        ]
    }"#;

    fn sample_buildings() -> Vec<Building> {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        buildings_from_elements(&response.elements)
    }

    #[test]
    fn test_open_ring_is_closed() {
        let buildings = sample_buildings();
        let tower = &buildings[0];
        assert_eq!(tower.name, "Tower");
        assert_eq!(tower.polygon.len(), 4);
        assert_eq!(tower.polygon.first(), tower.polygon.last());
        assert_eq!(tower.polygon[0], [139.0, 35.0]);
    }

    #[test]
    fn test_height_from_levels_or_default() {
        let buildings = sample_buildings();
        assert_eq!(buildings[0].height, 36);
        assert_eq!(buildings[1].height, DEFAULT_HEIGHT);
        assert_eq!(buildings[1].name, "Unknown");
        // 既に閉じているリングはそのまま
        assert_eq!(buildings[1].polygon.len(), 4);
    }

    #[test]
    fn test_huge_level_count_falls_back_to_default_height() {
        let json = r#"{
            "elements": [
                {"type": "way", "id": 1, "nodes": [10, 11, 12],
                 "tags": {"building": "yes", "building:levels": "2000000000"}},
                {"type": "node", "id": 10, "lat": 35.0, "lon": 139.0},
                {"type": "node", "id": 11, "lat": 35.1, "lon": 139.0},
                {"type": "node", "id": 12, "lat": 35.1, "lon": 139.1}
            ]
        }"#;
        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        let buildings = buildings_from_elements(&response.elements);
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_ways_with_unknown_nodes_are_skipped() {
        assert_eq!(sample_buildings().len(), 2);
    }

    #[test]
    fn test_building_query() {
        assert_eq!(
            building_query(35.68, 139.76, 1200),
            "[out:json];(way[\"building\"](around:1200,35.68,139.76););out body;>;out skel qt;"
        );
    }
}
