//! Discovery analysis report record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::DiscoveryRequestStatus;

/// Anchors one discovery run: who ran what against which asset, and how far
/// it has got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryAnalysisReport {
    /// Assigned by the metadata store; never encoded into the property bag.
    pub guid: Option<String>,
    pub qualified_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub analysis_parameters: BTreeMap<String, String>,
    pub discovery_request_status: Option<DiscoveryRequestStatus>,
    pub asset_guid: Option<String>,
    pub discovery_engine_guid: Option<String>,
    pub discovery_service_guid: Option<String>,
}

impl DiscoveryAnalysisReport {
    pub fn new(qualified_name: &str) -> Self {
        Self {
            guid: None,
            qualified_name: qualified_name.to_string(),
            display_name: None,
            description: None,
            creation_date: None,
            analysis_parameters: BTreeMap::new(),
            discovery_request_status: None,
            asset_guid: None,
            discovery_engine_guid: None,
            discovery_service_guid: None,
        }
    }
}
