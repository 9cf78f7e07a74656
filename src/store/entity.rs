//! Generic entity shapes exchanged with the metadata store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::properties::InstanceProperties;

/// A stored instance: its identity, type and property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub guid: String,
    pub type_name: String,
    pub create_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
    pub properties: InstanceProperties,
}

/// Where a new annotation is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationAnchor {
    /// Directly on a discovery report.
    Report(String),
    /// Under an existing annotation, refining it.
    Annotation(String),
}

impl AnnotationAnchor {
    pub fn guid(&self) -> &str {
        match self {
            AnnotationAnchor::Report(guid) | AnnotationAnchor::Annotation(guid) => guid,
        }
    }
}
