//! Annotation records.
//!
//! An annotation is one finding of a discovery run. Annotations hang off the
//! report that anchors them, or off a parent annotation they refine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::AnnotationStatus;

/// Steward review sub-record. The only part of an annotation that may change
/// after it is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationReview {
    pub status: AnnotationStatus,
    pub review_date: Option<DateTime<Utc>>,
    pub steward: Option<String>,
    pub comment: Option<String>,
}

/// Extra evidence carried by a suspect duplicate finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuspectDuplicate {
    pub duplicate_anchor_guids: Vec<String>,
    pub matching_property_names: Vec<String>,
    pub matching_classification_names: Vec<String>,
    pub matching_attachment_guids: Vec<String>,
    pub matching_relationship_guids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum AnnotationKind {
    #[default]
    Generic,
    SuspectDuplicate(SuspectDuplicate),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Assigned by the metadata store; never encoded into the property bag.
    pub guid: Option<String>,
    pub annotation_type: String,
    pub summary: Option<String>,
    pub confidence_level: Option<i64>,
    pub expression: Option<String>,
    pub explanation: Option<String>,
    pub analysis_step: Option<String>,
    pub json_properties: Option<String>,
    pub additional_properties: BTreeMap<String, String>,
    pub review: AnnotationReview,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(annotation_type: &str) -> Self {
        Self {
            annotation_type: annotation_type.to_string(),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence_level: i64) -> Self {
        self.confidence_level = Some(confidence_level);
        self
    }

    pub fn with_analysis_step(mut self, analysis_step: &str) -> Self {
        self.analysis_step = Some(analysis_step.to_string());
        self
    }

    pub fn suspect_duplicate(annotation_type: &str, details: SuspectDuplicate) -> Self {
        Self {
            kind: AnnotationKind::SuspectDuplicate(details),
            ..Self::new(annotation_type)
        }
    }
}
