//! Annotation builder.
//!
//! Attribute names below are the indexing contract of the metadata store;
//! a concept keeps its name for good.

use crate::error::{DiscoveryError, Result};
use crate::log_warn;
use crate::logging::structured::LogContext;
use crate::model::{Annotation, AnnotationKind, AnnotationReview, AnnotationStatus};
use crate::properties::{
    add_date, add_int, add_ordinal_enum, add_string, add_string_map, get_date, get_int,
    get_ordinal_enum, get_string, get_string_map, InstanceProperties,
};

pub const ANNOTATION_TYPE_NAME: &str = "Annotation";

pub const ANNOTATION_TYPE: &str = "annotationType";
pub const SUMMARY: &str = "summary";
pub const CONFIDENCE_LEVEL: &str = "confidenceLevel";
pub const EXPRESSION: &str = "expression";
pub const EXPLANATION: &str = "explanation";
pub const ANALYSIS_STEP: &str = "analysisStep";
pub const JSON_PROPERTIES: &str = "jsonProperties";
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
pub const ANNOTATION_STATUS: &str = "annotationStatus";
pub const REVIEW_DATE: &str = "reviewDate";
pub const STEWARD: &str = "steward";
pub const REVIEW_COMMENT: &str = "reviewComment";

/// Review attribute names, the only ones an update may touch.
pub const REVIEW_ATTRIBUTES: [&str; 4] = [ANNOTATION_STATUS, REVIEW_DATE, STEWARD, REVIEW_COMMENT];

#[derive(Debug)]
pub struct AnnotationBuilder<'a> {
    annotation: &'a Annotation,
    log_ctx: &'a LogContext,
}

impl<'a> AnnotationBuilder<'a> {
    pub fn new(annotation: &'a Annotation, log_ctx: &'a LogContext) -> Self {
        Self { annotation, log_ctx }
    }

    pub fn build_instance_properties(&self) -> Result<InstanceProperties> {
        let annotation = self.annotation;

        if annotation.annotation_type.trim().is_empty() {
            log_warn!(self.log_ctx, "ANNOTATION_BUILD_REJECTED", reason = "empty_annotation_type");
            return Err(DiscoveryError::MissingProperty {
                name: ANNOTATION_TYPE.to_string(),
                type_name: ANNOTATION_TYPE_NAME.to_string(),
            });
        }

        if let Some(json) = &annotation.json_properties {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(json) {
                log_warn!(
                    self.log_ctx,
                    "ANNOTATION_BUILD_REJECTED",
                    reason = "invalid_json_properties",
                    error = e.to_string(),
                );
                return Err(DiscoveryError::invalid_parameter(
                    JSON_PROPERTIES,
                    format!("not valid JSON: {}", e),
                ));
            }
        }

        let mut properties = InstanceProperties::new();
        add_string(&mut properties, ANNOTATION_TYPE, Some(&annotation.annotation_type));
        add_string(&mut properties, SUMMARY, annotation.summary.as_deref());
        add_int(&mut properties, CONFIDENCE_LEVEL, annotation.confidence_level);
        add_string(&mut properties, EXPRESSION, annotation.expression.as_deref());
        add_string(&mut properties, EXPLANATION, annotation.explanation.as_deref());
        add_string(&mut properties, ANALYSIS_STEP, annotation.analysis_step.as_deref());
        add_string(&mut properties, JSON_PROPERTIES, annotation.json_properties.as_deref());
        add_string_map(&mut properties, ADDITIONAL_PROPERTIES, Some(&annotation.additional_properties));
        properties.merge(&Self::review_properties(&annotation.review));

        Ok(properties)
    }

    /// Bag holding only the review sub-record.
    pub fn review_properties(review: &AnnotationReview) -> InstanceProperties {
        let mut properties = InstanceProperties::new();
        add_ordinal_enum(&mut properties, ANNOTATION_STATUS, Some(review.status));
        add_date(&mut properties, REVIEW_DATE, review.review_date);
        add_string(&mut properties, STEWARD, review.steward.as_deref());
        add_string(&mut properties, REVIEW_COMMENT, review.comment.as_deref());
        properties
    }

    /// Decode the base annotation attributes. The kind is always `Generic`;
    /// specialised builders fill it in.
    pub fn decode(properties: &InstanceProperties) -> Result<Annotation> {
        let annotation_type =
            get_string(properties, ANNOTATION_TYPE)?.ok_or_else(|| DiscoveryError::MissingProperty {
                name: ANNOTATION_TYPE.to_string(),
                type_name: ANNOTATION_TYPE_NAME.to_string(),
            })?;

        let review = AnnotationReview {
            status: get_ordinal_enum(properties, ANNOTATION_STATUS)?.unwrap_or(AnnotationStatus::New),
            review_date: get_date(properties, REVIEW_DATE)?,
            steward: get_string(properties, STEWARD)?,
            comment: get_string(properties, REVIEW_COMMENT)?,
        };

        Ok(Annotation {
            guid: None,
            annotation_type,
            summary: get_string(properties, SUMMARY)?,
            confidence_level: get_int(properties, CONFIDENCE_LEVEL)?,
            expression: get_string(properties, EXPRESSION)?,
            explanation: get_string(properties, EXPLANATION)?,
            analysis_step: get_string(properties, ANALYSIS_STEP)?,
            json_properties: get_string(properties, JSON_PROPERTIES)?,
            additional_properties: get_string_map(properties, ADDITIONAL_PROPERTIES)?.unwrap_or_default(),
            review,
            kind: AnnotationKind::Generic,
        })
    }
}
