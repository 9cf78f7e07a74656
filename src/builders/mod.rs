//! Result builders.
//!
//! Translate domain records into property bags for the metadata store and
//! back again:
//! - `report` - discovery analysis reports
//! - `annotation` - base annotation attributes and the review sub-record
//! - `duplicate` - suspect duplicate annotations, layered on `annotation`

pub mod annotation;
pub mod duplicate;
pub mod report;

pub use annotation::{AnnotationBuilder, ANNOTATION_TYPE_NAME};
pub use duplicate::{SuspectDuplicateAnnotationBuilder, SUSPECT_DUPLICATE_TYPE_NAME};
pub use report::{DiscoveryAnalysisReportBuilder, REPORT_TYPE_NAME};

use crate::error::Result;
use crate::logging::structured::LogContext;
use crate::model::{Annotation, AnnotationKind, DiscoveryAnalysisReport};
use crate::properties::InstanceProperties;
use crate::store::EntityDetail;

/// Encode an annotation with the builder matching its kind.
///
/// Returns the entity type name together with the bag.
pub fn encode_annotation(
    annotation: &Annotation,
    log_ctx: &LogContext,
) -> Result<(&'static str, InstanceProperties)> {
    match &annotation.kind {
        AnnotationKind::Generic => {
            let properties = AnnotationBuilder::new(annotation, log_ctx)
                .build_instance_properties()?;
            Ok((ANNOTATION_TYPE_NAME, properties))
        }
        AnnotationKind::SuspectDuplicate(details) => {
            let properties =
                SuspectDuplicateAnnotationBuilder::new(annotation, details, log_ctx)
                    .build_instance_properties()?;
            Ok((SUSPECT_DUPLICATE_TYPE_NAME, properties))
        }
    }
}

/// Decode a stored annotation entity, choosing the builder by type name.
pub fn annotation_from_entity(entity: &EntityDetail) -> Result<Annotation> {
    let mut annotation = match entity.type_name.as_str() {
        SUSPECT_DUPLICATE_TYPE_NAME => SuspectDuplicateAnnotationBuilder::decode(&entity.properties)?,
        _ => AnnotationBuilder::decode(&entity.properties)?,
    };
    annotation.guid = Some(entity.guid.clone());
    Ok(annotation)
}

pub fn report_from_entity(entity: &EntityDetail) -> Result<DiscoveryAnalysisReport> {
    let mut report = DiscoveryAnalysisReportBuilder::decode(&entity.properties)?;
    report.guid = Some(entity.guid.clone());
    Ok(report)
}
