//! Suspect duplicate annotation builder.
//!
//! Encodes the base annotation first, then adds the identifier arrays that
//! record why two assets look like duplicates.

use crate::error::Result;
use crate::logging::structured::LogContext;
use crate::model::{Annotation, AnnotationKind, SuspectDuplicate};
use crate::properties::{add_string_array, get_string_array, InstanceProperties};

use super::annotation::AnnotationBuilder;

pub const SUSPECT_DUPLICATE_TYPE_NAME: &str = "SuspectDuplicateAnnotation";

pub const DUPLICATE_ANCHOR_GUIDS: &str = "duplicateAnchorGUIDs";
pub const MATCHING_PROPERTY_NAMES: &str = "matchingPropertyNames";
pub const MATCHING_CLASSIFICATION_NAMES: &str = "matchingClassificationNames";
pub const MATCHING_ATTACHMENT_GUIDS: &str = "matchingAttachmentGUIDs";
pub const MATCHING_RELATIONSHIP_GUIDS: &str = "matchingRelationshipGUIDs";

#[derive(Debug)]
pub struct SuspectDuplicateAnnotationBuilder<'a> {
    base: AnnotationBuilder<'a>,
    details: &'a SuspectDuplicate,
}

impl<'a> SuspectDuplicateAnnotationBuilder<'a> {
    pub fn new(
        annotation: &'a Annotation,
        details: &'a SuspectDuplicate,
        log_ctx: &'a LogContext,
    ) -> Self {
        Self {
            base: AnnotationBuilder::new(annotation, log_ctx),
            details,
        }
    }

    pub fn build_instance_properties(&self) -> Result<InstanceProperties> {
        let mut properties = self.base.build_instance_properties()?;
        let details = self.details;

        let arrays = [
            (DUPLICATE_ANCHOR_GUIDS, &details.duplicate_anchor_guids),
            (MATCHING_PROPERTY_NAMES, &details.matching_property_names),
            (MATCHING_CLASSIFICATION_NAMES, &details.matching_classification_names),
            (MATCHING_ATTACHMENT_GUIDS, &details.matching_attachment_guids),
            (MATCHING_RELATIONSHIP_GUIDS, &details.matching_relationship_guids),
        ];
        for (name, values) in arrays {
            add_string_array(&mut properties, name, Some(values.as_slice()));
        }

        Ok(properties)
    }

    pub fn decode(properties: &InstanceProperties) -> Result<Annotation> {
        let mut annotation = AnnotationBuilder::decode(properties)?;
        let details = SuspectDuplicate {
            duplicate_anchor_guids: get_string_array(properties, DUPLICATE_ANCHOR_GUIDS)?.unwrap_or_default(),
            matching_property_names: get_string_array(properties, MATCHING_PROPERTY_NAMES)?.unwrap_or_default(),
            matching_classification_names: get_string_array(properties, MATCHING_CLASSIFICATION_NAMES)?
                .unwrap_or_default(),
            matching_attachment_guids: get_string_array(properties, MATCHING_ATTACHMENT_GUIDS)?.unwrap_or_default(),
            matching_relationship_guids: get_string_array(properties, MATCHING_RELATIONSHIP_GUIDS)?
                .unwrap_or_default(),
        };
        annotation.kind = AnnotationKind::SuspectDuplicate(details);
        Ok(annotation)
    }
}
