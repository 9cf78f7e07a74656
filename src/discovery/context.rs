//! Discovery context.
//!
//! Built once per discovery request and handed to the service. The embedded
//! annotation store is bound to that request's report, so a context is never
//! reused for a second run.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::builders::{annotation_from_entity, encode_annotation, report_from_entity, AnnotationBuilder};
use crate::error::{DiscoveryError, Result};
use crate::logging::structured::LogContext;
use crate::{log_debug, log_warn};
use crate::model::{Annotation, AnnotationReview, AssetProperties, DiscoveryAnalysisReport};
use crate::store::{AnnotationAnchor, AnnotationStore, AssetStore, CatalogSearchStore};

/// Merge caller parameters over the registered defaults. Caller values win.
pub fn merge_analysis_parameters(
    defaults: &BTreeMap<String, String>,
    requested: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(requested.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Annotation store view bound to one report. Writes that would reach into
/// another report's annotations are refused.
#[derive(Clone)]
pub struct DiscoveryAnnotationStore {
    user_id: String,
    report_guid: String,
    annotation_types: Arc<HashSet<String>>,
    store: Arc<dyn AnnotationStore>,
    log_ctx: LogContext,
}

impl DiscoveryAnnotationStore {
    pub fn new(
        user_id: &str,
        report_guid: &str,
        annotation_types: HashSet<String>,
        store: Arc<dyn AnnotationStore>,
        log_ctx: LogContext,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            report_guid: report_guid.to_string(),
            annotation_types: Arc::new(annotation_types),
            store,
            log_ctx,
        }
    }

    pub fn report_guid(&self) -> &str {
        &self.report_guid
    }

    pub fn annotation_types(&self) -> &HashSet<String> {
        &self.annotation_types
    }

    /// An empty filter accepts every annotation type.
    pub fn wants_annotation_type(&self, annotation_type: &str) -> bool {
        self.annotation_types.is_empty() || self.annotation_types.contains(annotation_type)
    }

    pub fn get_report(&self) -> Result<DiscoveryAnalysisReport> {
        let entity = self.store.get_report(&self.user_id, &self.report_guid)?;
        report_from_entity(&entity)
    }

    /// Attach an annotation directly to the report. Returns `None` when the
    /// annotation type is filtered out.
    pub fn add_annotation_to_report(&self, annotation: &Annotation) -> Result<Option<String>> {
        self.add_annotation(&AnnotationAnchor::Report(self.report_guid.clone()), annotation)
    }

    /// Attach an annotation under an earlier one of this report, refining it.
    pub fn add_annotation_to_annotation(&self, parent_guid: &str, annotation: &Annotation) -> Result<Option<String>> {
        self.ensure_owned(parent_guid)?;
        self.add_annotation(&AnnotationAnchor::Annotation(parent_guid.to_string()), annotation)
    }

    fn add_annotation(&self, anchor: &AnnotationAnchor, annotation: &Annotation) -> Result<Option<String>> {
        if !self.wants_annotation_type(&annotation.annotation_type) {
            log_debug!(self.log_ctx, "ANNOTATION_FILTERED", annotation_type = annotation.annotation_type);
            return Ok(None);
        }

        let (type_name, properties) = encode_annotation(annotation, &self.log_ctx)?;
        let guid = self.store.create_annotation(&self.user_id, anchor, type_name, properties)?;

        log_debug!(
            self.log_ctx,
            "ANNOTATION_CREATED",
            guid = guid,
            type_name = type_name,
            annotation_type = annotation.annotation_type,
            anchor = anchor.guid(),
        );
        Ok(Some(guid))
    }

    /// Rewrite the review sub-record; the finding itself is immutable.
    pub fn update_annotation_review(&self, annotation_guid: &str, review: &AnnotationReview) -> Result<()> {
        self.ensure_owned(annotation_guid)?;
        self.store.update_annotation(
            &self.user_id,
            annotation_guid,
            AnnotationBuilder::review_properties(review),
        )
    }

    fn ensure_owned(&self, annotation_guid: &str) -> Result<()> {
        let owner = self.store.annotation_report(&self.user_id, annotation_guid)?;
        if owner != self.report_guid {
            log_warn!(
                self.log_ctx,
                "ANNOTATION_OWNERSHIP_REJECTED",
                annotation = annotation_guid,
                owner = owner,
            );
            return Err(DiscoveryError::AnnotationNotInReport {
                annotation: annotation_guid.to_string(),
                report: self.report_guid.clone(),
            });
        }
        Ok(())
    }

    pub fn get_annotation(&self, annotation_guid: &str) -> Result<Annotation> {
        let entity = self.store.get_annotation(&self.user_id, annotation_guid)?;
        annotation_from_entity(&entity)
    }

    pub fn get_annotations(&self, offset: usize, page_size: usize) -> Result<Vec<Annotation>> {
        self.store
            .get_annotations_for_report(&self.user_id, &self.report_guid, offset, page_size)?
            .iter()
            .map(annotation_from_entity)
            .collect()
    }

    pub fn get_extended_annotations(
        &self,
        annotation_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<Annotation>> {
        self.store
            .get_child_annotations(&self.user_id, annotation_guid, offset, page_size)?
            .iter()
            .map(annotation_from_entity)
            .collect()
    }
}

/// Everything a discovery service sees of the outside world.
#[derive(Clone)]
pub struct DiscoveryContext {
    user_id: String,
    asset_guid: String,
    analysis_parameters: BTreeMap<String, String>,
    asset_store: Arc<dyn AssetStore>,
    annotation_store: DiscoveryAnnotationStore,
    catalog_store: Arc<dyn CatalogSearchStore>,
}

impl DiscoveryContext {
    pub fn new(
        user_id: &str,
        asset_guid: &str,
        analysis_parameters: BTreeMap<String, String>,
        asset_store: Arc<dyn AssetStore>,
        annotation_store: DiscoveryAnnotationStore,
        catalog_store: Arc<dyn CatalogSearchStore>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            asset_guid: asset_guid.to_string(),
            analysis_parameters,
            asset_store,
            annotation_store,
            catalog_store,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn asset_guid(&self) -> &str {
        &self.asset_guid
    }

    pub fn analysis_parameters(&self) -> &BTreeMap<String, String> {
        &self.analysis_parameters
    }

    pub fn analysis_parameter(&self, name: &str) -> Option<&str> {
        self.analysis_parameters.get(name).map(String::as_str)
    }

    pub fn annotation_types(&self) -> &HashSet<String> {
        self.annotation_store.annotation_types()
    }

    pub fn report_guid(&self) -> &str {
        self.annotation_store.report_guid()
    }

    pub fn annotation_store(&self) -> &DiscoveryAnnotationStore {
        &self.annotation_store
    }

    pub fn asset_properties(&self) -> Result<AssetProperties> {
        self.asset_store.get_asset(&self.user_id, &self.asset_guid)
    }

    pub fn asset_store(&self) -> &dyn AssetStore {
        self.asset_store.as_ref()
    }

    pub fn catalog_store(&self) -> &dyn CatalogSearchStore {
        self.catalog_store.as_ref()
    }
}
