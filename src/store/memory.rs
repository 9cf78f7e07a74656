//! In-memory metadata store.
//!
//! Implements every collaborator contract over a single locked state. Used by
//! the test suite and by embedders that have no repository to talk to.

use std::collections::HashMap;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use regex::Regex;
use uuid::Uuid;

use crate::builders::annotation::REVIEW_ATTRIBUTES;
use crate::builders::report::{DiscoveryAnalysisReportBuilder, DISCOVERY_REQUEST_STATUS, REPORT_TYPE_NAME};
use crate::error::{DiscoveryError, Result};
use crate::model::{AssetProperties, DiscoveryRequestStatus};
use crate::properties::{get_ordinal_enum, InstanceProperties};

use super::entity::{AnnotationAnchor, EntityDetail};
use super::traits::{AnnotationStore, AssetStore, CatalogSearchStore};

#[derive(Debug, Default)]
struct StoreState {
    assets: IndexMap<String, AssetProperties>,
    reports: HashMap<String, EntityDetail>,
    annotations: HashMap<String, EntityDetail>,
    report_annotations: HashMap<String, Vec<String>>,
    child_annotations: HashMap<String, Vec<String>>,
    /// Annotation guid to the guid of the report that owns it.
    annotation_owner: HashMap<String, String>,
    status_history: HashMap<String, Vec<DiscoveryRequestStatus>>,
}

#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    state: RwLock<StoreState>,
}

fn page<T: Clone>(items: &[T], offset: usize, page_size: usize) -> Vec<T> {
    items.iter().skip(offset).take(page_size).cloned().collect()
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset. Assets page back in insertion order.
    pub fn add_asset(&self, asset: AssetProperties) -> String {
        let guid = asset.guid.clone();
        self.state.write().assets.insert(guid.clone(), asset);
        guid
    }

    pub fn asset_count(&self) -> usize {
        self.state.read().assets.len()
    }

    pub fn report_count(&self) -> usize {
        self.state.read().reports.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.state.read().annotations.len()
    }

    /// Every report guid, in no particular order.
    pub fn report_guids(&self) -> Vec<String> {
        self.state.read().reports.keys().cloned().collect()
    }

    /// Every status successfully recorded for a report, oldest first.
    pub fn status_history(&self, report_guid: &str) -> Vec<DiscoveryRequestStatus> {
        self.state
            .read()
            .status_history
            .get(report_guid)
            .cloned()
            .unwrap_or_default()
    }

    pub fn current_status(&self, report_guid: &str) -> Option<DiscoveryRequestStatus> {
        self.status_history(report_guid).last().copied()
    }
}

impl AssetStore for InMemoryMetadataStore {
    fn get_asset(&self, _user_id: &str, asset_guid: &str) -> Result<AssetProperties> {
        self.state
            .read()
            .assets
            .get(asset_guid)
            .cloned()
            .ok_or_else(|| DiscoveryError::not_found("Asset", asset_guid))
    }

    fn page_asset_identifiers(&self, _user_id: &str, offset: usize, page_size: usize) -> Result<Vec<String>> {
        let state = self.state.read();
        Ok(state.assets.keys().skip(offset).take(page_size).cloned().collect())
    }
}

impl AnnotationStore for InMemoryMetadataStore {
    fn create_report(&self, _user_id: &str, properties: InstanceProperties) -> Result<String> {
        let guid = Uuid::new_v4().to_string();
        let initial_status: Option<DiscoveryRequestStatus> =
            get_ordinal_enum(&properties, DISCOVERY_REQUEST_STATUS)?;

        let entity = EntityDetail {
            guid: guid.clone(),
            type_name: REPORT_TYPE_NAME.to_string(),
            create_time: Utc::now(),
            update_time: None,
            properties,
        };

        let mut state = self.state.write();
        state.reports.insert(guid.clone(), entity);
        state
            .status_history
            .insert(guid.clone(), initial_status.into_iter().collect());
        Ok(guid)
    }

    fn set_report_status(&self, _user_id: &str, report_guid: &str, status: DiscoveryRequestStatus) -> Result<()> {
        let mut state = self.state.write();
        let report = state
            .reports
            .get_mut(report_guid)
            .ok_or_else(|| DiscoveryError::not_found("DiscoveryAnalysisReport", report_guid))?;

        let current: Option<DiscoveryRequestStatus> =
            get_ordinal_enum(&report.properties, DISCOVERY_REQUEST_STATUS)?;
        if let Some(current) = current {
            if !current.can_transition_to(status) {
                return Err(DiscoveryError::InvalidStatusTransition {
                    report: report_guid.to_string(),
                    from: current.to_string(),
                    to: status.to_string(),
                });
            }
        }

        report
            .properties
            .merge(&DiscoveryAnalysisReportBuilder::status_properties(status));
        report.update_time = Some(Utc::now());
        state
            .status_history
            .entry(report_guid.to_string())
            .or_default()
            .push(status);
        Ok(())
    }

    fn get_report(&self, _user_id: &str, report_guid: &str) -> Result<EntityDetail> {
        self.state
            .read()
            .reports
            .get(report_guid)
            .cloned()
            .ok_or_else(|| DiscoveryError::not_found("DiscoveryAnalysisReport", report_guid))
    }

    fn create_annotation(
        &self,
        _user_id: &str,
        anchor: &AnnotationAnchor,
        type_name: &str,
        properties: InstanceProperties,
    ) -> Result<String> {
        let mut state = self.state.write();

        let owner = match anchor {
            AnnotationAnchor::Report(guid) if state.reports.contains_key(guid) => guid.clone(),
            AnnotationAnchor::Report(guid) => {
                return Err(DiscoveryError::not_found("DiscoveryAnalysisReport", guid))
            }
            AnnotationAnchor::Annotation(guid) => state
                .annotation_owner
                .get(guid)
                .cloned()
                .ok_or_else(|| DiscoveryError::not_found("Annotation", guid))?,
        };

        let guid = Uuid::new_v4().to_string();
        state.annotations.insert(
            guid.clone(),
            EntityDetail {
                guid: guid.clone(),
                type_name: type_name.to_string(),
                create_time: Utc::now(),
                update_time: None,
                properties,
            },
        );

        state.annotation_owner.insert(guid.clone(), owner);

        let index = match anchor {
            AnnotationAnchor::Report(report) => state.report_annotations.entry(report.clone()),
            AnnotationAnchor::Annotation(parent) => state.child_annotations.entry(parent.clone()),
        };
        index.or_default().push(guid.clone());
        Ok(guid)
    }

    fn update_annotation(&self, _user_id: &str, annotation_guid: &str, properties: InstanceProperties) -> Result<()> {
        if let Some(name) = properties.names().find(|name| !REVIEW_ATTRIBUTES.contains(name)) {
            return Err(DiscoveryError::invalid_parameter(
                name,
                "only review attributes may change once an annotation is written",
            ));
        }

        let mut state = self.state.write();
        let annotation = state
            .annotations
            .get_mut(annotation_guid)
            .ok_or_else(|| DiscoveryError::not_found("Annotation", annotation_guid))?;
        for name in REVIEW_ATTRIBUTES {
            annotation.properties.remove(name);
        }
        annotation.properties.merge(&properties);
        annotation.update_time = Some(Utc::now());
        Ok(())
    }

    fn get_annotations_for_report(
        &self,
        _user_id: &str,
        report_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>> {
        let state = self.state.read();
        if !state.reports.contains_key(report_guid) {
            return Err(DiscoveryError::not_found("DiscoveryAnalysisReport", report_guid));
        }
        let guids = state.report_annotations.get(report_guid).map(Vec::as_slice).unwrap_or(&[]);
        Ok(page(guids, offset, page_size)
            .iter()
            .filter_map(|guid| state.annotations.get(guid).cloned())
            .collect())
    }

    fn get_child_annotations(
        &self,
        _user_id: &str,
        annotation_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>> {
        let state = self.state.read();
        if !state.annotations.contains_key(annotation_guid) {
            return Err(DiscoveryError::not_found("Annotation", annotation_guid));
        }
        let guids = state.child_annotations.get(annotation_guid).map(Vec::as_slice).unwrap_or(&[]);
        Ok(page(guids, offset, page_size)
            .iter()
            .filter_map(|guid| state.annotations.get(guid).cloned())
            .collect())
    }

    fn get_annotation(&self, _user_id: &str, annotation_guid: &str) -> Result<EntityDetail> {
        self.state
            .read()
            .annotations
            .get(annotation_guid)
            .cloned()
            .ok_or_else(|| DiscoveryError::not_found("Annotation", annotation_guid))
    }

    fn annotation_report(&self, _user_id: &str, annotation_guid: &str) -> Result<String> {
        self.state
            .read()
            .annotation_owner
            .get(annotation_guid)
            .cloned()
            .ok_or_else(|| DiscoveryError::not_found("Annotation", annotation_guid))
    }
}

impl CatalogSearchStore for InMemoryMetadataStore {
    fn find_assets(&self, _user_id: &str, search: &str, offset: usize, page_size: usize) -> Result<Vec<String>> {
        let pattern = Regex::new(search)
            .map_err(|e| DiscoveryError::invalid_parameter("searchString", e.to_string()))?;

        let state = self.state.read();
        let matches: Vec<String> = state
            .assets
            .values()
            .filter(|asset| {
                pattern.is_match(&asset.qualified_name)
                    || asset.display_name.as_deref().map_or(false, |name| pattern.is_match(name))
            })
            .map(|asset| asset.guid.clone())
            .collect();
        Ok(page(&matches, offset, page_size))
    }
}
