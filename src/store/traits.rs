//! Collaborator contracts for the metadata store.
//!
//! The engine never talks to a repository directly; it only sees these three
//! narrow views. Implementations must accept concurrent calls; the engine does
//! no client-side locking.

use crate::error::Result;
use crate::model::{AssetProperties, DiscoveryRequestStatus};
use crate::properties::InstanceProperties;

use super::entity::{AnnotationAnchor, EntityDetail};

/// Read access to catalogued assets.
pub trait AssetStore: Send + Sync {
    fn get_asset(&self, user_id: &str, asset_guid: &str) -> Result<AssetProperties>;

    /// One page of asset identifiers. An empty page ends paging.
    fn page_asset_identifiers(&self, user_id: &str, offset: usize, page_size: usize) -> Result<Vec<String>>;
}

/// Reports and the annotations anchored to them.
pub trait AnnotationStore: Send + Sync {
    fn create_report(&self, user_id: &str, properties: InstanceProperties) -> Result<String>;

    fn set_report_status(&self, user_id: &str, report_guid: &str, status: DiscoveryRequestStatus) -> Result<()>;

    fn get_report(&self, user_id: &str, report_guid: &str) -> Result<EntityDetail>;

    fn create_annotation(
        &self,
        user_id: &str,
        anchor: &AnnotationAnchor,
        type_name: &str,
        properties: InstanceProperties,
    ) -> Result<String>;

    /// Replace the review sub-record of an annotation. Review attributes
    /// missing from `properties` are cleared; any other attribute is refused,
    /// since the finding itself is immutable once written.
    fn update_annotation(&self, user_id: &str, annotation_guid: &str, properties: InstanceProperties) -> Result<()>;

    fn get_annotations_for_report(
        &self,
        user_id: &str,
        report_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>>;

    fn get_child_annotations(
        &self,
        user_id: &str,
        annotation_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>>;

    fn get_annotation(&self, user_id: &str, annotation_guid: &str) -> Result<EntityDetail>;

    /// Guid of the report an annotation belongs to, directly or through its
    /// parent annotations.
    fn annotation_report(&self, user_id: &str, annotation_guid: &str) -> Result<String>;
}

/// Repository-wide search, for services that need neighbourhood context.
pub trait CatalogSearchStore: Send + Sync {
    /// Asset identifiers whose qualified or display name matches the regular
    /// expression `search`.
    fn find_assets(&self, user_id: &str, search: &str, offset: usize, page_size: usize) -> Result<Vec<String>>;
}
