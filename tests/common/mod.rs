//! Shared fixtures for the engine scenarios.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use discovery_core::model::{
    Annotation, AssetProperties, DiscoveryRequestStatus, SuspectDuplicate,
};
use discovery_core::properties::InstanceProperties;
use discovery_core::store::{
    AnnotationAnchor, AnnotationStore, AssetStore, EntityDetail, InMemoryMetadataStore,
};
use discovery_core::{Connector, DiscoveryContext, DiscoveryError, DiscoveryService, Result};

pub const USER: &str = "discovery-user";

/// Poll until the report reaches a terminal status.
pub fn wait_for_terminal(store: &InMemoryMetadataStore, report_guid: &str) -> DiscoveryRequestStatus {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = store.current_status(report_guid) {
            if status.is_terminal() {
                return status;
            }
        }
        assert!(Instant::now() < deadline, "report {} never finished", report_guid);
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Poll until `condition` holds.
pub fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition never held");
        std::thread::sleep(Duration::from_millis(5));
    }
}

pub fn catalog(guids: &[&str]) -> Arc<InMemoryMetadataStore> {
    let store = Arc::new(InMemoryMetadataStore::new());
    for guid in guids {
        store.add_asset(
            AssetProperties::new(guid, "DataFile", &format!("file://catalog/{}.csv", guid))
                .with_display_name(&format!("{} data", guid)),
        );
    }
    store
}

/// Asset store that records every paging call.
pub struct CountingAssetStore {
    pub inner: Arc<InMemoryMetadataStore>,
    pub page_calls: Mutex<Vec<(usize, usize)>>,
}

impl CountingAssetStore {
    pub fn new(inner: Arc<InMemoryMetadataStore>) -> Self {
        Self {
            inner,
            page_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.page_calls.lock().clone()
    }
}

impl AssetStore for CountingAssetStore {
    fn get_asset(&self, user_id: &str, asset_guid: &str) -> Result<AssetProperties> {
        self.inner.get_asset(user_id, asset_guid)
    }

    fn page_asset_identifiers(&self, user_id: &str, offset: usize, page_size: usize) -> Result<Vec<String>> {
        self.page_calls.lock().push((offset, page_size));
        self.inner.page_asset_identifiers(user_id, offset, page_size)
    }
}

/// Asset store serving fixed pages, indexed by `offset / page_size`.
pub struct ScriptedPagesAssetStore {
    pub inner: Arc<InMemoryMetadataStore>,
    pub pages: Vec<Vec<String>>,
    pub page_calls: Mutex<usize>,
}

impl ScriptedPagesAssetStore {
    pub fn new(inner: Arc<InMemoryMetadataStore>, pages: &[&[&str]]) -> Self {
        Self {
            inner,
            pages: pages
                .iter()
                .map(|page| page.iter().map(|guid| guid.to_string()).collect())
                .collect(),
            page_calls: Mutex::new(0),
        }
    }
}

impl AssetStore for ScriptedPagesAssetStore {
    fn get_asset(&self, user_id: &str, asset_guid: &str) -> Result<AssetProperties> {
        self.inner.get_asset(user_id, asset_guid)
    }

    fn page_asset_identifiers(&self, _user_id: &str, offset: usize, page_size: usize) -> Result<Vec<String>> {
        *self.page_calls.lock() += 1;
        Ok(self.pages.get(offset / page_size).cloned().unwrap_or_default())
    }
}

/// Annotation store that refuses to record one particular status.
pub struct StatusRefusingStore {
    pub inner: Arc<InMemoryMetadataStore>,
    pub refused_status: DiscoveryRequestStatus,
    pub refused: Mutex<Vec<String>>,
}

impl StatusRefusingStore {
    pub fn new(inner: Arc<InMemoryMetadataStore>, refused_status: DiscoveryRequestStatus) -> Self {
        Self {
            inner,
            refused_status,
            refused: Mutex::new(Vec::new()),
        }
    }
}

impl AnnotationStore for StatusRefusingStore {
    fn create_report(&self, user_id: &str, properties: InstanceProperties) -> Result<String> {
        self.inner.create_report(user_id, properties)
    }

    fn set_report_status(&self, user_id: &str, report_guid: &str, status: DiscoveryRequestStatus) -> Result<()> {
        if status == self.refused_status {
            self.refused.lock().push(report_guid.to_string());
            return Err(DiscoveryError::StoreUnavailable("repository connection reset".to_string()));
        }
        self.inner.set_report_status(user_id, report_guid, status)
    }

    fn get_report(&self, user_id: &str, report_guid: &str) -> Result<EntityDetail> {
        self.inner.get_report(user_id, report_guid)
    }

    fn create_annotation(
        &self,
        user_id: &str,
        anchor: &AnnotationAnchor,
        type_name: &str,
        properties: InstanceProperties,
    ) -> Result<String> {
        self.inner.create_annotation(user_id, anchor, type_name, properties)
    }

    fn update_annotation(&self, user_id: &str, annotation_guid: &str, properties: InstanceProperties) -> Result<()> {
        self.inner.update_annotation(user_id, annotation_guid, properties)
    }

    fn get_annotations_for_report(
        &self,
        user_id: &str,
        report_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>> {
        self.inner.get_annotations_for_report(user_id, report_guid, offset, page_size)
    }

    fn get_child_annotations(
        &self,
        user_id: &str,
        annotation_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<EntityDetail>> {
        self.inner.get_child_annotations(user_id, annotation_guid, offset, page_size)
    }

    fn get_annotation(&self, user_id: &str, annotation_guid: &str) -> Result<EntityDetail> {
        self.inner.get_annotation(user_id, annotation_guid)
    }

    fn annotation_report(&self, user_id: &str, annotation_guid: &str) -> Result<String> {
        self.inner.annotation_report(user_id, annotation_guid)
    }
}

/// Writes a schema annotation on the report and one refinement under it.
#[derive(Default)]
pub struct SchemaProfileService {
    name: String,
    context: Option<DiscoveryContext>,
}

impl Connector for SchemaProfileService {
    fn connector_name(&self) -> &str {
        "schema-profile-connector"
    }

    fn into_discovery_service(self: Box<Self>) -> Option<Box<dyn DiscoveryService>> {
        Some(self)
    }
}

impl DiscoveryService for SchemaProfileService {
    fn set_context(&mut self, context: DiscoveryContext) {
        self.context = Some(context);
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn start(&mut self) -> anyhow::Result<()> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no context"))?;
        let asset = context.asset_properties()?;
        let sample = context.analysis_parameter("sampleSize").unwrap_or("all").to_string();
        let store = context.annotation_store();

        let summary = format!("schema of {}", asset.qualified_name);
        let parent = store.add_annotation_to_report(
            &Annotation::new("SchemaAnalysis")
                .with_summary(&summary)
                .with_confidence(75)
                .with_analysis_step(&self.name),
        )?;
        if let Some(parent) = parent {
            store.add_annotation_to_annotation(
                &parent,
                &Annotation::new("SchemaAnalysis").with_summary(&format!("sample={}", sample)),
            )?;
        }
        Ok(())
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Counts how often `start` is reached.
pub struct CountingService {
    pub starts: Arc<AtomicUsize>,
}

impl Connector for CountingService {
    fn connector_name(&self) -> &str {
        "counting-connector"
    }

    fn into_discovery_service(self: Box<Self>) -> Option<Box<dyn DiscoveryService>> {
        Some(self)
    }
}

impl DiscoveryService for CountingService {
    fn set_context(&mut self, _context: DiscoveryContext) {}

    fn set_name(&mut self, _name: &str) {}

    fn start(&mut self) -> anyhow::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Number of reports per asset guid.
pub fn reports_per_asset(store: &InMemoryMetadataStore) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for guid in store.report_guids() {
        let entity = store.get_report(USER, &guid).expect("report exists");
        let report = discovery_core::builders::report_from_entity(&entity).expect("report decodes");
        if let Some(asset) = report.asset_guid {
            *counts.entry(asset).or_insert(0) += 1;
        }
    }
    counts
}

/// Fails inside `start` with the configured message.
pub struct FailingService {
    pub message: &'static str,
}

impl Connector for FailingService {
    fn connector_name(&self) -> &str {
        "failing-connector"
    }

    fn into_discovery_service(self: Box<Self>) -> Option<Box<dyn DiscoveryService>> {
        Some(self)
    }
}

impl DiscoveryService for FailingService {
    fn set_context(&mut self, _context: DiscoveryContext) {}

    fn set_name(&mut self, _name: &str) {}

    fn start(&mut self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(self.message))
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Flags other assets sharing this asset's display name suffix.
#[derive(Default)]
pub struct DuplicateSuspectService {
    context: Option<DiscoveryContext>,
}

impl Connector for DuplicateSuspectService {
    fn connector_name(&self) -> &str {
        "duplicate-suspect-connector"
    }

    fn into_discovery_service(self: Box<Self>) -> Option<Box<dyn DiscoveryService>> {
        Some(self)
    }
}

impl DiscoveryService for DuplicateSuspectService {
    fn set_context(&mut self, context: DiscoveryContext) {
        self.context = Some(context);
    }

    fn set_name(&mut self, _name: &str) {}

    fn start(&mut self) -> anyhow::Result<()> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no context"))?;
        let asset = context.asset_properties()?;
        let display_name = asset.display_name.unwrap_or_default();

        let candidates: Vec<String> = context
            .catalog_store()
            .find_assets(context.user_id(), &format!("^{}$", regex::escape(&display_name)), 0, 50)?
            .into_iter()
            .filter(|guid| guid != context.asset_guid())
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let details = SuspectDuplicate {
            duplicate_anchor_guids: candidates,
            matching_property_names: vec!["displayName".to_string()],
            ..SuspectDuplicate::default()
        };
        context
            .annotation_store()
            .add_annotation_to_report(&Annotation::suspect_duplicate("DuplicateSuspect", details))?;
        Ok(())
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A connector with no discovery service capability.
pub struct CsvReaderConnector;

impl Connector for CsvReaderConnector {
    fn connector_name(&self) -> &str {
        "csv-reader"
    }
}

/// Collects every formatted log line so scenarios can assert on them.
pub struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: parking_lot::const_mutex(Vec::new()),
};
static INSTALL: Once = Once::new();

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.lines
            .lock()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

pub fn capture_logs() {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);
    });
}

pub fn logged_lines_containing(needle: &str) -> Vec<String> {
    LOGGER
        .lines
        .lock()
        .iter()
        .filter(|line| line.contains(needle))
        .cloned()
        .collect()
}
