//! Discovery engine handler.
//!
//! Entry point for discovery requests:
//! 1. Validate the caller and the engine state
//! 2. Resolve the request type to a registered service
//! 3. Create the report (WAITING) and mark it ACTIVATING
//! 4. Build the context and service handler
//! 5. Launch the handler on its own thread and return the report guid
//!
//! Anything that goes wrong after step 5 is only visible through report
//! status and the log.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};

use crate::builders::{annotation_from_entity, report_from_entity, AnnotationBuilder, DiscoveryAnalysisReportBuilder};
use crate::config::{EngineConfig, UnknownRequestTypePolicy};
use crate::error::{DiscoveryError, Result};
use crate::logging::structured::LogContext;
use crate::model::{Annotation, AnnotationReview, DiscoveryAnalysisReport, DiscoveryRequestStatus};
use crate::store::{AnnotationStore, AssetStore, CatalogSearchStore};
use crate::{log_debug, log_error, log_info, log_warn};

use super::context::{merge_analysis_parameters, DiscoveryAnnotationStore, DiscoveryContext};
use super::registry::{DiscoveryServiceRegistry, RegisteredDiscoveryService};
use super::service::DiscoveryServiceHandler;

/// Outcome of a bulk scan. Dispatched runs may still be in flight.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub page_requests: usize,
    pub reports: Vec<String>,
    pub skipped: usize,
}

/// Hands out strictly increasing timestamps so report names never collide.
#[derive(Debug, Default)]
struct ReportClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl ReportClock {
    fn next(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::nanoseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

pub struct DiscoveryEngineHandler {
    config: EngineConfig,
    registry: RwLock<Option<Arc<DiscoveryServiceRegistry>>>,
    asset_store: Arc<dyn AssetStore>,
    annotation_store: Arc<dyn AnnotationStore>,
    catalog_store: Arc<dyn CatalogSearchStore>,
    clock: ReportClock,
    log_ctx: LogContext,
}

impl DiscoveryEngineHandler {
    /// Create an engine with no services configured.
    pub fn new(
        config: EngineConfig,
        asset_store: Arc<dyn AssetStore>,
        annotation_store: Arc<dyn AnnotationStore>,
        catalog_store: Arc<dyn CatalogSearchStore>,
    ) -> Result<Self> {
        config.validate()?;
        let log_ctx = LogContext::new(&config.engine_name).with_server(&config.server_name);
        Ok(Self {
            config,
            registry: RwLock::new(None),
            asset_store,
            annotation_store,
            catalog_store,
            clock: ReportClock::default(),
            log_ctx,
        })
    }

    /// Create an engine over one store that plays every collaborator role.
    pub fn with_store<S>(config: EngineConfig, store: Arc<S>) -> Result<Self>
    where
        S: AssetStore + AnnotationStore + CatalogSearchStore + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install the service registry. It is read-only from here on.
    pub fn configure(&self, registry: DiscoveryServiceRegistry) {
        for (request_type, service) in registry.services() {
            log_debug!(
                self.log_ctx.with_service(&service.service_name),
                "DISCOVERY_SERVICE_REGISTERED",
                request_type = request_type,
                service_guid = service.service_guid,
            );
        }
        log_info!(
            self.log_ctx,
            "DISCOVERY_ENGINE_CONFIGURED",
            request_types = registry.request_types(),
        );
        *self.registry.write() = Some(Arc::new(registry));
    }

    /// Drop the registry. Runs already launched are unaffected.
    pub fn disconnect(&self) {
        *self.registry.write() = None;
        log_info!(self.log_ctx, "DISCOVERY_ENGINE_DISCONNECTED");
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.read().is_some()
    }

    fn registry(&self) -> Result<Arc<DiscoveryServiceRegistry>> {
        self.registry
            .read()
            .clone()
            .ok_or_else(|| DiscoveryError::EngineNotInitialized {
                engine: self.config.engine_name.clone(),
            })
    }

    fn validate_user(&self, user_id: &str, operation: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(DiscoveryError::invalid_parameter("userId", "must not be empty"));
        }
        if !self.config.is_authorized(user_id) {
            log_warn!(self.log_ctx, "USER_NOT_AUTHORIZED", user = user_id, operation = operation);
            return Err(DiscoveryError::UserNotAuthorized {
                user: user_id.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn validate_guid(name: &str, guid: &str) -> Result<()> {
        if guid.trim().is_empty() {
            return Err(DiscoveryError::invalid_parameter(name, "must not be empty"));
        }
        Ok(())
    }

    /// Zero means "use the maximum"; anything above the maximum is refused.
    fn validate_page_size(&self, page_size: usize) -> Result<usize> {
        match page_size {
            0 => Ok(self.config.max_page_size),
            n if n > self.config.max_page_size => Err(DiscoveryError::invalid_parameter(
                "pageSize",
                format!("{} exceeds the maximum of {}", n, self.config.max_page_size),
            )),
            n => Ok(n),
        }
    }

    /// Look up the service for a request type, applying the unknown request
    /// type policy.
    fn resolve(
        &self,
        registry: &DiscoveryServiceRegistry,
        request_type: &str,
    ) -> Result<Option<RegisteredDiscoveryService>> {
        if let Some(service) = registry.lookup(request_type) {
            return Ok(Some(service.clone()));
        }
        match self.config.unknown_request_type {
            UnknownRequestTypePolicy::Ignore => {
                log_warn!(
                    self.log_ctx,
                    "DISCOVERY_REQUEST_TYPE_UNKNOWN",
                    request_type = request_type,
                    action = "ignored",
                );
                Ok(None)
            }
            UnknownRequestTypePolicy::Reject => {
                Err(DiscoveryError::UnknownRequestType(request_type.to_string()))
            }
        }
    }

    /// Start a discovery run against one asset.
    ///
    /// Returns the new report's guid as soon as the run is launched, or
    /// `None` when the request type is unknown and the policy ignores it.
    pub fn discover_asset(
        &self,
        user_id: &str,
        asset_guid: &str,
        request_type: &str,
        analysis_parameters: &BTreeMap<String, String>,
        annotation_types: &[String],
    ) -> Result<Option<String>> {
        self.validate_user(user_id, "discover_asset")?;
        Self::validate_guid("assetGUID", asset_guid)?;
        Self::validate_guid("discoveryRequestType", request_type)?;

        let registry = self.registry()?;
        let Some(service) = self.resolve(&registry, request_type)? else {
            return Ok(None);
        };

        self.dispatch(user_id, asset_guid, request_type, &service, analysis_parameters, annotation_types)
            .map(Some)
    }

    fn dispatch(
        &self,
        user_id: &str,
        asset_guid: &str,
        request_type: &str,
        service: &RegisteredDiscoveryService,
        requested_parameters: &BTreeMap<String, String>,
        annotation_types: &[String],
    ) -> Result<String> {
        let asset_ctx = self.log_ctx.with_service(&service.service_name).with_asset(asset_guid);

        // Confirms the asset exists before any report is written.
        self.asset_store.get_asset(user_id, asset_guid)?;

        let analysis_parameters =
            merge_analysis_parameters(&service.default_analysis_parameters, requested_parameters);
        let timestamp = self.clock.next();
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);

        let report = DiscoveryAnalysisReport {
            guid: None,
            qualified_name: format!("{}:{}:{}", request_type, asset_guid, stamp),
            display_name: Some(format!("{} of {}", request_type, asset_guid)),
            description: Some(format!(
                "Discovery request {} for asset {} at {}",
                request_type, asset_guid, stamp
            )),
            creation_date: Some(timestamp),
            analysis_parameters: analysis_parameters.clone(),
            discovery_request_status: Some(DiscoveryRequestStatus::Waiting),
            asset_guid: Some(asset_guid.to_string()),
            discovery_engine_guid: Some(self.config.engine_guid.clone()),
            discovery_service_guid: Some(service.service_guid.clone()),
        };
        let properties = DiscoveryAnalysisReportBuilder::new(&report, &asset_ctx).build_instance_properties()?;
        let report_guid = self.annotation_store.create_report(user_id, properties)?;

        let run_ctx = asset_ctx.with_report(&report_guid);
        self.annotation_store
            .set_report_status(user_id, &report_guid, DiscoveryRequestStatus::Activating)?;

        let annotation_store = DiscoveryAnnotationStore::new(
            user_id,
            &report_guid,
            annotation_types.iter().cloned().collect::<HashSet<String>>(),
            self.annotation_store.clone(),
            run_ctx.clone(),
        );
        let context = DiscoveryContext::new(
            user_id,
            asset_guid,
            analysis_parameters,
            self.asset_store.clone(),
            annotation_store,
            self.catalog_store.clone(),
        );

        let handler = service.create_connector().and_then(|connector| {
            DiscoveryServiceHandler::new(
                connector,
                &service.service_name,
                context,
                self.annotation_store.clone(),
                run_ctx.clone(),
            )
        });
        let handler = match handler {
            Ok(handler) => handler,
            Err(e) => {
                log_error!(
                    run_ctx,
                    "DISCOVERY_SERVICE_REJECTED",
                    service = service.service_name,
                    error = e.to_string(),
                );
                self.mark_failed(user_id, &report_guid, &run_ctx);
                return Err(e);
            }
        };

        let launched = thread::Builder::new()
            .name(format!("discovery-{}", report_guid))
            .spawn(move || {
                handler.run();
            });
        if let Err(e) = launched {
            self.mark_failed(user_id, &report_guid, &run_ctx);
            return Err(e.into());
        }

        log_info!(
            run_ctx,
            "DISCOVERY_REQUEST_ACCEPTED",
            request_type = request_type,
            service = service.service_name,
        );
        Ok(report_guid)
    }

    fn mark_failed(&self, user_id: &str, report_guid: &str, ctx: &LogContext) {
        if let Err(e) = self
            .annotation_store
            .set_report_status(user_id, report_guid, DiscoveryRequestStatus::Failed)
        {
            log_error!(ctx, "REPORT_STATUS_UPDATE_FAILED", status = "FAILED", error = e.to_string());
        }
    }

    /// Start a discovery run for every catalogued asset.
    ///
    /// Pages through the asset store until it returns an empty page. Each
    /// asset is dispatched once; a synchronous failure for one asset is
    /// logged and counted as skipped. The scan does not wait for the runs.
    pub fn scan_all_assets(
        &self,
        user_id: &str,
        request_type: &str,
        analysis_parameters: &BTreeMap<String, String>,
        annotation_types: &[String],
    ) -> Result<ScanSummary> {
        self.validate_user(user_id, "scan_all_assets")?;
        Self::validate_guid("discoveryRequestType", request_type)?;

        let registry = self.registry()?;
        let mut summary = ScanSummary::default();
        let Some(service) = self.resolve(&registry, request_type)? else {
            return Ok(summary);
        };

        let page_size = self.config.max_page_size;
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = 0;

        loop {
            let page = self.asset_store.page_asset_identifiers(user_id, offset, page_size)?;
            summary.page_requests += 1;
            if page.is_empty() {
                break;
            }

            for asset_guid in page {
                if !seen.insert(asset_guid.clone()) {
                    continue;
                }
                match self.dispatch(
                    user_id,
                    &asset_guid,
                    request_type,
                    &service,
                    analysis_parameters,
                    annotation_types,
                ) {
                    Ok(report_guid) => summary.reports.push(report_guid),
                    Err(e) => {
                        log_warn!(
                            self.log_ctx.with_asset(&asset_guid),
                            "SCAN_ASSET_SKIPPED",
                            request_type = request_type,
                            error = e.to_string(),
                        );
                        summary.skipped += 1;
                    }
                }
            }
            offset += page_size;
        }

        log_info!(
            self.log_ctx,
            "SCAN_DISPATCH_COMPLETE",
            request_type = request_type,
            pages = summary.page_requests,
            dispatched = summary.reports.len(),
            skipped = summary.skipped,
        );
        Ok(summary)
    }

    pub fn get_discovery_report(&self, user_id: &str, report_guid: &str) -> Result<DiscoveryAnalysisReport> {
        self.validate_user(user_id, "get_discovery_report")?;
        Self::validate_guid("reportGUID", report_guid)?;
        let entity = self.annotation_store.get_report(user_id, report_guid)?;
        report_from_entity(&entity)
    }

    pub fn get_annotations_for_report(
        &self,
        user_id: &str,
        report_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<Annotation>> {
        self.validate_user(user_id, "get_annotations_for_report")?;
        Self::validate_guid("reportGUID", report_guid)?;
        let page_size = self.validate_page_size(page_size)?;
        self.annotation_store
            .get_annotations_for_report(user_id, report_guid, offset, page_size)?
            .iter()
            .map(annotation_from_entity)
            .collect()
    }

    pub fn get_extended_annotations(
        &self,
        user_id: &str,
        annotation_guid: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<Annotation>> {
        self.validate_user(user_id, "get_extended_annotations")?;
        Self::validate_guid("annotationGUID", annotation_guid)?;
        let page_size = self.validate_page_size(page_size)?;
        self.annotation_store
            .get_child_annotations(user_id, annotation_guid, offset, page_size)?
            .iter()
            .map(annotation_from_entity)
            .collect()
    }

    pub fn get_annotation(&self, user_id: &str, annotation_guid: &str) -> Result<Annotation> {
        self.validate_user(user_id, "get_annotation")?;
        Self::validate_guid("annotationGUID", annotation_guid)?;
        let entity = self.annotation_store.get_annotation(user_id, annotation_guid)?;
        annotation_from_entity(&entity)
    }

    /// Record a steward's review. Only the review attributes change.
    pub fn review_annotation(&self, user_id: &str, annotation_guid: &str, review: &AnnotationReview) -> Result<()> {
        self.validate_user(user_id, "review_annotation")?;
        Self::validate_guid("annotationGUID", annotation_guid)?;
        self.annotation_store
            .update_annotation(user_id, annotation_guid, AnnotationBuilder::review_properties(review))?;
        log_info!(
            self.log_ctx,
            "ANNOTATION_REVIEWED",
            annotation = annotation_guid,
            status = review.status.to_string(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::AssetProperties;
    use crate::store::InMemoryMetadataStore;

    fn engine(config: EngineConfig) -> (Arc<InMemoryMetadataStore>, DiscoveryEngineHandler) {
        let store = Arc::new(InMemoryMetadataStore::new());
        store.add_asset(AssetProperties::new("asset-1", "DataFile", "file://a.csv"));
        let engine = DiscoveryEngineHandler::with_store(config, store.clone()).unwrap();
        (store, engine)
    }

    #[test]
    fn test_report_clock_is_strictly_increasing() {
        let clock = ReportClock::default();
        let mut previous = clock.next();
        for _ in 0..1000 {
            let next = clock.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_uninitialized_engine_rejects_requests() {
        let (store, engine) = engine(EngineConfig::default());
        let err = engine
            .discover_asset("user", "asset-1", "pii-scan", &BTreeMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::EngineNotInitialized { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.report_count(), 0);
    }

    #[test]
    fn test_unknown_request_type_policies() {
        let (store, engine) = engine(EngineConfig::default());
        engine.configure(DiscoveryServiceRegistry::default());
        assert_eq!(
            engine
                .discover_asset("user", "asset-1", "pii-scan", &BTreeMap::new(), &[])
                .unwrap(),
            None
        );

        let (_, strict) = engine_with_policy(UnknownRequestTypePolicy::Reject);
        let err = strict
            .discover_asset("user", "asset-1", "pii-scan", &BTreeMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::UnknownRequestType(_)));
        assert_eq!(store.report_count(), 0);
    }

    fn engine_with_policy(policy: UnknownRequestTypePolicy) -> (Arc<InMemoryMetadataStore>, DiscoveryEngineHandler) {
        let (store, engine) = engine(EngineConfig::default().with_unknown_request_type(policy));
        engine.configure(DiscoveryServiceRegistry::default());
        (store, engine)
    }

    #[test]
    fn test_unauthorized_user() {
        let (_, engine) = engine(EngineConfig::default().with_authorized_users(&["alice"]));
        engine.configure(DiscoveryServiceRegistry::default());
        let err = engine
            .discover_asset("mallory", "asset-1", "pii-scan", &BTreeMap::new(), &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_page_size_bounds() {
        let (_, engine) = engine(EngineConfig::default().with_max_page_size(5));
        assert_eq!(engine.validate_page_size(0).unwrap(), 5);
        assert_eq!(engine.validate_page_size(3).unwrap(), 3);
        assert!(engine.validate_page_size(6).is_err());
    }

    #[test]
    fn test_disconnect_uninitializes() {
        let (_, engine) = engine(EngineConfig::default());
        engine.configure(DiscoveryServiceRegistry::default());
        assert!(engine.is_initialized());
        engine.disconnect();
        assert!(!engine.is_initialized());
    }
}
