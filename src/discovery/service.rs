//! Discovery service handler.
//!
//! Runs one discovery service against one asset and moves the report
//! through `ACTIVATING -> IN_PROGRESS -> COMPLETED | FAILED`. Nothing raised
//! by the service escapes `run`; outcomes are only visible through report
//! status and the log.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{DiscoveryError, Result};
use crate::logging::structured::LogContext;
use crate::model::DiscoveryRequestStatus;
use crate::store::AnnotationStore;
use crate::{log_debug, log_error, log_info, log_warn};

use super::connector::{Connector, DiscoveryService};
use super::context::DiscoveryContext;

pub struct DiscoveryServiceHandler {
    service_name: String,
    user_id: String,
    asset_guid: String,
    report_guid: String,
    service: Box<dyn DiscoveryService>,
    annotation_store: Arc<dyn AnnotationStore>,
    log_ctx: LogContext,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl DiscoveryServiceHandler {
    /// Bind a connector to its context. Fails when the connector does not
    /// provide the discovery service capability.
    pub fn new(
        connector: Box<dyn Connector>,
        service_name: &str,
        context: DiscoveryContext,
        annotation_store: Arc<dyn AnnotationStore>,
        log_ctx: LogContext,
    ) -> Result<Self> {
        let connector_name = connector.connector_name().to_string();
        let mut service = connector
            .into_discovery_service()
            .ok_or(DiscoveryError::NotDiscoveryService {
                connector: connector_name,
            })?;

        let user_id = context.user_id().to_string();
        let asset_guid = context.asset_guid().to_string();
        let report_guid = context.report_guid().to_string();

        service.set_name(service_name);
        service.set_context(context);

        Ok(Self {
            service_name: service_name.to_string(),
            user_id,
            asset_guid,
            report_guid,
            service,
            annotation_store,
            log_ctx,
        })
    }

    fn set_status(&self, status: DiscoveryRequestStatus) -> Result<()> {
        self.annotation_store
            .set_report_status(&self.user_id, &self.report_guid, status)?;
        log_debug!(self.log_ctx, "REPORT_STATUS_SET", status = status.to_string());
        Ok(())
    }

    /// Record FAILED, swallowing any secondary fault so the original failure
    /// is the one that stays visible.
    fn record_failure(&self) -> DiscoveryRequestStatus {
        if let Err(e) = self.set_status(DiscoveryRequestStatus::Failed) {
            log_error!(
                self.log_ctx,
                "REPORT_STATUS_UPDATE_FAILED",
                status = "FAILED",
                error = e.to_string(),
            );
        }
        DiscoveryRequestStatus::Failed
    }

    fn invoke(
        &mut self,
        step: &str,
        call: impl FnOnce(&mut Box<dyn DiscoveryService>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let service = &mut self.service;
        match panic::catch_unwind(AssertUnwindSafe(|| call(service))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(anyhow::anyhow!(
                "{} panicked: {}",
                step,
                panic_message(payload.as_ref())
            )),
        }
    }

    /// Run the service to completion. Returns the terminal status the handler
    /// tried to record.
    pub fn run(mut self) -> DiscoveryRequestStatus {
        log_info!(self.log_ctx, "DISCOVERY_SERVICE_STARTING", service = self.service_name);

        if let Err(e) = self.set_status(DiscoveryRequestStatus::InProgress) {
            log_error!(
                self.log_ctx,
                "REPORT_STATUS_UPDATE_FAILED",
                status = "IN_PROGRESS",
                error = e.to_string(),
            );
            return self.record_failure();
        }

        if let Err(source) = self.invoke("start", |service| service.start()) {
            let fault = DiscoveryError::ServiceFailed {
                service: self.service_name.clone(),
                source,
            };
            log_error!(
                self.log_ctx,
                "DISCOVERY_SERVICE_FAILED",
                service = self.service_name,
                asset = self.asset_guid,
                report = self.report_guid,
                kind = fault.kind().to_string(),
                error = fault.to_string(),
            );

            if let Err(e) = self.invoke("disconnect", |service| service.disconnect()) {
                log_warn!(
                    self.log_ctx,
                    "DISCOVERY_SERVICE_DISCONNECT_FAILED",
                    service = self.service_name,
                    error = format!("{:#}", e),
                );
            }
            return self.record_failure();
        }

        if let Err(source) = self.invoke("disconnect", |service| service.disconnect()) {
            let fault = DiscoveryError::ServiceFailed {
                service: self.service_name.clone(),
                source,
            };
            log_error!(
                self.log_ctx,
                "DISCOVERY_SERVICE_DISCONNECT_FAILED",
                service = self.service_name,
                asset = self.asset_guid,
                report = self.report_guid,
                error = fault.to_string(),
            );
            return self.record_failure();
        }

        if let Err(e) = self.set_status(DiscoveryRequestStatus::Completed) {
            log_error!(
                self.log_ctx,
                "REPORT_STATUS_UPDATE_FAILED",
                status = "COMPLETED",
                error = e.to_string(),
            );
            return DiscoveryRequestStatus::Completed;
        }

        log_info!(self.log_ctx, "DISCOVERY_SERVICE_COMPLETE", service = self.service_name);
        DiscoveryRequestStatus::Completed
    }
}
