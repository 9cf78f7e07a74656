//! Discovery analysis report builder.

use crate::error::{DiscoveryError, Result};
use crate::log_warn;
use crate::logging::structured::LogContext;
use crate::model::{DiscoveryAnalysisReport, DiscoveryRequestStatus};
use crate::properties::{
    add_date, add_ordinal_enum, add_string, add_string_map, get_date, get_ordinal_enum,
    get_string, get_string_map, InstanceProperties,
};

pub const REPORT_TYPE_NAME: &str = "OpenDiscoveryAnalysisReport";

pub const QUALIFIED_NAME: &str = "qualifiedName";
pub const DISPLAY_NAME: &str = "displayName";
pub const DESCRIPTION: &str = "description";
pub const CREATION_DATE: &str = "creationDate";
pub const ANALYSIS_PARAMETERS: &str = "analysisParameters";
pub const DISCOVERY_REQUEST_STATUS: &str = "discoveryRequestStatus";
pub const ASSET_GUID: &str = "assetGUID";
pub const DISCOVERY_ENGINE_GUID: &str = "discoveryEngineGUID";
pub const DISCOVERY_SERVICE_GUID: &str = "discoveryServiceGUID";

/// Flattens a `DiscoveryAnalysisReport` into its property bag and back.
///
/// The log context names the calling service and server; it only attributes
/// diagnostics.
#[derive(Debug)]
pub struct DiscoveryAnalysisReportBuilder<'a> {
    report: &'a DiscoveryAnalysisReport,
    log_ctx: &'a LogContext,
}

impl<'a> DiscoveryAnalysisReportBuilder<'a> {
    pub fn new(report: &'a DiscoveryAnalysisReport, log_ctx: &'a LogContext) -> Self {
        Self { report, log_ctx }
    }

    pub fn build_instance_properties(&self) -> Result<InstanceProperties> {
        let report = self.report;

        if report.qualified_name.trim().is_empty() {
            log_warn!(self.log_ctx, "REPORT_BUILD_REJECTED", reason = "empty_qualified_name");
            return Err(DiscoveryError::MissingProperty {
                name: QUALIFIED_NAME.to_string(),
                type_name: REPORT_TYPE_NAME.to_string(),
            });
        }

        let mut properties = InstanceProperties::new();
        add_string(&mut properties, QUALIFIED_NAME, Some(&report.qualified_name));
        add_string(&mut properties, DISPLAY_NAME, report.display_name.as_deref());
        add_string(&mut properties, DESCRIPTION, report.description.as_deref());
        add_date(&mut properties, CREATION_DATE, report.creation_date);
        add_string_map(&mut properties, ANALYSIS_PARAMETERS, Some(&report.analysis_parameters));
        add_ordinal_enum(&mut properties, DISCOVERY_REQUEST_STATUS, report.discovery_request_status);
        add_string(&mut properties, ASSET_GUID, report.asset_guid.as_deref());
        add_string(&mut properties, DISCOVERY_ENGINE_GUID, report.discovery_engine_guid.as_deref());
        add_string(&mut properties, DISCOVERY_SERVICE_GUID, report.discovery_service_guid.as_deref());

        Ok(properties)
    }

    /// Bag holding only the status attribute, for status updates.
    pub fn status_properties(status: DiscoveryRequestStatus) -> InstanceProperties {
        let mut properties = InstanceProperties::new();
        add_ordinal_enum(&mut properties, DISCOVERY_REQUEST_STATUS, Some(status));
        properties
    }

    pub fn decode(properties: &InstanceProperties) -> Result<DiscoveryAnalysisReport> {
        let qualified_name =
            get_string(properties, QUALIFIED_NAME)?.ok_or_else(|| DiscoveryError::MissingProperty {
                name: QUALIFIED_NAME.to_string(),
                type_name: REPORT_TYPE_NAME.to_string(),
            })?;

        Ok(DiscoveryAnalysisReport {
            guid: None,
            qualified_name,
            display_name: get_string(properties, DISPLAY_NAME)?,
            description: get_string(properties, DESCRIPTION)?,
            creation_date: get_date(properties, CREATION_DATE)?,
            analysis_parameters: get_string_map(properties, ANALYSIS_PARAMETERS)?.unwrap_or_default(),
            discovery_request_status: get_ordinal_enum(properties, DISCOVERY_REQUEST_STATUS)?,
            asset_guid: get_string(properties, ASSET_GUID)?,
            discovery_engine_guid: get_string(properties, DISCOVERY_ENGINE_GUID)?,
            discovery_service_guid: get_string(properties, DISCOVERY_SERVICE_GUID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn ctx() -> LogContext {
        LogContext::new("engine").with_server("server").with_service("test")
    }

    fn sample_report() -> DiscoveryAnalysisReport {
        DiscoveryAnalysisReport {
            guid: None,
            qualified_name: "schema-profile:asset-1:2026-01-29T00:00:00.000000001Z".to_string(),
            display_name: Some("schema-profile".to_string()),
            description: Some("Profile of asset-1".to_string()),
            creation_date: Some(Utc::now()),
            analysis_parameters: BTreeMap::from([("sampleSize".to_string(), "10".to_string())]),
            discovery_request_status: Some(DiscoveryRequestStatus::Waiting),
            asset_guid: Some("asset-1".to_string()),
            discovery_engine_guid: Some("engine-1".to_string()),
            discovery_service_guid: Some("service-1".to_string()),
        }
    }

    #[test]
    fn test_report_round_trip() {
        let report = sample_report();
        let properties = DiscoveryAnalysisReportBuilder::new(&report, &ctx())
            .build_instance_properties()
            .unwrap();
        let decoded = DiscoveryAnalysisReportBuilder::decode(&properties).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_unset_fields_are_absent() {
        let report = DiscoveryAnalysisReport::new("bare-report");
        let properties = DiscoveryAnalysisReportBuilder::new(&report, &ctx())
            .build_instance_properties()
            .unwrap();

        let names: Vec<&str> = properties.names().collect();
        assert_eq!(names, vec![QUALIFIED_NAME]);
    }

    #[test]
    fn test_empty_qualified_name_rejected() {
        let report = DiscoveryAnalysisReport::new("  ");
        let err = DiscoveryAnalysisReportBuilder::new(&report, &ctx())
            .build_instance_properties()
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingProperty { .. }));
    }

    #[test]
    fn test_status_stored_as_enum() {
        let properties = DiscoveryAnalysisReportBuilder::status_properties(DiscoveryRequestStatus::InProgress);
        assert!(get_string(&properties, DISCOVERY_REQUEST_STATUS).is_err());
        let status: Option<DiscoveryRequestStatus> =
            get_ordinal_enum(&properties, DISCOVERY_REQUEST_STATUS).unwrap();
        assert_eq!(status, Some(DiscoveryRequestStatus::InProgress));
    }
}
