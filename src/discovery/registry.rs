//! Discovery service registry.
//!
//! Maps request types to registered services. Built once while the engine is
//! configured and read-only afterwards, so lookups need no locking.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{DiscoveryError, Result};

use super::connector::{Connector, ConnectorProvider};

lazy_static! {
    /// Request types end up inside report qualified names.
    static ref REQUEST_TYPE_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").unwrap();
}

/// A service as registered against one request type.
#[derive(Clone)]
pub struct RegisteredDiscoveryService {
    pub service_guid: String,
    pub service_name: String,
    pub default_analysis_parameters: BTreeMap<String, String>,
    provider: Arc<dyn ConnectorProvider>,
}

impl RegisteredDiscoveryService {
    pub fn new(service_guid: &str, service_name: &str, provider: impl ConnectorProvider + 'static) -> Self {
        Self {
            service_guid: service_guid.to_string(),
            service_name: service_name.to_string(),
            default_analysis_parameters: BTreeMap::new(),
            provider: Arc::new(provider),
        }
    }

    pub fn with_default_parameter(mut self, name: &str, value: &str) -> Self {
        self.default_analysis_parameters
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn create_connector(&self) -> Result<Box<dyn Connector>> {
        self.provider.create_connector().map_err(|e| {
            DiscoveryError::Configuration(format!(
                "provider for {} could not create a connector: {:#}",
                self.service_name, e
            ))
        })
    }
}

impl fmt::Debug for RegisteredDiscoveryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredDiscoveryService")
            .field("service_guid", &self.service_guid)
            .field("service_name", &self.service_name)
            .field("default_analysis_parameters", &self.default_analysis_parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DiscoveryServiceRegistry {
    services: HashMap<String, RegisteredDiscoveryService>,
}

impl DiscoveryServiceRegistry {
    pub fn builder() -> DiscoveryServiceRegistryBuilder {
        DiscoveryServiceRegistryBuilder::default()
    }

    pub fn lookup(&self, request_type: &str) -> Option<&RegisteredDiscoveryService> {
        self.services.get(request_type)
    }

    /// Registered services keyed by request type, in no particular order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &RegisteredDiscoveryService)> {
        self.services.iter().map(|(request_type, service)| (request_type.as_str(), service))
    }

    pub fn request_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.services.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DiscoveryServiceRegistryBuilder {
    services: HashMap<String, RegisteredDiscoveryService>,
}

impl DiscoveryServiceRegistryBuilder {
    pub fn register(mut self, request_type: &str, service: RegisteredDiscoveryService) -> Result<Self> {
        if !REQUEST_TYPE_PATTERN.is_match(request_type) {
            return Err(DiscoveryError::Configuration(format!(
                "request type {:?} is not a valid name",
                request_type
            )));
        }
        if self.services.contains_key(request_type) {
            return Err(DiscoveryError::Configuration(format!(
                "request type {} is registered twice",
                request_type
            )));
        }

        self.services.insert(request_type.to_string(), service);
        Ok(self)
    }

    pub fn build(self) -> DiscoveryServiceRegistry {
        DiscoveryServiceRegistry {
            services: self.services,
        }
    }
}
