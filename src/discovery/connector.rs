//! Plugin contract.
//!
//! A registered provider hands out `Connector`s. Only connectors that expose
//! the discovery service capability can be run by the engine; the check
//! happens when the service handler is built, before any thread is launched.

use super::context::DiscoveryContext;

/// Any connector a provider can produce.
pub trait Connector: Send {
    fn connector_name(&self) -> &str;

    /// Hand over the discovery service capability, if this connector has it.
    /// Discovery services override this with `Some(self)`.
    fn into_discovery_service(self: Box<Self>) -> Option<Box<dyn DiscoveryService>> {
        None
    }
}

/// Analysis logic run against one asset.
pub trait DiscoveryService: Send {
    fn set_context(&mut self, context: DiscoveryContext);

    fn set_name(&mut self, name: &str);

    /// Run the analysis to completion.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Release resources. Called after `start` returns.
    fn disconnect(&mut self) -> anyhow::Result<()>;
}

/// Factory registered for a request type. Each run gets a fresh connector.
pub trait ConnectorProvider: Send + Sync {
    fn create_connector(&self) -> anyhow::Result<Box<dyn Connector>>;
}

impl<F> ConnectorProvider for F
where
    F: Fn() -> anyhow::Result<Box<dyn Connector>> + Send + Sync,
{
    fn create_connector(&self) -> anyhow::Result<Box<dyn Connector>> {
        self()
    }
}
