//! Structured logging utilities.
//!
//! Every message starts with the context prefix, then an UPPER_SNAKE event
//! name, then `key=value` pairs.

use std::fmt;

/// Logging context for one discovery run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub engine: String,
    pub server: Option<String>,
    pub service: Option<String>,
    pub report_guid: Option<String>,
    pub asset_guid: Option<String>,
}

impl LogContext {
    pub fn new(engine: &str) -> Self {
        Self {
            engine: engine.to_string(),
            server: None,
            service: None,
            report_guid: None,
            asset_guid: None,
        }
    }

    pub fn with_server(&self, server: &str) -> Self {
        Self {
            server: Some(server.to_string()),
            ..self.clone()
        }
    }

    /// Attribute lines to the discovery service doing the work.
    pub fn with_service(&self, service: &str) -> Self {
        Self {
            service: Some(service.to_string()),
            ..self.clone()
        }
    }

    pub fn with_asset(&self, asset_guid: &str) -> Self {
        Self {
            asset_guid: Some(asset_guid.to_string()),
            ..self.clone()
        }
    }

    pub fn with_report(&self, report_guid: &str) -> Self {
        Self {
            report_guid: Some(report_guid.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[engine={}]", self.engine)?;
        if let Some(server) = &self.server {
            write!(f, " [server={}]", server)?;
        }
        if let Some(service) = &self.service {
            write!(f, " [service={}]", service)?;
        }
        if let Some(report) = &self.report_guid {
            write!(f, " [report={}]", report)?;
        }
        if let Some(asset) = &self.asset_guid {
            write!(f, " [asset={}]", asset)?;
        }
        Ok(())
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::error!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}
