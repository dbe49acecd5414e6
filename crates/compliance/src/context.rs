//! Explicit context threaded through every registry
//!
//! Built once by the composition root. Replaces any process-wide client
//! singleton: the connection handle, the clock and the configuration all
//! travel with the registry that uses them.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use veil_core::{Clock, SystemClock};

use crate::config::ComplianceConfig;

/// Opaque handle to the external network connection
///
/// The registry never dials it; it is carried so callers can correlate
/// registry state with the cluster it was produced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub cluster: String,
    pub rpc_url: String,
}

/// Shared context for the compliance registries
#[derive(Debug, Clone)]
pub struct ComplianceContext {
    pub connection: ConnectionHandle,
    pub config: ComplianceConfig,
    clock: Arc<dyn Clock>,
}

impl ComplianceContext {
    /// Create a context on the system clock
    pub fn new(config: ComplianceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a context on a caller-supplied clock
    pub fn with_clock(config: ComplianceConfig, clock: Arc<dyn Clock>) -> Self {
        let connection = ConnectionHandle {
            cluster: config.cluster.clone(),
            rpc_url: config.rpc_url.clone(),
        };
        Self {
            connection,
            config,
            clock,
        }
    }

    /// Current time according to the context clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

impl Default for ComplianceContext {
    fn default() -> Self {
        Self::new(ComplianceConfig::default())
    }
}
