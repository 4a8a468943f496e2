// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all resources and data sources.
//!
//! The provider builds one `Context` when it is configured and hands it to every
//! operation. It carries:
//! - the object client (kube-backed, in-memory, or offline)
//! - the default field manager for server-side apply
//! - polling and retry settings

use crate::client::{ObjectClient, OfflineClient};
use crate::constants::{DEFAULT_FIELD_MANAGER, DEFAULT_POLL_INTERVAL_SECS};
use crate::retry::{default_backoff, ExponentialBackoff};
use std::sync::Arc;
use std::time::Duration;

/// Shared context passed to all operations.
#[derive(Clone)]
pub struct Context {
    /// Client for API operations
    pub client: Arc<dyn ObjectClient>,

    /// Field manager used when a resource does not set `field_manager`
    pub field_manager: String,

    /// The provider does not contact any API server
    pub offline: bool,

    /// Interval between GETs while waiting
    pub poll_interval: Duration,

    /// Backoff for transient client errors
    pub backoff: ExponentialBackoff,
}

impl Context {
    #[must_use]
    pub fn new(client: Arc<dyn ObjectClient>) -> Self {
        Self {
            client,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            offline: false,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            backoff: default_backoff(),
        }
    }

    /// Context of an offline provider: every client call fails.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(Arc::new(OfflineClient))
        }
    }

    #[must_use]
    pub fn with_field_manager(mut self, field_manager: impl Into<String>) -> Self {
        self.field_manager = field_manager.into();
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("field_manager", &self.field_manager)
            .field("offline", &self.offline)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
