//! Ambient provider registry
//!
//! Explicit, injectable stand-in for "publish the active provider where
//! other code in the process can find it". Hosts that embed an injected
//! wallet provider place it here; connections publish themselves opt-in.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::infrastructure::ethereum::EvmProvider;

#[derive(Default)]
struct Inner {
    injected: Option<Arc<dyn EvmProvider>>,
    active: Option<Arc<dyn EvmProvider>>,
}

/// Shared registry handle; clones refer to the same slots.
#[derive(Clone, Default)]
pub struct AmbientRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl AmbientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the host's injected wallet provider.
    pub async fn set_injected(&self, provider: Arc<dyn EvmProvider>) {
        self.inner.write().await.injected = Some(provider);
    }

    pub async fn injected(&self) -> Option<Arc<dyn EvmProvider>> {
        self.inner.read().await.injected.clone()
    }

    /// Publish the provider a connection is actively using.
    pub async fn publish(&self, provider: Arc<dyn EvmProvider>) {
        self.inner.write().await.active = Some(provider);
    }

    pub async fn active(&self) -> Option<Arc<dyn EvmProvider>> {
        self.inner.read().await.active.clone()
    }

    pub async fn clear_active(&self) {
        self.inner.write().await.active = None;
    }
}

impl std::fmt::Debug for AmbientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_read() {
            Ok(inner) => f
                .debug_struct("AmbientRegistry")
                .field("injected", &inner.injected.is_some())
                .field("active", &inner.active.is_some())
                .finish(),
            Err(_) => f.write_str("AmbientRegistry { <locked> }"),
        }
    }
}
