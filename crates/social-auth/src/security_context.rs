// SecurityContext — the ambient authenticated-principal holder for one
// request-processing unit.
//
// Clones share the same slot, so the filter and the surrounding handler
// observe the same principal. The filter's failure handler clears it on
// every failure exit path so a failed attempt cannot leak into later
// requests sharing the context.

use std::sync::{Arc, Mutex};

use crate::authentication::Principal;

/// Per-request holder of the authenticated principal.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Arc<Mutex<Option<Principal>>>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a principal, replacing any previous one.
    pub fn bind(&self, principal: Principal) {
        let mut slot = self
            .principal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(principal);
    }

    /// Clear the bound principal.
    pub fn clear(&self) {
        let mut slot = self
            .principal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    /// The currently bound principal, if any.
    pub fn authentication(&self) -> Option<Principal> {
        self.principal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication().is_some()
    }
}
