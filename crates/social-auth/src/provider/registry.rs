// Provider registry — id-keyed map of registered provider capabilities.
//
// Registration happens at composition time; lookups happen concurrently on
// every request. The map is guarded, and entries are `Arc`s, so a resolved
// provider stays valid for the remainder of the request even if the
// registry is mutated mid-flight.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use social_auth_core::error::{Result, SocialAuthError};

use super::SocialProvider;

/// Registry of provider capabilities, keyed by provider id.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn SocialProvider>>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry from a list of providers.
    pub fn from_providers(providers: Vec<Arc<dyn SocialProvider>>) -> Self {
        let registry = Self::new();
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    /// Add or replace a provider under its own id.
    pub fn register(&self, provider: Arc<dyn SocialProvider>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(provider.id().to_string(), provider);
    }

    /// Resolve a provider by id.
    pub fn resolve(&self, provider_id: &str) -> Result<Arc<dyn SocialProvider>> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| SocialAuthError::UnknownProvider {
                provider_id: provider_id.to_string(),
            })
    }

    /// All registered provider ids.
    pub fn provider_ids(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
