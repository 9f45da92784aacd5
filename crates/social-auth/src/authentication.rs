// Principal, authentication token, and the authentication-manager
// collaborator seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use social_auth_core::error::Result;

use crate::connection::ConnectionData;

/// A resolved local authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            authorities: Vec::new(),
        }
    }

    pub fn with_authorities(mut self, authorities: Vec<String>) -> Self {
        self.authorities = authorities;
        self
    }
}

/// Token handed to the authentication manager on the login path: the
/// matched local user id plus the external identity that matched it.
#[derive(Debug, Clone)]
pub struct SocialAuthenticationToken {
    pub local_user_id: String,
    pub data: ConnectionData,
}

impl SocialAuthenticationToken {
    pub fn new(local_user_id: impl Into<String>, data: ConnectionData) -> Self {
        Self {
            local_user_id: local_user_id.into(),
            data,
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.data.provider_id
    }
}

/// Authentication-manager collaborator. Verifies the token against local
/// user records and produces the principal to bind. May block on external
/// I/O; failures propagate immediately, the filter does not retry.
#[async_trait]
pub trait AuthenticationManager: Send + Sync {
    async fn authenticate(&self, token: SocialAuthenticationToken) -> Result<Principal>;
}
