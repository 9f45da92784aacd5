// social-auth-test-utils — scripted collaborators for exercising the
// dispatch flow without a real external provider.
//
// `MockProvider` plays the provider seam with a fixed outcome per instance;
// `MockAuthenticationManager` accepts or rejects every token and records
// what it saw.

use std::sync::Mutex;

use async_trait::async_trait;

use social_auth::authentication::{AuthenticationManager, Principal, SocialAuthenticationToken};
use social_auth::connection::{Connection, ConnectionCardinality, ConnectionData};
use social_auth::http::AuthRequest;
use social_auth::provider::{IdentityOutcome, SocialProvider};
use social_auth_core::error::{Result, SocialAuthError};

#[derive(Debug, Clone)]
enum ProviderScript {
    Identity(ConnectionData),
    Redirect(String),
    Deny,
}

/// A provider that always produces the outcome it was constructed with.
#[derive(Debug, Clone)]
pub struct MockProvider {
    id: String,
    script: ProviderScript,
    cardinality: ConnectionCardinality,
    connect_redirect: Option<String>,
}

impl MockProvider {
    /// Always yields `data` as the verified identity.
    pub fn identity(id: impl Into<String>, data: ConnectionData) -> Self {
        Self {
            id: id.into(),
            script: ProviderScript::Identity(data),
            cardinality: ConnectionCardinality::OneToOne,
            connect_redirect: None,
        }
    }

    /// Always suspends with a redirect to `url`.
    pub fn redirect(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: ProviderScript::Redirect(url.into()),
            cardinality: ConnectionCardinality::OneToOne,
            connect_redirect: None,
        }
    }

    /// Always denies the attempt.
    pub fn deny(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: ProviderScript::Deny,
            cardinality: ConnectionCardinality::OneToOne,
            connect_redirect: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: ConnectionCardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Supply a provider-specific post-connect redirect target.
    pub fn with_connect_redirect(mut self, url: impl Into<String>) -> Self {
        self.connect_redirect = Some(url.into());
        self
    }
}

#[async_trait]
impl SocialProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn connection_cardinality(&self) -> ConnectionCardinality {
        self.cardinality
    }

    async fn obtain_identity(&self, _request: &AuthRequest) -> Result<IdentityOutcome> {
        match &self.script {
            ProviderScript::Identity(data) => Ok(IdentityOutcome::Identity(data.clone())),
            ProviderScript::Redirect(url) => Ok(IdentityOutcome::Redirect(url.clone())),
            ProviderScript::Deny => Err(SocialAuthError::ProviderAuthDenied {
                provider_id: self.id.clone(),
            }),
        }
    }

    fn post_connect_redirect_url(
        &self,
        _request: &AuthRequest,
        _connection: &Connection,
    ) -> Option<String> {
        self.connect_redirect.clone()
    }
}

/// Authentication manager that accepts or rejects everything, recording
/// each token it is handed.
#[derive(Debug)]
pub struct MockAuthenticationManager {
    accept: bool,
    tokens: Mutex<Vec<SocialAuthenticationToken>>,
}

impl MockAuthenticationManager {
    /// Accepts every token, binding a principal for its local user id.
    pub fn accepting() -> Self {
        Self {
            accept: true,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every token with `AuthenticationFailed`.
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Tokens seen so far, in call order.
    pub fn tokens(&self) -> Vec<SocialAuthenticationToken> {
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuthenticationManager for MockAuthenticationManager {
    async fn authenticate(&self, token: SocialAuthenticationToken) -> Result<Principal> {
        let local_user_id = token.local_user_id.clone();
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(token);
        if self.accept {
            Ok(Principal::new(local_user_id))
        } else {
            Err(SocialAuthError::AuthenticationFailed(
                "rejected by mock".to_string(),
            ))
        }
    }
}
