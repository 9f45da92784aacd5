// Connection data model and the storage collaborator traits.
//
// `ConnectionKey` is the durable identity of an external account and the
// dedup key everywhere; `ConnectionData` is the full immutable record a
// provider hands back; `Connection` is what gets persisted against a local
// user. Storage itself lives behind `UsersConnectionRepository`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use social_auth_core::error::Result;

/// Identity of an external account: provider id plus the user id the
/// provider assigned. Equality and hashing are exactly this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionKey {
    pub provider_id: String,
    pub provider_user_id: String,
}

impl ConnectionKey {
    pub fn new(provider_id: impl Into<String>, provider_user_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_user_id: provider_user_id.into(),
        }
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider_id, self.provider_user_id)
    }
}

/// Full external-account record produced by a provider: key, profile
/// attributes, and access credentials. Immutable value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub provider_id: String,
    pub provider_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) the access token expires at, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl ConnectionData {
    /// A record with only the identifying pair set.
    pub fn new(provider_id: impl Into<String>, provider_user_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_user_id: provider_user_id.into(),
            display_name: None,
            profile_url: None,
            image_url: None,
            access_token: None,
            secret: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey::new(self.provider_id.clone(), self.provider_user_id.clone())
    }
}

/// Whether one external identity may belong to more than one local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionCardinality {
    /// One external account, one local user. Supports both sign-in and
    /// connect.
    OneToOne,
    /// One external account may be connected to several local users.
    /// Connect-only: sign-in cannot pick a unique principal.
    OneToMany,
}

/// The persisted link between a local user and an external identity.
/// Built by the provider capability, written once by the reconciler,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub data: ConnectionData,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Connection {
    pub fn new(data: ConnectionData) -> Self {
        Self {
            data,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn key(&self) -> ConnectionKey {
        self.data.key()
    }
}

/// Per-user connection store. Obtained from `UsersConnectionRepository`
/// for a specific local user id.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Persist a connection for this repository's user.
    async fn add_connection(&self, connection: Connection) -> Result<()>;

    /// All connections stored for this repository's user.
    async fn connections(&self) -> Result<Vec<Connection>>;
}

/// Cross-user connection storage collaborator.
#[async_trait]
pub trait UsersConnectionRepository: Send + Sync {
    /// Local user ids that hold a connection to any of the given provider
    /// user ids under `provider_id`.
    async fn find_user_ids_connected_to(
        &self,
        provider_id: &str,
        provider_user_ids: &HashSet<String>,
    ) -> Result<HashSet<String>>;

    /// The per-user connection store for `user_id`, creating it if needed.
    async fn create_connection_repository(
        &self,
        user_id: &str,
    ) -> Result<Arc<dyn ConnectionRepository>>;
}
