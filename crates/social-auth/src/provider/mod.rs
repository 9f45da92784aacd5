// SocialProvider — the capability trait every external-identity provider
// implements.
//
// The concrete handshake (token exchange, signature verification) is the
// provider's problem; this crate only sees the outcome: either a verified
// `ConnectionData`, or a redirect the browser must follow first (the
// suspension point of the multi-request dance), or a denial error.

use async_trait::async_trait;

use social_auth_core::error::Result;

use crate::connection::{Connection, ConnectionCardinality, ConnectionData};
use crate::http::AuthRequest;

mod registry;

pub use registry::ProviderRegistry;

/// What a provider produced for the current request.
#[derive(Debug, Clone)]
pub enum IdentityOutcome {
    /// A verified external identity; the flow can proceed in this request.
    Identity(ConnectionData),
    /// The browser must round-trip to the external provider first. The flow
    /// suspends; a later request to the same path resumes it. Any state
    /// that must survive lives in the session or the provider's own
    /// continuation token, never in process memory.
    Redirect(String),
}

/// A pluggable external-identity provider.
///
/// Implementations are registered once at composition time and invoked
/// concurrently by many requests; they must hold no per-request state.
#[async_trait]
pub trait SocialProvider: Send + Sync + std::fmt::Debug {
    /// Unique provider identifier; the path segment that routes to this
    /// provider (e.g. "github").
    fn id(&self) -> &str;

    /// How many local users one external identity may belong to.
    fn connection_cardinality(&self) -> ConnectionCardinality {
        ConnectionCardinality::OneToOne
    }

    /// Obtain a verified external identity for this request, or the
    /// redirect needed to get one. Provider-side denial or cancellation is
    /// `Err(SocialAuthError::ProviderAuthDenied { .. })`.
    async fn obtain_identity(&self, request: &AuthRequest) -> Result<IdentityOutcome>;

    /// Build the connection that will be persisted for this identity.
    /// The connection-factory role of the capability.
    fn build_connection(&self, data: ConnectionData) -> Connection {
        Connection::new(data)
    }

    /// Where to send the browser after a successful connect. `None` falls
    /// back to the configured default post-connect URL.
    fn post_connect_redirect_url(
        &self,
        _request: &AuthRequest,
        _connection: &Connection,
    ) -> Option<String> {
        None
    }
}
