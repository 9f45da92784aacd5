// social-auth — the social-login dispatch filter and its collaborators.
//
// One filter entry point routes inbound requests to pluggable
// external-identity providers, decides between "connect this account to my
// login" and "log me in with this account", reconciles external identities
// against local users under a cardinality rule, and records unresolved
// sign-in attempts in the browser session across redirect round trips.
//
// Provider handshakes, connection storage, and the authentication manager
// are injected traits; see `social-auth-memory` and
// `social-auth-test-utils` for in-memory implementations.

pub mod attempts;
pub mod authentication;
pub mod connection;
pub mod filter;
pub mod http;
pub mod provider;
pub mod reconciler;
pub mod security_context;
pub mod session;

pub use attempts::SignInAttempts;
pub use authentication::{AuthenticationManager, Principal, SocialAuthenticationToken};
pub use connection::{
    Connection, ConnectionCardinality, ConnectionData, ConnectionKey, ConnectionRepository,
    UsersConnectionRepository,
};
pub use filter::{DispatchOutcome, SocialAuthenticationFilter};
pub use http::{AuthRequest, AuthResponse};
pub use provider::{IdentityOutcome, ProviderRegistry, SocialProvider};
pub use reconciler::ConnectionReconciler;
pub use security_context::SecurityContext;
pub use session::Session;
