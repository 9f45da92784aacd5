// SocialAuthenticationFilter — the single dispatch entry point.
//
// Routes inbound requests under `base_path` to the registered provider,
// chooses between the connect flow (link an external account to the
// already-authenticated user) and the login flow (authenticate with an
// external account), and translates every failure into a redirect carrying
// a stable error code. The security context is cleared on every failure
// exit so a failed attempt never leaves a half-bound principal behind.

use std::collections::HashSet;
use std::sync::Arc;

use social_auth_core::error::ErrorCode;
use social_auth_core::logger::AuthLogger;
use social_auth_core::options::SocialAuthOptions;

use crate::attempts::SignInAttempts;
use crate::authentication::{AuthenticationManager, SocialAuthenticationToken};
use crate::connection::{ConnectionCardinality, ConnectionData};
use crate::http::{append_query_param, AuthRequest, AuthResponse};
use crate::provider::{IdentityOutcome, ProviderRegistry, SocialProvider};
use crate::reconciler::ConnectionReconciler;
use crate::security_context::SecurityContext;
use crate::session::Session;

/// Terminal result of one pass through the filter.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Login completed; the principal is bound in the security context.
    Authenticated(AuthResponse),
    /// Connect completed; a connection was persisted for the current
    /// principal, which is left untouched.
    Connected(AuthResponse),
    /// No local account matched; the attempt was recorded in the session
    /// and the browser is sent to the signup page.
    SignupPending(AuthResponse),
    /// The provider requires a redirect round trip before it can yield an
    /// identity. No state was committed.
    ProviderPending(AuthResponse),
    /// A failure redirect carrying `code` in the failure URL.
    Failed {
        code: ErrorCode,
        response: AuthResponse,
    },
    /// The request is not for this filter; the caller continues its chain.
    Skipped,
}

impl DispatchOutcome {
    /// The response to write, if the request was handled.
    pub fn response(&self) -> Option<&AuthResponse> {
        match self {
            DispatchOutcome::Authenticated(response)
            | DispatchOutcome::Connected(response)
            | DispatchOutcome::SignupPending(response)
            | DispatchOutcome::ProviderPending(response)
            | DispatchOutcome::Failed { response, .. } => Some(response),
            DispatchOutcome::Skipped => None,
        }
    }
}

pub struct SocialAuthenticationFilter {
    registry: Arc<ProviderRegistry>,
    reconciler: ConnectionReconciler,
    auth_manager: Arc<dyn AuthenticationManager>,
    options: SocialAuthOptions,
    logger: AuthLogger,
}

impl SocialAuthenticationFilter {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        reconciler: ConnectionReconciler,
        auth_manager: Arc<dyn AuthenticationManager>,
        options: SocialAuthOptions,
    ) -> Self {
        Self {
            registry,
            reconciler,
            auth_manager,
            options,
            logger: AuthLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: AuthLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &SocialAuthOptions {
        &self.options
    }

    /// Process one request.
    ///
    /// Requests outside `base_path` come back as `Skipped`, as do requests
    /// from an already-authenticated caller that do not carry the connect
    /// parameter; everything else terminates in a redirect outcome.
    pub async fn handle(
        &self,
        request: &AuthRequest,
        session: Option<&Session>,
        context: &SecurityContext,
    ) -> DispatchOutcome {
        let Some(provider_id) = self.provider_id_from_path(&request.path) else {
            return DispatchOutcome::Skipped;
        };

        let provider = match self.registry.resolve(&provider_id) {
            Ok(provider) => provider,
            Err(err) => {
                self.logger
                    .warn(&format!("no provider registered for '{provider_id}'"));
                return self.fail(context, err.code());
            }
        };

        let connecting = request
            .query_param(&self.options.connect_param)
            .map(|value| value == "true")
            .unwrap_or(false);

        if context.is_authenticated() {
            if !connecting {
                // Already logged in and not asking to link an account.
                return DispatchOutcome::Skipped;
            }
            return self.connect(provider.as_ref(), request, session, context).await;
        }

        self.login(provider.as_ref(), request, session, context).await
    }

    /// Link the provider identity to the currently authenticated user.
    async fn connect(
        &self,
        provider: &dyn SocialProvider,
        request: &AuthRequest,
        session: Option<&Session>,
        context: &SecurityContext,
    ) -> DispatchOutcome {
        let data = match self.obtain_identity(provider, request, context).await {
            Identity::Data(data) => data,
            Identity::Terminal(outcome) => return outcome,
        };

        // `is_authenticated` was checked in `handle`; the principal can only
        // vanish here if another thread cleared the shared context.
        let Some(principal) = context.authentication() else {
            return self.fail(context, ErrorCode::AuthenticationFailed);
        };

        let connection = match self
            .reconciler
            .add_connection(provider, &principal.user_id, data.clone())
            .await
        {
            Ok(connection) => connection,
            Err(err) => {
                self.logger.warn(&format!(
                    "connect failed for user '{}' on '{}': {err}",
                    principal.user_id,
                    provider.id()
                ));
                return self.fail(context, err.code());
            }
        };

        // A pending signup attempt for this identity is now obsolete.
        SignInAttempts::remove(session, &connection.key());

        self.logger.info(&format!(
            "connected '{}' to user '{}'",
            connection.key(),
            principal.user_id
        ));
        let target = provider
            .post_connect_redirect_url(request, &connection)
            .unwrap_or_else(|| self.options.post_connect_url.clone());
        DispatchOutcome::Connected(AuthResponse::redirect(&target))
    }

    /// Authenticate with the provider identity, or park it for signup.
    async fn login(
        &self,
        provider: &dyn SocialProvider,
        request: &AuthRequest,
        session: Option<&Session>,
        context: &SecurityContext,
    ) -> DispatchOutcome {
        let data = match self.obtain_identity(provider, request, context).await {
            Identity::Data(data) => data,
            Identity::Terminal(outcome) => return outcome,
        };
        let key = data.key();

        let mut provider_user_ids = HashSet::new();
        provider_user_ids.insert(key.provider_user_id.clone());
        let matched = match self
            .reconciler
            .find_local_users(&key.provider_id, &provider_user_ids)
            .await
        {
            Ok(matched) => matched,
            Err(err) => {
                self.logger
                    .error(&format!("user lookup failed for '{key}': {err}"));
                return self.fail(context, err.code());
            }
        };

        match matched.len() {
            0 => {
                if session.is_none() {
                    self.logger.warn(&format!(
                        "no session to record sign-in attempt for '{key}'"
                    ));
                    return self.fail(context, ErrorCode::SessionUnavailable);
                }
                SignInAttempts::add(session, Some(&data));
                self.logger
                    .info(&format!("no local account for '{key}', signup pending"));
                DispatchOutcome::SignupPending(AuthResponse::redirect(&self.options.signup_url))
            }
            // A OneToMany identity never yields a unique principal, even
            // with a single match today; sign-in is refused outright.
            1 if provider.connection_cardinality() == ConnectionCardinality::OneToOne => {
                let user_id = matched.into_iter().next().unwrap_or_default();
                let token = SocialAuthenticationToken::new(user_id, data);
                match self.auth_manager.authenticate(token).await {
                    Ok(principal) => {
                        context.bind(principal.clone());
                        SignInAttempts::remove(session, &key);
                        self.logger.info(&format!(
                            "authenticated user '{}' via '{}'",
                            principal.user_id, key.provider_id
                        ));
                        DispatchOutcome::Authenticated(AuthResponse::redirect(
                            &self.options.post_login_url,
                        ))
                    }
                    Err(err) => {
                        self.logger
                            .warn(&format!("authentication rejected for '{key}': {err}"));
                        self.fail(context, err.code())
                    }
                }
            }
            match_count => {
                self.logger.warn(&format!(
                    "sign-in with '{key}' does not resolve a unique local user ({match_count} matches)"
                ));
                self.fail(context, ErrorCode::AmbiguousAccount)
            }
        }
    }

    async fn obtain_identity(
        &self,
        provider: &dyn SocialProvider,
        request: &AuthRequest,
        context: &SecurityContext,
    ) -> Identity {
        match provider.obtain_identity(request).await {
            Ok(IdentityOutcome::Identity(data)) => Identity::Data(data),
            Ok(IdentityOutcome::Redirect(url)) => {
                self.logger.debug(&format!(
                    "provider '{}' redirecting to {url}",
                    provider.id()
                ));
                Identity::Terminal(DispatchOutcome::ProviderPending(AuthResponse::redirect(
                    &url,
                )))
            }
            Err(err) => {
                self.logger.warn(&format!(
                    "provider '{}' did not yield an identity: {err}",
                    provider.id()
                ));
                Identity::Terminal(self.fail(context, err.code()))
            }
        }
    }

    /// Failure exit: clear the context and redirect with the error code.
    fn fail(&self, context: &SecurityContext, code: ErrorCode) -> DispatchOutcome {
        context.clear();
        let target = append_query_param(
            &self.options.failure_url,
            &self.options.error_param,
            code.as_str(),
        );
        DispatchOutcome::Failed {
            code,
            response: AuthResponse::redirect(&target),
        }
    }

    /// The provider id is the single path segment after `base_path`.
    /// Anything else (no prefix, empty segment, nested segments) is not
    /// for this filter.
    fn provider_id_from_path(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(&self.options.base_path)?;
        let rest = rest.strip_prefix('/')?;
        let segment = rest.split('?').next().unwrap_or(rest);
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(segment.to_string())
    }
}

/// Intermediate result of the provider identity step: a verified identity
/// to keep processing, or a terminal outcome to return as-is.
enum Identity {
    Data(ConnectionData),
    Terminal(DispatchOutcome),
}

// End-to-end dispatch coverage lives in tests/filter_tests.rs; here only
// the private path parsing is exercised, against local stub collaborators.
#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::authentication::Principal;
    use crate::connection::{ConnectionRepository, UsersConnectionRepository};

    use super::*;

    #[derive(Debug)]
    struct StubRepository;

    #[async_trait]
    impl UsersConnectionRepository for StubRepository {
        async fn find_user_ids_connected_to(
            &self,
            _provider_id: &str,
            _provider_user_ids: &HashSet<String>,
        ) -> social_auth_core::error::Result<HashSet<String>> {
            Ok(HashSet::new())
        }

        async fn create_connection_repository(
            &self,
            _user_id: &str,
        ) -> social_auth_core::error::Result<Arc<dyn ConnectionRepository>> {
            Err(social_auth_core::error::SocialAuthError::Storage(
                "stub".to_string(),
            ))
        }
    }

    struct StubManager;

    #[async_trait]
    impl AuthenticationManager for StubManager {
        async fn authenticate(
            &self,
            token: SocialAuthenticationToken,
        ) -> social_auth_core::error::Result<Principal> {
            Ok(Principal::new(token.local_user_id))
        }
    }

    #[derive(Debug)]
    struct StubProvider;

    #[async_trait]
    impl SocialProvider for StubProvider {
        fn id(&self) -> &str {
            "mock"
        }

        async fn obtain_identity(
            &self,
            _request: &AuthRequest,
        ) -> social_auth_core::error::Result<IdentityOutcome> {
            Ok(IdentityOutcome::Identity(ConnectionData::new("mock", "42")))
        }
    }

    fn stub_filter() -> SocialAuthenticationFilter {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(Arc::new(StubProvider));
        SocialAuthenticationFilter::new(
            registry,
            ConnectionReconciler::new(Arc::new(StubRepository)),
            Arc::new(StubManager),
            SocialAuthOptions::default(),
        )
    }

    #[test]
    fn test_provider_id_from_path() {
        let filter = stub_filter();
        assert_eq!(
            filter.provider_id_from_path("/auth/mock"),
            Some("mock".to_string())
        );
        assert_eq!(filter.provider_id_from_path("/auth/"), None);
        assert_eq!(filter.provider_id_from_path("/auth"), None);
        assert_eq!(filter.provider_id_from_path("/other/mock"), None);
        assert_eq!(filter.provider_id_from_path("/auth/mock/extra"), None);
    }

    #[tokio::test]
    async fn test_non_matching_path_is_skipped() {
        let filter = stub_filter();
        let outcome = filter
            .handle(
                &AuthRequest::get("/api/health"),
                None,
                &SecurityContext::new(),
            )
            .await;
        assert!(matches!(outcome, DispatchOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_authenticated_without_connect_param_is_skipped() {
        let filter = stub_filter();
        let context = SecurityContext::new();
        context.bind(Principal::new("joe"));

        let outcome = filter
            .handle(&AuthRequest::get("/auth/mock"), None, &context)
            .await;
        assert!(matches!(outcome, DispatchOutcome::Skipped));
        assert!(context.is_authenticated());
    }
}
