// ConnectionReconciler — resolves external identities against local user
// records and persists new connections under the cardinality rule.
//
// The OneToOne duplicate check lives here and only here; both the connect
// flow and any future linking surface go through `add_connection`, so
// cardinality enforcement cannot diverge between call sites.

use std::collections::HashSet;
use std::sync::Arc;

use social_auth_core::error::{Result, SocialAuthError};

use crate::connection::{Connection, ConnectionCardinality, ConnectionData, UsersConnectionRepository};
use crate::provider::SocialProvider;

/// Reconciles external identities with local users via the storage
/// collaborator.
pub struct ConnectionReconciler {
    users_connection_repository: Arc<dyn UsersConnectionRepository>,
}

impl ConnectionReconciler {
    pub fn new(users_connection_repository: Arc<dyn UsersConnectionRepository>) -> Self {
        Self {
            users_connection_repository,
        }
    }

    /// Local user ids already connected to any of `provider_user_ids`
    /// under `provider_id`.
    pub async fn find_local_users(
        &self,
        provider_id: &str,
        provider_user_ids: &HashSet<String>,
    ) -> Result<HashSet<String>> {
        self.users_connection_repository
            .find_user_ids_connected_to(provider_id, provider_user_ids)
            .await
    }

    /// Build and persist a connection for `local_user_id`.
    ///
    /// Under `OneToOne`, fails with `DuplicateConnection` if the identity
    /// is already mapped to a different local user; re-connecting the same
    /// user is allowed. One durable write on success. Not idempotent by
    /// itself: login-vs-signup branching must check `find_local_users`
    /// first.
    pub async fn add_connection(
        &self,
        provider: &dyn SocialProvider,
        local_user_id: &str,
        data: ConnectionData,
    ) -> Result<Connection> {
        let connection = provider.build_connection(data);
        let key = connection.key();

        if provider.connection_cardinality() == ConnectionCardinality::OneToOne {
            let mut provider_user_ids = HashSet::new();
            provider_user_ids.insert(key.provider_user_id.clone());
            let connected = self
                .find_local_users(&key.provider_id, &provider_user_ids)
                .await?;
            if connected.iter().any(|user_id| user_id != local_user_id) {
                return Err(SocialAuthError::DuplicateConnection {
                    provider_id: key.provider_id,
                    provider_user_id: key.provider_user_id,
                });
            }
        }

        let repository = self
            .users_connection_repository
            .create_connection_repository(local_user_id)
            .await?;
        repository.add_connection(connection.clone()).await?;
        Ok(connection)
    }
}

// Scenario coverage lives in tests/reconciler_tests.rs, where the mock
// collaborators from the companion crates are usable.
