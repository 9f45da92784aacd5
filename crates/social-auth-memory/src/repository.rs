// In-memory repositories keyed by local user id.
//
// One shared map holds every user's connections; per-user
// `InMemoryConnectionRepository` handles are views over the same map, so a
// write through a handle is visible to `find_user_ids_connected_to`
// immediately.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use social_auth::connection::{Connection, ConnectionRepository, UsersConnectionRepository};
use social_auth_core::error::Result;

type ConnectionMap = HashMap<String, Vec<Connection>>;

/// Cross-user connection store.
#[derive(Debug, Default)]
pub struct InMemoryUsersConnectionRepository {
    connections: Arc<RwLock<ConnectionMap>>,
}

impl InMemoryUsersConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, replacing any existing data for the listed users.
    pub async fn with_data(self, user_id: &str, connections: Vec<Connection>) -> Self {
        self.connections
            .write()
            .await
            .insert(user_id.to_string(), connections);
        self
    }

    /// Number of connections stored for `user_id`.
    pub async fn connection_count(&self, user_id: &str) -> usize {
        self.connections
            .read()
            .await
            .get(user_id)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// Copy of the full store, for assertions.
    pub async fn snapshot(&self) -> ConnectionMap {
        self.connections.read().await.clone()
    }

    pub async fn clear(&self) {
        self.connections.write().await.clear();
    }
}

#[async_trait]
impl UsersConnectionRepository for InMemoryUsersConnectionRepository {
    async fn find_user_ids_connected_to(
        &self,
        provider_id: &str,
        provider_user_ids: &HashSet<String>,
    ) -> Result<HashSet<String>> {
        let connections = self.connections.read().await;
        let mut user_ids = HashSet::new();
        for (user_id, list) in connections.iter() {
            let connected = list.iter().any(|connection| {
                connection.data.provider_id == provider_id
                    && provider_user_ids.contains(&connection.data.provider_user_id)
            });
            if connected {
                user_ids.insert(user_id.clone());
            }
        }
        Ok(user_ids)
    }

    async fn create_connection_repository(
        &self,
        user_id: &str,
    ) -> Result<Arc<dyn ConnectionRepository>> {
        Ok(Arc::new(InMemoryConnectionRepository {
            user_id: user_id.to_string(),
            connections: self.connections.clone(),
        }))
    }
}

/// Per-user view over the shared store.
#[derive(Debug)]
pub struct InMemoryConnectionRepository {
    user_id: String,
    connections: Arc<RwLock<ConnectionMap>>,
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    /// Add or refresh a connection. A connection with the same key replaces
    /// the stored record instead of duplicating it.
    async fn add_connection(&self, connection: Connection) -> Result<()> {
        let mut connections = self.connections.write().await;
        let list = connections.entry(self.user_id.clone()).or_default();
        let key = connection.key();
        if let Some(existing) = list.iter_mut().find(|stored| stored.key() == key) {
            *existing = connection;
        } else {
            list.push(connection);
        }
        Ok(())
    }

    async fn connections(&self) -> Result<Vec<Connection>> {
        let connections = self.connections.read().await;
        Ok(connections.get(&self.user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use social_auth::connection::ConnectionData;

    use super::*;

    fn connection(provider_id: &str, provider_user_id: &str) -> Connection {
        Connection::new(ConnectionData::new(provider_id, provider_user_id))
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let repository = InMemoryUsersConnectionRepository::new();
        let joe = repository.create_connection_repository("joe").await.unwrap();
        joe.add_connection(connection("mock", "42")).await.unwrap();
        joe.add_connection(connection("other", "42")).await.unwrap();

        assert_eq!(repository.connection_count("joe").await, 2);
        assert_eq!(joe.connections().await.unwrap().len(), 2);
        assert_eq!(repository.connection_count("jane").await, 0);
    }

    #[tokio::test]
    async fn test_same_key_refreshes() {
        let repository = InMemoryUsersConnectionRepository::new();
        let joe = repository.create_connection_repository("joe").await.unwrap();

        let first = Connection::new(
            ConnectionData::new("mock", "42").with_display_name("Old Name"),
        );
        let second = Connection::new(
            ConnectionData::new("mock", "42").with_display_name("New Name"),
        );
        joe.add_connection(first).await.unwrap();
        joe.add_connection(second).await.unwrap();

        let stored = joe.connections().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].data.display_name.as_deref(), Some("New Name"));
    }

    #[tokio::test]
    async fn test_find_user_ids_connected_to() {
        let repository = InMemoryUsersConnectionRepository::new();
        let joe = repository.create_connection_repository("joe").await.unwrap();
        joe.add_connection(connection("mock", "42")).await.unwrap();
        let jane = repository.create_connection_repository("jane").await.unwrap();
        jane.add_connection(connection("mock", "43")).await.unwrap();

        let mut ids = HashSet::new();
        ids.insert("42".to_string());
        ids.insert("43".to_string());
        let users = repository
            .find_user_ids_connected_to("mock", &ids)
            .await
            .unwrap();
        assert_eq!(users.len(), 2);

        // Provider id must match too.
        let users = repository
            .find_user_ids_connected_to("other", &ids)
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_seed_and_clear() {
        let repository = InMemoryUsersConnectionRepository::new()
            .with_data("joe", vec![connection("mock", "42")])
            .await;
        assert_eq!(repository.connection_count("joe").await, 1);

        repository.clear().await;
        assert!(repository.snapshot().await.is_empty());
    }
}
