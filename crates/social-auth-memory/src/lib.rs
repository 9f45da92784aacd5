// social-auth-memory — in-memory connection storage.
//
// Backs the `UsersConnectionRepository` and `ConnectionRepository` seams
// with a shared `tokio::sync::RwLock` map. Meant for development and tests;
// nothing here survives a restart.

pub mod repository;

pub use repository::{InMemoryConnectionRepository, InMemoryUsersConnectionRepository};
