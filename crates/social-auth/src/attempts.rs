// SignInAttempts — the session-scoped pending-connection tracker.
//
// When a login callback produces an external identity with no matching
// local account, the identity is parked here until signup completes. The
// list survives provider redirect round trips because it lives in the
// session, preserves insertion order, and dedupes by `ConnectionKey` so a
// user retrying the same provider does not pile up entries.

use crate::connection::{ConnectionData, ConnectionKey};
use crate::session::Session;

/// The single well-known session attribute holding the pending list.
/// Consumers must go through the operations below, never touch it directly.
pub const SIGN_IN_ATTEMPTS_KEY: &str = "social-auth.sign-in-attempts";

/// Operations on the session's pending sign-in attempts.
///
/// Every operation takes `Option<&Session>` and is a safe no-op when the
/// session is absent; `add` additionally tolerates absent data. An aborted
/// request after `add` is harmless: the retained attempt dedupes on retry
/// and is removed explicitly when signup completes.
pub struct SignInAttempts;

impl SignInAttempts {
    /// Record a pending attempt.
    ///
    /// Returns `false` when the session or the data is absent, and `false`
    /// when the attempt was newly appended; returns `true` (leaving the
    /// store unchanged) when an entry with the same `ConnectionKey` is
    /// already pending.
    pub fn add(session: Option<&Session>, data: Option<&ConnectionData>) -> bool {
        let (Some(session), Some(data)) = (session, data) else {
            return false;
        };
        let key = data.key();
        session.update::<Vec<ConnectionData>, bool>(SIGN_IN_ATTEMPTS_KEY, |attempts| {
            if attempts.iter().any(|pending| pending.key() == key) {
                true
            } else {
                attempts.push(data.clone());
                false
            }
        })
    }

    /// Remove the pending attempt matching `key`. Returns whether a removal
    /// occurred; no-op on an absent session.
    pub fn remove(session: Option<&Session>, key: &ConnectionKey) -> bool {
        let Some(session) = session else {
            return false;
        };
        session.modify::<Vec<ConnectionData>, bool>(SIGN_IN_ATTEMPTS_KEY, |attempts| {
            let Some(attempts) = attempts else {
                return false;
            };
            let before = attempts.len();
            attempts.retain(|pending| pending.key() != *key);
            attempts.len() != before
        })
    }

    /// Snapshot of the pending attempts in insertion order. Empty when the
    /// session or the store is absent. Never exposes the live backing list.
    pub fn list(session: Option<&Session>) -> Vec<ConnectionData> {
        let Some(session) = session else {
            return Vec::new();
        };
        session.modify::<Vec<ConnectionData>, Vec<ConnectionData>>(
            SIGN_IN_ATTEMPTS_KEY,
            |attempts| attempts.map(|pending| pending.clone()).unwrap_or_default(),
        )
    }

    /// Drop the store entirely. No-op when the session or store is absent.
    pub fn clear(session: Option<&Session>) {
        if let Some(session) = session {
            session.remove(SIGN_IN_ATTEMPTS_KEY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(provider_id: &str, provider_user_id: &str) -> ConnectionData {
        ConnectionData::new(provider_id, provider_user_id)
    }

    #[test]
    fn test_add_dedupes_by_key() {
        let session = Session::new();
        assert!(!SignInAttempts::add(Some(&session), Some(&data("A", "a"))));
        assert!(SignInAttempts::add(Some(&session), Some(&data("A", "a"))));
        assert!(!SignInAttempts::add(Some(&session), Some(&data("A", "b"))));
        assert!(!SignInAttempts::add(Some(&session), Some(&data("B", "a"))));
        assert_eq!(SignInAttempts::list(Some(&session)).len(), 3);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let session = Session::new();
        SignInAttempts::add(Some(&session), Some(&data("A", "1")));
        SignInAttempts::add(Some(&session), Some(&data("B", "2")));
        SignInAttempts::add(Some(&session), Some(&data("C", "3")));

        let keys: Vec<ConnectionKey> = SignInAttempts::list(Some(&session))
            .iter()
            .map(|d| d.key())
            .collect();
        assert_eq!(
            keys,
            vec![
                ConnectionKey::new("A", "1"),
                ConnectionKey::new("B", "2"),
                ConnectionKey::new("C", "3"),
            ]
        );
    }

    #[test]
    fn test_duplicate_key_keeps_first_record() {
        let session = Session::new();
        let first = data("A", "a").with_display_name("First");
        let second = data("A", "a").with_display_name("Second");
        assert!(!SignInAttempts::add(Some(&session), Some(&first)));
        assert!(SignInAttempts::add(Some(&session), Some(&second)));

        let stored = SignInAttempts::list(Some(&session));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].display_name.as_deref(), Some("First"));
    }

    #[test]
    fn test_remove() {
        let session = Session::new();
        SignInAttempts::add(Some(&session), Some(&data("A", "a")));
        SignInAttempts::add(Some(&session), Some(&data("A", "b")));

        assert!(SignInAttempts::remove(
            Some(&session),
            &ConnectionKey::new("A", "a")
        ));
        assert_eq!(SignInAttempts::list(Some(&session)).len(), 1);

        // Absent key
        assert!(!SignInAttempts::remove(
            Some(&session),
            &ConnectionKey::new("A", "a")
        ));
    }

    #[test]
    fn test_clear() {
        let session = Session::new();
        SignInAttempts::add(Some(&session), Some(&data("A", "a")));
        SignInAttempts::clear(Some(&session));
        assert!(SignInAttempts::list(Some(&session)).is_empty());
        assert!(!session.contains(SIGN_IN_ATTEMPTS_KEY));

        // Clear on an empty session is a no-op
        SignInAttempts::clear(Some(&session));
    }

    #[test]
    fn test_absent_session_or_data_returns_false() {
        let session = Session::new();
        assert!(!SignInAttempts::add(None, Some(&data("A", "a"))));
        assert!(!SignInAttempts::add(Some(&session), None));
        assert!(!SignInAttempts::add(None, None));
        assert!(SignInAttempts::list(Some(&session)).is_empty());

        assert!(!SignInAttempts::remove(None, &ConnectionKey::new("A", "a")));
        assert!(SignInAttempts::list(None).is_empty());
        SignInAttempts::clear(None);
    }

    #[test]
    fn test_remove_does_not_create_store() {
        let session = Session::new();
        SignInAttempts::remove(Some(&session), &ConnectionKey::new("A", "a"));
        assert!(!session.contains(SIGN_IN_ATTEMPTS_KEY));
    }

    #[test]
    fn test_concurrent_adds_same_session() {
        let session = Session::new();
        let mut handles = Vec::new();
        for i in 0..8 {
            let session = session.clone();
            handles.push(std::thread::spawn(move || {
                // Half the threads race on the same key, half are unique.
                let id = if i % 2 == 0 { "shared".to_string() } else { format!("u{i}") };
                SignInAttempts::add(Some(&session), Some(&ConnectionData::new("A", id)));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // 1 shared + 4 unique
        assert_eq!(SignInAttempts::list(Some(&session)).len(), 5);
    }
}
