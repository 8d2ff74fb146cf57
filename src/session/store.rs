use parking_lot::RwLock;

use crate::domain::TokenPair;

/// Client-held session state.
///
/// `original` is populated only while an impersonation session is
/// active; it holds the admin's own pair so the identity is recoverable
/// until impersonation is explicitly ended.
#[derive(Debug, Default)]
pub struct StoredSession {
    pub current: Option<TokenPair>,
    pub original: Option<TokenPair>,
}

/// Scoped, client-persisted holder for the active token pair and its
/// impersonation shadow.
///
/// A pair is written as one unit: no reader may observe an access token
/// without its refresh token. Writes are immediately visible to
/// subsequent reads in the same client context; cross-tab coordination
/// is out of scope (last writer wins).
pub trait SessionStore: Send + Sync {
    fn get_current(&self) -> Option<TokenPair>;
    fn set_current(&self, pair: TokenPair);
    fn clear_current(&self);

    /// Copy the current pair into the `original` slot. No-op when there
    /// is no current pair yet; callers invoke this before swapping to an
    /// impersonated identity.
    fn save_original(&self);
    fn get_original(&self) -> Option<TokenPair>;
    fn clear_original(&self);
    /// Atomically move the original pair back into `current`, returning
    /// the restored pair. `None` when no original exists.
    fn restore_original(&self) -> Option<TokenPair>;
    fn has_original(&self) -> bool;

    /// Destroy the whole session (logout, irrecoverable refresh failure).
    fn clear_all(&self);
}

/// In-memory store; the whole `StoredSession` sits behind one lock so a
/// pair can never be seen half-written.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_current(&self) -> Option<TokenPair> {
        self.inner.read().current.clone()
    }

    fn set_current(&self, pair: TokenPair) {
        self.inner.write().current = Some(pair);
    }

    fn clear_current(&self) {
        self.inner.write().current = None;
    }

    fn save_original(&self) {
        let mut inner = self.inner.write();
        if let Some(current) = inner.current.clone() {
            inner.original = Some(current);
        }
    }

    fn get_original(&self) -> Option<TokenPair> {
        self.inner.read().original.clone()
    }

    fn clear_original(&self) {
        self.inner.write().original = None;
    }

    fn restore_original(&self) -> Option<TokenPair> {
        let mut inner = self.inner.write();
        let restored = inner.original.take()?;
        inner.current = Some(restored.clone());
        Some(restored)
    }

    fn has_original(&self) -> bool {
        self.inner.read().original.is_some()
    }

    fn clear_all(&self) {
        let mut inner = self.inner.write();
        inner.current = None;
        inner.original = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(tag: &str) -> TokenPair {
        TokenPair::new(format!("access-{tag}"), format!("refresh-{tag}"))
    }

    #[test]
    fn save_original_without_current_is_a_noop() {
        let store = MemorySessionStore::new();
        store.save_original();
        assert!(!store.has_original());
    }

    #[test]
    fn save_and_restore_round_trip() {
        let store = MemorySessionStore::new();
        store.set_current(pair("admin"));
        store.save_original();
        store.set_current(pair("target"));

        assert!(store.has_original());
        assert_eq!(store.get_current(), Some(pair("target")));

        let restored = store.restore_original();
        assert_eq!(restored, Some(pair("admin")));
        assert_eq!(store.get_current(), Some(pair("admin")));
        assert!(!store.has_original());
    }

    #[test]
    fn restore_without_original_returns_none() {
        let store = MemorySessionStore::new();
        store.set_current(pair("a"));
        assert_eq!(store.restore_original(), None);
        // current untouched
        assert_eq!(store.get_current(), Some(pair("a")));
    }

    #[test]
    fn clear_current_leaves_original_alone() {
        let store = MemorySessionStore::new();
        store.set_current(pair("a"));
        store.save_original();
        store.clear_current();
        assert_eq!(store.get_current(), None);
        assert!(store.has_original());
    }

    #[test]
    fn clear_all_destroys_both_slots() {
        let store = MemorySessionStore::new();
        store.set_current(pair("a"));
        store.save_original();
        store.clear_all();
        assert_eq!(store.get_current(), None);
        assert!(!store.has_original());
    }
}
