//! Typed result store. Bindings associate captures with keys drawn from a
//! field-less enum chosen by each group, so a step can only ever address the
//! result kinds its group declares. A group's setup fills the store and every
//! case of the group shares the same handle, read-write, in declaration
//! order.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{assertion::Capture, Error, Result};

/// Bounds required of a binding key. Any `Copy + Eq + Hash + Debug` enum
/// qualifies; the blanket impl means suites never implement this by hand.
pub trait BindKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<K: Copy + Eq + Hash + Debug + Send + Sync + 'static> BindKey for K {}

/// Shared per-group store of captured responses. Cloning yields another
/// handle onto the same underlying map; access within a group is strictly
/// sequential, so the lock is never contended.
#[derive(Debug)]
pub struct Bindings<K> {
    inner: Arc<Mutex<HashMap<K, Capture>>>,
}

impl<K> Clone for Bindings<K> {
    fn clone(&self) -> Self {
        Bindings {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for Bindings<K> {
    fn default() -> Self {
        Bindings {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: BindKey> Bindings<K> {
    pub fn new() -> Bindings<K> {
        Bindings::default()
    }

    /// Store a capture under `key`, overwriting any prior binding.
    pub fn bind(&self, key: K, capture: Capture) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, capture);
    }

    /// Return the most recently bound capture for `key`, or fail with an
    /// unbound-reference error if the key was never bound.
    pub fn resolve(&self, key: K) -> Result<Capture> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::UnboundReference(format!("{key:?}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        Mercado,
        Produto,
    }

    fn capture(id: i64) -> Capture {
        Capture {
            status: StatusCode::CREATED,
            body: json!({"id": id}),
        }
    }

    #[test]
    fn resolve_returns_the_bound_capture() -> Result<()> {
        let bindings = Bindings::new();
        bindings.bind(Key::Mercado, capture(7));
        assert_eq!(bindings.resolve(Key::Mercado)?.id()?, 7);
        Ok(())
    }

    #[test]
    fn rebinding_overwrites_the_previous_capture() -> Result<()> {
        let bindings = Bindings::new();
        bindings.bind(Key::Produto, capture(1));
        bindings.bind(Key::Produto, capture(2));
        assert_eq!(bindings.resolve(Key::Produto)?.id()?, 2);
        Ok(())
    }

    #[test]
    fn bindings_under_other_keys_do_not_interfere() -> Result<()> {
        // Resolving right after a bind returns exactly that capture, no
        // matter how many other keys were bound in between.
        let bindings = Bindings::new();
        bindings.bind(Key::Mercado, capture(7));
        bindings.bind(Key::Produto, capture(3));
        assert_eq!(bindings.resolve(Key::Mercado)?.id()?, 7);
        assert_eq!(bindings.resolve(Key::Produto)?.id()?, 3);
        Ok(())
    }

    #[test]
    fn resolving_an_unbound_key_fails() {
        let bindings: Bindings<Key> = Bindings::new();
        let err = bindings.resolve(Key::Produto).unwrap_err();
        assert!(matches!(&err, Error::UnboundReference(key) if key == "Produto"));
    }

    #[test]
    fn handles_share_the_same_store() -> Result<()> {
        let setup_view = Bindings::new();
        let case_view = setup_view.clone();
        setup_view.bind(Key::Mercado, capture(9));
        assert_eq!(case_view.resolve(Key::Mercado)?.id()?, 9);
        Ok(())
    }
}
