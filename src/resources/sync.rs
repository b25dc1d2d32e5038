//! Reconciliation between a caller's local resource copy and a fresh copy
//! received from the server.
//!
//! Resources here are immutable value objects, not live proxies the client
//! mutates in place. `sync_if_equal` is how a caller folds server-driven
//! changes (e.g. a `progress` update pushed via `onControlUpdate`) back onto
//! a value it's holding, without clobbering local edits made concurrently
//! to parts the server hasn't touched and without losing identity.

/// Types whose identity is separate from their content, and which support
/// folding a freshly-received copy onto a local one.
///
/// `sync_if_equal(&mut self, incoming)` replaces `self` with `incoming` only
/// when both share the same identity. Idempotent: syncing the same
/// `incoming` twice is the same as syncing it once. If the identities
/// differ, `self` is left untouched and `false` is returned so the caller
/// can tell the sync was a no-op.
pub trait SyncIfEqual: PartialEq + Clone {
    /// The identity key used to decide whether `incoming` describes the
    /// same resource as `self`.
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;

    fn sync_if_equal(&mut self, incoming: &Self) -> bool {
        if self.id() != incoming.id() {
            return false;
        }
        *self = incoming.clone();
        true
    }
}

impl SyncIfEqual for super::scene::Scene {
    type Id = String;
    fn id(&self) -> &String {
        &self.scene_id
    }
}

impl SyncIfEqual for super::group::Group {
    type Id = String;
    fn id(&self) -> &String {
        &self.group_id
    }
}

impl SyncIfEqual for super::control::Control {
    type Id = String;
    fn id(&self) -> &String {
        &self.control_id
    }
}

impl SyncIfEqual for super::participant::Participant {
    type Id = String;
    fn id(&self) -> &String {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::scene::Scene;

    #[test]
    fn sync_replaces_on_matching_identity() {
        let mut local = Scene::new("s1");
        let mut incoming = Scene::new("s1");
        incoming.meta = Some(Default::default());
        assert!(local.sync_if_equal(&incoming));
        assert!(local.meta.is_some());
    }

    #[test]
    fn sync_is_noop_on_identity_mismatch() {
        let mut local = Scene::new("s1");
        let other = Scene::new("s2");
        assert!(!local.sync_if_equal(&other));
        assert_eq!(local.scene_id, "s1");
    }

    #[test]
    fn sync_is_idempotent() {
        let mut local = Scene::new("s1");
        let mut incoming = Scene::new("s1");
        incoming.meta = Some(Default::default());
        local.sync_if_equal(&incoming);
        let after_first = local.clone();
        local.sync_if_equal(&incoming);
        assert_eq!(local, after_first);
        assert_eq!(local.meta, after_first.meta);
    }
}
