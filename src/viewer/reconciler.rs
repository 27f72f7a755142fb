//! Viewer-side reconciliation: decides how the displayed photo set reacts to
//! each fresh listing.

use crate::models::photo::PhotoObject;
use std::collections::HashSet;

/// Outcome of feeding one poll result through the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Same signature as last time; display state untouched.
    Unchanged,
    /// New photos appeared; the selection jumped to the newest.
    Advanced,
    /// The set changed without new keys (clear or reorder); selection clamped.
    Rebuilt,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    #[default]
    Ok,
    /// Last poll failed; the previous photo set stays on screen.
    Degraded(String),
}

/// All mutable viewer state, one struct passed through the loop — no globals.
#[derive(Debug, Default)]
pub struct ViewerState {
    pub photos: Vec<PhotoObject>,
    pub active_index: usize,
    pub status: ViewerStatus,
    last_signature: String,
}

/// Order-sensitive fingerprint of a listing, in the order the server returned
/// it (ascending lastModified). Only keys participate: a change confined to
/// other fields with the same key sequence is invisible, which is accepted —
/// the signature is a re-render short-circuit, not a correctness mechanism.
pub fn signature(photos: &[PhotoObject]) -> String {
    photos
        .iter()
        .map(|p| p.key.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one successful listing into the display state.
    pub fn apply_listing(&mut self, photos: Vec<PhotoObject>) -> Reconciliation {
        self.status = ViewerStatus::Ok;

        let next_signature = signature(&photos);
        if next_signature == self.last_signature {
            return Reconciliation::Unchanged;
        }

        let known: HashSet<&str> = self.photos.iter().map(|p| p.key.as_str()).collect();
        let has_new = photos.iter().any(|p| !known.contains(p.key.as_str()));

        let outcome = if has_new {
            // Listings are oldest-first, so the newest photo sorts last.
            self.active_index = photos.len().saturating_sub(1);
            Reconciliation::Advanced
        } else {
            if self.active_index >= photos.len() {
                self.active_index = photos.len().saturating_sub(1);
            }
            Reconciliation::Rebuilt
        };

        self.photos = photos;
        self.last_signature = next_signature;
        outcome
    }

    /// A failed poll degrades the status but keeps the current photos on
    /// screen; the loop retries on its next tick.
    pub fn apply_error(&mut self, message: impl Into<String>) {
        self.status = ViewerStatus::Degraded(message.into());
    }

    pub fn active_photo(&self) -> Option<&PhotoObject> {
        self.photos.get(self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(key: &str, size: i64) -> PhotoObject {
        PhotoObject {
            key: format!("photo-stream/ABCD-EFGH/{}", key),
            filename: key.to_string(),
            last_modified: None,
            size,
        }
    }

    #[test]
    fn identical_key_set_is_a_strict_no_op() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 10), photo("b.jpg", 10)]);
        state.active_index = 0;

        // Same keys, different sizes: signature is key-only.
        let outcome = state.apply_listing(vec![photo("a.jpg", 99), photo("b.jpg", 99)]);

        assert_eq!(outcome, Reconciliation::Unchanged);
        assert_eq!(state.active_index, 0);
        assert_eq!(state.photos[0].size, 10, "display state must not change");
    }

    #[test]
    fn new_photos_jump_the_selection_to_the_newest() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 1)]);
        state.active_index = 0;

        let outcome = state.apply_listing(vec![photo("a.jpg", 1), photo("b.jpg", 1)]);

        assert_eq!(outcome, Reconciliation::Advanced);
        assert_eq!(state.active_index, 1);
        assert_eq!(state.active_photo().unwrap().filename, "b.jpg");
    }

    #[test]
    fn shrinking_set_clamps_the_selection() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 1), photo("b.jpg", 1), photo("c.jpg", 1)]);
        assert_eq!(state.active_index, 2);

        let outcome = state.apply_listing(vec![photo("a.jpg", 1), photo("b.jpg", 1)]);

        assert_eq!(outcome, Reconciliation::Rebuilt);
        assert_eq!(state.active_index, 1);
    }

    #[test]
    fn reorder_with_valid_selection_stays_put() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 1), photo("b.jpg", 1), photo("c.jpg", 1)]);
        state.active_index = 1;

        let outcome = state.apply_listing(vec![photo("c.jpg", 1), photo("b.jpg", 1), photo("a.jpg", 1)]);

        assert_eq!(outcome, Reconciliation::Rebuilt);
        assert_eq!(state.active_index, 1);
    }

    #[test]
    fn cleared_stream_empties_the_display() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 1)]);

        let outcome = state.apply_listing(vec![]);

        assert_eq!(outcome, Reconciliation::Rebuilt);
        assert!(state.photos.is_empty());
        assert!(state.active_photo().is_none());
    }

    #[test]
    fn errors_degrade_without_losing_photos_and_recover() {
        let mut state = ViewerState::new();
        state.apply_listing(vec![photo("a.jpg", 1)]);

        state.apply_error("connection refused");
        assert_eq!(
            state.status,
            ViewerStatus::Degraded("connection refused".into())
        );
        assert_eq!(state.photos.len(), 1);

        // The next successful poll clears the degraded status even when the
        // photo set is unchanged.
        let outcome = state.apply_listing(vec![photo("a.jpg", 1)]);
        assert_eq!(outcome, Reconciliation::Unchanged);
        assert_eq!(state.status, ViewerStatus::Ok);
    }
}
