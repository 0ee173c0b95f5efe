//! Debounced draft autosave.
//!
//! The caller owns the clock: `push` and `flush_due` take the current
//! [`Instant`], so the policy is testable without sleeping.

use std::time::{Duration, Instant};

use crate::draft::Draft;
use crate::draft_store::DraftStore;
use crate::CoreError;

pub const DEFAULT_IDLE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Autosave {
    idle: Duration,
    pending: Option<Draft>,
    last_edit: Option<Instant>,
    last_flushed: Option<Draft>,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE)
    }
}

impl Autosave {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            pending: None,
            last_edit: None,
            last_flushed: None,
        }
    }

    /// Queue an edit. Edits queued before the next flush merge in order.
    pub fn push(&mut self, patch: Draft, now: Instant) {
        match self.pending.as_mut() {
            Some(pending) => pending.merge(patch),
            None => self.pending = Some(patch),
        }
        self.last_edit = Some(now);
    }

    /// Forget pending edits and the last written payload. Call this whenever
    /// the stored draft is discarded, or a later identical edit is skipped.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_edit = None;
        self.last_flushed = None;
    }

    /// Discard the stored draft and reset.
    ///
    /// # Errors
    ///
    /// Returns the draft store's write error; nothing is reset then.
    pub fn clear(&mut self, store: &DraftStore<'_>) -> Result<(), CoreError> {
        store.clear()?;
        self.reset();
        Ok(())
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the pending edits if the idle window has passed since the last
    /// push. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns the draft store's write error; the edits stay pending.
    pub fn flush_due(&mut self, store: &DraftStore<'_>, now: Instant) -> Result<bool, CoreError> {
        match self.last_edit {
            Some(at) if now.saturating_duration_since(at) >= self.idle => self.flush(store),
            _ => Ok(false),
        }
    }

    /// Write the pending edits now, skipping a payload identical to the
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns the draft store's write error; the edits stay pending.
    pub fn flush(&mut self, store: &DraftStore<'_>) -> Result<bool, CoreError> {
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };
        self.last_edit = None;
        if self.last_flushed.as_ref() == Some(&pending) {
            return Ok(false);
        }
        if let Err(err) = store.save(pending.clone()) {
            self.pending = Some(pending);
            return Err(err);
        }
        self.last_flushed = Some(pending);
        Ok(true)
    }
}
