//! The active-journal slot.
//!
//! Exactly one journal is active per registry. A fresh registry holds a
//! [`NoWriteJournal`] placeholder rather than nothing, so dispatch never has
//! to deal with an empty slot; submissions against the placeholder fail with
//! [`JournalError::NotInitialized`](crate::JournalError::NotInitialized).
//!
//! ## Swapping
//!
//! [`JournalRegistry::install`] tears the old journal down with
//! [`Journal::destroy`] and then publishes the new one. The caller must make
//! sure no `write`/`write_async` is in flight against the old journal when
//! it swaps. That is not checked here.
//!
//! The process-wide registry is reached through [`global`] and the
//! `journal_*` helpers.

use crate::backends::NoWriteJournal;
use crate::error::{JournalError, JournalResult};
use crate::journal::{Journal, JournalKind};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, LazyLock};

/// Holds the journal submissions are dispatched to.
pub struct JournalRegistry {
    current: RwLock<Arc<dyn Journal>>,
    install_lock: Mutex<()>,
}

impl JournalRegistry {
    /// Creates a registry holding the not-initialized placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self::with_journal(Arc::new(NoWriteJournal))
    }

    /// Creates a registry with `journal` already active.
    #[must_use]
    pub fn with_journal(journal: Arc<dyn Journal>) -> Self {
        Self {
            current: RwLock::new(journal),
            install_lock: Mutex::new(()),
        }
    }

    /// The active journal.
    #[must_use]
    pub fn current(&self) -> Arc<dyn Journal> {
        Arc::clone(&self.current.read())
    }

    /// Kind of the active journal.
    #[must_use]
    pub fn kind(&self) -> JournalKind {
        self.current.read().kind()
    }

    /// Whether a real journal has been installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.kind() != JournalKind::Unset
    }

    /// Replaces the active journal.
    ///
    /// The previous journal's `destroy` runs exactly once, before the swap.
    /// Re-installing the journal that is already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidTransition`] if the swap would move the
    /// lifecycle backwards; the active journal is left untouched.
    pub fn install(&self, journal: Arc<dyn Journal>) -> JournalResult<()> {
        let _serial = self.install_lock.lock();
        let old = self.current();
        if Arc::ptr_eq(&old, &journal) {
            return Ok(());
        }

        let (from, to) = (old.kind(), journal.kind());
        if !from.can_transition_to(to) {
            tracing::warn!(%from, %to, "rejected journal transition");
            return Err(JournalError::InvalidTransition { from, to });
        }

        tracing::debug!(from = old.name(), to = journal.name(), "installing journal");
        old.destroy();
        *self.current.write() = journal;
        Ok(())
    }

    /// Tears down the active journal and falls back to the placeholder.
    pub fn shutdown(&self) {
        let _serial = self.install_lock.lock();
        let old = self.current();
        if old.kind() == JournalKind::Unset {
            return;
        }
        tracing::debug!(journal = old.name(), "shutting down journal");
        old.destroy();
        *self.current.write() = Arc::new(NoWriteJournal);
    }
}

impl Default for JournalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: LazyLock<JournalRegistry> = LazyLock::new(JournalRegistry::new);

/// The process-wide registry.
pub fn global() -> &'static JournalRegistry {
    &GLOBAL
}

/// Installs `journal` as the process-wide journal.
///
/// # Errors
///
/// See [`JournalRegistry::install`].
pub fn journal_set(journal: Arc<dyn Journal>) -> JournalResult<()> {
    global().install(journal)
}

/// The process-wide active journal.
#[must_use]
pub fn current_journal() -> Arc<dyn Journal> {
    global().current()
}

/// Whether a real process-wide journal has been installed.
#[must_use]
pub fn journal_is_initialized() -> bool {
    global().is_initialized()
}

/// Tears down the process-wide journal.
pub fn journal_shutdown() {
    global().shutdown();
}
