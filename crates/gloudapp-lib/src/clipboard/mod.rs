//! System clipboard access.
//!
//! Writes happen on the UI loop through a long-lived [`SystemClipboard`]
//! (on X11 the clipboard contents only survive while their owner does).
//! Reads for the tray popup go through [`ClipboardProbe`], which reads on a
//! worker thread and hands the text back through a callback so menu
//! construction never waits on a clipboard round trip.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{GloudError, Result};

/// Text clipboard as used by the upload pipeline.
pub trait ClipboardAccess {
    /// Current text, or `None` when the clipboard holds no text.
    fn read_text(&mut self) -> Result<Option<String>>;

    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard via `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| GloudError::Clipboard(format!("Failed to access system clipboard: {e}")))?;
        Ok(Self { inner })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>> {
        read_arboard_text(&mut self.inner)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .map_err(|e| GloudError::Clipboard(format!("Failed to copy text to clipboard: {e}")))
    }
}

fn read_arboard_text(clipboard: &mut arboard::Clipboard) -> Result<Option<String>> {
    match clipboard.get_text() {
        Ok(text) => Ok(Some(text)),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(GloudError::Clipboard(format!("Failed to read clipboard: {e}"))),
    }
}

/// Reads clipboard text off the UI thread.
///
/// At most one read is in flight; requests made while one is pending are
/// dropped, since the pending read will report fresh-enough text.
#[derive(Clone, Default)]
pub struct ClipboardProbe {
    in_flight: Arc<AtomicBool>,
}

impl ClipboardProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a read is currently pending.
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start a read; `deliver` runs on the worker thread with the text (or
    /// `None` when unreadable). Returns `false` if a read was already pending.
    pub fn request<F>(&self, deliver: F) -> bool
    where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        self.request_with(
            || {
                let mut clipboard = arboard::Clipboard::new().map_err(|e| {
                    GloudError::Clipboard(format!("Failed to access system clipboard: {e}"))
                })?;
                read_arboard_text(&mut clipboard)
            },
            deliver,
        )
    }

    /// `request` with an injectable reader.
    pub fn request_with<R, F>(&self, read: R, deliver: F) -> bool
    where
        R: FnOnce() -> Result<Option<String>> + Send + 'static,
        F: FnOnce(Option<String>) + Send + 'static,
    {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::trace!("Clipboard read already pending");
            return false;
        }

        let in_flight = Arc::clone(&self.in_flight);
        let spawned = std::thread::Builder::new()
            .name("clipboard-probe".into())
            .spawn(move || {
                let text = read().unwrap_or_else(|e| {
                    tracing::debug!("Clipboard probe failed: {}", e);
                    None
                });
                in_flight.store(false, Ordering::SeqCst);
                deliver(text);
            });

        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn clipboard probe: {}", e);
            self.in_flight.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }
}

/// Last clipboard text seen by the UI loop, shared with menu refresh hooks.
#[derive(Clone, Default)]
pub struct ClipboardSnapshot {
    text: Rc<RefCell<Option<String>>>,
}

impl ClipboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    /// Store `text`; returns `true` if it differs from the previous value.
    pub fn set(&self, text: Option<String>) -> bool {
        let mut current = self.text.borrow_mut();
        if *current == text {
            return false;
        }
        *current = text;
        true
    }
}

#[cfg(test)]
pub mod memory {
    //! In-memory clipboard for tests.

    use super::ClipboardAccess;
    use crate::errors::Result;

    #[derive(Debug, Default)]
    pub struct MemoryClipboard {
        pub text: Option<String>,
        pub writes: usize,
    }

    impl MemoryClipboard {
        pub fn holding(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
                writes: 0,
            }
        }
    }

    impl ClipboardAccess for MemoryClipboard {
        fn read_text(&mut self) -> Result<Option<String>> {
            Ok(self.text.clone())
        }

        fn write_text(&mut self, text: &str) -> Result<()> {
            self.text = Some(text.to_string());
            self.writes += 1;
            Ok(())
        }
    }
}
