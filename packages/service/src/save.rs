//! # Save State & Auto-Save
//!
//! Save status tracking, dirty flagging, and the periodic auto-save task.
//!
//! A save in flight suppresses further saves for the same document until
//! it resolves; a failed save rolls the status back to `Error`, never
//! silently to `Saved`. The injected handler may complete synchronously
//! or hand back a pending future — call sites only branch on which one
//! they got.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

/// What a save handler returns: a finished result, or a pending one.
pub enum SaveResult {
    Sync(Result<(), String>),
    Pending(Pin<Box<dyn Future<Output = Result<(), String>> + Send>>),
}

/// The injected persistence callback.
pub trait SaveHandler: Send {
    fn save(&mut self, html: String) -> SaveResult;
}

impl<F> SaveHandler for F
where
    F: FnMut(String) -> SaveResult + Send,
{
    fn save(&mut self, html: String) -> SaveResult {
        self(html)
    }
}

/// Save status for one document.
#[derive(Debug)]
pub struct SaveState {
    pub status: SaveStatus,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub dirty: bool,
    pub disabled: bool,
}

impl SaveState {
    pub fn new() -> Self {
        Self {
            status: SaveStatus::Idle,
            last_saved_at: None,
            dirty: false,
            disabled: false,
        }
    }

    /// Mark the document changed since the last save.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Status line for the toolbar.
    pub fn status_text(&self) -> String {
        match self.status {
            SaveStatus::Saving => "Saving...".to_string(),
            SaveStatus::Saved => match self.last_saved_at {
                Some(at) => format!("Saved at {}", at.format("%H:%M:%S")),
                None => "Saved".to_string(),
            },
            SaveStatus::Error => "Save failed".to_string(),
            SaveStatus::Idle => {
                if self.dirty {
                    "Unsaved changes".to_string()
                } else {
                    String::new()
                }
            }
        }
    }

    pub fn status_class(&self) -> &'static str {
        match self.status {
            SaveStatus::Saving => "text-muted",
            SaveStatus::Saved => "text-success",
            SaveStatus::Error => "text-danger",
            SaveStatus::Idle => {
                if self.dirty {
                    "text-warning"
                } else {
                    "text-muted"
                }
            }
        }
    }
}

impl Default for SaveState {
    fn default() -> Self {
        Self::new()
    }
}

/// Trigger a save unless one is already in flight (or saving is
/// disabled). Returns whether a save was actually started.
pub async fn trigger_save<H: SaveHandler + ?Sized>(
    state: &Arc<Mutex<SaveState>>,
    html: String,
    handler: &mut H,
) -> bool {
    {
        let mut guard = state.lock().await;
        if guard.disabled || guard.status == SaveStatus::Saving {
            return false;
        }
        guard.status = SaveStatus::Saving;
    }

    let result = match handler.save(html) {
        SaveResult::Sync(result) => result,
        SaveResult::Pending(future) => future.await,
    };

    let mut guard = state.lock().await;
    match result {
        Ok(()) => {
            guard.dirty = false;
            guard.status = SaveStatus::Saved;
            guard.last_saved_at = Some(Utc::now());
        }
        Err(error) => {
            tracing::error!(%error, "save failed");
            guard.status = SaveStatus::Error;
        }
    }
    true
}

/// Periodic auto-save: fires only when the document is dirty and no save
/// is in progress. The task is aborted on drop, so a disposed editor
/// never saves again.
pub struct AutoSave {
    handle: JoinHandle<()>,
}

impl AutoSave {
    pub fn spawn<H, F>(
        state: Arc<Mutex<SaveState>>,
        interval_secs: u64,
        content_source: F,
        mut handler: H,
    ) -> Self
    where
        H: SaveHandler + 'static,
        F: Fn() -> String + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let period = Duration::from_secs(interval_secs.max(1));
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // immediate first tick is not a save
            loop {
                interval.tick().await;
                let should_save = {
                    let guard = state.lock().await;
                    guard.dirty && !guard.disabled && guard.status != SaveStatus::Saving
                };
                if should_save {
                    let html = content_source();
                    trigger_save(&state, html, &mut handler).await;
                }
            }
        });
        Self { handle }
    }

    /// Stop the timer. Also happens on drop.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for AutoSave {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(calls: Arc<AtomicUsize>) -> impl SaveHandler {
        move |_html: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            SaveResult::Sync(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_sync_save_updates_state() {
        let state = Arc::new(Mutex::new(SaveState::new()));
        state.lock().await.mark_dirty();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut handler = counting_handler(calls.clone());

        assert!(trigger_save(&state, "<p>x</p>".to_string(), &mut handler).await);
        let guard = state.lock().await;
        assert_eq!(guard.status, SaveStatus::Saved);
        assert!(!guard.dirty);
        assert!(guard.last_saved_at.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_to_error() {
        let state = Arc::new(Mutex::new(SaveState::new()));
        state.lock().await.mark_dirty();

        let mut handler = |_html: String| SaveResult::Sync(Err("boom".to_string()));
        trigger_save(&state, "<p></p>".to_string(), &mut handler).await;

        let guard = state.lock().await;
        assert_eq!(guard.status, SaveStatus::Error);
        // Still dirty: the content never reached storage
        assert!(guard.dirty);
        assert_eq!(guard.status_text(), "Save failed");
    }

    #[tokio::test]
    async fn test_save_in_flight_suppresses_second_save() {
        let state = Arc::new(Mutex::new(SaveState::new()));
        state.lock().await.mark_dirty();

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_first = calls.clone();
        let mut gate = Some(gate);
        let first = {
            let state = state.clone();
            let mut handler = move |_html: String| {
                calls_first.fetch_add(1, Ordering::SeqCst);
                let gate = gate.take().expect("handler called once");
                SaveResult::Pending(Box::pin(async move {
                    let _ = gate.await;
                    Ok(())
                }))
            };
            tokio::spawn(async move {
                trigger_save(&state, "<p>1</p>".to_string(), &mut handler).await
            })
        };

        // Wait until the first save holds the Saving status
        loop {
            if state.lock().await.status == SaveStatus::Saving {
                break;
            }
            tokio::task::yield_now().await;
        }

        // Second trigger while pending: ignored
        let calls_second = calls.clone();
        let mut second_handler = counting_handler(calls_second);
        let started =
            trigger_save(&state, "<p>2</p>".to_string(), &mut second_handler).await;
        assert!(!started);

        release.send(()).unwrap();
        assert!(first.await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.lock().await.status, SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_fires_only_when_dirty() {
        let state = Arc::new(Mutex::new(SaveState::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let autosave = AutoSave::spawn(
            state.clone(),
            30,
            || "<p>auto</p>".to_string(),
            counting_handler(calls.clone()),
        );

        // Clean document: the interval elapses without saving
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        state.lock().await.mark_dirty();
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.lock().await.status, SaveStatus::Saved);

        drop(autosave);
    }

    #[tokio::test]
    async fn test_autosave_cancel_idempotent() {
        let state = Arc::new(Mutex::new(SaveState::new()));
        let autosave = AutoSave::spawn(
            state,
            30,
            || String::new(),
            |_html: String| SaveResult::Sync(Ok(())),
        );
        autosave.cancel();
        autosave.cancel();
        drop(autosave);
    }

    #[test]
    fn test_status_text() {
        let mut state = SaveState::new();
        assert_eq!(state.status_text(), "");

        state.mark_dirty();
        assert_eq!(state.status_text(), "Unsaved changes");
        assert_eq!(state.status_class(), "text-warning");

        state.status = SaveStatus::Saving;
        assert_eq!(state.status_text(), "Saving...");
    }
}
