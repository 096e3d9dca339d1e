use std::time::Duration;

use tokio::task::JoinHandle;

use crate::constants::AUTO_PROCESS_INTERVAL;
use crate::engine::Editor;

/// Recurring driver for [`Editor::generate_suggestion`].
///
/// Two states: armed (a timer task is running) and disarmed. While
/// armed, every interval the suppression guard is evaluated against the
/// freshest editor state, so a credential fix or an error dismissal
/// between ticks re-enables firing on the next tick without re-arming.
/// Disarming aborts the pending timer outright; re-arming starts a
/// fresh interval from zero.
pub struct AutoProcessScheduler {
    editor: Editor,
    interval: Duration,
    worker: Option<JoinHandle<()>>,
}

impl AutoProcessScheduler {
    pub fn new(editor: Editor) -> Self {
        Self::with_interval(editor, AUTO_PROCESS_INTERVAL)
    }

    pub fn with_interval(editor: Editor, interval: Duration) -> Self {
        Self {
            editor,
            interval,
            worker: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.worker.is_some()
    }

    /// Flips between armed and disarmed. Returns the new armed state.
    pub fn toggle(&mut self) -> bool {
        if self.is_armed() {
            self.disarm();
        } else {
            self.arm();
        }
        self.is_armed()
    }

    pub fn arm(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let editor = self.editor.clone();
        let interval = self.interval;
        self.worker = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if editor.auto_process_suppressed() {
                    tracing::debug!("Auto-process tick skipped after request error");
                    continue;
                }
                editor.generate_suggestion().await;
            }
        }));
        tracing::debug!(interval = ?self.interval, "Auto-process armed");
    }

    pub fn disarm(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
            tracing::debug!("Auto-process disarmed");
        }
    }
}

impl Drop for AutoProcessScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::testing::MockProvider;
    use crate::api::RefineError;
    use crate::clock::testing::FixedClock;
    use crate::engine::Editor;
    use crate::store::StateStore;

    fn editor_with(provider: Arc<MockProvider>) -> (tempfile::TempDir, Editor) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path().join("editor-storage.json"));
        let editor = Editor::new(provider, store, Arc::new(FixedClock::default()));
        (dir, editor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_tick_generates_a_suggestion() {
        let provider = Arc::new(MockProvider::uppercase().keyless());
        let (_dir, editor) = editor_with(provider.clone());
        editor.set_input("hello world");

        let mut scheduler = AutoProcessScheduler::new(editor.clone());
        scheduler.arm();

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(provider.calls(), 1);
        assert_eq!(editor.state().suggestion.as_deref(), Some("HELLO WORLD"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_input_ticks_do_not_redispatch() {
        let provider = Arc::new(MockProvider::uppercase().keyless());
        let (_dir, editor) = editor_with(provider.clone());
        editor.set_input("hello");

        let mut scheduler = AutoProcessScheduler::new(editor);
        scheduler.arm();

        tokio::time::sleep(Duration::from_secs(10)).await;
        // The first tick processed the input; later ticks found it
        // unchanged and short-circuited before dispatch.
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_failure_suppresses_following_ticks() {
        let provider = Arc::new(MockProvider::failing(RefineError::Credential(
            "Incorrect API key provided".to_string(),
        )));
        let (_dir, editor) = editor_with(provider.clone());
        editor.set_api_key("sk-bad");
        editor.set_input("hello");

        let mut scheduler = AutoProcessScheduler::new(editor.clone());
        scheduler.arm();

        tokio::time::sleep(Duration::from_secs(20)).await;
        // One dispatch failed; every later tick was suppressed by the guard.
        assert_eq!(provider.calls(), 1);
        assert!(editor.state().has_api_error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_reads_fresh_state_after_credential_change() {
        let provider = Arc::new(MockProvider::fail_once(RefineError::Credential(
            "Incorrect API key provided".to_string(),
        )));
        let (_dir, editor) = editor_with(provider.clone());
        editor.set_api_key("sk-bad");
        editor.set_input("hello");

        let mut scheduler = AutoProcessScheduler::new(editor.clone());
        scheduler.arm();

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(provider.calls(), 1);

        // Fixing the credential between ticks re-enables the next tick
        // without re-arming.
        editor.set_api_key("sk-good");
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(provider.calls(), 2);
        assert_eq!(editor.state().suggestion.as_deref(), Some("HELLO"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_pending_timer() {
        let provider = Arc::new(MockProvider::uppercase().keyless());
        let (_dir, editor) = editor_with(provider.clone());
        editor.set_input("hello");

        let mut scheduler = AutoProcessScheduler::new(editor);
        scheduler.arm();
        scheduler.disarm();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_flips_armed_state() {
        let provider = Arc::new(MockProvider::uppercase().keyless());
        let (_dir, editor) = editor_with(provider);

        let mut scheduler = AutoProcessScheduler::new(editor);
        assert!(!scheduler.is_armed());
        assert!(scheduler.toggle());
        assert!(scheduler.is_armed());
        assert!(!scheduler.toggle());
        assert!(!scheduler.is_armed());
    }
}
