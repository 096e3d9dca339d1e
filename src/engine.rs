use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use crate::api::{create_provider, RefineError, RefineProvider, RefineRequest};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::history::HistoryEntry;
use crate::state::{EditorState, Language};
use crate::store::StateStore;

/// The editing context: the authoritative [`EditorState`] plus the
/// injected refinement provider, clock, and snapshot store.
///
/// All mutations are synchronous and atomic from the caller's point of
/// view; the only suspension point is awaiting the provider inside
/// [`Editor::generate_suggestion`], and the state lock is never held
/// across it. Cloning is cheap and every clone drives the same session,
/// so the presentation surface, the scheduler, and background tasks can
/// each hold one.
#[derive(Clone)]
pub struct Editor {
    state: Arc<Mutex<EditorState>>,
    provider: Arc<dyn RefineProvider>,
    store: Arc<StateStore>,
}

impl Editor {
    /// Builds an editor around the given collaborators, rehydrating the
    /// persisted subset (credential, history, language) from the store.
    pub fn new(
        provider: Arc<dyn RefineProvider>,
        store: StateStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = EditorState::from_snapshot(store.load(), clock);
        Self {
            state: Arc::new(Mutex::new(state)),
            provider,
            store: Arc::new(store),
        }
    }

    /// Convenience constructor: active provider from the configuration,
    /// default storage location, wall clock.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider_config = config
            .get_active_provider()
            .context("Active provider is not defined in the configuration")?;
        let provider = create_provider(provider_config);
        Ok(Self::new(provider, StateStore::default(), Arc::new(SystemClock)))
    }

    /// A point-in-time copy of the full state, for the presentation
    /// surface to read.
    pub fn state(&self) -> EditorState {
        self.lock().clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        let mut s = self.lock();
        s.set_input(text);
        self.persist(&s);
    }

    pub fn set_guidance(&self, text: impl Into<String>) {
        let mut s = self.lock();
        s.set_guidance(text);
        self.persist(&s);
    }

    pub fn set_language(&self, language: Language) {
        let mut s = self.lock();
        s.set_language(language);
        self.persist(&s);
    }

    pub fn set_api_key(&self, key: &str) {
        let mut s = self.lock();
        s.set_api_key(key);
        self.persist(&s);
    }

    pub fn set_error(&self, error: Option<String>) {
        let mut s = self.lock();
        s.set_error(error);
        self.persist(&s);
    }

    pub fn set_show_settings(&self, show: bool) {
        let mut s = self.lock();
        s.set_show_settings(show);
        self.persist(&s);
    }

    pub fn promote_suggestion(&self) {
        let mut s = self.lock();
        s.promote_suggestion();
        self.persist(&s);
    }

    pub fn discard_suggestion(&self) {
        let mut s = self.lock();
        s.discard_suggestion();
        self.persist(&s);
    }

    pub fn restore_history_item(&self, entry: HistoryEntry) {
        let mut s = self.lock();
        s.restore_history_item(entry);
        self.persist(&s);
    }

    pub fn reset(&self) {
        let mut s = self.lock();
        s.reset();
        self.persist(&s);
    }

    /// Reachability/entitlement probe against the configured provider,
    /// using the currently stored credential.
    pub async fn check_provider(&self) -> std::result::Result<(), RefineError> {
        let api_key = {
            let s = self.lock();
            if s.api_key.is_empty() {
                None
            } else {
                Some(s.api_key.clone())
            }
        };
        self.provider.check_availability(api_key.as_deref()).await
    }

    /// Whether an automatic tick should be skipped: a standing request
    /// error, or a credential that already failed and has not been
    /// changed. Keyless providers are never suppressed.
    pub fn auto_process_suppressed(&self) -> bool {
        if !self.provider.requires_api_key() {
            return false;
        }
        let s = self.lock();
        s.has_api_error || s.last_failed_api_key.as_deref() == Some(s.api_key.as_str())
    }

    /// Requests a rewrite of the current text.
    ///
    /// Short-circuits without dispatching when a request is already in
    /// flight, when a required credential is missing (the settings
    /// signal is raised instead) or known bad, or when there is nothing
    /// new to process. A dispatch clears any standing error first: a
    /// manual trigger counts as a retry.
    ///
    /// Never returns an error; every failure ends as a state update
    /// with a classified, human-readable message.
    ///
    /// An in-flight request is not cancelled by later edits. Its result
    /// is applied when it resolves, so a suggestion can refer to the
    /// text as it was at dispatch time.
    pub async fn generate_suggestion(&self) {
        let needs_key = self.provider.requires_api_key();

        let request = {
            let mut s = self.lock();
            if s.is_processing {
                return;
            }
            if needs_key && s.api_key.is_empty() {
                s.show_settings = true;
                return;
            }
            if needs_key && s.last_failed_api_key.as_deref() == Some(s.api_key.as_str()) {
                return;
            }
            if s.input.trim().is_empty() || s.input == s.last_processed_input {
                return;
            }

            s.is_processing = true;
            s.error = None;
            s.has_api_error = false;

            RefineRequest {
                text: s.input.clone(),
                guidance: if s.guidance.trim().is_empty() {
                    s.language.default_guidance().to_string()
                } else {
                    s.guidance.clone()
                },
                language: s.language,
                api_key: if s.api_key.is_empty() {
                    None
                } else {
                    Some(s.api_key.clone())
                },
            }
        };

        let result = self.provider.refine(&request).await;

        let mut s = self.lock();
        match result.map(|raw| normalize_response(&raw)) {
            Ok(text) if !text.is_empty() => {
                tracing::info!(provider = self.provider.name(), "suggestion ready");
                s.suggestion = Some(text);
                s.last_processed_input = request.text.clone();
                s.is_processing = false;
            }
            Ok(_) => self.apply_failure(
                &mut s,
                &request,
                RefineError::Transient("No response from AI".to_string()),
            ),
            Err(error) => self.apply_failure(&mut s, &request, error),
        }
        self.persist(&s);
    }

    fn apply_failure(&self, s: &mut EditorState, request: &RefineRequest, error: RefineError) {
        tracing::error!(provider = self.provider.name(), "refinement failed: {error}");
        let needs_key = self.provider.requires_api_key();
        match error {
            RefineError::Credential(message) if needs_key => {
                s.error = Some(format!(
                    "API key error: {message}. Please update your API key in settings."
                ));
                s.last_failed_api_key = request.api_key.clone();
                s.has_api_error = true;
                s.show_settings = true;
            }
            RefineError::Access(message) if needs_key => {
                s.error = Some(format!("Model access error: {message}"));
                s.has_api_error = true;
            }
            RefineError::Credential(message)
            | RefineError::Access(message)
            | RefineError::Transient(message) => {
                s.error = Some(message);
                s.has_api_error = true;
            }
        }
        s.is_processing = false;
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, state: &EditorState) {
        if let Err(e) = self.store.save(&state.snapshot()) {
            tracing::warn!("Failed to persist editor snapshot: {e:#}");
        }
    }
}

/// Normalizes a raw provider response: trims whitespace and strips a
/// single matching pair of straight quotes wrapping the whole text.
fn normalize_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    stripped.trim().to_string()
}
