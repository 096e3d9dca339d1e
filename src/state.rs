use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::constants::{DEFAULT_GUIDANCE_EN, DEFAULT_GUIDANCE_FI};
use crate::history::{HistoryEntry, HistoryLog};
use crate::store::Snapshot;

/// Interface language. Selects the default guidance text and is carried
/// on every refinement request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Rewriting instruction used when the user has not typed any guidance.
    pub fn default_guidance(&self) -> &'static str {
        match self {
            Language::Finnish => DEFAULT_GUIDANCE_FI,
            Language::English => DEFAULT_GUIDANCE_EN,
        }
    }

    /// BCP 47-ish tag forwarded with refinement requests.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Finnish => "fi",
            Language::English => "en",
        }
    }
}

/// The authoritative record of the editing session: current text,
/// guidance, the pending suggestion, the undo history, and the error
/// bookkeeping that gates automatic processing.
///
/// Mutations go through the methods below; they maintain the invariants
/// the rest of the crate relies on (a pending suggestion never survives
/// a text replacement, history entries are only prepended or removed by
/// id, and `has_api_error` is cleared exactly by the compensating edits
/// described on each mutator).
#[derive(Clone)]
pub struct EditorState {
    /// Text under edit.
    pub input: String,
    /// Free-text rewriting instruction; empty means the language default
    /// is used at dispatch time.
    pub guidance: String,
    pub language: Language,
    /// Most recent unconsumed AI rewrite. At most one at a time.
    pub suggestion: Option<String>,
    pub history: HistoryLog,
    /// True strictly between request dispatch and its resolution.
    pub is_processing: bool,
    /// Last text a suggestion was produced for, or that was just promoted
    /// or restored. Suppresses redundant requests for unchanged input.
    pub last_processed_input: String,
    pub api_key: String,
    /// Credential that produced an authentication failure. Requests are
    /// not re-dispatched while the configured key still matches it.
    pub last_failed_api_key: Option<String>,
    /// True after any failed request until a compensating edit clears it.
    /// Gates the auto-process scheduler.
    pub has_api_error: bool,
    /// User-facing description of the last failure.
    pub error: Option<String>,
    /// Signal to the presentation surface that the settings dialog should
    /// be opened (missing or rejected credential).
    pub show_settings: bool,

    next_entry_id: u64,
    clock: Arc<dyn Clock>,
}

impl EditorState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::from_snapshot(Snapshot::default(), clock)
    }

    /// Rehydrates the persisted subset (credential, history, language);
    /// everything else starts empty. The id counter resumes past the
    /// largest persisted entry id.
    pub fn from_snapshot(snapshot: Snapshot, clock: Arc<dyn Clock>) -> Self {
        let next_entry_id = snapshot.history.max_id().map_or(1, |id| id + 1);
        Self {
            input: String::new(),
            guidance: String::new(),
            language: snapshot.language,
            suggestion: None,
            history: snapshot.history,
            is_processing: false,
            last_processed_input: String::new(),
            api_key: snapshot.api_key,
            last_failed_api_key: None,
            has_api_error: false,
            error: None,
            show_settings: false,
            next_entry_id,
            clock,
        }
    }

    /// The subset that survives restarts.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            api_key: self.api_key.clone(),
            history: self.history.clone(),
            language: self.language,
        }
    }

    /// Replaces the text under edit. A new edit counts as an implicit
    /// retry reset: it clears a standing request error (but not the
    /// remembered failed credential).
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.has_api_error {
            self.has_api_error = false;
            self.error = None;
        }
        self.input = text.into();
    }

    pub fn set_guidance(&mut self, text: impl Into<String>) {
        self.guidance = text.into();
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Stores a trimmed credential. Supplying a key that differs from the
    /// one that last failed, while an error is showing, clears the error
    /// state and forgets the failed credential.
    pub fn set_api_key(&mut self, key: &str) {
        let trimmed = key.trim().to_string();
        if self.error.is_some() && self.last_failed_api_key.as_deref() != Some(trimmed.as_str()) {
            self.error = None;
            self.last_failed_api_key = None;
            self.has_api_error = false;
        }
        self.api_key = trimmed;
    }

    /// `None` is an explicit dismissal and also clears `has_api_error`;
    /// a message only replaces the message (the caller owns the flag).
    pub fn set_error(&mut self, error: Option<String>) {
        match error {
            None => {
                self.error = None;
                self.has_api_error = false;
            }
            Some(message) => self.error = Some(message),
        }
    }

    pub fn set_show_settings(&mut self, show: bool) {
        self.show_settings = show;
    }

    /// Accepts the pending suggestion: the displaced text is archived to
    /// the front of the history and the suggestion becomes the input.
    /// Marking it as the last processed input prevents the promoted text
    /// from being immediately re-submitted.
    pub fn promote_suggestion(&mut self) {
        let Some(suggestion) = self.suggestion.take() else {
            return;
        };
        let displaced = std::mem::replace(&mut self.input, suggestion.clone());
        self.push_history_entry(displaced);
        self.last_processed_input = suggestion;
    }

    /// Drops the pending suggestion without touching the input.
    pub fn discard_suggestion(&mut self) {
        self.suggestion = None;
    }

    /// Pulls an archived text back into the input slot. Whatever was
    /// current is archived first (if non-blank) so nothing is lost, then
    /// the restored entry is removed from the log by id.
    pub fn restore_history_item(&mut self, entry: HistoryEntry) {
        if !self.input.trim().is_empty() {
            let current = self.input.clone();
            self.push_history_entry(current);
        }
        self.history.remove(entry.id);
        self.last_processed_input = entry.text.clone();
        self.input = entry.text;
        self.suggestion = None;
    }

    /// Clears the whole session except the credential; language returns
    /// to its default. Irreversible: callers must confirm with the user
    /// before invoking.
    pub fn reset(&mut self) {
        self.input.clear();
        self.guidance.clear();
        self.language = Language::default();
        self.suggestion = None;
        self.history.clear();
        self.error = None;
        self.last_processed_input.clear();
        self.is_processing = false;
        self.last_failed_api_key = None;
        self.has_api_error = false;
    }

    fn push_history_entry(&mut self, text: String) {
        let entry = HistoryEntry {
            id: self.next_entry_id,
            text,
            captured_at: self.clock.now(),
        };
        self.next_entry_id += 1;
        self.history.push_front(entry);
    }
}
