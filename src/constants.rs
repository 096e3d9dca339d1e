//! Application-wide constants for redraft.
//!
//! Centralizes all magic numbers and default texts to improve maintainability
//! and make the codebase self-documenting.

use std::time::Duration;

// ============================================================================
// Application Identity
// ============================================================================

/// Directory name used under the platform config and data directories.
pub const APP_DIR_NAME: &str = "redraft";

// ============================================================================
// Persistence
// ============================================================================

/// Fixed file name for the persisted editor snapshot (credential, history,
/// language). The snapshot lives under the platform data directory.
pub const STORAGE_FILE_NAME: &str = "editor-storage.json";

/// File name for the provider configuration under the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// ============================================================================
// Auto-processing
// ============================================================================

/// Interval between automatic refinement attempts while the scheduler is
/// armed. The suppression guard is re-evaluated on every tick.
pub const AUTO_PROCESS_INTERVAL: Duration = Duration::from_secs(3);

// ============================================================================
// AI Providers
// ============================================================================

/// HTTP request timeout for refinement calls.
pub const AI_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature. Low to keep rewrites close to the source text.
pub const AI_TEMPERATURE: f32 = 0.2;

/// Nucleus sampling cutoff.
pub const AI_TOP_P: f32 = 0.9;

/// Fixed seed for reproducible rewrites where the backend supports it.
pub const AI_SEED: u32 = 42;

/// Default base URL for a local Ollama instance.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// System prompt sent with every refinement request unless the provider
/// configuration overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful writing assistant. \
Your task is to rewrite the user's text based on their specific guidance. \
Return ONLY the rewritten text, no explanations or quotes. \
IMPORTANT: You must output the text in the SAME LANGUAGE as the original \
input text, regardless of the language of the guidance.";

// ============================================================================
// Default Guidance
// ============================================================================

/// Default rewriting instruction when the interface language is Finnish.
pub const DEFAULT_GUIDANCE_FI: &str =
    "Korjaa kieliasu ja paranna tekstin sujuvuutta pitäen alkuperäinen sävy";

/// Default rewriting instruction when the interface language is English.
pub const DEFAULT_GUIDANCE_EN: &str =
    "Fix grammar and improve text fluency while maintaining the original tone";
