//! AI-assisted text refinement with undo-style history and guarded
//! automatic processing.
//!
//! The crate is UI-agnostic: a presentation surface drives the
//! [`Editor`] mutators and reads state back through [`Editor::state`];
//! the text-generation backend is injected behind the
//! [`RefineProvider`] trait, and the [`AutoProcessScheduler`] requests
//! new suggestions on a timer until a failed request suppresses it.

pub mod api;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod history;
pub mod scheduler;
pub mod state;
pub mod store;

pub use api::{
    create_provider, Message, MessageRole, RefineError, RefineProvider, RefineRequest,
};
pub use clock::{Clock, SystemClock};
pub use config::{AppConfig, ProviderConfig};
pub use engine::Editor;
pub use history::{HistoryEntry, HistoryLog};
pub use scheduler::AutoProcessScheduler;
pub use state::{EditorState, Language};
pub use store::{Snapshot, StateStore};
