//! Agent registry for notus.
//!
//! Maps a named role to the model configuration a pipeline invocation runs
//! with. Two sources: compiled-in defaults (`defaults`) and tenant overrides
//! resolved through the `ConfigStore` capability (`registry`).

pub mod defaults;
pub mod registry;

pub use defaults::{BUILTIN_ROLES, FALLBACK_ROLE, default_for};
pub use registry::AgentRegistry;
