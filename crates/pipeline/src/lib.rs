//! The notus pipelines.
//!
//! One request-scoped pipeline per user-visible operation:
//!
//! 1. **Chat** (`chat`) — the full path: registry → retrieval → assembly →
//!    dispatch → persistence.
//! 2. **Post generation** (`generator`) — single-shot structured long-form
//!    drafting from a transcript; no retrieval, no history, no persistence.
//! 3. **Tone analysis** (`tone`) — single-shot voice profiling over a batch
//!    of prior posts, with a fixed fallback when the model's JSON doesn't
//!    parse.
//!
//! The prompt assembler (`assembler`) is shared by all three.

pub mod assembler;
pub mod chat;
pub mod generator;
pub mod tone;

pub use assembler::build_prompt;
pub use chat::{ChatOutcome, ChatPipeline, ChatTurnRequest};
pub use generator::{GenerateRequest, Platform, PostGenerator};
pub use tone::{ToneAnalyzer, ToneProfile};

#[cfg(test)]
pub(crate) mod test_helpers;
