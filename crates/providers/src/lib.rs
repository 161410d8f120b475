//! Model dispatch for notus.
//!
//! One strategy client per provider wire shape (`openai`, `anthropic`), an
//! env-backed credentials source (`credentials`), and the dispatcher that
//! selects a client by the resolved agent config (`dispatcher`). Provider
//! request/response shapes never leak past this crate.

pub mod anthropic;
pub mod credentials;
pub mod dispatcher;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use credentials::EnvCredentials;
pub use dispatcher::Dispatcher;
pub use openai::OpenAiClient;
