//! Generation-endpoint backends for Frontdesk.
//!
//! [`OpenAiChatProvider`] talks to any OpenAI-compatible
//! `/v1/chat/completions` endpoint; [`credentials`] resolves the API key
//! and optional project/organization headers from the environment or a
//! secrets file, cached process-wide.

pub mod credentials;
pub mod openai;

pub use credentials::Credentials;
pub use openai::OpenAiChatProvider;
