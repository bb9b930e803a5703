pub mod client;
pub mod history;
pub mod transport;
pub mod wire;

pub use client::TranscriptClient;
pub use history::{ExchangeId, Role, Transcript, TranscriptEntry, WELCOME_MESSAGE};
pub use transport::{AssistantTransport, HttpAssistant};
pub use wire::{AssistantReply, LastMessage, MessageRequest, MessageResponse};
