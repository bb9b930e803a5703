use serde::{Deserialize, Serialize};
use std::fmt;

pub const WELCOME_MESSAGE: &str = "Hello! Welcome to EcoSim. I'm your virtual assistant. \
Feel free to ask questions about the simulation!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
            Role::Assistant => "assistant",
        }
    }
}

/// Ties a user message to the assistant reply it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(pub u64);

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<ExchangeId>,
}

/// Append-only conversation log; insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_exchange: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript opened by the assistant's welcome line.
    pub fn with_greeting() -> Self {
        let mut transcript = Self::new();
        transcript.push_system(WELCOME_MESSAGE);
        transcript
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role: Role::System,
            text: text.into(),
            exchange: None,
        });
    }

    /// Appends the user's message and opens an exchange for its reply.
    pub fn begin_exchange(&mut self, text: impl Into<String>) -> ExchangeId {
        let id = ExchangeId(self.next_exchange);
        self.next_exchange += 1;
        self.entries.push(TranscriptEntry {
            role: Role::User,
            text: text.into(),
            exchange: Some(id),
        });
        id
    }

    /// Appends the assistant reply for `id`.
    ///
    /// Refused (returns `false`) for exchanges that were never opened here or
    /// already have a reply.
    pub fn complete_exchange(&mut self, id: ExchangeId, reply: impl Into<String>) -> bool {
        let opened = self.entry_for(id, Role::User).is_some();
        if !opened || self.reply_to(id).is_some() {
            return false;
        }
        self.entries.push(TranscriptEntry {
            role: Role::Assistant,
            text: reply.into(),
            exchange: Some(id),
        });
        true
    }

    pub fn reply_to(&self, id: ExchangeId) -> Option<&TranscriptEntry> {
        self.entry_for(id, Role::Assistant)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_for(&self, id: ExchangeId, role: Role) -> Option<&TranscriptEntry> {
        self.entries
            .iter()
            .find(|entry| entry.role == role && entry.exchange == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_comes_first() {
        let transcript = Transcript::with_greeting();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.entries()[0].role, Role::System);
        assert_eq!(transcript.entries()[0].text, WELCOME_MESSAGE);
    }

    #[test]
    fn replies_follow_their_message() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_exchange("How many foxes?");
        let second = transcript.begin_exchange("And bears?");
        assert!(transcript.complete_exchange(second, "Five bears."));
        assert!(transcript.complete_exchange(first, "Ten foxes."));

        let roles: Vec<Role> = transcript.entries().iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::User, Role::Assistant, Role::Assistant]
        );
        assert_eq!(transcript.reply_to(first).unwrap().text, "Ten foxes.");
    }

    #[test]
    fn unknown_or_repeated_replies_are_refused() {
        let mut transcript = Transcript::new();
        assert!(!transcript.complete_exchange(ExchangeId(7), "stray"));
        let id = transcript.begin_exchange("hi");
        assert!(transcript.complete_exchange(id, "hello"));
        assert!(!transcript.complete_exchange(id, "hello again"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn entries_serialize_with_lowercase_roles() {
        let mut transcript = Transcript::new();
        transcript.begin_exchange("hi");
        let json = serde_json::to_value(transcript.entries()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"role": "user", "text": "hi", "exchange": 0}])
        );
    }
}
