use serde::{Deserialize, Serialize};

/// Query of `GET /dataset`; both halves default to the selector's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetQuery {
    pub slice: Option<String>,
    pub kind: Option<String>,
}

/// Messages received over `POST /api/messages`, with the replies interleaved.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<String>,
}

impl MessageLog {
    /// Stores a message and its reply; returns the index of the message.
    pub fn record(&mut self, message: String, reply: String) -> usize {
        self.messages.push(message);
        self.messages.push(reply);
        self.messages.len() - 2
    }

    pub fn last(&self) -> Option<(usize, &str)> {
        self.messages
            .last()
            .map(|text| (self.messages.len() - 1, text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_returns_message_index() {
        let mut log = MessageLog::default();
        assert!(log.last().is_none());
        assert_eq!(log.record("hi".into(), "hello".into()), 0);
        assert_eq!(log.record("again".into(), "sure".into()), 2);
        assert_eq!(log.last(), Some((3, "sure")));
    }
}
