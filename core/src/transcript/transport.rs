use crate::prelude::ExchangeError;
use crate::transcript::wire::{MessageRequest, MessageResponse};
use std::future::Future;

/// Remote side of the conversation: one message in, exactly one reply out on success.
pub trait AssistantTransport: Send + Sync + 'static {
    fn exchange(
        &self,
        message: String,
    ) -> impl Future<Output = Result<String, ExchangeError>> + Send;
}

/// Assistant reached over HTTP at `<base>/api/messages`.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAssistant {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:9000";

    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/messages", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send_message(&self, message: String) -> Result<String, ExchangeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&MessageRequest { message })
            .send()
            .await
            .map_err(|err| ExchangeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let body = response
            .json::<MessageResponse>()
            .await
            .map_err(|err| ExchangeError::Transport(err.to_string()))?;
        body.ai_response
            .map(|reply| reply.text)
            .ok_or(ExchangeError::EmptyReply)
    }
}

impl Default for HttpAssistant {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

impl AssistantTransport for HttpAssistant {
    fn exchange(
        &self,
        message: String,
    ) -> impl Future<Output = Result<String, ExchangeError>> + Send {
        let assistant = self.clone();
        async move { assistant.send_message(message).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        assert_eq!(
            HttpAssistant::new("http://localhost:5000/").endpoint(),
            "http://localhost:5000/api/messages"
        );
        assert_eq!(
            HttpAssistant::default().endpoint(),
            "http://127.0.0.1:9000/api/messages"
        );
    }

    #[tokio::test]
    async fn unreachable_assistant_is_a_transport_failure() {
        let assistant = HttpAssistant::new("http://127.0.0.1:1");
        let err = assistant.send_message("hello".into()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
    }
}
