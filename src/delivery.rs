use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub(crate) const DEFAULT_MAX_SEGMENT_LEN: usize = 4000;
const TELEGRAM_API: &str = "https://api.telegram.org";


#[derive(Debug, Error)]
pub(crate) enum DeliveryError {
    /// The request URL carries the bot token, so it is stripped from these errors
    #[error("Failed to reach the chat service: {0}")]
    Http(reqwest::Error),
    #[error("Chat service rejected the message: {0}")]
    Rejected(String),
}


/// Somewhere report messages can be posted to
#[async_trait]
pub(crate) trait DeliveryChannel: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str, parse_mode: &str) -> Result<(), DeliveryError>;
}


/// Posts messages through the Telegram Bot API
pub(crate) struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}


#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}


#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}


impl TelegramChannel {
    pub(crate) fn new(client: reqwest::Client, bot_token: String) -> Self {
        Self::with_api_base(client, TELEGRAM_API.to_string(), bot_token)
    }

    pub(crate) fn with_api_base(client: reqwest::Client, api_base: String, bot_token: String) -> Self {
        Self { client, api_base, bot_token }
    }
}


#[async_trait]
impl DeliveryChannel for TelegramChannel {
    async fn send(&self, chat_id: &str, text: &str, parse_mode: &str) -> Result<(), DeliveryError> {
        let response = self.client
            .post(format!("{}/bot{}/sendMessage", self.api_base, self.bot_token))
            .json(&SendMessage { chat_id, text, parse_mode })
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;

        let status = response.status();
        // Telegram explains failures in the body, so read it before looking at the status
        let reply: ApiReply = response
            .json()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;
        if !status.is_success() || !reply.ok {
            return Err(DeliveryError::Rejected(
                reply.description.unwrap_or_else(|| status.to_string())
            ));
        }
        Ok(())
    }
}


/// Splits `message` into consecutive pieces of at most `max_len` chars.
///
/// Concatenating the pieces gives back `message` exactly.
pub(crate) fn segments(message: &str, max_len: usize) -> Vec<&str> {
    assert!(max_len > 0, "segment length must be positive");
    let mut segments = Vec::new();
    let mut rest = message;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_len)
            .map_or(rest.len(), |(i, _)| i);
        let (segment, tail) = rest.split_at(end);
        segments.push(segment);
        rest = tail;
    }
    segments
}


/// Sends `message` in order, one segment at a time.
///
/// Stops at the first segment that fails to send and returns its error.
pub(crate) async fn dispatch(
    channel: &dyn DeliveryChannel,
    chat_id: &str,
    message: &str,
    max_len: usize,
    parse_mode: &str
) -> Result<(), DeliveryError> {
    let segments = segments(message, max_len);
    let count = segments.len();
    for (i, segment) in segments.into_iter().enumerate() {
        debug!(segment = i + 1, of = count, chars = segment.chars().count(), "Sending message segment");
        channel.send(chat_id, segment, parse_mode).await?;
    }
    Ok(())
}


#[cfg(test)]
pub(crate) mod tests {
    use tokio::sync::Mutex;

    use super::*;

    /// Records what it is sent and fails on the segment numbered `fail_at`
    #[derive(Default)]
    pub(crate) struct FakeChannel {
        pub(crate) sent: Mutex<Vec<(String, String, String)>>,
        pub(crate) fail_at: Option<usize>,
    }

    #[async_trait]
    impl DeliveryChannel for FakeChannel {
        async fn send(&self, chat_id: &str, text: &str, parse_mode: &str) -> Result<(), DeliveryError> {
            let mut sent = self.sent.lock().await;
            if self.fail_at == Some(sent.len()) {
                return Err(DeliveryError::Rejected("Bad Request: chat not found".to_string()));
            }
            sent.push((chat_id.to_string(), text.to_string(), parse_mode.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn long_message_is_sent_in_order_in_fixed_size_segments() {
        let message: String = (0..9000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let channel = FakeChannel::default();

        dispatch(&channel, "@jobs", &message, 4000, "Markdown").await.unwrap();

        let sent = channel.sent.lock().await;
        let lengths: Vec<_> = sent.iter().map(|(_, text, _)| text.len()).collect();
        assert_eq!(lengths, [4000, 4000, 1000]);
        let joined: String = sent.iter().map(|(_, text, _)| text.as_str()).collect();
        assert_eq!(joined, message);
        assert!(sent.iter().all(|(chat, _, mode)| chat == "@jobs" && mode == "Markdown"));
    }

    #[tokio::test]
    async fn short_message_is_one_segment() {
        let channel = FakeChannel::default();
        dispatch(&channel, "@jobs", "No new jobs found today.", 4000, "Markdown").await.unwrap();
        assert_eq!(channel.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_is_returned_and_stops_sending() {
        let channel = FakeChannel { fail_at: Some(1), ..Default::default() };
        let message = "x".repeat(10);

        let result = dispatch(&channel, "@jobs", &message, 3, "Markdown").await;

        assert!(matches!(result, Err(DeliveryError::Rejected(_))));
        assert_eq!(channel.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_bot_token() {
        // nothing listens on port 1
        let channel = TelegramChannel::with_api_base(
            reqwest::Client::new(),
            "http://127.0.0.1:1".to_string(),
            "123456:SECRET-TOKEN".to_string(),
        );

        let err = channel.send("@jobs", "hello", "Markdown").await.unwrap_err();

        assert!(matches!(err, DeliveryError::Http(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET-TOKEN"), "{err:?}");
    }

    #[test]
    fn segments_never_split_a_char() {
        let message = "ééé€€€abc";
        let segments = segments(message, 4);
        assert_eq!(segments, ["ééé€", "€€ab", "c"]);
        assert_eq!(segments.concat(), message);
    }

    #[test]
    fn empty_message_has_no_segments() {
        assert!(segments("", 4000).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_segment() {
        let message = "y".repeat(8000);
        let lengths: Vec<_> = segments(&message, 4000).iter().map(|s| s.len()).collect();
        assert_eq!(lengths, [4000, 4000]);
    }
}
