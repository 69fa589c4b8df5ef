//! Coach assistant chat, answered token by token.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::stream::ByteStream;

pub const STREAM_PATH: &str = "/chat/stream";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub message: String,
}

/// Send a message and stream the reply. Iterate `text_chunks()` on the
/// result to render tokens as they arrive.
pub fn send_message_stream(client: &ApiClient, input: &ChatMessage) -> Result<ByteStream, ApiError> {
    client.request_stream(&ApiRequest::post(STREAM_PATH).json(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{client_with, signed_in, CannedTransport};

    fn message() -> ChatMessage {
        ChatMessage {
            conversation_id: None,
            message: "Plan my week".into(),
        }
    }

    #[test]
    fn streams_reply() {
        let transport = CannedTransport::new(200, "Monday: rest.");
        let client = client_with(transport.clone(), signed_in());
        let reply = send_message_stream(&client, &message()).unwrap().collect_text().unwrap();
        assert_eq!(reply, "Monday: rest.");
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn empty_reply_is_an_error() {
        let client = client_with(CannedTransport::without_body(200), signed_in());
        let err = send_message_stream(&client, &message()).unwrap_err();
        assert!(matches!(err, ApiError::EmptyStream { .. }));
    }
}
