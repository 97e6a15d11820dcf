use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::citations::extract_citations;
use crate::config::Config;
use crate::constants::{CONNECTION_ERROR_TEXT, EMPTY_RESPONSE_TEXT, HISTORY_LIMIT};
use crate::files::resolve_mime;
use crate::models::{Message, Role, UploadedFile};

#[derive(Serialize, Deserialize, Debug)]
pub struct GenerateRequest {
    pub history: Vec<HistoryTurn>,
    #[serde(rename = "userQuery")]
    pub user_query: String,
    pub files: Vec<FilePayload>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FilePayload {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    text: Option<String>,
    #[allow(dead_code)]
    citations: Option<Vec<String>>,
}

/// What a send always resolves to, success or not.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub citations: Vec<String>,
}

/// Serializes the conversation and attachment set into the outbound shape.
/// History keeps at most the last `HISTORY_LIMIT` turns, dropping system
/// entries, the in-flight typing placeholder, and the entry that duplicates
/// the current query. Assistant turns are relabeled to the remote "model"
/// role.
pub fn build_request(messages: &[Message], query: &str, files: &[UploadedFile]) -> GenerateRequest {
    let history: Vec<HistoryTurn> = messages
        .iter()
        .filter(|m| m.role != Role::System && !m.is_typing && m.content != query)
        .map(|m| HistoryTurn {
            role: match m.role {
                Role::Assistant => "model".to_string(),
                _ => "user".to_string(),
            },
            content: m.content.clone(),
        })
        .collect();
    let skip = history.len().saturating_sub(HISTORY_LIMIT);

    GenerateRequest {
        history: history.into_iter().skip(skip).collect(),
        user_query: query.to_string(),
        files: files
            .iter()
            .filter(|f| f.is_ready())
            .map(|f| FilePayload {
                name: f.name.clone(),
                mime_type: f
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| resolve_mime(&f.declared_type)),
                content: f.content.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

/// One request, one reply. Every failure path degrades to the fixed
/// connection-error text with no citations; the cause is only logged. The
/// caller can rely on this never failing.
pub async fn generate_reply(
    client: &reqwest::Client,
    config: &Config,
    messages: &[Message],
    query: &str,
    files: &[UploadedFile],
) -> ChatReply {
    let attachments: Vec<UploadedFile> = files.iter().filter(|f| f.is_ready()).cloned().collect();
    let request = build_request(messages, query, files);
    debug!(
        "Sending query with {} history turns and {} attachment(s)",
        request.history.len(),
        request.files.len()
    );

    let mut req = client.post(config.generate_url()).json(&request);
    if let Some(key) = &config.api_key {
        req = req.header("Authorization", format!("Bearer {}", key));
    }

    let text = match req.send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<GenerateResponse>().await {
            Ok(body) => match body.text {
                Some(text) if !text.is_empty() => text,
                _ => EMPTY_RESPONSE_TEXT.to_string(),
            },
            Err(e) => {
                error!("Malformed response body: {}", e);
                return ChatReply {
                    text: CONNECTION_ERROR_TEXT.to_string(),
                    citations: Vec::new(),
                };
            }
        },
        Ok(resp) => {
            error!("Generation endpoint returned status {}", resp.status());
            return ChatReply {
                text: CONNECTION_ERROR_TEXT.to_string(),
                citations: Vec::new(),
            };
        }
        Err(e) => {
            error!("Request to generation endpoint failed: {}", e);
            return ChatReply {
                text: CONNECTION_ERROR_TEXT.to_string(),
                citations: Vec::new(),
            };
        }
    };

    let citations = extract_citations(&text, &attachments);
    ChatReply { text, citations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::models::FileStatus;

    fn message(role: Role, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
            is_typing: false,
            citations: Vec::new(),
        }
    }

    fn ready_file(name: &str) -> UploadedFile {
        UploadedFile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size: 4,
            declared_type: "application/pdf".to_string(),
            status: FileStatus::Ready,
            progress: 100,
            content: Some("QUJD".to_string()),
            mime_type: Some("application/pdf".to_string()),
        }
    }

    fn uploading_file(name: &str) -> UploadedFile {
        UploadedFile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size: 4,
            declared_type: "application/pdf".to_string(),
            status: FileStatus::Uploading,
            progress: 30,
            content: None,
            mime_type: None,
        }
    }

    fn test_config(server: &MockServer) -> Config {
        Config {
            api_url: format!("{}/api", server.uri()),
            api_key: None,
        }
    }

    #[test]
    fn test_history_truncated_to_last_twelve() {
        let mut messages = Vec::new();
        messages.push(message(Role::System, "saludo inicial"));
        for i in 0..20 {
            messages.push(message(Role::User, &format!("pregunta {}", i)));
        }
        let mut typing = message(Role::Assistant, "");
        typing.is_typing = true;
        messages.push(typing);

        let request = build_request(&messages, "consulta actual", &[]);
        assert_eq!(request.history.len(), 12);
        assert_eq!(request.history[0].content, "pregunta 8");
        assert_eq!(request.history[11].content, "pregunta 19");
    }

    #[test]
    fn test_history_excludes_current_query_and_relabels_assistant() {
        let messages = vec![
            message(Role::User, "hola"),
            message(Role::Assistant, "buenas"),
            message(Role::User, "consulta actual"),
        ];
        let request = build_request(&messages, "consulta actual", &[]);
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role, "user");
        assert_eq!(request.history[1].role, "model");
    }

    #[test]
    fn test_request_includes_only_ready_files() {
        let files = vec![ready_file("a.pdf"), uploading_file("b.pdf")];
        let request = build_request(&[], "consulta", &files);
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].name, "a.pdf");
        assert_eq!(request.files[0].mime_type, "application/pdf");
        assert_eq!(request.files[0].content, "QUJD");
    }

    #[tokio::test]
    async fn test_success_extracts_citations_with_attachments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "userQuery": "¿Qué dice?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "Revisa la Cláusula 3.2"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let files = vec![ready_file("contract.pdf")];
        let reply =
            generate_reply(&client, &test_config(&server), &[], "¿Qué dice?", &files).await;

        assert_eq!(reply.text, "Revisa la Cláusula 3.2");
        assert_eq!(reply.citations, vec!["Cláusula 3.2".to_string()]);
    }

    #[tokio::test]
    async fn test_no_attachments_yields_no_citations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "See Cláusula 3.2 and AB-12"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let reply = generate_reply(&client, &test_config(&server), &[], "hola", &[]).await;

        assert_eq!(reply.text, "See Cláusula 3.2 and AB-12");
        assert!(reply.citations.is_empty());
    }

    #[tokio::test]
    async fn test_network_error_resolves_to_fallback() {
        // Nothing listening on this address.
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
        };
        let client = reqwest::Client::new();
        let reply = generate_reply(&client, &config, &[], "hola", &[]).await;

        assert_eq!(reply.text, CONNECTION_ERROR_TEXT);
        assert!(reply.citations.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_resolves_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let reply = generate_reply(&client, &test_config(&server), &[], "hola", &[]).await;

        assert_eq!(reply.text, CONNECTION_ERROR_TEXT);
        assert!(reply.citations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_text_uses_fixed_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let reply = generate_reply(&client, &test_config(&server), &[], "hola", &[]).await;

        assert_eq!(reply.text, EMPTY_RESPONSE_TEXT);
    }

    #[tokio::test]
    async fn test_malformed_body_resolves_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let reply = generate_reply(&client, &test_config(&server), &[], "hola", &[]).await;

        assert_eq!(reply.text, CONNECTION_ERROR_TEXT);
        assert!(reply.citations.is_empty());
    }
}
