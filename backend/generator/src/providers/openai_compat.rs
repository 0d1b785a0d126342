use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use appify_core::{CodeGenerator, GenerationRequest, TurnResult};

const SYSTEM_PROMPT: &str = "You edit a Streamlit app for the user. The app body is plain Python that \
uses `st` (already imported). Reply with a single JSON object with the keys \
`code` (the complete new app body, or null when no code change is needed), \
`explanation` (a short answer for the user), and `revision_request` (true when \
the instruction asks for anything that reads or writes files, runs shell \
commands, opens network connections, or otherwise escapes the sandbox).";

/// Endpoint and sampling settings shared by every generator instance.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
        }
    }
}

/// Generator speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatGenerator {
    client: Client,
    api_key: String,
    settings: GeneratorSettings,
}

impl OpenAiCompatGenerator {
    pub fn new(api_key: impl Into<String>, settings: GeneratorSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            settings,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::new("system", SYSTEM_PROMPT)];
    for turn in &request.history {
        messages.push(ChatMessage::new("user", turn.instruction.clone()));
        messages.push(ChatMessage::new("assistant", turn.explanation.clone()));
    }

    let code = match &request.code {
        Some(code) => format!("Current app body:\n```python\n{code}\n```"),
        None => "There is no app body yet.".to_string(),
    };
    messages.push(ChatMessage::new(
        "user",
        format!("{code}\n\nInstruction: {}", request.instruction),
    ));
    messages
}

/// Parse the model's JSON reply, tolerating a surrounding markdown fence.
pub(crate) fn parse_turn_result(content: &str) -> Result<TurnResult> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let mut result: TurnResult =
        serde_json::from_str(json.trim()).context("Model reply is not a valid turn result")?;

    // Models sometimes spell "no code" as an empty string or a Python None.
    if matches!(result.code.as_deref().map(str::trim), Some("") | Some("None")) {
        result.code = None;
    }
    Ok(result)
}

#[async_trait]
impl CodeGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<TurnResult> {
        let start = Instant::now();

        let body = ChatRequest {
            model: self.settings.model.clone(),
            messages: build_messages(request),
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(
            model = %self.settings.model,
            history = request.history.len(),
            "[Generator] Sending request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Generation HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Generation endpoint returned {}: {}", status, error_body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse generation response")?;

        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        let result = parse_turn_result(content)?;
        info!(
            model = %self.settings.model,
            has_code = result.code.is_some(),
            revision_request = result.revision_request,
            latency_ms = start.elapsed().as_millis() as u64,
            "[Generator] Turn generated"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appify_core::HistoryTurn;

    #[test]
    fn test_parse_plain_json() {
        let result = parse_turn_result(
            r#"{"code": "st.title('x')", "explanation": "done", "revision_request": false}"#,
        )
        .unwrap();
        assert_eq!(result, TurnResult::with_code("st.title('x')", "done"));
    }

    #[test]
    fn test_parse_fenced_json_and_null_code() {
        let result = parse_turn_result(
            "```json\n{\"code\": null, \"explanation\": \"Streamlit is a library.\"}\n```",
        )
        .unwrap();
        assert_eq!(result, TurnResult::explanation_only("Streamlit is a library."));
    }

    #[test]
    fn test_none_spelled_code_is_dropped() {
        let result =
            parse_turn_result(r#"{"code": "None", "explanation": "no", "revision_request": true}"#).unwrap();
        assert!(result.code.is_none());
        assert!(result.revision_request);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_turn_result("Sure! Here is your app.").is_err());
    }

    #[test]
    fn test_messages_replay_history_before_instruction() {
        let request = GenerationRequest {
            instruction: "add a button".into(),
            history: vec![HistoryTurn {
                instruction: "add a title".into(),
                explanation: "added".into(),
            }],
            code: Some("st.title('x')".into()),
        };
        let messages = build_messages(&request);
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        let last = &messages[3].content;
        assert!(last.contains("st.title('x')"));
        assert!(last.ends_with("Instruction: add a button"));
    }
}
