use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::db::entities::procedure;
use crate::db::entities::procedure::ScriptType;
use crate::db::store::settings_service::AiCredentials;
use crate::web::error::AppError;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, thiserror::Error)]
pub enum AiServiceError {
    #[error("Request to AI provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("AI provider returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse AI response: {0}")]
    Parse(String),
}

impl From<AiServiceError> for AppError {
    fn from(err: AiServiceError) -> Self {
        match err {
            AiServiceError::Request(e) => AppError::UpstreamError(e.to_string()),
            AiServiceError::Api { status, body } => {
                AppError::UpstreamError(format!("provider returned {status}: {body}"))
            }
            AiServiceError::Parse(s) => AppError::UpstreamError(s),
        }
    }
}

/// The schema the model is instructed to answer with. Unknown fields are
/// rejected so a malformed completion fails loudly instead of producing a
/// half-empty script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratedScript {
    pub script: String,
    pub explanation: String,
}

fn script_language(script_type: ScriptType) -> &'static str {
    match script_type {
        ScriptType::Cmd => "Windows CMD batch",
        ScriptType::PowerShell => "PowerShell",
        ScriptType::Python => "Python 3",
    }
}

const SYSTEM_PROMPT: &str = "You are an RMM automation assistant. Answer with a single JSON \
object of the shape {\"script\": string, \"explanation\": string} and nothing else: no code \
fences, no commentary. The script must be self-contained and safe to run unattended.";

/// Thin client for the generative-AI collaborator. It owns prompt assembly
/// and response validation; provider internals stay opaque.
#[derive(Clone, Default)]
pub struct AiClient;

impl AiClient {
    pub fn new() -> Self {
        Self
    }

    /// Produces a script (plus a human explanation) from a natural-language
    /// description.
    pub async fn generate_script(
        &self,
        credentials: &AiCredentials,
        script_type: ScriptType,
        description: &str,
    ) -> Result<GeneratedScript, AiServiceError> {
        let user_prompt = format!(
            "Write a {} script for a managed Windows fleet.\nTask description: {}",
            script_language(script_type),
            description
        );
        self.complete(credentials, &user_prompt).await
    }

    /// Rewrites an existing procedure's script per the given instructions.
    pub async fn improve_procedure(
        &self,
        credentials: &AiCredentials,
        procedure: &procedure::Model,
        instructions: &str,
    ) -> Result<GeneratedScript, AiServiceError> {
        let user_prompt = format!(
            "Improve the following {} script used by the procedure '{}'.\nInstructions: {}\n\nCurrent script:\n{}",
            script_language(procedure.script_type),
            procedure.name,
            instructions,
            procedure.script_content
        );
        self.complete(credentials, &user_prompt).await
    }

    async fn complete(
        &self,
        credentials: &AiCredentials,
        user_prompt: &str,
    ) -> Result<GeneratedScript, AiServiceError> {
        let url = format!(
            "{}/v1/chat/completions",
            credentials.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": credentials.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.2,
            "max_tokens": 2048,
        });

        debug!("AI request to {}", url);

        let response = HTTP_CLIENT
            .post(&url)
            .header("Authorization", format!("Bearer {}", credentials.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AiServiceError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AiServiceError::Parse("missing choices[0].message.content".to_string())
            })?;

        parse_generated(content)
    }
}

/// Validates the completion against the expected schema. Tolerates the one
/// deviation models produce constantly: wrapping the JSON in a code fence.
fn parse_generated(content: &str) -> Result<GeneratedScript, AiServiceError> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_start_matches(['\r', '\n']))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(stripped).map_err(|e| AiServiceError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_json_completion() {
        let content = r#"{"script": "Get-Process", "explanation": "Lists processes."}"#;
        let parsed = parse_generated(content).unwrap();
        assert_eq!(parsed.script, "Get-Process");
        assert_eq!(parsed.explanation, "Lists processes.");
    }

    #[test]
    fn strips_code_fences() {
        let content = "```json\n{\"script\": \"echo hi\", \"explanation\": \"Says hi.\"}\n```";
        let parsed = parse_generated(content).unwrap();
        assert_eq!(parsed.script, "echo hi");
    }

    #[test]
    fn rejects_off_schema_completions() {
        assert!(parse_generated("Sure! Here's a script: echo hi").is_err());
        assert!(parse_generated(r#"{"script": "x", "explanation": "y", "extra": 1}"#).is_err());
        assert!(parse_generated(r#"{"script": "x"}"#).is_err());
    }
}
