use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub required: bool,
}

pub fn descriptors() -> Vec<PromptDescriptor> {
    vec![PromptDescriptor {
        name: "echo_prompt",
        description: "Create an echo prompt",
        arguments: vec![PromptArgument {
            name: "message",
            description: None,
            required: true,
        }],
    }]
}

/// Body of `POST /prompts/get`.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptResult {
    pub description: &'static str,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: super::Content,
}

pub fn render(request: &PromptRequest) -> Result<PromptResult, CatalogError> {
    match request.name.as_str() {
        "echo_prompt" => {
            let message = request.arguments.get("message").ok_or_else(|| {
                CatalogError::InvalidArguments("Missing required argument: message".to_string())
            })?;

            Ok(PromptResult {
                description: "Create an echo prompt",
                messages: vec![PromptMessage {
                    role: "user",
                    content: super::Content::Text {
                        text: format!("Please process this message: {}", message),
                    },
                }],
            })
        }
        _ => Err(CatalogError::UnknownPrompt),
    }
}
