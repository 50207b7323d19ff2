//! Static MCP catalog: the tools, prompts and resource templates this server
//! advertises, plus the content shapes MCP clients expect back.
//!
//! Built once at startup and shared read-only between requests.

use serde::Serialize;

pub mod prompts;
pub mod resources;
pub mod tools;

pub use prompts::{PromptDescriptor, PromptRequest};
pub use resources::ResourceTemplate;
pub use tools::{Tool, ToolCall, ToolDescriptor};

/// Failures resolving a catalog entry or its arguments.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Tool not found")]
    UnknownTool,

    #[error("Prompt not found")]
    UnknownPrompt,

    #[error("Resource not found")]
    UnknownResource,

    #[error("{0}")]
    InvalidArguments(String),
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Body of a non-streaming tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub tools: Vec<ToolDescriptor>,
    pub prompts: Vec<PromptDescriptor>,
    pub resource_templates: Vec<ResourceTemplate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tools: Tool::ALL.iter().map(Tool::descriptor).collect(),
            prompts: prompts::descriptors(),
            resource_templates: resources::templates(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
