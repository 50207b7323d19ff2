use serde::{Deserialize, Serialize};

use super::CatalogError;

const GREETING_SCHEME: &str = "greeting://";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub fn templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        uri_template: "greeting://{name}",
        name: "get_greeting",
        description: "Get a personalized greeting",
        mime_type: "text/plain",
    }]
}

/// Body of `POST /resources/read`.
#[derive(Debug, Deserialize)]
pub struct ReadResourceRequest {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

pub fn read(uri: &str) -> Result<ReadResourceResult, CatalogError> {
    let name = uri
        .strip_prefix(GREETING_SCHEME)
        .filter(|n| !n.is_empty() && !n.contains('/'))
        .ok_or(CatalogError::UnknownResource)?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: "text/plain",
            text: format!("Hello, {}!", name),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_template_expands_name() {
        let result = read("greeting://Ada").unwrap();
        assert_eq!(result.contents[0].text, "Hello, Ada!");
        assert_eq!(result.contents[0].uri, "greeting://Ada");
    }

    #[test]
    fn unmatched_uris_are_unknown() {
        for uri in ["greeting://", "greeting://a/b", "file:///etc/passwd"] {
            assert!(matches!(read(uri), Err(CatalogError::UnknownResource)), "{uri}");
        }
    }

    #[test]
    fn template_serializes_camel_case() {
        let value = serde_json::to_value(templates()).unwrap();
        assert_eq!(value[0]["uriTemplate"], "greeting://{name}");
        assert_eq!(value[0]["mimeType"], "text/plain");
    }
}
