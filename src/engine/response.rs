// src/engine/response.rs

use crate::engine::ExecutionResult;

pub const NO_OUTPUT: &str = "Code executed successfully with no output.";

/// Render a sync execution result as the text of a single content block.
///
/// Sections appear only when non-empty and are separated by a blank line.
/// Captured output is copied verbatim, trailing newlines included.
pub fn render_text(result: &ExecutionResult) -> String {
    let mut sections = Vec::with_capacity(3);

    if !result.stdout.is_empty() {
        sections.push(format!("Output:\n{}", result.stdout));
    }
    if !result.stderr.is_empty() {
        sections.push(format!("Errors:\n{}", result.stderr));
    }
    if let Some(error) = result.error.as_deref().filter(|e| !e.is_empty()) {
        sections.push(format!("Exception:\n{}", error));
    }

    if sections.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        sections.join("\n\n")
    }
}
