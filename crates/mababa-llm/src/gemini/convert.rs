//! Conversion between MaBaba messages and Gemini contents

use super::schema::strip_unsupported_schema_fields;
use super::types::*;
use crate::message::{Message, MessageRole};
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};

/// Split messages into a system instruction and the turn list
pub(crate) fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let mut system_instruction = None;
    let mut contents: Vec<GeminiContent> = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                system_instruction = Some(GeminiContent::text(None, msg.content.clone()));
            }
            MessageRole::User => {
                if !msg.content.is_empty() {
                    contents.push(GeminiContent::text(Some("user"), msg.content.clone()));
                }
            }
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !msg.content.is_empty() {
                    parts.push(GeminiPart::Text {
                        text: msg.content.clone(),
                    });
                }
                for call in &msg.tool_calls {
                    parts.push(GeminiPart::FunctionCall {
                        function_call: FunctionCall {
                            name: call.name.clone(),
                            args: call.arguments_value(),
                        },
                    });
                }
                if !parts.is_empty() {
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
            }
            MessageRole::Tool => {
                let Some(tool_name) = &msg.name else {
                    continue;
                };
                let response = serde_json::from_str(&msg.content)
                    .unwrap_or_else(|_| serde_json::json!({ "result": msg.content }));
                let part = GeminiPart::FunctionResponse {
                    function_response: FunctionResponse {
                        name: tool_name.clone(),
                        response,
                    },
                };

                // All responses to one model turn go into a single user turn
                match contents.last_mut() {
                    Some(last)
                        if last.role.as_deref() == Some("user")
                            && last
                                .parts
                                .iter()
                                .all(|p| matches!(p, GeminiPart::FunctionResponse { .. })) =>
                    {
                        last.parts.push(part);
                    }
                    _ => contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    (system_instruction, contents)
}

/// Convert tool definitions to one Gemini tool block
pub(crate) fn convert_tools(tools: &[ToolDefinition]) -> Vec<GeminiTool> {
    let function_declarations = tools
        .iter()
        .map(|tool| {
            let mut parameters = tool.parameters.clone();
            strip_unsupported_schema_fields(&mut parameters);
            FunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters,
            }
        })
        .collect();

    vec![GeminiTool {
        function_declarations,
    }]
}

pub(crate) fn convert_tool_choice(choice: &ToolChoice) -> ToolConfig {
    let mode = match choice {
        ToolChoice::Auto => "AUTO",
        ToolChoice::None => "NONE",
        ToolChoice::Required => "ANY",
    };
    ToolConfig {
        function_calling_config: FunctionCallingConfig { mode },
    }
}

/// Concatenated text and tool calls of a candidate
pub(crate) fn split_candidate(candidate: &Candidate) -> (String, Vec<ToolCall>) {
    let mut text = String::new();
    let mut calls = Vec::new();
    for part in &candidate.content.parts {
        match part {
            GeminiPart::Text { text: t } => text.push_str(t),
            GeminiPart::FunctionCall { function_call } => calls.push(ToolCall {
                // Gemini does not assign call IDs
                id: uuid::Uuid::new_v4().to_string(),
                name: function_call.name.clone(),
                arguments: function_call.args.to_string(),
            }),
            GeminiPart::FunctionResponse { .. } => {}
        }
    }
    (text, calls)
}
