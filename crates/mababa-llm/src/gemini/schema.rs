//! JSON Schema sanitization for Gemini function declarations

/// Fields outside Gemini's OpenAPI Schema subset
const UNSUPPORTED_SCHEMA_FIELDS: &[&str] = &["default", "additionalProperties", "$schema"];

/// Recursively strip schema fields Gemini rejects with INVALID_ARGUMENT
pub(crate) fn strip_unsupported_schema_fields(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            for field in UNSUPPORTED_SCHEMA_FIELDS {
                obj.remove(*field);
            }
            obj.values_mut().for_each(strip_unsupported_schema_fields);
        }
        serde_json::Value::Array(arr) => {
            arr.iter_mut().for_each(strip_unsupported_schema_fields);
        }
        _ => {}
    }
}
