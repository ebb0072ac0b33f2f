use serde::Serialize;

/// Renders a tool result as indented JSON text.
pub fn format_response<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|err| {
        serde_json::json!({ "error": format!("Failed to format response: {}", err) }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_two_space_indentation() {
        let text = format_response(&serde_json::json!({"score": 82}));
        assert_eq!(text, "{\n  \"score\": 82\n}");
    }
}
