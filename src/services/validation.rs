use crate::errors::ToolError;
use serde_json::{Map, Value};

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Tool arguments must be an object; a missing argument block counts as
    /// an empty one.
    pub fn ensure_args_object(&self, args: &Value) -> Result<Map<String, Value>, ToolError> {
        match args {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map.clone()),
            _ => Err(ToolError::invalid_params("arguments must be an object")),
        }
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    /// Null, absent and blank strings are all treated as "not given".
    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(val) => self.ensure_string(val, label, false).map(Some),
        }
    }

    /// Extracts the token from an `Authorization`-style value. The `Bearer`
    /// scheme prefix is optional.
    pub fn ensure_bearer_token(&self, value: &Value) -> Result<String, ToolError> {
        let raw = self.ensure_string(value, "authorization", true)?;
        let token = match raw.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            Some(_) => {
                return Err(ToolError::invalid_params(
                    "authorization must use the Bearer scheme",
                ))
            }
            None => raw.as_str(),
        };
        if token.is_empty() {
            return Err(ToolError::invalid_params("authorization token is empty"));
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_string_treats_blank_as_absent() {
        let v = Validation::new();
        assert_eq!(v.ensure_optional_string(None, "end_date").unwrap(), None);
        assert_eq!(
            v.ensure_optional_string(Some(&json!("  ")), "end_date").unwrap(),
            None
        );
        assert_eq!(
            v.ensure_optional_string(Some(&json!("2024-01-01")), "end_date")
                .unwrap(),
            Some("2024-01-01".to_string())
        );
        assert!(v.ensure_optional_string(Some(&json!(5)), "end_date").is_err());
    }

    #[test]
    fn bearer_token_accepts_scheme_or_bare_token() {
        let v = Validation::new();
        assert_eq!(v.ensure_bearer_token(&json!("Bearer abc")).unwrap(), "abc");
        assert_eq!(v.ensure_bearer_token(&json!("bearer  abc ")).unwrap(), "abc");
        assert_eq!(v.ensure_bearer_token(&json!("abc")).unwrap(), "abc");
        assert!(v.ensure_bearer_token(&json!("Basic abc")).is_err());
        assert!(v.ensure_bearer_token(&json!("")).is_err());
    }

    #[test]
    fn args_must_be_an_object() {
        let v = Validation::new();
        assert!(v.ensure_args_object(&Value::Null).unwrap().is_empty());
        assert!(v.ensure_args_object(&json!([1])).is_err());
    }
}
