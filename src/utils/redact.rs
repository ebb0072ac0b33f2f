/// Masks a bearer token for logs, keeping only a short prefix.
pub fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.chars().count() <= 8 {
        return "***".to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    format!("{}***", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tokens_are_fully_hidden() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("12345678"), "***");
    }

    #[test]
    fn long_tokens_keep_prefix() {
        assert_eq!(mask_token("ABCDEFGHIJKL"), "ABCD***");
    }
}
