//! Root usage text

/// Static message listing what can be posted
pub const USAGE: &str = "What do you want to emit today?\n\
* POST /spike - posts an app instance spike\n";

/// Answers any method on `/` and every unmatched path
pub async fn handler() -> &'static str {
    USAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_usage_lists_spike() {
        let body = handler().await;
        assert!(body.starts_with("What do you want to emit today?\n"));
        assert!(body.contains("* POST /spike - posts an app instance spike\n"));
        assert_eq!(body.lines().count(), 2);
    }
}
