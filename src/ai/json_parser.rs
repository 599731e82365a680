//! JSON extraction from model replies
//!
//! Chat models like to wrap JSON in markdown fences or add a sentence before
//! it. These helpers find the object so the caller can parse it.

/// Slice of `reply` holding the classification object.
///
/// Fenced content wins over prose: a ` ```json ` fence is looked at first,
/// then any fence, and only then the span from the first `{` to the last `}`.
/// A fence whose body does not open with `{` is skipped.
pub fn extract_json_object(reply: &str) -> Result<&str, String> {
    let object_in = |opener: &str| fence_body(reply, opener).filter(|b| b.starts_with('{'));
    if let Some(body) = object_in("```json").or_else(|| object_in("```")) {
        return Ok(body);
    }

    match (reply.find('{'), reply.rfind('}')) {
        (Some(open), Some(close)) if close > open => Ok(&reply[open..=close]),
        _ => Err("No JSON object found in response".to_string()),
    }
}

/// Trimmed text between the first `opener` and the next closing fence.
/// The rest of the opener's line (a language tag) is not part of the body.
fn fence_body<'a>(reply: &'a str, opener: &str) -> Option<&'a str> {
    let after = reply.find(opener)? + opener.len();
    let body_start = if opener == "```" {
        reply[after..].find('\n').map_or(after, |i| after + i + 1)
    } else {
        after
    };
    let len = reply[body_start..].find("```")?;
    Some(reply[body_start..body_start + len].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_from_code_block() {
        let text = r#"Here's the result:
```json
{"title": "Dune", "year": "1965"}
```
That's it."#;
        let result = extract_json_object(text).unwrap();
        assert_eq!(result, r#"{"title": "Dune", "year": "1965"}"#);
    }

    #[test]
    fn test_extract_json_object_from_plain_block() {
        let text = "```\n{\"title\": \"null\"}\n```";
        assert_eq!(extract_json_object(text).unwrap(), "{\"title\": \"null\"}");
    }

    #[test]
    fn test_extract_json_object_raw() {
        let text = r#"Result: {"title": "test"} done"#;
        let result = extract_json_object(text).unwrap();
        assert_eq!(result, r#"{"title": "test"}"#);
    }

    #[test]
    fn test_extract_json_object_tagged_fence_after_prose() {
        let text = "Sure.\n```JSON\n{\"title\": \"Dune\"}\n```\n";
        assert_eq!(extract_json_object(text).unwrap(), "{\"title\": \"Dune\"}");
    }

    #[test]
    fn test_non_object_fence_falls_back_to_braces() {
        let text = "```json\n[\"not it\"]\n```\nUse {\"title\": \"Dune\"} instead";
        assert_eq!(extract_json_object(text).unwrap(), "{\"title\": \"Dune\"}");
    }

    #[test]
    fn test_no_json_returns_error() {
        assert!(extract_json_object("No JSON here!").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }
}
