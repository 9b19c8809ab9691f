//! Locating the JSON object inside a prose-wrapped model response.
//!
//! Models asked to "return only valid JSON" still wrap the object in
//! commentary often enough that the extractor cannot parse the raw response.
//! A non-greedy regex mis-extracts nested objects and a greedy one swallows
//! everything between the first `{` and the last `}`, so this is a
//! bracket-matching scan instead: depth-counted, string-aware (braces inside
//! JSON strings don't count), escape-aware.
//!
//! When several balanced objects appear, the first one wins — the schema
//! prompt asks for exactly one, and the first is where compliant models put
//! it.

/// Return the first balanced `{…}` object substring, or `None` when the
/// text contains no complete object.
///
/// A `{` that never closes (e.g. a stray brace in prose) is skipped and the
/// scan resumes at the next candidate.
pub fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('{') {
        let start = search_from + rel;
        if let Some(end) = matching_brace(bytes, start) {
            return Some(&text[start..=end]);
        }
        search_from = start + 1;
    }
    None
}

/// Index of the `}` closing the object opened at `start`, if any.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        assert_eq!(first_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn object_wrapped_in_prose() {
        let text = r#"Sure! Here is the event: {"title":"Jazz"} Hope that helps."#;
        assert_eq!(first_json_object(text), Some(r#"{"title":"Jazz"}"#));
    }

    #[test]
    fn nested_objects_are_kept_whole() {
        let text = r#"{"a":{"b":{"c":1}},"d":2} trailing"#;
        assert_eq!(first_json_object(text), Some(r#"{"a":{"b":{"c":1}},"d":2}"#));
    }

    #[test]
    fn first_of_multiple_objects_wins() {
        let text = r#"{"title":"First"} and also {"title":"Second"}"#;
        assert_eq!(first_json_object(text), Some(r#"{"title":"First"}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let text = r#"{"note":"curly } brace { soup"}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn escaped_quote_inside_string() {
        let text = r#"{"q":"she said \"hi\" {"}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn stray_open_brace_before_real_object_is_skipped() {
        let text = r#"weird { prose then "x" and {"a":1}"#;
        assert_eq!(first_json_object(text), Some(r#"{"a":1}"#));
    }

    #[test]
    fn no_object_at_all() {
        assert_eq!(first_json_object("no json here"), None);
        assert_eq!(first_json_object(""), None);
        assert_eq!(first_json_object("only { an opener"), None);
    }
}
