//! Chunk prompt construction and completion parsing.
//!
//! The model is asked for a strict JSON array of `{id, text}` objects so
//! translated lines can be realigned with their source segments by id.

use serde::Deserialize;

use crate::TranslateError;

/// Build the translation prompt for one chunk of subtitle lines.
pub(crate) fn build_prompt(texts: &[String], target_lang: &str, context: Option<&str>) -> String {
    let mut lines = vec![format!(
        "You are an expert subtitle translator. Translate the following numbered \
         subtitle lines into '{target_lang}'. Detect the source language automatically."
    )];

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        lines.push("\n**Context about the video:**".to_string());
        lines.push(format!("- {context}"));
    }

    lines.push(format!(
        "\n**IMPORTANT INSTRUCTIONS (MUST FOLLOW STRICTLY):**\n\
         - Translate EVERY line into '{target_lang}'; keep names and technical terms intact.\n\
         - Each line is one subtitle cue. Do NOT merge, split, or reorder lines.\n\
         - Output strictly a JSON array of objects with keys \"id\" (the line number) and \
         \"text\" (the translated line), one object per input line, in the same order.\n\
         - Example: [{{\"id\": 1, \"text\": \"Xin chào\"}}]\n\
         - DO NOT add explanations, comments, or code block markers."
    ));

    lines.push("\n**Subtitle lines:**".to_string());
    for (i, text) in texts.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, text.trim()));
    }

    lines.join("\n")
}

/// One translated line in the model's JSON output.
///
/// `id` is tolerated as either a number or a numeric string; models are
/// inconsistent about this.
#[derive(Debug, Deserialize)]
struct TranslatedLine {
    id: serde_json::Value,
    text: String,
}

impl TranslatedLine {
    fn id_as_index(&self) -> Option<usize> {
        match &self.id {
            serde_json::Value::Number(n) => n.as_u64().map(|n| n as usize),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Extract the JSON array portion from a completion.
///
/// Tolerates surrounding prose and markdown code fences by taking the
/// span from the first `[` to the last `]`.
fn extract_json_array(completion: &str) -> Option<&str> {
    let start = completion.find('[')?;
    let end = completion.rfind(']')?;
    (end > start).then(|| &completion[start..=end])
}

/// Parse a completion into exactly `expected` ordered translated lines.
pub(crate) fn parse_completion(
    completion: &str,
    expected: usize,
) -> Result<Vec<String>, TranslateError> {
    let array = extract_json_array(completion).ok_or_else(|| {
        TranslateError::InvalidResponse("no JSON array found in completion".to_string())
    })?;

    let lines: Vec<TranslatedLine> = serde_json::from_str(array)
        .map_err(|e| TranslateError::InvalidResponse(format!("malformed JSON array: {e}")))?;

    if lines.len() != expected {
        return Err(TranslateError::LengthMismatch {
            expected,
            got: lines.len(),
        });
    }

    let mut out = vec![None; expected];
    for line in &lines {
        let Some(id) = line.id_as_index().filter(|id| (1..=expected).contains(id)) else {
            return Err(TranslateError::InvalidResponse(format!(
                "line id out of range: {}",
                line.id
            )));
        };
        if out[id - 1].replace(line.text.trim().to_string()).is_some() {
            return Err(TranslateError::InvalidResponse(format!(
                "duplicate line id: {id}"
            )));
        }
    }

    // len == expected with unique in-range ids means every slot is filled
    out.into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| TranslateError::InvalidResponse("incomplete line set".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn prompt_numbers_every_line() {
        let p = build_prompt(&texts(&["hello", "world"]), "Vietnamese", None);
        assert!(p.contains("1. hello"));
        assert!(p.contains("2. world"));
        assert!(p.contains("'Vietnamese'"));
    }

    #[test]
    fn prompt_includes_context_when_present() {
        let p = build_prompt(&texts(&["hi"]), "French", Some("cooking tutorial"));
        assert!(p.contains("cooking tutorial"));
        let p = build_prompt(&texts(&["hi"]), "French", Some("   "));
        assert!(!p.contains("Context about the video"));
    }

    #[test]
    fn parses_clean_array() {
        let out = parse_completion(
            r#"[{"id": 1, "text": "xin chào"}, {"id": 2, "text": "thế giới"}]"#,
            2,
        )
        .unwrap();
        assert_eq!(out, vec!["xin chào".to_string(), "thế giới".to_string()]);
    }

    #[test]
    fn parses_fenced_array_with_string_ids() {
        let completion = "Here you go:\n```json\n[{\"id\": \"2\", \"text\": \"b\"}, {\"id\": \"1\", \"text\": \"a\"}]\n```";
        let out = parse_completion(completion, 2).unwrap();
        // Realigned by id, not response order.
        assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn short_response_is_length_mismatch() {
        let err = parse_completion(r#"[{"id": 1, "text": "only one"}]"#, 3).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::LengthMismatch {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = parse_completion(
            r#"[{"id": 1, "text": "a"}, {"id": 1, "text": "b"}]"#,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidResponse(_)));
    }

    #[test]
    fn out_of_range_id_rejected() {
        let err = parse_completion(
            r#"[{"id": 0, "text": "a"}, {"id": 5, "text": "b"}]"#,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidResponse(_)));
    }

    #[test]
    fn prose_without_array_rejected() {
        let err = parse_completion("I cannot translate this.", 1).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidResponse(_)));
    }
}
