/*!
 * Best-effort repair of JSON replies.
 *
 * Local models often wrap their answer in code fences, forget the closing
 * brace, leave a trailing comma or a `//` comment, or use full-width quotes
 * around values. `repair_json` fixes those cases; anything still unparsable
 * is reported as a malformed response.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::errors::TaskError;

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*)\}$").expect("trailing comma regex is valid"));

/// `"key": "value"` on a line of its own, optionally followed by a comma
static KEY_VALUE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*"[^"]*"\s*:\s*")(.*)("\s*,?\s*)$"#).expect("key-value line regex is valid")
});

/// A closing quote followed by another `"key":`, i.e. a second pair on the same line
static NEXT_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\s*,\s*"[^"]*"\s*:"#).expect("next pair regex is valid"));

/// Remove markdown code fences around a reply
fn strip_code_fences(text: &str) -> String {
    text.trim().replace("```json", "").replace("```", "")
}

/// Remove `//` comments that start outside a string literal
fn strip_line_comments(text: &str) -> String {
    let mut output = String::with_capacity(text.len());

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let mut in_string = false;
        let mut escaped = false;
        let mut previous_slash = false;
        let mut cut = line.len();

        for (pos, ch) in line.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    in_string = false;
                }
                continue;
            }
            match ch {
                '"' => {
                    in_string = true;
                    previous_slash = false;
                }
                '/' if previous_slash => {
                    cut = pos - 1;
                    break;
                }
                '/' => previous_slash = true,
                _ => previous_slash = false,
            }
        }

        output.push_str(line[..cut].trim_end());
    }

    output
}

/// Replace full-width quotes used as JSON delimiters
fn normalize_fullwidth_quotes(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let mut line = line.replace(": “", ": \"").replace(":“", ":\"");
            for suffix in ["”,", "”"] {
                if let Some(stripped) = line.strip_suffix(suffix) {
                    line = format!("{}\"{}", stripped, &suffix["”".len()..]);
                    break;
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape bare double quotes inside single-line string values.
///
/// Lines holding more than one pair are left alone.
fn escape_inner_quotes(text: &str) -> String {
    text.split('\n')
        .map(|line| match KEY_VALUE_LINE.captures(line) {
            Some(caps) if !NEXT_PAIR.is_match(&caps[2]) => {
                let value = caps[2].replace("\\\"", "\"").replace('"', "\\\"");
                format!("{}{}{}", &caps[1], value, &caps[3])
            }
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Repair a model reply so that it has a chance to parse as a JSON object
pub fn repair_json(text: &str) -> String {
    let mut repaired = strip_code_fences(text);
    repaired = strip_line_comments(repaired.trim());
    repaired = normalize_fullwidth_quotes(repaired.trim());
    repaired = repaired.trim().to_string();

    if !repaired.ends_with('}') {
        repaired.push('}');
    }
    repaired = TRAILING_COMMA.replace(&repaired, "$1}").into_owned();

    escape_inner_quotes(&repaired)
}

/// Deserialize a model reply, repairing it only when it does not parse as is
pub fn parse_repaired<T: DeserializeOwned>(text: &str) -> Result<T, TaskError> {
    if let Ok(value) = serde_json::from_str(strip_code_fences(text).trim()) {
        return Ok(value);
    }

    let repaired = repair_json(text);
    serde_json::from_str(&repaired).map_err(|e| TaskError::MalformedResponse(format!("{}: {}", e, repaired)))
}
