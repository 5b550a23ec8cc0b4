//! String template rendering utilities.

use regex::Regex;

use crate::error::{Error, Result};

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}";

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

/// Replace every `{{key.path}}` with the value `lookup` returns for it.
///
/// Fails on the first placeholder `lookup` cannot resolve; `source` names the
/// template in that error.
pub fn render_with<F>(template: &str, source: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(PLACEHOLDER_PATTERN)
        .map_err(|e| Error::internal_unexpected(format!("Invalid placeholder pattern: {}", e)))?;
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for captures in pattern.captures_iter(template) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let value = lookup(key.as_str())
            .ok_or_else(|| Error::config_missing_key(key.as_str(), Some(source.to_string())))?;

        result.push_str(&template[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }

    result.push_str(&template[last..]);
    Ok(result)
}
