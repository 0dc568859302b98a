//! Deployment variable substitution.
//!
//! Config templates shipped with an installer carry `%%NAME%%` markers
//! (e.g. `%%CHROOT_WEBDIR%%`) that are filled in per deployment before the
//! document is parsed. Names are uppercase ASCII letters, digits and
//! underscores, starting with a letter. Anything else between `%%` pairs is
//! left untouched, as are the per-user `%n` and `%s` markers.

use std::collections::{BTreeSet, HashMap};

use crate::error::{ConfigError, Result};

const MARKER: &str = "%%";

/// Replace every `%%NAME%%` in `text` with its value from `variables`.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownVariable`] listing every name without a
/// value, sorted.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut unknown = BTreeSet::new();
    let mut rest = text;

    while let Some(start) = rest.find(MARKER) {
        result.push_str(&rest[..start]);
        let after = &rest[start + MARKER.len()..];

        match after.find(MARKER) {
            Some(end) if is_variable_name(&after[..end]) => {
                let name = &after[..end];
                match variables.get(name) {
                    Some(value) => result.push_str(value),
                    None => {
                        unknown.insert(name.to_string());
                    }
                }
                rest = &after[end + MARKER.len()..];
            }
            _ => {
                result.push_str(MARKER);
                rest = after;
            }
        }
    }
    result.push_str(rest);

    if unknown.is_empty() {
        Ok(result)
    } else {
        Err(ConfigError::UnknownVariable(unknown.into_iter().collect()))
    }
}

/// Names of every `%%NAME%%` marker in `text`, sorted and de-duplicated.
pub fn referenced_variables(text: &str) -> Vec<String> {
    match interpolate(text, &HashMap::new()) {
        Err(ConfigError::UnknownVariable(names)) => names,
        _ => Vec::new(),
    }
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
