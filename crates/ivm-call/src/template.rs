//! Strict `$name` substitution.
//!
//! Supported forms are `$name`, `${name}` and `$$` (a literal dollar sign).
//! Identifiers follow `[A-Za-z_][A-Za-z0-9_]*`. Substitution never falls back
//! to an empty string: an unknown name is an error.

use std::collections::HashMap;

use crate::error::PromptError;

/// Replaces every placeholder in `template` with its value from `variables`.
///
/// # Errors
///
/// Returns [`PromptError::MissingVariable`] for an unknown name and
/// [`PromptError::InvalidPlaceholder`] for a malformed `$` sequence.
pub fn substitute(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, PromptError> {
    let lookup = |name: &str| {
        variables
            .get(name)
            .ok_or_else(|| PromptError::MissingVariable(name.to_string()))
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let position = template.len() - rest.len() + idx;
        let after = &rest[idx + 1..];

        let consumed = if after.starts_with('$') {
            out.push('$');
            1
        } else if let Some(braced) = after.strip_prefix('{') {
            let len = identifier_len(braced);
            if len == 0 || !braced[len..].starts_with('}') {
                return Err(PromptError::InvalidPlaceholder { position });
            }
            out.push_str(lookup(&braced[..len])?);
            len + 2
        } else {
            let len = identifier_len(after);
            if len == 0 {
                return Err(PromptError::InvalidPlaceholder { position });
            }
            out.push_str(lookup(&after[..len])?);
            len
        };

        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Byte length of the identifier at the start of `s`, or 0 if there is none.
fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, b) in s.bytes().enumerate() {
        let valid = if i == 0 {
            b.is_ascii_alphabetic() || b == b'_'
        } else {
            b.is_ascii_alphanumeric() || b == b'_'
        };
        if !valid {
            break;
        }
        len += 1;
    }
    len
}
