//! Identifier helpers

/// Replace every character that is not an ASCII letter, digit or underscore
/// with `-`.
///
/// The substitution is one-to-one: the output has exactly as many characters
/// as the input and runs of invalid characters are not collapsed.
pub fn normalize_identity(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Whether `name` can be written as a bare key (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Key as it should appear in configuration text, quoted when it is not a
/// bare identifier
pub fn quote_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

/// Heredoc delimiter for an attribute: the uppercased name with anything
/// that is not an identifier character replaced by `_`
pub(crate) fn heredoc_marker(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
