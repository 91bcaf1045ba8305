//! GUID text forms used by solution and project files.

use uuid::Uuid;

use super::error::DomainError;

/// Parse a GUID with or without braces, in any case.
pub fn parse_guid(text: &str) -> Result<Uuid, DomainError> {
    let trimmed = text.trim();
    let bare = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    Uuid::parse_str(bare).map_err(|_| DomainError::InvalidGuid {
        value: text.to_owned(),
    })
}

/// `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`, upper case.
pub fn format_guid(guid: &Uuid) -> String {
    format!("{{{}}}", guid.hyphenated()).to_uppercase()
}
