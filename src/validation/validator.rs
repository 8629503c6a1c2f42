//! Input validator
//!
//! Usernames and room names are trimmed and must be non-empty, bounded, and
//! free of control characters. Message bodies keep their whitespace but may
//! not be blank.

use crate::config::StartupConfig;
use crate::error::ValidationError;

/// Trims `input` and checks it against the shared name rules.
fn validate_name(
    input: &str,
    field: &'static str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    if trimmed.chars().count() > max_length {
        return Err(ValidationError::TooLong { field, max: max_length });
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(trimmed.to_string())
}

pub fn validate_username(
    username: &str,
    config: &StartupConfig,
) -> Result<String, ValidationError> {
    validate_name(username, "username", config.max_username_length)
}

pub fn validate_room(room: &str, config: &StartupConfig) -> Result<String, ValidationError> {
    validate_name(room, "room", config.max_room_length)
}

/// Validates both join fields, username first.
pub fn validate_join(
    username: &str,
    room: &str,
    config: &StartupConfig,
) -> Result<(String, String), ValidationError> {
    Ok((validate_username(username, config)?, validate_room(room, config)?))
}

pub fn validate_message(message: &str, config: &StartupConfig) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::Missing { field: "message" });
    }
    if message.chars().count() > config.max_message_length {
        return Err(ValidationError::TooLong {
            field: "message",
            max: config.max_message_length,
        });
    }
    if message.contains('\0') {
        return Err(ValidationError::InvalidCharacters { field: "message" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_fields_are_trimmed() {
        let config = StartupConfig::default();
        let (username, room) = validate_join("  alice ", "general\t", &config).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(room, "general");
    }

    #[test]
    fn empty_fields_are_rejected() {
        let config = StartupConfig::default();
        assert_eq!(
            validate_join("", "general", &config),
            Err(ValidationError::Missing { field: "username" })
        );
        assert_eq!(
            validate_join("alice", "   ", &config),
            Err(ValidationError::Missing { field: "room" })
        );
    }

    #[test]
    fn long_and_control_names_are_rejected() {
        let config = StartupConfig {
            max_username_length: 5,
            ..StartupConfig::default()
        };
        assert_eq!(
            validate_username("abcdef", &config),
            Err(ValidationError::TooLong { field: "username", max: 5 })
        );
        assert_eq!(
            validate_room("gen\u{7}eral", &config),
            Err(ValidationError::InvalidCharacters { field: "room" })
        );
    }

    #[test]
    fn message_rules() {
        let config = StartupConfig {
            max_message_length: 4,
            ..StartupConfig::default()
        };
        assert!(validate_message(" hi ", &config).is_ok());
        assert_eq!(
            validate_message("  ", &config),
            Err(ValidationError::Missing { field: "message" })
        );
        assert!(validate_message("hello", &config).is_err());
        assert!(validate_message("a\0", &config).is_err());
    }
}
