pub mod dto;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod queries;
pub mod routes;
pub mod service;

use service::{InvalidText, TaskError};

pub const MAX_TASK_LEN: usize = 255;

// HELPER FUNCTIONS

/// Trims `raw` and checks it in the order empty, too long, no letter or digit.
/// Length is counted in characters, not bytes.
pub fn validate_task_text(raw: &str) -> Result<&str, TaskError> {
    let text = raw.trim();

    if text.is_empty() {
        return Err(TaskError::InvalidText(InvalidText::Empty));
    }

    if text.chars().count() > MAX_TASK_LEN {
        return Err(TaskError::TooLong);
    }

    if !text.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(TaskError::InvalidText(InvalidText::NoLetterOrDigit));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims() {
        assert_eq!(validate_task_text("  Water plants ").unwrap(), "Water plants");
        assert_eq!(validate_task_text("7").unwrap(), "7");
    }

    #[test]
    fn empty_comes_first() {
        assert!(matches!(validate_task_text(" \t\n"), Err(TaskError::InvalidText(InvalidText::Empty))));
    }

    #[test]
    fn too_long_is_checked_before_letters() {
        assert!(matches!(validate_task_text(&"!".repeat(300)), Err(TaskError::TooLong)));
    }

    #[test]
    fn length_counts_characters() {
        // One letter plus 254 three-byte characters.
        let text = format!("a{}", "你".repeat(254));
        assert!(validate_task_text(&text).is_ok());
        let text = format!("a{}", "你".repeat(255));
        assert!(matches!(validate_task_text(&text), Err(TaskError::TooLong)));
    }

    #[test]
    fn needs_an_ascii_letter_or_digit() {
        assert!(matches!(
            validate_task_text("🔥🚀 ..."),
            Err(TaskError::InvalidText(InvalidText::NoLetterOrDigit))
        ));
        assert!(validate_task_text("🔥🚀 a你好").is_ok());
    }
}
