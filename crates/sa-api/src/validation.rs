use sa_engine::Difficulty;
use validator::ValidateLength;

use crate::error::ApiError;

/// Longest text accepted for generation requests, in characters
pub const MAX_SOURCE_TEXT_CHARS: u64 = 100_000;

/// Validate a review rating and turn it into a [`Difficulty`]
///
/// # Examples
/// ```
/// use sa_api::validation::validate_difficulty;
///
/// assert_eq!(validate_difficulty(4).unwrap().get(), 4);
/// assert!(validate_difficulty(0).is_err());
/// assert!(validate_difficulty(300).is_err());
/// ```
pub fn validate_difficulty(value: i64) -> Result<Difficulty, ApiError> {
    let value = u8::try_from(value).map_err(|_| {
        ApiError::Validation(format!("Difficulty must be between 1 and 5, got {value}"))
    })?;
    Ok(Difficulty::new(value)?)
}

/// Validate text handed to the generation service
pub fn validate_source_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Validation("Please provide text".to_string()));
    }

    if !text.validate_length(None, Some(MAX_SOURCE_TEXT_CHARS), None) {
        return Err(ApiError::Validation(format!(
            "Text must be at most {MAX_SOURCE_TEXT_CHARS} characters long"
        )));
    }

    Ok(())
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_difficulty() {
        for value in 1..=5 {
            assert!(validate_difficulty(value).is_ok());
        }
        assert!(validate_difficulty(0).is_err());
        assert!(validate_difficulty(6).is_err());
        assert!(validate_difficulty(-1).is_err());
    }

    #[test]
    fn test_validate_source_text() {
        assert!(validate_source_text("Photosynthesis converts light.").is_ok());
        assert!(validate_source_text("").is_err());
        assert!(validate_source_text("   \n").is_err());

        let long = "a".repeat(MAX_SOURCE_TEXT_CHARS as usize + 1);
        assert!(validate_source_text(&long).is_err());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 1000), "hi");
    }
}
