// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Allowed product sizes
pub const VALID_SIZES: [&str; 5] = ["S", "M", "L", "XL", "XXL"];

/// Indonesian phone number: +62/62/0 prefix followed by 9-13 digits
fn phone_regex() -> &'static Regex {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^(\+62|62|0)[0-9]{9,13}$").expect("phone regex is valid")
    })
}

/// Validates an optional phone number against the Indonesian format
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone_format"))
    }
}

/// Validates that a size is one of the accepted values
/// Valid values: "S", "M", "L", "XL", "XXL" (case-sensitive)
pub fn validate_size(size: &str) -> Result<(), ValidationError> {
    if VALID_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_size"))
    }
}

/// Builds a URL-safe slug from a display name, e.g. "Buket Bunga" ->
/// "buket-bunga". Runs of non-alphanumeric characters collapse into a
/// single hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
