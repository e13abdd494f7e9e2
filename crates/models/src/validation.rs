//! Field validators shared by the write paths.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,20}$").expect("phone regex"));

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug regex"));

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MIN_NOTES_LEN: usize = 10;
pub const MAX_TEXT_LEN: usize = 2000;

pub fn validate_required(value: &str, field: &str, max_len: usize) -> Result<(), ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ModelError::invalid(format!("{field} is too long (max {max_len})")));
    }
    Ok(())
}

pub fn validate_optional(value: Option<&str>, field: &str, max_len: usize) -> Result<(), ModelError> {
    match value {
        Some(v) if v.chars().count() > max_len => {
            Err(ModelError::invalid(format!("{field} is too long (max {max_len})")))
        }
        _ => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email.trim()) {
        return Err(ModelError::invalid("invalid email"));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err(ModelError::invalid("invalid phone number"));
    }
    Ok(())
}

/// Free-text notes must carry at least a sentence worth of detail.
pub fn validate_notes(notes: &str) -> Result<(), ModelError> {
    let len = notes.trim().chars().count();
    if len < MIN_NOTES_LEN {
        return Err(ModelError::invalid(format!("notes must be at least {MIN_NOTES_LEN} characters")));
    }
    if len > MAX_TEXT_LEN {
        return Err(ModelError::invalid(format!("notes are too long (max {MAX_TEXT_LEN})")));
    }
    Ok(())
}

pub fn validate_price(price: f64, field: &str) -> Result<(), ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ModelError::invalid(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if !SLUG_RE.is_match(slug) {
        return Err(ModelError::invalid("slug may only contain a-z, 0-9 and '-'"));
    }
    Ok(())
}

/// Derive a URL slug from a title: lowercase ASCII letters and digits, every
/// other run of characters collapsed to a single `-`, no leading or trailing
/// dash. Returns an empty string when the title has no usable characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '\'' {
            // apostrophes vanish: "mover's" -> "movers"
        } else {
            pending_dash = true;
        }
    }
    slug
}
