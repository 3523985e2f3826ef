//! Input validation for content mutations.

use super::error::ContentError;
use super::types::{NewComment, NewMessage, NewPost};

/// Maximum length of an author, sender or receiver name, in characters.
pub const MAX_NAME_LEN: usize = 100;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn join_missing(missing: &[&str]) -> String {
    match missing {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn require(fields: &[(&'static str, &str)]) -> Result<(), ContentError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let verb = if missing.len() == 1 { "is" } else { "are" };
    Err(ContentError::validation(format!(
        "{} {verb} required",
        join_missing(&missing)
    )))
}

fn check_name(field: &str, value: &str) -> Result<(), ContentError> {
    if value.trim().chars().count() > MAX_NAME_LEN {
        return Err(ContentError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a new post.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] naming the missing fields.
pub fn validate_post(input: &NewPost) -> Result<(), ContentError> {
    require(&[("content", &input.content), ("author", &input.author)])?;
    check_name("author", &input.author)
}

/// Validate a new comment.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] naming the missing fields.
pub fn validate_comment(input: &NewComment) -> Result<(), ContentError> {
    require(&[("content", &input.content), ("author", &input.author)])?;
    check_name("author", &input.author)
}

/// Validate a new direct message.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] naming the missing fields.
pub fn validate_message(input: &NewMessage) -> Result<(), ContentError> {
    require(&[
        ("content", &input.content),
        ("sender", &input.sender),
        ("receiver", &input.receiver),
    ])?;
    check_name("sender", &input.sender)?;
    check_name("receiver", &input.receiver)
}

/// Validate a bare user name used as a lookup key.
///
/// # Errors
///
/// Returns [`ContentError::Validation`] when blank or too long.
pub fn validate_username(field: &'static str, value: &str) -> Result<(), ContentError> {
    require(&[(field, value)])?;
    check_name(field, value)
}
