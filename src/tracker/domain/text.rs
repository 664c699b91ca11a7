//! Text normalization shared by aggregate constructors and patches.

use super::TrackerDomainError;

/// Trims a required text field, rejecting blank input.
pub(crate) fn required_text(
    value: String,
    field: &'static str,
) -> Result<String, TrackerDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerDomainError::EmptyField(field));
    }
    Ok(trimmed.to_owned())
}

/// Trims optional text, mapping blank input to `None`.
pub(crate) fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Trims labels, drops blanks, and removes duplicates while keeping order.
pub(crate) fn normalize_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for label in labels {
        let trimmed = label.trim();
        if !trimmed.is_empty() && !normalized.iter().any(|existing| existing == trimmed) {
            normalized.push(trimmed.to_owned());
        }
    }
    normalized
}
