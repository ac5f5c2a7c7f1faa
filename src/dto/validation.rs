//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest checklist item accepted, in characters.
const MAX_ITEM_LEN: usize = 120;

/// Validates that a checklist item is non-blank, reasonably short and free of control characters.
///
/// # Examples
///
/// ```ignore
/// validate_checklist_item("Runner audio") // Ok
/// validate_checklist_item("   ")          // Err - blank
/// validate_checklist_item("line\nbreak")  // Err - control character
/// ```
pub fn validate_checklist_item(item: &str) -> Result<(), ValidationError> {
    if item.trim().is_empty() {
        let mut err = ValidationError::new("checklist_item_blank");
        err.message = Some("Checklist item must not be blank".into());
        return Err(err);
    }

    let len = item.chars().count();
    if len > MAX_ITEM_LEN {
        let mut err = ValidationError::new("checklist_item_length");
        err.message = Some(
            format!("Checklist item must be at most {MAX_ITEM_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }

    if item.chars().any(char::is_control) {
        let mut err = ValidationError::new("checklist_item_format");
        err.message = Some("Checklist item must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
