// Identity namespaces and display-name normalization.
//
// Local human identities live under `user-`, simulated participants under
// `ghost-`. Ghost ids are regenerated for every injection.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const USER_PREFIX: &str = "user-";
pub const GHOST_PREFIX: &str = "ghost-";

/// Maximum allowed display name length in characters.
pub const MAX_NAME_CHARS: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("display name is empty")]
    Empty,

    #[error("display name exceeds maximum length of {MAX_NAME_CHARS} characters")]
    TooLong,
}

pub fn new_user_id() -> String {
    format!("{USER_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn new_ghost_id() -> String {
    format!("{GHOST_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn is_ghost_id(id: &str) -> bool {
    id.starts_with(GHOST_PREFIX)
}

/// Normalize a display name entered by the user.
///
/// Applies NFKC, collapses internal whitespace runs to a single space and
/// trims both ends. Blank input is rejected.
pub fn normalize_display_name(input: &str) -> Result<String, NameError> {
    let normalized: String = input.nfkc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return Err(NameError::Empty);
    }
    if collapsed.chars().count() > MAX_NAME_CHARS {
        return Err(NameError::TooLong);
    }

    Ok(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_their_namespace() {
        let user = new_user_id();
        let ghost = new_ghost_id();

        assert!(user.starts_with(USER_PREFIX));
        assert!(!is_ghost_id(&user));
        assert!(is_ghost_id(&ghost));
        assert!(!ghost.starts_with(USER_PREFIX));
    }

    #[test]
    fn ghost_ids_are_regenerated() {
        assert_ne!(new_ghost_id(), new_ghost_id());
    }

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(normalize_display_name("  Ada   Lovelace \t").unwrap(), "Ada Lovelace");
    }

    #[test]
    fn applies_nfkc() {
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_display_name("Ａｄａ").unwrap(), "Ada");
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(normalize_display_name(""), Err(NameError::Empty));
        assert_eq!(normalize_display_name("   \n\t"), Err(NameError::Empty));
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert_eq!(normalize_display_name(&long), Err(NameError::TooLong));

        let exact = "x".repeat(MAX_NAME_CHARS);
        assert_eq!(normalize_display_name(&exact).unwrap(), exact);
    }
}
