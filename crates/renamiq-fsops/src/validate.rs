//! Proposed-name validation.

use crate::error::RenameFailure;

/// Characters never accepted in a proposed name.
pub const RESERVED_CHARACTERS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Check a proposed final path component.
///
/// # Errors
///
/// Returns [`RenameFailure::EmptyName`] when the name is empty after trimming
/// whitespace, and [`RenameFailure::ForbiddenCharacter`] when it contains a
/// reserved character or a control character in U+0000..=U+001F.
pub fn validate_name(name: &str) -> Result<(), RenameFailure> {
    if name.trim().is_empty() {
        return Err(RenameFailure::EmptyName);
    }
    if let Some(character) = name.chars().find(|ch| is_forbidden(*ch)) {
        return Err(RenameFailure::ForbiddenCharacter { character });
    }
    Ok(())
}

fn is_forbidden(ch: char) -> bool {
    ch <= '\u{1f}' || RESERVED_CHARACTERS.contains(&ch)
}
