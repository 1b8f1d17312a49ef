//! Field editing helpers
//!
//! Form fields are plain strings; these apply a key press to one.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::Item;

/// What a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Digits only
    Unsigned,
    /// Digits with an optional leading minus
    Signed,
}

/// Apply a key to a field. Returns true if the key was consumed.
pub fn edit_field(field: &mut String, key: KeyEvent, kind: FieldKind) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Backspace => {
            field.pop();
            true
        }
        KeyCode::Char(c) => match kind {
            FieldKind::Text => {
                field.push(c);
                true
            }
            FieldKind::Unsigned if c.is_ascii_digit() => {
                field.push(c);
                true
            }
            FieldKind::Signed if c.is_ascii_digit() => {
                field.push(c);
                true
            }
            FieldKind::Signed if c == '-' && field.is_empty() => {
                field.push(c);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Next id when cycling through `options`, with "" standing for no choice
pub fn cycle_item(options: &[&Item], current: &str, forward: bool) -> String {
    if options.is_empty() {
        return String::new();
    }
    // Slot 0 is "none", slots 1..=len are the options
    let slots = options.len() + 1;
    let pos = options
        .iter()
        .position(|i| i.id == current)
        .map(|p| p + 1)
        .unwrap_or(0);
    let next = if forward { (pos + 1) % slots } else { (pos + slots - 1) % slots };
    match next {
        0 => String::new(),
        n => options[n - 1].id.clone(),
    }
}

/// Display name for an item id, or a placeholder
pub fn item_label(catalogue: &[Item], id: &str) -> String {
    if id.is_empty() {
        return "(ninguno)".to_string();
    }
    catalogue
        .iter()
        .find(|i| i.id == id)
        .map(|i| i.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Move a cursor by `delta` within `len` entries, clamping at the ends
pub fn step_cursor(cursor: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = cursor as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_unsigned_rejects_letters() {
        let mut field = String::from("1");
        assert!(edit_field(&mut field, key(KeyCode::Char('2')), FieldKind::Unsigned));
        assert!(!edit_field(&mut field, key(KeyCode::Char('x')), FieldKind::Unsigned));
        assert!(!edit_field(&mut field, key(KeyCode::Char('-')), FieldKind::Unsigned));
        assert_eq!(field, "12");
        edit_field(&mut field, key(KeyCode::Backspace), FieldKind::Unsigned);
        assert_eq!(field, "1");
    }

    #[test]
    fn test_signed_minus_only_first() {
        let mut field = String::new();
        assert!(edit_field(&mut field, key(KeyCode::Char('-')), FieldKind::Signed));
        assert!(edit_field(&mut field, key(KeyCode::Char('5')), FieldKind::Signed));
        assert!(!edit_field(&mut field, key(KeyCode::Char('-')), FieldKind::Signed));
        assert_eq!(field, "-5");
    }

    #[test]
    fn test_control_keys_pass_through() {
        let mut field = String::new();
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert!(!edit_field(&mut field, ctrl_n, FieldKind::Text));
        assert!(field.is_empty());
    }

    #[test]
    fn test_cycle_item_wraps_through_none() {
        let a = Item::new("a", "A", 1);
        let b = Item::new("b", "B", 1);
        let options = vec![&a, &b];
        assert_eq!(cycle_item(&options, "", true), "a");
        assert_eq!(cycle_item(&options, "a", true), "b");
        assert_eq!(cycle_item(&options, "b", true), "");
        assert_eq!(cycle_item(&options, "", false), "b");
        assert_eq!(cycle_item(&options, "gone", true), "a");
        assert_eq!(cycle_item(&[], "a", true), "");
    }

    #[test]
    fn test_step_cursor() {
        assert_eq!(step_cursor(0, -1, 3), 0);
        assert_eq!(step_cursor(1, 1, 3), 2);
        assert_eq!(step_cursor(2, 1, 3), 2);
        assert_eq!(step_cursor(5, 0, 0), 0);
    }
}
