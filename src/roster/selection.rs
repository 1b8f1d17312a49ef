//! Multi-user selection for bulk edits

use crate::model::User;

/// Selected user ids, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Select if absent, deselect if present
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|i| i == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    /// Whether every visible user is selected (false for an empty list)
    pub fn all_selected(&self, visible: &[&User]) -> bool {
        !visible.is_empty() && visible.iter().all(|u| self.contains(&u.id))
    }

    /// Deselect the visible users if all of them are selected, otherwise add
    /// the missing ones. Selections outside the visible list are kept.
    pub fn toggle_all(&mut self, visible: &[&User]) {
        if self.all_selected(visible) {
            self.ids.retain(|id| !visible.iter().any(|u| &u.id == id));
        } else {
            for user in visible {
                if !self.contains(&user.id) {
                    self.ids.push(user.id.clone());
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist after a reload
    pub fn retain_existing(&mut self, users: &[User]) {
        self.ids.retain(|id| users.iter().any(|u| &u.id == id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<User> {
        vec![User::new("a", "A", 1), User::new("b", "B", 2), User::new("c", "C", 3)]
    }

    #[test]
    fn test_toggle() {
        let mut sel = Selection::new();
        sel.toggle("a");
        sel.toggle("b");
        sel.toggle("a");
        assert_eq!(sel.ids(), &["b".to_string()]);
    }

    #[test]
    fn test_toggle_all_adds_missing_then_removes_visible() {
        let all = users();
        let visible: Vec<&User> = all.iter().take(2).collect();
        let mut sel = Selection::new();
        sel.toggle("c");
        sel.toggle("a");

        sel.toggle_all(&visible);
        assert_eq!(sel.ids(), &["c".to_string(), "a".to_string(), "b".to_string()]);
        assert!(sel.all_selected(&visible));

        sel.toggle_all(&visible);
        assert_eq!(sel.ids(), &["c".to_string()]);
    }

    #[test]
    fn test_all_selected_empty_list() {
        let sel = Selection::new();
        assert!(!sel.all_selected(&[]));
    }

    #[test]
    fn test_retain_existing() {
        let mut sel = Selection::new();
        sel.toggle("a");
        sel.toggle("gone");
        sel.retain_existing(&users());
        assert_eq!(sel.ids(), &["a".to_string()]);
    }
}
