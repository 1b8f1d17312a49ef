//! Operator input for create and edit flows
//!
//! Text is kept as typed and only interpreted when a payload is built, the
//! same way the fields behave on screen.

use crate::model::{parse_int, Item, ItemPayload, User, UserPayload};
use crate::roster::{ItemPicks, ProgressDraft};

fn parse_points(text: &str) -> u32 {
    parse_int(text).unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

/// The "add user" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub points: String,
    pub clase: String,
    pub steam_id: String,
    pub items: ItemPicks,
}

impl UserForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build the create payload. A blank name means there is nothing to send.
    pub fn to_payload(&self) -> Option<UserPayload> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(UserPayload {
            name: name.to_string(),
            points: parse_points(&self.points),
            clase: self.clase.trim().to_string(),
            steam_id: self.steam_id.trim().to_string(),
            items: self.items.to_payload(),
        })
    }
}

/// Working copy of a user while it is being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub points: String,
    pub clase: String,
    pub steam_id: String,
    /// Step used by the +/- point buttons
    pub multiplier: String,
    pub progress: ProgressDraft,
    /// Item picked for appending, empty when none
    pub new_item: String,
    pub new_item_progress: String,
}

impl UserDraft {
    pub fn from_user(user: &User, catalogue: &[Item]) -> Self {
        Self {
            name: user.name.clone(),
            points: user.points.to_string(),
            clase: user.class.clone().unwrap_or_default(),
            steam_id: user.steam_id.clone().unwrap_or_default(),
            multiplier: "1".to_string(),
            progress: ProgressDraft::from_entries(&user.items, catalogue),
            new_item: String::new(),
            new_item_progress: "0".to_string(),
        }
    }

    fn step(&self) -> i64 {
        parse_int(&self.multiplier).filter(|m| *m > 0).unwrap_or(1)
    }

    /// Add one step of points
    pub fn increase_points(&mut self) {
        let current = parse_int(&self.points).unwrap_or(0);
        self.points = (current.max(0) + self.step()).to_string();
    }

    /// Remove one step of points, never going below zero
    pub fn decrease_points(&mut self) {
        let current = parse_int(&self.points).unwrap_or(0);
        self.points = (current - self.step()).max(0).to_string();
    }

    pub fn clear_new_item(&mut self) {
        self.new_item.clear();
        self.new_item_progress = "0".to_string();
    }

    /// Full-replace payload for `PUT /users/:id`
    pub fn to_payload(&self) -> UserPayload {
        UserPayload {
            name: self.name.clone(),
            points: parse_points(&self.points),
            clase: self.clase.clone(),
            steam_id: self.steam_id.trim().to_string(),
            items: self.progress.to_payload(),
        }
    }
}

/// Name, description and max progress of an item, for create and edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub max_progress: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            max_progress: "100".to_string(),
        }
    }
}

impl ItemForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            max_progress: item.max_progress.to_string(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Max progress as sent; at least 1, garbage becomes 1
    pub fn parsed_max_progress(&self) -> u32 {
        parse_int(&self.max_progress)
            .unwrap_or(1)
            .clamp(1, u32::MAX as i64) as u32
    }

    /// Payload for create/update. A blank name means there is nothing to send.
    pub fn to_payload(&self) -> Option<ItemPayload> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(ItemPayload {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            max_progress: self.parsed_max_progress(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemProgress, ItemRef, ProgressEntry};

    #[test]
    fn test_user_form_requires_name() {
        let mut form = UserForm::new();
        form.name = "   ".into();
        assert!(form.to_payload().is_none());
    }

    #[test]
    fn test_user_form_payload() {
        let mut form = UserForm::new();
        form.name = " Juan Pérez ".into();
        form.points = "abc".into();
        form.clase = " Guerrero ".into();
        form.steam_id = " 7656119 ".into();
        form.items.toggle(&Item::new("i1", "Sello", 5));

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.name, "Juan Pérez");
        assert_eq!(payload.points, 0);
        assert_eq!(payload.clase, "Guerrero");
        assert_eq!(payload.steam_id, "7656119");
        assert_eq!(payload.items, vec![ProgressEntry::new("i1", 0)]);

        form.points = "-4".into();
        assert_eq!(form.to_payload().unwrap().points, 0);
    }

    #[test]
    fn test_draft_point_stepping() {
        let mut draft = UserDraft::from_user(&User::new("u1", "Ana", 3), &[]);
        draft.multiplier = "5".into();
        draft.increase_points();
        assert_eq!(draft.points, "8");
        draft.decrease_points();
        draft.decrease_points();
        assert_eq!(draft.points, "0");

        draft.multiplier = "0".into();
        draft.increase_points();
        assert_eq!(draft.points, "1");
        draft.multiplier = "nada".into();
        draft.increase_points();
        assert_eq!(draft.points, "2");
    }

    #[test]
    fn test_draft_payload_carries_progress() {
        let catalogue = vec![Item::new("i1", "Sello", 5)];
        let mut user = User::new("u1", "Ana", 40);
        user.class = Some("Mago".into());
        user.items.push(ItemProgress { item: ItemRef::Id("i1".into()), progress: 2 });

        let mut draft = UserDraft::from_user(&user, &catalogue);
        assert_eq!(draft.clase, "Mago");
        draft.progress.increment("i1");
        draft.points = "41".into();

        let payload = draft.to_payload();
        assert_eq!(payload.points, 41);
        assert_eq!(payload.items, vec![ProgressEntry::new("i1", 3)]);
    }

    #[test]
    fn test_item_form() {
        let mut form = ItemForm::new();
        assert_eq!(form.max_progress, "100");
        assert!(form.to_payload().is_none());

        form.name = "Tomo".into();
        form.max_progress = "0".into();
        assert_eq!(form.to_payload().unwrap().max_progress, 1);
        form.max_progress = "x".into();
        assert_eq!(form.parsed_max_progress(), 1);
        form.max_progress = "12".into();
        assert_eq!(form.to_payload().unwrap().max_progress, 12);
    }
}
