//! Filtering and sorting the user list
//!
//! Works on borrowed users and returns a new ordering; the fetched list is
//! never reordered in place.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::User;

/// Column the list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    #[default]
    Points,
}

impl SortKey {
    pub fn toggle(self) -> Self {
        match self {
            SortKey::Name => SortKey::Points,
            SortKey::Points => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Nombre",
            SortKey::Points => "Puntos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Ascendente",
            SortDirection::Descending => "Descendente",
        }
    }
}

/// Current search and ordering of the user list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub text: String,
    pub key: SortKey,
    pub direction: SortDirection,
}

impl ListQuery {
    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        filter_and_sort(users, &self.text, self.key, self.direction)
    }
}

/// Whether a user matches the search text.
///
/// Name matches are case-insensitive; points match as a plain substring of
/// their decimal form, so "10" also finds 100 and 105.
pub fn matches_query(user: &User, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    user.name.to_lowercase().contains(&query) || user.points.to_string().contains(&query)
}

fn compare(a: &User, b: &User, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Points => a.points.cmp(&b.points),
    }
}

/// Filter by `query` and sort by `key`. Ties keep their original order.
pub fn filter_and_sort<'a>(
    users: &'a [User],
    query: &str,
    key: SortKey,
    direction: SortDirection,
) -> Vec<&'a User> {
    let mut list: Vec<&User> = users.iter().filter(|u| matches_query(u, query)).collect();
    list.sort_by(|a, b| match direction {
        SortDirection::Ascending => compare(a, b, key),
        SortDirection::Descending => compare(b, a, key),
    });
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<User> {
        vec![
            User::new("1", "Pedro", 10),
            User::new("2", "ana", 100),
            User::new("3", "10x", 3),
            User::new("4", "Beto", 105),
            User::new("5", "Carla", 10),
            User::new("6", "Zoe", 7),
        ]
    }

    fn ids(list: &[&User]) -> Vec<String> {
        list.iter().map(|u| u.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_sorts_by_points_descending() {
        let users = roster();
        let list = filter_and_sort(&users, "", SortKey::Points, SortDirection::Descending);
        // Pedro and Carla tie at 10 and keep their relative order
        assert_eq!(ids(&list), vec!["4", "2", "1", "5", "6", "3"]);
    }

    #[test]
    fn test_points_ascending_is_stable() {
        let users = roster();
        let list = filter_and_sort(&users, "", SortKey::Points, SortDirection::Ascending);
        assert_eq!(ids(&list), vec!["3", "6", "1", "5", "2", "4"]);
    }

    #[test]
    fn test_points_substring_match() {
        let users = roster();
        let list = filter_and_sort(&users, "10", SortKey::Name, SortDirection::Ascending);
        // "10x" by name, 10/100/105 by points; Zoe (7) is out
        assert_eq!(ids(&list), vec!["3", "2", "4", "5", "1"]);
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let users = roster();
        let list = filter_and_sort(&users, "  PED ", SortKey::Name, SortDirection::Ascending);
        assert_eq!(ids(&list), vec!["1"]);
        let list = filter_and_sort(&users, "A", SortKey::Name, SortDirection::Ascending);
        assert_eq!(ids(&list), vec!["2", "5"]);
    }

    #[test]
    fn test_name_sort_descending() {
        let users = roster();
        let list = filter_and_sort(&users, "", SortKey::Name, SortDirection::Descending);
        assert_eq!(ids(&list), vec!["6", "1", "5", "4", "2", "3"]);
    }

    #[test]
    fn test_input_is_untouched() {
        let users = roster();
        let before = users.clone();
        let _ = filter_and_sort(&users, "a", SortKey::Points, SortDirection::Ascending);
        assert_eq!(users, before);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.key, SortKey::Points);
        assert_eq!(query.direction, SortDirection::Descending);
        assert_eq!(query.key.toggle(), SortKey::Name);
        assert_eq!(query.direction.toggle(), SortDirection::Ascending);
    }
}
