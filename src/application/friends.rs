use crate::domain::friend::Friend;
use parking_lot::RwLock;
use uuid::Uuid;

struct FriendEntry {
    friend: Friend,
    show_details: bool,
}

/// Presentational contact list: local records plus a per-entry visibility
/// flag for the detail view. Nothing here is persisted or synchronized.
#[derive(Default)]
pub struct FriendBook {
    entries: RwLock<Vec<FriendEntry>>,
}

impl FriendBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demo_contacts() -> Self {
        let book = Self::new();
        book.add_friend("Manuel Lorenz", "01234 5678 991", "manuel@localhost.com");
        book.add_friend("Julie Jones", "09876 543 221", "julie@localhost.com");
        book
    }

    pub fn add_friend(&self, name: &str, phone: &str, email: &str) -> Friend {
        let friend = Friend {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        };
        self.entries.write().push(FriendEntry {
            friend: friend.clone(),
            show_details: false,
        });
        friend
    }

    /// Flips the detail visibility, returning the new value. Unknown ids
    /// return `None`.
    pub fn toggle_details(&self, friend_id: &str) -> Option<bool> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|e| e.friend.id == friend_id)?;
        entry.show_details = !entry.show_details;
        Some(entry.show_details)
    }

    pub fn details_visible(&self, friend_id: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.friend.id == friend_id && e.show_details)
    }

    pub fn friends(&self) -> Vec<Friend> {
        self.entries.read().iter().map(|e| e.friend.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_details_flips_and_reports() {
        let book = FriendBook::new();
        let friend = book.add_friend("Ada", "555-0100", "ada@example.com");

        assert!(!book.details_visible(&friend.id));
        assert_eq!(book.toggle_details(&friend.id), Some(true));
        assert!(book.details_visible(&friend.id));
        assert_eq!(book.toggle_details(&friend.id), Some(false));
    }

    #[test]
    fn test_toggle_unknown_id_returns_none() {
        let book = FriendBook::with_demo_contacts();
        assert_eq!(book.toggle_details("no-such-id"), None);
        assert_eq!(book.friends().len(), 2);
    }
}
