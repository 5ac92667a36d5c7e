//! Registry of users keyed by user ID.

use crate::error::{LendingError, Result};
use crate::types::User;
use circulation_core::UserId;
use std::collections::HashMap;

/// All library members. Each user carries their own account, so removing
/// a user drops their ledger with them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directory {
    users: HashMap<UserId, User>,
    order: Vec<UserId>,
}

impl Directory {
    /// Creates an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a user
    #[must_use]
    pub fn find(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Looks up a user for mutation
    pub fn find_mut(&mut self, user_id: &UserId) -> Option<&mut User> {
        self.users.get_mut(user_id)
    }

    /// Checks if a user exists
    #[must_use]
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.users.contains_key(user_id)
    }

    /// Returns the user if the password matches
    #[must_use]
    pub fn authenticate(&self, user_id: &UserId, password: &str) -> Option<&User> {
        self.find(user_id)
            .filter(|user| user.password_matches(password))
    }

    /// Adds a user.
    ///
    /// # Errors
    ///
    /// [`LendingError::DuplicateUserId`] if the ID is taken,
    /// [`LendingError::UnstorableField`] if the ID, password or name contains
    /// a comma or line break.
    pub fn add(&mut self, user: User) -> Result<()> {
        if self.contains(&user.id) {
            return Err(LendingError::DuplicateUserId(user.id));
        }
        user.ensure_storable()?;
        tracing::debug!(user = %user.id, role = %user.role(), "User added");
        self.order.push(user.id.clone());
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Removes a user with no active loans, along with their account.
    ///
    /// # Errors
    ///
    /// [`LendingError::NotFound`] if absent,
    /// [`LendingError::CannotRemoveUserWithActiveBorrows`] if they hold books.
    pub fn remove(&mut self, user_id: &UserId) -> Result<User> {
        let user = self
            .find(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))?;
        let active = user.account.borrowed_count();
        if active > 0 {
            return Err(LendingError::CannotRemoveUserWithActiveBorrows {
                user_id: user_id.clone(),
                active,
            });
        }
        self.order.retain(|candidate| candidate != user_id);
        let user = self
            .users
            .remove(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))?;
        tracing::info!(user = %user_id, "User removed");
        Ok(user)
    }

    /// Every user, in insertion order
    pub fn all(&self) -> impl Iterator<Item = &User> {
        self.order.iter().filter_map(|user_id| self.users.get(user_id))
    }

    /// Number of users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Checks if the directory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::policy::Role;
    use circulation_core::{DayStamp, Isbn};

    fn student(id: &str) -> User {
        User::new(UserId::new(id), "secret", format!("Student {id}"), Role::Student)
    }

    #[test]
    fn add_find_and_duplicate() {
        let mut directory = Directory::new();
        directory.add(student("s1")).unwrap();

        assert!(directory.contains(&UserId::new("s1")));
        assert_eq!(directory.find(&UserId::new("s1")).unwrap().name, "Student s1");
        assert_eq!(
            directory.add(student("s1")),
            Err(LendingError::DuplicateUserId(UserId::new("s1")))
        );
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn name_or_password_with_separators_is_rejected() {
        let mut directory = Directory::new();
        assert_eq!(
            directory.add(User::new(UserId::new("s1"), "pw", "Smith, John", Role::Student)),
            Err(LendingError::UnstorableField {
                field: "name",
                value: "Smith, John".to_string(),
            })
        );
        assert!(matches!(
            directory.add(User::new(UserId::new("s1"), "p\rw", "John", Role::Student)),
            Err(LendingError::UnstorableField { field: "password", .. })
        ));
        assert!(directory.is_empty());
    }

    #[test]
    fn new_user_has_empty_account() {
        let mut directory = Directory::new();
        directory.add(student("s1")).unwrap();

        let account = &directory.find(&UserId::new("s1")).unwrap().account;
        assert_eq!(account.borrowed_count(), 0);
        assert_eq!(account.reservation_count(), 0);
        assert!(account.history().is_empty());
    }

    #[test]
    fn authenticate_compares_password() {
        let mut directory = Directory::new();
        directory.add(student("s1")).unwrap();

        assert!(directory.authenticate(&UserId::new("s1"), "secret").is_some());
        assert!(directory.authenticate(&UserId::new("s1"), "wrong").is_none());
        assert!(directory.authenticate(&UserId::new("s9"), "secret").is_none());
    }

    #[test]
    fn user_with_loans_cannot_be_removed() {
        let mut directory = Directory::new();
        directory.add(student("s1")).unwrap();
        directory
            .find_mut(&UserId::new("s1"))
            .unwrap()
            .account
            .add_borrow(Isbn::new("111"), DayStamp::new(1));

        assert_eq!(
            directory.remove(&UserId::new("s1")),
            Err(LendingError::CannotRemoveUserWithActiveBorrows {
                user_id: UserId::new("s1"),
                active: 1,
            })
        );
    }

    #[test]
    fn remove_drops_user_and_account() {
        let mut directory = Directory::new();
        directory.add(student("s1")).unwrap();
        directory.add(student("s2")).unwrap();

        directory.remove(&UserId::new("s1")).unwrap();
        assert!(!directory.contains(&UserId::new("s1")));
        assert_eq!(
            directory.all().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            ["s2"]
        );
        assert_eq!(
            directory.remove(&UserId::new("s1")),
            Err(LendingError::user_not_found(&UserId::new("s1")))
        );
    }
}
