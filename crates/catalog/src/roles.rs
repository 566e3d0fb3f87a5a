use std::collections::BTreeMap;

use foundation::UserId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::CatalogError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Admins hold every moderator privilege.
    pub fn is_moderator(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            avatar_url: None,
            role: Role::User,
        }
    }
}

/// Checks whether `actor` may set the role of `target`.
pub fn authorize_role_change(actor: &UserProfile, target: &UserId) -> Result<(), CatalogError> {
    if !actor.role.is_admin() {
        return Err(CatalogError::Forbidden(
            "only admins can change user roles".to_string(),
        ));
    }
    if &actor.id == target {
        return Err(CatalogError::Forbidden(
            "you cannot change your own role".to_string(),
        ));
    }
    Ok(())
}

/// In-process profile table keyed by user id.
#[derive(Debug, Default)]
pub struct ProfileDirectory {
    profiles: RwLock<BTreeMap<UserId, UserProfile>>,
}

impl ProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &UserId) -> Option<UserProfile> {
        self.profiles.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<UserProfile> {
        self.profiles.read().values().cloned().collect()
    }

    pub fn upsert(&self, profile: UserProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    /// Returns the profile for `id`, creating one with the default role on
    /// first sight.
    pub fn get_or_create(&self, id: &UserId, email: &str) -> UserProfile {
        self.profiles
            .write()
            .entry(id.clone())
            .or_insert_with(|| UserProfile::new(id.clone(), email))
            .clone()
    }

    pub fn change_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<UserProfile, CatalogError> {
        let mut profiles = self.profiles.write();
        let actor = profiles.get(actor).ok_or(CatalogError::NotFound)?;
        authorize_role_change(actor, target)?;
        let profile = profiles.get_mut(target).ok_or(CatalogError::NotFound)?;
        profile.role = role;
        Ok(profile.clone())
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.profiles
            .read()
            .values()
            .filter(|p| p.role == role)
            .count()
    }
}
