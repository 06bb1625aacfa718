use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type OrganizationId = Uuid;

/// A person as the source tool describes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedUser {
    /// Stable lookup key within one import, see [`ImportedUser::derive_key`].
    pub key: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub matched_user_id: Option<UserId>,
}

impl ImportedUser {
    /// Builds a user from whatever identifiers the source carries.
    /// Returns `None` when every identifier is blank.
    pub fn from_parts(
        username: Option<&str>,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<Self> {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let username = clean(username);
        let email = clean(email);
        let display_name = clean(display_name);
        let key = Self::derive_key(username.as_deref(), email.as_deref(), display_name.as_deref())?;
        Some(Self {
            key,
            username,
            email,
            display_name,
            matched_user_id: None,
        })
    }

    /// Email wins over username, username over display name; all lowercased.
    pub fn derive_key(
        username: Option<&str>,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<String> {
        email
            .or(username)
            .or(display_name)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.key)
    }

    /// Fills identifiers this record lacks from another record of the same person.
    pub fn merge(&mut self, other: ImportedUser) {
        if self.username.is_none() {
            self.username = other.username;
        }
        if self.email.is_none() {
            self.email = other.email;
        }
        if self.display_name.is_none() {
            self.display_name = other.display_name;
        }
    }
}

/// An existing platform account an imported user can be resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

impl PlatformUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_email() {
        let user =
            ImportedUser::from_parts(Some("jdoe"), Some("J.Doe@Example.com"), Some("Jane Doe"))
                .unwrap();
        assert_eq!(user.key, "j.doe@example.com");
        assert_eq!(user.label(), "Jane Doe");
    }

    #[test]
    fn test_blank_parts_yield_none() {
        assert!(ImportedUser::from_parts(Some(" "), None, Some("")).is_none());
    }

    #[test]
    fn test_full_name_trims() {
        let user = PlatformUser {
            id: Uuid::new_v4(),
            username: "sam".to_string(),
            email: String::new(),
            first_name: "Sam".to_string(),
            last_name: String::new(),
            organization_id: None,
        };
        assert_eq!(user.full_name(), "Sam");
    }
}
