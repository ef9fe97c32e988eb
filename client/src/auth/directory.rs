//! Fixed login directory used by the mock auth flow.
//!
//! A stand-in for the real identity provider: four known accounts with a
//! parallel plaintext password table. The mock flow compares passwords
//! verbatim.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Account tier selected at login.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Primary,
    Secondary,
}

impl UserRole {
    /// Wire/storage spelling of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Primary => "primary",
            UserRole::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user profile.
///
/// JSON keys follow the persisted `currentUser` contract.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: u32,
    pub username: String,
    pub email: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Always false for directory-issued identities.
    pub is_anonymous: bool,
}

/// Credentials gathered from the (external) login form.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub role: UserRole,
    pub username: String,
    pub password: String,
    pub remember: bool,
}

pub(crate) static DIRECTORY: LazyLock<Vec<Identity>> = LazyLock::new(|| {
    vec![
        Identity {
            id: 1001,
            username: "primary001".to_string(),
            email: "morgan.reed@example.edu".to_string(),
            role: UserRole::Primary,
            name: "Morgan Reed".to_string(),
            avatar: "https://cdn.example.com/avatars/1001.png".to_string(),
            department: Some("Computer Science".to_string()),
            is_anonymous: false,
        },
        Identity {
            id: 1002,
            username: "primary002".to_string(),
            email: "li.ming@example.edu".to_string(),
            role: UserRole::Primary,
            name: "Li Ming".to_string(),
            avatar: "https://cdn.example.com/avatars/1002.png".to_string(),
            department: Some("Software Engineering".to_string()),
            is_anonymous: false,
        },
        Identity {
            id: 2001,
            username: "secondary001".to_string(),
            email: "alex.wang@example.edu".to_string(),
            role: UserRole::Secondary,
            name: "Alex Wang".to_string(),
            avatar: "https://cdn.example.com/avatars/2001.png".to_string(),
            department: Some("Computer Science".to_string()),
            is_anonymous: false,
        },
        Identity {
            id: 2002,
            username: "secondary002".to_string(),
            email: "dana.liu@example.edu".to_string(),
            role: UserRole::Secondary,
            name: "Dana Liu".to_string(),
            avatar: "https://cdn.example.com/avatars/2002.png".to_string(),
            department: Some("Software Engineering".to_string()),
            is_anonymous: false,
        },
    ]
});

/// Plaintext password table parallel to the directory.
pub(crate) fn password_for(username: &str) -> Option<&'static str> {
    match username {
        "primary001" => Some("primary123"),
        "primary002" => Some("primary456"),
        "secondary001" => Some("secondary123"),
        "secondary002" => Some("secondary456"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_has_two_accounts_per_role() {
        let primary = DIRECTORY.iter().filter(|u| u.role == UserRole::Primary).count();
        let secondary = DIRECTORY
            .iter()
            .filter(|u| u.role == UserRole::Secondary)
            .count();
        assert_eq!(primary, 2);
        assert_eq!(secondary, 2);
    }

    #[test]
    fn every_directory_entry_has_a_password() {
        for user in DIRECTORY.iter() {
            assert!(password_for(&user.username).is_some(), "{}", user.username);
        }
    }

    #[test]
    fn identity_serializes_with_wire_keys() {
        let user = DIRECTORY[0].clone();
        let raw = serde_json::to_string(&user).unwrap();
        assert!(raw.contains("\"userType\":\"primary\""));
        assert!(raw.contains("\"isAnonymous\":false"));
        assert!(raw.contains("\"username\":\"primary001\""));
    }

    #[test]
    fn identity_round_trips_through_json() {
        let user = DIRECTORY[2].clone();
        let raw = serde_json::to_string(&user).unwrap();
        let parsed: Identity = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, user);
    }
}
