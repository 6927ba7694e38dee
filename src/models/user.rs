use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Supervisor,
    Delegate,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Admin, Role::Supervisor, Role::Delegate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Delegate => "delegate",
        }
    }

    /// Arabic label shown on pages and in emails.
    pub fn label_ar(&self) -> &'static str {
        match self {
            Role::User => "مستخدم",
            Role::Admin => "مدير",
            Role::Supervisor => "مشرف",
            Role::Delegate => "مندوب",
        }
    }

    /// Landing page for the role after login.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::User => "/account",
            Role::Admin => "/admin",
            Role::Supervisor => "/supervisor",
            Role::Delegate => "/delegate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "supervisor" => Ok(Role::Supervisor),
            "delegate" => Ok(Role::Delegate),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Row shape of the `users` table. The role is kept as text here and
/// parsed into [`Role`] when converting to [`User`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub verification_token: Option<String>,
    pub email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub verification_token: Option<String>,
    pub email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = ParseRoleError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            country: row.country,
            phone: row.phone,
            national_id: row.national_id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            is_active: row.is_active,
            verification_token: row.verification_token,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Public view of a user: everything except the password hash and the
/// verification token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            country: user.country.clone(),
            phone: user.phone.clone(),
            national_id: user.national_id.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            email_verified: user.email_verified,
            created_at: user.created_at.clone(),
            updated_at: user.updated_at.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile::from(&user)
    }
}

/// Field set for inserting a user; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub verification_token: Option<String>,
}

/// Mutable profile columns, written together on update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&User> for ProfileFields {
    fn from(user: &User) -> Self {
        ProfileFields {
            name: user.name.clone(),
            country: user.country.clone(),
            phone: user.phone.clone(),
            national_id: user.national_id.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" delegate ".parse::<Role>(), Ok(Role::Delegate));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Supervisor).unwrap();
        assert_eq!(json, "\"supervisor\"");
    }

    #[test]
    fn profile_drops_secrets() {
        let user = User {
            id: 7,
            name: "سارة".to_string(),
            country: "مصر".to_string(),
            phone: "01012345678".to_string(),
            national_id: "29801011234567".to_string(),
            email: "sara@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            is_active: true,
            verification_token: Some("secret".to_string()),
            email_verified: false,
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("verification_token").is_none());
        assert_eq!(json["role"], "user");
    }
}
