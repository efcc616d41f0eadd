//! User accounts and their public projection.
//!
//! [`User`] is the persisted record and carries the password hash; it never
//! leaves the users service. [`UserProfile`] is what `/users/{id}` returns and
//! what the tickets service decodes as a ticket's author.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Identity, UserId};

/// Role assigned when registration does not name one.
pub const DEFAULT_ROLE: &str = "client";

/// Validation errors raised by [`Registration::try_new`] and
/// [`UserChanges::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was missing or blank.
    EmptyName,
    /// Email was blank or lacked an `@` between non-empty parts.
    InvalidEmail,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub document: String,
    pub password_hash: String,
}

impl User {
    /// Identity embedded into tokens issued for this account.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.name.clone(), self.email.clone())
    }

    /// Public projection without credentials or documents.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Public user record.
///
/// # Examples
/// ```
/// use helpdesk::domain::{UserId, UserProfile};
///
/// let profile: UserProfile = serde_json::from_str(
///     r#"{"id":42,"name":"Ana","email":"ana@example.com","role":"client","phone":""}"#,
/// )
/// .unwrap();
/// assert_eq!(profile.id, UserId::new(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub phone: String,
}

/// Account attributes ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub document: String,
    pub password_hash: String,
}

/// Validated self-registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    email: String,
    role: String,
    phone: String,
    document: String,
    password: Zeroizing<String>,
}

/// Raw registration inputs as received from an adapter.
#[derive(Debug, Default, Clone)]
pub struct RegistrationInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub document: Option<&'a str>,
    pub password: &'a str,
}

impl Registration {
    /// Validate raw inputs.
    ///
    /// # Errors
    /// Returns the first [`UserValidationError`] found.
    pub fn try_new(input: RegistrationInput<'_>) -> Result<Self, UserValidationError> {
        let name = normalise_name(input.name)?;
        let email = normalise_email(input.email)?;
        if input.password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let role = input
            .role
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .unwrap_or(DEFAULT_ROLE);

        Ok(Self {
            name,
            email,
            role: role.to_owned(),
            phone: input.phone.map(str::trim).unwrap_or_default().to_owned(),
            document: input.document.map(str::trim).unwrap_or_default().to_owned(),
            password: Zeroizing::new(input.password.to_owned()),
        })
    }

    /// Normalised email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Plain-text password awaiting hashing.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Combine with a password hash into a persistable record.
    #[must_use]
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            role: self.role,
            phone: self.phone,
            document: self.document,
            password_hash,
        }
    }
}

/// Validated partial update of an account. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    phone: Option<String>,
    document: Option<String>,
}

impl UserChanges {
    /// Validate the provided fields.
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when a provided name or email is
    /// unusable.
    pub fn try_new(
        name: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
        phone: Option<&str>,
        document: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: name.map(normalise_name).transpose()?,
            email: email.map(normalise_email).transpose()?,
            role: role.map(|value| value.trim().to_owned()),
            phone: phone.map(|value| value.trim().to_owned()),
            document: document.map(|value| value.trim().to_owned()),
        })
    }

    /// New email, when the update changes it.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Apply the changes to `user`. The id and password hash are untouched.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role.filter(|role| !role.is_empty()) {
            user.role = role;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(document) = self.document {
            user.document = document;
        }
    }
}

fn normalise_name(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn normalise_email(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(trimmed.to_lowercase())
        }
        _ => Err(UserValidationError::InvalidEmail),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn input<'a>(name: &'a str, email: &'a str, password: &'a str) -> RegistrationInput<'a> {
        RegistrationInput {
            name,
            email,
            password,
            ..RegistrationInput::default()
        }
    }

    #[rstest]
    #[case(input("", "ana@example.com", "pw"), UserValidationError::EmptyName)]
    #[case(input("Ana", "ana.example.com", "pw"), UserValidationError::InvalidEmail)]
    #[case(input("Ana", "@example.com", "pw"), UserValidationError::InvalidEmail)]
    #[case(input("Ana", "ana@example.com", ""), UserValidationError::EmptyPassword)]
    fn registration_rejects_invalid_input(
        #[case] raw: RegistrationInput<'static>,
        #[case] expected: UserValidationError,
    ) {
        assert_eq!(Registration::try_new(raw), Err(expected));
    }

    #[test]
    fn registration_defaults_role_and_normalises_email() {
        let registration =
            Registration::try_new(input(" Ana ", " Ana@Example.com ", "pw")).expect("valid");
        let user = registration.into_new_user("hash".to_owned());
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn changes_leave_absent_fields_untouched() {
        let mut user = User {
            id: UserId::new(3),
            name: "Ana".to_owned(),
            email: "ana@example.com".to_owned(),
            role: "client".to_owned(),
            phone: "555".to_owned(),
            document: "123".to_owned(),
            password_hash: "hash".to_owned(),
        };
        UserChanges::try_new(Some("Ana Maria"), None, None, Some("777"), None)
            .expect("valid changes")
            .apply(&mut user);
        assert_eq!(user.name, "Ana Maria");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.phone, "777");
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn profile_omits_credentials() {
        let user = User {
            id: UserId::new(3),
            name: "Ana".to_owned(),
            email: "ana@example.com".to_owned(),
            role: "client".to_owned(),
            phone: String::new(),
            document: "123".to_owned(),
            password_hash: "hash".to_owned(),
        };
        let value = serde_json::to_value(user.profile()).expect("serialise");
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("document").is_none());
        assert_eq!(value["id"], 3);
    }
}
