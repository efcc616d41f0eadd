//! Per-resource ownership authorization.
//!
//! Services fetch the resource, call [`ensure_owner`] with the stored owner
//! and the caller's id, and only then write. A denial therefore leaves the
//! store untouched.

use super::{Error, UserId};

/// Authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// The caller does not own the resource.
    #[error("only the owner may modify this resource")]
    Forbidden,
}

impl From<AuthzError> for Error {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden => Self::forbidden(value.to_string()),
        }
    }
}

/// Whether `requester` may mutate a resource owned by `owner`.
///
/// # Examples
/// ```
/// use helpdesk::domain::{authorize, UserId};
///
/// assert!(authorize(UserId::new(42), UserId::new(42)));
/// assert!(!authorize(UserId::new(42), UserId::new(7)));
/// ```
#[must_use]
pub fn authorize(owner: UserId, requester: UserId) -> bool {
    owner == requester
}

/// Fail with [`AuthzError::Forbidden`] unless `requester` owns the resource.
///
/// # Errors
/// Returns [`AuthzError::Forbidden`] on an ownership mismatch.
pub fn ensure_owner(owner: UserId, requester: UserId) -> Result<(), AuthzError> {
    if authorize(owner, requester) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(42, 42, true)]
    #[case(42, 7, false)]
    #[case(7, 42, false)]
    #[case(0, 0, true)]
    fn authorize_compares_owner_with_requester(
        #[case] owner: i64,
        #[case] requester: i64,
        #[case] expected: bool,
    ) {
        assert_eq!(
            authorize(UserId::new(owner), UserId::new(requester)),
            expected
        );
    }

    #[test]
    fn denial_maps_to_forbidden() {
        let err = ensure_owner(UserId::new(42), UserId::new(7)).expect_err("must deny");
        assert_eq!(Error::from(err).code(), ErrorCode::Forbidden);
    }
}
