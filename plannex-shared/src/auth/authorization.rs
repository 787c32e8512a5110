/// Authorization checks for the user directory
///
/// Plannex has a flat, platform-wide role model: a user is either `ADMIN` or
/// not. Admins may edit and delete any user; everyone else may only edit
/// their own profile through the self-service path.
///
/// # Example
///
/// ```
/// use plannex_shared::auth::authorization::require_admin;
/// use plannex_shared::auth::middleware::AuthContext;
/// use plannex_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let admin = AuthContext::new(Uuid::new_v4(), UserRole::Admin);
/// assert!(require_admin(&admin).is_ok());
///
/// let vendor = AuthContext::new(Uuid::new_v4(), UserRole::Vendor);
/// assert!(require_admin(&vendor).is_err());
/// ```

use super::middleware::Principal;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is not allowed to perform the action
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole {
        required: UserRole,
        actual: UserRole,
    },
}

/// Requires the caller to hold the `ADMIN` role
pub fn require_admin(principal: &dyn Principal) -> Result<(), AuthzError> {
    let actual = principal.current_role();

    if !actual.is_admin() {
        return Err(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::middleware::AuthContext;
    use uuid::Uuid;

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&AuthContext::new(Uuid::new_v4(), UserRole::Admin)).is_ok());

        for role in [UserRole::OrgOwner, UserRole::Vendor, UserRole::Volunteer] {
            let err = require_admin(&AuthContext::new(Uuid::new_v4(), role)).unwrap_err();
            assert_eq!(
                err,
                AuthzError::InsufficientRole {
                    required: UserRole::Admin,
                    actual: role,
                }
            );
        }
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: UserRole::Vendor,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient permissions: requires ADMIN, has VENDOR"
        );
    }
}
