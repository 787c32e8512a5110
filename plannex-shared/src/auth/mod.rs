/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token creation and validation
/// - [`middleware`]: bearer authentication and the caller [`middleware::Principal`]
/// - [`authorization`]: role checks
///
/// # Example
///
/// ```no_run
/// use plannex_shared::auth::password::{hash_password, verify_password};
/// use plannex_shared::auth::jwt::{create_token, Claims};
/// use plannex_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Volunteer);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
