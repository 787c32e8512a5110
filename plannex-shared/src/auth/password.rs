/// Argon2id password hashes
///
/// Hashes are PHC strings (`$argon2id$v=19$m=...`) and opaque to everything
/// outside this module: produced by [`hash_password`], stored in
/// `User.password_hash`, checked by [`verify_password`].
///
/// ```
/// use plannex_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stored = hash_password("123456")?;
/// assert!(verify_password("123456", &stored)?);
/// assert!(!verify_password("654321", &stored)?);
/// # Ok(())
/// # }
/// ```

use argon2::password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Memory cost in KiB (64 MiB)
pub const MEMORY_KIB: u32 = 64 * 1024;

/// Passes over memory
pub const ITERATIONS: u32 = 3;

/// Parallel lanes
pub const LANES: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Argon2 parameters rejected: {0}")]
    Params(argon2::Error),

    #[error("Could not hash password: {0}")]
    Hash(password_hash::Error),

    #[error("Stored hash is not a valid PHC string: {0}")]
    MalformedHash(password_hash::Error),

    #[error("Could not verify password: {0}")]
    Verify(password_hash::Error),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, Some(Params::DEFAULT_OUTPUT_LEN))
        .map_err(PasswordError::Params)?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` under a new random salt
///
/// Costs roughly 64 MiB and tens of milliseconds; async callers should run it
/// on the blocking pool.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// `Ok(false)` means a wrong password; `Err` means the hash itself is unusable
///
/// Cost parameters are read from `stored`, so hashes made with other settings
/// still verify.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e)),
    }
}
