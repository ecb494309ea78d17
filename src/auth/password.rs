use once_cell::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A malformed stored hash counts as a mismatch, not an error: the caller
/// answers 401 either way.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

/// Checks `password` against the stored hash, or against a throwaway hash when
/// the account does not exist so both paths cost one bcrypt verification.
pub fn verify_login(password: &str, stored: Option<&str>, cost: u32) -> bool {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = dummy_hash(cost) {
                let _ = bcrypt::verify(password, dummy);
            }
            false
        }
    }
}

fn dummy_hash(cost: u32) -> Option<&'static str> {
    static DUMMY: OnceCell<Option<String>> = OnceCell::new();
    DUMMY
        .get_or_init(|| bcrypt::hash("no-such-account", cost).ok())
        .as_deref()
}
