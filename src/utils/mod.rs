use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use sha2::{Digest, Sha512};
use uuid::Uuid;

use crate::error::{Error, Result};

const SALT_LEN: usize = 16;

/// Current UTC time at microsecond precision, the finest Postgres keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn generate_salt() -> String {
    let mut salt = Uuid::new_v4().simple().to_string();
    salt.truncate(SALT_LEN);
    salt
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let candidate = hash_password(password, salt);
    if candidate.len() != hash.len() {
        return false;
    }

    candidate
        .bytes()
        .zip(hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Runs `fut`, giving up after `after`. A future abandoned this way is
/// dropped at its current await point.
pub async fn with_deadline<T, F>(op: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded its deadline of {:?}", op, after);
            Err(Error::DeadlineExceeded { op, after })
        }
    }
}
