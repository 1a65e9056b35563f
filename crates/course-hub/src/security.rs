//! Password hashing behind a trait so services never see the scheme.

use rand::distributions::{Alphanumeric, DistString};
use sha2::{Digest, Sha256};

const SALT_LENGTH: usize = 16;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Stores `salt$hex(sha256(salt || password))`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaltedSha256;

impl SaltedSha256 {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl PasswordHasher for SaltedSha256 {
    fn hash(&self, password: &str) -> String {
        let salt = Alphanumeric.sample_string(&mut rand::thread_rng(), SALT_LENGTH);
        format!("{}${}", salt, Self::digest(&salt, password))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        match stored.split_once('$') {
            Some((salt, digest)) => {
                constant_time_eq(Self::digest(salt, password).as_bytes(), digest.as_bytes())
            }
            None => false,
        }
    }
}

/// Compares every byte regardless of where the first mismatch is.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
