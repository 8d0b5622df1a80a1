//! Contact redaction for log output
//!
//! Email addresses and phone numbers never reach the logs in clear text.
//! Emails become a salted, truncated SHA-256 digest; phone numbers keep only
//! their last digits.

use sha2::{Digest, Sha256};

const EMAIL_HASH_SALT: &[u8] = b"calnotify-dispatch-email-salt";

/// Stable, non-reversible label for an email address.
pub fn redact_email(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(EMAIL_HASH_SALT);
    hasher.update(email.trim().to_lowercase().as_bytes());
    let digest = hasher.finalize();
    let hash = hex::encode(&digest[..8]);
    format!("email_hash={hash}")
}

/// Masks all but the last two digits of a phone number.
pub fn redact_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 2 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("***{tail}")
}
