//! One-time passcodes for email verification.

use rand::Rng;

/// Generate a six-digit numeric passcode (100000..=999999).
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}
