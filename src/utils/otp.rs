// src/utils/otp.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// How long a password-reset code stays usable.
pub const OTP_VALIDITY_MINUTES: i64 = 15;

/// Generates a 6-digit numeric code, uniform over 100000..=999999.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Expiry timestamp for a code issued at `now`.
pub fn otp_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_VALIDITY_MINUTES)
}

/// A submitted code is accepted only if it equals the stored one exactly and
/// the stored expiry lies strictly in the future.
pub fn otp_is_valid(
    stored_code: Option<&str>,
    stored_expiry: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored_code, stored_expiry) {
        (Some(code), Some(expiry)) => code == submitted && expiry > now,
        _ => false,
    }
}
