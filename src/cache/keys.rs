//! Cache key construction.
//!
//! Each logical query has its own prefix, so keys for different queries can
//! never collide. Emails are trimmed and lowercased before use.

use uuid::Uuid;

/// Normalizes an email for keying and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Key for a lookup by id.
pub fn user_by_id(id: Uuid) -> String {
    format!("user:id:{}", id)
}

/// Key for a lookup by email.
pub fn user_by_email(email: &str) -> String {
    format!("user:email:{}", normalize_email(email))
}

/// Key for one page of the email-ordered listing.
pub fn user_page(page: u32, page_size: u32) -> String {
    format!("users:page:{}:{}", page, page_size)
}

/// Key for the email uniqueness predicate.
pub fn email_unique(email: &str) -> String {
    format!("user:email-unique:{}", normalize_email(email))
}

/// Key for the total user count.
pub fn user_count() -> String {
    "users:count".to_string()
}
