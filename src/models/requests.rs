//! Request DTOs for the user API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Longest accepted email address.
pub const MAX_EMAIL_LENGTH: usize = 256;

/// Checks that an email is present, bounded and looks like an address.
pub fn validate_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Some(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        ));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => None,
        _ => Some(format!("'{}' is not a valid email address", email)),
    }
}

fn validate_name(field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{} cannot be empty", field))
    } else {
        None
    }
}

/// Request body for creating a user (POST /users)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreateUserRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_email(&self.email)
            .or_else(|| validate_name("First name", &self.first_name))
            .or_else(|| validate_name("Last name", &self.last_name))
    }
}

/// Request body for a partial update (PUT /users/:id)
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Validates the fields that are present.
    pub fn validate(&self) -> Option<String> {
        if self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.is_active.is_none()
        {
            return Some("Update must change at least one field".to_string());
        }
        self.email
            .as_deref()
            .and_then(validate_email)
            .or_else(|| {
                self.first_name
                    .as_deref()
                    .and_then(|v| validate_name("First name", v))
            })
            .or_else(|| {
                self.last_name
                    .as_deref()
                    .and_then(|v| validate_name("Last name", v))
            })
    }
}

/// Query string for listing users (GET /users?page=&page_size=)
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Users per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// Checks paging arguments.
pub fn validate_page(page: u32, page_size: u32) -> Option<String> {
    if page == 0 {
        return Some("Page numbers start at 1".to_string());
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Some(format!("Page size must be between 1 and {}", MAX_PAGE_SIZE));
    }
    None
}
