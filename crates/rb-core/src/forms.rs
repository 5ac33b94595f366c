//! # Form Binding
//!
//! Submitted form fields are bound by name onto these structs. Unknown
//! fields are ignored and missing ones default to empty, so a form that
//! omits `title` fails validation instead of persisting blank data.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Ad, Post};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_TEXT_LEN: usize = 10_000;
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
pub const MIN_PASSWORD_LEN: usize = 4;

fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

impl PostForm {
    /// Validates the form and builds a post owned by `author_id`.
    pub fn into_post(self, author_id: Uuid) -> Result<Post> {
        let title = required("title", &self.title, MAX_TITLE_LEN)?;
        let body = required("body", &self.body, MAX_TEXT_LEN)?;
        Ok(Post::new(title, body, author_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdForm {
    pub title: String,
    pub description: String,
}

impl AdForm {
    pub fn into_ad(self, owner_id: Uuid) -> Result<Ad> {
        let title = required("title", &self.title, MAX_TITLE_LEN)?;
        let description = required("description", &self.description, MAX_TEXT_LEN)?;
        Ok(Ad::new(title, description, owner_id))
    }

    /// Copies the editable fields onto an existing ad. Id, owner and
    /// creation time are left alone; on error `ad` is untouched.
    pub fn apply_to(self, ad: &mut Ad) -> Result<()> {
        let title = required("title", &self.title, MAX_TITLE_LEN)?;
        let description = required("description", &self.description, MAX_TEXT_LEN)?;
        ad.title = title;
        ad.description = description;
        Ok(())
    }

    pub fn from_ad(ad: &Ad) -> Self {
        Self {
            title: ad.title.clone(),
            description: ad.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    /// Checks the fields, returning `(username, email)` ready for storage.
    pub fn validate(&self) -> Result<(String, Option<String>)> {
        let username = self.username.trim();
        if !USERNAME_LEN.contains(&username.chars().count()) {
            return Err(AppError::ValidationError(format!(
                "username must be between {} and {} characters",
                USERNAME_LEN.start(),
                USERNAME_LEN.end()
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AppError::ValidationError(
                "username may only contain letters, digits, '_', '.' and '-'".into(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            return Err(AppError::ValidationError("email address is not valid".into()));
        }
        let email = (!email.is_empty()).then(|| email.to_string());
        Ok((username.to_string(), email))
    }
}
