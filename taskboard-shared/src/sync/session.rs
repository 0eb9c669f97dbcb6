/// Signed-in user session
///
/// The authentication layer hands a `Session` to the controller on sign-in
/// and the controller drops it on sign-out. Nothing about the session is
/// global.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;

/// Fallback display name when neither a name nor an email local part exists
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User ID; scopes every store request
    pub user_id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,
}

impl Session {
    /// Builds a session, deriving the display name when none is given
    pub fn new(user_id: Uuid, email: impl Into<String>, name: Option<&str>) -> Self {
        let email = email.into();
        let name = display_name(name, &email);

        Self {
            user_id,
            email,
            name,
        }
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Session::new(user.id, user.email.clone(), user.name.as_deref())
    }
}

/// Picks a display name: the given name if not blank, else the email's
/// local part, else [`DEFAULT_DISPLAY_NAME`]
pub fn display_name(name: Option<&str>, email: &str) -> String {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    match email.split('@').next().map(str::trim) {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => DEFAULT_DISPLAY_NAME.to_string(),
    }
}
