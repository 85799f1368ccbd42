use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the users workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    pub email: String,
    pub password: String,
    pub admin: Option<String>,
    /// Columns the service does not interpret, written back unchanged
    pub extra: BTreeMap<String, String>,
}

impl UserRecord {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
            .as_deref()
            .map(|role| role.trim().eq_ignore_ascii_case("admin"))
            .unwrap_or(false)
    }
}

/// Identity attached to a request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthenticatedUser {
    pub email: String,
    pub admin: bool,
}

impl From<&UserRecord> for AuthenticatedUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            email: user.email.clone(),
            admin: user.is_admin(),
        }
    }
}
