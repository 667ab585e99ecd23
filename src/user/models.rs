use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct UserModel {
    pub id: i32, // Assigned by the store, never reassigned
    pub username: String,
    pub password: String, // Stored verbatim
}

impl UserModel {
    /// Overwrites only the fields that are present
    pub fn apply_changes(&mut self, username: Option<&str>, password: Option<&str>) {
        if let Some(username) = username {
            self.username = username.to_string();
        }
        if let Some(password) = password {
            self.password = password.to_string();
        }
    }

    /// Plain equality against the stored password
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}
