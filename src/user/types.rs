use serde::{Deserialize, Serialize};

use super::models::UserModel;

/// Request payload for creating a user. Unknown fields such as `id` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateRequest {
    pub username: String,
    pub password: String,
}

/// Partial update payload - absent (or null) fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Wire representation of a stored user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub password: String,
}

impl From<UserModel> for UserResponse {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password: model.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_ignores_id() {
        let request: UserCreateRequest =
            serde_json::from_value(json!({"id": 99, "username": "u", "password": "p"})).unwrap();

        assert_eq!(request.username, "u");
        assert_eq!(request.password, "p");
    }

    #[test]
    fn test_create_request_requires_both_fields() {
        let result = serde_json::from_value::<UserCreateRequest>(json!({"username": "u"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let empty: UserUpdateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.username.is_none());
        assert!(empty.password.is_none());

        let nulls: UserUpdateRequest =
            serde_json::from_value(json!({"username": null, "password": "p"})).unwrap();
        assert!(nulls.username.is_none());
        assert_eq!(nulls.password.as_deref(), Some("p"));
    }

    #[test]
    fn test_user_response_shape() {
        let response = UserResponse::from(UserModel {
            id: 7,
            username: "testuser".to_string(),
            password: "12345".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"id": 7, "username": "testuser", "password": "12345"})
        );
    }
}
