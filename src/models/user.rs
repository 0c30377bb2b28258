use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct User {
    /// Server-assigned identifier
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Any other fields the server sends, kept so the stored copy stays faithful
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body returned by `POST /auth/login`: the token alongside the user fields
#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_flattens_user() {
        let json = r#"{
            "token": "abc.def.ghi",
            "_id": "u1",
            "username": "admin",
            "email": "admin@example.com",
            "lastLogin": "2024-01-01"
        }"#;

        let response: LoginResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.token, "abc.def.ghi");
        assert_eq!(response.user.id, "u1");
        assert_eq!(response.user.username, "admin");
        assert_eq!(response.user.email.as_deref(), Some("admin@example.com"));
        assert!(response.user.extra.contains_key("lastLogin"));
        assert!(!response.user.extra.contains_key("token"));
    }
}
