//! Authentication data models.

use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// User profile as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub company_name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Token and user profile, always stored and cleared together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: UserProfile,
    pub token: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub company_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub user: Option<UserProfile>,
}

/// Username/email availability check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub available: bool,
    #[serde(default)]
    pub message: String,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Generic `{success, message, data}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Single user response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: Option<UserProfile>,
}

/// User list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_reads_camel_case() {
        let json = r#"{
            "id": 7,
            "companyName": "Acme Capital",
            "username": "analyst_1",
            "email": "analyst@acme.test",
            "createdAt": "2024-03-01T09:00:00",
            "updatedAt": "2024-03-02T09:00:00",
            "isActive": true
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.company_name, "Acme Capital");
        assert_eq!(user.created_at.as_deref(), Some("2024-03-01T09:00:00"));
        assert!(user.is_active);
    }

    #[test]
    fn test_signup_writes_camel_case() {
        let req = SignUpRequest {
            company_name: "Acme".to_string(),
            username: "analyst_1".to_string(),
            email: "a@acme.test".to_string(),
            password: "Secret123".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["companyName"], "Acme");
        assert!(json.get("company_name").is_none());
    }
}
