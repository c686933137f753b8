use serde::{Deserialize, Serialize};

/// `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_signature: String,
}

/// `POST /auth/login` response. The token becomes the `rf` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// Claims carried by the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub email: String,
    pub id: String,
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub device_signature: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.fname, self.lname).trim().to_string()
    }
}
