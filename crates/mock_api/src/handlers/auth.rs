use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use upbreed_core::models::{LoginRequest, LoginResponse, TokenClaims};

use crate::error::{MockError, MockResult};
use crate::handlers::DataResponse;
use crate::state::MockState;

/// Lifetime of issued session tokens.
const TOKEN_TTL_DAYS: i64 = 90;

/// POST /auth/login
pub async fn login(
    State(state): State<MockState>,
    Json(input): Json<LoginRequest>,
) -> MockResult<Json<DataResponse<LoginResponse>>> {
    let known = state
        .store()
        .users
        .iter()
        .position(|(email, password)| *email == input.email && *password == input.password);
    let Some(index) = known else {
        tracing::info!(email = %input.email, "Mock login rejected");
        return Err(MockError::Unauthorized);
    };

    let now = Utc::now();
    let claims = TokenClaims {
        email: input.email.clone(),
        id: (index + 1).to_string(),
        fname: "Admin".to_string(),
        lname: "User".to_string(),
        roles: vec!["ADMIN".to_string()],
        device_signature: input.device_signature,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| MockError::BadRequest(e.to_string()))?;

    Ok(Json(DataResponse {
        data: LoginResponse { token },
    }))
}
