use serde::Serialize;

use crate::domain::models::token::token::IssuedToken;

/// API 응답 래퍼
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// 액세스 토큰 재발급 응답
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<&IssuedToken> for AccessTokenResponse {
    fn from(issued: &IssuedToken) -> Self {
        Self {
            access_token: issued.token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in(),
        }
    }
}
