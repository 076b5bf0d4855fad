//! Session HTTP Handlers
//!
//! 로그인(토큰 쌍 발급)과 명시적 액세스 토큰 갱신 엔드포인트입니다.
//!
//! - **로그인**: 이메일/패스워드 확인 후 토큰 쌍 발급 (`POST /api/v1/sessions`)
//! - **갱신**: 리프레시 토큰으로 새 액세스 토큰 발급 (`POST /api/v1/sessions/refresh`)
use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::core::{AppError, AppState};
use crate::domain::{AccessTokenResponse, LoginRequest, RefreshRequest};

/// 로컬 로그인 핸들러
///
/// 자격 증명 검증기로 이메일과 패스워드를 확인하고 액세스/리프레시 토큰 쌍을 발급합니다.
///
/// # Endpoint
/// `POST /api/v1/sessions`
///
/// # Errors
///
/// * `400 validation_error` - 요청 본문 검증 실패
/// * `401 invalid_credentials` - 이메일 또는 패스워드 불일치
#[post("")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // 유효성 검사
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_id = match state.credentials.verify(&payload.email, &payload.password).await {
        Ok(user_id) => user_id,
        Err(e) => {
            log::warn!("로컬 로그인 실패 - 사용자: {}, 사유: {}", payload.email, e.code());
            return Err(e);
        }
    };

    let token_pair = state.tokens.issue_pair(&user_id)?;

    log::info!("로컬 로그인 성공 - 사용자: {}, ID: {}", payload.email, user_id);

    Ok(HttpResponse::Ok().json(token_pair))
}

/// 토큰 갱신 엔드포인트
///
/// 리프레시 토큰을 검증하고 같은 사용자의 새 액세스 토큰을 발급합니다.
/// 리프레시 토큰은 회전되지 않습니다.
///
/// # Endpoint
/// `POST /api/v1/sessions/refresh`
#[post("/refresh")]
pub async fn refresh_session(
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let issued = state.refresh.reissue(&payload.refresh_token)?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse::from(&issued)))
}
