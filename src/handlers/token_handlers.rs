//! 로그아웃 핸들러
//!
//! 제시된 액세스 토큰을 남은 수명 동안 폐기 목록에 기록합니다.
//! 로그아웃 경로는 폐기 저장소 장애를 삼키지 않습니다(fail-closed).
use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::core::{AppError, AppState};
use crate::domain::models::token::TokenClass;
use crate::domain::ApiResponse;
use crate::repositories::tokens::short_fingerprint;
use crate::services::auth::{TokenService, Verification};

/// 로그아웃 엔드포인트
///
/// # Endpoint
/// `POST /api/v1/logout`
///
/// # Responses
///
/// | 상황 | 상태 |
/// |------|------|
/// | 폐기 기록 성공 | 200 |
/// | 이미 만료된 토큰 (기록 생략) | 200 |
/// | Bearer 토큰 없음 | 400 `missing_token` |
/// | 형식/서명 오류 | 401 |
/// | 폐기 저장소 장애 | 500 |
#[post("/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    // 1. Authorization 헤더에서 access token 추출
    let access_token = match req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(TokenService::extract_bearer_token)
    {
        Some(Ok(token)) => token,
        _ => {
            log::debug!("로그아웃 요청에 Bearer 토큰이 없습니다");
            return Ok(HttpResponse::BadRequest().json(AppError::MissingToken.body()));
        }
    };

    // 2. 서명 검증 (만료 여부와 무관하게 서명은 유효해야 함)
    let claims = match state.tokens.verify(access_token, TokenClass::Access)? {
        Verification::Valid(claims) => claims,
        Verification::Expired(claims) => {
            log::debug!(
                "이미 만료된 토큰의 로그아웃 - user_id: {}, token: {}…",
                claims.sub,
                short_fingerprint(access_token)
            );
            return Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("이미 만료된 토큰입니다")));
        }
        Verification::Invalid(reason) => {
            log::warn!("로그아웃 거부 ({}): {}…", reason.code(), short_fingerprint(access_token));
            return Err(reason);
        }
    };

    // 3. 남은 수명 동안 폐기 기록
    state
        .revocations
        .revoke_until_expiry(access_token, &claims)
        .await
        .map_err(|e| {
            log::error!("로그아웃 실패 - user_id: {}, 에러: {}", claims.sub, e);
            e
        })?;

    log::info!("사용자 로그아웃 성공 - user_id: {}", claims.sub);

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("로그아웃이 성공적으로 처리되었습니다")))
}
