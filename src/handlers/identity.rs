//! 검증된 신원을 돌려주는 엔드포인트
//!
//! 인증 자체는 라우트에 장착된 미들웨어가 수행하며, 핸들러는 extractor로 결과만 읽습니다.
use actix_web::{get, HttpResponse};
use serde_json::json;

use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
use crate::domain::ApiResponse;

/// 현재 신원 조회 (`GET /api/v1/me`)
///
/// `RequireIdentity` 뒤에 장착되므로 익명 요청은 여기까지 오지 않습니다.
#[get("")]
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(user))
}

/// 선택적 인증 신원 조회 (`GET /api/v1/whoami`)
#[get("")]
pub async fn whoami(user: OptionalUser) -> HttpResponse {
    match user.0 {
        Some(user) => HttpResponse::Ok().json(json!({
            "authenticated": true,
            "user": user
        })),
        None => HttpResponse::Ok().json(json!({ "authenticated": false })),
    }
}

/// 인증 필수 헬스 프로브 (`GET /api/v1/protected/ping`)
#[get("/ping")]
pub async fn ping(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "pong": true,
        "user_id": user.user_id
    }))
}
