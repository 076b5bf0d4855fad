use actix_web::{get, web, HttpResponse};

use crate::core::{AppError, AppState};

/// 액세스 토큰 검증용 공개키 (JWKS)
///
/// 액세스 토큰이 HMAC 비밀키로 서명되는 경우 공개할 키가 없으므로 404입니다.
#[get("/.well-known/jwks.json")]
pub async fn jwks_handler(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    match state.keys.jwks()? {
        Some(jwks) => Ok(HttpResponse::Ok()
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .json(jwks)),
        None => Err(AppError::NotFound(
            "access tokens are signed with a shared secret".to_string(),
        )),
    }
}
