use std::future::{ready, Ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::AppError;
use crate::domain::models::token::token::TokenClaims;

/// 검증된 토큰에서 추출된 사용자 식별 정보
///
/// 인증 파이프라인이 요청 extensions에 저장하며, 해당 요청 동안만 유효합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// 사용자 식별자 (`sub`)
    pub user_id: String,
    /// 토큰 고유 ID (`jti`)
    pub token_id: String,
    /// 토큰 발급 시각
    pub issued_at: DateTime<Utc>,
    /// 토큰 만료 시각
    pub expires_at: DateTime<Utc>,
}

impl From<&TokenClaims> for AuthenticatedUser {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            token_id: claims.jti.clone(),
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC),
            expires_at: claims.expires_at(),
        }
    }
}

/// ActixWeb FromRequest trait 구현
///
/// 신원이 없으면 `Forbidden`(403)으로 응답합니다.
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::Forbidden.into())),
        }
    }
}

/// 선택적 인증 사용자 추출자
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::token::token::TokenClass;
    use actix_web::test::TestRequest;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "user-42".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
            token_use: TokenClass::Access,
            jti: "4f1c".to_string(),
            iss: "token-auth-service".to_string(),
        }
    }

    #[test]
    fn test_identity_from_claims() {
        let user = AuthenticatedUser::from(&claims());

        assert_eq!(user.user_id, "user-42");
        assert_eq!(user.token_id, "4f1c");
        assert_eq!(user.expires_at.timestamp(), 1_700_000_900);
        assert_eq!(user.issued_at.timestamp(), 1_700_000_000);
    }

    #[actix_web::test]
    async fn test_extractor_without_identity_is_forbidden() {
        let req = TestRequest::default().to_http_request();
        let result = AuthenticatedUser::extract(&req).await;

        let err = result.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_optional_extractor() {
        let req = TestRequest::default().to_http_request();
        assert!(OptionalUser::extract(&req).await.unwrap().0.is_none());

        req.extensions_mut().insert(AuthenticatedUser::from(&claims()));
        let user = OptionalUser::extract(&req).await.unwrap().0.unwrap();
        assert_eq!(user.user_id, "user-42");
    }
}
