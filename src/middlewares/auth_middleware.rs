//! 토큰 인증 미들웨어
//!
//! 요청마다 [`AuthPipeline`](crate::middlewares::pipeline::AuthPipeline)을 실행하고
//! 라우트의 [`AuthMode`]에 따라 결정을 HTTP 응답으로 옮깁니다.
//!
//! | 결정 | `Required` | `Optional` |
//! |------|-----------|------------|
//! | Authenticated | 신원 부착 후 진행 | 신원 부착 후 진행 |
//! | Unauthenticated(reason) | 401 + reason 코드 | 익명으로 진행 |
//! | Rejected(reason) | 401/500 즉시 응답 | 401/500 즉시 응답 |
//!
//! 만료된 액세스 토큰이 재발급되면 응답에 `X-Access-Token` 헤더가 붙습니다.
//! 미들웨어는 `web::Data<AppState>`가 등록된 앱에서만 동작합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::models::auth::AuthMode;
use crate::middlewares::auth_inner::AuthMiddlewareService;

/// 토큰 인증 미들웨어
pub struct AuthMiddleware {
    /// 인증 모드 (Required/Optional)
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    /// 인증 필수. 미인증 요청은 사유 코드와 함께 401
    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    /// 인증 선택. 미인증 요청은 익명으로 진행
    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Duration;
    use serde_json::Value;

    use crate::domain::models::auth::OptionalUser;
    use crate::middlewares::pipeline::ACCESS_TOKEN_HEADER;
    use crate::test_support::test_state;

    async fn whoami(user: OptionalUser) -> HttpResponse {
        match user.0 {
            Some(user) => HttpResponse::Ok().body(user.user_id),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    macro_rules! app_with {
        ($state:expr, $mode:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new($mode))
                            .route("/probe", web::get().to(whoami)),
                    ),
            )
            .await
        };
    }

    async fn error_code<B: MessageBody>(resp: ServiceResponse<B>) -> String {
        let body: Value = test::read_body_json(resp).await;
        body["error"].as_str().unwrap_or_default().to_string()
    }

    #[actix_web::test]
    async fn test_required_without_token_is_401() {
        let (_, state) = test_state();
        let app = app_with!(state, AuthMode::Required);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/probe").to_request()).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(error_code(resp).await, "missing_token");
    }

    #[actix_web::test]
    async fn test_optional_without_token_is_anonymous() {
        let (_, state) = test_state();
        let app = app_with!(state, AuthMode::Optional);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/probe").to_request()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "anonymous");
    }

    #[actix_web::test]
    async fn test_valid_token_attaches_identity() {
        let (_, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        let app = app_with!(state, AuthMode::Required);

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert!(resp.headers().get(ACCESS_TOKEN_HEADER).is_none());
        assert_eq!(test::read_body(resp).await, "user-1");
    }

    #[actix_web::test]
    async fn test_expired_token_scenarios() {
        let (clock, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        clock.advance(Duration::minutes(20));
        let app = app_with!(state, AuthMode::Required);

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(error_code(resp).await, "token_expired");

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .insert_header(("X-Refresh", pair.refresh_token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let rotated = resp
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("X-Access-Token header");
        assert_ne!(rotated, pair.access_token);
        assert_eq!(test::read_body(resp).await, "user-1");

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", format!("Bearer {}", rotated)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    #[actix_web::test]
    async fn test_rejection_ignores_optional_mode() {
        let (_, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        state
            .revocations
            .revoke(&pair.access_token, Duration::minutes(15))
            .await
            .unwrap();
        let app = app_with!(state, AuthMode::Optional);

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(error_code(resp).await, "token_revoked");
    }

    #[actix_web::test]
    async fn test_optional_with_bad_token_is_anonymous() {
        let (_, state) = test_state();
        let app = app_with!(state, AuthMode::Optional);

        let req = test::TestRequest::get()
            .uri("/probe")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "anonymous");
    }
}
