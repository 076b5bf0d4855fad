//! 미들웨어 모듈
//!
//! 요청 인증 파이프라인과 이를 라우트에 연결하는 ActixWeb 미들웨어를 제공합니다.
//!
//! # 제공 미들웨어
//!
//! ### 1. 인증 미들웨어 (AuthMiddleware)
//! - [`pipeline::AuthPipeline`] 실행 (Bearer 추출 → 폐기 확인 → 검증 → 만료 시 재발급)
//! - 검증된 신원을 request extension에 저장
//! - 선택적/강제 인증 모드 지원
//! - 재발급된 액세스 토큰을 `X-Access-Token` 응답 헤더로 전달
//!
//! ### 2. 신원 필수 게이트 (RequireIdentity)
//! - 신원이 없는 요청을 403으로 차단
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//! use crate::middlewares::{AuthMiddleware, RequireIdentity};
//!
//! App::new()
//!     .app_data(web::Data::new(state.clone()))
//!     .service(
//!         web::scope("/api/v1/protected")
//!             .wrap(AuthMiddleware::required()) // 미인증 시 401
//!             .service(ping)
//!     )
//!     .service(
//!         web::scope("/api/v1/me")
//!             .wrap(RequireIdentity)             // 신원 없으면 403
//!             .wrap(AuthMiddleware::optional())
//!             .service(me)
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;
pub mod pipeline;
pub mod require_identity;

// 미들웨어 재export
pub use auth_middleware::AuthMiddleware;
pub use pipeline::{AuthPipeline, Credentials, Decision, Stage};
pub use require_identity::RequireIdentity;
