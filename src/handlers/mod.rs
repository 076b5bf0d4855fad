//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 정의하는 모듈입니다.
//! 핸들러는 `web::Data<AppState>`에서 서비스를 꺼내 쓰며, 에러는 `AppError`로 반환해
//! `{"error": <code>, "message": <text>}` 형태의 응답으로 변환됩니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Client (Browser, Mobile App, API Client)
//! └─────────────────────┬───────────────────────┘
//!                       │ HTTP Request/Response
//! ┌─────────────────────▼───────────────────────┐
//!   Middlewares - 인증 파이프라인, 신원 게이트     ← Auth Layer
//! ├─────────────────────────────────────────────┤
//!   Handlers (이 모듈) - HTTP 엔드포인트 처리      ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   Services - 토큰 발급/검증/재발급              ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   Repositories - 폐기 목록, 자격 증명            ← Repository Layer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 로그인 (`POST /api/v1/sessions`), 갱신 (`POST /api/v1/sessions/refresh`)
//! - **`token_handlers`**: 로그아웃 (`POST /api/v1/logout`)
//! - **`identity`**: 신원 조회 (`/api/v1/me`, `/api/v1/whoami`, `/api/v1/protected/ping`)
//! - **`jwks`**: 공개키 (`GET /.well-known/jwks.json`)

pub mod auth;
pub mod identity;
pub mod jwks;
pub mod token_handlers;
