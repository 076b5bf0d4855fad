//! # Core Module
//!
//! 모든 계층이 공유하는 기반 타입을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 토큰 검증 실패, 운영 장애, 요청 오류를 구분하는 에러 타입
//! - **HTTP 통합**: Actix-Web `ResponseError` 구현 (`{"error", "message"}` 본문)
//! - **ErrorContext**: 외부 에러를 문맥과 함께 `InternalError`로 변환
//!
//! ### [`clock`] - 시간 소스
//! - **SystemClock**: 운영용 시스템 시계
//! - **FixedClock**: 테스트용 조작 가능한 시계
//!
//! ### [`state`] - 애플리케이션 상태
//! - **AppState**: 시작 시 조립되어 `web::Data`로 주입되는 공유 컴포넌트
//!
//! ## 애플리케이션 초기화
//!
//! ```rust,ignore
//! use crate::core::{AppState, SystemClock};
//!
//! let settings = AuthSettings::from_env()?;
//! let state = AppState::from_settings(&settings, credentials, Arc::new(SystemClock)).await?;
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .app_data(web::Data::new(state.clone()))
//!         .configure(configure_all_routes)
//! })
//! ```

pub mod clock;
pub mod errors;
pub mod state;

pub use clock::*;
pub use errors::*;
pub use state::*;
