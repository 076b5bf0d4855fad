//! # Data Transfer Objects
//!
//! HTTP 요청/응답 본문과 도메인 모델 사이의 계약을 정의합니다.
//!
//! ```text
//! dto/
//! └── sessions/
//!     ├── request.rs   - LoginRequest, RefreshRequest (validator 기반 검증)
//!     └── response.rs  - ApiResponse, AccessTokenResponse
//! ```
//!
//! 요청 DTO는 `validator::Validate`를 구현하며, 핸들러는 서비스 호출 전에
//! `validate()` 결과를 `AppError::ValidationError`로 변환합니다.

pub mod sessions;

pub use sessions::*;
