//! # Domain Layer Module
//!
//! 인증 코어가 다루는 도메인 타입을 모아 둔 계층입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Models  - 토큰 클레임, 검증된 신원, 인증 모드
//! └── DTOs    - 로그인/갱신 요청과 응답 본문
//!      │
//!      ▼
//! Application Layer (Services, Middlewares)
//!      │
//!      ▼
//! Infrastructure Layer (Repositories, Redis)
//! ```
//!
//! 사용자 레코드의 영속성은 이 서비스의 관심사가 아닙니다. 인증 코어는 외부 협력자로부터
//! 불투명한 사용자 식별자만 받아 토큰의 `sub`로 사용합니다.

pub mod dto;
pub mod models;

pub use dto::*;
pub use models::*;
