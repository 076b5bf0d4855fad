//! # Domain Models Module
//!
//! 토큰 수명주기를 구성하는 값 객체를 정의합니다.
//!
//! - [`token`] - 클레임, 토큰 종류, 발급 결과, 토큰 쌍
//! - [`auth`] - 요청에 부착되는 검증된 신원과 라우트 인증 모드
//!
//! 모든 모델은 불변입니다. 새 토큰은 항상 새로운 값으로 만들어집니다.

pub mod auth;
pub mod token;

pub use auth::*;
pub use token::*;
