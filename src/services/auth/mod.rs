//! 인증 및 보안 서비스 모듈
//!
//! 서명 토큰의 발급/검증과 액세스 토큰 재발급을 담당합니다.
//!
//! # Features
//!
//! - 토큰 종류(액세스/리프레시)별 키 관리 (HS256 비밀키 또는 RS256 키 쌍)
//! - 토큰 발급, 검증, 만료 판정
//! - 리프레시 토큰 기반 액세스 토큰 재발급
//! - JWKS 공개키 노출
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::{TokenService, Verification};
//!
//! let pair = state.tokens.issue_pair("user-42")?;
//! match state.tokens.verify(&pair.access_token, TokenClass::Access)? {
//!     Verification::Valid(claims) => println!("sub={}", claims.sub),
//!     Verification::Expired(_) => println!("expired"),
//!     Verification::Invalid(reason) => println!("rejected: {}", reason),
//! }
//! ```

pub mod key_service;
pub mod refresh_service;
pub mod token_service;

pub use key_service::*;
pub use refresh_service::*;
pub use token_service::*;
