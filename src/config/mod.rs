//! # Configuration Module
//!
//! 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 서버 바인딩, 실행 환경, Rate Limiting 설정
//! - [`auth_config`] - 토큰 키 재료, 토큰 수명, 폐기 저장소 정책
//!
//! ## 설계 원칙
//!
//! ### 1. 환경 분리 (Environment Separation)
//!
//! `PROFILE`에 따라 `.env.dev`, `.env.prod`, `.env` 중 하나를 로드합니다.
//!
//! ### 2. 시작 시 검증
//!
//! 인증 설정은 [`AuthSettings::from_env`]에서 한 번에 읽고 검증합니다.
//! 잘못된 설정은 서버가 요청을 받기 전에 드러납니다.
//!
//! - 액세스 토큰 수명은 리프레시 토큰 수명보다 짧아야 함
//! - 두 토큰 종류의 비밀키는 서로 달라야 함
//! - 토큰 종류마다 키 재료가 반드시 있어야 함
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{AuthSettings, Environment, ServerConfig};
//!
//! let env = Environment::current();
//! let settings = AuthSettings::from_env()?;
//! println!("Server will bind to {}", ServerConfig::bind_address());
//! ```
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 서버 설정
//! export HOST="0.0.0.0"
//! export PORT="8080"
//! export ENVIRONMENT="production"  # development, test, staging, production
//!
//! # 토큰 설정
//! export JWT_ISSUER="token-auth-service"
//! export ACCESS_TOKEN_SECRET="..."
//! export REFRESH_TOKEN_SECRET="..."
//!
//! # 폐기 저장소
//! export REDIS_URL="redis://localhost:6379"
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;
