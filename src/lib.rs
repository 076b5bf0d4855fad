//! 토큰 인증 서비스
//!
//! 짧은 수명의 서명 액세스 토큰, 긴 수명의 리프레시 토큰, 그리고 로그아웃을 위한
//! 폐기 목록(denylist)으로 HTTP 요청을 인증하는 서비스입니다.
//!
//! # Features
//!
//! - **토큰 발급/검증**: 토큰 종류별 키(HS256 비밀키 또는 RS256 키 쌍), 알고리즘 고정
//! - **만료 시 재발급**: `X-Refresh` 헤더의 리프레시 토큰으로 새 액세스 토큰을 `X-Access-Token`에 담아 전달
//! - **폐기**: 로그아웃한 토큰을 남은 수명 동안 Redis에 기록
//! - **인증 파이프라인**: 추출 → 폐기 확인 → 검증 → 재발급 순서의 명시적 단계
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Middlewares   │ ← AuthPipeline, RequireIdentity
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 토큰 발급/검증/재발급
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 폐기 목록, 자격 증명
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │      Redis      │ ← 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use token_auth_service::config::AuthSettings;
//! use token_auth_service::core::{AppState, SystemClock};
//!
//! let settings = AuthSettings::from_env()?;
//! let state = AppState::from_settings(&settings, credentials, Arc::new(SystemClock)).await?;
//!
//! let pair = state.tokens.issue_pair("user-42")?;
//! state.revocations.revoke_until_expiry(&pair.access_token, &claims).await?;
//! ```

pub mod caching;
pub mod config;
pub mod core;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
