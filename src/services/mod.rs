//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 시작 시 한 번 생성되어 애플리케이션 상태(`AppState`)로 주입됩니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::{KeyStore, TokenService};
//!
//! let keys = Arc::new(KeyStore::from_config(&settings.jwt));
//! let tokens = TokenService::new(&settings.jwt, keys, Arc::new(SystemClock));
//! ```

pub mod auth;
