//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 토큰 폐기 목록과 로그인 자격 증명 조회를 제공합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::tokens::RevocationStore;
//!
//! store.revoke_until_expiry(&token, &claims).await?;
//! assert!(store.is_revoked(&token).await?);
//! ```

pub mod tokens;
pub mod users;
