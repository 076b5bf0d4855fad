//! 액세스 토큰 재발급 서비스
//!
//! 리프레시 토큰을 검증하고 같은 subject의 새 액세스 토큰을 발급합니다.
//! 리프레시 토큰은 여러 번 사용할 수 있으며, 재발급은 폐기 저장소를 건드리지 않습니다.

use std::sync::Arc;

use crate::core::{AppError, AppResult};
use crate::domain::models::token::{IssuedToken, TokenClass};
use crate::services::auth::token_service::{TokenService, Verification};
use crate::repositories::tokens::short_fingerprint;

pub struct RefreshService {
    tokens: Arc<TokenService>,
}

impl RefreshService {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// 리프레시 토큰으로 새 액세스 토큰을 발급합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::RefreshRejected` - 리프레시 토큰이 만료되었거나 유효하지 않음
    /// * `AppError::KeyUnavailable` - 키를 로드할 수 없음
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let issued = refresh_service.reissue(&refresh_token)?;
    /// response.insert_header(("X-Access-Token", issued.token));
    /// ```
    pub fn reissue(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let claims = match self.tokens.verify(refresh_token, TokenClass::Refresh)? {
            Verification::Valid(claims) => claims,
            Verification::Expired(_) => {
                log::debug!("만료된 리프레시 토큰: {}", short_fingerprint(refresh_token));
                return Err(AppError::RefreshRejected("refresh token has expired".to_string()));
            }
            Verification::Invalid(reason) => {
                log::warn!(
                    "유효하지 않은 리프레시 토큰 ({}): {}",
                    reason.code(),
                    short_fingerprint(refresh_token)
                );
                return Err(AppError::RefreshRejected(reason.public_message()));
            }
        };

        let issued = self
            .tokens
            .issue(&claims.sub, TokenClass::Access, self.tokens.access_lifetime())?;

        log::info!("액세스 토큰 재발급: sub={}", issued.claims.sub);
        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::test_support::{fixed_clock, hs256_config, token_service_with};

    fn setup() -> (Arc<crate::core::FixedClock>, Arc<TokenService>, RefreshService) {
        let clock = fixed_clock();
        let tokens = Arc::new(token_service_with(&hs256_config(), clock.clone()));
        let refresh = RefreshService::new(tokens.clone());
        (clock, tokens, refresh)
    }

    #[test]
    fn test_refresh_preserves_subject() {
        let (clock, tokens, refresh) = setup();
        let pair = tokens.issue_pair("user-7").unwrap();
        clock.advance(Duration::minutes(20));

        let issued = refresh.reissue(&pair.refresh_token).unwrap();
        assert_eq!(issued.claims.sub, "user-7");
        assert_eq!(issued.claims.token_use, TokenClass::Access);
        assert_eq!(issued.expires_in(), 15 * 60);
        assert!(matches!(
            tokens.verify(&issued.token, TokenClass::Access).unwrap(),
            Verification::Valid(_)
        ));
    }

    #[test]
    fn test_refresh_token_is_reusable() {
        let (_, tokens, refresh) = setup();
        let pair = tokens.issue_pair("user-7").unwrap();

        let first = refresh.reissue(&pair.refresh_token).unwrap();
        let second = refresh.reissue(&pair.refresh_token).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_expired_refresh_token_is_rejected() {
        let (clock, tokens, refresh) = setup();
        let pair = tokens.issue_pair("user-7").unwrap();
        clock.advance(Duration::days(7));

        assert!(matches!(
            refresh.reissue(&pair.refresh_token),
            Err(AppError::RefreshRejected(_))
        ));
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let (_, tokens, refresh) = setup();
        let pair = tokens.issue_pair("user-7").unwrap();

        assert!(matches!(
            refresh.reissue(&pair.access_token),
            Err(AppError::RefreshRejected(_))
        ));
        assert!(matches!(refresh.reissue("garbage"), Err(AppError::RefreshRejected(_))));
    }
}
