//! JWT 토큰 관리 서비스 구현
//!
//! 서명된 compact JWT의 발급과 검증을 담당합니다. 키 조회 외에는 I/O가 없습니다.
//!
//! 검증 결과는 세 가지로 나뉩니다.
//!
//! | 결과 | 의미 |
//! |------|------|
//! | [`Verification::Valid`] | 서명 유효, `now < exp` |
//! | [`Verification::Expired`] | 서명 유효, `now >= exp` |
//! | [`Verification::Invalid`] | 형식 오류 또는 서명/알고리즘/발급자/종류 불일치 |
//!
//! 만료 판정은 주입된 [`Clock`]으로 여유 시간(leeway) 없이 수행합니다.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::core::{AppError, AppResult, Clock};
use crate::domain::models::token::{IssuedToken, TokenClaims, TokenClass, TokenPair};
use crate::services::auth::key_service::KeyStore;

/// 토큰 검증 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// 서명이 유효하고 만료되지 않음
    Valid(TokenClaims),
    /// 서명은 유효하지만 만료됨
    Expired(TokenClaims),
    /// `MalformedToken` 또는 `InvalidSignature`
    Invalid(AppError),
}

/// JWT 토큰 관리 서비스
///
/// 토큰 종류마다 별도의 키와 알고리즘을 사용하며, 검증 시 해당 종류의 알고리즘만 허용합니다.
pub struct TokenService {
    keys: Arc<KeyStore>,
    clock: Arc<dyn Clock>,
    issuer: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig, keys: Arc<KeyStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            clock,
            issuer: config.issuer.clone(),
            access_lifetime: config.access_lifetime,
            refresh_lifetime: config.refresh_lifetime,
        }
    }

    /// 설정된 액세스 토큰 수명
    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    /// 설정된 리프레시 토큰 수명
    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 토큰을 발급합니다.
    ///
    /// # Arguments
    ///
    /// * `subject` - 불투명한 사용자 식별자
    /// * `class` - 토큰 종류 (서명 키 선택)
    /// * `lifetime` - 유효 기간 (`exp = now + lifetime`)
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 빈 subject 또는 0 이하의 수명
    /// * `AppError::KeyUnavailable` - 해당 종류의 키를 로드할 수 없음
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let issued = token_service.issue("user-42", TokenClass::Access, Duration::minutes(15))?;
    /// println!("expires in {}s", issued.expires_in());
    /// ```
    pub fn issue(&self, subject: &str, class: TokenClass, lifetime: Duration) -> AppResult<IssuedToken> {
        if subject.trim().is_empty() {
            return Err(AppError::ValidationError("token subject must not be empty".to_string()));
        }
        if lifetime <= Duration::zero() {
            return Err(AppError::ValidationError(format!(
                "token lifetime must be positive (got {}s)",
                lifetime.num_seconds()
            )));
        }

        let keys = self.keys.keys(class)?;
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            AppError::ValidationError(format!(
                "token lifetime is out of range (got {} days)",
                lifetime.num_days()
            ))
        })?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            token_use: class,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        let mut header = Header::new(keys.algorithm);
        header.kid = keys.kid.clone();

        let token = encode(&header, &claims, &keys.encoding)
            .map_err(|e| AppError::KeyUnavailable(format!("{} token signing failed: {}", class, e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// 로그인용 토큰 쌍(액세스 + 리프레시)을 발급합니다.
    pub fn issue_pair(&self, subject: &str) -> AppResult<TokenPair> {
        let access = self.issue(subject, TokenClass::Access, self.access_lifetime)?;
        let refresh = self.issue(subject, TokenClass::Refresh, self.refresh_lifetime)?;

        Ok(TokenPair::new(&access, &refresh))
    }

    /// 토큰을 검증합니다.
    ///
    /// # Returns
    ///
    /// * `Ok(Verification)` - 세 가지 검증 결과 중 하나
    ///
    /// # Errors
    ///
    /// * `AppError::KeyUnavailable` - 해당 종류의 키를 로드할 수 없음 (운영 장애)
    pub fn verify(&self, token: &str, class: TokenClass) -> AppResult<Verification> {
        let keys = self.keys.keys(class)?;

        let mut validation = Validation::new(keys.algorithm);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let claims = match decode::<TokenClaims>(token, &keys.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => return classify_decode_error(class, e).map(Verification::Invalid),
        };

        if claims.token_use != class {
            return Ok(Verification::Invalid(AppError::InvalidSignature(format!(
                "expected {} token, got {} token",
                class, claims.token_use
            ))));
        }

        if claims.is_expired_at(self.clock.now()) {
            Ok(Verification::Expired(claims))
        } else {
            Ok(Verification::Valid(claims))
        }
    }

    /// `Authorization` 헤더 값에서 Bearer 토큰을 추출합니다.
    ///
    /// 스킴 이름은 대소문자를 구분하지 않습니다.
    ///
    /// # Errors
    ///
    /// * `AppError::MissingToken` - Bearer 스킴이 아니거나 토큰이 비어 있음
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let token = TokenService::extract_bearer_token("Bearer eyJhbGciOi...")?;
    /// ```
    pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
        let auth_header = auth_header.trim();
        let (scheme, token) = auth_header
            .split_once(' ')
            .ok_or(AppError::MissingToken)?;

        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AppError::MissingToken);
        }

        Ok(token)
    }
}

/// jsonwebtoken 에러를 검증 실패 사유로 분류합니다.
///
/// 키 자체의 문제는 `Err(KeyUnavailable)`로 전파합니다.
fn classify_decode_error(class: TokenClass, e: jsonwebtoken::errors::Error) -> AppResult<AppError> {
    let reason = match e.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => AppError::MalformedToken(e.to_string()),
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat | ErrorKind::InvalidEcdsaKey => {
            return Err(AppError::KeyUnavailable(format!("{} verification key: {}", class, e)));
        }
        _ => AppError::InvalidSignature(e.to_string()),
    };

    Ok(reason)
}
