//! # Authentication Configuration Module
//!
//! 토큰 서명 키, 토큰 수명, 폐기 저장소 정책 등 인증 관련 설정을 관리하는 모듈입니다.
//! 모든 값은 환경 변수에서 읽어 [`AuthSettings`] 하나로 조립되며, 조립 시점에 검증됩니다.
//!
//! ## 필수 환경 변수 설정
//!
//! ### 토큰 설정
//! ```bash
//! export JWT_ISSUER="token-auth-service"
//! export ACCESS_TOKEN_TTL_MINUTES="15"
//! export REFRESH_TOKEN_TTL_DAYS="7"
//! ```
//!
//! ### 키 재료 (토큰 종류별로 하나 선택)
//! ```bash
//! # HS256 - 종류별로 서로 다른 비밀키
//! export ACCESS_TOKEN_SECRET="..."
//! export REFRESH_TOKEN_SECRET="..."
//!
//! # RS256 - base64로 인코딩한 PEM
//! export ACCESS_TOKEN_PRIVATE_KEY="LS0tLS1CRUdJTi..."
//! export ACCESS_TOKEN_PUBLIC_KEY="LS0tLS1CRUdJTi..."
//!
//! # RS256 - PEM 파일 디렉토리 (없으면 생성)
//! export REFRESH_TOKEN_KEY_DIR="./secrets"
//! export JWT_GENERATE_MISSING_KEYS="true"
//! ```
//!
//! ### 폐기 저장소
//! ```bash
//! export REVOCATION_BACKEND="redis"          # redis | memory
//! export REDIS_URL="redis://localhost:6379"
//! export REVOCATION_FAILURE_POLICY="open"   # open | closed
//! export REVOCATION_TIMEOUT_MS="250"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::AuthSettings;
//!
//! let settings = AuthSettings::from_env()?;
//! println!("issuer = {}", settings.jwt.issuer);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};

use crate::core::{AppError, AppResult};
use crate::domain::models::token::TokenClass;

/// 기본 발급자
pub const DEFAULT_ISSUER: &str = "token-auth-service";
/// 기본 액세스 토큰 수명 (분)
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
/// 기본 리프레시 토큰 수명 (일)
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;
/// 기본 폐기 저장소 호출 타임아웃 (밀리초)
pub const DEFAULT_REVOCATION_TIMEOUT_MS: u64 = 250;

/// 토큰 종류별 키 재료 출처
///
/// 비밀키와 PEM 본문은 `Debug` 출력에 노출되지 않습니다.
#[derive(Clone, PartialEq)]
pub enum KeySource {
    /// HS256 공유 비밀키
    Secret(String),
    /// RS256 PEM 본문 (개인키: PKCS#1 또는 PKCS#8, 공개키: SPKI)
    RsaPem {
        private_pem: String,
        public_pem: String,
    },
    /// RS256 PEM 파일 디렉토리
    ///
    /// `{class}_private_key.pem`, `{class}_public_key.pem`을 읽으며
    /// `generate_missing`이 참이면 없는 키 쌍을 생성합니다.
    KeyDir { dir: PathBuf, generate_missing: bool },
}

impl KeySource {
    /// 서명 알고리즘 이름
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            KeySource::Secret(_) => "HS256",
            KeySource::RsaPem { .. } | KeySource::KeyDir { .. } => "RS256",
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Secret(_) => f.write_str("Secret(***)"),
            KeySource::RsaPem { .. } => f.write_str("RsaPem(***)"),
            KeySource::KeyDir {
                dir,
                generate_missing,
            } => f
                .debug_struct("KeyDir")
                .field("dir", dir)
                .field("generate_missing", generate_missing)
                .finish(),
        }
    }
}

/// JWT 토큰 설정
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 발급자 (`iss`)
    pub issuer: String,
    /// 액세스 토큰 수명
    pub access_lifetime: Duration,
    /// 리프레시 토큰 수명
    pub refresh_lifetime: Duration,
    /// 액세스 토큰 키 재료
    pub access_key: KeySource,
    /// 리프레시 토큰 키 재료
    pub refresh_key: KeySource,
}

impl JwtConfig {
    /// 토큰 종류별 수명
    pub fn lifetime(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_lifetime,
            TokenClass::Refresh => self.refresh_lifetime,
        }
    }

    /// 토큰 종류별 키 재료
    pub fn key_source(&self, class: TokenClass) -> &KeySource {
        match class {
            TokenClass::Access => &self.access_key,
            TokenClass::Refresh => &self.refresh_key,
        }
    }

    /// 설정 불변식을 검증합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 수명이 0 이하이거나, 액세스 수명이 리프레시 수명보다
    ///   짧지 않거나, 두 종류가 같은 비밀키를 사용하는 경우
    pub fn validate(&self) -> AppResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(AppError::ValidationError(
                "JWT_ISSUER must not be empty".to_string(),
            ));
        }

        if self.access_lifetime <= Duration::zero() || self.refresh_lifetime <= Duration::zero() {
            return Err(AppError::ValidationError(
                "token lifetimes must be positive".to_string(),
            ));
        }

        if self.access_lifetime >= self.refresh_lifetime {
            return Err(AppError::ValidationError(format!(
                "access token lifetime ({}s) must be shorter than refresh token lifetime ({}s)",
                self.access_lifetime.num_seconds(),
                self.refresh_lifetime.num_seconds()
            )));
        }

        if Utc::now().checked_add_signed(self.refresh_lifetime).is_none() {
            return Err(AppError::ValidationError(format!(
                "refresh token lifetime ({} days) is out of range",
                self.refresh_lifetime.num_days()
            )));
        }

        for class in [TokenClass::Access, TokenClass::Refresh] {
            if let KeySource::Secret(secret) = self.key_source(class) {
                if secret.is_empty() {
                    return Err(AppError::ValidationError(format!(
                        "{}_SECRET must not be empty",
                        class.env_prefix()
                    )));
                }
            }
        }

        if let (KeySource::Secret(access), KeySource::Secret(refresh)) =
            (&self.access_key, &self.refresh_key)
        {
            if access == refresh {
                return Err(AppError::ValidationError(
                    "access and refresh tokens must use distinct secrets".to_string(),
                ));
            }
        }

        // 키 디렉토리는 종류별 파일을 따로 두므로 같은 디렉토리를 공유해도 됨
        if let (KeySource::RsaPem { .. }, KeySource::RsaPem { .. }) = (&self.access_key, &self.refresh_key) {
            if self.access_key == self.refresh_key {
                return Err(AppError::ValidationError(
                    "access and refresh tokens must use distinct key material".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// 폐기 저장소 백엔드 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationBackendKind {
    /// Redis (`SET key value EX ttl`, `EXISTS key`)
    Redis,
    /// 프로세스 내 TTL 맵 (개발/테스트용)
    Memory,
}

impl RevocationBackendKind {
    pub fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(RevocationBackendKind::Redis),
            "memory" | "in-memory" | "in_memory" => Ok(RevocationBackendKind::Memory),
            other => Err(AppError::ValidationError(format!(
                "unknown REVOCATION_BACKEND: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationBackendKind::Redis => "redis",
            RevocationBackendKind::Memory => "memory",
        }
    }
}

/// 폐기 저장소 장애 시 처리 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 경고를 남기고 폐기되지 않은 것으로 간주
    FailOpen,
    /// `RevocationStoreUnavailable`로 요청을 거부
    FailClosed,
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "fail-open" | "fail_open" => Ok(FailurePolicy::FailOpen),
            "closed" | "fail-closed" | "fail_closed" => Ok(FailurePolicy::FailClosed),
            other => Err(AppError::ValidationError(format!(
                "unknown REVOCATION_FAILURE_POLICY: {}",
                other
            ))),
        }
    }
}

/// 폐기 저장소 설정
#[derive(Debug, Clone)]
pub struct RevocationConfig {
    pub backend: RevocationBackendKind,
    pub redis_url: String,
    /// 요청 검증 경로에 적용되는 장애 정책 (로그아웃은 항상 fail-closed)
    pub failure_policy: FailurePolicy,
    /// 백엔드 호출 1회당 제한 시간
    pub timeout: StdDuration,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackendKind::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            failure_policy: FailurePolicy::FailOpen,
            timeout: StdDuration::from_millis(DEFAULT_REVOCATION_TIMEOUT_MS),
        }
    }
}

/// 검증이 끝난 인증 설정 전체
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt: JwtConfig,
    pub revocation: RevocationConfig,
}

impl AuthSettings {
    /// 프로세스 환경 변수에서 설정을 읽습니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 값 파싱 실패 또는 불변식 위반
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정을 읽습니다.
    ///
    /// ```rust,ignore
    /// let vars: HashMap<&str, &str> = HashMap::from([
    ///     ("ACCESS_TOKEN_SECRET", "a"),
    ///     ("REFRESH_TOKEN_SECRET", "b"),
    /// ]);
    /// let settings = AuthSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()))?;
    /// ```
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_minutes = parse_number(&get, "ACCESS_TOKEN_TTL_MINUTES", DEFAULT_ACCESS_TTL_MINUTES)?;
        let refresh_days = parse_number(&get, "REFRESH_TOKEN_TTL_DAYS", DEFAULT_REFRESH_TTL_DAYS)?;

        let access_lifetime = Duration::try_minutes(access_minutes).ok_or_else(|| {
            AppError::ValidationError("ACCESS_TOKEN_TTL_MINUTES is out of range".to_string())
        })?;
        let refresh_lifetime = Duration::try_days(refresh_days).ok_or_else(|| {
            AppError::ValidationError("REFRESH_TOKEN_TTL_DAYS is out of range".to_string())
        })?;

        let jwt = JwtConfig {
            issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            access_lifetime,
            refresh_lifetime,
            access_key: read_key_source(&get, TokenClass::Access)?,
            refresh_key: read_key_source(&get, TokenClass::Refresh)?,
        };
        jwt.validate()?;

        let timeout_ms: u64 = parse_number(&get, "REVOCATION_TIMEOUT_MS", DEFAULT_REVOCATION_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(AppError::ValidationError(
                "REVOCATION_TIMEOUT_MS must be positive".to_string(),
            ));
        }

        let defaults = RevocationConfig::default();
        let revocation = RevocationConfig {
            backend: match get("REVOCATION_BACKEND") {
                Some(value) => RevocationBackendKind::from_str(&value)?,
                None => defaults.backend,
            },
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            failure_policy: match get("REVOCATION_FAILURE_POLICY") {
                Some(value) => FailurePolicy::from_str(&value)?,
                None => defaults.failure_policy,
            },
            timeout: StdDuration::from_millis(timeout_ms),
        };

        Ok(Self { jwt, revocation })
    }
}

fn parse_number<G, T>(get: &G, key: &str, default: T) -> AppResult<T>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::ValidationError(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}

/// 토큰 종류의 키 재료 출처를 결정합니다.
///
/// 우선순위: `{P}_PRIVATE_KEY` → `{P}_KEY_DIR` → `{P}_SECRET`
fn read_key_source<G>(get: &G, class: TokenClass) -> AppResult<KeySource>
where
    G: Fn(&str) -> Option<String>,
{
    let prefix = class.env_prefix();
    let private_var = format!("{}_PRIVATE_KEY", prefix);
    let public_var = format!("{}_PUBLIC_KEY", prefix);

    if let Some(private_b64) = get(&private_var) {
        let public_b64 = get(&public_var).ok_or_else(|| {
            AppError::ValidationError(format!("{} is set but {} is missing", private_var, public_var))
        })?;

        return Ok(KeySource::RsaPem {
            private_pem: decode_pem(&private_var, &private_b64)?,
            public_pem: decode_pem(&public_var, &public_b64)?,
        });
    }

    if let Some(dir) = get(&format!("{}_KEY_DIR", prefix)) {
        let generate_missing = get("JWT_GENERATE_MISSING_KEYS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        return Ok(KeySource::KeyDir {
            dir: PathBuf::from(dir),
            generate_missing,
        });
    }

    if let Some(secret) = get(&format!("{}_SECRET", prefix)) {
        return Ok(KeySource::Secret(secret));
    }

    Err(AppError::ValidationError(format!(
        "no key material configured for {} tokens (set {}_SECRET, {}_PRIVATE_KEY or {}_KEY_DIR)",
        class, prefix, prefix, prefix
    )))
}

/// base64로 인코딩된 PEM을 디코딩합니다.
fn decode_pem(var: &str, encoded: &str) -> AppResult<String> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::ValidationError(format!("{} is not valid base64: {}", var, e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::ValidationError(format!("{} is not valid UTF-8 PEM: {}", var, e)))
}
