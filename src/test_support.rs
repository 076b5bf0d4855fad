//! 테스트 공용 픽스처

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration};

use crate::config::{AuthSettings, FailurePolicy, JwtConfig, KeySource, RevocationConfig, RevocationBackendKind};
use crate::core::{AppError, AppResult, AppState, FixedClock};
use crate::domain::models::token::{TokenClaims, TokenClass};
use crate::repositories::tokens::{InMemoryRevocationBackend, RevocationBackend};
use crate::repositories::users::InMemoryCredentialRepository;
use crate::services::auth::{KeyStore, TokenService};

pub const ACCESS_PRIVATE_PEM: &str = include_str!("../testdata/access_private_key.pem");
pub const ACCESS_PUBLIC_PEM: &str = include_str!("../testdata/access_public_key.pem");
pub const REFRESH_PRIVATE_PEM: &str = include_str!("../testdata/refresh_private_key.pem");
pub const REFRESH_PUBLIC_PEM: &str = include_str!("../testdata/refresh_public_key.pem");

pub const TEST_USER_ID: &str = "user-1";
pub const TEST_EMAIL: &str = "alice@example.com";
pub const TEST_PASSWORD: &str = "correct horse";

/// 2024-01-01T00:00:00Z
pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(DateTime::from_timestamp(1_704_067_200, 0).unwrap()))
}

pub fn claims_for(sub: &str, iat: i64, exp: i64) -> TokenClaims {
    TokenClaims {
        sub: sub.to_string(),
        iat,
        exp,
        token_use: TokenClass::Access,
        jti: uuid::Uuid::new_v4().to_string(),
        iss: "token-auth-service".to_string(),
    }
}

pub fn rsa_source(class: TokenClass) -> KeySource {
    let (private_pem, public_pem) = match class {
        TokenClass::Access => (ACCESS_PRIVATE_PEM, ACCESS_PUBLIC_PEM),
        TokenClass::Refresh => (REFRESH_PRIVATE_PEM, REFRESH_PUBLIC_PEM),
    };

    KeySource::RsaPem {
        private_pem: private_pem.to_string(),
        public_pem: public_pem.to_string(),
    }
}

/// 15분 / 7일, HS256
pub fn hs256_config() -> JwtConfig {
    JwtConfig {
        issuer: "token-auth-service".to_string(),
        access_lifetime: Duration::minutes(15),
        refresh_lifetime: Duration::days(7),
        access_key: KeySource::Secret("access-test-secret".to_string()),
        refresh_key: KeySource::Secret("refresh-test-secret".to_string()),
    }
}

/// 15분 / 7일, RS256
pub fn rsa_config() -> JwtConfig {
    JwtConfig {
        access_key: rsa_source(TokenClass::Access),
        refresh_key: rsa_source(TokenClass::Refresh),
        ..hs256_config()
    }
}

pub fn token_service_with(config: &JwtConfig, clock: Arc<FixedClock>) -> TokenService {
    TokenService::new(config, Arc::new(KeyStore::from_config(config)), clock)
}

pub fn settings_with(jwt: JwtConfig, failure_policy: FailurePolicy) -> AuthSettings {
    AuthSettings {
        jwt,
        revocation: RevocationConfig {
            backend: RevocationBackendKind::Memory,
            failure_policy,
            ..RevocationConfig::default()
        },
    }
}

pub fn test_credentials() -> InMemoryCredentialRepository {
    let hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    InMemoryCredentialRepository::new().with_user(TEST_USER_ID, TEST_EMAIL, &hash)
}

/// 메모리 폐기 저장소와 고정 시계를 쓰는 상태
pub fn state_with(jwt: JwtConfig) -> (Arc<FixedClock>, AppState) {
    let clock = fixed_clock();
    let settings = settings_with(jwt, FailurePolicy::FailOpen);
    let backend = Arc::new(InMemoryRevocationBackend::new(clock.clone()));
    let state = AppState::new(&settings, backend, Arc::new(test_credentials()), clock.clone());
    (clock, state)
}

pub fn test_state() -> (Arc<FixedClock>, AppState) {
    state_with(hs256_config())
}

/// 폐기 저장소가 항상 실패하는 상태
pub fn unavailable_state(policy: FailurePolicy) -> AppState {
    let settings = settings_with(hs256_config(), policy);
    AppState::new(
        &settings,
        Arc::new(UnavailableBackend),
        Arc::new(test_credentials()),
        fixed_clock(),
    )
}

/// 모든 호출이 실패하는 폐기 백엔드
pub struct UnavailableBackend;

#[async_trait]
impl RevocationBackend for UnavailableBackend {
    async fn insert(&self, _key: &str, _ttl_secs: u64) -> AppResult<()> {
        Err(AppError::RevocationStoreUnavailable("connection refused".to_string()))
    }

    async fn contains(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::RevocationStoreUnavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> AppResult<()> {
        Err(AppError::RevocationStoreUnavailable("connection refused".to_string()))
    }

    fn kind(&self) -> &'static str {
        "unavailable"
    }
}
