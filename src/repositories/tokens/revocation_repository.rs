//! 토큰 폐기 목록 저장소
//!
//! 로그아웃된 토큰을 남은 수명 동안만 기록하는 append-only 저장소입니다.
//! 키는 원본 토큰의 SHA-256 해시로 만들며 원본 토큰은 저장하지 않습니다.
//!
//! ```text
//! revoked_token:<sha256-hex>  =  "revoked"   (TTL = exp - now)
//! ```
//!
//! 모든 백엔드 호출은 설정된 타임아웃 안에 끝나야 하며, 타임아웃은 저장소 장애로 취급합니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::caching::redis::RedisClient;
use crate::config::{FailurePolicy, RevocationBackendKind, RevocationConfig};
use crate::core::{AppError, AppResult, Clock};
use crate::domain::models::token::TokenClaims;

/// 폐기 레코드 키 접두사
pub const REVOKED_KEY_PREFIX: &str = "revoked_token:";
/// 폐기 레코드 값
pub const REVOKED_VALUE: &str = "revoked";

/// TTL을 지원하는 키-값 저장소 포트
#[async_trait]
pub trait RevocationBackend: Send + Sync {
    /// `key`를 `ttl_secs`초 동안 기록합니다. 이미 있으면 TTL을 갱신합니다.
    async fn insert(&self, key: &str, ttl_secs: u64) -> AppResult<()>;

    /// `key`가 현재 기록되어 있는지 확인합니다.
    async fn contains(&self, key: &str) -> AppResult<bool>;

    /// 백엔드 가용성 확인
    async fn ping(&self) -> AppResult<()>;

    /// 연결 자원을 해제합니다.
    async fn close(&self) {}

    /// 백엔드 이름 (`redis`, `memory`)
    fn kind(&self) -> &'static str;
}

/// Redis 기반 폐기 백엔드
pub struct RedisRevocationBackend {
    client: RedisClient,
}

impl RedisRevocationBackend {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Redis에 연결하고 PING으로 확인합니다.
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = RedisClient::connect(redis_url)
            .await
            .map_err(store_error)?;
        Ok(Self::new(client))
    }
}

fn store_error(e: redis::RedisError) -> AppError {
    AppError::RevocationStoreUnavailable(e.to_string())
}

#[async_trait]
impl RevocationBackend for RedisRevocationBackend {
    async fn insert(&self, key: &str, ttl_secs: u64) -> AppResult<()> {
        self.client
            .set_ex(key, REVOKED_VALUE, ttl_secs)
            .await
            .map_err(store_error)
    }

    async fn contains(&self, key: &str) -> AppResult<bool> {
        self.client.exists(key).await.map_err(store_error)
    }

    async fn ping(&self) -> AppResult<()> {
        self.client.ping().await.map_err(store_error)
    }

    async fn close(&self) {
        self.client.close();
    }

    fn kind(&self) -> &'static str {
        RevocationBackendKind::Redis.as_str()
    }
}

/// 프로세스 내 폐기 백엔드
///
/// 주입된 시계로 만료를 판정하므로 테스트에서 시간을 이동시켜 TTL을 검증할 수 있습니다.
pub struct InMemoryRevocationBackend {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRevocationBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 만료되지 않은 레코드 수
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.values().filter(|expires_at| **expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationBackend for InMemoryRevocationBackend {
    async fn insert(&self, key: &str, ttl_secs: u64) -> AppResult<()> {
        let now = self.clock.now();
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1_000);
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());

        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(key.to_string(), now + Duration::seconds(ttl));
        Ok(())
    }

    async fn contains(&self, key: &str) -> AppResult<bool> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(key).is_some_and(|expires_at| *expires_at > now))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        RevocationBackendKind::Memory.as_str()
    }
}

/// 설정에 따라 백엔드를 생성하고 연결을 확인합니다.
///
/// # Errors
///
/// * `AppError::RevocationStoreUnavailable` - Redis 연결 또는 PING 실패
pub async fn connect_backend(
    config: &RevocationConfig,
    clock: Arc<dyn Clock>,
) -> AppResult<Arc<dyn RevocationBackend>> {
    match config.backend {
        RevocationBackendKind::Redis => {
            let backend = RedisRevocationBackend::connect(&config.redis_url).await?;
            Ok(Arc::new(backend))
        }
        RevocationBackendKind::Memory => {
            log::warn!("프로세스 내 폐기 저장소 사용 중: 재시작 시 폐기 기록이 사라집니다");
            Ok(Arc::new(InMemoryRevocationBackend::new(clock)))
        }
    }
}

/// 폐기 저장소
///
/// 백엔드 호출에 타임아웃을 적용하고, 검증 경로에서는 [`FailurePolicy`]를 적용합니다.
/// 쓰기 경로(`revoke`)의 에러는 절대 삼키지 않습니다.
pub struct RevocationStore {
    backend: Arc<dyn RevocationBackend>,
    clock: Arc<dyn Clock>,
    timeout: StdDuration,
}

impl RevocationStore {
    pub fn new(backend: Arc<dyn RevocationBackend>, clock: Arc<dyn Clock>, timeout: StdDuration) -> Self {
        Self {
            backend,
            clock,
            timeout,
        }
    }

    /// 원본 토큰의 저장 키 (`revoked_token:<sha256-hex>`)
    pub fn key_for(token: &str) -> String {
        format!("{}{}", REVOKED_KEY_PREFIX, token_fingerprint(token))
    }

    /// 토큰을 `remaining_lifetime` 동안 폐기 상태로 기록합니다.
    ///
    /// 남은 수명은 초 단위로 올림하며 최소 1초입니다. 같은 토큰을 다시 폐기해도 안전합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::RevocationStoreUnavailable` - 백엔드 오류 또는 타임아웃
    pub async fn revoke(&self, token: &str, remaining_lifetime: Duration) -> AppResult<()> {
        let ttl_secs = ttl_seconds(remaining_lifetime);
        let key = Self::key_for(token);

        self.bounded(self.backend.insert(&key, ttl_secs)).await?;

        log::info!(
            "토큰 폐기 기록: {}… (TTL {}초)",
            short_fingerprint(token),
            ttl_secs
        );
        Ok(())
    }

    /// 토큰 자신의 `exp`까지 폐기 상태로 기록합니다.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 기록함
    /// * `Ok(false)` - 이미 만료되어 기록할 필요 없음
    pub async fn revoke_until_expiry(&self, token: &str, claims: &TokenClaims) -> AppResult<bool> {
        let remaining = claims.remaining_seconds(self.clock.now());
        if remaining <= 0 {
            log::debug!("이미 만료된 토큰은 폐기 목록에 기록하지 않습니다: {}…", short_fingerprint(token));
            return Ok(false);
        }

        self.revoke(token, Duration::seconds(remaining)).await?;
        Ok(true)
    }

    /// 현재 시점의 폐기 여부
    ///
    /// # Errors
    ///
    /// * `AppError::RevocationStoreUnavailable` - 백엔드 오류 또는 타임아웃
    pub async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let key = Self::key_for(token);
        self.bounded(self.backend.contains(&key)).await
    }

    /// 장애 정책을 적용한 폐기 여부 확인
    ///
    /// `FailOpen`이면 장애를 경고로 기록하고 폐기되지 않은 것으로 간주합니다.
    pub async fn check(&self, token: &str, policy: FailurePolicy) -> AppResult<bool> {
        match self.is_revoked(token).await {
            Ok(revoked) => Ok(revoked),
            Err(e) => match policy {
                FailurePolicy::FailOpen => {
                    log::warn!("폐기 저장소 조회 실패, fail-open 정책으로 통과: {}", e);
                    Ok(false)
                }
                FailurePolicy::FailClosed => {
                    log::error!("폐기 저장소 조회 실패, fail-closed 정책으로 거부: {}", e);
                    Err(e)
                }
            },
        }
    }

    /// 백엔드 가용성 확인
    pub async fn ping(&self) -> AppResult<()> {
        self.bounded(self.backend.ping()).await
    }

    /// 백엔드 연결을 닫습니다.
    pub async fn close(&self) {
        self.backend.close().await;
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    async fn bounded<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match actix_web::rt::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::RevocationStoreUnavailable(format!(
                "{} backend timed out after {}ms",
                self.backend.kind(),
                self.timeout.as_millis()
            ))),
        }
    }
}

/// 원본 토큰의 SHA-256 hex
pub fn token_fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// 로그용 짧은 지문
pub fn short_fingerprint(token: &str) -> String {
    token_fingerprint(token)[..12].to_string()
}

fn ttl_seconds(remaining: Duration) -> u64 {
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    let secs = (millis + 999) / 1_000;
    u64::try_from(secs).unwrap_or(1).max(1)
}
