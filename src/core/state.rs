//! 애플리케이션 상태
//!
//! 시작 시 한 번 조립되어 `web::Data<AppState>`로 모든 워커에 공유됩니다.
//! 전역 싱글톤 없이 키 저장소, 폐기 저장소, 자격 증명 검증기를 명시적으로 주입합니다.

use std::sync::Arc;

use crate::config::AuthSettings;
use crate::core::{AppResult, Clock};
use crate::middlewares::pipeline::AuthPipeline;
use crate::repositories::tokens::{connect_backend, RevocationBackend, RevocationStore};
use crate::repositories::users::CredentialVerifier;
use crate::services::auth::{KeyStore, RefreshService, TokenService};

/// 요청 처리에 필요한 공유 컴포넌트
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<KeyStore>,
    pub tokens: Arc<TokenService>,
    pub refresh: Arc<RefreshService>,
    pub revocations: Arc<RevocationStore>,
    pub pipeline: Arc<AuthPipeline>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// 이미 연결된 백엔드로 상태를 조립합니다.
    pub fn new(
        settings: &AuthSettings,
        backend: Arc<dyn RevocationBackend>,
        credentials: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let keys = Arc::new(KeyStore::from_config(&settings.jwt));
        let tokens = Arc::new(TokenService::new(&settings.jwt, keys.clone(), clock.clone()));
        let refresh = Arc::new(RefreshService::new(tokens.clone()));
        let revocations = Arc::new(RevocationStore::new(
            backend,
            clock,
            settings.revocation.timeout,
        ));
        let pipeline = Arc::new(AuthPipeline::new(
            tokens.clone(),
            refresh.clone(),
            revocations.clone(),
            settings.revocation.failure_policy,
        ));

        Self {
            keys,
            tokens,
            refresh,
            revocations,
            pipeline,
            credentials,
        }
    }

    /// 설정에 따라 폐기 저장소에 연결하고 키를 미리 로드합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::RevocationStoreUnavailable` - 폐기 저장소 연결 실패
    /// * `AppError::KeyUnavailable` - 키를 로드할 수 없음
    pub async fn from_settings(
        settings: &AuthSettings,
        credentials: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let backend = connect_backend(&settings.revocation, clock.clone()).await?;
        let state = Self::new(settings, backend, credentials, clock);
        state.keys.preload()?;

        log::info!(
            "✅ 인증 상태 초기화 완료 (access: {}, refresh: {}, revocation: {})",
            settings.jwt.access_key.algorithm_name(),
            settings.jwt.refresh_key.algorithm_name(),
            state.revocations.backend_kind()
        );
        Ok(state)
    }

    /// 종료 시 외부 연결을 닫습니다.
    pub async fn shutdown(&self) {
        self.revocations.close().await;
    }
}
