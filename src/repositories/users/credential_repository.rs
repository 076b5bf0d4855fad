//! # 로그인 자격 증명 리포지토리
//!
//! 로그인 시 이메일/비밀번호를 확인하고 불투명한 사용자 식별자를 돌려주는 협력자입니다.
//! 인증 코어는 [`CredentialVerifier`] 트레이트만 알고 있으며, 사용자 저장소의 실제 구현은 외부에 있습니다.
//!
//! 기본 구현인 [`InMemoryCredentialRepository`]는 `AUTH_USERS` 환경 변수에서 bcrypt 해시 목록을 읽습니다.
//!
//! ```bash
//! # id:email:bcrypt-hash 항목을 세미콜론으로 구분
//! AUTH_USERS='user-1:alice@example.com:$2b$12$...;user-2:bob@example.com:$2b$12$...'
//! ```

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;

use crate::core::{AppError, AppResult};

/// 로그인 자격 증명 검증기
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// 이메일과 비밀번호를 확인하고 사용자 식별자를 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InvalidCredentials` - 존재하지 않는 이메일 또는 틀린 비밀번호 (구분하지 않음)
    /// * `AppError::InternalError` - 저장된 해시를 검증할 수 없음
    async fn verify(&self, email: &str, password: &str) -> AppResult<String>;
}

#[derive(Debug, Clone)]
struct StoredCredential {
    user_id: String,
    password_hash: String,
}

/// 메모리 기반 자격 증명 저장소
///
/// 이메일은 대소문자를 구분하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    users: HashMap<String, StoredCredential>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자를 추가합니다. 같은 이메일이 있으면 덮어씁니다.
    pub fn with_user(mut self, user_id: &str, email: &str, password_hash: &str) -> Self {
        self.users.insert(
            email.trim().to_lowercase(),
            StoredCredential {
                user_id: user_id.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        self
    }

    /// `id:email:hash;...` 형식의 목록을 해석합니다.
    ///
    /// bcrypt 해시에는 `:`가 없으므로 앞의 두 필드만 분리합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 필드가 부족하거나 비어 있는 항목
    pub fn from_user_list(user_list: &str) -> AppResult<Self> {
        let mut repo = Self::new();

        for entry in user_list.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let mut fields = entry.splitn(3, ':');
            let (Some(user_id), Some(email), Some(hash)) = (fields.next(), fields.next(), fields.next()) else {
                return Err(AppError::ValidationError(format!(
                    "AUTH_USERS entry must be id:email:hash (got {} fields)",
                    entry.split(':').count()
                )));
            };

            if user_id.is_empty() || email.is_empty() || hash.is_empty() {
                return Err(AppError::ValidationError(
                    "AUTH_USERS entry has an empty field".to_string(),
                ));
            }

            repo = repo.with_user(user_id, email, hash);
        }

        Ok(repo)
    }

    /// `AUTH_USERS` 환경 변수에서 로드합니다. 변수가 없으면 빈 저장소입니다.
    pub fn from_env() -> AppResult<Self> {
        match std::env::var("AUTH_USERS") {
            Ok(user_list) => {
                let repo = Self::from_user_list(&user_list)?;
                log::info!("👤 로그인 사용자 {}명 로드", repo.len());
                Ok(repo)
            }
            Err(_) => {
                log::warn!("AUTH_USERS가 설정되지 않아 로그인 가능한 사용자가 없습니다");
                Ok(Self::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryCredentialRepository {
    async fn verify(&self, email: &str, password: &str) -> AppResult<String> {
        let stored = self
            .users
            .get(&email.trim().to_lowercase())
            .ok_or(AppError::InvalidCredentials)?;

        let verify_start = Instant::now();
        let is_valid = bcrypt::verify(password, &stored.password_hash)
            .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))?;

        log::debug!("Password verification took: {:?}", verify_start.elapsed());

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(stored.user_id.clone())
    }
}
