//! 요청 인증 파이프라인
//!
//! 요청 하나에 대해 정해진 순서의 단계를 실행하고 세 가지 결정 중 하나를 내립니다.
//!
//! ```text
//! ExtractBearer ──▶ CheckRevocation ──▶ VerifyAccess ──▶ RefreshExpired
//!      │                  │                  │                  │
//!      ▼                  ▼                  ▼                  ▼
//!  Unauthenticated     Rejected     Authenticated /      Authenticated(rotated) /
//!  (missing_token)  (token_revoked)  Unauthenticated     Rejected / Unauthenticated
//!                                    (만료면 다음 단계)     (token_expired)
//! ```
//!
//! 각 단계는 `Continue` 또는 `Halt(decision)`을 반환합니다. 파이프라인은 HTTP와 무관하며,
//! 라우트 정책(`AuthMode`)의 적용은 [`AuthMiddleware`](crate::middlewares::AuthMiddleware)가 담당합니다.

use std::fmt;
use std::sync::Arc;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::config::FailurePolicy;
use crate::core::AppError;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::token::{IssuedToken, TokenClaims, TokenClass};
use crate::repositories::tokens::{short_fingerprint, RevocationStore};
use crate::services::auth::{RefreshService, TokenService, Verification};

/// 리프레시 토큰 요청 헤더
pub const REFRESH_HEADER: &str = "X-Refresh";
/// 재발급된 액세스 토큰 응답 헤더
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractBearer,
    CheckRevocation,
    VerifyAccess,
    RefreshExpired,
}

impl Stage {
    /// 실행 순서
    pub const ORDER: [Stage; 4] = [
        Stage::ExtractBearer,
        Stage::CheckRevocation,
        Stage::VerifyAccess,
        Stage::RefreshExpired,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ExtractBearer => "extract_bearer",
            Stage::CheckRevocation => "check_revocation",
            Stage::VerifyAccess => "verify_access",
            Stage::RefreshExpired => "refresh_expired",
        };
        f.write_str(name)
    }
}

/// 요청의 인증 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// 신원 확인됨. 만료된 토큰을 재발급했다면 `rotated`에 새 토큰이 있음
    Authenticated {
        identity: AuthenticatedUser,
        rotated: Option<IssuedToken>,
    },
    /// 신원 없음. `Optional` 라우트는 익명으로 진행
    Unauthenticated(AppError),
    /// 라우트 정책과 무관하게 즉시 거부
    Rejected(AppError),
}

impl Decision {
    pub fn identity(&self) -> Option<&AuthenticatedUser> {
        match self {
            Decision::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

/// 단계 실행 결과
#[derive(Debug)]
pub enum StageOutcome {
    Continue,
    Halt(Decision),
}

/// 요청이 제시한 자격 증명
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `Authorization` 헤더 값
    pub authorization: Option<String>,
    /// `X-Refresh` 헤더 값
    pub refresh: Option<String>,
}

impl Credentials {
    /// 요청 헤더에서 자격 증명을 읽습니다. 비어 있거나 ASCII가 아닌 값은 없는 것으로 취급합니다.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            authorization: read(AUTHORIZATION.as_str()),
            refresh: read(REFRESH_HEADER),
        }
    }

    pub fn bearer(token: &str) -> Self {
        Self {
            authorization: Some(format!("Bearer {}", token)),
            refresh: None,
        }
    }

    pub fn with_refresh(mut self, refresh_token: &str) -> Self {
        self.refresh = Some(refresh_token.to_string());
        self
    }
}

/// 단계 사이에 전달되는 요청별 상태
#[derive(Default)]
struct PipelineContext {
    access_token: Option<String>,
    expired: Option<TokenClaims>,
}

/// 인증 파이프라인
pub struct AuthPipeline {
    tokens: Arc<TokenService>,
    refresh: Arc<RefreshService>,
    revocations: Arc<RevocationStore>,
    failure_policy: FailurePolicy,
}

impl AuthPipeline {
    pub fn new(
        tokens: Arc<TokenService>,
        refresh: Arc<RefreshService>,
        revocations: Arc<RevocationStore>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            tokens,
            refresh,
            revocations,
            failure_policy,
        }
    }

    /// 모든 단계를 순서대로 실행해 결정을 내립니다.
    pub async fn run(&self, credentials: &Credentials) -> Decision {
        let mut ctx = PipelineContext::default();

        for stage in Stage::ORDER {
            if let StageOutcome::Halt(decision) = self.run_stage(stage, credentials, &mut ctx).await {
                log::debug!("인증 파이프라인 종료: stage={}, decision={}", stage, describe(&decision));
                return decision;
            }
        }

        Decision::Rejected(AppError::InternalError(
            "authentication pipeline finished without a decision".to_string(),
        ))
    }

    async fn run_stage(&self, stage: Stage, credentials: &Credentials, ctx: &mut PipelineContext) -> StageOutcome {
        match stage {
            Stage::ExtractBearer => Self::extract_bearer(credentials, ctx),
            Stage::CheckRevocation => self.check_revocation(ctx).await,
            Stage::VerifyAccess => self.verify_access(ctx),
            Stage::RefreshExpired => self.refresh_expired(credentials, ctx),
        }
    }

    fn extract_bearer(credentials: &Credentials, ctx: &mut PipelineContext) -> StageOutcome {
        let Some(header) = credentials.authorization.as_deref() else {
            return StageOutcome::Halt(Decision::Unauthenticated(AppError::MissingToken));
        };

        match TokenService::extract_bearer_token(header) {
            Ok(token) => {
                ctx.access_token = Some(token.to_string());
                StageOutcome::Continue
            }
            Err(e) => StageOutcome::Halt(Decision::Unauthenticated(e)),
        }
    }

    async fn check_revocation(&self, ctx: &PipelineContext) -> StageOutcome {
        let Some(token) = ctx.access_token.as_deref() else {
            return StageOutcome::Halt(Decision::Unauthenticated(AppError::MissingToken));
        };

        match self.revocations.check(token, self.failure_policy).await {
            Ok(false) => StageOutcome::Continue,
            Ok(true) => {
                log::warn!("폐기된 토큰 사용 시도: {}…", short_fingerprint(token));
                StageOutcome::Halt(Decision::Rejected(AppError::TokenRevoked))
            }
            Err(e) => StageOutcome::Halt(Decision::Rejected(e)),
        }
    }

    fn verify_access(&self, ctx: &mut PipelineContext) -> StageOutcome {
        let Some(token) = ctx.access_token.as_deref() else {
            return StageOutcome::Halt(Decision::Unauthenticated(AppError::MissingToken));
        };

        match self.tokens.verify(token, TokenClass::Access) {
            Ok(Verification::Valid(claims)) => StageOutcome::Halt(Decision::Authenticated {
                identity: AuthenticatedUser::from(&claims),
                rotated: None,
            }),
            Ok(Verification::Expired(claims)) => {
                ctx.expired = Some(claims);
                StageOutcome::Continue
            }
            Ok(Verification::Invalid(reason)) => {
                log::warn!("유효하지 않은 액세스 토큰 ({}): {}…", reason.code(), short_fingerprint(token));
                StageOutcome::Halt(Decision::Unauthenticated(reason))
            }
            Err(e) => StageOutcome::Halt(Decision::Rejected(e)),
        }
    }

    fn refresh_expired(&self, credentials: &Credentials, ctx: &PipelineContext) -> StageOutcome {
        if ctx.expired.is_none() {
            return StageOutcome::Continue;
        }

        let Some(refresh_token) = credentials.refresh.as_deref() else {
            return StageOutcome::Halt(Decision::Unauthenticated(AppError::TokenExpired));
        };

        match self.refresh.reissue(refresh_token) {
            Ok(issued) => StageOutcome::Halt(Decision::Authenticated {
                identity: AuthenticatedUser::from(&issued.claims),
                rotated: Some(issued),
            }),
            Err(e) => StageOutcome::Halt(Decision::Rejected(e)),
        }
    }
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Authenticated { identity, rotated } => format!(
            "authenticated(sub={}, rotated={})",
            identity.user_id,
            rotated.is_some()
        ),
        Decision::Unauthenticated(reason) => format!("unauthenticated({})", reason.code()),
        Decision::Rejected(reason) => format!("rejected({})", reason.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};
    use chrono::Duration;
    use crate::test_support::{fixed_clock, hs256_config, test_state, unavailable_state};

    #[actix_web::test]
    async fn test_missing_header_is_unauthenticated() {
        let (_, state) = test_state();

        let decision = state.pipeline.run(&Credentials::default()).await;
        assert_eq!(decision, Decision::Unauthenticated(AppError::MissingToken));

        let basic = Credentials {
            authorization: Some("Basic dXNlcjpwdw==".to_string()),
            refresh: None,
        };
        assert_eq!(
            state.pipeline.run(&basic).await,
            Decision::Unauthenticated(AppError::MissingToken)
        );
    }

    #[actix_web::test]
    async fn test_valid_access_token_authenticates() {
        let (_, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();

        match state.pipeline.run(&Credentials::bearer(&pair.access_token)).await {
            Decision::Authenticated { identity, rotated } => {
                assert_eq!(identity.user_id, "user-1");
                assert!(rotated.is_none());
            }
            other => panic!("expected Authenticated, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_expired_without_refresh_is_token_expired() {
        let (clock, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        clock.advance(Duration::minutes(20));

        assert_eq!(
            state.pipeline.run(&Credentials::bearer(&pair.access_token)).await,
            Decision::Unauthenticated(AppError::TokenExpired)
        );
    }

    #[actix_web::test]
    async fn test_expired_with_refresh_rotates_token() {
        let (clock, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        clock.advance(Duration::minutes(20));

        let credentials = Credentials::bearer(&pair.access_token).with_refresh(&pair.refresh_token);
        match state.pipeline.run(&credentials).await {
            Decision::Authenticated { identity, rotated } => {
                let rotated = rotated.expect("rotated token");
                assert_eq!(identity.user_id, "user-1");
                assert_eq!(rotated.claims.sub, "user-1");
                assert!(matches!(
                    state.tokens.verify(&rotated.token, TokenClass::Access).unwrap(),
                    Verification::Valid(_)
                ));
            }
            other => panic!("expected Authenticated, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_expired_with_bad_refresh_is_rejected() {
        let (clock, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        clock.advance(Duration::minutes(20));

        let garbage = Credentials::bearer(&pair.access_token).with_refresh("not-a-token");
        assert!(matches!(
            state.pipeline.run(&garbage).await,
            Decision::Rejected(AppError::RefreshRejected(_))
        ));

        clock.advance(Duration::days(7));
        let stale = Credentials::bearer(&pair.access_token).with_refresh(&pair.refresh_token);
        assert!(matches!(
            state.pipeline.run(&stale).await,
            Decision::Rejected(AppError::RefreshRejected(_))
        ));
    }

    #[actix_web::test]
    async fn test_refresh_identity_comes_from_refresh_token() {
        let (clock, state) = test_state();
        let expired = state.tokens.issue_pair("user-a").unwrap();
        let other = state.tokens.issue_pair("user-b").unwrap();
        clock.advance(Duration::minutes(20));

        let credentials = Credentials::bearer(&expired.access_token).with_refresh(&other.refresh_token);
        match state.pipeline.run(&credentials).await {
            Decision::Authenticated { identity, rotated } => {
                assert_eq!(identity.user_id, "user-b");
                assert_eq!(rotated.expect("rotated token").claims.sub, "user-b");
            }
            other => panic!("expected Authenticated, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_refresh_header_ignored_for_valid_token() {
        let (_, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();

        let credentials = Credentials::bearer(&pair.access_token).with_refresh("not-a-token");
        assert!(matches!(
            state.pipeline.run(&credentials).await,
            Decision::Authenticated { rotated: None, .. }
        ));
    }

    #[actix_web::test]
    async fn test_revoked_token_is_rejected_without_refresh() {
        let (_, state) = test_state();
        let pair = state.tokens.issue_pair("user-1").unwrap();
        state.revocations.revoke(&pair.access_token, Duration::minutes(15)).await.unwrap();

        let credentials = Credentials::bearer(&pair.access_token).with_refresh(&pair.refresh_token);
        assert_eq!(
            state.pipeline.run(&credentials).await,
            Decision::Rejected(AppError::TokenRevoked)
        );
    }

    #[actix_web::test]
    async fn test_never_issued_token_is_not_revoked() {
        let (_, state) = test_state();
        let foreign = crate::test_support::token_service_with(&{
            let mut config = hs256_config();
            config.access_key = crate::config::KeySource::Secret("some-other-secret".to_string());
            config
        }, fixed_clock());
        let forged = foreign.issue("user-1", TokenClass::Access, Duration::minutes(5)).unwrap();

        assert!(matches!(
            state.pipeline.run(&Credentials::bearer(&forged.token)).await,
            Decision::Unauthenticated(AppError::InvalidSignature(_))
        ));
        assert!(matches!(
            state.pipeline.run(&Credentials::bearer("garbage")).await,
            Decision::Unauthenticated(AppError::MalformedToken(_))
        ));
    }

    #[actix_web::test]
    async fn test_store_failure_follows_policy() {
        let open = unavailable_state(FailurePolicy::FailOpen);
        let pair = open.tokens.issue_pair("user-1").unwrap();
        assert!(matches!(
            open.pipeline.run(&Credentials::bearer(&pair.access_token)).await,
            Decision::Authenticated { .. }
        ));

        let closed = unavailable_state(FailurePolicy::FailClosed);
        let pair = closed.tokens.issue_pair("user-1").unwrap();
        assert!(matches!(
            closed.pipeline.run(&Credentials::bearer(&pair.access_token)).await,
            Decision::Rejected(AppError::RevocationStoreUnavailable(_))
        ));
    }

    #[test]
    fn test_credentials_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(HeaderName::from_static("x-refresh"), HeaderValue::from_static("  "));

        let credentials = Credentials::from_headers(&headers);
        assert_eq!(credentials.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(credentials.refresh, None);
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ORDER[0], Stage::ExtractBearer);
        assert_eq!(Stage::ORDER[3], Stage::RefreshExpired);
        assert_eq!(Stage::CheckRevocation.to_string(), "check_revocation");
    }
}
