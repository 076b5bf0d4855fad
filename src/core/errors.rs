//! # Application Error Handling System
//!
//! 인증 서비스 전역에서 사용하는 통합 에러 타입입니다.
//! 토큰 수명주기(발급 → 검증 → 만료 → 갱신 → 폐기)에서 발생하는 모든 실패를
//! 하나의 열거형으로 표현하고, `actix_web::ResponseError`를 구현하여
//! 안정적인 기계 판독용 사유 코드와 함께 HTTP 응답으로 자동 변환합니다.
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status | 사유 코드 |
//! |----------|-------------|-----------|
//! | `MissingToken` | 401 | `missing_token` |
//! | `MalformedToken` | 401 | `malformed_token` |
//! | `InvalidSignature` | 401 | `invalid_signature` |
//! | `TokenExpired` | 401 | `token_expired` |
//! | `TokenRevoked` | 401 | `token_revoked` |
//! | `RefreshRejected` | 401 | `refresh_rejected` |
//! | `InvalidCredentials` | 401 | `invalid_credentials` |
//! | `Forbidden` | 403 | `forbidden` |
//! | `ValidationError` | 400 | `validation_error` |
//! | `NotFound` | 404 | `not_found` |
//! | `KeyUnavailable` | 500 | `key_unavailable` |
//! | `RevocationStoreUnavailable` | 500 | `revocation_store_unavailable` |
//! | `InternalError` | 500 | `internal_error` |
//!
//! ## 응답 형식
//!
//! ```json
//! {
//!   "error": "token_revoked",
//!   "message": "Token has been revoked"
//! }
//! ```
//!
//! 5xx 에러는 서버 로그에 상세 정보를 남기고, 클라이언트에는 내부 정보를 노출하지 않습니다.

use actix_web::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 자격 증명 형식/서명 문제는 호출자가 복구 가능한 401 계열이고,
/// 키 로딩 실패와 폐기 저장소 장애는 운영 장애로 500 계열입니다.
/// 어떤 에러도 프로세스를 종료시키지 않으며 모두 요청 범위에 한정됩니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Authorization 헤더가 없거나 Bearer 스킴이 아님
    #[error("Access token is missing")]
    MissingToken,

    /// 토큰 구조(세그먼트, base64, JSON, 필수 클레임)가 올바르지 않음
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// 서명 불일치, 알고리즘 불일치, 발급자/토큰 종류 불일치
    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    /// 서명은 유효하지만 만료 시각이 지남
    #[error("Token has expired")]
    TokenExpired,

    /// 로그아웃 등으로 명시적으로 폐기된 토큰
    #[error("Token has been revoked")]
    TokenRevoked,

    /// 리프레시 토큰이 만료되었거나 유효하지 않아 재발급 거부
    #[error("Refresh token rejected: {0}")]
    RefreshRejected(String),

    /// 로그인 자격 증명 불일치
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// 검증된 사용자 식별 정보가 필요한 라우트에 신원 없이 접근
    #[error("Access forbidden: no verified identity")]
    Forbidden,

    /// 서명 키를 로드할 수 없음 (운영 장애)
    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    /// 폐기 저장소에 접근할 수 없음 (연결 실패, 타임아웃)
    #[error("Revocation store unavailable: {0}")]
    RevocationStoreUnavailable(String),

    /// 입력값 검증 실패
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 예상하지 못한 내부 오류
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// 안정적인 기계 판독용 사유 코드
    pub error: &'static str,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
}

impl AppError {
    /// 안정적인 기계 판독용 사유 코드를 반환합니다.
    ///
    /// 클라이언트는 메시지 문자열이 아니라 이 코드로 분기해야 합니다.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingToken => "missing_token",
            AppError::MalformedToken(_) => "malformed_token",
            AppError::InvalidSignature(_) => "invalid_signature",
            AppError::TokenExpired => "token_expired",
            AppError::TokenRevoked => "token_revoked",
            AppError::RefreshRejected(_) => "refresh_rejected",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Forbidden => "forbidden",
            AppError::KeyUnavailable(_) => "key_unavailable",
            AppError::RevocationStoreUnavailable(_) => "revocation_store_unavailable",
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::InternalError(_) => "internal_error",
        }
    }

    /// 운영 장애 여부 (500 계열)
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            AppError::KeyUnavailable(_)
                | AppError::RevocationStoreUnavailable(_)
                | AppError::InternalError(_)
        )
    }

    /// 클라이언트에 노출할 메시지
    ///
    /// 운영 장애의 상세 원인은 로그에만 남깁니다.
    pub fn public_message(&self) -> String {
        if self.is_operational() {
            match self {
                AppError::KeyUnavailable(_) => "Signing key unavailable".to_string(),
                AppError::RevocationStoreUnavailable(_) => {
                    "Revocation store unavailable".to_string()
                }
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        }
    }

    /// 응답 본문을 생성합니다.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code(),
            message: self.public_message(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingToken
            | AppError::MalformedToken(_)
            | AppError::InvalidSignature(_)
            | AppError::TokenExpired
            | AppError::TokenRevoked
            | AppError::RefreshRejected(_)
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::KeyUnavailable(_)
            | AppError::RevocationStoreUnavailable(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 5xx 에러는 여기서 error 레벨로 기록됩니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        if self.is_operational() {
            log::error!("요청 처리 중 운영 장애 발생: {}", self);
        }

        actix_web::HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// ```rust,ignore
/// let pem = std::fs::read_to_string(path).context("Failed to read key file")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
