//! JWT 토큰 클레임, 토큰 종류 및 발급 결과 구조체
//!
//! 액세스/리프레시 토큰은 동일한 클레임 구조를 사용하며 `token_use`로 구분합니다.
//! 디코딩 시 알 수 없는 필드나 누락된 필드는 모두 형식 오류로 처리됩니다.
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 토큰 종류
///
/// 종류마다 별도의 키 재료를 사용하며 서로 바꿔 쓸 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// API 접근용 단기 토큰
    Access,
    /// 액세스 토큰 재발급용 장기 토큰
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }

    /// 키 설정 환경 변수 접두사 (`ACCESS_TOKEN`, `REFRESH_TOKEN`)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            TokenClass::Access => "ACCESS_TOKEN",
            TokenClass::Refresh => "REFRESH_TOKEN",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT 토큰의 클레임(Payload) 구조체
///
/// ## 클레임 구성
///
/// - `sub`: 토큰의 주체 (불투명한 사용자 식별자)
/// - `iat`: 토큰 발급 시간 (Unix timestamp)
/// - `exp`: 토큰 만료 시간 (Unix timestamp)
/// - `token_use`: 토큰 종류 (`access` | `refresh`)
/// - `jti`: 토큰 고유 ID (UUID v4, 같은 초에 발급된 토큰도 서로 다름)
/// - `iss`: 발급자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// 토큰의 주체 (사용자 ID)
    pub sub: String,
    /// 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// 토큰 종류
    pub token_use: TokenClass,
    /// 토큰 고유 ID
    pub jti: String,
    /// 발급자
    pub iss: String,
}

impl TokenClaims {
    /// 만료 시각
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// `now` 기준 만료 여부 (`now >= exp`)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// `now` 기준 남은 수명 (초). 만료된 경우 0 이하
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.exp - now.timestamp()
    }
}

/// 서명이 완료된 토큰과 그 클레임
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    /// JWT compact serialization
    pub token: String,
    /// 서명된 클레임
    pub claims: TokenClaims,
}

impl IssuedToken {
    /// 발급 시점 기준 유효 기간 (초)
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

/// JWT 토큰 쌍 구조체
///
/// 로그인 성공 시 클라이언트에게 전달되는 토큰 집합입니다.
/// OAuth 2.0 표준의 토큰 응답 형식을 따릅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// 액세스 토큰 (API 접근용 단기 토큰)
    pub access_token: String,
    /// 리프레시 토큰 (토큰 갱신용 장기 토큰)
    pub refresh_token: String,
    /// 토큰 타입 (항상 `Bearer`)
    pub token_type: String,
    /// 액세스 토큰 만료 시간 (초)
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access: &IssuedToken, refresh: &IssuedToken) -> Self {
        Self {
            access_token: access.token.clone(),
            refresh_token: refresh.token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: access.expires_in(),
        }
    }
}
