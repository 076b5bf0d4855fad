//! 외부 키-값 저장소 계층 모듈
//!
//! 토큰 폐기 목록을 저장하는 Redis 연결 핸들을 제공합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::caching::redis::RedisClient;
//!
//! let redis = RedisClient::connect("redis://localhost:6379").await?;
//! redis.set_ex("revoked_token:9f86d0...", "revoked", 900).await?;
//! let revoked = redis.exists("revoked_token:9f86d0...").await?;
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;
