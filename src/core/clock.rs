//! 시간 소스 추상화
//!
//! 토큰 발급/만료 판정과 폐기 레코드 TTL은 모두 이 trait을 통해 현재 시각을 얻습니다.
//! 테스트에서는 [`FixedClock`]으로 시간을 고정하거나 앞으로 이동시킬 수 있습니다.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// 현재 UTC 시각을 제공하는 포트
pub trait Clock: Send + Sync {
    /// 현재 UTC 시각
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 조작 가능한 시계
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// 시각을 `delta`만큼 앞으로 이동합니다.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += delta;
    }

    /// 시각을 지정한 값으로 설정합니다.
    pub fn set(&self, value: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = value;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
