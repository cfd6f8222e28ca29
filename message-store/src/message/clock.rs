//! 时钟抽象
//!
use chrono::{DateTime, SubsecRound, Utc};

/// 时钟抽象，便于在测试中固定时间
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时钟：始终返回创建时指定的时间（截断到微秒，与头部格式一致）
#[derive(Debug, Clone, Copy)]
pub struct TestClock {
    now: DateTime<Utc>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: now.trunc_subsecs(6),
        }
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
