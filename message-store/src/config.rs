//! 仓储配置
//!
//! 可从 JSON 等 serde 支持的格式加载；缺省的加载起点为 1。
//!
use crate::error::MessageStoreResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// 承载消息的流名
    pub stream_name: String,
    /// 加载起始位置（从 1 开始）
    #[serde(default = "default_load_from")]
    pub load_from: usize,
}

fn default_load_from() -> usize {
    1
}

impl RepositoryConfig {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            load_from: default_load_from(),
        }
    }

    pub fn from_json(raw: &str) -> MessageStoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
