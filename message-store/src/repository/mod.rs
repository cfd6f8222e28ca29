//! 消息仓储（repository）
//!
//! 以事件存储中的单个流承载多个聚合的消息：写入时把消息头部投影为可查询的
//! 元数据，读取时按元数据条件加载并经序列化器还原消息。
//!
mod message_repository;
mod retrieved;
mod stream_repository;

pub use message_repository::MessageRepository;
pub use retrieved::{Retrieved, RetrievedMessages};
pub use stream_repository::StreamMessageRepository;

/// 写入存储层的元数据键
pub mod metadata_key {
    /// 载荷类型标识
    pub const AGGREGATE_TYPE: &str = "_aggregate_type";
    pub const AGGREGATE_ID: &str = "_aggregate_id";
    pub const AGGREGATE_VERSION: &str = "_aggregate_version";
}
