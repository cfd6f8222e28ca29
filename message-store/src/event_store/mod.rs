//! 事件存储协议（event_store）
//!
//! 本适配器依赖的存储能力：按流名追加、按元数据条件加载、可选的事务。
//! 具体存储由上层注入；`InMemoryEventStore` 是一个完整的内存实现。
//!
#[cfg(feature = "inmemory")]
mod inmemory;
mod metadata_matcher;
mod store;
mod stream_name;
mod transaction;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryEventStore;
pub use metadata_matcher::{MetadataMatch, MetadataMatcher, Operator};
pub use store::{EventStore, RecordStream, TransactionalEventStore};
pub use stream_name::StreamName;
pub use transaction::Transaction;
