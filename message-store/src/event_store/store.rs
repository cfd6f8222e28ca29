//! 事件存储协议
//!
//! 仓储只依赖这里的读写与事务接口；存储的持久化、并发控制与
//! 元数据匹配求值均由实现方负责。
//!
use super::{MetadataMatcher, StreamName};
use crate::{error::MessageStoreResult, transport::StoredMessage};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;

/// 加载结果：按存储顺序逐条产出的消息
pub type RecordStream<'a> = BoxStream<'a, MessageStoreResult<Box<dyn StoredMessage>>>;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn has_stream(&self, stream_name: &StreamName) -> bool;

    async fn append_to(
        &self,
        stream_name: &StreamName,
        events: Vec<Box<dyn StoredMessage>>,
    ) -> MessageStoreResult<()>;

    /// 从 `from_number`（从 1 开始）起加载至多 `count` 条匹配 `matcher` 的消息
    async fn load<'a>(
        &'a self,
        stream_name: &StreamName,
        from_number: usize,
        count: Option<usize>,
        matcher: Option<&MetadataMatcher>,
    ) -> MessageStoreResult<RecordStream<'a>>;

    /// 支持事务时返回事务视图
    fn transactional(&self) -> Option<&dyn TransactionalEventStore> {
        None
    }
}

#[async_trait]
pub trait TransactionalEventStore: EventStore {
    async fn begin_transaction(&self) -> MessageStoreResult<()>;

    async fn commit(&self) -> MessageStoreResult<()>;

    async fn rollback(&self) -> MessageStoreResult<()>;

    async fn in_transaction(&self) -> bool;

    /// 同步放弃当前事务（若有），丢弃其中缓冲的写入
    ///
    /// 事务作用域在未结束即被丢弃时调用，不能等待，也不报告错误。
    fn abort_transaction(&self);
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn has_stream(&self, stream_name: &StreamName) -> bool {
        (**self).has_stream(stream_name).await
    }

    async fn append_to(
        &self,
        stream_name: &StreamName,
        events: Vec<Box<dyn StoredMessage>>,
    ) -> MessageStoreResult<()> {
        (**self).append_to(stream_name, events).await
    }

    async fn load<'a>(
        &'a self,
        stream_name: &StreamName,
        from_number: usize,
        count: Option<usize>,
        matcher: Option<&MetadataMatcher>,
    ) -> MessageStoreResult<RecordStream<'a>> {
        (**self)
            .load(stream_name, from_number, count, matcher)
            .await
    }

    fn transactional(&self) -> Option<&dyn TransactionalEventStore> {
        (**self).transactional()
    }
}
