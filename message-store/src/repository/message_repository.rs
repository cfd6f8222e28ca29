//! 消息仓储接口
//!
use super::RetrievedMessages;
use crate::{error::MessageStoreResult, message::Message};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 在一次追加中持久化全部消息；空输入不触碰存储
    async fn persist(&self, messages: &[Message]) -> MessageStoreResult<()>;

    /// 指定聚合的全部消息
    fn retrieve_all<'a>(&'a self, aggregate_id: &str) -> RetrievedMessages<'a>;

    /// 指定聚合中版本大于 `version` 的消息
    fn retrieve_all_after_version<'a>(
        &'a self,
        aggregate_id: &str,
        version: u64,
    ) -> RetrievedMessages<'a>;

    /// 流中的全部消息
    fn retrieve_everything(&self) -> RetrievedMessages<'_>;
}

#[async_trait]
impl<T> MessageRepository for Arc<T>
where
    T: MessageRepository + ?Sized,
{
    async fn persist(&self, messages: &[Message]) -> MessageStoreResult<()> {
        (**self).persist(messages).await
    }

    fn retrieve_all<'a>(&'a self, aggregate_id: &str) -> RetrievedMessages<'a> {
        (**self).retrieve_all(aggregate_id)
    }

    fn retrieve_all_after_version<'a>(
        &'a self,
        aggregate_id: &str,
        version: u64,
    ) -> RetrievedMessages<'a> {
        (**self).retrieve_all_after_version(aggregate_id, version)
    }

    fn retrieve_everything(&self) -> RetrievedMessages<'_> {
        (**self).retrieve_everything()
    }
}
