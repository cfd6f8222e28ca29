//! 消息工厂
//!
//! 事件存储读取时据消息名与行数据还原消息，并补齐缺省字段。
//!
use super::{MessageData, StoredMessage, TransportEvent};
use crate::{
    error::MessageStoreResult,
    message::{Clock, SystemClock},
    serialization::PayloadRegistry,
};
use bon::Builder;
use std::sync::Arc;
use uuid::Uuid;

/// 消息工厂：事件存储在读取时用于将行数据还原为消息
pub trait MessageFactory: Send + Sync {
    fn create_message_from_array(
        &self,
        message_name: &str,
        data: MessageData,
    ) -> MessageStoreResult<Box<dyn StoredMessage>>;
}

impl<T> MessageFactory for Arc<T>
where
    T: MessageFactory + ?Sized,
{
    fn create_message_from_array(
        &self,
        message_name: &str,
        data: MessageData,
    ) -> MessageStoreResult<Box<dyn StoredMessage>> {
        (**self).create_message_from_array(message_name, data)
    }
}

/// 以 `TransportEvent` 还原消息的工厂
///
/// 消息名必须在注册表中解析为可序列化载荷；缺省的消息名、uuid、
/// 记录时间与元数据会被补齐，显式给出的值原样保留。
#[derive(Builder)]
pub struct SerializablePayloadMessageFactory {
    registry: Arc<PayloadRegistry>,
    #[builder(default = default_clock())]
    clock: Arc<dyn Clock>,
}

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

impl SerializablePayloadMessageFactory {
    pub fn new(registry: Arc<PayloadRegistry>) -> Self {
        Self::builder().registry(registry).build()
    }

    pub fn create_transport_event(
        &self,
        message_name: &str,
        data: MessageData,
    ) -> MessageStoreResult<TransportEvent> {
        self.registry.ensure_payload(message_name)?;

        let data = data
            .or_message_name(|| message_name.to_string())
            .or_uuid(Uuid::new_v4)
            .or_created_at(|| self.clock.now())
            .or_metadata();

        TransportEvent::try_from(data)
    }
}

impl MessageFactory for SerializablePayloadMessageFactory {
    fn create_message_from_array(
        &self,
        message_name: &str,
        data: MessageData,
    ) -> MessageStoreResult<Box<dyn StoredMessage>> {
        let event = self.create_transport_event(message_name, data)?;
        Ok(Box::new(event))
    }
}
