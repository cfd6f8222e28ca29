//! 消息序列化器
//!
use super::{PayloadRegistry, SerializedMessage};
use crate::{
    error::{MessageStoreError, MessageStoreResult},
    message::{Header, Message, PayloadMap},
};
use std::sync::Arc;

/// 消息序列化器：消息 <-> 映射形态
pub trait MessageSerializer: Send + Sync {
    fn serialize_message(&self, message: &Message) -> MessageStoreResult<SerializedMessage>;

    /// 还原一条存储记录；返回的消息数量由序列化器决定（可为零或多条）
    fn unserialize_payload(&self, payload: &PayloadMap) -> MessageStoreResult<Vec<Message>>;
}

impl<T> MessageSerializer for Arc<T>
where
    T: MessageSerializer + ?Sized,
{
    fn serialize_message(&self, message: &Message) -> MessageStoreResult<SerializedMessage> {
        (**self).serialize_message(message)
    }

    fn unserialize_payload(&self, payload: &PayloadMap) -> MessageStoreResult<Vec<Message>> {
        (**self).unserialize_payload(payload)
    }
}

/// 基于载荷注册表构造事件的序列化器
#[derive(Debug, Clone)]
pub struct ConstructingMessageSerializer {
    registry: Arc<PayloadRegistry>,
}

impl ConstructingMessageSerializer {
    pub fn new(registry: Arc<PayloadRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }
}

impl MessageSerializer for ConstructingMessageSerializer {
    fn serialize_message(&self, message: &Message) -> MessageStoreResult<SerializedMessage> {
        let mut headers = message.headers().clone();
        headers.insert(Header::EVENT_TYPE.to_string(), message.payload_type().into());

        Ok(SerializedMessage::builder()
            .headers(headers)
            .payload(message.event().serialize_payload()?)
            .build())
    }

    fn unserialize_payload(&self, payload: &PayloadMap) -> MessageStoreResult<Vec<Message>> {
        let serialized = SerializedMessage::try_from(payload)?;
        let event_type = serialized
            .event_type()
            .ok_or_else(|| MessageStoreError::InvalidValue {
                reason: format!("serialized message lacks the {} header", Header::EVENT_TYPE),
            })?
            .to_string();

        let (headers, payload) = serialized.into_parts();
        let event = self.registry.decode(&event_type, payload)?;

        Ok(vec![Message::from_parts(event, headers)])
    }
}
