//! 写入事件存储的传输记录
//!
use super::{MessageData, MetadataMap, StoredMessage};
use crate::{
    error::{MessageStoreError, MessageStoreResult},
    message::PayloadMap,
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use uuid::Uuid;

/// 传输记录：适配器写入事件存储、并由消息工厂读回的具体消息
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct TransportEvent {
    /// 记录唯一标识，等同于消息的事件 ID
    uuid: Uuid,
    /// 消息名，等同于载荷类型标识
    message_name: String,
    /// 供存储层按条件查询的元数据
    #[builder(default)]
    metadata: MetadataMap,
    /// 记录时间
    created_at: DateTime<Utc>,
    /// 序列化后的消息（`headers` + `payload`）
    #[builder(default)]
    payload: PayloadMap,
}

impl StoredMessage for TransportEvent {
    fn message_name(&self) -> &str {
        &self.message_name
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    fn payload(&self) -> &PayloadMap {
        &self.payload
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl From<TransportEvent> for MessageData {
    fn from(event: TransportEvent) -> Self {
        MessageData::builder()
            .message_name(event.message_name)
            .uuid(event.uuid)
            .created_at(event.created_at)
            .metadata(event.metadata)
            .payload(event.payload)
            .build()
    }
}

impl TryFrom<MessageData> for TransportEvent {
    type Error = MessageStoreError;

    fn try_from(data: MessageData) -> MessageStoreResult<Self> {
        let (message_name, uuid, created_at, metadata, payload) = data.into_parts();
        let missing = |field: &str| MessageStoreError::InvalidValue {
            reason: format!("message data lacks {field}"),
        };

        Ok(TransportEvent {
            uuid: uuid.ok_or_else(|| missing("uuid"))?,
            message_name: message_name.ok_or_else(|| missing("message_name"))?,
            metadata: metadata.unwrap_or_default(),
            created_at: created_at.ok_or_else(|| missing("created_at"))?,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_through_message_data() {
        let event = TransportEvent::builder()
            .uuid(Uuid::new_v4())
            .message_name("opened".to_string())
            .metadata(json!({ "_aggregate_id": "a-1" }).as_object().cloned().unwrap())
            .created_at(Utc::now())
            .payload(json!({ "headers": {}, "payload": {} }).as_object().cloned().unwrap())
            .build();

        let data = MessageData::from(event.clone());
        assert_eq!(data.message_name(), Some("opened"));
        assert_eq!(TransportEvent::try_from(data).unwrap(), event);
    }

    #[test]
    fn incomplete_data_is_rejected() {
        let data = MessageData::builder()
            .message_name("opened".to_string())
            .build();

        let err = TransportEvent::try_from(data).unwrap_err();
        assert_eq!(err.to_string(), "invalid value: message data lacks uuid");
    }

    #[test]
    fn downcasts_from_stored_message() {
        let boxed: Box<dyn StoredMessage> = Box::new(
            TransportEvent::builder()
                .uuid(Uuid::new_v4())
                .message_name("opened".to_string())
                .created_at(Utc::now())
                .build(),
        );

        assert!(boxed.type_name().ends_with("TransportEvent"));
        assert!(boxed.into_any().downcast::<TransportEvent>().is_ok());
    }
}
