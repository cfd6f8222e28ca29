//! 消息工厂的输入数据（各字段均可缺省）
//!
use super::StoredMessage;
use crate::message::PayloadMap;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 存储层元数据
pub type MetadataMap = serde_json::Map<String, Value>;

/// 消息的扁平映射形态；除载荷外字段均可缺省，由消息工厂补齐
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct MessageData {
    message_name: Option<String>,
    uuid: Option<Uuid>,
    created_at: Option<DateTime<Utc>>,
    metadata: Option<MetadataMap>,
    #[builder(default)]
    #[serde(default)]
    payload: PayloadMap,
}

impl MessageData {
    pub fn message_name(&self) -> Option<&str> {
        self.message_name.as_deref()
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn metadata(&self) -> Option<&MetadataMap> {
        self.metadata.as_ref()
    }

    pub fn payload(&self) -> &PayloadMap {
        &self.payload
    }

    /// 从存储层消息抽取完整的行数据
    pub fn from_stored(message: &dyn StoredMessage) -> Self {
        Self {
            message_name: Some(message.message_name().to_string()),
            uuid: Some(message.uuid()),
            created_at: Some(message.created_at()),
            metadata: Some(message.metadata().clone()),
            payload: message.payload().clone(),
        }
    }

    pub(crate) fn or_message_name(mut self, message_name: impl FnOnce() -> String) -> Self {
        self.message_name.get_or_insert_with(message_name);
        self
    }

    pub(crate) fn or_uuid(mut self, uuid: impl FnOnce() -> Uuid) -> Self {
        self.uuid.get_or_insert_with(uuid);
        self
    }

    pub(crate) fn or_created_at(mut self, created_at: impl FnOnce() -> DateTime<Utc>) -> Self {
        self.created_at.get_or_insert_with(created_at);
        self
    }

    pub(crate) fn or_metadata(mut self) -> Self {
        self.metadata.get_or_insert_with(MetadataMap::new);
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Option<String>,
        Option<Uuid>,
        Option<DateTime<Utc>>,
        Option<MetadataMap>,
        PayloadMap,
    ) {
        (
            self.message_name,
            self.uuid,
            self.created_at,
            self.metadata,
            self.payload,
        )
    }
}
