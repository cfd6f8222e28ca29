//! 序列化消息（`headers` + `payload`）
//!
use crate::{
    error::MessageStoreResult,
    message::{Header, Headers, PayloadMap},
};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 序列化后的消息：头部 + 载荷映射
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedMessage {
    /// 消息头部（事件 ID、聚合 ID、聚合版本、记录时间等）
    #[builder(default)]
    headers: Headers,
    /// 事件载荷
    #[builder(default)]
    payload: PayloadMap,
}

impl SerializedMessage {
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(key).filter(|value| !value.is_null())
    }

    pub fn insert_header(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn payload(&self) -> &PayloadMap {
        &self.payload
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header(Header::EVENT_TYPE).and_then(Value::as_str)
    }

    pub fn event_id(&self) -> Option<&str> {
        self.header(Header::EVENT_ID).and_then(Value::as_str)
    }

    pub fn into_parts(self) -> (Headers, PayloadMap) {
        (self.headers, self.payload)
    }

    /// 转换为存储层使用的映射形态
    pub fn into_map(self) -> MessageStoreResult<PayloadMap> {
        let mut map = PayloadMap::new();
        map.insert("headers".to_string(), serde_json::to_value(self.headers)?);
        map.insert("payload".to_string(), Value::Object(self.payload));
        Ok(map)
    }
}

impl TryFrom<&PayloadMap> for SerializedMessage {
    type Error = serde_json::Error;

    fn try_from(map: &PayloadMap) -> Result<Self, Self::Error> {
        serde_json::from_value(Value::Object(map.clone()))
    }
}
