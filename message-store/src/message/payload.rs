//! 可序列化载荷
//!
//! `SerializablePayload` 提供类型标识与映射形态的互转，
//! `Event` 是其对象安全的擦除形式。
//!
use crate::error::{MessageStoreError, MessageStoreResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// 载荷的映射表示（JSON 对象）
pub type PayloadMap = serde_json::Map<String, Value>;

/// 可序列化载荷需要满足的能力边界：与映射表示之间对称地编码/解码
///
/// 一般通过 `#[payload]` 宏实现；默认实现基于 serde，要求载荷序列化为 JSON 对象。
pub trait SerializablePayload:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 载荷类型标识，写入 `__event_type` 头部并作为存储层的消息名
    const PAYLOAD_TYPE: &'static str;

    fn to_payload(&self) -> MessageStoreResult<PayloadMap> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(PayloadMap::new()),
            other => Err(MessageStoreError::InvalidValue {
                reason: format!(
                    "payload {} must serialize to an object, got {other}",
                    Self::PAYLOAD_TYPE
                ),
            }),
        }
    }

    fn from_payload(payload: PayloadMap) -> MessageStoreResult<Self> {
        // 单元结构体序列化为 null，对应空映射
        let fallback = payload.is_empty();
        match serde_json::from_value(Value::Object(payload)) {
            Ok(decoded) => Ok(decoded),
            Err(_) if fallback => Ok(serde_json::from_value(Value::Null)?),
            Err(err) => Err(err.into()),
        }
    }
}

/// 类型擦除后的事件载荷，供 `Message` 持有不同类型的事件
pub trait Event: Any + fmt::Debug + Send + Sync {
    fn payload_type(&self) -> &'static str;

    fn serialize_payload(&self) -> MessageStoreResult<PayloadMap>;

    fn as_any(&self) -> &dyn Any;

    fn eq_event(&self, other: &dyn Event) -> bool;
}

impl<P> Event for P
where
    P: SerializablePayload,
{
    fn payload_type(&self) -> &'static str {
        P::PAYLOAD_TYPE
    }

    fn serialize_payload(&self) -> MessageStoreResult<PayloadMap> {
        self.to_payload()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_event(&self, other: &dyn Event) -> bool {
        other
            .as_any()
            .downcast_ref::<P>()
            .is_some_and(|other| other == self)
    }
}
