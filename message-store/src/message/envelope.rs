//! 消息：擦除类型的事件载荷 + 头部
//!
use super::header::{Header, Headers, parse_time_of_recording};
use super::payload::{Event, SerializablePayload};
use crate::error::MessageStoreResult;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 消息：事件载荷 + 头部。构造后不可变，`with_*` 方法返回新的消息。
#[derive(Clone)]
pub struct Message {
    event: Arc<dyn Event>,
    headers: Headers,
}

impl Message {
    pub fn new<P>(event: P) -> Self
    where
        P: SerializablePayload,
    {
        Self::from_parts(Arc::new(event), Headers::new())
    }

    pub fn from_parts(event: Arc<dyn Event>, headers: Headers) -> Self {
        Self { event, headers }
    }

    pub fn event(&self) -> &dyn Event {
        self.event.as_ref()
    }

    /// 以具体类型读取载荷，类型不符时返回 `None`
    pub fn payload<P>(&self) -> Option<&P>
    where
        P: SerializablePayload,
    {
        self.event.as_any().downcast_ref::<P>()
    }

    pub fn payload_type(&self) -> &'static str {
        self.event.payload_type()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(key).filter(|value| !value.is_null())
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn event_id(&self) -> Option<&str> {
        self.header(Header::EVENT_ID).and_then(Value::as_str)
    }

    pub fn aggregate_root_id(&self) -> Option<&str> {
        self.header(Header::AGGREGATE_ROOT_ID).and_then(Value::as_str)
    }

    /// 聚合版本；兼容以数字字符串写入的头部
    pub fn aggregate_version(&self) -> Option<u64> {
        match self.header(Header::AGGREGATE_ROOT_VERSION)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn time_of_recording(&self) -> MessageStoreResult<Option<DateTime<Utc>>> {
        self.header(Header::TIME_OF_RECORDING)
            .and_then(Value::as_str)
            .map(parse_time_of_recording)
            .transpose()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.headers == other.headers && self.event.eq_event(other.event.as_ref())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("event", &self.event)
            .field("headers", &self.headers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::SerializablePayload;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Opened {
        by: String,
    }

    impl SerializablePayload for Opened {
        const PAYLOAD_TYPE: &'static str = "opened";
    }

    fn opened() -> Message {
        Message::new(Opened { by: "bob".into() })
    }

    #[test]
    fn headers_are_read_back() {
        let message = opened().with_headers([
            (Header::EVENT_ID, Value::from("e-1")),
            (Header::AGGREGATE_ROOT_ID, Value::from("a-1")),
            (Header::AGGREGATE_ROOT_VERSION, Value::from(7)),
        ]);

        assert_eq!(message.event_id(), Some("e-1"));
        assert_eq!(message.aggregate_root_id(), Some("a-1"));
        assert_eq!(message.aggregate_version(), Some(7));
        assert_eq!(message.payload_type(), "opened");
        assert_eq!(message.payload::<Opened>().map(|e| e.by.as_str()), Some("bob"));
    }

    #[test]
    fn version_header_may_be_a_numeric_string() {
        let message = opened().with_header(Header::AGGREGATE_ROOT_VERSION, "12");
        assert_eq!(message.aggregate_version(), Some(12));

        let message = opened().with_header(Header::AGGREGATE_ROOT_VERSION, Value::Null);
        assert_eq!(message.aggregate_version(), None);
    }

    #[test]
    fn equality_covers_payload_and_headers() {
        let a = opened().with_header(Header::EVENT_ID, "e-1");
        let b = opened().with_header(Header::EVENT_ID, "e-1");
        let c = opened().with_header(Header::EVENT_ID, "e-2");
        let d = Message::new(Opened { by: "eve".into() }).with_header(Header::EVENT_ID, "e-1");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn missing_time_of_recording_is_none() {
        assert_eq!(opened().time_of_recording().unwrap(), None);
    }
}
