//! 事件存储所见的消息协议
//!
use super::MetadataMap;
use crate::message::PayloadMap;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// 事件存储约定的消息接口
pub trait StoredMessage: Any + fmt::Debug + Send + Sync {
    fn message_name(&self) -> &str;

    fn uuid(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn metadata(&self) -> &MetadataMap;

    fn payload(&self) -> &PayloadMap;

    /// 具体类型名，用于类型不符时的错误信息
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}
