//! 消息头部约定
//!
//! 头部键以双下划线开头；记录时间使用 RFC 3339（微秒精度，UTC）。
//!
use crate::error::MessageStoreResult;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// 消息头部：键为字符串，值为任意 JSON 值
pub type Headers = BTreeMap<String, Value>;

/// 约定的头部键名
pub struct Header;

impl Header {
    pub const EVENT_ID: &'static str = "__event_id";
    pub const EVENT_TYPE: &'static str = "__event_type";
    pub const TIME_OF_RECORDING: &'static str = "__time_of_recording";
    pub const AGGREGATE_ROOT_ID: &'static str = "__aggregate_root_id";
    pub const AGGREGATE_ROOT_ID_TYPE: &'static str = "__aggregate_root_id_type";
    pub const AGGREGATE_ROOT_VERSION: &'static str = "__aggregate_root_version";
}

/// 记录时间统一以 UTC、微秒精度的 RFC 3339 字符串写入头部
pub fn format_time_of_recording(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_time_of_recording(raw: &str) -> MessageStoreResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
