//! 消息模型（Message）
//!
//! 定义事件载荷需要实现的最小能力（`SerializablePayload`）、类型擦除后的
//! 事件接口（`Event`），以及载荷与头部封装后的 `Message`。
//! 头部键名集中在 `Header`，默认头部由 `DefaultHeadersDecorator` 补齐。

mod clock;
mod decorator;
mod envelope;
mod header;
mod payload;

pub use clock::{Clock, SystemClock, TestClock};
pub use decorator::{DefaultHeadersDecorator, MessageDecorator};
pub use envelope::Message;
pub use header::{Header, Headers, format_time_of_recording, parse_time_of_recording};
pub use payload::{Event, PayloadMap, SerializablePayload};
