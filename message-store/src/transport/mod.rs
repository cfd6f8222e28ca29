//! 传输记录（transport）
//!
//! 事件存储看到的消息形态：`StoredMessage` 是存储层约定的消息接口，
//! `TransportEvent` 是本适配器写入与读回的具体记录，`MessageData` 是其扁平映射。
//! 存储在读取时通过 `MessageFactory` 将行数据还原为消息。
//!
mod factory;
mod message_data;
mod stored_message;
mod transport_event;

pub use factory::{MessageFactory, SerializablePayloadMessageFactory};
pub use message_data::{MessageData, MetadataMap};
pub use stored_message::StoredMessage;
pub use transport_event::TransportEvent;
