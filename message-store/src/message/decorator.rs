//! 消息装饰器
//!
use super::clock::{Clock, SystemClock};
use super::envelope::Message;
use super::header::{Header, format_time_of_recording};
use bon::Builder;
use std::sync::Arc;

/// 消息装饰器：在持久化前为消息补充头部
pub trait MessageDecorator: Send + Sync {
    fn decorate(&self, message: Message) -> Message;
}

/// 默认头部装饰器：写入事件类型与记录时间
#[derive(Builder)]
pub struct DefaultHeadersDecorator {
    #[builder(default = default_clock())]
    clock: Arc<dyn Clock>,
}

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

impl Default for DefaultHeadersDecorator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MessageDecorator for DefaultHeadersDecorator {
    fn decorate(&self, message: Message) -> Message {
        let event_type = message.payload_type();
        let recorded_at = format_time_of_recording(&self.clock.now());

        message.with_headers([
            (Header::EVENT_TYPE, event_type.to_string()),
            (Header::TIME_OF_RECORDING, recorded_at),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{SerializablePayload, TestClock};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Closed {}

    impl SerializablePayload for Closed {
        const PAYLOAD_TYPE: &'static str = "closed";
    }

    #[test]
    fn decorates_with_type_and_recording_time() {
        let clock = TestClock::new();
        let decorator = DefaultHeadersDecorator::builder()
            .clock(Arc::new(clock))
            .build();

        let message = decorator.decorate(Message::new(Closed {}));

        assert_eq!(
            message.header(Header::EVENT_TYPE).and_then(|v| v.as_str()),
            Some("closed")
        );
        assert_eq!(message.time_of_recording().unwrap(), Some(clock.now()));
    }
}
