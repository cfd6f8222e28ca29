//! 读取路径上的载荷上抬
//!
//! 一条存储记录经上抬链后可得到零条、一条或多条序列化消息。
//!
use super::{MessageSerializer, SerializedMessage};
use crate::{
    error::{MessageStoreError, MessageStoreResult},
    message::{Headers, Message, PayloadMap},
};
use std::sync::Arc;

/// 单条链路最多执行的上抬轮数，超出视为上抬器未收敛
const MAX_UPCAST_ROUNDS: usize = 32;

/// 载荷上抬器：在读取路径将旧形态的序列化消息转换为当前形态
///
/// 上抬后的输出不应再被同一上抬器命中，否则链路无法收敛。
pub trait PayloadUpcaster: Send + Sync {
    fn applies(&self, event_type: &str, headers: &Headers) -> bool;

    fn upcast(&self, message: SerializedMessage) -> MessageStoreResult<UpcastResult>;
}

impl<T> PayloadUpcaster for Arc<T>
where
    T: PayloadUpcaster + ?Sized,
{
    fn applies(&self, event_type: &str, headers: &Headers) -> bool {
        (**self).applies(event_type, headers)
    }

    fn upcast(&self, message: SerializedMessage) -> MessageStoreResult<UpcastResult> {
        (**self).upcast(message)
    }
}

/// 上抬结果：单个、拆分为多个、或丢弃
#[allow(clippy::large_enum_variant)]
pub enum UpcastResult {
    One(SerializedMessage),
    Many(Vec<SerializedMessage>),
    Drop,
}

/// 上抬链：按顺序应用多个上抬器，直到不再有变化
#[derive(Default)]
pub struct PayloadUpcasterChain {
    stages: Vec<Arc<dyn PayloadUpcaster>>,
}

impl PayloadUpcasterChain {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn upcast_all(
        &self,
        mut messages: Vec<SerializedMessage>,
    ) -> MessageStoreResult<Vec<SerializedMessage>> {
        for _ in 0..MAX_UPCAST_ROUNDS {
            let (upcasted, has_changes) = self.upcast_once(messages)?;
            if !has_changes {
                return Ok(upcasted);
            }
            messages = upcasted;
        }

        Err(MessageStoreError::UpcastFailed {
            payload_type: messages
                .first()
                .and_then(|m| m.event_type())
                .unwrap_or_default()
                .to_string(),
            stage: None,
            reason: format!("upcasting did not settle after {MAX_UPCAST_ROUNDS} rounds"),
        })
    }

    fn upcast_once(
        &self,
        messages: Vec<SerializedMessage>,
    ) -> MessageStoreResult<(Vec<SerializedMessage>, bool)> {
        let mut has_changes = false;
        let mut upcasted = Vec::with_capacity(messages.len());

        for message in messages {
            let out = self.stages.iter().try_fold(vec![message], |current, stage| {
                Self::apply_stage(stage, current, &mut has_changes)
            })?;
            upcasted.extend(out);
        }

        Ok((upcasted, has_changes))
    }

    fn apply_stage(
        stage: &Arc<dyn PayloadUpcaster>,
        messages: Vec<SerializedMessage>,
        has_changes: &mut bool,
    ) -> MessageStoreResult<Vec<SerializedMessage>> {
        let mut out = Vec::with_capacity(messages.len());

        for message in messages {
            let applies = message
                .event_type()
                .is_some_and(|event_type| stage.applies(event_type, message.headers()));
            if !applies {
                out.push(message);
                continue;
            }

            *has_changes = true;
            match stage.upcast(message)? {
                UpcastResult::One(m) => out.push(m),
                UpcastResult::Many(v) => out.extend(v),
                UpcastResult::Drop => {}
            }
        }

        Ok(out)
    }
}

impl FromIterator<Arc<dyn PayloadUpcaster>> for PayloadUpcasterChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn PayloadUpcaster>>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl Extend<Arc<dyn PayloadUpcaster>> for PayloadUpcasterChain {
    fn extend<I: IntoIterator<Item = Arc<dyn PayloadUpcaster>>>(&mut self, iter: I) {
        self.stages.extend(iter);
    }
}

/// 在委托的序列化器之前执行上抬链
pub struct UpcastingMessageSerializer<S> {
    inner: S,
    chain: Arc<PayloadUpcasterChain>,
}

impl<S> UpcastingMessageSerializer<S>
where
    S: MessageSerializer,
{
    pub fn new(inner: S, chain: Arc<PayloadUpcasterChain>) -> Self {
        Self { inner, chain }
    }
}

impl<S> MessageSerializer for UpcastingMessageSerializer<S>
where
    S: MessageSerializer,
{
    fn serialize_message(&self, message: &Message) -> MessageStoreResult<SerializedMessage> {
        self.inner.serialize_message(message)
    }

    fn unserialize_payload(&self, payload: &PayloadMap) -> MessageStoreResult<Vec<Message>> {
        if self.chain.is_empty() {
            return self.inner.unserialize_payload(payload);
        }

        let serialized = SerializedMessage::try_from(payload)?;
        let mut messages = Vec::new();

        for upcasted in self.chain.upcast_all(vec![serialized])? {
            let map = upcasted.into_map()?;
            messages.extend(self.inner.unserialize_payload(&map)?);
        }

        Ok(messages)
    }
}
