//! 基于事件流的消息仓储实现
//!
//! 写入时把消息投影为 `TransportEvent` 并在事务内追加；
//! 读取时按聚合元数据匹配加载并惰性还原。
//!
use super::{MessageRepository, RetrievedMessages, metadata_key};
use crate::{
    config::RepositoryConfig,
    error::{MessageStoreError, MessageStoreResult},
    event_store::{EventStore, MetadataMatcher, Operator, StreamName, Transaction},
    message::{Clock, Header, Message, SystemClock},
    serialization::{MessageSerializer, SerializedMessage},
    transport::{MetadataMap, StoredMessage, TransportEvent},
};
use async_trait::async_trait;
use bon::Builder;
use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// 基于单个事件流的消息仓储
///
/// - 写入：序列化消息、投影元数据、组装 `TransportEvent`，一次追加全部记录；
///   存储支持事务时在事务作用域内追加，失败即回滚；
/// - 读取：以元数据匹配器从位置 1 开始加载，逐条还原为消息。
#[derive(Builder)]
pub struct StreamMessageRepository<S, Z> {
    event_store: S,
    serializer: Z,
    stream_name: StreamName,
    /// 加载起始位置（从 1 开始）
    #[builder(default = 1)]
    load_from: usize,
    #[builder(default = default_clock())]
    clock: Arc<dyn Clock>,
}

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

impl<S, Z> StreamMessageRepository<S, Z>
where
    S: EventStore,
    Z: MessageSerializer,
{
    pub fn from_config(
        config: &RepositoryConfig,
        event_store: S,
        serializer: Z,
    ) -> MessageStoreResult<Self> {
        Ok(Self::builder()
            .event_store(event_store)
            .serializer(serializer)
            .stream_name(StreamName::new(config.stream_name.clone())?)
            .load_from(config.load_from)
            .build())
    }

    pub fn stream_name(&self) -> &StreamName {
        &self.stream_name
    }

    pub fn event_store(&self) -> &S {
        &self.event_store
    }

    fn to_transport_event(&self, message: &Message) -> MessageStoreResult<TransportEvent> {
        let mut serialized = self.serializer.serialize_message(message)?;
        let message_name = message.payload_type().to_string();
        let metadata = project_metadata(&serialized, &message_name)?;

        let uuid = match serialized.event_id() {
            Some(event_id) => Uuid::parse_str(event_id)?,
            None => {
                let uuid = Uuid::new_v4();
                serialized.insert_header(Header::EVENT_ID, uuid.to_string());
                uuid
            }
        };

        let created_at = match message.time_of_recording()? {
            Some(recorded_at) => recorded_at,
            None => self.clock.now(),
        };

        Ok(TransportEvent::builder()
            .uuid(uuid)
            .message_name(message_name)
            .metadata(metadata)
            .created_at(created_at)
            .payload(serialized.into_map()?)
            .build())
    }

    async fn append(&self, events: Vec<Box<dyn StoredMessage>>) -> MessageStoreResult<()> {
        let Some(store) = self.event_store.transactional() else {
            return self.event_store.append_to(&self.stream_name, events).await;
        };

        let transaction = Transaction::begin(store).await?;
        if let Err(err) = store.append_to(&self.stream_name, events).await {
            if let Err(rollback_err) = transaction.rollback().await {
                warn!(error = %rollback_err, "rollback after failed append did not succeed");
            }
            return Err(err);
        }

        transaction.commit().await
    }

    fn yield_messages_for_result(&self, matcher: Option<MetadataMatcher>) -> RetrievedMessages<'_> {
        let records = stream::once(async move {
            self.event_store
                .load(&self.stream_name, self.load_from, None, matcher.as_ref())
                .await
        })
        .try_flatten();

        let messages = records
            .map(|record| record.and_then(|record| self.unserialize_record(record)))
            .map_ok(|messages| stream::iter(messages.into_iter().map(Ok::<_, MessageStoreError>)))
            .try_flatten();

        RetrievedMessages::new(messages.boxed())
    }

    fn unserialize_record(&self, record: Box<dyn StoredMessage>) -> MessageStoreResult<Vec<Message>> {
        let found = record.type_name();
        let event = record
            .into_any()
            .downcast::<TransportEvent>()
            .map_err(|_| MessageStoreError::TypeMismatch {
                expected: std::any::type_name::<TransportEvent>().to_string(),
                found: found.to_string(),
            })?;

        self.serializer.unserialize_payload(event.payload())
    }
}

/// 将消息头部投影为存储层元数据
///
/// 聚合 ID 与聚合版本各自只取决于对应头部是否存在。聚合 ID 统一写为
/// 字符串，与按 ID 读取时的匹配值一致；版本统一写为数字，以便按数值比较。
fn project_metadata(
    serialized: &SerializedMessage,
    message_name: &str,
) -> MessageStoreResult<MetadataMap> {
    let mut metadata = MetadataMap::new();
    metadata.insert(
        metadata_key::AGGREGATE_TYPE.to_string(),
        Value::from(message_name),
    );

    if let Some(aggregate_id) = serialized.header(Header::AGGREGATE_ROOT_ID) {
        let aggregate_id = match aggregate_id {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            other => {
                return Err(MessageStoreError::InvalidValue {
                    reason: format!("aggregate root id must be a string or number, got {other}"),
                });
            }
        };
        metadata.insert(
            metadata_key::AGGREGATE_ID.to_string(),
            Value::from(aggregate_id),
        );
    }

    if let Some(version) = serialized.header(Header::AGGREGATE_ROOT_VERSION) {
        let version = match version {
            Value::String(s) => s.parse::<u64>().map(Value::from).unwrap_or_else(|_| version.clone()),
            other => other.clone(),
        };
        metadata.insert(metadata_key::AGGREGATE_VERSION.to_string(), version);
    }

    Ok(metadata)
}

#[async_trait]
impl<S, Z> MessageRepository for StreamMessageRepository<S, Z>
where
    S: EventStore,
    Z: MessageSerializer,
{
    #[instrument(skip_all, level = "debug", fields(count = messages.len()))]
    async fn persist(&self, messages: &[Message]) -> MessageStoreResult<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let events = messages
            .iter()
            .map(|message| {
                self.to_transport_event(message)
                    .map(|event| Box::new(event) as Box<dyn StoredMessage>)
            })
            .collect::<MessageStoreResult<Vec<_>>>()?;

        debug!(stream = %self.stream_name, "appending transport events");
        self.append(events).await
    }

    fn retrieve_all<'a>(&'a self, aggregate_id: &str) -> RetrievedMessages<'a> {
        let matcher = MetadataMatcher::new().with_metadata_match(
            metadata_key::AGGREGATE_ID,
            Operator::Equals,
            aggregate_id,
        );

        self.yield_messages_for_result(Some(matcher))
    }

    fn retrieve_all_after_version<'a>(
        &'a self,
        aggregate_id: &str,
        version: u64,
    ) -> RetrievedMessages<'a> {
        let matcher = MetadataMatcher::new()
            .with_metadata_match(metadata_key::AGGREGATE_ID, Operator::Equals, aggregate_id)
            .with_metadata_match(
                metadata_key::AGGREGATE_VERSION,
                Operator::GreaterThan,
                version,
            );

        self.yield_messages_for_result(Some(matcher))
    }

    fn retrieve_everything(&self) -> RetrievedMessages<'_> {
        self.yield_messages_for_result(None)
    }
}
