//! 内存事件存储
//!
//! 以 1 为起点的流位置、元数据匹配与缓冲式事务，
//! 适用于测试与示例。
//!
use super::{EventStore, MetadataMatcher, RecordStream, StreamName, TransactionalEventStore};
use crate::{
    error::{MessageStoreError, MessageStoreResult},
    transport::{MessageData, MessageFactory, StoredMessage},
};
use async_trait::async_trait;
use bon::Builder;
use futures_util::{StreamExt, stream};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
struct StoredRow {
    message_name: String,
    data: MessageData,
}

impl StoredRow {
    fn from_stored(message: &dyn StoredMessage) -> Self {
        Self {
            message_name: message.message_name().to_string(),
            data: MessageData::from_stored(message),
        }
    }
}

type PendingAppends = Vec<(StreamName, Vec<StoredRow>)>;

/// 内存事件存储
///
/// - 流需先通过 `create` 创建，追加到不存在的流会返回 `StreamNotFound`；
/// - 读取时通过注入的 `MessageFactory` 将行数据还原为消息；
/// - 默认支持事务：事务内的追加在 `commit` 时才对读取可见；
///   提交要么全部写入，要么全部不写入。
#[derive(Builder)]
pub struct InMemoryEventStore {
    message_factory: Arc<dyn MessageFactory>,
    #[builder(default = true)]
    transactional: bool,
    #[builder(skip)]
    streams: RwLock<HashMap<StreamName, Vec<StoredRow>>>,
    /// 只在同步代码中持有，以便事务作用域在 `Drop` 中放弃事务
    #[builder(skip)]
    pending: Mutex<Option<PendingAppends>>,
}

impl InMemoryEventStore {
    pub fn new(message_factory: Arc<dyn MessageFactory>) -> Self {
        Self::builder().message_factory(message_factory).build()
    }

    pub async fn create(&self, stream_name: StreamName) -> MessageStoreResult<()> {
        let mut streams = self.streams.write().await;
        if streams.contains_key(&stream_name) {
            return Err(MessageStoreError::StreamExistsAlready {
                stream: stream_name.to_string(),
            });
        }
        streams.insert(stream_name, Vec::new());
        Ok(())
    }

    pub async fn delete(&self, stream_name: &StreamName) -> MessageStoreResult<()> {
        self.streams
            .write()
            .await
            .remove(stream_name)
            .map(|_| ())
            .ok_or_else(|| stream_not_found(stream_name))
    }

    /// 流中已提交的记录数
    pub async fn len(&self, stream_name: &StreamName) -> MessageStoreResult<usize> {
        self.streams
            .read()
            .await
            .get(stream_name)
            .map(Vec::len)
            .ok_or_else(|| stream_not_found(stream_name))
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingAppends>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stream_not_found(stream_name: &StreamName) -> MessageStoreError {
    MessageStoreError::StreamNotFound {
        stream: stream_name.to_string(),
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn has_stream(&self, stream_name: &StreamName) -> bool {
        self.streams.read().await.contains_key(stream_name)
    }

    #[instrument(skip_all, level = "debug", fields(stream = %stream_name, count = events.len()))]
    async fn append_to(
        &self,
        stream_name: &StreamName,
        events: Vec<Box<dyn StoredMessage>>,
    ) -> MessageStoreResult<()> {
        let rows: Vec<StoredRow> = events
            .iter()
            .map(|event| StoredRow::from_stored(event.as_ref()))
            .collect();

        let mut streams = self.streams.write().await;
        let stream = streams
            .get_mut(stream_name)
            .ok_or_else(|| stream_not_found(stream_name))?;

        if let Some(appends) = self.pending().as_mut() {
            debug!("buffering append until commit");
            appends.push((stream_name.clone(), rows));
            return Ok(());
        }

        stream.extend(rows);
        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(stream = %stream_name, from_number = from_number, count = ?count))]
    async fn load<'a>(
        &'a self,
        stream_name: &StreamName,
        from_number: usize,
        count: Option<usize>,
        matcher: Option<&MetadataMatcher>,
    ) -> MessageStoreResult<RecordStream<'a>> {
        let streams = self.streams.read().await;
        let stream = streams
            .get(stream_name)
            .ok_or_else(|| stream_not_found(stream_name))?;

        let rows: Vec<StoredRow> = stream
            .iter()
            .skip(from_number.saturating_sub(1))
            .filter(|row| {
                matcher.is_none_or(|matcher| {
                    row.data
                        .metadata()
                        .is_some_and(|metadata| matcher.matches(metadata))
                })
            })
            .take(count.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        drop(streams);

        debug!(matched = rows.len(), "loaded rows");

        let factory = Arc::clone(&self.message_factory);
        Ok(stream::iter(rows)
            .map(move |row| factory.create_message_from_array(&row.message_name, row.data))
            .boxed())
    }

    fn transactional(&self) -> Option<&dyn TransactionalEventStore> {
        if self.transactional { Some(self) } else { None }
    }
}

#[async_trait]
impl TransactionalEventStore for InMemoryEventStore {
    async fn begin_transaction(&self) -> MessageStoreResult<()> {
        let mut pending = self.pending();
        if pending.is_some() {
            return Err(MessageStoreError::TransactionAlreadyStarted);
        }
        *pending = Some(Vec::new());
        Ok(())
    }

    async fn commit(&self) -> MessageStoreResult<()> {
        let mut streams = self.streams.write().await;
        let mut pending = self.pending();

        // 任一目标流缺失时整体失败，缓冲保留给后续回滚
        let appends = pending
            .as_ref()
            .ok_or(MessageStoreError::TransactionNotStarted)?;
        if let Some((missing, _)) = appends
            .iter()
            .find(|(stream_name, _)| !streams.contains_key(stream_name))
        {
            return Err(stream_not_found(missing));
        }

        for (stream_name, rows) in pending.take().into_iter().flatten() {
            if let Some(stream) = streams.get_mut(&stream_name) {
                stream.extend(rows);
            }
        }
        Ok(())
    }

    async fn rollback(&self) -> MessageStoreResult<()> {
        self.pending()
            .take()
            .map(|_| ())
            .ok_or(MessageStoreError::TransactionNotStarted)
    }

    async fn in_transaction(&self) -> bool {
        self.pending().is_some()
    }

    fn abort_transaction(&self) {
        if self.pending().take().is_some() {
            debug!("aborted open transaction");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::{Operator, Transaction};
    use crate::message::{PayloadMap, SerializablePayload};
    use crate::serialization::PayloadRegistry;
    use crate::transport::{SerializablePayloadMessageFactory, TransportEvent};
    use chrono::Utc;
    use futures_util::TryStreamExt;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Noted {}

    impl SerializablePayload for Noted {
        const PAYLOAD_TYPE: &'static str = "noted";
    }

    fn store(transactional: bool) -> InMemoryEventStore {
        let mut registry = PayloadRegistry::new();
        registry.register::<Noted>().unwrap();
        InMemoryEventStore::builder()
            .message_factory(Arc::new(SerializablePayloadMessageFactory::new(Arc::new(
                registry,
            ))))
            .transactional(transactional)
            .build()
    }

    fn stream_name() -> StreamName {
        StreamName::new("test").unwrap()
    }

    fn record(aggregate_id: &str, version: u64) -> Box<dyn StoredMessage> {
        let metadata = json!({ "_aggregate_id": aggregate_id, "_aggregate_version": version });
        Box::new(
            TransportEvent::builder()
                .uuid(Uuid::new_v4())
                .message_name("noted".to_string())
                .metadata(metadata.as_object().cloned().unwrap())
                .created_at(Utc::now())
                .payload(PayloadMap::new())
                .build(),
        )
    }

    async fn loaded(
        store: &InMemoryEventStore,
        from_number: usize,
        count: Option<usize>,
        matcher: Option<&MetadataMatcher>,
    ) -> Vec<u64> {
        store
            .load(&stream_name(), from_number, count, matcher)
            .await
            .unwrap()
            .try_collect::<Vec<_>>()
            .await
            .unwrap()
            .iter()
            .map(|m| m.metadata()["_aggregate_version"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn append_requires_existing_stream() {
        let store = store(true);
        let err = store
            .append_to(&stream_name(), vec![record("a", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, MessageStoreError::StreamNotFound { .. }));

        store.create(stream_name()).await.unwrap();
        let err = store.create(stream_name()).await.unwrap_err();
        assert!(matches!(err, MessageStoreError::StreamExistsAlready { .. }));
    }

    #[tokio::test]
    async fn load_filters_by_position_matcher_and_count() {
        let store = store(false);
        store.create(stream_name()).await.unwrap();
        store
            .append_to(
                &stream_name(),
                vec![record("a", 1), record("b", 1), record("a", 2), record("a", 3)],
            )
            .await
            .unwrap();

        let only_a = MetadataMatcher::new().with_metadata_match("_aggregate_id", Operator::Equals, "a");

        assert_eq!(loaded(&store, 1, None, None).await, vec![1, 1, 2, 3]);
        assert_eq!(loaded(&store, 1, None, Some(&only_a)).await, vec![1, 2, 3]);
        assert_eq!(loaded(&store, 3, None, Some(&only_a)).await, vec![2, 3]);
        assert_eq!(loaded(&store, 1, Some(2), Some(&only_a)).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn transaction_buffers_until_commit() {
        let store = store(true);
        store.create(stream_name()).await.unwrap();
        let tx_store = store.transactional().unwrap();

        let tx = Transaction::begin(tx_store).await.unwrap();
        store
            .append_to(&stream_name(), vec![record("a", 1)])
            .await
            .unwrap();
        assert_eq!(store.len(&stream_name()).await.unwrap(), 0);
        tx.commit().await.unwrap();

        assert_eq!(store.len(&stream_name()).await.unwrap(), 1);
        assert!(!store.in_transaction().await);
    }

    #[tokio::test]
    async fn rollback_discards_buffered_appends() {
        let store = store(true);
        store.create(stream_name()).await.unwrap();

        store.begin_transaction().await.unwrap();
        let err = store.begin_transaction().await.unwrap_err();
        assert!(matches!(err, MessageStoreError::TransactionAlreadyStarted));

        store
            .append_to(&stream_name(), vec![record("a", 1)])
            .await
            .unwrap();
        store.rollback().await.unwrap();

        assert_eq!(store.len(&stream_name()).await.unwrap(), 0);
        assert!(matches!(
            store.commit().await.unwrap_err(),
            MessageStoreError::TransactionNotStarted
        ));
    }

    #[tokio::test]
    async fn commit_with_missing_stream_writes_nothing() {
        let store = store(true);
        let other = StreamName::new("other").unwrap();
        store.create(stream_name()).await.unwrap();
        store.create(other.clone()).await.unwrap();

        let tx = Transaction::begin(store.transactional().unwrap()).await.unwrap();
        store
            .append_to(&stream_name(), vec![record("a", 1)])
            .await
            .unwrap();
        store.append_to(&other, vec![record("b", 1)]).await.unwrap();
        store.delete(&other).await.unwrap();

        let err = tx.commit().await.unwrap_err();
        assert!(matches!(
            err,
            MessageStoreError::StreamNotFound { stream } if stream == "other"
        ));
        assert_eq!(store.len(&stream_name()).await.unwrap(), 0);
        assert!(!store.in_transaction().await);
    }

    #[tokio::test]
    async fn dropped_transaction_is_aborted() {
        let store = store(true);
        store.create(stream_name()).await.unwrap();

        {
            let _tx = Transaction::begin(store.transactional().unwrap()).await.unwrap();
            store
                .append_to(&stream_name(), vec![record("a", 1)])
                .await
                .unwrap();
        }

        assert!(!store.in_transaction().await);
        store
            .append_to(&stream_name(), vec![record("a", 2)])
            .await
            .unwrap();
        assert_eq!(loaded(&store, 1, None, None).await, vec![2]);
    }

    #[tokio::test]
    async fn non_transactional_store_exposes_no_transaction_view() {
        assert!(store(false).transactional().is_none());
        assert!(store(true).transactional().is_some());
    }
}
