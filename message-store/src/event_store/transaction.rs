//! 事务作用域
//!
use super::TransactionalEventStore;
use crate::error::MessageStoreResult;
use tracing::warn;

/// 事务作用域：开启后必须以 `commit` 或 `rollback` 结束
///
/// `commit` 失败时会尝试回滚，并返回提交时的错误。
/// 未结束即被丢弃（例如调用方取消了 future）时同步放弃事务并记录告警。
pub struct Transaction<'a> {
    store: &'a dyn TransactionalEventStore,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub async fn begin(store: &'a dyn TransactionalEventStore) -> MessageStoreResult<Self> {
        store.begin_transaction().await?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    pub async fn commit(mut self) -> MessageStoreResult<()> {
        self.finished = true;
        if let Err(err) = self.store.commit().await {
            if self.store.in_transaction().await
                && let Err(rollback_err) = self.store.rollback().await
            {
                warn!(error = %rollback_err, "rollback after failed commit did not succeed");
            }
            return Err(err);
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> MessageStoreResult<()> {
        self.finished = true;
        self.store.rollback().await
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("transaction dropped before commit or rollback, aborting");
            self.store.abort_transaction();
        }
    }
}
