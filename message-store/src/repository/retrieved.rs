//! 读取结果
//!
//! 惰性消息流，并在结束后给出最后一条消息的聚合版本。
//!
use crate::{error::MessageStoreResult, message::Message};
use futures_core::{FusedStream, Stream};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// 读取结果的惰性消息流
///
/// 每次拉取从存储读取一条记录并还原为零或多条消息。流结束后
/// `last_version` 为最后一条消息的聚合版本头部（缺失或无消息时为 0）。
/// 出现错误后流即终止。
pub struct RetrievedMessages<'a> {
    inner: BoxStream<'a, MessageStoreResult<Message>>,
    last_version: u64,
    terminated: bool,
}

/// 一次性收集的读取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved {
    pub messages: Vec<Message>,
    pub last_version: u64,
}

impl<'a> RetrievedMessages<'a> {
    pub fn new(inner: BoxStream<'a, MessageStoreResult<Message>>) -> Self {
        Self {
            inner,
            last_version: 0,
            terminated: false,
        }
    }

    /// 已产出的最后一条消息的聚合版本
    pub fn last_version(&self) -> u64 {
        self.last_version
    }

    /// 拉取全部消息并返回最终版本
    pub async fn collect_all(mut self) -> MessageStoreResult<Retrieved> {
        let mut messages = Vec::new();
        while let Some(message) = self.next().await {
            messages.push(message?);
        }

        Ok(Retrieved {
            messages,
            last_version: self.last_version,
        })
    }
}

impl Stream for RetrievedMessages<'_> {
    type Item = MessageStoreResult<Message>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(message))) => {
                this.last_version = message.aggregate_version().unwrap_or(0);
                Poll::Ready(Some(Ok(message)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.terminated = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.terminated = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for RetrievedMessages<'_> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}
