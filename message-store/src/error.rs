//! 统一错误定义
//!
//! 覆盖序列化/上抬、载荷注册、事件存储与事务等最小必要集合，
//! 存储后端的错误原样透传，由调用方观察与处理。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MessageStoreError {
    // --- 序列化/上抬 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("upcast failed: type={payload_type}, stage={stage:?}, reason={reason}")]
    UpcastFailed {
        payload_type: String,
        stage: Option<&'static str>,
        reason: String,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 载荷注册/消息工厂 ---
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("payload type already registered: {payload_type}")]
    AlreadyRegistered { payload_type: String },

    // --- 事件存储 ---
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },
    #[error("stream exists already: {stream}")]
    StreamExistsAlready { stream: String },
    #[error("transaction already started")]
    TransactionAlreadyStarted,
    #[error("transaction not started")]
    TransactionNotStarted,
    #[error("event store error: {0}")]
    EventStore(#[from] anyhow::Error),
}

/// 统一 Result 类型别名
pub type MessageStoreResult<T> = Result<T, MessageStoreError>;

impl From<uuid::Error> for MessageStoreError {
    fn from(err: uuid::Error) -> Self {
        MessageStoreError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for MessageStoreError {
    fn from(err: chrono::ParseError) -> Self {
        MessageStoreError::Parse {
            reason: err.to_string(),
        }
    }
}
