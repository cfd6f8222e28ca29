//! 基于追加式事件存储的消息仓储（message-store）
//!
//! 将事件溯源中的消息（事件载荷 + 头部）映射到事件存储的流表示：
//! - 消息模型（`message`）：载荷能力、头部约定与默认头部装饰；
//! - 序列化（`serialization`）：载荷注册表、构造式序列化器与读取路径上抬；
//! - 传输记录（`transport`）：写入存储的 `TransportEvent` 与读回时的消息工厂；
//! - 事件存储协议（`event_store`）：流名、元数据匹配、事务与内存实现；
//! - 仓储（`repository`）：持久化与按聚合/版本的惰性读取。
//!
//! 持久化、并发控制与查询求值均由被包装的事件存储负责，本 crate 只做映射。
//!
//! 典型用法：
//! 1. 用 `#[payload]` 定义事件并注册到 `PayloadRegistry`；
//! 2. 以注册表构造 `SerializablePayloadMessageFactory` 与 `ConstructingMessageSerializer`；
//! 3. 将事件存储与序列化器注入 `StreamMessageRepository`；
//! 4. 调用 `persist` 写入，`retrieve_all` 等方法读取并在结束后取得最终版本。
//!
pub mod config;
pub mod error;
pub mod event_store;
pub mod message;
pub mod repository;
pub mod serialization;
pub mod transport;

// 允许在本 crate 内部通过 ::message_store 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::message_store 路径。
extern crate self as message_store;
