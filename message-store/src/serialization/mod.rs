//! 消息序列化（serialization）
//!
//! - `SerializedMessage`：消息在存储层的映射形态（`headers` + `payload`）；
//! - `PayloadRegistry`：载荷类型标识到解码函数的注册表，注册时即完成能力校验；
//! - `MessageSerializer`/`ConstructingMessageSerializer`：消息与映射形态之间的转换；
//! - `PayloadUpcaster`/`UpcastingMessageSerializer`：读取路径上的载荷上抬，
//!   一条存储记录可以还原出零条或多条消息。
//!
mod registry;
mod serialized_message;
mod serializer;
mod upcaster;

pub use registry::PayloadRegistry;
pub use serialized_message::SerializedMessage;
pub use serializer::{ConstructingMessageSerializer, MessageSerializer};
pub use upcaster::{PayloadUpcaster, PayloadUpcasterChain, UpcastResult, UpcastingMessageSerializer};
