//! 载荷注册表
//!
use crate::{
    error::{MessageStoreError, MessageStoreResult},
    message::{Event, PayloadMap, SerializablePayload},
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DecodeFn = Arc<dyn Fn(PayloadMap) -> MessageStoreResult<Arc<dyn Event>> + Send + Sync>;

enum Entry {
    /// 已知类型，但不具备载荷编解码能力
    Declared,
    Payload(DecodeFn),
}

/// 载荷注册表：按类型标识解析解码函数
///
/// 通过 `register` 注册的类型在编译期即满足 `SerializablePayload`；
/// `declare` 仅声明类型名（例如同一命名空间下的命令类型），解析时会被拒绝。
#[derive(Default)]
pub struct PayloadRegistry {
    entries: HashMap<String, Entry>,
}

impl PayloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册可序列化载荷
    pub fn register<P>(&mut self) -> MessageStoreResult<&mut Self>
    where
        P: SerializablePayload,
    {
        let decode: DecodeFn = Arc::new(|payload: PayloadMap| -> MessageStoreResult<Arc<dyn Event>> {
            let event = P::from_payload(payload)?;
            Ok(Arc::new(event) as Arc<dyn Event>)
        });

        self.insert(P::PAYLOAD_TYPE, Entry::Payload(decode))
    }

    /// 声明一个已知但不可序列化的类型名
    pub fn declare(&mut self, type_name: impl Into<String>) -> MessageStoreResult<&mut Self> {
        self.insert(type_name, Entry::Declared)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// 校验类型名可解析为可序列化载荷
    pub fn ensure_payload(&self, type_name: &str) -> MessageStoreResult<()> {
        self.resolve(type_name).map(|_| ())
    }

    pub fn decode(&self, type_name: &str, payload: PayloadMap) -> MessageStoreResult<Arc<dyn Event>> {
        let decode = self.resolve(type_name)?;
        decode(payload)
    }

    fn resolve(&self, type_name: &str) -> MessageStoreResult<&DecodeFn> {
        match self.entries.get(type_name) {
            Some(Entry::Payload(decode)) => Ok(decode),
            Some(Entry::Declared) => Err(MessageStoreError::InvalidArgument {
                reason: format!("message type {type_name} does not implement SerializablePayload"),
            }),
            None => Err(MessageStoreError::InvalidArgument {
                reason: format!("given message name is not a known type: {type_name}"),
            }),
        }
    }

    fn insert(&mut self, type_name: impl Into<String>, entry: Entry) -> MessageStoreResult<&mut Self> {
        let type_name = type_name.into();
        if self.entries.contains_key(&type_name) {
            return Err(MessageStoreError::AlreadyRegistered {
                payload_type: type_name,
            });
        }
        self.entries.insert(type_name, entry);
        Ok(self)
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("PayloadRegistry")
            .field("types", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use message_store_macros::payload;

    #[payload(name = "shipped")]
    struct Shipped {
        parcel: String,
    }

    #[test]
    fn decodes_registered_payload() {
        let mut registry = PayloadRegistry::new();
        registry.register::<Shipped>().unwrap();

        let payload = Shipped {
            parcel: "p-1".into(),
        }
        .to_payload()
        .unwrap();
        let event = registry.decode("shipped", payload).unwrap();

        assert!(event.eq_event(&Shipped {
            parcel: "p-1".into()
        }));
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut registry = PayloadRegistry::new();
        registry.register::<Shipped>().unwrap();

        let err = registry.declare("shipped").unwrap_err();
        assert!(matches!(
            err,
            MessageStoreError::AlreadyRegistered { payload_type } if payload_type == "shipped"
        ));
    }

    #[test]
    fn unknown_and_declared_types_are_invalid_arguments() {
        let mut registry = PayloadRegistry::new();
        registry.declare("PlainCommand").unwrap();

        let err = registry.ensure_payload("Foo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: given message name is not a known type: Foo"
        );

        let err = registry.ensure_payload("PlainCommand").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: message type PlainCommand does not implement SerializablePayload"
        );
    }
}
