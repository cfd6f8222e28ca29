use message_store::message::SerializablePayload;
use message_store_macros::payload;

#[payload]
struct AccountOpened {
    owner: String,
}

#[payload]
struct Heartbeat;

#[payload]
#[derive(Eq)]
enum LimitChanged {
    Raised { amount: i64 },
    Lowered { amount: i64 },
}

fn main() {
    // 默认使用类型名作为载荷类型标识
    assert_eq!(AccountOpened::PAYLOAD_TYPE, "AccountOpened");
    assert_eq!(Heartbeat::PAYLOAD_TYPE, "Heartbeat");

    let opened = AccountOpened {
        owner: "alice".into(),
    };
    let map = opened.to_payload().unwrap();
    assert_eq!(AccountOpened::from_payload(map).unwrap(), opened);

    let beat = Heartbeat.to_payload().unwrap();
    assert!(beat.is_empty());
    assert_eq!(Heartbeat::from_payload(beat).unwrap(), Heartbeat);

    // 已有的 derive 会与默认派生合并
    let raised = LimitChanged::Raised { amount: 5 };
    assert!(raised == raised.clone());
    let _ = LimitChanged::Lowered { amount: 1 };
}
