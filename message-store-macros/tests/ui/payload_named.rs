use message_store::message::{Message, SerializablePayload};
use message_store_macros::payload;

#[payload(name = "order.placed")]
#[serde(rename_all = "camelCase")]
struct OrderPlaced {
    order_id: String,
    line_count: u32,
}

fn main() {
    assert_eq!(OrderPlaced::PAYLOAD_TYPE, "order.placed");

    let placed = OrderPlaced {
        order_id: "o-1".into(),
        line_count: 2,
    };
    let map = placed.to_payload().unwrap();
    assert!(map.contains_key("orderId"));

    let message = Message::new(placed.clone());
    assert_eq!(message.payload_type(), "order.placed");
    assert_eq!(message.payload::<OrderPlaced>(), Some(&placed));
}
