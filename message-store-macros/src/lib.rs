use proc_macro::TokenStream;

mod derive_utils;
mod payload;

/// 载荷宏
/// - 合并/追加派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 自动实现 `::message_store::message::SerializablePayload`
/// - 参数：`#[payload(name = "...")]` 指定载荷类型标识，默认使用类型名
///
/// ```ignore
/// #[payload(name = "order.placed")]
/// struct OrderPlaced {
///     order_id: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn payload(attr: TokenStream, item: TokenStream) -> TokenStream {
    payload::expand(attr, item)
}
