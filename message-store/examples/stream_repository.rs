/// StreamMessageRepository 示例
/// 演示如何在内存事件流上持久化消息，并按聚合与版本读取
use anyhow::Result as AnyResult;
use futures_util::StreamExt;
use message_store::config::RepositoryConfig;
use message_store::event_store::{InMemoryEventStore, StreamName};
use message_store::message::{DefaultHeadersDecorator, Header, Message, MessageDecorator};
use message_store::repository::{MessageRepository, StreamMessageRepository};
use message_store::serialization::{ConstructingMessageSerializer, PayloadRegistry};
use message_store::transport::SerializablePayloadMessageFactory;
use message_store_macros::payload;
use std::sync::Arc;

// ============================================================================
// 载荷定义
// ============================================================================

#[payload(name = "account_opened")]
struct AccountOpened {
    owner: String,
}

#[payload(name = "money_deposited")]
struct MoneyDeposited {
    amount: i64,
}

#[payload(name = "money_withdrawn")]
struct MoneyWithdrawn {
    amount: i64,
}

fn describe(message: &Message) -> String {
    if let Some(opened) = message.payload::<AccountOpened>() {
        format!("开户: {}", opened.owner)
    } else if let Some(deposited) = message.payload::<MoneyDeposited>() {
        format!("存款 +{}", deposited.amount)
    } else if let Some(withdrawn) = message.payload::<MoneyWithdrawn>() {
        format!("取款 -{}", withdrawn.amount)
    } else {
        format!("未知事件 {}", message.payload_type())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AnyResult<()> {
    let mut registry = PayloadRegistry::new();
    registry
        .register::<AccountOpened>()?
        .register::<MoneyDeposited>()?
        .register::<MoneyWithdrawn>()?;
    let registry = Arc::new(registry);

    let config = RepositoryConfig::new("bank_accounts");
    let store = InMemoryEventStore::new(Arc::new(SerializablePayloadMessageFactory::new(
        registry.clone(),
    )));
    store.create(StreamName::new(config.stream_name.clone())?).await?;

    let repository = StreamMessageRepository::from_config(
        &config,
        store,
        ConstructingMessageSerializer::new(registry),
    )?;
    let decorator = DefaultHeadersDecorator::default();

    println!("=== StreamMessageRepository 示例 ===\n");

    let account_id = "account-001";
    let messages: Vec<Message> = vec![
        Message::new(AccountOpened {
            owner: "alice".to_string(),
        }),
        Message::new(MoneyDeposited { amount: 1000 }),
        Message::new(MoneyWithdrawn { amount: 300 }),
    ]
    .into_iter()
    .zip(1u64..)
    .map(|(message, version)| {
        decorator.decorate(
            message
                .with_header(Header::AGGREGATE_ROOT_ID, account_id)
                .with_header(Header::AGGREGATE_ROOT_VERSION, version),
        )
    })
    .collect();

    repository.persist(&messages).await?;
    println!("✅ 已持久化 {} 条消息\n", messages.len());

    println!("--- 读取全部消息 ---");
    let mut all = repository.retrieve_all(account_id);
    while let Some(message) = all.next().await {
        let message = message?;
        println!(
            "  v{} [{}] {}",
            message.aggregate_version().unwrap_or_default(),
            message.event_id().unwrap_or("-"),
            describe(&message)
        );
    }
    println!("最新版本: {}\n", all.last_version());

    println!("--- 读取版本 1 之后的消息 ---");
    let after = repository
        .retrieve_all_after_version(account_id, 1)
        .collect_all()
        .await?;
    for message in &after.messages {
        println!("  {}", describe(message));
    }
    println!("最新版本: {}", after.last_version);

    Ok(())
}
