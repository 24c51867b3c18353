use super::{
    as_address, as_string, as_uint, first, uint, ActionParams, BotAction, ExecutionResult,
    QueryResult,
};
use crate::{contract::ContractClient, error::Error, Result};
use alloy::{dyn_abi::DynSolValue, primitives::Address};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, Utc};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{error, info};

/// Longest message submitted unmodified, in characters.
pub const MAX_MESSAGE_LEN: usize = 200;
const ELLIPSIS: &str = "...";

pub const RANDOM_MESSAGES: [&str; 10] = [
    "Tea is the elixir of life!",
    "Just brewed some fresh oolong",
    "Green tea has many health benefits",
    "Tea time is the best time",
    "Herbal tea for relaxation",
    "The art of tea brewing is ancient",
    "Tea leaves tell stories",
    "A cup of tea solves everything",
    "Tea varieties are endless",
    "Tea culture connects people worldwide",
];

pub const MESSAGE_TEMPLATES: [&str; 5] = [
    "Brewing tea at {time}",
    "Tea session started {time}",
    "Enjoying tea at {time}",
    "Tea temperature perfect at {time}",
    "Sharing tea thoughts {time}",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Address,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Cuts `message` to [`MAX_MESSAGE_LEN`] characters, ending in an ellipsis, if it is longer.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_LEN {
        return message.to_owned();
    }
    let keep = MAX_MESSAGE_LEN - ELLIPSIS.len();
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Picks a fixed phrase or, with equal probability, a template stamped with `time`.
pub fn random_message_at<R: Rng + ?Sized>(rng: &mut R, time: NaiveTime) -> String {
    if rng.gen_bool(0.5) {
        RANDOM_MESSAGES[rng.gen_range(0..RANDOM_MESSAGES.len())].to_owned()
    } else {
        let template = MESSAGE_TEMPLATES[rng.gen_range(0..MESSAGE_TEMPLATES.len())];
        template.replace("{time}", &time.format("%-I:%M:%S %p").to_string())
    }
}

/// Adapter for the chat contract.
pub struct SimpleChat {
    contract: Arc<dyn ContractClient>,
}

impl SimpleChat {
    pub fn new(contract: Arc<dyn ContractClient>) -> Self {
        Self { contract }
    }

    /// Random message stamped with the current local time.
    pub fn generate_random_message<R: Rng + ?Sized>(rng: &mut R) -> String {
        random_message_at(rng, Local::now().time())
    }

    /// Posts `message`, truncating it first if it is too long.
    pub async fn send_message(&self, message: &str) -> ExecutionResult {
        let message = truncate_message(message);
        match self
            .contract
            .submit("sendMessage", &[DynSolValue::String(message.clone())])
            .await
        {
            Ok(tx_hash) => {
                info!("Message sent - TX: {tx_hash}");
                ExecutionResult::Success {
                    tx_hash,
                    params: ActionParams::Chat { message },
                }
            }
            Err(e) => {
                error!("Failed to send message: {e}");
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    async fn query_count(&self) -> Result<u64> {
        let out = self.contract.read("getMessageCount", &[]).await?;
        let count = as_uint("getMessageCount", first("getMessageCount", &out)?)?;
        u64::try_from(count).map_err(|e| Error::decode("getMessageCount", e.to_string()))
    }

    pub async fn message_count(&self) -> QueryResult<u64> {
        self.query_count().await.map_err(|e| {
            error!("Failed to get message count: {e}");
            e.into()
        })
    }

    async fn query_message(&self, index: u64) -> Result<ChatMessage> {
        let out = self.contract.read("messages", &[uint(index)]).await?;
        // a struct getter may decode as one tuple or as flat outputs
        let fields = match out.as_slice() {
            [DynSolValue::Tuple(fields)] => fields.as_slice(),
            fields => fields,
        };
        let [sender, content, timestamp] = fields else {
            return Err(Error::decode(
                "messages",
                format!("expected 3 fields, got {}", fields.len()),
            ));
        };
        let secs = as_uint("messages", timestamp)?;
        let secs = i64::try_from(secs).map_err(|e| Error::decode("messages", e.to_string()))?;
        Ok(ChatMessage {
            sender: as_address("messages", sender)?,
            content: as_string("messages", content)?,
            timestamp: DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| Error::decode("messages", "timestamp out of range"))?,
        })
    }

    /// The last `count` messages, newest first.
    pub async fn read_last_messages(&self, count: u64) -> QueryResult<Vec<ChatMessage>> {
        let res = async {
            let total = self.query_count().await?;
            let start = total.saturating_sub(count);
            let mut messages = vec![];
            for idx in (start..total).rev() {
                messages.push(self.query_message(idx).await?);
            }
            Ok::<_, Error>(messages)
        }
        .await;
        res.map_err(|e| {
            error!("Failed to read messages: {e}");
            e.into()
        })
    }
}

#[async_trait]
impl BotAction for SimpleChat {
    async fn execute(&self, rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult> {
        let message = Self::generate_random_message(rng);
        Ok(self.send_message(&message).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockContract;
    use alloy::primitives::U256;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(mock: MockContract) -> (SimpleChat, Arc<MockContract>) {
        let mock = Arc::new(mock);
        (SimpleChat::new(mock.clone()), mock)
    }

    fn submitted(mock: &MockContract) -> String {
        mock.call_args("sendMessage")[0][0]
            .as_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn long_message_is_truncated() {
        let (chat, mock) = setup(MockContract::new("SimpleChat"));
        let long = "a".repeat(250);
        let res = chat.send_message(&long).await;
        assert!(res.is_success());

        let sent = submitted(&mock);
        assert_eq!(sent.chars().count(), 200);
        assert_eq!(sent, format!("{}...", "a".repeat(197)));
    }

    #[tokio::test]
    async fn short_message_is_unmodified() {
        for len in [0, 1, 199, 200] {
            let (chat, mock) = setup(MockContract::new("SimpleChat"));
            let msg = "b".repeat(len);
            chat.send_message(&msg).await;
            assert_eq!(submitted(&mock), msg);
        }
    }

    #[test]
    fn truncation_counts_characters() {
        let msg = "茶".repeat(201);
        let truncated = truncate_message(&msg);
        assert_eq!(truncated.chars().count(), 200);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn random_messages_come_from_both_sources() {
        let mut rng = StdRng::seed_from_u64(5);
        let time = NaiveTime::from_hms_opt(15, 4, 5).unwrap();
        let (mut fixed, mut templated) = (0, 0);
        for _ in 0..200 {
            let msg = random_message_at(&mut rng, time);
            if RANDOM_MESSAGES.contains(&msg.as_str()) {
                fixed += 1;
            } else {
                assert!(msg.contains("3:04:05 PM"), "{msg}");
                assert!(!msg.contains("{time}"));
                templated += 1;
            }
        }
        assert!(fixed > 50 && templated > 50);
    }

    #[tokio::test]
    async fn submission_error_becomes_failure() {
        let (chat, _mock) =
            setup(MockContract::new("SimpleChat").with_submit_failure("sendMessage", "underpriced"));
        match chat.send_message("hello").await {
            ExecutionResult::Failed { reason } => assert!(reason.contains("underpriced")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reads_last_messages_newest_first() {
        let sender = Address::repeat_byte(0x77);
        let (chat, mock) = setup(
            MockContract::new("SimpleChat")
                .with_read("getMessageCount", vec![uint(5)])
                .with_read_fn("messages", move |args| {
                    let (idx, _) = args[0].as_uint().unwrap();
                    Ok(vec![DynSolValue::Tuple(vec![
                        DynSolValue::Address(sender),
                        DynSolValue::String(format!("msg {idx}")),
                        DynSolValue::Uint(U256::from(1_700_000_000u64) + idx, 256),
                    ])])
                }),
        );
        let messages = chat.read_last_messages(2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "msg 4");
        assert_eq!(messages[1].content, "msg 3");
        assert_eq!(messages[0].sender, sender);
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_004);
        assert_eq!(mock.call_count("messages"), 2);

        let all = chat.read_last_messages(10).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn malformed_message_is_query_failure() {
        let (chat, _mock) = setup(
            MockContract::new("SimpleChat")
                .with_read("getMessageCount", vec![uint(1)])
                .with_read("messages", vec![DynSolValue::Bool(true)]),
        );
        assert!(chat.read_last_messages(1).await.is_err());
        assert_eq!(chat.message_count().await.unwrap(), 1);
    }
}
