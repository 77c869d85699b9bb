use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

/// Name the board uses when it announces joins and leaves.
pub const ADMIN_NAME: &str = "管理人";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
}

impl Sender {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn admin() -> Self {
        Self::new(ADMIN_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// The whole board. Stored as a single JSON object and rewritten in full
/// on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub senders: Vec<Sender>,
}

/// A list stored as `null` reads back as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatDocument {
    /// Append a message from `sender`.
    pub fn post(&mut self, sender: impl Into<String>, message: impl Into<String>, timestamp: i64) {
        self.messages.push(Message {
            sender: Sender::new(sender),
            message: message.into(),
            timestamp,
        });
    }

    /// Register `name` as a participant and announce it.
    /// Names are not deduplicated.
    pub fn join(&mut self, name: &str, timestamp: i64) {
        self.senders.push(Sender::new(name));
        self.announce(format!("{}さんが参加しました", name), timestamp);
    }

    /// Announce that `name` left and drop every participant with that name.
    pub fn leave(&mut self, name: &str, timestamp: i64) {
        self.announce(format!("{}さんが退出しました", name), timestamp);
        self.senders.retain(|s| s.name != name);
    }

    pub fn senders_newest_first(&self) -> impl Iterator<Item = &Sender> {
        self.senders.iter().rev()
    }

    pub fn messages_newest_first(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev()
    }

    fn announce(&mut self, text: String, timestamp: i64) {
        self.messages.push(Message {
            sender: Sender::admin(),
            message: text,
            timestamp,
        });
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
