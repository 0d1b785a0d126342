//! The chat display log.
//!
//! Entries are kept in insertion order and addressed by ids of the form
//! `message_<n>`. The log serializes as a JSON object whose keys appear in
//! insertion order, which is the shape the persistence layer stores.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const ID_PREFIX: &str = "message_";

/// Who authored a display-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single message shown in the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
}

#[derive(Serialize, Deserialize)]
struct EntryBody {
    role: ChatRole,
    content: String,
}

/// Insertion-ordered mapping of message id to message.
///
/// Ids are allocated from a counter that only moves forward, so removing an
/// entry never causes a later entry to reuse its id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    next_index: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding exactly one assistant message.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        let mut log = Self::new();
        log.push(ChatRole::Assistant, greeting);
        log
    }

    /// Append a message under a freshly allocated id.
    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) -> &LogEntry {
        let id = format!("{ID_PREFIX}{}", self.next_index);
        self.next_index += 1;
        self.entries.push(LogEntry {
            id,
            role,
            content: content.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Remove the most recently appended entry.
    pub fn pop_last(&mut self) -> Option<LogEntry> {
        self.entries.pop()
    }

    /// Remove the entry `n` positions before the newest one (`0` is the newest).
    pub fn remove_from_end(&mut self, n: usize) -> Option<LogEntry> {
        let index = self.entries.len().checked_sub(n + 1)?;
        Some(self.entries.remove(index))
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_loaded(&mut self, id: String, body: EntryBody) {
        let index = id
            .strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse::<u64>().ok());
        // Unparseable ids still count towards the counter so fresh ids stay unique.
        let floor = index.map(|i| i + 1).unwrap_or(self.entries.len() as u64 + 1);
        self.next_index = self.next_index.max(floor);
        self.entries.push(LogEntry {
            id,
            role: body.role,
            content: body.content,
        });
    }
}

impl Serialize for MessageLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(
                &entry.id,
                &EntryBody {
                    role: entry.role,
                    content: entry.content.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MessageLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LogVisitor;

        impl<'de> Visitor<'de> for LogVisitor {
            type Value = MessageLog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of message ids to {role, content}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MessageLog, A::Error> {
                let mut log = MessageLog::new();
                while let Some((id, body)) = access.next_entry::<String, EntryBody>()? {
                    log.insert_loaded(id, body);
                }
                Ok(log)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<MessageLog, E> {
                Ok(MessageLog::new())
            }
        }

        deserializer.deserialize_any(LogVisitor)
    }
}
