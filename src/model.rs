use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type ItemId = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DoneRecord {
    #[serde(flatten)]
    pub item: Item,
    #[serde(rename = "doneAt")]
    pub done_at: i64,
    #[serde(default, deserialize_with = "lane_or_todo")]
    pub origin: Lane,
}

/// The three lists that hold open items. Doubles as the origin tag on a
/// done record; anything unrecognized in persisted data decodes as `Todo`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    #[default]
    Todo,
    Ideas,
    Prio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Todo,
    Ideas,
    Prio,
    Done,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("unknown list: {0} (expected todo, ideas, prio or done)")]
    UnknownList(String),
}

impl Lane {
    pub fn label(&self) -> &'static str {
        match self {
            Lane::Todo => "todo",
            Lane::Ideas => "ideas",
            Lane::Prio => "prio",
        }
    }
}

impl FromStr for Lane {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Lane::Todo),
            "ideas" => Ok(Lane::Ideas),
            "prio" => Ok(Lane::Prio),
            other => Err(StoreError::UnknownList(other.to_string())),
        }
    }
}

impl ListKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Todo => "todo",
            ListKind::Ideas => "ideas",
            ListKind::Prio => "prio",
            ListKind::Done => "done",
        }
    }
}

impl From<Lane> for ListKind {
    fn from(lane: Lane) -> Self {
        match lane {
            Lane::Todo => ListKind::Todo,
            Lane::Ideas => ListKind::Ideas,
            Lane::Prio => ListKind::Prio,
        }
    }
}

impl FromStr for ListKind {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("done") {
            return Ok(ListKind::Done);
        }
        Lane::from_str(raw).map(ListKind::from)
    }
}

fn lane_or_todo<'de, D>(de: D) -> Result<Lane, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(de).unwrap_or_default();
    Ok(Lane::from_str(&raw).unwrap_or_default())
}

/// The four ordered lists. Newest entries sit at the front; items move
/// between lists, they are never copied, so an id lives in at most one
/// list at any time.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Store {
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub todo: Vec<Item>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub ideas: Vec<Item>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub prio: Vec<Item>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub done: Vec<DoneRecord>,
}

fn vec_or_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(de).unwrap_or(serde_json::Value::Null);
    match value {
        serde_json::Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

impl Store {
    pub fn lane(&self, lane: Lane) -> &[Item] {
        match lane {
            Lane::Todo => &self.todo,
            Lane::Ideas => &self.ideas,
            Lane::Prio => &self.prio,
        }
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut Vec<Item> {
        match lane {
            Lane::Todo => &mut self.todo,
            Lane::Ideas => &mut self.ideas,
            Lane::Prio => &mut self.prio,
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.todo.iter().any(|item| item.id == id)
            || self.ideas.iter().any(|item| item.id == id)
            || self.prio.iter().any(|item| item.id == id)
            || self.done.iter().any(|record| record.item.id == id)
    }

    pub fn find_in_lane(&self, lane: Lane, id: &str) -> Option<usize> {
        self.lane(lane).iter().position(|item| item.id == id)
    }

    pub fn find_in_done(&self, id: &str) -> Option<usize> {
        self.done.iter().position(|record| record.item.id == id)
    }
}

/// Hands out process-unique opaque tokens: a random alphanumeric prefix
/// joined with a monotonically increasing counter.
#[derive(Debug, Default)]
pub struct IdGen {
    counter: u64,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { counter: 0 }
    }

    pub fn next_id(&mut self) -> ItemId {
        self.counter += 1;
        let prefix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!("{}{:03x}", prefix, self.counter)
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_within_a_process() {
        let mut ids = IdGen::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(ids.next_id()));
        }
    }

    #[test]
    fn lane_parses_known_names_and_rejects_others() {
        assert_eq!("todo".parse::<Lane>().unwrap(), Lane::Todo);
        assert_eq!(" Prio ".parse::<Lane>().unwrap(), Lane::Prio);
        assert!("done".parse::<Lane>().is_err());
        assert!("super".parse::<Lane>().is_err());
        assert_eq!("done".parse::<ListKind>().unwrap(), ListKind::Done);
    }

    #[test]
    fn done_record_round_trips_with_wire_field_names() {
        let record = DoneRecord {
            item: Item {
                id: "abc123".into(),
                text: "water the plants".into(),
                created_at: 1_700_000_000_000,
            },
            done_at: 1_700_000_100_000,
            origin: Lane::Ideas,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(json["doneAt"], 1_700_000_100_000_i64);
        assert_eq!(json["origin"], "ideas");

        let back: DoneRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn unrecognized_origin_decodes_as_todo() {
        let raw = serde_json::json!({
            "id": "x1",
            "text": "t",
            "createdAt": 1,
            "doneAt": 2,
            "origin": "super"
        });
        let record: DoneRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.origin, Lane::Todo);

        let missing = serde_json::json!({
            "id": "x2",
            "text": "t",
            "createdAt": 1,
            "doneAt": 2
        });
        let record: DoneRecord = serde_json::from_value(missing).unwrap();
        assert_eq!(record.origin, Lane::Todo);
    }

    #[test]
    fn non_array_store_fields_decode_as_empty() {
        let raw = serde_json::json!({
            "todo": [{ "id": "a", "text": "keep", "createdAt": 5 }],
            "ideas": 42,
            "prio": "nope",
            "done": { "id": "b" }
        });
        let store: Store = serde_json::from_value(raw).unwrap();
        assert_eq!(store.todo.len(), 1);
        assert!(store.ideas.is_empty());
        assert!(store.prio.is_empty());
        assert!(store.done.is_empty());
    }
}
