use crate::model::{now_ms, DoneRecord, IdGen, Item, Lane, ListKind, Store};
use crate::storage::{save_store, StoreLocation};
use anyhow::Result;
use log::debug;

/// Sole owner and mutator of the list store. Every successful operation
/// writes the whole snapshot and bumps the revision counter the views
/// watch; operations addressing ids or text that cannot be acted on are
/// silent no-ops.
pub struct Lifecycle {
    store: Store,
    location: StoreLocation,
    ids: IdGen,
    revision: u64,
}

impl Lifecycle {
    pub fn new(store: Store, location: StoreLocation) -> Self {
        Lifecycle {
            store,
            location,
            ids: IdGen::new(),
            revision: 0,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add(&mut self, lane: Lane, text: &str) -> Result<bool> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        let item = Item {
            id: self.ids.next_id(),
            text: trimmed.to_string(),
            created_at: now_ms(),
        };
        debug_assert!(!self.store.contains_id(&item.id));
        self.store.lane_mut(lane).insert(0, item);
        self.committed("add", lane.label())
    }

    pub fn complete(&mut self, lane: Lane, id: &str) -> Result<bool> {
        let Some(pos) = self.store.find_in_lane(lane, id) else {
            return Ok(false);
        };
        let item = self.store.lane_mut(lane).remove(pos);
        self.store.done.insert(
            0,
            DoneRecord {
                item,
                done_at: now_ms(),
                origin: lane,
            },
        );
        self.committed("complete", lane.label())
    }

    pub fn promote(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.store.find_in_lane(Lane::Todo, id) else {
            return Ok(false);
        };
        let item = self.store.todo.remove(pos);
        self.store.prio.insert(0, item);
        self.committed("promote", "todo")
    }

    pub fn restore(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.store.find_in_done(id) else {
            return Ok(false);
        };
        let record = self.store.done.remove(pos);
        let origin = record.origin;
        self.store.lane_mut(origin).insert(0, record.item);
        self.committed("restore", origin.label())
    }

    pub fn remove(&mut self, list: ListKind, id: &str) -> Result<bool> {
        let before;
        let after;
        match list {
            ListKind::Done => {
                before = self.store.done.len();
                self.store.done.retain(|record| record.item.id != id);
                after = self.store.done.len();
            }
            ListKind::Todo | ListKind::Ideas | ListKind::Prio => {
                let lane = match list {
                    ListKind::Todo => Lane::Todo,
                    ListKind::Ideas => Lane::Ideas,
                    _ => Lane::Prio,
                };
                let entries = self.store.lane_mut(lane);
                before = entries.len();
                entries.retain(|item| item.id != id);
                after = entries.len();
            }
        }
        if before == after {
            return Ok(false);
        }
        self.committed("remove", list.label())
    }

    pub fn edit_text(&mut self, lane: Lane, id: &str, new_text: &str) -> Result<bool> {
        let Some(pos) = self.store.find_in_lane(lane, id) else {
            return Ok(false);
        };
        self.store.lane_mut(lane)[pos].text = new_text.trim().to_string();
        self.committed("edit", lane.label())
    }

    pub fn clear_done(&mut self) -> Result<bool> {
        if self.store.done.is_empty() {
            return Ok(false);
        }
        self.store.done.clear();
        self.committed("clear", "done")
    }

    fn committed(&mut self, op: &str, list: &str) -> Result<bool> {
        save_store(&self.location, &self.store)?;
        self.revision += 1;
        debug!("{op} on {list}, revision {}", self.revision);
        Ok(true)
    }
}
