use crate::config::load_config;
use crate::lifecycle::Lifecycle;
use crate::model::{DoneRecord, Item, Lane, ListKind};
use crate::storage::{default_location, load_store};
use crate::ui;
use anyhow::Result;
use chrono::{Local, TimeZone};

pub fn list(filter: Option<String>) -> Result<()> {
    let filter = filter.map(|raw| raw.parse::<ListKind>()).transpose()?;
    let location = default_location()?;
    let store = load_store(&location);
    for kind in [ListKind::Todo, ListKind::Ideas, ListKind::Prio, ListKind::Done] {
        if let Some(wanted) = filter {
            if wanted != kind {
                continue;
            }
        }
        println!("{}", kind.label());
        match kind {
            ListKind::Done => {
                if store.done.is_empty() {
                    println!("  (empty)");
                }
                for record in &store.done {
                    print_done(record);
                }
            }
            ListKind::Todo => print_lane(&store.todo),
            ListKind::Ideas => print_lane(&store.ideas),
            ListKind::Prio => print_lane(&store.prio),
        }
        println!();
    }
    Ok(())
}

pub fn add(text: String, list: String) -> Result<()> {
    let lane: Lane = list.parse()?;
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.add(lane, &text)? {
        let id = &lifecycle.store().lane(lane)[0].id;
        println!("Added {} to {}", id, lane.label());
    } else {
        println!("Nothing to add");
    }
    Ok(())
}

pub fn complete(id: String, list: String) -> Result<()> {
    let lane: Lane = list.parse()?;
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.complete(lane, &id)? {
        println!("Completed {}", id);
    } else {
        println!("No item {} in {}", id, lane.label());
    }
    Ok(())
}

pub fn promote(id: String) -> Result<()> {
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.promote(&id)? {
        println!("Promoted {} to prio", id);
    } else {
        println!("No item {} in todo", id);
    }
    Ok(())
}

pub fn restore(id: String) -> Result<()> {
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.restore(&id)? {
        println!("Restored {}", id);
    } else {
        println!("No done record {}", id);
    }
    Ok(())
}

pub fn remove(id: String, list: String) -> Result<()> {
    let kind: ListKind = list.parse()?;
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.remove(kind, &id)? {
        println!("Removed {} from {}", id, kind.label());
    } else {
        println!("No item {} in {}", id, kind.label());
    }
    Ok(())
}

pub fn clear_done() -> Result<()> {
    let mut lifecycle = open_lifecycle()?;
    if lifecycle.clear_done()? {
        println!("Cleared done");
    } else {
        println!("Nothing to clear");
    }
    Ok(())
}

pub fn tui(view: Option<String>) -> Result<()> {
    let lifecycle = open_lifecycle()?;
    ui::run(lifecycle, load_config(), view)
}

fn open_lifecycle() -> Result<Lifecycle> {
    let location = default_location()?;
    let store = load_store(&location);
    Ok(Lifecycle::new(store, location))
}

fn print_lane(items: &[Item]) {
    if items.is_empty() {
        println!("  (empty)");
    }
    for item in items {
        println!("  - {}: {} ({})", item.id, item.text, format_ms(item.created_at));
    }
}

fn print_done(record: &DoneRecord) {
    println!(
        "  - {}: {} (done {}, from {})",
        record.item.id,
        record.item.text,
        format_ms(record.done_at),
        record.origin.label()
    );
}

fn format_ms(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(when) => when.format("%m-%d %H:%M").to_string(),
        None => "?".to_string(),
    }
}
