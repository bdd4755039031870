use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dialdash", version, about = "Personal terminal dashboard with a rotary view dial")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List items (todo, ideas, prio, done), or everything
    List {
        /// Only show one list
        #[arg(long)]
        list: Option<String>,
    },
    /// Add an item to a list
    Add {
        /// Item text
        text: String,
        /// Target list: todo, ideas or prio
        #[arg(long, default_value = "todo")]
        list: String,
    },
    /// Mark an item as done
    Complete {
        /// Item id
        id: String,
        /// List the item lives in: todo, ideas or prio
        #[arg(long, default_value = "todo")]
        list: String,
    },
    /// Move a todo item to the active-priority list
    Promote {
        /// Item id
        id: String,
    },
    /// Move a done item back to the list it came from
    Restore {
        /// Item id
        id: String,
    },
    /// Delete an item
    Remove {
        /// Item id
        id: String,
        /// List the item lives in: todo, ideas, prio or done
        #[arg(long)]
        list: String,
    },
    /// Delete every done record
    ClearDone,
    /// Launch the interactive dashboard
    Tui {
        /// Start on a view: weather, news, todo, ideas, done or timer
        #[arg(long)]
        view: Option<String>,
    },
}
