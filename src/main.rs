use anyhow::Result;
use clap::Parser;
use dialdash::{cli, commands, logging, storage};

fn main() -> Result<()> {
    let _log_handle = storage::data_dir()
        .and_then(|dir| logging::init(&dir.join("logs")))
        .ok();
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui { view: None });
    match command {
        cli::Command::List { list } => commands::list(list),
        cli::Command::Add { text, list } => commands::add(text, list),
        cli::Command::Complete { id, list } => commands::complete(id, list),
        cli::Command::Promote { id } => commands::promote(id),
        cli::Command::Restore { id } => commands::restore(id),
        cli::Command::Remove { id, list } => commands::remove(id, list),
        cli::Command::ClearDone => commands::clear_done(),
        cli::Command::Tui { view } => commands::tui(view),
    }
}
