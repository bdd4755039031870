use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// A row handed to the rendering layer: the display text plus a short
/// trailing annotation (timestamp, source, whatever the feed carries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRow {
    pub text: String,
    pub meta: String,
}

/// The contract an external data surface (news, weather) satisfies. The
/// dashboard only ever reads rows and a status line; where they come
/// from is the provider's business. Scheduled refreshes run on the UI
/// tick and never touch the list store.
pub trait Feed {
    fn title(&self) -> &str;
    fn rows(&self) -> &[SurfaceRow];
    fn status(&self) -> &str;
    fn refresh(&mut self);
    /// Called once per event-loop tick; refreshes when the interval is due.
    fn tick(&mut self);
}

/// File-backed feed: one row per line, text and meta separated by a tab.
pub struct FileFeed {
    title: String,
    path: Option<PathBuf>,
    interval: Duration,
    last_refresh: Option<Instant>,
    rows: Vec<SurfaceRow>,
    status: String,
}

impl FileFeed {
    pub fn new(title: impl Into<String>, path: Option<PathBuf>, interval: Duration) -> Self {
        let mut feed = FileFeed {
            title: title.into(),
            path,
            interval,
            last_refresh: None,
            rows: Vec::new(),
            status: String::new(),
        };
        feed.refresh();
        feed
    }

    fn read_rows(&self) -> Result<Vec<SurfaceRow>> {
        let path = self.path.as_ref().context("no feed file configured")?;
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once('\t') {
                Some((text, meta)) => SurfaceRow {
                    text: text.trim().to_string(),
                    meta: meta.trim().to_string(),
                },
                None => SurfaceRow {
                    text: line.to_string(),
                    meta: String::new(),
                },
            })
            .collect())
    }
}

impl Feed for FileFeed {
    fn title(&self) -> &str {
        &self.title
    }

    fn rows(&self) -> &[SurfaceRow] {
        &self.rows
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn refresh(&mut self) {
        self.last_refresh = Some(Instant::now());
        match self.read_rows() {
            Ok(rows) => {
                self.rows = rows;
                self.status = format!("Updated {}", Local::now().format("%H:%M"));
            }
            Err(err) => {
                self.status = format!("Unavailable: {err:#}");
            }
        }
    }

    fn tick(&mut self) {
        let due = match self.last_refresh {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        };
        if due {
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_tab_separated_rows_and_skips_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Sunny, 21C\t08:00").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Rain tomorrow").unwrap();
        file.flush().unwrap();

        let feed = FileFeed::new(
            "Weather",
            Some(file.path().to_path_buf()),
            Duration::from_secs(600),
        );
        assert_eq!(feed.rows().len(), 2);
        assert_eq!(feed.rows()[0].text, "Sunny, 21C");
        assert_eq!(feed.rows()[0].meta, "08:00");
        assert_eq!(feed.rows()[1].meta, "");
        assert!(feed.status().starts_with("Updated"));
    }

    #[test]
    fn missing_file_degrades_to_a_status_message() {
        let feed = FileFeed::new("News", None, Duration::from_secs(600));
        assert!(feed.rows().is_empty());
        assert!(feed.status().starts_with("Unavailable"));
    }
}
