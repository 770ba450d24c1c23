use anyhow::{Result, anyhow};
use chrono::SecondsFormat;
use fzfoxide_frecency::{FrecencyError, Ranker, SortMethod, sorted};
use std::io::{self, Write};
use tracing::debug;

#[derive(Debug)]
pub enum Action {
    Run(String),
    Record(String),
    Query { query: String, all: bool },
    List(SortMethod),
    Clean,
}

/// Run one action and print its result to stdout
pub fn execute(ranker: &Ranker, action: Action) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_to(ranker, action, &mut out)
}

pub(crate) fn execute_to(ranker: &Ranker, action: Action, out: &mut impl Write) -> Result<()> {
    match action {
        Action::Run(query) => {
            let dir = ranker.resolve(&query)?;
            writeln!(out, "{}", dir.display())?;
        }
        Action::Query { query, all: false } => {
            let dir = ranker.query(&query)?;
            writeln!(out, "{}", dir.display())?;
        }
        Action::Query { query, all: true } => {
            let candidates = ranker.candidates(&query)?;
            if candidates.is_empty() {
                return Err(FrecencyError::NotFound { query }.into());
            }
            for candidate in candidates {
                writeln!(
                    out,
                    "{:.2}\t{}\t{}",
                    candidate.similarity, candidate.record.count, candidate.record.path
                )?;
            }
        }
        Action::Record(path) => {
            let dir = ranker
                .existing_dir(&path)
                .ok_or_else(|| anyhow!("not a directory: {path}"))?;
            let record = ranker.record_dir(&dir)?;
            debug!("{} visited {} times", record.path, record.count);
        }
        Action::List(sort_method) => {
            let records = ranker.store().load()?;
            for record in sorted(&records, sort_method) {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    record.count,
                    record.last_accessed.to_rfc3339_opts(SecondsFormat::Secs, true),
                    record.path
                )?;
            }
        }
        Action::Clean => {
            let removed = ranker.store().remove_missing(|p| p.is_dir())?;
            for record in removed {
                writeln!(out, "{}", record.path)?;
            }
        }
    }
    Ok(())
}
