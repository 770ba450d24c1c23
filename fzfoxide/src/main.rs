use crate::command::Action;
use crate::errors::display_user_error;
use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use fzfoxide_frecency::{HistoryStore, HomeDotfile, Ranker, SortMethod};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod command;
mod errors;

/// Environment variable holding the log filter, e.g. `FZFOXIDE_LOG=debug`
const LOG_ENV: &str = "FZFOXIDE_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["run", "record", "query", "list", "clean"])
))]
struct Cli {
    /// Resolve QUERY to a directory and log the visit
    #[arg(long, value_name = "QUERY")]
    run: Option<String>,

    /// Log a visit to an existing directory
    #[arg(long, value_name = "PATH")]
    record: Option<String>,

    /// Print what --run would resolve to without logging the visit
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// With --query, print every matching directory with its score
    #[arg(long, requires = "query")]
    all: bool,

    /// Print the recorded directories
    #[arg(long)]
    list: bool,

    /// Sort order for --list
    #[arg(long, value_enum, default_value_t = Sort::Frecent, requires = "list")]
    sort: Sort,

    /// Forget directories that no longer exist
    #[arg(long)]
    clean: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sort {
    Recent,
    Frequent,
    Frecent,
}

impl From<Sort> for SortMethod {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Recent => SortMethod::Recent,
            Sort::Frequent => SortMethod::Frequent,
            Sort::Frecent => SortMethod::Frecent,
        }
    }
}

impl Cli {
    fn action(self) -> Action {
        if let Some(query) = self.run {
            Action::Run(query)
        } else if let Some(path) = self.record {
            Action::Record(path)
        } else if let Some(query) = self.query {
            Action::Query {
                query,
                all: self.all,
            }
        } else if self.clean {
            Action::Clean
        } else {
            Action::List(self.sort.into())
        }
    }
}

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let ranker = Ranker::new(HistoryStore::new(HomeDotfile));
    let action = cli.action();
    debug!("action {:?}", action);

    match command::execute(&ranker, action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries the resolved path, so logs go to stderr
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("fzfoxide").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_run() {
        let action = parse(&["--run", "docs"]).unwrap().action();
        assert!(matches!(action, Action::Run(q) if q == "docs"));
    }

    #[test]
    fn test_parse_query_all() {
        let action = parse(&["--query", "docs", "--all"]).unwrap().action();
        assert!(matches!(action, Action::Query { query, all: true } if query == "docs"));

        let action = parse(&["--query", "docs"]).unwrap().action();
        assert!(matches!(action, Action::Query { all: false, .. }));

        assert!(parse(&["--run", "docs", "--all"]).is_err());
    }

    #[test]
    fn test_parse_list_default_sort() {
        let action = parse(&["--list"]).unwrap().action();
        assert!(matches!(action, Action::List(SortMethod::Frecent)));

        let action = parse(&["--list", "--sort", "recent"]).unwrap().action();
        assert!(matches!(action, Action::List(SortMethod::Recent)));
    }

    #[test]
    fn test_parse_requires_one_action() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--run", "a", "--query", "b"]).is_err());
        assert!(parse(&["--sort", "recent"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
