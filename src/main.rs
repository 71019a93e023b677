mod app;
mod availability;
mod cache;
mod catalog;
mod config;
mod event;
mod logging;
mod query;
mod shelf;
#[cfg(test)]
mod test_support;
mod ui;

use cache::{HoldingsStore, NoopStore, SqliteStore};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shelfcheck")]
#[command(about = "Check a Goodreads shelf against your public library's catalogue")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/shelfcheck/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Goodreads user id, e.g. 151602501-apricot
  #[arg(short, long)]
  user: Option<String>,

  /// Goodreads shelf name
  #[arg(short, long)]
  shelf: Option<String>,

  /// Library branch to highlight and report on
  #[arg(short, long)]
  branch: Option<String>,

  /// Last shelf page number to read
  #[arg(long)]
  pages: Option<u32>,

  /// Write the annotated shelf as JSON to this path instead of starting the UI
  #[arg(long)]
  export: Option<PathBuf>,

  /// Print the books held at --branch instead of starting the UI
  #[arg(long)]
  report: bool,
}

impl Args {
  /// Apply command line overrides on top of the file configuration
  fn apply(&self, mut config: config::Config) -> config::Config {
    if let Some(user) = &self.user {
      config.goodreads.user = Some(user.clone());
    }
    if let Some(shelf) = &self.shelf {
      config.goodreads.shelf = shelf.clone();
    }
    if let Some(branch) = &self.branch {
      config.library.branch = Some(branch.clone());
    }
    if let Some(pages) = self.pages {
      config.goodreads.page_limit = Some(pages);
    }
    config
  }

  fn headless(&self) -> bool {
    self.export.is_some() || self.report
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  let config = args.apply(config::Config::load(args.config.as_deref())?);

  let store: Arc<dyn HoldingsStore> = if config.cache.enabled {
    Arc::new(SqliteStore::open()?)
  } else {
    Arc::new(NoopStore)
  };

  let service = shelf::ShelfService::new(&config, store)?;
  let branch = config.library.branch.clone();

  if args.headless() {
    return run_headless(&args, &service, branch.as_deref()).await;
  }

  info!("Starting UI for {}/{}", service.user(), service.shelf());
  let mut app = app::App::new(service, branch);
  app.run().await?;

  Ok(())
}

async fn run_headless(
  args: &Args,
  service: &shelf::ShelfService,
  branch: Option<&str>,
) -> Result<()> {
  let books = service.load_books().await?;

  if let Some(path) = &args.export {
    shelf::save_json(&books, path)?;
  }

  if args.report {
    let branch = branch.ok_or_else(|| eyre!("--report needs a branch (--branch or library.branch)"))?;
    let at_branch = shelf::find_at(&books, branch);
    println!("Books available at {}:\n", branch);
    println!("{}", shelf::format_report(&at_branch, branch));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pages_sets_last_page_number() {
    let args = Args::parse_from(["shelfcheck", "--user", "someone", "--pages", "3"]);
    let config = args.apply(config::Config::default());

    assert_eq!(config.goodreads.page_limit, Some(3));
    assert_eq!(config.goodreads.user.as_deref(), Some("someone"));
    assert!(!args.headless());
  }
}
