//! SyncSpace CLI - binary entry point.
//!
//! # Architecture
//!
//! The CLI wires the file-backed [`PersistentStore`], the time-bounded cache and
//! the navigation synchronizer together from resolved [`Settings`], then runs a
//! single command:
//!
//! ```text
//! main() -> parse args -> SyncSpaceConfig::load() -> Context::open(settings) -> run(command)
//! ```
//!
//! Logs go to `~/.syncspace/logs/syncspace.log`, never to the terminal, so
//! command output stays clean.

mod commands;
mod replay;

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use chrono::{Local, Utc};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use syncspace_cache::{
    HttpJsonSource, NewsFeed, NewsView, Provenance, QuoteFeed, QuoteView, RefreshTimer,
    SystemClock, TimeBoundedCache,
};
use syncspace_config::{Settings, SyncSpaceConfig, data_dir};
use syncspace_nav::NavigationSynchronizer;
use syncspace_store::{
    ArticleToggle, FavoriteItem, Favorites, FavoritesTab, FileBackend, Journal, MoodLog,
    PersistentStore, ThemePreference,
};
use syncspace_types::SectionCatalog;

use commands::{Command, ThemeAction};

/// Where events go, plus whatever went wrong while looking for it. Problems are
/// reported through the subscriber once it exists.
struct LogTarget {
    file: Option<(PathBuf, File)>,
    problems: Vec<String>,
}

/// `SYNCSPACE_LOG` takes precedence over `RUST_LOG`; both default to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SYNCSPACE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let target = open_log_file();
    let Some((path, file)) = target.file else {
        // stdout carries quotes, headlines and `nav` transcripts.
        tracing_subscriber::registry().with(filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    tracing::info!(path = %path.display(), "Logging initialized");
    for problem in target.problems {
        tracing::warn!("{problem}");
    }
}

fn open_log_file() -> LogTarget {
    let mut problems = Vec::new();
    for candidate in log_file_candidates() {
        let opened = candidate
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&candidate)
            });
        match opened {
            Ok(file) => {
                return LogTarget {
                    file: Some((candidate, file)),
                    problems,
                };
            }
            Err(e) => problems.push(format!("Cannot log to {}: {e}", candidate.display())),
        }
    }
    LogTarget {
        file: None,
        problems,
    }
}

/// The data directory first, then one relative to the working directory.
fn log_file_candidates() -> Vec<PathBuf> {
    data_dir()
        .into_iter()
        .chain([PathBuf::from(".syncspace")])
        .map(|dir| dir.join("logs").join("syncspace.log"))
        .collect()
}

/// Approximates the browser's `prefers-color-scheme` from `COLORFGBG`
/// (`"<fg>;<bg>"`, dark backgrounds are 0-6 and 8).
fn system_prefers_dark() -> bool {
    env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .is_some_and(|bg| bg < 7 || bg == 8)
}

/// Pseudo-random pick among the sample quotes.
fn fallback_index() -> usize {
    Utc::now().timestamp_subsec_millis() as usize
}

struct Context {
    settings: Settings,
    store: PersistentStore,
    cache: TimeBoundedCache,
}

impl Context {
    fn open(settings: Settings) -> Result<Self> {
        let backend = FileBackend::open(&settings.store_dir)
            .with_context(|| format!("opening store at {}", settings.store_dir.display()))?
            .with_quota(settings.max_bytes);
        let store = PersistentStore::new(Arc::new(backend));
        let cache = TimeBoundedCache::new(store.clone(), Arc::new(SystemClock))
            .with_single_flight(settings.single_flight);
        Ok(Self {
            settings,
            store,
            cache,
        })
    }

    fn quote_feed(&self) -> Result<QuoteFeed> {
        let source =
            HttpJsonSource::new(self.settings.quote_url.clone(), self.settings.request_timeout)?;
        Ok(QuoteFeed::new(
            self.cache.clone(),
            source,
            self.settings.quote_max_age,
        ))
    }

    fn news_feed(&self) -> Result<NewsFeed> {
        if self.settings.news_api_key.is_none() {
            tracing::warn!("No news API key configured; headlines will likely fall back");
        }
        let source = HttpJsonSource::new(
            self.settings.news_request_url(),
            self.settings.request_timeout,
        )?;
        Ok(NewsFeed::new(
            self.cache.clone(),
            source,
            self.settings.news_max_age,
        ))
    }

    async fn news(&self, refresh: bool) -> Result<NewsView> {
        let feed = self.news_feed()?;
        let view = if refresh {
            feed.refresh().await
        } else {
            feed.load().await
        };
        view.context("news feed produced no result")
    }

    async fn quote(&self, refresh: bool) -> Result<QuoteView> {
        let feed = self.quote_feed()?;
        let index = fallback_index();
        let view = if refresh {
            feed.refresh(index).await
        } else {
            feed.load(index).await
        };
        view.context("quote feed produced no result")
    }
}

fn sample_note(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Live => "",
        Provenance::Sample => " (offline sample)",
    }
}

fn print_quote(out: &mut impl Write, view: &QuoteView) -> io::Result<()> {
    writeln!(
        out,
        "\"{}\"\n  - {}{}",
        view.quote.text,
        view.quote.author,
        sample_note(view.provenance)
    )
}

async fn watch(ctx: &Context) -> Result<()> {
    let feed = ctx.quote_feed()?;
    let index = fallback_index();
    let mut out = io::stdout();

    let mut shown = feed.load(index).await;
    if let Some(view) = &shown {
        print_quote(&mut out, view)?;
    }

    let timer = RefreshTimer::spawn(feed.resource().clone(), ctx.settings.quote_refresh);
    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticks.tick() => {
                let current = feed.current(index);
                if current.is_some() && current != shown {
                    if let Some(view) = &current {
                        print_quote(&mut out, view)?;
                    }
                    shown = current;
                }
            }
        }
    }

    feed.resource().close();
    timer.cancel();
    Ok(())
}

async fn run(command: Command, ctx: &Context) -> Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Command::Help => write!(out, "{}", commands::USAGE)?,
        Command::Quote { refresh } => {
            let view = ctx.quote(refresh).await?;
            print_quote(&mut out, &view)?;
        }
        Command::News { refresh } => {
            let view = ctx.news(refresh).await?;
            if view.provenance == Provenance::Sample {
                writeln!(out, "Headlines unavailable; showing samples.")?;
            }
            for (i, article) in view.articles.iter().enumerate() {
                writeln!(out, "{:>2}. {} ({})", i + 1, article.title, article.source.name)?;
                writeln!(out, "    {}", article.url)?;
            }
        }
        Command::SaveQuote => {
            let view = ctx.quote(false).await?;
            let favorites = Favorites::new(ctx.store.clone());
            if favorites.save_quote(&view.quote, Utc::now()) {
                writeln!(out, "Saved quote by {}.", view.quote.author)?;
            } else {
                writeln!(out, "Already in favorites.")?;
            }
        }
        Command::SaveNews { number } => {
            let view = ctx.news(false).await?;
            let Some(article) = view.articles.get(number - 1) else {
                bail!("there are only {} headlines", view.articles.len());
            };
            let favorites = Favorites::new(ctx.store.clone());
            match favorites.toggle_article(article, Utc::now()) {
                ArticleToggle::Saved => writeln!(out, "Saved \"{}\".", article.title)?,
                ArticleToggle::Removed => writeln!(out, "Removed \"{}\".", article.title)?,
            }
        }
        Command::Favorites { tab } => {
            let favorites = Favorites::new(ctx.store.clone());
            let counts = favorites.counts();
            writeln!(
                out,
                "All ({}) | Quotes ({}) | News ({})",
                counts.all, counts.quotes, counts.news
            )?;
            let items = favorites.list(tab);
            if items.is_empty() {
                let what = match tab {
                    FavoritesTab::All => "favorites",
                    FavoritesTab::Quotes => "favorite quotes",
                    FavoritesTab::News => "favorite news",
                };
                writeln!(out, "No {what} yet.")?;
            }
            for item in items {
                let saved = item.saved_at().with_timezone(&Local).format("%b %-d, %Y");
                match item {
                    FavoriteItem::Quote(q) => {
                        writeln!(out, "[quote {saved}] \"{}\" - {}", q.text, q.author)?;
                    }
                    FavoriteItem::Article(a) => {
                        writeln!(out, "[news {saved}] {} ({})", a.article.title, a.article.url)?;
                    }
                }
            }
        }
        Command::JournalAdd { mood, note } => {
            let entry = Journal::new(ctx.store.clone()).add(mood, &note, Utc::now());
            writeln!(
                out,
                "{} {} saved at {}",
                entry.emoji,
                entry.label,
                entry.timestamp.to_rfc3339()
            )?;
        }
        Command::JournalList => {
            let entries = Journal::new(ctx.store.clone()).entries();
            if entries.is_empty() {
                writeln!(out, "No journal entries yet.")?;
            }
            for entry in entries {
                writeln!(
                    out,
                    "{} {} {}\n    {}",
                    entry.timestamp.to_rfc3339(),
                    entry.emoji,
                    entry.label,
                    entry.note()
                )?;
            }
        }
        Command::JournalRemove { timestamp } => {
            if Journal::new(ctx.store.clone()).remove(timestamp) {
                writeln!(out, "Removed.")?;
            } else {
                bail!("no journal entry at {}", timestamp.to_rfc3339());
            }
        }
        Command::MoodLog { mood } => {
            let now = Local::now();
            let entry = MoodLog::new(ctx.store.clone()).log(
                mood,
                now.date_naive(),
                now.timestamp_millis(),
            );
            writeln!(out, "Logged {} {}.", entry.emoji, entry.label)?;
        }
        Command::MoodStats => {
            let stats = MoodLog::new(ctx.store.clone()).weekly_stats(Local::now().date_naive());
            let scale = stats.scale();
            for (label, count) in stats.iter() {
                let bar = "#".repeat((count * 20 / scale) as usize);
                writeln!(out, "{label:>8} {count:>3} {bar}")?;
            }
        }
        Command::Theme(action) => {
            let theme = ThemePreference::new(ctx.store.clone());
            let system = system_prefers_dark();
            let dark = match action {
                ThemeAction::Show => theme.dark_mode(system),
                ThemeAction::Toggle => theme.toggle(system),
                ThemeAction::Set { dark } => {
                    theme.set_dark_mode(dark);
                    dark
                }
            };
            writeln!(out, "{}", if dark { "dark" } else { "light" })?;
        }
        Command::Watch => {
            drop(out);
            watch(ctx).await?;
        }
        Command::Nav { steps } => {
            let mut sync = NavigationSynchronizer::new(
                SectionCatalog::default(),
                ctx.settings.navigation.clone(),
            );
            replay::run(&mut sync, &steps, &mut out)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let command = commands::parse(env::args().skip(1))?;
    if command == Command::Help {
        print!("{}", commands::USAGE);
        return Ok(());
    }

    let config = match SyncSpaceConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Warning: {e}; using defaults");
            SyncSpaceConfig::default()
        }
    };
    let settings = config.settings()?;
    tracing::debug!(?settings, "Resolved settings");

    let ctx = Context::open(settings)?;
    run(command, &ctx).await
}
