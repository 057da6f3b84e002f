//! Command-line parsing.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use syncspace_store::FavoritesTab;
use syncspace_types::{MOODS, Mood};

pub(crate) const USAGE: &str = "\
Usage: syncspace <command>

Commands:
  quote [--refresh]                 Show the quote of the moment
  news [--refresh]                  Show technology headlines
  save-quote                        Save the current quote to favorites
  save-news <n>                     Save (or unsave) headline number n
  favorites [all|quotes|news]       List saved items, newest first
  journal add <mood> [note...]      Write a journal entry
  journal list                      List journal entries, newest first
  journal remove <timestamp>        Delete the entry with this RFC 3339 timestamp
  mood log <mood>                   Record today's mood
  mood stats                        Mood counts for the last 7 days
  theme [toggle|dark|light]         Show or change the theme preference
  watch                             Keep the quote refreshing until Ctrl-C
  nav <step>...                     Replay navigation; steps are:
                                      <section>           click a nav entry
                                      seen:<s>=<ratio>[@<px>],...
                                                          viewport visibility report
                                      scroll              scroll movement
                                      wait:<ms>           let time pass
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThemeAction {
    Show,
    Toggle,
    Set { dark: bool },
}

/// One region's visibility in a `seen:` step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sighting {
    pub(crate) section: String,
    pub(crate) ratio: f64,
    /// Signed distance of the region's center from the viewport's center.
    pub(crate) offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NavStep {
    Navigate(String),
    Seen(Vec<Sighting>),
    Scroll,
    Wait(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Help,
    Quote { refresh: bool },
    News { refresh: bool },
    SaveQuote,
    SaveNews { number: usize },
    Favorites { tab: FavoritesTab },
    JournalAdd { mood: Mood, note: String },
    JournalList,
    JournalRemove { timestamp: DateTime<Utc> },
    MoodLog { mood: Mood },
    MoodStats,
    Theme(ThemeAction),
    Watch,
    Nav { steps: Vec<NavStep> },
}

fn refresh_flag(rest: &[String]) -> Result<bool> {
    match rest {
        [] => Ok(false),
        [flag] if flag == "--refresh" => Ok(true),
        _ => bail!("expected at most --refresh"),
    }
}

fn mood(raw: Option<&String>) -> Result<Mood> {
    let raw = raw.ok_or_else(|| anyhow!("missing mood"))?;
    Mood::by_label(raw).ok_or_else(|| {
        let known: Vec<&str> = MOODS.iter().map(|m| m.label).collect();
        anyhow!("unknown mood {raw:?} (expected one of {})", known.join(", "))
    })
}

fn sighting(raw: &str) -> Result<Sighting> {
    let (section, measure) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <section>=<ratio>, got {raw:?}"))?;
    let (ratio, offset) = match measure.split_once('@') {
        Some((ratio, offset)) => (ratio, Some(offset)),
        None => (measure, None),
    };
    let ratio: f64 = ratio
        .parse()
        .with_context(|| format!("invalid ratio in {raw:?}"))?;
    let offset: f64 = offset
        .map(str::parse::<f64>)
        .transpose()
        .with_context(|| format!("invalid offset in {raw:?}"))?
        .unwrap_or(0.0);
    Ok(Sighting {
        section: section.to_string(),
        ratio,
        offset,
    })
}

fn nav_step(raw: &str) -> Result<NavStep> {
    if raw == "scroll" {
        return Ok(NavStep::Scroll);
    }
    if let Some(ms) = raw.strip_prefix("wait:") {
        let ms: u64 = ms
            .parse()
            .with_context(|| format!("invalid wait {raw:?}"))?;
        return Ok(NavStep::Wait(Duration::from_millis(ms)));
    }
    if let Some(report) = raw.strip_prefix("seen:") {
        let sightings = report
            .split(',')
            .map(sighting)
            .collect::<Result<Vec<_>>>()?;
        return Ok(NavStep::Seen(sightings));
    }
    Ok(NavStep::Navigate(raw.to_string()))
}

pub(crate) fn parse(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let args: Vec<String> = args.into_iter().collect();
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    let command = match (name.as_str(), rest) {
        ("help" | "-h" | "--help", _) => Command::Help,
        ("quote", rest) => Command::Quote {
            refresh: refresh_flag(rest)?,
        },
        ("news", rest) => Command::News {
            refresh: refresh_flag(rest)?,
        },
        ("save-quote", []) => Command::SaveQuote,
        ("save-news", [n]) => Command::SaveNews {
            number: n
                .parse()
                .ok()
                .filter(|&n: &usize| n > 0)
                .ok_or_else(|| anyhow!("expected a headline number, got {n:?}"))?,
        },
        ("favorites", []) => Command::Favorites {
            tab: FavoritesTab::All,
        },
        ("favorites", [tab]) => Command::Favorites {
            tab: FavoritesTab::parse(tab)
                .ok_or_else(|| anyhow!("unknown favorites tab {tab:?}"))?,
        },
        ("journal", [sub, rest @ ..]) => match sub.as_str() {
            "add" => Command::JournalAdd {
                mood: mood(rest.first())?,
                note: rest.get(1..).unwrap_or_default().join(" "),
            },
            "list" => Command::JournalList,
            "remove" => {
                let raw = rest.first().ok_or_else(|| anyhow!("missing timestamp"))?;
                let timestamp = DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("invalid timestamp {raw:?}"))?
                    .with_timezone(&Utc);
                Command::JournalRemove { timestamp }
            }
            other => bail!("unknown journal command {other:?}"),
        },
        ("mood", [sub, rest @ ..]) => match sub.as_str() {
            "log" => Command::MoodLog {
                mood: mood(rest.first())?,
            },
            "stats" => Command::MoodStats,
            other => bail!("unknown mood command {other:?}"),
        },
        ("theme", []) => Command::Theme(ThemeAction::Show),
        ("theme", [action]) => Command::Theme(match action.as_str() {
            "toggle" => ThemeAction::Toggle,
            "dark" => ThemeAction::Set { dark: true },
            "light" => ThemeAction::Set { dark: false },
            other => bail!("unknown theme action {other:?}"),
        }),
        ("watch", []) => Command::Watch,
        ("nav", steps) if !steps.is_empty() => Command::Nav {
            steps: steps
                .iter()
                .map(String::as_str)
                .map(nav_step)
                .collect::<Result<Vec<_>>>()?,
        },
        (other, _) => bail!("unrecognized command {other:?}; run `syncspace help`"),
    };
    Ok(command)
}
