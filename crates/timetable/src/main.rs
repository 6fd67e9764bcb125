use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use timetable::app::{self, Msg, NotesTarget, Screen};
use timetable::clock::Clock;
use timetable::notify::AlarmRegistry;
use timetable::schedule::today_view;
use timetable::{logging, AppConfig, AppState};

/// Daily class timetable with reminders before each class.
#[derive(Parser)]
#[command(name = "timetable", version, about)]
struct Cli {
    /// Path to a JSON config file; falls back to $TIMETABLE_CONFIG.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's classes for the saved selection.
    Today {
        /// Pretend it is this local time ("YYYY-MM-DD HH:MM").
        #[arg(long)]
        at: Option<String>,
    },

    /// Save a class selection and arm its reminders.
    Select {
        department: String,
        year: String,
        class: String,
    },

    /// Forget the saved selection and cancel all reminders.
    Reset,

    /// Show where the notes for the saved selection live.
    Notes,

    /// List armed reminders.
    Reminders {
        /// Re-arm reminders for the saved selection first.
        #[arg(long)]
        refresh: bool,
    },

    /// List departments, years and classes.
    Catalog,

    /// Re-arm reminders, then deliver them as they fall due until Ctrl-C.
    /// Reminders are re-armed again whenever the day changes.
    Watch,
}

fn parse_at(value: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid time '{}', expected YYYY-MM-DD HH:MM", value))
}

fn require_selection(state: &AppState) -> anyhow::Result<timetable::ScheduleKey> {
    match state.selection() {
        Some(selection) => Ok(selection),
        None => bail!("no class selected; run `timetable select <department> <year> <class>`"),
    }
}

fn show_today(state: &AppState, at: Option<String>) -> anyhow::Result<()> {
    let key = require_selection(state)?;
    let now = match at {
        Some(value) => parse_at(&value)?,
        None => state.clock.now(),
    };

    let view = today_view(&state.book, &key, now);
    println!("{}  ({})", key, now.format("%A %Y-%m-%d %H:%M"));
    println!();
    for (entry, status) in view.day.iter().zip(&view.statuses) {
        println!(
            "  {:<14} {:<40} {:<10} {:<22} {:<9} {}",
            entry.time_range,
            entry.subject,
            entry.room,
            entry.instructor,
            entry.class_type.as_str(),
            status.label()
        );
    }

    if let Some((entry, countdown)) = view.next {
        println!();
        match countdown {
            Some(countdown) => println!("Next: {} in {}", entry.subject, countdown),
            None => println!("Next: {}", entry.subject),
        }
    }
    Ok(())
}

fn select(state: &AppState, department: String, year: String, class: String) -> anyhow::Result<()> {
    if !app::is_department(&department) {
        warn!(department = %department, "Unknown department, the default timetable will be shown");
    }

    let (screen, _) = app::update(Screen::Home, Msg::DepartmentSelected(department));
    let (screen, _) = app::update(screen, Msg::YearSelected(year));
    let (screen, effects) = app::update(screen, Msg::ClassSelected(class));

    let report = state
        .apply(&effects)
        .context("failed to save selection")?;
    if let Screen::Timetable(key) = screen {
        println!("Selected {}", key);
    }
    if let Some(report) = report {
        println!(
            "Armed {} reminders ({} best-effort)",
            report.armed, report.inexact
        );
    }
    Ok(())
}

fn reset(state: &AppState) -> anyhow::Result<()> {
    match state.start_screen() {
        screen @ Screen::Timetable(_) => {
            let (_, effects) = app::update(screen, Msg::ChangeClass);
            state.apply(&effects).context("failed to clear selection")?;
            println!("Selection cleared");
        }
        _ => println!("No class selected"),
    }
    Ok(())
}

fn show_notes(state: &AppState) -> anyhow::Result<()> {
    let key = require_selection(state)?;
    match app::notes_target(&key) {
        NotesTarget::External(url) => println!("{}", url),
        NotesTarget::Placeholder { title, message } => println!("{}\n{}", title, message),
    }
    Ok(())
}

fn list_reminders(state: &AppState, refresh: bool) -> anyhow::Result<()> {
    if refresh {
        state
            .refresh_reminders()
            .context("failed to re-arm reminders")?;
    }

    let pending = state.registry.pending();
    if pending.is_empty() {
        println!("No reminders armed");
    }
    for p in pending {
        println!(
            "  [{}] {}  {} ({}) {:?}",
            p.slot_id,
            p.fire_at.format("%a %Y-%m-%d %H:%M"),
            p.payload.subject,
            p.payload.time_range,
            p.precision
        );
    }
    Ok(())
}

fn show_catalog() {
    println!("Departments:");
    for department in app::DEPARTMENTS {
        println!("  {}", department);
    }
    println!("Years: {}", app::YEARS.join(", "));
    println!("Classes: {}", app::classes().join(", "));
}

async fn run_watch(state: AppState) -> anyhow::Result<()> {
    let state = Arc::new(state);
    state
        .refresh_reminders()
        .context("failed to re-arm reminders")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
        let _ = shutdown_tx.send(true);
    });

    // Keeps the reminder window rolling while the dispatcher runs.
    let rearm_state = state.clone();
    let mut rearm_shutdown = shutdown_rx.clone();
    let rearm = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(rearm_state.config.poll_interval()) => {
                    if let Err(e) = rearm_state.refresh_if_stale() {
                        warn!(error = %e, "Failed to re-arm reminders");
                    }
                }
                changed = rearm_shutdown.changed() => {
                    if changed.is_err() || *rearm_shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    });

    state.dispatcher().run(state.clock.clone(), shutdown_rx).await;
    let _ = rearm.await;
    state.persist_alarms().context("failed to save reminders")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let state = AppState::from_config(config).context("failed to initialise")?;

    match cli.command {
        Command::Today { at } => show_today(&state, at),
        Command::Select {
            department,
            year,
            class,
        } => select(&state, department, year, class),
        Command::Reset => reset(&state),
        Command::Notes => show_notes(&state),
        Command::Reminders { refresh } => list_reminders(&state, refresh),
        Command::Catalog => {
            show_catalog();
            Ok(())
        }
        Command::Watch => run_watch(state).await,
    }
}
