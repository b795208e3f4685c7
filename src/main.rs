use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use cycle_tracker::calendar::{self, DayMark};
use cycle_tracker::commands::AppState;
use cycle_tracker::dashboard;
use cycle_tracker::models::{CycleProfile, Prediction};
use cycle_tracker::prediction::{self, CyclePolicy};
use cycle_tracker::storage::Storage;
use cycle_tracker::symptoms::{Flow, Mood, PhysicalSymptom, EMPTY_HISTORY_MESSAGE};
use cycle_tracker::validation::ProfileInput;

/// Private, on-device cycle tracker
#[derive(Debug, Parser)]
#[command(name = "cycle-tracker", version, about)]
struct Cli {
    /// Directory holding the encrypted data file
    #[arg(long, env = "CYCLE_TRACKER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Passphrase for the data file
    #[arg(long, env = "CYCLE_TRACKER_PASSPHRASE", hide_env_values = true, global = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict windows without touching stored data
    Predict {
        #[arg(long)]
        last_period: String,
        #[arg(long)]
        cycle_length: u32,
        /// Reference day for the countdown (defaults to now)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Create the encrypted data file
    Init,
    /// Save name, age, cycle length and last period date
    Profile {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long, default_value = "")]
        cycle_length: String,
        #[arg(long)]
        last_period: Option<String>,
    },
    Dashboard,
    /// Mark every day of a month
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Describe a single day
    Day { date: NaiveDate },
    /// Log today's mood, flow and symptoms
    Log {
        #[arg(long, default_value = "Not specified")]
        mood: Mood,
        #[arg(long, default_value = "Not specified")]
        flow: Flow,
        #[arg(long = "symptom")]
        symptoms: Vec<PhysicalSymptom>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    History,
    /// Show or hide fertile and ovulation days
    Fertility {
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
    /// Print all data as JSON
    Export,
    /// Delete the data file
    Wipe {
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging() {
    let log_env = std::env::var("CYCLE_TRACKER_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn print_prediction(prediction: &Prediction) {
    let w = &prediction.windows;
    println!("Period:        {} - {}", w.period.start, w.period.end);
    println!("Next period:   {} - {}", w.next_period.start, w.next_period.end);
    println!("Fertile:       {}", dashboard::window_label(&w.fertile));
    println!("Ovulation:     {}", w.ovulation_day);
    println!("Next period:   {}", prediction.countdown.label);
    if let Some(warning) = &prediction.range_warning {
        println!("Note:          {warning}");
    }
}

fn unlocked(cli: &Cli) -> Result<AppState> {
    let state = AppState::new(storage(cli)?);
    if !state.is_setup() {
        bail!("no data file yet, run `cycle-tracker init` first");
    }
    let passphrase = cli.passphrase.clone().context("a passphrase is required")?;
    if !state.unlock(passphrase)? {
        bail!("wrong passphrase");
    }
    Ok(state)
}

fn storage(cli: &Cli) -> Result<Storage> {
    Ok(match &cli.data_dir {
        Some(dir) => Storage::in_dir(dir),
        None => Storage::default_location()?,
    })
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let now = Local::now().naive_local();
    let today = now.date();

    match &cli.command {
        Command::Predict {
            last_period,
            cycle_length,
            today: reference,
        } => {
            let profile = CycleProfile {
                last_period_date: prediction::parse_date(last_period)?,
                cycle_length: *cycle_length,
            };
            let at = reference.map_or(now, |d| d.and_time(chrono::NaiveTime::MIN));
            print_prediction(&CyclePolicy::default().predict(&profile, at)?);
        }
        Command::Init => {
            let state = AppState::new(storage(&cli)?);
            let passphrase = cli.passphrase.clone().context("a passphrase is required")?;
            let user_id = state.setup(passphrase)?;
            println!("Created data file for {user_id}");
        }
        Command::Profile {
            name,
            age,
            cycle_length,
            last_period,
        } => {
            let state = unlocked(&cli)?;
            let profile = state.save_profile(&ProfileInput {
                name: name.clone(),
                age: age.clone(),
                cycle_length: cycle_length.clone(),
                last_period_date: last_period.clone(),
            })?;
            println!("Profile saved for {}", profile.name);
        }
        Command::Dashboard => {
            let summary = unlocked(&cli)?.dashboard(now)?;
            println!("{}", summary.greeting);
            println!("Next period: {}", summary.next_period);
            println!("Fertile window: {}", summary.fertile_window);
        }
        Command::Calendar { year, month } => {
            let state = unlocked(&cli)?;
            let view = state.calendar_month(
                year.unwrap_or(today.year()),
                month.unwrap_or(today.month()),
                today,
            )?;
            println!("{}", calendar::title(today));
            for day in view.days.iter().filter(|d| d.mark != DayMark::None) {
                println!("{}  {:?}", day.date, day.mark);
            }
        }
        Command::Day { date } => {
            println!("{}", unlocked(&cli)?.describe_day(*date, today)?);
        }
        Command::Log {
            mood,
            flow,
            symptoms,
            notes,
        } => {
            let entry = unlocked(&cli)?.log_symptoms(now, *mood, *flow, symptoms, notes)?;
            println!("Symptoms saved for {}", entry.date);
        }
        Command::History => {
            let cards = unlocked(&cli)?.history()?;
            if cards.is_empty() {
                println!("{EMPTY_HISTORY_MESSAGE}");
            }
            for card in cards {
                println!("{}", card.date);
                for line in card.lines {
                    println!("  {line}");
                }
            }
        }
        Command::Fertility { enabled } => {
            unlocked(&cli)?.toggle_fertility(*enabled)?;
        }
        Command::Export => {
            println!("{}", unlocked(&cli)?.export_data()?);
        }
        Command::Wipe { yes } => {
            if !yes {
                bail!("refusing to wipe without --yes");
            }
            unlocked(&cli)?.wipe_all_data()?;
            println!("All data deleted");
        }
    }

    Ok(())
}
