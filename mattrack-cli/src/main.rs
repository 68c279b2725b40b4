//! Mat Tracker CLI: roster, check-in, promotions, thresholds and reports.
//!
//! Commands:
//! - `student add|list|show|archive|restore`: manage the roster
//! - `checkin`: record attendance for today or a given date
//! - `promote`: record a stripe or belt (non-standard changes need `--yes`)
//! - `status`: one student's progress toward their next promotion
//! - `report`: roster-wide promotion report as a table, CSV, Markdown or JSON
//! - `thresholds show|set|reset`: class counts per stripe and per belt
//! - `validate`: check a rank change without recording it

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mattrack_cli::commands::{self, NewStudent};
use mattrack_cli::config::{default_config_path, CliConfig};
use mattrack_cli::OutputFormat;
use mattrack_core::{ClassType, Rank, RankPosition, ThresholdKind};
use mattrack_runner::{PromotionTracker, ReportQuery, SortDirection, SortKey, StandingFilter};
use mattrack_store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "mattrack",
    about = "Mat Tracker: attendance-based stripe and belt promotion tracking"
)]
struct Cli {
    /// Config file. Defaults to <config dir>/mattrack/mattrack.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file. Overrides the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roster management.
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Record attendance for one class.
    Checkin {
        /// Student id or full name.
        student: String,

        /// Class type: gi, nogi, open-mat.
        #[arg(long, default_value = "gi")]
        class: ClassType,

        /// Class date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record a promotion dated today.
    Promote {
        /// Student id or full name.
        student: String,

        /// New rank as rank:stripes (e.g. blue:0).
        to: RankPosition,

        /// Free-form note stored with the promotion.
        #[arg(long)]
        notes: Option<String>,

        /// Record a non-standard promotion without refusing.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Progress toward the next stripe or belt.
    Status {
        /// Student id or full name.
        student: String,
    },
    /// Promotion report for all active students.
    Report {
        /// Only this belt.
        #[arg(long)]
        rank: Option<Rank>,

        /// all, stripe-due, belt-eligible, in-progress.
        #[arg(long, default_value = "all")]
        standing: StandingFilter,

        /// name, belt, classes, days, status.
        #[arg(long, default_value = "status")]
        sort: SortKey,

        /// asc or desc.
        #[arg(long, default_value = "desc")]
        direction: SortDirection,

        /// Output CSV.
        #[arg(long, default_value_t = false, conflicts_with_all = ["markdown", "json"])]
        csv: bool,

        /// Output Markdown.
        #[arg(long, default_value_t = false, conflicts_with = "json")]
        markdown: bool,

        /// Output JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Promotion thresholds.
    Thresholds {
        #[command(subcommand)]
        action: ThresholdAction,
    },
    /// Check whether a rank change is standard, without recording it.
    Validate {
        /// Current rank as rank:stripes.
        from: RankPosition,
        /// Proposed rank as rank:stripes.
        to: RankPosition,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    /// Enroll a new student.
    Add {
        first_name: String,
        last_name: String,

        /// Enrollment date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Starting rank as rank:stripes, for students joining from another gym.
        #[arg(long, default_value = "white:0")]
        rank: RankPosition,

        /// Date of their last promotion before joining (YYYY-MM-DD).
        #[arg(long)]
        last_promoted: Option<NaiveDate>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },
    /// List students.
    List {
        /// Include archived students.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Details, status and promotion history for one student.
    Show { student: String },
    /// Hide a student from the roster and reports.
    Archive { student: String },
    /// Return an archived student to the roster.
    Restore { student: String },
}

#[derive(Subcommand)]
enum ThresholdAction {
    /// Print the current thresholds.
    Show,
    /// Change one threshold.
    Set {
        /// Which table.
        kind: KindArg,
        /// Belt the threshold applies to.
        rank: Rank,
        /// Number of classes.
        #[arg(allow_negative_numbers = true)]
        classes: i64,
    },
    /// Restore the default thresholds.
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Stripe,
    Belt,
}

impl From<KindArg> for ThresholdKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Stripe => ThresholdKind::Stripe,
            KindArg::Belt => ThresholdKind::Belt,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = if cli.config.is_some() {
        CliConfig::from_file(&config_path)?
    } else {
        CliConfig::load_or_default(&config_path)?
    };
    init_tracing(&config.log_filter);
    debug!(config = %config_path.display(), "configuration loaded");

    // `validate` needs no database.
    if let Commands::Validate { from, to } = cli.command {
        let mut out = std::io::stdout().lock();
        return commands::validate(&mut out, from, to);
    }

    let db_path = cli.db.clone().unwrap_or(config.database);
    let store = open_store(&db_path)?;
    let tracker = PromotionTracker::new(store);

    let mut out = std::io::stdout().lock();
    run(&tracker, &mut out, cli.command)?;
    out.flush()?;
    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: &std::path::Path) -> Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    SqliteStore::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn run<W: Write>(tracker: &PromotionTracker<SqliteStore>, out: &mut W, command: Commands) -> Result<()> {
    match command {
        Commands::Student { action } => match action {
            StudentAction::Add {
                first_name,
                last_name,
                start,
                rank,
                last_promoted,
                email,
                phone,
            } => commands::student_add(
                tracker,
                out,
                NewStudent {
                    first_name,
                    last_name,
                    start_date: start,
                    position: rank,
                    last_promoted,
                    email,
                    phone,
                },
            ),
            StudentAction::List { all } => commands::student_list(tracker, out, all),
            StudentAction::Show { student } => commands::student_show(tracker, out, &student),
            StudentAction::Archive { student } => {
                commands::student_set_active(tracker, out, &student, false)
            }
            StudentAction::Restore { student } => {
                commands::student_set_active(tracker, out, &student, true)
            }
        },
        Commands::Checkin {
            student,
            class,
            date,
        } => commands::check_in(tracker, out, &student, class, date),
        Commands::Promote {
            student,
            to,
            notes,
            yes,
        } => commands::promote(tracker, out, &student, to, notes, yes),
        Commands::Status { student } => commands::status(tracker, out, &student),
        Commands::Report {
            rank,
            standing,
            sort,
            direction,
            csv,
            markdown,
            json,
        } => {
            let query = ReportQuery {
                rank,
                standing,
                sort,
                direction,
            };
            let format = if csv {
                OutputFormat::Csv
            } else if markdown {
                OutputFormat::Markdown
            } else if json {
                OutputFormat::Json
            } else {
                OutputFormat::Table
            };
            commands::report(tracker, out, &query, format)
        }
        Commands::Thresholds { action } => match action {
            ThresholdAction::Show => commands::thresholds_show(tracker, out),
            ThresholdAction::Set {
                kind,
                rank,
                classes,
            } => commands::thresholds_set(tracker, out, kind.into(), rank, classes),
            ThresholdAction::Reset => commands::thresholds_reset(tracker, out),
        },
        Commands::Validate { from, to } => commands::validate(out, from, to),
    }
}
