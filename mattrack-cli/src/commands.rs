//! Command handlers.
//!
//! Each handler takes the tracker and an output sink so that the binary can
//! print to stdout and tests can capture into a buffer.

use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use mattrack_core::{
    format_tenure, validate_transition, BeltThresholds, ClassType, PromotionStatus, Rank,
    RankPosition, RosterStore, RosterWriter, SettingsStore, StoreError, Student, StudentId,
    ThresholdConfig, ThresholdKind,
};
use mattrack_runner::{
    export_csv, export_json, generate_markdown, PromotionReport, PromotionTracker, ReportQuery,
};

/// Output format for list-style commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Markdown,
    Json,
}

// ─── Student lookup ────────────────────────────────────────────────

/// Find a student by exact id, else by case-insensitive full name.
///
/// Archived students are included so that `restore` can find them.
pub fn resolve_student<S>(tracker: &PromotionTracker<S>, query: &str) -> Result<Student>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
{
    match tracker.store().student(&StudentId::new(query)) {
        Ok(student) => return Ok(student),
        Err(StoreError::UnknownStudent(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let wanted = query.trim().to_lowercase();
    let mut matches: Vec<Student> = tracker
        .store()
        .students(true)?
        .into_iter()
        .filter(|s| s.full_name().to_lowercase() == wanted)
        .collect();

    match matches.len() {
        0 => bail!("no student matches '{query}'"),
        1 => Ok(matches.remove(0)),
        n => bail!("'{query}' matches {n} students; use the student id instead"),
    }
}

// ─── student ───────────────────────────────────────────────────────

pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub start_date: Option<NaiveDate>,
    pub position: RankPosition,
    /// Date of the last promotion elsewhere, for students joining above white belt.
    pub last_promoted: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub fn student_add<S, W>(tracker: &PromotionTracker<S>, out: &mut W, new: NewStudent) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let start = new.start_date.unwrap_or_else(|| tracker.today());
    let mut student =
        Student::new(new.first_name, new.last_name, start).with_position(new.position);
    student.email = new.email;
    student.phone = new.phone;

    let student = tracker.enroll_with_history(student, new.last_promoted)?;
    writeln!(
        out,
        "Enrolled {} ({}) as {}",
        student.full_name(),
        student.id,
        student.position.describe()
    )?;
    Ok(())
}

pub fn student_list<S, W>(tracker: &PromotionTracker<S>, out: &mut W, include_archived: bool) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let students = tracker.store().students(include_archived)?;
    if students.is_empty() {
        writeln!(out, "No students.")?;
        return Ok(());
    }

    writeln!(out, "{:<36} {:<28} {:<24} {:<10}", "ID", "Name", "Rank", "Since")?;
    writeln!(out, "{}", "-".repeat(101))?;
    for s in &students {
        let name = if s.is_active {
            s.full_name()
        } else {
            format!("{} (archived)", s.full_name())
        };
        writeln!(
            out,
            "{:<36} {:<28} {:<24} {:<10}",
            s.id,
            name,
            s.position.describe(),
            s.start_date
        )?;
    }
    Ok(())
}

pub fn student_show<S, W>(tracker: &PromotionTracker<S>, out: &mut W, query: &str) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let student = resolve_student(tracker, query)?;
    let status = tracker.student_status(&student.id)?;
    let tenure = tracker.belt_tenure(&student.id)?;

    writeln!(out, "{} ({})", student.full_name(), student.id)?;
    if !student.is_active {
        writeln!(out, "Archived")?;
    }
    writeln!(out, "Rank:       {}", student.position.describe())?;
    writeln!(out, "Enrolled:   {}", student.start_date)?;
    writeln!(out, "At belt:    {} (since {})", tenure.describe(), tenure.since)?;
    write_status(out, &status)?;

    let history = tracker.promotion_history(&student.id)?;
    if !history.is_empty() {
        writeln!(out)?;
        writeln!(out, "Promotion history:")?;
        for p in &history {
            let notes = p.notes.as_deref().map(|n| format!("  ({n})")).unwrap_or_default();
            writeln!(out, "  {}  {} -> {}{}", p.promoted_at, p.from, p.to, notes)?;
        }
    }
    Ok(())
}

pub fn student_set_active<S, W>(
    tracker: &PromotionTracker<S>,
    out: &mut W,
    query: &str,
    active: bool,
) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let student = resolve_student(tracker, query)?;
    if active {
        tracker.restore(&student.id)?;
        writeln!(out, "Restored {}", student.full_name())?;
    } else {
        tracker.archive(&student.id)?;
        writeln!(out, "Archived {}", student.full_name())?;
    }
    Ok(())
}

// ─── checkin ───────────────────────────────────────────────────────

pub fn check_in<S, W>(
    tracker: &PromotionTracker<S>,
    out: &mut W,
    query: &str,
    class_type: ClassType,
    date: Option<NaiveDate>,
) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let student = resolve_student(tracker, query)?;
    if !student.is_active {
        bail!("{} is archived; restore them before checking in", student.full_name());
    }
    let date = date.unwrap_or_else(|| tracker.today());
    if tracker.check_in(&student.id, class_type, date)? {
        writeln!(out, "Checked in {} for {} on {}", student.full_name(), class_type.label(), date)?;
    } else {
        writeln!(
            out,
            "{} was already checked in for {} on {}",
            student.full_name(),
            class_type.label(),
            date
        )?;
    }
    Ok(())
}

// ─── promote ───────────────────────────────────────────────────────

/// Record a promotion. A non-standard change is refused unless `confirmed`.
pub fn promote<S, W>(
    tracker: &PromotionTracker<S>,
    out: &mut W,
    query: &str,
    to: RankPosition,
    notes: Option<String>,
    confirmed: bool,
) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let student = resolve_student(tracker, query)?;
    if let Some(warning) = validate_transition(student.position, to) {
        if !confirmed {
            bail!("{warning}\nRe-run with --yes to record it anyway.");
        }
    }

    let outcome = tracker.promote(&student.id, to, notes)?;
    writeln!(
        out,
        "Promoted {} from {} to {} on {}",
        student.full_name(),
        outcome.record.from.describe(),
        outcome.record.to.describe(),
        outcome.record.promoted_at
    )?;
    if let Some(warning) = outcome.warning {
        writeln!(out, "Note: {warning}")?;
    }
    Ok(())
}

// ─── status / report ───────────────────────────────────────────────

pub fn status<S, W>(tracker: &PromotionTracker<S>, out: &mut W, query: &str) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let student = resolve_student(tracker, query)?;
    let status = tracker.student_status(&student.id)?;
    writeln!(out, "{}: {}", student.full_name(), student.position.describe())?;
    write_status(out, &status)
}

fn write_status<W: Write>(out: &mut W, status: &PromotionStatus) -> Result<()> {
    let target = if status.is_stripe_transition {
        "next stripe"
    } else {
        "next belt"
    };
    writeln!(out, "Baseline:   {} ({} ago)", status.baseline_date, format_tenure(status.days_since_baseline))?;
    match status.next_threshold.classes() {
        Some(needed) => writeln!(
            out,
            "Classes:    {} of {} toward {} ({}%)",
            status.classes_since_baseline, needed, target, status.progress
        )?,
        None => writeln!(
            out,
            "Classes:    {} (no further promotion)",
            status.classes_since_baseline
        )?,
    }
    writeln!(out, "Status:     {}", status.standing().label())?;
    Ok(())
}

pub fn report<S, W>(
    tracker: &PromotionTracker<S>,
    out: &mut W,
    query: &ReportQuery,
    format: OutputFormat,
) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let report = PromotionReport::new(tracker.all_statuses()?);
    let rows = report.select(query);

    match format {
        OutputFormat::Csv => out.write_all(export_csv(&rows)?.as_bytes())?,
        OutputFormat::Json => writeln!(out, "{}", export_json(&rows)?)?,
        OutputFormat::Markdown => {
            out.write_all(generate_markdown(&report, &rows, tracker.today()).as_bytes())?
        }
        OutputFormat::Table => {
            writeln!(out, "{}", report.summary())?;
            writeln!(out)?;
            if rows.is_empty() {
                writeln!(out, "No students match the current filters.")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<28} {:<24} {:>9} {:>6} {:>5}  {}",
                "Name", "Rank", "Classes", "Days", "Pct", "Status"
            )?;
            writeln!(out, "{}", "-".repeat(96))?;
            for row in &rows {
                let st = &row.status;
                let classes = match st.next_threshold.classes() {
                    Some(n) => format!("{}/{}", st.classes_since_baseline, n),
                    None => st.classes_since_baseline.to_string(),
                };
                writeln!(
                    out,
                    "{:<28} {:<24} {:>9} {:>6} {:>4}%  {}",
                    row.student.full_name(),
                    row.student.position.describe(),
                    classes,
                    st.days_since_baseline,
                    st.progress,
                    st.standing().label()
                )?;
            }
            writeln!(out)?;
            writeln!(out, "Showing {} of {} students", rows.len(), report.len())?;
        }
    }
    Ok(())
}

// ─── thresholds ────────────────────────────────────────────────────

pub fn thresholds_show<S, W>(tracker: &PromotionTracker<S>, out: &mut W) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let t = tracker.thresholds()?;
    writeln!(out, "{:<8} {:>14} {:>14}", "Rank", "Per stripe", "To next belt")?;
    writeln!(out, "{}", "-".repeat(38))?;
    for rank in Rank::ALL {
        let belt = t
            .belt_thresholds
            .get(rank)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(out, "{:<8} {:>14} {:>14}", rank, t.stripe_thresholds.get(rank), belt)?;
    }
    write_degenerate(out, &t)
}

pub fn thresholds_set<S, W>(
    tracker: &PromotionTracker<S>,
    out: &mut W,
    kind: ThresholdKind,
    rank: Rank,
    classes: i64,
) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    let mut t = tracker.thresholds()?;
    match kind {
        ThresholdKind::Stripe => t.stripe_thresholds.set(rank, classes),
        ThresholdKind::Belt => set_belt(&mut t.belt_thresholds, rank, classes)?,
    }
    tracker.save_thresholds(&t)?;
    let what = match kind {
        ThresholdKind::Stripe => "per stripe",
        ThresholdKind::Belt => "to next belt",
    };
    writeln!(out, "{} {what}: {classes} classes", rank.label())?;
    write_degenerate(out, &t)
}

fn set_belt(belts: &mut BeltThresholds, rank: Rank, classes: i64) -> Result<()> {
    belts
        .set(rank, classes)
        .with_context(|| format!("{} is the highest rank", rank.label()))
}

pub fn thresholds_reset<S, W>(tracker: &PromotionTracker<S>, out: &mut W) -> Result<()>
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
    W: Write,
{
    tracker.save_thresholds(&ThresholdConfig::default())?;
    writeln!(out, "Thresholds reset to defaults.")?;
    Ok(())
}

fn write_degenerate<W: Write>(out: &mut W, t: &ThresholdConfig) -> Result<()> {
    for (kind, rank, value) in t.non_positive() {
        match kind {
            ThresholdKind::Stripe => writeln!(
                out,
                "warning: {rank} stripe threshold is {value}; every {rank} student below 4 stripes counts as due for a stripe"
            )?,
            ThresholdKind::Belt => writeln!(
                out,
                "warning: {rank} belt threshold is {value}; every {rank} student at 4 stripes counts as belt-eligible"
            )?,
        }
    }
    Ok(())
}

// ─── validate ──────────────────────────────────────────────────────

pub fn validate<W: Write>(out: &mut W, from: RankPosition, to: RankPosition) -> Result<()> {
    match validate_transition(from, to) {
        Some(warning) => writeln!(out, "{warning}")?,
        None => writeln!(
            out,
            "{} -> {} is a standard promotion.",
            from.describe(),
            to.describe()
        )?,
    }
    Ok(())
}
