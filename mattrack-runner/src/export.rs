//! Report export: JSON, CSV, and Markdown.
//!
//! - **JSON**: the selected rows with their full status, for scripting
//! - **CSV**: one flat row per student for spreadsheets
//! - **Markdown**: summary table plus roster table, for pasting into notes

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::report::{PromotionReport, ReportSummary};
use crate::tracker::StudentStatus;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize rows to pretty JSON.
pub fn export_json(rows: &[&StudentStatus]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("failed to serialize report rows to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export rows as CSV.
///
/// Columns: student_id, last_name, first_name, belt, stripes, classes,
/// days, baseline_date, next_threshold, progress, standing
pub fn export_csv(rows: &[&StudentStatus]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "student_id",
        "last_name",
        "first_name",
        "belt",
        "stripes",
        "classes",
        "days",
        "baseline_date",
        "next_threshold",
        "progress",
        "standing",
    ])?;

    for row in rows {
        let s = &row.student;
        let st = &row.status;
        wtr.write_record([
            s.id.to_string(),
            s.last_name.clone(),
            s.first_name.clone(),
            s.position.rank.to_string(),
            s.position.stripes.to_string(),
            st.classes_since_baseline.to_string(),
            st.days_since_baseline.to_string(),
            st.baseline_date.to_string(),
            st.next_threshold.to_string(),
            st.progress.to_string(),
            st.standing().label().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Markdown promotion report. The summary covers the full roster; the table
/// lists only `rows`.
pub fn generate_markdown(report: &PromotionReport, rows: &[&StudentStatus], today: NaiveDate) -> String {
    let mut md = String::with_capacity(256 + rows.len() * 96);

    md.push_str("# Promotion Report\n\n");
    md.push_str(&format!("Generated {today}.\n\n"));

    md.push_str("## Summary\n\n");
    md.push_str(&format_summary(&report.summary()));
    md.push('\n');

    md.push_str("## Students\n\n");
    if rows.is_empty() {
        md.push_str("No students match the current filters.\n");
        return md;
    }
    md.push_str(&format!("Showing {} of {} students.\n\n", rows.len(), report.len()));
    md.push_str("| Name | Rank | Classes | Days | Progress | Status |\n");
    md.push_str("| --- | --- | ---: | ---: | ---: | --- |\n");
    for row in rows {
        let st = &row.status;
        let target = match st.next_threshold.classes() {
            Some(n) => format!("{} / {}", st.classes_since_baseline, n),
            None => st.classes_since_baseline.to_string(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {}% | {} |\n",
            row.student.full_name(),
            row.student.position.describe(),
            target,
            st.days_since_baseline,
            st.progress,
            st.standing().label(),
        ));
    }
    md
}

fn format_summary(summary: &ReportSummary) -> String {
    let mut md = String::new();
    md.push_str("| Metric | Count |\n");
    md.push_str("| --- | ---: |\n");
    md.push_str(&format!("| Active students | {} |\n", summary.total));
    md.push_str(&format!("| Due for stripe | {} |\n", summary.stripe_due));
    md.push_str(&format!("| Eligible for belt | {} |\n", summary.belt_eligible));
    md
}
