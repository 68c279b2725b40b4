//! Command handlers and config loading, driven the way the binary drives them.

use chrono::NaiveDate;

use mattrack_cli::commands::{self, NewStudent};
use mattrack_cli::{CliConfig, ConfigError, OutputFormat};
use mattrack_core::{
    AttendanceRecord, ClassType, PromotionRecord, Rank, RankPosition, RosterStore, RosterWriter,
    SettingsStore, StoreError, Student, StudentId, ThresholdKind,
};
use mattrack_runner::{PromotionTracker, ReportQuery};
use mattrack_store::{MemoryStore, SqliteStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pos(rank: Rank, stripes: u8) -> RankPosition {
    RankPosition::new(rank, stripes).unwrap()
}

fn tracker() -> PromotionTracker<MemoryStore> {
    PromotionTracker::with_today(MemoryStore::new(), date(2024, 9, 1))
}

fn add(tracker: &PromotionTracker<MemoryStore>, first: &str, last: &str, position: RankPosition) {
    let mut out = Vec::new();
    commands::student_add(
        tracker,
        &mut out,
        NewStudent {
            first_name: first.into(),
            last_name: last.into(),
            start_date: Some(date(2024, 6, 1)),
            position,
            last_promoted: None,
            email: None,
            phone: None,
        },
    )
    .unwrap();
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

#[test]
fn students_are_found_by_name() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));

    let s = commands::resolve_student(&t, "ana silva").unwrap();
    assert_eq!(s.last_name, "Silva");
    assert_eq!(commands::resolve_student(&t, s.id.as_str()).unwrap().id, s.id);
    assert!(commands::resolve_student(&t, "Bruno Alves").is_err());
}

#[test]
fn ambiguous_names_are_refused() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));
    add(&t, "Ana", "Silva", pos(Rank::Blue, 0));
    let err = commands::resolve_student(&t, "Ana Silva").unwrap_err();
    assert!(err.to_string().contains("matches 2 students"));
}

/// Store whose single-student lookup always fails at the backend.
struct BrokenLookup(MemoryStore);

impl RosterStore for BrokenLookup {
    fn student(&self, _id: &StudentId) -> Result<Student, StoreError> {
        Err(StoreError::Backend("disk I/O error".into()))
    }
    fn students(&self, include_archived: bool) -> Result<Vec<Student>, StoreError> {
        self.0.students(include_archived)
    }
    fn promotions(&self, id: &StudentId) -> Result<Vec<PromotionRecord>, StoreError> {
        self.0.promotions(id)
    }
    fn count_attendance_on_or_after(&self, id: &StudentId, since: NaiveDate) -> Result<u32, StoreError> {
        self.0.count_attendance_on_or_after(id, since)
    }
}

impl RosterWriter for BrokenLookup {
    fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.0.insert_student(student)
    }
    fn insert_student_with_baseline(
        &self,
        student: &Student,
        baseline: &PromotionRecord,
    ) -> Result<(), StoreError> {
        self.0.insert_student_with_baseline(student, baseline)
    }
    fn insert_attendance(&self, record: &AttendanceRecord) -> Result<bool, StoreError> {
        self.0.insert_attendance(record)
    }
    fn apply_promotion(&self, record: &PromotionRecord) -> Result<(), StoreError> {
        self.0.apply_promotion(record)
    }
    fn set_active(&self, id: &StudentId, active: bool) -> Result<(), StoreError> {
        self.0.set_active(id, active)
    }
}

impl SettingsStore for BrokenLookup {
    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.read_setting(key)
    }
    fn write_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.write_setting(key, value)
    }
}

#[test]
fn lookup_failures_are_not_reported_as_missing_students() {
    let t = PromotionTracker::with_today(BrokenLookup(MemoryStore::new()), date(2024, 9, 1));
    let err = commands::resolve_student(&t, "some-id").unwrap_err();
    assert!(err.to_string().contains("disk I/O error"), "{err}");
    assert!(!err.to_string().contains("no student matches"), "{err}");
}

#[test]
fn stripe_threshold_warning_names_stripe_students() {
    let t = tracker();
    let mut out = Vec::new();
    commands::thresholds_set(&t, &mut out, ThresholdKind::Stripe, Rank::Blue, -1).unwrap();
    assert!(text(out).contains(
        "warning: blue stripe threshold is -1; every blue student below 4 stripes counts as due for a stripe"
    ));
}

#[test]
fn checkin_reports_duplicates() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));

    let mut out = Vec::new();
    commands::check_in(&t, &mut out, "Ana Silva", ClassType::Gi, Some(date(2024, 8, 1))).unwrap();
    commands::check_in(&t, &mut out, "Ana Silva", ClassType::Gi, Some(date(2024, 8, 1))).unwrap();
    let out = text(out);
    assert!(out.contains("Checked in Ana Silva for Gi on 2024-08-01"));
    assert!(out.contains("already checked in"));
}

#[test]
fn archived_students_cannot_check_in() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));
    let mut out = Vec::new();
    commands::student_set_active(&t, &mut out, "Ana Silva", false).unwrap();
    assert!(commands::check_in(&t, &mut out, "Ana Silva", ClassType::Gi, None).is_err());

    commands::student_set_active(&t, &mut out, "Ana Silva", true).unwrap();
    assert!(commands::check_in(&t, &mut out, "Ana Silva", ClassType::Gi, None).is_ok());
}

#[test]
fn non_standard_promotion_needs_confirmation() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 2));

    let mut out = Vec::new();
    let err = commands::promote(&t, &mut out, "Ana Silva", pos(Rank::Blue, 0), None, false)
        .unwrap_err();
    assert!(err.to_string().contains("without 4 stripes"));
    let student = commands::resolve_student(&t, "Ana Silva").unwrap();
    assert_eq!(student.position, pos(Rank::White, 2));

    commands::promote(&t, &mut out, "Ana Silva", pos(Rank::Blue, 0), None, true).unwrap();
    let out = text(out);
    assert!(out.contains("Promoted Ana Silva from White Belt, 2 stripes to Blue Belt, 0 stripes"));
    assert!(out.contains("Note: This is a non-standard promotion"));
    assert_eq!(t.store().student(&student.id).unwrap().position, pos(Rank::Blue, 0));
}

#[test]
fn standard_promotion_goes_through_without_confirmation() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 2));
    let mut out = Vec::new();
    commands::promote(&t, &mut out, "Ana Silva", pos(Rank::White, 3), None, false).unwrap();
    assert!(!text(out).contains("Note:"));
}

#[test]
fn status_prints_progress() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));
    let mut out = Vec::new();
    for day in 1..=10 {
        commands::check_in(&t, &mut out, "Ana Silva", ClassType::Nogi, Some(date(2024, 7, day)))
            .unwrap();
    }

    let mut out = Vec::new();
    commands::status(&t, &mut out, "Ana Silva").unwrap();
    let out = text(out);
    assert!(out.contains("Classes:    10 of 25 toward next stripe (40%)"));
    assert!(out.contains("Status:     In progress"));
    assert!(out.contains("Baseline:   2024-06-01 (3 months ago)"));
}

#[test]
fn report_formats() {
    let t = tracker();
    add(&t, "Ana", "Silva", pos(Rank::White, 0));
    add(&t, "Bruno", "Alves", pos(Rank::Black, 4));
    let query = ReportQuery::default();

    let mut table = Vec::new();
    commands::report(&t, &mut table, &query, OutputFormat::Table).unwrap();
    let table = text(table);
    assert!(table.contains("2 active students, 0 due for a stripe, 0 eligible for a belt"));
    assert!(table.contains("Showing 2 of 2 students"));

    let mut csv = Vec::new();
    commands::report(&t, &mut csv, &query, OutputFormat::Csv).unwrap();
    assert_eq!(text(csv).lines().count(), 3);

    let mut md = Vec::new();
    commands::report(&t, &mut md, &query, OutputFormat::Markdown).unwrap();
    assert!(text(md).starts_with("# Promotion Report"));

    let mut json = Vec::new();
    commands::report(&t, &mut json, &query, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
}

#[test]
fn thresholds_set_show_reset() {
    let t = tracker();
    let mut out = Vec::new();
    commands::thresholds_set(&t, &mut out, ThresholdKind::Stripe, Rank::Blue, 35).unwrap();
    commands::thresholds_set(&t, &mut out, ThresholdKind::Belt, Rank::White, 0).unwrap();
    assert!(commands::thresholds_set(&t, &mut out, ThresholdKind::Belt, Rank::Black, 10).is_err());

    let mut shown = Vec::new();
    commands::thresholds_show(&t, &mut shown).unwrap();
    let shown = text(shown);
    assert!(shown.contains("blue"));
    assert!(shown.contains("35"));
    assert!(shown.contains(
        "warning: white belt threshold is 0; every white student at 4 stripes counts as belt-eligible"
    ));
    assert_eq!(t.thresholds().unwrap().stripe_thresholds.get(Rank::Blue), 35);

    commands::thresholds_reset(&t, &mut out).unwrap();
    assert_eq!(t.thresholds().unwrap().stripe_thresholds.get(Rank::Blue), 40);
}

#[test]
fn validate_prints_warning_or_confirmation() {
    let mut out = Vec::new();
    commands::validate(&mut out, pos(Rank::Brown, 4), pos(Rank::Black, 0)).unwrap();
    commands::validate(&mut out, pos(Rank::Blue, 2), pos(Rank::White, 0)).unwrap();
    let out = text(out);
    assert!(out.contains("Brown Belt, 4 stripes -> Black Belt, 0 stripes is a standard promotion."));
    assert!(out.contains("moving backwards from blue to white belt"));
}

#[test]
fn student_show_includes_history_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("gym.db")).unwrap();
    let t = PromotionTracker::with_today(store, date(2024, 9, 1));

    let mut out = Vec::new();
    commands::student_add(
        &t,
        &mut out,
        NewStudent {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            start_date: Some(date(2024, 1, 1)),
            position: pos(Rank::White, 4),
            last_promoted: Some(date(2023, 11, 1)),
            email: Some("ana@example.com".into()),
            phone: None,
        },
    )
    .unwrap();
    commands::promote(&t, &mut out, "Ana Silva", pos(Rank::Blue, 0), Some("open mat demo".into()), false)
        .unwrap();

    let mut shown = Vec::new();
    commands::student_show(&t, &mut shown, "Ana Silva").unwrap();
    let shown = text(shown);
    assert!(shown.contains("Rank:       Blue Belt, 0 stripes"));
    assert!(shown.contains("At belt:    0 days (since 2024-09-01)"));
    assert!(shown.contains("2024-09-01  white:4 -> blue:0  (open mat demo)"));
    assert!(shown.contains("2023-11-01  white:4 -> white:4  (Baseline promotion"));
}

// ── Config ───────────────────────────────────────────────────────────

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let c = CliConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(c, CliConfig::default());
}

#[test]
fn config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mattrack.toml");
    std::fs::write(&path, "database = \"/tmp/gym.db\"\nlog_filter = \"info\"\n").unwrap();
    let c = CliConfig::load_or_default(&path).unwrap();
    assert_eq!(c.database, std::path::PathBuf::from("/tmp/gym.db"));
    assert_eq!(c.log_filter, "info");
}

#[test]
fn invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mattrack.toml");
    std::fs::write(&path, "database = [").unwrap();
    assert!(matches!(
        CliConfig::load_or_default(&path),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        CliConfig::from_file(&dir.path().join("absent.toml")),
        Err(ConfigError::Io { .. })
    ));
}
