//! End-to-end eligibility scenarios against both store adapters.

use chrono::{Duration, NaiveDate};

use mattrack_core::{
    compute_status, ClassType, PromotionRecord, Rank, RankPosition, RosterStore, RosterWriter,
    SettingsStore, Student, ThresholdConfig,
};
use mattrack_runner::{
    baseline_date, load_thresholds, save_thresholds, PromotionReport, PromotionTracker,
    ReportQuery, StandingFilter,
};
use mattrack_store::{MemoryStore, SqliteStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pos(rank: Rank, stripes: u8) -> RankPosition {
    RankPosition::new(rank, stripes).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 9, 1)
}

/// Check `n` classes in, one per day starting at `from`, alternating class types.
fn attend<S>(tracker: &PromotionTracker<S>, student: &Student, from: NaiveDate, n: u32)
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
{
    for i in 0..n {
        let class = ClassType::ALL[i as usize % ClassType::ALL.len()];
        let day = from + Duration::days(i64::from(i));
        assert!(tracker.check_in(&student.id, class, day).unwrap());
    }
}

// ── Fresh white belt reaches first stripe ─────────────────────────────

fn first_stripe_due<S>(store: S)
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
{
    let tracker = PromotionTracker::with_today(store, today());
    let s = tracker
        .enroll(Student::new("Ana", "Silva", date(2024, 6, 1)))
        .unwrap();
    attend(&tracker, &s, date(2024, 6, 1), 25);

    let status = tracker.student_status(&s.id).unwrap();
    assert!(status.stripe_due);
    assert!(!status.belt_eligible);
    assert_eq!(status.progress, 100);
    assert_eq!(status.classes_since_baseline, 25);
    assert_eq!(status.baseline_date, date(2024, 6, 1));
    assert_eq!(status.days_since_baseline, 92);
}

#[test]
fn first_stripe_due_memory() {
    first_stripe_due(MemoryStore::new());
}

#[test]
fn first_stripe_due_sqlite() {
    first_stripe_due(SqliteStore::open_in_memory().unwrap());
}

// ── One class short of a belt rounds to 100% ─────────────────────────

fn one_short_of_belt<S>(store: S)
where
    S: RosterStore + RosterWriter + SettingsStore + Sync,
{
    let tracker = PromotionTracker::with_today(store, today());
    let s = tracker
        .enroll(Student::new("Bruno", "Alves", date(2023, 1, 1)))
        .unwrap();
    let promoted = today() - Duration::days(200);
    tracker
        .store()
        .apply_promotion(&PromotionRecord::new(
            s.id.clone(),
            pos(Rank::White, 3),
            pos(Rank::White, 4),
            promoted,
        ))
        .unwrap();
    // Classes before the promotion must not count.
    attend(&tracker, &s, promoted - Duration::days(30), 10);
    attend(&tracker, &s, promoted, 199);

    let status = tracker.student_status(&s.id).unwrap();
    assert_eq!(status.classes_since_baseline, 199);
    assert_eq!(status.days_since_baseline, 200);
    assert!(!status.is_stripe_transition);
    assert!(!status.belt_eligible);
    assert!(!status.stripe_due);
    assert_eq!(status.progress, 100);

    tracker
        .check_in(&s.id, ClassType::Gi, promoted + Duration::days(199))
        .unwrap();
    assert!(tracker.student_status(&s.id).unwrap().belt_eligible);
}

#[test]
fn one_short_of_belt_memory() {
    one_short_of_belt(MemoryStore::new());
}

#[test]
fn one_short_of_belt_sqlite() {
    one_short_of_belt(SqliteStore::open_in_memory().unwrap());
}

// ── Baseline resolution ──────────────────────────────────────────────

fn baseline_prefers_newest_by_date<S>(store: S)
where
    S: RosterStore + RosterWriter,
{
    let s = Student::new("Carla", "Mendes", date(2023, 1, 1));
    store.insert_student(&s).unwrap();
    assert_eq!(baseline_date(&store, &s.id).unwrap(), date(2023, 1, 1));

    // Inserted out of date order: the newest by date is not the last insert.
    for (from, to, on) in [
        (0, 1, date(2023, 4, 1)),
        (2, 3, date(2023, 10, 1)),
        (1, 2, date(2023, 7, 1)),
    ] {
        store
            .apply_promotion(&PromotionRecord::new(
                s.id.clone(),
                pos(Rank::White, from),
                pos(Rank::White, to),
                on,
            ))
            .unwrap();
    }
    assert_eq!(baseline_date(&store, &s.id).unwrap(), date(2023, 10, 1));
}

#[test]
fn baseline_prefers_newest_by_date_memory() {
    baseline_prefers_newest_by_date(MemoryStore::new());
}

#[test]
fn baseline_prefers_newest_by_date_sqlite() {
    baseline_prefers_newest_by_date(SqliteStore::open_in_memory().unwrap());
}

// ── Roster pass ──────────────────────────────────────────────────────

#[test]
fn roster_pass_matches_serial_computation() {
    let tracker = PromotionTracker::with_today(MemoryStore::new(), today());
    let mut t = ThresholdConfig::default();
    t.stripe_thresholds.set(Rank::White, 5);
    tracker.save_thresholds(&t).unwrap();

    for i in 0..40u32 {
        let stripes = (i % 5) as u8;
        let s = tracker
            .enroll(
                Student::new(format!("Student{i:02}"), format!("Family{i:02}"), date(2024, 1, 1))
                    .with_position(pos(Rank::White, stripes)),
            )
            .unwrap();
        attend(&tracker, &s, date(2024, 2, 1), i * 7 % 30);
    }

    let parallel = tracker.all_statuses().unwrap();
    assert_eq!(parallel.len(), 40);

    let thresholds = load_thresholds(tracker.store()).unwrap();
    for (row, student) in parallel.iter().zip(tracker.store().active_students().unwrap()) {
        assert_eq!(row.student.id, student.id);
        let since = baseline_date(tracker.store(), &student.id).unwrap();
        let classes = tracker
            .store()
            .count_attendance_on_or_after(&student.id, since)
            .unwrap();
        let serial = compute_status(
            student.position,
            classes,
            (today() - since).num_days(),
            since,
            &thresholds,
        );
        assert_eq!(row.status, serial);
    }
}

#[test]
fn saved_thresholds_drive_the_next_pass() {
    let tracker = PromotionTracker::with_today(SqliteStore::open_in_memory().unwrap(), today());
    let s = tracker
        .enroll(Student::new("Davi", "Costa", date(2024, 8, 1)))
        .unwrap();
    attend(&tracker, &s, date(2024, 8, 1), 10);
    assert!(!tracker.student_status(&s.id).unwrap().stripe_due);

    let mut t = tracker.thresholds().unwrap();
    t.stripe_thresholds.set(Rank::White, 10);
    save_thresholds(tracker.store(), &t).unwrap();
    assert!(tracker.student_status(&s.id).unwrap().stripe_due);
}

#[test]
fn report_over_live_roster() {
    let tracker = PromotionTracker::with_today(MemoryStore::new(), today());
    let due = tracker
        .enroll(Student::new("Ana", "Silva", date(2024, 6, 1)))
        .unwrap();
    attend(&tracker, &due, date(2024, 6, 1), 25);
    let eligible = tracker
        .enroll(
            Student::new("Bruno", "Alves", date(2023, 1, 1)).with_position(pos(Rank::Brown, 4)),
        )
        .unwrap();
    attend(&tracker, &eligible, date(2024, 1, 1), 150);
    tracker
        .enroll(Student::new("Carla", "Mendes", date(2024, 8, 20)))
        .unwrap();

    let report = PromotionReport::new(tracker.all_statuses().unwrap());
    let summary = report.summary();
    assert_eq!((summary.total, summary.stripe_due, summary.belt_eligible), (3, 1, 1));

    let selected = report.select(&ReportQuery::default());
    let urgent: Vec<&str> = selected
        .iter()
        .map(|r| r.student.last_name.as_str())
        .collect();
    assert_eq!(urgent, vec!["Alves", "Silva", "Mendes"]);

    let waiting = report.select(&ReportQuery {
        standing: StandingFilter::InProgress,
        ..ReportQuery::default()
    });
    assert_eq!(waiting.len(), 1);
}
