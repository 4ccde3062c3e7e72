use rattendance::core::clock::SchoolClock;
use rattendance::core::recorder::AttendanceRecorder;
use rattendance::core::store::AttendanceStore;
use rattendance::core::sweeper::AbsenteeSweeper;
use rattendance::db::initialize::init_db;
use rattendance::db::pool::DbPool;
use rattendance::db::queries::{enroll_subject, list_records};
use rattendance::db::settings::save_timetable;
use rattendance::core::provider::{SnapshotOrigin, TimetableProvider};
use rattendance::models::{
    AttendanceStatus, Channel, DetectionEvent, GraceConfig, Outcome, PeriodDefinition,
    RejectReason, SubjectKind, SubjectRef, TimetableConfig,
};
use chrono::{NaiveTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

mod common;
use common::setup_test_db;

fn open(path: &str) -> DbPool {
    let pool = DbPool::with_timeout(path, 5000).expect("open db");
    init_db(&pool.conn).expect("init db");
    pool
}

fn one_period() -> TimetableConfig {
    TimetableConfig {
        periods: vec![PeriodDefinition::new(
            1,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            45,
        )],
        grace: GraceConfig::new(5, 20).unwrap(),
        weekly_holidays: BTreeSet::new(),
        ..TimetableConfig::default()
    }
}

fn scan(clock: &SchoolClock, id: &str, at: &str) -> DetectionEvent {
    DetectionEvent::new(
        SubjectRef::student(id),
        clock.parse_instant(at).unwrap(),
        Channel::Rfid,
    )
}

#[test]
fn racing_scans_create_exactly_one_record() {
    let db_path = setup_test_db("engine_race");
    {
        let pool = open(&db_path);
        enroll_subject(&pool.conn, &SubjectRef::student("S"), "").unwrap();
    }

    const THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let path = db_path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let pool = DbPool::with_timeout(&path, 5000).unwrap();
                let clock = SchoolClock::default();
                let event = scan(&clock, "S", "2025-09-01 08:03");
                barrier.wait();
                AttendanceRecorder::new(&pool)
                    .evaluate(&one_period(), &event)
                    .unwrap()
                    .outcome()
            })
        })
        .collect();

    let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let new = outcomes.iter().filter(|o| **o == Outcome::AcceptedNew).count();
    let dup = outcomes
        .iter()
        .filter(|o| **o == Outcome::AcceptedDuplicate)
        .count();
    assert_eq!(new, 1);
    assert_eq!(dup, THREADS - 1);

    let pool = open(&db_path);
    assert_eq!(list_records(&pool.conn, None, None).unwrap().len(), 1);
}

#[test]
fn full_day_scenario_with_sweep() {
    let db_path = setup_test_db("engine_scenario");
    let pool = open(&db_path);
    for id in ["S", "S2", "S3"] {
        enroll_subject(&pool.conn, &SubjectRef::student(id), "").unwrap();
    }

    let clock = SchoolClock::default();
    let tt = one_period();
    let rec = AttendanceRecorder::new(&pool);

    let present = rec.evaluate(&tt, &scan(&clock, "S", "2025-09-01 08:03")).unwrap();
    assert_eq!(present.outcome(), Outcome::AcceptedNew);
    assert_eq!(present.status(), Some(AttendanceStatus::Present));

    let dup = rec.evaluate(&tt, &scan(&clock, "S", "2025-09-01 08:12")).unwrap();
    assert_eq!(dup.outcome(), Outcome::AcceptedDuplicate);
    assert_eq!(dup.message(), "Already marked (PRESENT)");

    let late = rec.evaluate(&tt, &scan(&clock, "S2", "2025-09-01 08:25")).unwrap();
    assert_eq!(late.reason(), Some(RejectReason::WindowClosed));

    let early = rec.evaluate(&tt, &scan(&clock, "S3", "2025-09-01 07:55")).unwrap();
    assert_eq!(early.reason(), Some(RejectReason::NoActivePeriod));

    let sweeper = AbsenteeSweeper::new(&pool);
    let report = sweeper
        .sweep(&tt, clock.parse_instant("2025-09-01 08:46").unwrap())
        .unwrap();
    assert_eq!(report.created, 2);

    let again = sweeper
        .sweep(&tt, clock.parse_instant("2025-09-01 08:50").unwrap())
        .unwrap();
    assert_eq!(again.created, 0);

    let records = list_records(&pool.conn, None, Some(SubjectKind::Student)).unwrap();
    let absent: BTreeSet<String> = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Absent)
        .map(|r| r.subject.id.to_string())
        .collect();
    assert_eq!(absent, BTreeSet::from(["S2".to_string(), "S3".to_string()]));
    for r in records.iter().filter(|r| r.status == AttendanceStatus::Absent) {
        assert_eq!(r.local_at().format("%H:%M").to_string(), "08:45");
        assert_eq!(r.source, "sweeper");
    }

    // audit trail
    let audited: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation IN ('attendance', 'sweep')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(audited, 2);
}

#[test]
fn utc_detections_are_shifted_to_school_time() {
    let db_path = setup_test_db("engine_utc");
    let pool = open(&db_path);
    let clock = SchoolClock::from_offset_str("+05:30").unwrap();

    // 02:33 UTC = 08:03 IST
    let detected = clock.to_school_local(Utc.with_ymd_and_hms(2025, 9, 1, 2, 33, 0).unwrap());
    let event = DetectionEvent::new(SubjectRef::student("S"), detected, Channel::Face);

    let ev = AttendanceRecorder::new(&pool)
        .evaluate(&one_period(), &event)
        .unwrap();
    assert_eq!(ev.status(), Some(AttendanceStatus::Present));
}

#[test]
fn provider_reads_stored_timetable_from_sqlite() {
    let db_path = setup_test_db("engine_provider");
    let pool = open(&db_path);

    let provider = TimetableProvider::new(&pool, Duration::ZERO);
    assert_eq!(provider.snapshot_with_origin().1, SnapshotOrigin::BuiltInDefault);

    save_timetable(&pool.conn, &one_period()).unwrap();
    let (tt, origin) = provider.snapshot_with_origin();
    assert_eq!(origin, SnapshotOrigin::Store);
    assert_eq!(tt.periods.len(), 1);
    assert!(pool.list_enrolled(SubjectKind::Staff).unwrap().is_empty());
}
