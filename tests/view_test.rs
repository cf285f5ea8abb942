//! 時間帯判定と一覧絞り込みの性質テスト

use chrono::{Duration, NaiveDateTime};
use palm_attendance_common::{
    evaluate, AttendanceRecord, AttendanceStatus, ClassRef, CourseRef, Facet, FacetOptions,
    FilterSet, Meeting, MeetingStatus,
};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn meeting(date: &str, start: &str, end: &str) -> Meeting {
    Meeting {
        id: 1,
        date: date.into(),
        start_time: start.into(),
        end_time: end.into(),
        ..Default::default()
    }
}

/// 1日を10分刻みで走査し、状態と可否の関係を確認
#[test]
fn test_window_properties_over_a_day() {
    let m = meeting("2024-03-01", "08:00:00", "10:00:00");
    let start = at("2024-03-01T08:00:00");
    let end = at("2024-03-01T10:00:00");
    let mut now = at("2024-03-01T00:00:00");

    while now < at("2024-03-02T00:00:00") {
        let eval = evaluate(&m, now);
        let expected = if now < start {
            MeetingStatus::NotStarted
        } else if now <= end {
            MeetingStatus::InProgress
        } else {
            MeetingStatus::Ended
        };
        assert_eq!(eval.status, expected, "at {}", now);
        assert_eq!(eval.can_scan_in(), eval.status != MeetingStatus::Ended);
        assert_eq!(eval.can_scan_out(), eval.status != MeetingStatus::NotStarted);
        now += Duration::minutes(10);
    }
}

#[test]
fn test_window_boundaries() {
    let m = meeting("2024-03-01", "08:00:00", "10:00:00");
    assert_eq!(evaluate(&m, at("2024-03-01T08:00:00")).status, MeetingStatus::InProgress);
    assert_eq!(evaluate(&m, at("2024-03-01T10:00:00")).status, MeetingStatus::InProgress);
    assert_eq!(evaluate(&m, at("2024-03-01T07:59:59")).status, MeetingStatus::NotStarted);
    assert_eq!(evaluate(&m, at("2024-03-01T10:00:01")).status, MeetingStatus::Ended);
}

#[test]
fn test_window_scenarios() {
    let m = meeting("2024-03-01", "08:00:00", "10:00:00");

    let during = evaluate(&m, at("2024-03-01T09:00:00"));
    assert_eq!(during.status, MeetingStatus::InProgress);
    assert!(during.can_scan_in() && during.can_scan_out());

    let after = evaluate(&m, at("2024-03-01T11:00:00"));
    assert_eq!(after.status, MeetingStatus::Ended);
    assert!(!after.can_scan_in());
    assert!(after.can_scan_out());
}

fn record(id: i64, semester: &str, year: &str, course: &str, class: &str) -> AttendanceRecord {
    AttendanceRecord {
        id,
        course: CourseRef {
            name: course.into(),
            semester: semester.into(),
            academic_year: year.into(),
            ..Default::default()
        },
        class: ClassRef { name: class.into(), ..Default::default() },
        status: AttendanceStatus::Present,
        ..Default::default()
    }
}

fn history() -> Vec<AttendanceRecord> {
    vec![
        record(1, "Ganjil", "2023/2024", "Algoritma", "TI-1A"),
        record(2, "Genap", "2023/2024", "Basis Data", "TI-1B"),
        record(3, "Ganjil", "2024/2025", "Algoritma", "TI-1B"),
        record(4, "Ganjil", "2023/2024", "Basis Data", "TI-1A"),
        record(5, "Genap", "2024/2025", "Jaringan", "TI-2A"),
    ]
}

fn ids(records: &[&AttendanceRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

/// 空のフィルタは元の一覧をそのままの順序で返す
#[test]
fn test_empty_filter_is_identity() {
    let all = history();
    assert_eq!(ids(&FilterSet::default().apply(&all)), vec![1, 2, 3, 4, 5]);
}

/// 2つのファセットは積集合
#[test]
fn test_two_facets_intersect() {
    let all = history();
    let mut by_semester = FilterSet::default();
    by_semester.set(Facet::Semester, "Ganjil");
    let mut by_class = FilterSet::default();
    by_class.set(Facet::Class, "TI-1A");
    let mut both = by_semester.clone();
    both.set(Facet::Class, "TI-1A");

    let a = ids(&by_semester.apply(&all));
    let b = ids(&by_class.apply(&all));
    let expected: Vec<i64> = a.iter().copied().filter(|id| b.contains(id)).collect();
    assert_eq!(ids(&both.apply(&all)), expected);
    assert_eq!(expected, vec![1, 4]);
}

/// 導出した選択肢の組み合わせのうち、該当する記録がある組は必ず非空
#[test]
fn test_derived_options_reach_every_record() {
    let all = history();
    let options = FacetOptions::derive(&all);

    for semester in options.values(Facet::Semester) {
        for year in options.values(Facet::AcademicYear) {
            for course in options.values(Facet::Course) {
                for class in options.values(Facet::Class) {
                    let mut filters = FilterSet::default();
                    filters.set(Facet::Semester, semester.as_str());
                    filters.set(Facet::AcademicYear, year.as_str());
                    filters.set(Facet::Course, course.as_str());
                    filters.set(Facet::Class, class.as_str());

                    let any_match = all.iter().any(|r| {
                        &r.course.semester == semester
                            && &r.course.academic_year == year
                            && &r.course.name == course
                            && &r.class.name == class
                    });
                    assert_eq!(!filters.apply(&all).is_empty(), any_match);
                }
            }
        }
    }
}

/// 一覧が変われば選択肢も変わる
#[test]
fn test_options_follow_collection() {
    let mut all = history();
    assert_eq!(FacetOptions::derive(&all).values(Facet::Course).len(), 3);
    all.retain(|r| r.course.name != "Jaringan");
    let options = FacetOptions::derive(&all);
    assert_eq!(options.values(Facet::Course), ["Algoritma", "Basis Data"]);
    assert_eq!(options.values(Facet::Semester), ["Ganjil", "Genap"]);
}
