//! 管理者ダッシュボードの集計

use crate::types::{AttendanceRecord, Meeting};
use chrono::NaiveDate;

/// ダッシュボードの統計値
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_courses: usize,
    pub total_classes: usize,
    pub total_meetings: usize,
    pub total_attendance: usize,
    /// 出席率（%）= 出席記録数 / (学生数 × 授業回数) × 100
    pub attendance_rate: f64,
    /// 本日の出席者数
    pub present_today: usize,
}

/// 集計の入力（件数のみ必要なものは件数で受け取る）
#[derive(Debug, Clone, Copy)]
pub struct DashboardCounts {
    pub students: usize,
    pub courses: usize,
    pub classes: usize,
}

impl DashboardStats {
    pub fn compute(
        counts: DashboardCounts,
        meetings: &[Meeting],
        history: &[AttendanceRecord],
        today: NaiveDate,
    ) -> Self {
        let total_meetings = meetings.len();
        let total_attendance = history.len();
        let slots = counts.students * total_meetings;
        let attendance_rate = if slots > 0 {
            total_attendance as f64 / slots as f64 * 100.0
        } else {
            0.0
        };

        let today_str = iso_date(today);
        let present_today = history
            .iter()
            .filter(|r| r.status.is_present())
            .filter(|r| r.meeting.as_ref().map(|m| m.date == today_str).unwrap_or(false))
            .count();

        Self {
            total_students: counts.students,
            total_courses: counts.courses,
            total_classes: counts.classes,
            total_meetings,
            total_attendance,
            attendance_rate,
            present_today,
        }
    }
}

/// 指定日の授業回を抽出
pub fn meetings_on(meetings: &[Meeting], day: NaiveDate) -> Vec<&Meeting> {
    let day_str = iso_date(day);
    meetings.iter().filter(|m| m.date == day_str).collect()
}

fn iso_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttendanceStatus;

    fn meeting(id: i64, date: &str) -> Meeting {
        Meeting {
            id,
            date: date.to_string(),
            start_time: "08:00:00".into(),
            end_time: "10:00:00".into(),
            ..Default::default()
        }
    }

    fn record(status: &str, date: &str) -> AttendanceRecord {
        AttendanceRecord {
            status: AttendanceStatus::from(status.to_string()),
            meeting: Some(meeting(1, date)),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_attendance_rate() {
        let meetings = vec![meeting(1, "2024-03-01"), meeting(2, "2024-03-08")];
        let history = vec![
            record("present", "2024-03-01"),
            record("present", "2024-02-23"),
            record("Terlambat", "2024-03-01"),
        ];
        let counts = DashboardCounts { students: 3, courses: 2, classes: 4 };
        let stats = DashboardStats::compute(counts, &meetings, &history, today());
        assert_eq!(stats.total_meetings, 2);
        assert_eq!(stats.total_attendance, 3);
        assert!((stats.attendance_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.present_today, 1);
        assert_eq!(stats.total_classes, 4);
    }

    #[test]
    fn test_rate_without_meetings_is_zero() {
        let counts = DashboardCounts { students: 10, courses: 0, classes: 0 };
        let stats = DashboardStats::compute(counts, &[], &[record("present", "2024-03-01")], today());
        assert_eq!(stats.attendance_rate, 0.0);
    }

    #[test]
    fn test_rate_without_students_is_zero() {
        let counts = DashboardCounts { students: 0, courses: 0, classes: 0 };
        let stats = DashboardStats::compute(counts, &[meeting(1, "2024-03-01")], &[], today());
        assert_eq!(stats.attendance_rate, 0.0);
    }

    #[test]
    fn test_meetings_on() {
        let meetings = vec![meeting(1, "2024-03-01"), meeting(2, "2024-03-02"), meeting(3, "2024-03-01")];
        let ids: Vec<i64> = meetings_on(&meetings, today()).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
