//! 端末向けの表示（各画面の代わり）
//!
//! どの関数も文字列を返すだけで、出力は呼び出し側で行う。

use crate::api::AdminDashboard;
use crate::config::Config;
use crate::inference::Prediction;
use chrono::NaiveDateTime;
use palm_attendance_common::{
    evaluate, AttendanceRecord, ClassInfo, Course, Facet, FacetOptions, FilterSet, Meeting,
    MeetingStatus, ScheduleItem, Semester, StatusTone, Student, StudentCourse, UserProfile,
    WindowEvaluation,
};

const NO_DATA: &str = "  (tidak ada data)";

fn tone_marker(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Good => "✔",
        StatusTone::Warning => "!",
        StatusTone::Bad => "✖",
        StatusTone::Neutral => "·",
    }
}

fn status_marker(status: MeetingStatus) -> &'static str {
    match status {
        MeetingStatus::NotStarted => "○",
        MeetingStatus::InProgress => "●",
        MeetingStatus::Ended => "✔",
        MeetingStatus::Unknown => "?",
    }
}

fn eligibility_text(eval: &WindowEvaluation) -> String {
    let flag = |b: bool| if b { "ya" } else { "tidak" };
    let mut text = format!(
        "scan masuk: {}, scan keluar: {}",
        flag(eval.can_scan_in()),
        flag(eval.can_scan_out())
    );
    if let Some(hint) = eval.hint() {
        text.push_str(&format!(" ({})", hint));
    }
    text
}

/// 授業回1行 + 状態の行
pub fn meeting_lines(meeting: &Meeting, title: Option<&str>, now: NaiveDateTime) -> Vec<String> {
    let eval = evaluate(meeting, now);
    let mut head = format!(
        "  {} [{}] {} {}-{}",
        status_marker(eval.status),
        meeting.id,
        meeting.date,
        meeting.start_time,
        meeting.end_time
    );
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        head.push_str(&format!("  {}", title));
    }
    if let Some(room) = meeting.room.as_deref().filter(|r| !r.is_empty()) {
        head.push_str(&format!("  Ruang {}", room));
    }
    vec![
        head,
        format!("      {} | {}", eval.status.label(), eligibility_text(&eval)),
    ]
}

pub fn render_meetings(meetings: &[Meeting], now: NaiveDateTime) -> String {
    let mut lines = vec![format!("Pertemuan ({}):", meetings.len())];
    if meetings.is_empty() {
        lines.push(NO_DATA.into());
    }
    for meeting in meetings {
        lines.extend(meeting_lines(meeting, None, now));
    }
    lines.join("\n")
}

pub fn render_admin_dashboard(dashboard: &AdminDashboard, now: NaiveDateTime) -> String {
    let s = &dashboard.stats;
    let mut lines = vec![
        "Dashboard Admin".to_string(),
        dashboard.term.to_string(),
        String::new(),
        format!("  Mahasiswa       : {}", s.total_students),
        format!("  Mata Kuliah     : {}", s.total_courses),
        format!("  Kelas           : {}", s.total_classes),
        format!("  Pertemuan       : {}", s.total_meetings),
        format!("  Total Presensi  : {}", s.total_attendance),
        format!("  Tingkat Hadir   : {:.1}%", s.attendance_rate),
        format!("  Hadir Hari Ini  : {}", s.present_today),
        String::new(),
        format!("Pertemuan Hari Ini ({}):", dashboard.today_meetings.len()),
    ];
    if dashboard.today_meetings.is_empty() {
        lines.push("  Tidak ada pertemuan hari ini".into());
    }
    for meeting in &dashboard.today_meetings {
        lines.extend(meeting_lines(meeting, None, now));
    }
    lines.join("\n")
}

pub fn render_schedule(profile: Option<&UserProfile>, items: &[ScheduleItem], now: NaiveDateTime) -> String {
    let mut lines = Vec::new();
    if let Some(p) = profile {
        lines.push(format!("Selamat datang, {}", p.name));
        if let Some(nim) = p.nim.as_deref().filter(|n| !n.is_empty()) {
            lines.push(format!("NIM: {}", nim));
        }
        lines.push(String::new());
    }
    lines.push(format!("Jadwal Hari Ini ({}):", items.len()));
    if items.is_empty() {
        lines.push("  Tidak ada jadwal hari ini".into());
    }
    for item in items {
        let course = item.course.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        let class = item.class.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        let title = match (course.is_empty(), class.is_empty()) {
            (false, false) => format!("{} - {}", course, class),
            (false, true) => course.to_string(),
            _ => class.to_string(),
        };
        lines.extend(meeting_lines(&item.meeting, Some(&title), now));
    }
    lines.join("\n")
}

pub fn render_roster(students: &[Student]) -> String {
    let mut lines = vec![format!("Mahasiswa ({}):", students.len())];
    if students.is_empty() {
        lines.push(NO_DATA.into());
    }
    for s in students {
        let mut line = format!("  [{}] {} ({})", s.id, s.name, s.nim);
        if let Some(status) = &s.status {
            line.push_str(&format!("  {} {}", tone_marker(status.tone()), status.label()));
        }
        if let Some(t) = s.check_in_time.as_deref() {
            line.push_str(&format!("  masuk {}", t));
        }
        if let Some(t) = s.check_out_time.as_deref() {
            line.push_str(&format!("  keluar {}", t));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_students(students: &[&Student]) -> String {
    let mut lines = vec![format!("Mahasiswa tersedia ({}):", students.len())];
    if students.is_empty() {
        lines.push(NO_DATA.into());
    }
    for s in students {
        lines.push(format!("  [{}] {} ({})", s.id, s.name, s.nim));
    }
    lines.join("\n")
}

pub fn render_courses(courses: &[&Course]) -> String {
    let mut lines = vec![format!("Mata Kuliah ({}):", courses.len())];
    if courses.is_empty() {
        lines.push(NO_DATA.into());
    }
    for c in courses {
        lines.push(format!(
            "  [{}] {} {}  Semester {} {}",
            c.id, c.course_id, c.name, c.semester, c.academic_year
        ));
    }
    lines.join("\n")
}

pub fn render_classes(classes: &[ClassInfo]) -> String {
    let mut lines = vec![format!("Kelas ({}):", classes.len())];
    if classes.is_empty() {
        lines.push(NO_DATA.into());
    }
    for c in classes {
        let mut line = format!("  [{}] {}", c.id, c.name);
        if let Some(room) = c.room.as_deref() {
            line.push_str(&format!("  Ruang {}", room));
        }
        if let Some(schedule) = c.schedule.as_deref() {
            line.push_str(&format!("  {}", schedule));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_history(records: &[&AttendanceRecord], filters: &FilterSet, options: &FacetOptions) -> String {
    let mut lines = Vec::new();
    if !filters.is_empty() {
        let active: Vec<String> = filters
            .active()
            .iter()
            .map(|(facet, value)| format!("{}: {}", facet.label(), value))
            .collect();
        lines.push(format!("Filter: {}", active.join(", ")));
    }
    for facet in Facet::ALL {
        let values = options.values(facet);
        if !values.is_empty() {
            lines.push(format!("  {} tersedia: {}", facet.label(), values.join(" | ")));
        }
    }
    lines.push(format!("Riwayat Presensi ({}):", records.len()));
    if records.is_empty() {
        lines.push("  Tidak ada riwayat presensi".into());
    }
    for r in records {
        let date = r.meeting.as_ref().map(|m| m.date.as_str()).unwrap_or("-");
        lines.push(format!(
            "  {} {} {} - {}  {}",
            tone_marker(r.status.tone()),
            date,
            r.course.name,
            r.class.name,
            r.status.label()
        ));
        let times: Vec<String> = [("masuk", &r.check_in_time), ("keluar", &r.check_out_time)]
            .iter()
            .filter_map(|(label, t)| t.as_deref().map(|t| format!("{} {}", label, t)))
            .collect();
        if !times.is_empty() {
            lines.push(format!("      {}", times.join(", ")));
        }
    }
    lines.join("\n")
}

pub fn render_student_courses(courses: &[StudentCourse], semester: Semester, academic_year: &str) -> String {
    let mut lines = vec![format!(
        "Mata Kuliah Semester {} {} ({}):",
        semester.label(),
        academic_year,
        courses.len()
    )];
    if courses.is_empty() {
        lines.push("  Tidak ada mata kuliah".into());
    }
    for c in courses {
        let mut line = format!("  {}", c.name);
        if let Some(class) = c.class_name.as_deref() {
            line.push_str(&format!(" ({})", class));
        }
        line.push_str(&format!("  Kehadiran {}%", c.rounded_rate()));
        lines.push(line);
        if let Some(lecturer) = c.lecturer.as_deref() {
            lines.push(format!("      Dosen: {}", lecturer));
        }
    }
    lines.join("\n")
}

pub fn render_profile(profile: &UserProfile) -> String {
    let mut lines = vec![
        format!("ID    : {}", profile.id),
        format!("Nama  : {}", profile.name),
        format!("Email : {}", profile.email),
    ];
    if let Some(nim) = &profile.nim {
        lines.push(format!("NIM   : {}", nim));
    }
    if let Some(role) = &profile.role {
        lines.push(format!("Role  : {}", role));
    }
    lines.join("\n")
}

pub fn render_prediction(prediction: &Prediction) -> String {
    let mut lines = vec![format!(
        "Hasil Prediksi: {} ({:.1}%)",
        prediction.label,
        prediction.confidence * 100.0
    )];
    for (label, score) in &prediction.scores {
        lines.push(format!("  {:<24} {:.4}", label, score));
    }
    lines.join("\n")
}

pub fn render_config(config: &Config) -> String {
    let or_default = |p: &Option<std::path::PathBuf>, d: &str| {
        p.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| d.to_string())
    };
    [
        "設定:".to_string(),
        format!("  API URL: {}", config.api_base_url()),
        format!("  スキャン送信先: {}", config.scan_endpoint),
        format!("  メッセージ表示: {}秒", config.notice_seconds),
        format!("  一時ディレクトリ: {}", config.temp_dir().display()),
        format!("  モデル: {}", or_default(&config.model_path, "同梱")),
        format!(
            "  タイムアウト: {}",
            config
                .request_timeout_seconds
                .map(|s| format!("{}秒", s))
                .unwrap_or_else(|| "既定".into())
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use palm_attendance_common::{AttendanceStatus, ClassRef, CourseRef};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn meeting() -> Meeting {
        Meeting {
            id: 12,
            date: "2024-03-01".into(),
            start_time: "08:00:00".into(),
            end_time: "10:00:00".into(),
            room: Some("B201".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_meeting_lines_in_progress() {
        let lines = meeting_lines(&meeting(), Some("Basis Data"), at("2024-03-01T09:00:00"));
        assert!(lines[0].contains("[12]"));
        assert!(lines[0].contains("Basis Data"));
        assert!(lines[0].contains("Ruang B201"));
        assert!(lines[1].contains("Sedang Berlangsung"));
        assert!(lines[1].contains("scan masuk: ya, scan keluar: ya"));
    }

    #[test]
    fn test_meeting_lines_ended_hint() {
        let lines = meeting_lines(&meeting(), None, at("2024-03-01T11:00:00"));
        assert!(lines[1].contains("Selesai"));
        assert!(lines[1].contains("Hanya tersedia scan keluar"));
    }

    #[test]
    fn test_history_rendering() {
        let record = AttendanceRecord {
            course: CourseRef { name: "Jaringan".into(), ..Default::default() },
            class: ClassRef { name: "TI-2A".into(), ..Default::default() },
            status: AttendanceStatus::Late,
            check_in_time: Some("08:20".into()),
            ..Default::default()
        };
        let records = vec![record];
        let refs: Vec<&AttendanceRecord> = records.iter().collect();
        let mut filters = FilterSet::default();
        filters.set(Facet::Course, "Jaringan");
        let text = render_history(&refs, &filters, &FacetOptions::derive(&records));
        assert!(text.contains("Filter: MK: Jaringan"));
        assert!(text.contains("! - Jaringan - TI-2A  Terlambat"));
        assert!(text.contains("masuk 08:20"));
    }

    #[test]
    fn test_empty_roster() {
        assert!(render_roster(&[]).contains("tidak ada data"));
    }
}
