//! サーバーから受け取るデータの型定義
//!
//! すべてサーバー側で作成・更新されるレコードで、クライアントは読み取り専用。
//! フィールド名はAPIのJSON（snake_case）に合わせている。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 授業回（ミーティング）
///
/// `date` は `YYYY-MM-DD`、`start_time`/`end_time` は `HH:MM[:SS]` の文字列のまま保持する。
/// 開始 < 終了 はサーバー側の前提で、クライアントでは検証しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meeting {
    pub id: i64,
    pub class_id: Option<i64>,
    pub course_id: Option<i64>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
}

/// 科目（Mata Kuliah）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    pub id: i64,
    /// 科目コード（例: "IF2110"）
    pub course_id: String,
    pub name: String,
    pub semester: String,
    pub academic_year: String,
}

/// クラス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    pub course_id: Option<i64>,
    pub room: Option<String>,
    pub schedule: Option<String>,
}

/// 履歴レコードに埋め込まれる科目の射影
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRef {
    pub id: Option<i64>,
    pub name: String,
    pub semester: String,
    pub academic_year: String,
}

/// 履歴レコードに埋め込まれるクラスの射影
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassRef {
    pub id: Option<i64>,
    pub name: String,
}

/// 学生の射影
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRef {
    pub id: Option<i64>,
    pub name: String,
    pub nim: String,
}

/// 学生（名簿の1行）
///
/// `meeting_id` 付きで名簿を取得した場合のみ入退室時刻と出席ステータスが入る。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    pub id: i64,
    pub name: String,
    /// 学籍番号
    pub nim: String,
    pub email: String,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub status: Option<AttendanceStatus>,
}

/// ログインユーザーのプロフィール
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub nim: Option<String>,
    pub role: Option<String>,
}

/// 出席レコード
///
/// 学生の履歴 (`/history`) と管理者の履歴 (`/admin/history/`) で共通。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceRecord {
    pub id: i64,
    pub meeting: Option<Meeting>,
    pub student: Option<StudentRef>,
    pub class: ClassRef,
    pub course: CourseRef,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
}

/// 本日の時間割の1件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleItem {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub course: Option<CourseRef>,
    pub class: Option<ClassRef>,
}

/// 学生の履修科目（出席率つき）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentCourse {
    pub id: i64,
    pub class_id: Option<i64>,
    pub course_id: Option<String>,
    pub name: String,
    pub class_name: Option<String>,
    pub lecturer: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    pub attendance_rate: f64,
}

impl StudentCourse {
    /// 表示用に丸めた出席率（%）
    pub fn rounded_rate(&self) -> i64 {
        self.attendance_rate.round() as i64
    }
}

/// 出席ステータス
///
/// サーバーはインドネシア語ラベル（"Hadir" など）を返すが、管理者履歴では
/// 英語の `present` が使われるため両方を受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    Present,
    Late,
    #[default]
    Absent,
    Other(String),
}

/// ステータスの色分け（元の画面の green/orange/red/gray）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Good,
    Warning,
    Bad,
    Neutral,
}

impl AttendanceStatus {
    pub fn label(&self) -> &str {
        match self {
            AttendanceStatus::Present => "Hadir",
            AttendanceStatus::Late => "Terlambat",
            AttendanceStatus::Absent => "Belum Hadir",
            AttendanceStatus::Other(s) => s,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            AttendanceStatus::Present => StatusTone::Good,
            AttendanceStatus::Late => StatusTone::Warning,
            AttendanceStatus::Absent => StatusTone::Bad,
            AttendanceStatus::Other(_) => StatusTone::Neutral,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl From<String> for AttendanceStatus {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hadir" | "present" => AttendanceStatus::Present,
            "terlambat" | "late" => AttendanceStatus::Late,
            "belum hadir" | "absent" | "" => AttendanceStatus::Absent,
            _ => AttendanceStatus::Other(s),
        }
    }
}

impl From<AttendanceStatus> for String {
    fn from(status: AttendanceStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// スキャン方向（入室 / 退室）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    In,
    Out,
}

impl ScanDirection {
    /// multipart の `scan_type` に入れる値
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanDirection::In => "in",
            ScanDirection::Out => "out",
        }
    }

    /// ボタン表示名
    pub fn label(&self) -> &'static str {
        match self {
            ScanDirection::In => "Masuk",
            ScanDirection::Out => "Keluar",
        }
    }
}

impl FromStr for ScanDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "masuk" => Ok(ScanDirection::In),
            "out" | "keluar" => Ok(ScanDirection::Out),
            _ => Err(format!("Unknown scan direction: {}. Use in or out", s)),
        }
    }
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
