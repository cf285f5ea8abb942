//! 授業回の時間帯判定
//!
//! 日付文字列と時刻文字列を `"{date}T{time}"` として連結し、ローカル時刻として解釈する。
//! タイムゾーン変換は行わない（サーバーと同じ壁時計で比較する前提）。
//!
//! 判定は毎回現在時刻から計算し直す。結果はキャッシュしない。
//!
//! | 現在時刻                 | ステータス  | 入室 | 退室 |
//! |--------------------------|-------------|------|------|
//! | `now < start`            | NotStarted  | ○    | ×    |
//! | `start <= now <= end`    | InProgress  | ○    | ○    |
//! | `now > end`              | Ended       | ×    | ○    |

use crate::error::{Error, Result};
use crate::types::{Meeting, ScanDirection};
use chrono::{Local, NaiveDateTime};

/// 連結後の日時として受け付けるフォーマット
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// 授業回の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
    NotStarted,
    InProgress,
    Ended,
    /// 日付・時刻が解釈できない
    Unknown,
}

impl MeetingStatus {
    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            MeetingStatus::NotStarted => "Belum Dimulai",
            MeetingStatus::InProgress => "Sedang Berlangsung",
            MeetingStatus::Ended => "Selesai",
            MeetingStatus::Unknown => "Tidak Diketahui",
        }
    }

    /// 入退室スキャンの可否
    pub fn eligibility(&self) -> ScanEligibility {
        match self {
            MeetingStatus::Unknown => ScanEligibility {
                can_scan_in: false,
                can_scan_out: false,
            },
            status => ScanEligibility {
                can_scan_in: *status != MeetingStatus::Ended,
                can_scan_out: *status != MeetingStatus::NotStarted,
            },
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 入退室スキャンの可否
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEligibility {
    pub can_scan_in: bool,
    pub can_scan_out: bool,
}

impl ScanEligibility {
    pub fn allows(&self, direction: ScanDirection) -> bool {
        match direction {
            ScanDirection::In => self.can_scan_in,
            ScanDirection::Out => self.can_scan_out,
        }
    }
}

/// 授業回の開始・終了日時
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MeetingWindow {
    pub fn from_parts(date: &str, start_time: &str, end_time: &str) -> Result<Self> {
        Ok(Self {
            start: combine_date_time(date, start_time)?,
            end: combine_date_time(date, end_time)?,
        })
    }

    pub fn from_meeting(meeting: &Meeting) -> Result<Self> {
        Self::from_parts(&meeting.date, &meeting.start_time, &meeting.end_time)
    }

    /// 開始・終了の両端は InProgress に含める
    pub fn status_at(&self, now: NaiveDateTime) -> MeetingStatus {
        if now < self.start {
            MeetingStatus::NotStarted
        } else if now <= self.end {
            MeetingStatus::InProgress
        } else {
            MeetingStatus::Ended
        }
    }
}

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvaluation {
    pub status: MeetingStatus,
    pub eligibility: ScanEligibility,
}

impl WindowEvaluation {
    pub fn can_scan_in(&self) -> bool {
        self.eligibility.can_scan_in
    }

    pub fn can_scan_out(&self) -> bool {
        self.eligibility.can_scan_out
    }

    /// スキャンボタンの下に出す補足メッセージ
    pub fn hint(&self) -> Option<&'static str> {
        let ScanEligibility { can_scan_in, can_scan_out } = self.eligibility;
        if !can_scan_in && can_scan_out {
            Some("Hanya tersedia scan keluar")
        } else {
            None
        }
    }

    /// 押せないスキャンを選んだときの理由（押せるなら None）
    pub fn refusal(&self, direction: ScanDirection) -> Option<&'static str> {
        if self.eligibility.allows(direction) {
            return None;
        }
        match (self.status, direction) {
            (MeetingStatus::Ended, ScanDirection::In) => Some("Pertemuan telah selesai. Scan tidak tersedia."),
            (status, _) => Some(status.label()),
        }
    }
}

/// 授業回を指定時刻で判定
pub fn evaluate(meeting: &Meeting, now: NaiveDateTime) -> WindowEvaluation {
    let status = match MeetingWindow::from_meeting(meeting) {
        Ok(window) => window.status_at(now),
        Err(_) => MeetingStatus::Unknown,
    };
    WindowEvaluation {
        status,
        eligibility: status.eligibility(),
    }
}

/// 授業回を現在のローカル時刻で判定
pub fn evaluate_now(meeting: &Meeting) -> WindowEvaluation {
    evaluate(meeting, Local::now().naive_local())
}

/// `"{date}T{time}"` を連結してローカル日時として解釈
pub fn combine_date_time(date: &str, time: &str) -> Result<NaiveDateTime> {
    let joined = format!("{}T{}", date.trim(), time.trim());
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
        .ok_or_else(|| Error::Parse(format!("日時を解釈できません: {}", joined)))
}
