//! 画面内メッセージ（一定時間で消える）

use super::ScanOutcome;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    shown_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

/// 直近のメッセージを1件だけ保持する
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn show(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.show_at(kind, text, Instant::now());
    }

    pub fn show_at(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            text: text.into(),
            shown_at: now,
        });
    }

    pub fn show_outcome(&mut self, outcome: &ScanOutcome) {
        let kind = if outcome.is_success() {
            NoticeKind::Success
        } else {
            NoticeKind::Error
        };
        self.show(kind, outcome.message());
    }

    pub fn current(&mut self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// 期限切れなら消してから返す
    pub fn current_at(&mut self, now: Instant) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .map(|n| n.is_expired(self.ttl, now))
            .unwrap_or(false)
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// スキャン後の画面遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterScan {
    /// 前の画面に戻る
    NavigateBack,
    /// スキャン画面に留まりメッセージを表示
    StayInline,
}

impl AfterScan {
    /// 失敗時は常に留まる
    pub fn decide(outcome: &ScanOutcome, stay_on_screen: bool) -> Self {
        if outcome.is_success() && !stay_on_screen {
            AfterScan::NavigateBack
        } else {
            AfterScan::StayInline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        let t0 = Instant::now();
        board.show_at(NoticeKind::Success, "Absensi berhasil", t0);

        assert!(board.current_at(t0 + Duration::from_secs(4)).is_some());
        assert!(board.current_at(t0 + Duration::from_secs(5)).is_none());
        // 一度消えたら戻らない
        assert!(board.current_at(t0).is_none());
    }

    #[test]
    fn test_new_notice_replaces_old() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        board.show(NoticeKind::Error, "a");
        board.show(NoticeKind::Success, "b");
        let notice = board.current().unwrap();
        assert_eq!(notice.text, "b");
        assert_eq!(notice.kind, NoticeKind::Success);
    }

    #[test]
    fn test_after_scan() {
        let ok = ScanOutcome::Accepted { message: "ok".into(), data: None };
        let rejected = ScanOutcome::Rejected { message: "no".into() };
        assert_eq!(AfterScan::decide(&ok, false), AfterScan::NavigateBack);
        assert_eq!(AfterScan::decide(&ok, true), AfterScan::StayInline);
        assert_eq!(AfterScan::decide(&rejected, false), AfterScan::StayInline);
    }

    #[test]
    fn test_show_outcome_kind() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        board.show_outcome(&ScanOutcome::Rejected { message: "Telapak tangan tidak dikenali".into() });
        assert_eq!(board.current().unwrap().kind, NoticeKind::Error);
    }
}
