use crate::api::ScanEndpoint;
use clap::{Parser, Subcommand};
use palm_attendance_common::{ScanDirection, Semester};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "palm-attendance")]
#[command(about = "Klien presensi kampus dengan scan telapak tangan", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// トークンを保存してプロフィールを取得
    Login {
        /// Bearerトークン
        #[arg(long)]
        token: String,
    },

    /// トークンとキャッシュしたプロフィールを削除
    Logout,

    /// ログイン中のユーザーを表示
    Whoami,

    /// 設定の表示・変更
    Config {
        /// APIのベースURL
        #[arg(long)]
        set_base_url: Option<String>,

        /// スキャン送信先 (attendance-scan/scan-hand)
        #[arg(long)]
        set_scan_endpoint: Option<ScanEndpoint>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 管理者ダッシュボード（統計と本日の授業回）
    Dashboard,

    /// 学生の本日の時間割
    Schedule,

    /// 授業回の一覧と状態
    Meetings {
        /// クラスID（省略時は全件）
        #[arg(short, long)]
        class: Option<i64>,
    },

    /// クラスの受講者（授業回を指定すると出欠つき）
    Roster {
        #[arg(short, long)]
        class: i64,

        #[arg(short, long)]
        meeting: Option<i64>,
    },

    /// 受講者の追加・削除
    Students {
        #[command(subcommand)]
        action: StudentsAction,
    },

    /// 科目の一覧・削除
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },

    /// クラスの一覧・削除
    Classes {
        #[command(subcommand)]
        action: ClassesAction,
    },

    /// 出席履歴（絞り込みつき）
    History {
        #[arg(long)]
        semester: Option<String>,

        /// 学年度（例: 2024/2025）
        #[arg(long)]
        year: Option<String>,

        /// 科目名
        #[arg(long)]
        course: Option<String>,

        /// クラス名
        #[arg(long)]
        class: Option<String>,
    },

    /// 履修科目と出席率
    MyCourses {
        /// 学期 (ganjil/genap)
        #[arg(long, default_value = "ganjil")]
        semester: Semester,

        /// 学年度（デフォルト: 今年）
        #[arg(long)]
        year: Option<String>,
    },

    /// 手のひらスキャンで出席を記録
    Scan {
        /// 授業回ID
        #[arg(long, conflicts_with = "course", required_unless_present = "course")]
        meeting: Option<i64>,

        /// 科目ID（scan-hand のみ）
        #[arg(long)]
        course: Option<i64>,

        /// スキャン方向 (in/out)
        #[arg(short, long)]
        direction: ScanDirection,

        /// 画像ファイル、または最新の画像を使うフォルダ
        #[arg(long)]
        camera: PathBuf,

        /// 送信先を一時的に変更
        #[arg(long)]
        endpoint: Option<ScanEndpoint>,

        /// 成功後もスキャン画面に留まる
        #[arg(long)]
        repeat: bool,
    },

    /// 端末内モデルで画像を分類
    Predict {
        #[arg(required = true)]
        image: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum StudentsAction {
    /// 受講者を追加
    Add {
        #[arg(short, long)]
        class: i64,

        /// 学生ID（複数可）
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// 受講者を削除
    Remove {
        #[arg(short, long)]
        class: i64,

        student: i64,

        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },

    /// 未登録の学生を表示
    Available {
        #[arg(short, long)]
        class: i64,

        /// 名前/NIMで検索
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CoursesAction {
    List {
        /// 科目名/科目コードで検索
        #[arg(short, long)]
        search: Option<String>,
    },
    Delete {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ClassesAction {
    List,
    Delete {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },
}
