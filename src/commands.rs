//! サブコマンドの実行

use crate::api::{ApiClient, ScanTarget};
use crate::capture::{AfterScan, CapturePipeline, FileCamera, NoticeBoard, NoticeKind, ScanOutcome};
use crate::cli::{ClassesAction, Commands, CoursesAction, StudentsAction};
use crate::config::Config;
use crate::display;
use crate::error::{AttendanceError, ErrorKind};
use crate::inference::Classifier;
use crate::session::{FileTokenStore, Session};
use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use palm_attendance_common::{
    evaluate_now, search, Facet, FacetOptions, FilterSet, ScanDirection,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// 確認プロンプト（--yes なら省略）
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub async fn run(command: Commands) -> Result<()> {
    let mut config = Config::load()?;
    let store = Arc::new(FileTokenStore::new(Config::session_path()?));
    let session = Session::with_env(store);

    match command {
        Commands::Login { token } => {
            session.store().set_token(&token)?;
            println!("✔ Token disimpan");
            let client = ApiClient::from_config(&config, session)?;
            let profile = client.profile().await?;
            println!("{}", display::render_profile(&profile));
        }

        Commands::Logout => {
            session.store().clear()?;
            println!("✔ Logout berhasil");
        }

        Commands::Whoami => {
            let client = ApiClient::from_config(&config, session.clone())?;
            let profile = match client.profile().await {
                Ok(profile) => profile,
                Err(e) if e.kind() == ErrorKind::Transport => match session.store().cached_profile() {
                    Some(cached) => {
                        warn!(error = %e, "サーバーに接続できないためキャッシュを表示");
                        cached
                    }
                    None => return Err(e.into()),
                },
                Err(e) => return Err(e.into()),
            };
            println!("{}", display::render_profile(&profile));
        }

        Commands::Config { set_base_url, set_scan_endpoint, show } => {
            let mut changed = false;
            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ API URL: {}", config.base_url);
                changed = true;
            }
            if let Some(endpoint) = set_scan_endpoint {
                config.scan_endpoint = endpoint;
                println!("✔ スキャン送信先: {}", endpoint);
                changed = true;
            }
            if changed {
                config.save()?;
            }
            if show || !changed {
                println!("{}", display::render_config(&config));
            }
        }

        Commands::Dashboard => {
            let client = ApiClient::from_config(&config, session)?;
            let dashboard = client.admin_dashboard(Local::now().date_naive()).await?;
            println!("{}", display::render_admin_dashboard(&dashboard, now()));
        }

        Commands::Schedule => {
            let client = ApiClient::from_config(&config, session)?;
            let (profile, items) = tokio::try_join!(client.profile(), client.today_schedule())?;
            println!("{}", display::render_schedule(Some(&profile), &items, now()));
        }

        Commands::Meetings { class } => {
            let client = ApiClient::from_config(&config, session)?;
            let meetings = match class {
                Some(id) => client.meetings_by_class(id).await?,
                None => client.all_meetings().await?,
            };
            println!("{}", display::render_meetings(&meetings, now()));
        }

        Commands::Roster { class, meeting } => {
            let client = ApiClient::from_config(&config, session)?;
            let students = client.class_students(class, meeting).await?;
            println!("{}", display::render_roster(&students));
        }

        Commands::Students { action } => {
            let client = ApiClient::from_config(&config, session)?;
            run_students(&client, action).await?;
        }

        Commands::Courses { action } => {
            let client = ApiClient::from_config(&config, session)?;
            match action {
                CoursesAction::List { search: query } => {
                    let courses = client.courses().await?;
                    let matched = search(&courses, query.as_deref().unwrap_or(""));
                    println!("{}", display::render_courses(&matched));
                }
                CoursesAction::Delete { id, yes } => {
                    if confirm(&format!("Hapus mata kuliah {}?", id), yes)? {
                        client.delete_course(id).await?;
                        println!("✔ Mata kuliah berhasil dihapus");
                    }
                }
            }
        }

        Commands::Classes { action } => {
            let client = ApiClient::from_config(&config, session)?;
            match action {
                ClassesAction::List => {
                    let classes = client.classes().await?;
                    println!("{}", display::render_classes(&classes));
                }
                ClassesAction::Delete { id, yes } => {
                    if confirm(&format!("Hapus kelas {}?", id), yes)? {
                        client.delete_class(id).await?;
                        println!("✔ Kelas berhasil dihapus");
                    }
                }
            }
        }

        Commands::History { semester, year, course, class } => {
            let client = ApiClient::from_config(&config, session)?;
            let profile = client.profile().await?;
            let history = client.student_history(profile.id).await?;

            let mut filters = FilterSet::default();
            for (facet, value) in [
                (Facet::Semester, semester),
                (Facet::AcademicYear, year),
                (Facet::Course, course),
                (Facet::Class, class),
            ] {
                if let Some(value) = value {
                    filters.set(facet, value);
                }
            }
            let options = FacetOptions::derive(&history);
            let shown = filters.apply(&history);
            println!("{}", display::render_history(&shown, &filters, &options));
        }

        Commands::MyCourses { semester, year } => {
            let client = ApiClient::from_config(&config, session)?;
            let year = year.unwrap_or_else(|| Local::now().year().to_string());
            let profile = client.profile().await?;
            let courses = client.student_courses(profile.id, semester, &year).await?;
            println!("{}", display::render_student_courses(&courses, semester, &year));
        }

        Commands::Scan { meeting, course, direction, camera, endpoint, repeat } => {
            let target = match (meeting, course) {
                (Some(id), _) => ScanTarget::Meeting(id),
                (None, Some(id)) => ScanTarget::Course(id),
                (None, None) => bail!("--meeting atau --course harus diisi"),
            };
            let client = ApiClient::from_config(&config, session)?;
            run_scan(&config, client, ScanArgs { target, direction, camera, endpoint, repeat }).await?;
        }

        Commands::Predict { image } => {
            let classifier = Classifier::from_config(&config);
            if !classifier.initialize() {
                bail!("Gagal menginisialisasi model");
            }
            match classifier.predict(&image) {
                Some(prediction) => println!("{}", display::render_prediction(&prediction)),
                None => bail!("Prediksi gagal"),
            }
        }
    }

    Ok(())
}

async fn run_students(client: &ApiClient, action: StudentsAction) -> Result<()> {
    match action {
        StudentsAction::Add { class, ids } => {
            client.add_class_students(class, &ids).await?;
            println!("✔ Mahasiswa berhasil ditambahkan");
        }
        StudentsAction::Remove { class, student, yes } => {
            let roster = client.class_students(class, None).await?;
            let name = roster
                .iter()
                .find(|s| s.id == student)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| student.to_string());
            if confirm(&format!("Hapus {} dari kelas?", name), yes)? {
                client.remove_class_student(class, student).await?;
                println!("✔ Mahasiswa berhasil dihapus dari kelas");
            }
        }
        StudentsAction::Available { class, search: query } => {
            let available = client.available_students(class).await?;
            let matched = search(&available, query.as_deref().unwrap_or(""));
            println!("{}", display::render_students(&matched));
        }
    }
    Ok(())
}

struct ScanArgs {
    target: ScanTarget,
    direction: ScanDirection,
    camera: PathBuf,
    endpoint: Option<crate::api::ScanEndpoint>,
    repeat: bool,
}

async fn run_scan(config: &Config, client: ApiClient, args: ScanArgs) -> Result<()> {
    let endpoint = args.endpoint.unwrap_or(config.scan_endpoint);

    // 授業回の時間帯で押せないボタンは拒否
    if let ScanTarget::Meeting(id) = args.target {
        match client.find_meeting(id).await? {
            Some(meeting) => {
                let eval = evaluate_now(&meeting);
                println!("Pertemuan {}: {}", meeting.id, eval.status.label());
                if let Some(reason) = eval.refusal(args.direction) {
                    bail!("Scan {} tidak tersedia: {}", args.direction.label(), reason);
                }
            }
            None => debug!(id, "授業回が一覧にないため状態確認を省略"),
        }
    }

    let pipeline = CapturePipeline::new(FileCamera::new(&args.camera), client, endpoint, config.temp_dir());
    let mut board = NoticeBoard::new(Duration::from_secs(config.notice_seconds));

    loop {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Scan {}...", args.direction.label()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let outcome = pipeline.run(args.target, args.direction).await;
        spinner.finish_and_clear();

        let Some(outcome) = outcome else {
            println!("Scan sedang diproses");
            continue;
        };

        if let ScanOutcome::Failed { kind: ErrorKind::Authentication, .. } = outcome {
            return Err(AttendanceError::Unauthenticated.into());
        }

        board.show_outcome(&outcome);
        print_notice(&mut board);

        match AfterScan::decide(&outcome, args.repeat) {
            AfterScan::NavigateBack => return Ok(()),
            AfterScan::StayInline if !args.repeat => bail!("{}", outcome.message()),
            AfterScan::StayInline => {
                if !Confirm::new().with_prompt("Scan lagi?").default(true).interact()? {
                    return Ok(());
                }
                // 表示期限内ならメッセージを再表示
                print_notice(&mut board);
            }
        }
    }
}

fn print_notice(board: &mut NoticeBoard) {
    if let Some(notice) = board.current() {
        match notice.kind {
            NoticeKind::Success => println!("✔ {}", notice.text),
            NoticeKind::Error => println!("✖ {}", notice.text),
        }
    }
}
