//! 型付きエンドポイント呼び出し

use super::{extract_list, extract_object, ApiClient};
use crate::error::Result;
use chrono::NaiveDate;
use palm_attendance_common::{
    meetings_on, AcademicTerm, AttendanceRecord, ClassInfo, Course, DashboardCounts,
    DashboardStats, Meeting, ScheduleItem, Semester, Student, StudentCourse, UserProfile,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Serialize)]
struct RosterChange<'a> {
    class_id: i64,
    student_ids: &'a [i64],
}

/// 管理者ダッシュボードの内容
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub stats: DashboardStats,
    pub today_meetings: Vec<Meeting>,
    pub term: AcademicTerm,
}

impl ApiClient {
    // --- 授業回 ---

    pub async fn meetings_by_class(&self, class_id: i64) -> Result<Vec<Meeting>> {
        let body = self.get_json(&format!("/meetings/by-class/{}", class_id)).await?;
        extract_list(&body, "meetings")
    }

    pub async fn all_meetings(&self) -> Result<Vec<Meeting>> {
        let body = self.get_json("/meetings/all").await?;
        extract_list(&body, "meetings")
    }

    /// 授業回を1件探す（/meetings/all から）
    pub async fn find_meeting(&self, meeting_id: i64) -> Result<Option<Meeting>> {
        Ok(self
            .all_meetings()
            .await?
            .into_iter()
            .find(|m| m.id == meeting_id))
    }

    // --- 受講者 ---

    /// クラスの受講者（meeting_id を付けるとその回の出欠つき）
    pub async fn class_students(&self, class_id: i64, meeting_id: Option<i64>) -> Result<Vec<Student>> {
        let path = format!("/class-students/by-class/{}", class_id);
        let body = match meeting_id {
            Some(id) => self.get_json_query(&path, &[("meeting_id", id.to_string())]).await?,
            None => self.get_json(&path).await?,
        };
        extract_list(&body, "students")
    }

    pub async fn add_class_students(&self, class_id: i64, student_ids: &[i64]) -> Result<()> {
        info!(class_id, count = student_ids.len(), "受講者を追加");
        self.post_json("/class-students/add", &RosterChange { class_id, student_ids })
            .await?;
        Ok(())
    }

    pub async fn remove_class_student(&self, class_id: i64, student_id: i64) -> Result<()> {
        info!(class_id, student_id, "受講者を削除");
        self.post_json(
            "/class-students/remove",
            &RosterChange { class_id, student_ids: &[student_id] },
        )
        .await?;
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<Student>> {
        let body = self.get_json("/user/").await?;
        extract_list(&body, "users")
    }

    /// まだクラスに登録されていない学生
    pub async fn available_students(&self, class_id: i64) -> Result<Vec<Student>> {
        let enrolled = self.class_students(class_id, None).await?;
        let users = self.users().await?;
        Ok(exclude_enrolled(users, &enrolled))
    }

    // --- 科目・クラス ---

    pub async fn courses(&self) -> Result<Vec<Course>> {
        let body = self.get_json("/courses/").await?;
        extract_list(&body, "courses")
    }

    pub async fn delete_course(&self, id: i64) -> Result<()> {
        info!(id, "科目を削除");
        self.delete(&format!("/courses/{}", id)).await?;
        Ok(())
    }

    pub async fn classes(&self) -> Result<Vec<ClassInfo>> {
        let body = self.get_json("/classes/").await?;
        extract_list(&body, "classes")
    }

    pub async fn delete_class(&self, id: i64) -> Result<()> {
        info!(id, "クラスを削除");
        self.delete(&format!("/classes/{}", id)).await?;
        Ok(())
    }

    // --- プロフィール・学生画面 ---

    /// プロフィールを取得してキャッシュに保存
    pub async fn profile(&self) -> Result<UserProfile> {
        let body = self.get_json("/user/profile").await?;
        let profile: UserProfile = extract_object(&body)?;
        if let Err(e) = self.session().store().cache_profile(&profile) {
            tracing::warn!(error = %e, "プロフィールのキャッシュに失敗");
        }
        Ok(profile)
    }

    pub async fn today_schedule(&self) -> Result<Vec<ScheduleItem>> {
        let body = self.get_json("/student/schedule/today").await?;
        extract_list(&body, "schedule")
    }

    pub async fn student_history(&self, student_id: i64) -> Result<Vec<AttendanceRecord>> {
        let body = self
            .get_json_query("/history", &[("student_id", student_id.to_string())])
            .await?;
        extract_list(&body, "history")
    }

    pub async fn admin_history(&self) -> Result<Vec<AttendanceRecord>> {
        let body = self.get_json("/admin/history/").await?;
        extract_list(&body, "history")
    }

    pub async fn student_courses(
        &self,
        student_id: i64,
        semester: Semester,
        academic_year: &str,
    ) -> Result<Vec<StudentCourse>> {
        let body = self
            .get_json_query(
                &format!("/courses/detail/by-student/{}", student_id),
                &[
                    ("semester", semester.as_query().to_string()),
                    ("academic_year", academic_year.to_string()),
                ],
            )
            .await?;
        extract_list(&body, "courses")
    }

    /// 管理者ダッシュボード（5つのAPIを同時に取得して集計）
    pub async fn admin_dashboard(&self, today: NaiveDate) -> Result<AdminDashboard> {
        let (users, courses, classes, meetings, history) = tokio::try_join!(
            self.users(),
            self.courses(),
            self.classes(),
            self.all_meetings(),
            self.admin_history(),
        )?;
        debug!(
            users = users.len(),
            meetings = meetings.len(),
            history = history.len(),
            "ダッシュボード取得完了"
        );

        let counts = DashboardCounts {
            students: users.len(),
            courses: courses.len(),
            classes: classes.len(),
        };
        let stats = DashboardStats::compute(counts, &meetings, &history, today);
        let today_meetings = meetings_on(&meetings, today).into_iter().cloned().collect();

        Ok(AdminDashboard {
            stats,
            today_meetings,
            term: AcademicTerm::for_date(today),
        })
    }
}

/// 登録済み（id一致）を除外
pub(crate) fn exclude_enrolled(users: Vec<Student>, enrolled: &[Student]) -> Vec<Student> {
    users
        .into_iter()
        .filter(|u| !enrolled.iter().any(|e| e.id == u.id))
        .collect()
}
