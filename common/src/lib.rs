//! Palm Attendance Common Library
//!
//! クライアント本体から使う純粋な型とロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod meeting_window;
pub mod filter;
pub mod academic;
pub mod stats;

pub use types::{
    AttendanceRecord, AttendanceStatus, ClassInfo, ClassRef, Course, CourseRef, Meeting,
    ScanDirection, ScheduleItem, StatusTone, Student, StudentCourse, StudentRef, UserProfile,
};
pub use error::{Error, Result};
pub use meeting_window::{
    evaluate, evaluate_now, MeetingStatus, MeetingWindow, ScanEligibility, WindowEvaluation,
};
pub use filter::{search, Facet, FacetOptions, Faceted, FilterSet, Searchable};
pub use academic::{AcademicTerm, Semester};
pub use stats::{meetings_on, DashboardCounts, DashboardStats};
