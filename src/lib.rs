//! Palm Attendance
//!
//! 授業の出席を手のひらスキャンで記録するクライアント

pub mod api;
pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod inference;
pub mod session;

pub use error::{AttendanceError, ErrorKind, Result};
