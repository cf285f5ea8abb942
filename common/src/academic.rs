//! 学期・学年度の算出
//!
//! 8月〜12月は奇数学期（Ganjil, 学年度 `Y/Y+1`）、1月〜7月は偶数学期（Genap, 学年度 `Y-1/Y`）。

use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// 学期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Semester {
    #[default]
    Ganjil,
    Genap,
}

impl Semester {
    /// APIのクエリパラメータ値
    pub fn as_query(&self) -> &'static str {
        match self {
            Semester::Ganjil => "ganjil",
            Semester::Genap => "genap",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Semester::Ganjil => "Ganjil",
            Semester::Genap => "Genap",
        }
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ganjil" | "odd" => Ok(Semester::Ganjil),
            "genap" | "even" => Ok(Semester::Genap),
            _ => Err(format!("Unknown semester: {}. Use ganjil or genap", s)),
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 現在の学期と学年度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicTerm {
    pub semester: Semester,
    pub academic_year: String,
}

impl AcademicTerm {
    pub fn for_date(date: NaiveDate) -> Self {
        let year = date.year();
        if date.month() >= 8 {
            Self {
                semester: Semester::Ganjil,
                academic_year: format!("{}/{}", year, year + 1),
            }
        } else {
            Self {
                semester: Semester::Genap,
                academic_year: format!("{}/{}", year - 1, year),
            }
        }
    }

    pub fn current() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

impl fmt::Display for AcademicTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semester {} Tahun Ajaran {}", self.semester, self.academic_year)
    }
}
