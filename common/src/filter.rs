//! 一覧の検索・絞り込み
//!
//! - 検索: 1〜2フィールドに対する大文字小文字を区別しない部分一致
//! - ファセット: 学期・学年度・科目名・クラス名の等価条件のAND
//!
//! ファセットの選択肢はサーバーの語彙ではなく、読み込んだ一覧から導出する。
//! 元の一覧は変更せず、順序も保つ。

use crate::types::{AttendanceRecord, Course, Student};

/// 検索対象フィールドを持つ型
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.course_id]
    }
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.nim]
    }
}

/// 部分一致検索（空クエリは全件）
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// 絞り込みの軸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Semester,
    AcademicYear,
    Course,
    Class,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Semester, Facet::AcademicYear, Facet::Course, Facet::Class];

    /// チップ表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            Facet::Semester => "Semester",
            Facet::AcademicYear => "Tahun",
            Facet::Course => "MK",
            Facet::Class => "Kelas",
        }
    }
}

/// ファセット値を取り出せる型
pub trait Faceted {
    fn facet_value(&self, facet: Facet) -> &str;
}

impl Faceted for AttendanceRecord {
    fn facet_value(&self, facet: Facet) -> &str {
        match facet {
            Facet::Semester => &self.course.semester,
            Facet::AcademicYear => &self.course.academic_year,
            Facet::Course => &self.course.name,
            Facet::Class => &self.class.name,
        }
    }
}

/// 選択中の絞り込み条件
///
/// 各ファセットは独立・任意。空文字は未選択として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub course: Option<String>,
    pub class: Option<String>,
}

impl FilterSet {
    fn slot_mut(&mut self, facet: Facet) -> &mut Option<String> {
        match facet {
            Facet::Semester => &mut self.semester,
            Facet::AcademicYear => &mut self.academic_year,
            Facet::Course => &mut self.course,
            Facet::Class => &mut self.class,
        }
    }

    pub fn get(&self, facet: Facet) -> Option<&str> {
        let slot = match facet {
            Facet::Semester => &self.semester,
            Facet::AcademicYear => &self.academic_year,
            Facet::Course => &self.course,
            Facet::Class => &self.class,
        };
        slot.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, facet: Facet, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(facet) = if value.is_empty() { None } else { Some(value) };
    }

    /// チップの×ボタン相当
    pub fn clear_facet(&mut self, facet: Facet) {
        *self.slot_mut(facet) = None;
    }

    /// 「Hapus Semua Filter」
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// 選択中のファセット（表示順）
    pub fn active(&self) -> Vec<(Facet, &str)> {
        Facet::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (*f, v)))
            .collect()
    }

    pub fn matches<T: Faceted>(&self, item: &T) -> bool {
        Facet::ALL.iter().all(|facet| match self.get(*facet) {
            Some(wanted) => item.facet_value(*facet) == wanted,
            None => true,
        })
    }

    pub fn apply<'a, T: Faceted>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}

/// ファセットごとの選択肢（出現順・重複なし）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub semesters: Vec<String>,
    pub academic_years: Vec<String>,
    pub courses: Vec<String>,
    pub classes: Vec<String>,
}

impl FacetOptions {
    /// 一覧から選択肢を導出（一覧が変わるたびに呼び直す）
    pub fn derive<T: Faceted>(items: &[T]) -> Self {
        let mut options = Self::default();
        for item in items {
            for facet in Facet::ALL {
                let value = item.facet_value(facet);
                let list = options.values_mut(facet);
                if !list.iter().any(|v| v == value) {
                    list.push(value.to_string());
                }
            }
        }
        options
    }

    fn values_mut(&mut self, facet: Facet) -> &mut Vec<String> {
        match facet {
            Facet::Semester => &mut self.semesters,
            Facet::AcademicYear => &mut self.academic_years,
            Facet::Course => &mut self.courses,
            Facet::Class => &mut self.classes,
        }
    }

    pub fn values(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Semester => &self.semesters,
            Facet::AcademicYear => &self.academic_years,
            Facet::Course => &self.courses,
            Facet::Class => &self.classes,
        }
    }
}
