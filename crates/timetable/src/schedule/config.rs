/// Timetable data file and the lookup book built from it
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::error::ScheduleError;
use super::types::{ClassEntry, DaySchedule, ScheduleKey};

/// Timetable shipped with the binary.
const BUILTIN_TIMETABLE: &str = include_str!("../../data/timetable.json");

/// Weekday names as they appear in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl TableDay {
    pub fn from_chrono(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Top-level layout of the timetable data file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableFile {
    /// Used whenever no table matches a key
    pub default: Vec<ClassEntry>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// One weekday table set.
///
/// Leaving out `class` (or `year` and `class`) makes the table apply to every
/// class of that year (or the whole department).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub department: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "class", default)]
    pub class_name: Option<String>,
    pub days: HashMap<TableDay, Vec<ClassEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    department: String,
    year: Option<String>,
    class_name: Option<String>,
}

/// All weekday tables, keyed by (department, year, class, weekday).
#[derive(Debug, Clone)]
pub struct ScheduleBook {
    default: Vec<ClassEntry>,
    tables: HashMap<TableKey, HashMap<TableDay, Vec<ClassEntry>>>,
}

impl ScheduleBook {
    /// Builds the book from a parsed data file.
    ///
    /// Tables naming the same key are merged; a later weekday list replaces
    /// an earlier one.
    pub fn from_file(file: TimetableFile) -> Self {
        let mut tables: HashMap<TableKey, HashMap<TableDay, Vec<ClassEntry>>> = HashMap::new();

        for table in file.tables {
            let key = TableKey {
                department: table.department,
                year: table.year,
                class_name: table.class_name,
            };
            // A class without a year cannot be addressed by the lookup.
            if key.year.is_none() && key.class_name.is_some() {
                warn!(
                    department = %key.department,
                    "Ignoring class table without a year"
                );
                continue;
            }

            let days = tables.entry(key.clone()).or_default();
            for (day, entries) in table.days {
                if days.insert(day, entries).is_some() {
                    warn!(
                        department = %key.department,
                        year = ?key.year,
                        class = ?key.class_name,
                        day = ?day,
                        "Duplicate weekday table, keeping the later one"
                    );
                }
            }
        }

        Self {
            default: file.default,
            tables,
        }
    }

    /// Parses a book from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ScheduleError> {
        let file: TimetableFile = serde_json::from_str(json)?;
        Ok(Self::from_file(file))
    }

    /// Loads a book from a JSON data file.
    pub fn load_from_path(path: &Path) -> Result<Self, ScheduleError> {
        let content = fs::read_to_string(path).map_err(|e| ScheduleError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let book = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            tables = book.tables.len(),
            "Loaded timetable data"
        );
        Ok(book)
    }

    /// The timetable compiled into the binary.
    pub fn builtin() -> Result<Self, ScheduleError> {
        Self::from_json_str(BUILTIN_TIMETABLE)
    }

    /// Number of distinct (department, year, class) tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn default_schedule(&self) -> DaySchedule {
        DaySchedule::new(self.default.clone())
    }

    /// Resolves the classes for `key` on `weekday`.
    ///
    /// Sunday has no classes and Saturday repeats Monday. Otherwise the most
    /// specific table holding that weekday wins, and anything unmatched gets
    /// the default schedule. Never fails.
    pub fn day_schedule(&self, key: &ScheduleKey, weekday: Weekday) -> DaySchedule {
        let day = match weekday {
            Weekday::Sun => return DaySchedule::no_classes(),
            Weekday::Sat => TableDay::Monday,
            other => TableDay::from_chrono(other),
        };

        let candidates = [
            TableKey {
                department: key.department.clone(),
                year: Some(key.year.clone()),
                class_name: Some(key.class_name.clone()),
            },
            TableKey {
                department: key.department.clone(),
                year: Some(key.year.clone()),
                class_name: None,
            },
            TableKey {
                department: key.department.clone(),
                year: None,
                class_name: None,
            },
        ];

        candidates
            .iter()
            .find_map(|candidate| self.tables.get(candidate).and_then(|days| days.get(&day)))
            .map(|entries| DaySchedule::new(entries.clone()))
            .unwrap_or_else(|| self.default_schedule())
    }

    /// Resolves the classes for `key` on the weekday of `date`.
    pub fn for_date(&self, key: &ScheduleKey, date: NaiveDate) -> DaySchedule {
        self.day_schedule(key, date.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::ClassType;

    const SAMPLE: &str = r#"{
        "default": [
            {"time_range": "8:30 - 9:30", "subject": "General Studies", "room": "Room 101", "instructor": "Prof. General", "type": "Theory"}
        ],
        "tables": [
            {
                "department": "Engineering",
                "year": "Year 2",
                "class": "A1",
                "days": {
                    "monday": [{"time_range": "9:00 - 10:00", "subject": "Data Structures", "room": "Lab", "instructor": "Dr. S", "type": "lab"}],
                    "thursday": [{"time_range": "9:00 - 10:00", "subject": "Maths", "room": "102", "instructor": "Dr. M", "type": "Theory"}]
                }
            },
            {
                "department": "Medicine",
                "days": {
                    "monday": [{"time_range": "8:00 - 9:00", "subject": "Anatomy", "room": "Hall 1", "instructor": "Dr. W", "type": "Theory"}]
                }
            }
        ]
    }"#;

    fn book() -> ScheduleBook {
        ScheduleBook::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_exact_class_table() {
        let key = ScheduleKey::new("Engineering", "Year 2", "A1");
        let day = book().day_schedule(&key, Weekday::Mon);
        assert_eq!(day.entries()[0].subject, "Data Structures");
        assert_eq!(day.entries()[0].class_type, ClassType::Lab);
    }

    #[test]
    fn test_saturday_repeats_monday() {
        let key = ScheduleKey::new("Engineering", "Year 2", "A1");
        let b = book();
        assert_eq!(b.day_schedule(&key, Weekday::Sat), b.day_schedule(&key, Weekday::Mon));
    }

    #[test]
    fn test_sunday_has_no_classes() {
        let key = ScheduleKey::new("Engineering", "Year 2", "A1");
        assert!(book().day_schedule(&key, Weekday::Sun).is_no_classes());
    }

    #[test]
    fn test_department_wide_table_applies_to_every_class() {
        let key = ScheduleKey::new("Medicine", "Year 4", "A7");
        assert_eq!(book().day_schedule(&key, Weekday::Mon).entries()[0].subject, "Anatomy");
    }

    #[test]
    fn test_unmatched_key_or_day_falls_back_to_default() {
        let b = book();
        let unknown = ScheduleKey::new("Law", "Year 1", "A1");
        assert_eq!(b.day_schedule(&unknown, Weekday::Tue), b.default_schedule());

        // A1 has no Tuesday table.
        let a1 = ScheduleKey::new("Engineering", "Year 2", "A1");
        assert_eq!(b.day_schedule(&a1, Weekday::Tue), b.default_schedule());
    }

    #[test]
    fn test_unknown_class_type_is_rejected() {
        let json = r#"{"default": [{"time_range": "9:00 - 10:00", "subject": "S", "room": "R", "instructor": "I", "type": "Seminar"}]}"#;
        let err = ScheduleBook::from_json_str(json).unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_builtin_book_loads() {
        let b = ScheduleBook::builtin().unwrap();
        assert!(b.table_count() >= 6);
        assert_eq!(b.default_schedule().len(), 6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScheduleBook::load_from_path(Path::new("/nonexistent/timetable.json")).unwrap_err();
        assert!(matches!(err, ScheduleError::Io { .. }));
    }
}
