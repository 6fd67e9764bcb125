/// Types for timetable data
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ScheduleError;
use super::time_range::parse_time_range;

/// Kind of session a class entry represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ClassType {
    #[default]
    Theory,
    Lab,
    Practical,
    Tutorial,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Theory => "Theory",
            ClassType::Lab => "Lab",
            ClassType::Practical => "Practical",
            ClassType::Tutorial => "Tutorial",
        }
    }
}

impl TryFrom<String> for ClassType {
    type Error = ScheduleError;

    // Case-insensitive: "lab" and "Lab" are the same type.
    fn try_from(label: String) -> Result<Self, Self::Error> {
        let trimmed = label.trim();
        [
            ClassType::Theory,
            ClassType::Lab,
            ClassType::Practical,
            ClassType::Tutorial,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or(ScheduleError::UnknownClassType { label })
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of a weekday table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    /// e.g. "9:00 - 10:00" or "12:20 - 01:20"
    pub time_range: String,
    pub subject: String,
    pub room: String,
    pub instructor: String,
    #[serde(rename = "type", default)]
    pub class_type: ClassType,
}

impl ClassEntry {
    pub fn new(
        time_range: impl Into<String>,
        subject: impl Into<String>,
        room: impl Into<String>,
        instructor: impl Into<String>,
        class_type: ClassType,
    ) -> Self {
        Self {
            time_range: time_range.into(),
            subject: subject.into(),
            room: room.into(),
            instructor: instructor.into(),
            class_type,
        }
    }

    /// Parsed (start, end) of this entry, or `None` if the range is malformed.
    pub fn times(&self) -> Option<(NaiveTime, NaiveTime)> {
        parse_time_range(&self.time_range)
    }

    /// Parsed start time of this entry.
    pub fn start(&self) -> Option<NaiveTime> {
        self.times().map(|(start, _)| start)
    }
}

/// The classes of one weekday, in the order the table lists them.
///
/// Entries are not re-sorted by parsed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    entries: Vec<ClassEntry>,
    no_classes: bool,
}

impl DaySchedule {
    pub fn new(entries: Vec<ClassEntry>) -> Self {
        Self {
            entries,
            no_classes: false,
        }
    }

    /// The Sunday sentinel: a single placeholder row and nothing to attend.
    pub fn no_classes() -> Self {
        Self {
            entries: vec![ClassEntry::new(
                "Weekend",
                "No Classes",
                "N/A",
                "N/A",
                ClassType::Theory,
            )],
            no_classes: true,
        }
    }

    pub fn is_no_classes(&self) -> bool {
        self.no_classes
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DaySchedule {
    type Item = &'a ClassEntry;
    type IntoIter = std::slice::Iter<'a, ClassEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Identifies one class group: (department, year, class).
///
/// This is also what gets persisted as the user's selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleKey {
    pub department: String,
    pub year: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

impl ScheduleKey {
    pub fn new(
        department: impl Into<String>,
        year: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            year: year.into(),
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.department, self.year, self.class_name)
    }
}
