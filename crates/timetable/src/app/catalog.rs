//! Choices offered on the selection screens.

/// Departments listed on the home screen, in display order.
pub const DEPARTMENTS: [&str; 12] = [
    "School of Medicine",
    "School of Engineering",
    "School of AHS",
    "School of Agriculture Science",
    "School of Physiotherapy",
    "School of Pharmacy",
    "College of Nursing",
    "School of Architecture",
    "School of Management",
    "School of Arts and Science",
    "School of Law",
    "Centre for Research",
];

pub const YEARS: [&str; 4] = ["Year 1", "Year 2", "Year 3", "Year 4"];

/// Number of class sections per year.
pub const CLASS_COUNT: u32 = 10;

/// Class section names, "A1" through "A10".
pub fn classes() -> Vec<String> {
    (1..=CLASS_COUNT).map(|n| format!("A{}", n)).collect()
}

pub fn is_department(name: &str) -> bool {
    DEPARTMENTS.contains(&name)
}
