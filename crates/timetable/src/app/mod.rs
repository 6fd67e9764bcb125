//! Screen flow and the choices behind it.
mod catalog;
mod navigation;
mod notes;

pub use catalog::{classes, is_department, CLASS_COUNT, DEPARTMENTS, YEARS};
pub use navigation::{initial_screen, update, Effect, Msg, Screen};
pub use notes::{notes_target, NotesTarget, NOTES_URL};
