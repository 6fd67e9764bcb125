//! Screen state machine.
//!
//! `update` is pure: side effects come back as [`Effect`]s for the host to
//! carry out against the preference store and the reminder scheduler.

use crate::prefs::UserSelection;
use crate::schedule::ScheduleKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    YearSelection {
        department: String,
    },
    ClassSelection {
        department: String,
        year: String,
    },
    Timetable(ScheduleKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    DepartmentSelected(String),
    YearSelected(String),
    ClassSelected(String),
    Back,
    /// Forget the saved class and start over
    ChangeClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveSelection(UserSelection),
    ClearSelection,
    ScheduleReminders(ScheduleKey),
    ClearReminders,
}

/// Screen to open on launch: straight to the timetable when a complete
/// selection was saved.
pub fn initial_screen(saved: Option<UserSelection>) -> Screen {
    match saved {
        Some(selection) => Screen::Timetable(selection),
        None => Screen::Home,
    }
}

/// Applies `msg` to `screen`. Messages that make no sense on the current
/// screen leave it unchanged.
pub fn update(screen: Screen, msg: Msg) -> (Screen, Vec<Effect>) {
    match (screen, msg) {
        (Screen::Home, Msg::DepartmentSelected(department)) => {
            (Screen::YearSelection { department }, Vec::new())
        }
        (Screen::YearSelection { department }, Msg::YearSelected(year)) => {
            (Screen::ClassSelection { department, year }, Vec::new())
        }
        (Screen::ClassSelection { department, year }, Msg::ClassSelected(class_name)) => {
            let key = ScheduleKey::new(department, year, class_name);
            (
                Screen::Timetable(key.clone()),
                vec![
                    Effect::SaveSelection(key.clone()),
                    Effect::ScheduleReminders(key),
                ],
            )
        }

        (Screen::YearSelection { .. }, Msg::Back) => (Screen::Home, Vec::new()),
        (Screen::ClassSelection { department, .. }, Msg::Back) => {
            (Screen::YearSelection { department }, Vec::new())
        }
        (Screen::Timetable(_), Msg::Back) => (Screen::Home, Vec::new()),

        (Screen::Timetable(_), Msg::ChangeClass) => (
            Screen::Home,
            vec![Effect::ClearSelection, Effect::ClearReminders],
        ),

        (screen, _) => (screen, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a8() -> ScheduleKey {
        ScheduleKey::new("School of Engineering", "Year 2", "A8")
    }

    #[test]
    fn test_full_selection_flow() {
        let (screen, effects) = update(
            Screen::Home,
            Msg::DepartmentSelected("School of Engineering".into()),
        );
        assert!(effects.is_empty());
        let (screen, _) = update(screen, Msg::YearSelected("Year 2".into()));
        assert_eq!(
            screen,
            Screen::ClassSelection {
                department: "School of Engineering".into(),
                year: "Year 2".into()
            }
        );

        let (screen, effects) = update(screen, Msg::ClassSelected("A8".into()));
        assert_eq!(screen, Screen::Timetable(a8()));
        assert_eq!(
            effects,
            vec![Effect::SaveSelection(a8()), Effect::ScheduleReminders(a8())]
        );
    }

    #[test]
    fn test_back_navigation() {
        let year = Screen::YearSelection {
            department: "School of Law".into(),
        };
        assert_eq!(update(year.clone(), Msg::Back).0, Screen::Home);

        let class = Screen::ClassSelection {
            department: "School of Law".into(),
            year: "Year 1".into(),
        };
        assert_eq!(update(class, Msg::Back).0, year);

        let (screen, effects) = update(Screen::Timetable(a8()), Msg::Back);
        assert_eq!(screen, Screen::Home);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_change_class_clears_everything() {
        let (screen, effects) = update(Screen::Timetable(a8()), Msg::ChangeClass);
        assert_eq!(screen, Screen::Home);
        assert_eq!(effects, vec![Effect::ClearSelection, Effect::ClearReminders]);
    }

    #[test]
    fn test_unexpected_message_is_ignored() {
        let (screen, effects) = update(Screen::Home, Msg::YearSelected("Year 1".into()));
        assert_eq!(screen, Screen::Home);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_initial_screen() {
        assert_eq!(initial_screen(None), Screen::Home);
        assert_eq!(initial_screen(Some(a8())), Screen::Timetable(a8()));
    }
}
