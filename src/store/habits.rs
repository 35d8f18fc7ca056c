//! Habit mutations and completion-date helpers.

use crate::error::{AppError, AppResult};
use crate::types::{Habit, HabitFrequency, HabitPatch, NewHabit, new_id};
use chrono::{DateTime, Datelike, Duration, NaiveDate};
use std::collections::HashSet;

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    Ok(())
}

/// Calendar day of a completion entry. Accepts RFC 3339 instants (UTC day)
/// and bare `YYYY-MM-DD` dates.
pub fn completion_day(entry: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(entry)
        .map(|dt| dt.naive_utc().date())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(entry, "%Y-%m-%d").ok())
}

/// Canonical completion instant for a day: midnight UTC.
///
/// Toggling compares entries by exact string, so callers should always
/// normalise through this before toggling.
pub fn completion_key(day: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", day.format("%Y-%m-%d"))
}

impl Habit {
    /// Build a habit from user input with a fresh id and empty history.
    pub fn create(input: NewHabit) -> AppResult<Self> {
        validate_name(&input.name)?;
        Ok(Self {
            id: new_id(),
            name: input.name,
            frequency: input.frequency,
            color: input.color,
            icon: input.icon,
            streak: 0,
            completions: Vec::new(),
        })
    }

    fn completed_days(&self) -> HashSet<NaiveDate> {
        self.completions
            .iter()
            .filter_map(|c| completion_day(c))
            .collect()
    }

    /// Whether any completion entry falls on `day`.
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completions
            .iter()
            .any(|c| completion_day(c) == Some(day))
    }

    /// Entry to toggle for `day`: the stored one when the day is already
    /// completed, otherwise the canonical key. Keeps one entry per day.
    pub fn entry_for_day(&self, day: NaiveDate) -> String {
        self.completions
            .iter()
            .find(|c| completion_day(c) == Some(day))
            .cloned()
            .unwrap_or_else(|| completion_key(day))
    }

    /// Consecutive completed periods ending at `today`, computed from the
    /// completion set. A period that is still open (today, or this week) and
    /// not yet completed does not break the streak.
    ///
    /// The stored `streak` counter is independent and never recomputed.
    pub fn derived_streak(&self, today: NaiveDate) -> u32 {
        let days = self.completed_days();
        match self.frequency {
            HabitFrequency::Daily => {
                let mut cursor = if days.contains(&today) {
                    today
                } else {
                    today - Duration::days(1)
                };
                let mut streak = 0;
                while days.contains(&cursor) {
                    streak += 1;
                    cursor -= Duration::days(1);
                }
                streak
            }
            HabitFrequency::Weekly => {
                let weeks: HashSet<(i32, u32)> = days
                    .iter()
                    .map(|d| {
                        let w = d.iso_week();
                        (w.year(), w.week())
                    })
                    .collect();
                let week_of = |d: NaiveDate| {
                    let w = d.iso_week();
                    (w.year(), w.week())
                };
                let mut cursor = if weeks.contains(&week_of(today)) {
                    today
                } else {
                    today - Duration::weeks(1)
                };
                let mut streak = 0;
                while weeks.contains(&week_of(cursor)) {
                    streak += 1;
                    cursor -= Duration::weeks(1);
                }
                streak
            }
        }
    }
}

/// Add `date` to the habit's completions, or remove it when already present.
/// Matching is by exact string. Returns `false` for an unknown habit.
pub(crate) fn toggle_completion(habits: &mut [Habit], habit_id: &str, date: &str) -> bool {
    let Some(habit) = habits.iter_mut().find(|h| h.id == habit_id) else {
        return false;
    };
    if let Some(pos) = habit.completions.iter().position(|c| c == date) {
        habit.completions.remove(pos);
    } else {
        habit.completions.push(date.to_string());
    }
    true
}

pub(crate) fn add_habit(habits: &mut Vec<Habit>, habit: Habit) -> AppResult<()> {
    validate_name(&habit.name)?;
    if habits.iter().any(|h| h.id == habit.id) {
        return Err(AppError::already_exists(&habit.id));
    }
    habits.push(habit);
    Ok(())
}

pub(crate) fn update_habit(
    habits: &mut [Habit],
    habit_id: &str,
    patch: &HabitPatch,
) -> AppResult<bool> {
    if let Some(ref name) = patch.name {
        validate_name(name)?;
    }
    match habits.iter_mut().find(|h| h.id == habit_id) {
        Some(habit) => {
            patch.apply_to(habit);
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn delete_habit(habits: &mut Vec<Habit>, habit_id: &str) -> bool {
    let before = habits.len();
    habits.retain(|h| h.id != habit_id);
    habits.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn habit(completions: &[&str]) -> Habit {
        let mut h = Habit::create(NewHabit::new("Read")).unwrap();
        h.completions = completions.iter().map(|c| c.to_string()).collect();
        h
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut habits = vec![habit(&["2024-07-20T10:00:00Z"])];
        let id = habits[0].id.clone();

        assert!(toggle_completion(&mut habits, &id, "2024-07-20T10:00:00Z"));
        assert!(habits[0].completions.is_empty());

        assert!(toggle_completion(&mut habits, &id, "2024-07-20T10:00:00Z"));
        assert_eq!(habits[0].completions, vec!["2024-07-20T10:00:00Z"]);
    }

    #[test]
    fn toggle_matches_exact_string_only() {
        let mut habits = vec![habit(&["2024-07-20T10:00:00Z"])];
        let id = habits[0].id.clone();
        toggle_completion(&mut habits, &id, "2024-07-20T11:00:00Z");
        assert_eq!(habits[0].completions.len(), 2);
    }

    #[test]
    fn toggle_unknown_habit_is_noop() {
        let mut habits = vec![habit(&[])];
        assert!(!toggle_completion(&mut habits, "missing", "2024-07-20"));
        assert!(habits[0].completions.is_empty());
    }

    #[test]
    fn create_zeroes_derived_fields() {
        let h = Habit::create(NewHabit::new("Stretch")).unwrap();
        assert_eq!(h.streak, 0);
        assert!(h.completions.is_empty());
        assert!(!h.id.is_empty());

        assert!(Habit::create(NewHabit::new(" ")).is_err());
    }

    #[test]
    fn completion_day_parses_instants_and_dates() {
        assert_eq!(completion_day("2024-07-20T23:30:00Z"), Some(day("2024-07-20")));
        assert_eq!(completion_day("2024-07-21"), Some(day("2024-07-21")));
        assert_eq!(completion_day("yesterday"), None);
        assert_eq!(completion_key(day("2024-07-21")), "2024-07-21T00:00:00.000Z");
    }

    #[test]
    fn entry_for_day_reuses_the_stored_entry() {
        let h = habit(&["2024-07-20T10:00:00Z"]);
        assert_eq!(h.entry_for_day(day("2024-07-20")), "2024-07-20T10:00:00Z");
        assert_eq!(h.entry_for_day(day("2024-07-21")), "2024-07-21T00:00:00.000Z");
    }

    #[test]
    fn daily_streak_counts_back_from_today_or_yesterday() {
        let h = habit(&[
            "2024-07-20T10:00:00Z",
            "2024-07-21T10:00:00Z",
            "2024-07-22T10:00:00Z",
        ]);
        assert_eq!(h.derived_streak(day("2024-07-22")), 3);
        assert_eq!(h.derived_streak(day("2024-07-23")), 3);
        assert_eq!(h.derived_streak(day("2024-07-24")), 0);
        assert!(h.is_completed_on(day("2024-07-21")));
    }

    #[test]
    fn weekly_streak_counts_iso_weeks() {
        let mut h = habit(&["2024-07-01", "2024-07-10", "2024-07-15"]);
        h.frequency = HabitFrequency::Weekly;
        assert_eq!(h.derived_streak(day("2024-07-17")), 3);
        assert_eq!(h.derived_streak(day("2024-07-24")), 3);
        assert_eq!(h.derived_streak(day("2024-07-31")), 0);
    }

    #[test]
    fn update_and_delete_unknown_ids_are_noops() {
        let mut habits = vec![habit(&[])];
        let patch = HabitPatch {
            name: Some("Read more".into()),
            ..Default::default()
        };
        assert!(!update_habit(&mut habits, "missing", &patch).unwrap());
        assert!(!delete_habit(&mut habits, "missing"));
        assert_eq!(habits.len(), 1);
    }
}
