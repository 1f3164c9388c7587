use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of the primary work timer. Completing it always counts as a
/// focus session.
pub const WORK_TIMER_ID: &str = "work";

/// A named countdown duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDefinition {
    pub id: String,
    pub name: String,
    /// Duration in seconds.
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    /// Built-in timers cannot be deleted.
    #[serde(rename = "is_default", default)]
    pub is_protected: bool,
}

impl TimerDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_secs,
            is_protected: false,
        }
    }

    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }

    /// Whether completing this timer counts toward the session tally.
    pub fn is_focus(&self) -> bool {
        self.id == WORK_TIMER_ID || self.name.to_lowercase().contains("focus")
    }
}

/// Ordered, non-empty list of timer definitions with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimerList {
    timers: Vec<TimerDefinition>,
}

impl TimerList {
    /// Build a list, rejecting empty input and duplicate ids.
    pub fn new(timers: Vec<TimerDefinition>) -> Result<Self, ValidationError> {
        if timers.is_empty() {
            return Err(ValidationError::EmptyCollection("timers".into()));
        }
        for (i, timer) in timers.iter().enumerate() {
            if timers[..i].iter().any(|t| t.id == timer.id) {
                return Err(ValidationError::DuplicateId {
                    collection: "timers".into(),
                    id: timer.id.clone(),
                });
            }
        }
        Ok(Self { timers })
    }

    /// The built-in timer set.
    pub fn builtin() -> Self {
        Self {
            timers: builtin_timers(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TimerDefinition> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> &TimerDefinition {
        // Non-empty by construction.
        &self.timers[0]
    }

    /// Look up `id`, falling back to the first entry.
    pub fn resolve(&self, id: &str) -> &TimerDefinition {
        self.get(id).unwrap_or_else(|| self.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimerDefinition> {
        self.timers.iter()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'de> Deserialize<'de> for TimerList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let timers = Vec::<TimerDefinition>::deserialize(deserializer)?;
        TimerList::new(timers).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a TimerList {
    type Item = &'a TimerDefinition;
    type IntoIter = std::slice::Iter<'a, TimerDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.timers.iter()
    }
}

/// Built-in timers, in display order.
pub fn builtin_timers() -> Vec<TimerDefinition> {
    vec![
        TimerDefinition::new(WORK_TIMER_ID, "Focus", 25 * 60).protected(),
        TimerDefinition::new("shortBreak", "Short Break", 5 * 60).protected(),
        TimerDefinition::new("longBreak", "Long Break", 15 * 60).protected(),
        TimerDefinition::new("lunchBreak", "Lunch Break", 60 * 60).protected(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list_has_four_protected_timers() {
        let list = TimerList::builtin();
        assert_eq!(list.len(), 4);
        assert!(list.iter().all(|t| t.is_protected));
        assert_eq!(list.first().id, WORK_TIMER_ID);
    }

    #[test]
    fn empty_list_is_rejected() {
        assert_eq!(
            TimerList::new(Vec::new()),
            Err(ValidationError::EmptyCollection("timers".into()))
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = TimerList::new(vec![
            TimerDefinition::new("a", "A", 60),
            TimerDefinition::new("a", "Again", 120),
        ]);
        assert!(matches!(result, Err(ValidationError::DuplicateId { .. })));
    }

    #[test]
    fn resolve_falls_back_to_first() {
        let list = TimerList::builtin();
        assert_eq!(list.resolve("nope").id, WORK_TIMER_ID);
        assert_eq!(list.resolve("longBreak").name, "Long Break");
    }

    #[test]
    fn focus_category_matches_work_id_or_name() {
        assert!(TimerDefinition::new("work", "Anything", 60).is_focus());
        assert!(TimerDefinition::new("custom-1", "Deep FOCUS block", 60).is_focus());
        assert!(!TimerDefinition::new("shortBreak", "Short Break", 60).is_focus());
    }

    #[test]
    fn deserializing_an_empty_list_fails() {
        let result: Result<TimerList, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }
}
