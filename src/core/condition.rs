//! Condition-tag filtering

use crate::core::step::Step;

/// Selects steps whose condition tags intersect an include set and do not
/// intersect an exclude set.
///
/// An empty include set admits every step; an empty exclude set rejects
/// none. Steps without declared conditions carry the `ALWAYS` sentinel.
#[derive(Debug, Clone, Default)]
pub struct ConditionFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ConditionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.include.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.exclude.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Apply the filter, preserving relative order without mutating input
    pub fn apply(&self, steps: &[Step]) -> Vec<Step> {
        steps
            .iter()
            .filter(|step| self.keeps(step))
            .cloned()
            .collect()
    }

    fn keeps(&self, step: &Step) -> bool {
        let conditions = step.conditions();
        let included = self.include.is_empty()
            || conditions.iter().any(|cond| self.include.contains(cond));
        let excluded =
            !self.exclude.is_empty() && conditions.iter().any(|cond| self.exclude.contains(cond));
        included && !excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn steps() -> Vec<Step> {
        let raw = json!([
            {"name": "a", "conditions": ["A", "B", "C"]},
            {"name": "b", "conditions": ["B", "C"]},
            {"name": "c", "conditions": ["C"]},
            {"name": "d", "conditions": ["D"]},
        ]);
        serde_json::from_value(raw).unwrap()
    }

    fn names(filtered: &[Step]) -> Vec<&str> {
        filtered
            .iter()
            .map(|s| s.get("name").unwrap().as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_include_only() {
        let filtered = ConditionFilter::new().include(["B"]).apply(&steps());
        assert_eq!(names(&filtered), vec!["a", "b"]);

        let filtered = ConditionFilter::new().include(["C"]).apply(&steps());
        assert_eq!(names(&filtered), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_exclude_only() {
        let filtered = ConditionFilter::new().exclude(["B"]).apply(&steps());
        assert_eq!(names(&filtered), vec!["c", "d"]);
    }

    #[test]
    fn test_include_and_exclude() {
        let filtered = ConditionFilter::new()
            .include(["B"])
            .exclude(["A"])
            .apply(&steps());
        assert_eq!(names(&filtered), vec!["b"]);

        let filtered = ConditionFilter::new()
            .include(["B", "D"])
            .exclude(["A"])
            .apply(&steps());
        assert_eq!(names(&filtered), vec!["b", "d"]);

        let filtered = ConditionFilter::new()
            .include(["B", "D"])
            .exclude(["A", "D"])
            .apply(&steps());
        assert_eq!(names(&filtered), vec!["b"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filtered = ConditionFilter::new().apply(&steps());
        assert_eq!(names(&filtered), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_step_without_conditions_matches_always() {
        let raw = json!([
            {"name": "a", "conditions": ["A", "B", "C"]},
            {"name": "b"},
            {"name": "c", "conditions": ["C"]},
            {"name": "d", "conditions": ["D"]},
        ]);
        let steps: Vec<Step> = serde_json::from_value(raw).unwrap();

        let filtered = ConditionFilter::new().include(["ALWAYS", "C"]).apply(&steps);
        assert_eq!(names(&filtered), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let original = steps();
        let _ = ConditionFilter::new().include(["B"]).apply(&original);
        assert_eq!(original.len(), 4);
    }
}
