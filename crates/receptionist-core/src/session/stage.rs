use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-facing progress label for the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Collecting,
    Evaluating,
    Routing,
    Complete,
}

pub const STAGE_ORDER: [Stage; 5] = [
    Stage::Idle,
    Stage::Collecting,
    Stage::Evaluating,
    Stage::Routing,
    Stage::Complete,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMark {
    Done,
    Current,
    Pending,
}

impl Stage {
    pub fn index(self) -> usize {
        STAGE_ORDER.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Collecting => "collecting",
            Stage::Evaluating => "evaluating",
            Stage::Routing => "routing",
            Stage::Complete => "complete",
        }
    }

    /// Progress bar marks relative to `self` as the current stage.
    pub fn marks(self) -> [(Stage, StageMark); 5] {
        let current = self.index();
        STAGE_ORDER.map(|s| {
            let mark = match s.index() {
                i if i < current => StageMark::Done,
                i if i == current => StageMark::Current,
                _ => StageMark::Pending,
            };
            (s, mark)
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_split_around_current() {
        let marks = Stage::Evaluating.marks();
        assert_eq!(marks[0], (Stage::Idle, StageMark::Done));
        assert_eq!(marks[1], (Stage::Collecting, StageMark::Done));
        assert_eq!(marks[2], (Stage::Evaluating, StageMark::Current));
        assert_eq!(marks[4], (Stage::Complete, StageMark::Pending));
    }
}
