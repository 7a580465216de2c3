use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeCategory {
    Disqualifier,
    HotLead,
    CallType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    Checking,
    Pass,
    Fail,
    Hot,
    Info,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub category: BadgeCategory,
    pub state: BadgeState,
    pub label: String,
}

/// At most one badge per category; setting a category replaces its badge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Badges {
    disqualifier: Option<StatusBadge>,
    hot_lead: Option<StatusBadge>,
    call_type: Option<StatusBadge>,
}

impl Badges {
    pub fn set(&mut self, category: BadgeCategory, state: BadgeState, label: impl Into<String>) {
        *self.slot_mut(category) = Some(StatusBadge {
            category,
            state,
            label: label.into(),
        });
    }

    pub fn get(&self, category: BadgeCategory) -> Option<&StatusBadge> {
        match category {
            BadgeCategory::Disqualifier => self.disqualifier.as_ref(),
            BadgeCategory::HotLead => self.hot_lead.as_ref(),
            BadgeCategory::CallType => self.call_type.as_ref(),
        }
    }

    pub fn state(&self, category: BadgeCategory) -> Option<BadgeState> {
        self.get(category).map(|b| b.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusBadge> {
        [&self.disqualifier, &self.hot_lead, &self.call_type]
            .into_iter()
            .flatten()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot_mut(&mut self, category: BadgeCategory) -> &mut Option<StatusBadge> {
        match category {
            BadgeCategory::Disqualifier => &mut self.disqualifier,
            BadgeCategory::HotLead => &mut self.hot_lead,
            BadgeCategory::CallType => &mut self.call_type,
        }
    }
}
