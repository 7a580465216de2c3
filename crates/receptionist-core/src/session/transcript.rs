use protocol::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    #[serde(rename = "final")]
    pub final_: bool,
}

/// Ordered final transcript plus a single scratch slot for the in-flight partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scratch: Option<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partial(&mut self, role: Role, text: impl Into<String>) {
        self.scratch = Some(TranscriptEntry {
            role,
            text: text.into(),
            final_: false,
        });
    }

    pub fn finalize(&mut self, role: Role, text: impl Into<String>) {
        self.scratch = None;
        self.entries.push(TranscriptEntry {
            role,
            text: text.into(),
            final_: true,
        });
    }

    pub fn discard_scratch(&mut self) {
        self.scratch = None;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scratch = None;
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn scratch(&self) -> Option<&TranscriptEntry> {
        self.scratch.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_overwrite_and_finals_append() {
        let mut t = Transcript::new();
        t.partial(Role::User, "I need");
        t.partial(Role::User, "I need a quote");
        assert_eq!(t.scratch().unwrap().text, "I need a quote");
        assert!(t.is_empty());

        t.finalize(Role::User, "I need a quote for my car.");
        assert!(t.scratch().is_none());
        t.finalize(Role::Assistant, "Sure thing.");
        assert_eq!(t.len(), 2);
        assert_eq!(t.entries()[0].role, Role::User);
        assert!(t.entries().iter().all(|e| e.final_));
    }
}
