//! Terminal presenter: prints what changed since the previous view.

use anyhow::Result;
use async_trait::async_trait;
use protocol::Role;
use receptionist_core::ports::PresenterPort;
use receptionist_core::session::{BadgeState, CallState, StageMark};
use receptionist_core::{CallSession, CallView};
use std::sync::Mutex;

#[derive(Default)]
struct Printed {
    status: Option<(&'static str, &'static str)>,
    transcript_len: usize,
    field_count: String,
    stage_bar: String,
    badges: String,
}

pub struct ConsolePresenter {
    json: bool,
    printed: Mutex<Printed>,
}

impl ConsolePresenter {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            printed: Mutex::new(Printed::default()),
        }
    }

    fn lines_for(&self, view: &CallView) -> Vec<String> {
        let mut out = Vec::new();
        let mut printed = match self.printed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let status = (view.status_text, view.connection);
        if printed.status != Some(status) {
            out.push(format!("== {} [{}] {} ==", view.status_text, view.connection, view.mode));
            printed.status = Some(status);
        }

        if view.transcript.len() < printed.transcript_len {
            printed.transcript_len = 0;
        }
        for entry in &view.transcript[printed.transcript_len..] {
            let who = match entry.role {
                Role::User => "caller",
                Role::Assistant => "agent ",
            };
            out.push(format!("  {}: {}", who, entry.text));
        }
        printed.transcript_len = view.transcript.len();

        for line in &view.new_log {
            match &line.tag {
                Some(tag) => out.push(format!("{} [{}] {}", line.clock(), tag, line.text)),
                None => out.push(format!("{} {}", line.clock(), line.text)),
            }
        }

        if printed.field_count != view.field_count {
            out.push(format!("fields {}", view.field_count));
            printed.field_count = view.field_count.clone();
        }

        let bar = stage_bar(view);
        if printed.stage_bar != bar {
            out.push(format!("stage {}", bar));
            printed.stage_bar = bar;
        }

        let badges = badge_line(view);
        if printed.badges != badges && !badges.is_empty() {
            out.push(format!("badges {}", badges));
        }
        printed.badges = badges;

        out
    }
}

#[async_trait]
impl PresenterPort for ConsolePresenter {
    async fn render(&self, view: &CallView) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(view)?);
            return Ok(());
        }
        for line in self.lines_for(view) {
            println!("{}", line);
        }
        Ok(())
    }
}

fn stage_bar(view: &CallView) -> String {
    view.stages
        .iter()
        .map(|(stage, mark)| match mark {
            StageMark::Done => format!("[x] {}", stage),
            StageMark::Current => format!("[>] {}", stage),
            StageMark::Pending => format!("[ ] {}", stage),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn badge_line(view: &CallView) -> String {
    view.badges
        .iter()
        .map(|b| {
            let marker = match b.state {
                BadgeState::Checking => "~",
                BadgeState::Pass => "+",
                BadgeState::Fail => "x",
                BadgeState::Hot => "!",
                BadgeState::Info => "i",
                BadgeState::Urgent => "!!",
            };
            format!("{} {}", marker, b.label)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// End-of-run report.
pub fn summary(session: &CallSession) -> String {
    let mut out = Vec::new();
    let outcome = match &session.state {
        CallState::Ended { confirmed: false } => "ended (assumed, SDK never confirmed)".to_string(),
        CallState::Ended { confirmed: true } => "ended".to_string(),
        other => other.to_string(),
    };
    out.push(format!("call {} ({} mode): {}", session.id, session.mode, outcome));
    out.push(format!(
        "duration {}",
        receptionist_core::view::format_timer(session.elapsed_secs)
    ));
    out.push(format!("transcript {} turns", session.transcript.len()));
    for field in session.fields.iter() {
        out.push(format!("  {} = {}", field.name, field.value));
    }
    for badge in session.badges.iter() {
        out.push(format!("  badge {:?}: {}", badge.category, badge.label));
    }
    let history: Vec<_> = session.stage_history.iter().map(|s| s.label()).collect();
    out.push(format!("stages {}", history.join(" -> ")));
    out.join("\n")
}
