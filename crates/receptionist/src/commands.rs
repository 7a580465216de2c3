use anyhow::{anyhow, Context, Result};
use receptionist_core::{Mode, UiCommand};

pub const HELP: &str = "commands: start [business|after-hours], stop, call, mute, mode <m>, clear, reset, quit";

/// Parses one operator line. Blank input yields `None`.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "start" => UiCommand::Start(arg.map(parse_mode).transpose()?),
        "stop" | "end" | "hangup" => UiCommand::Stop,
        "call" | "toggle" => UiCommand::ToggleCall,
        "mute" | "unmute" => UiCommand::ToggleMute,
        "mode" => {
            let raw = arg.ok_or_else(|| anyhow!("mode needs a value"))?;
            UiCommand::SetMode(parse_mode(raw)?)
        }
        "clear" => UiCommand::ClearTranscript,
        "reset" => UiCommand::Reset,
        "quit" | "exit" => UiCommand::Shutdown,
        other => return Err(anyhow!("unknown command '{}'", other)),
    };
    Ok(Some(cmd))
}

fn parse_mode(raw: &str) -> Result<Mode> {
    raw.parse().with_context(|| format!("bad mode '{}'", raw))
}
