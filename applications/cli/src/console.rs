/// Line-based console for the interactive session
use crate::session::{SessionCommand, SessionNotice, SessionSnapshot};
use moodify_core::Track;

pub const HELP: &str = "\
commands:
  capture                  take a photo and play its mood
  request <artist> - <title>
  play <n>                 play queue entry n now
  remove <n>               drop queue entry n
  history <n>              replay history entry n
  prev | next              step through history
  pause | resume
  status                   show what is playing
  quit";

/// One parsed console line
#[derive(Debug)]
pub enum ConsoleInput {
    Command(SessionCommand),
    Status,
    Help,
    Quit,
}

/// Parse a console line
///
/// Returns `Ok(None)` for blank lines. Indices are 1-based on the console.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let input = match word.to_ascii_lowercase().as_str() {
        "capture" | "c" => ConsoleInput::Command(SessionCommand::Capture),
        "request" | "r" => {
            let (artist, title) = rest
                .split_once(" - ")
                .ok_or_else(|| "usage: request <artist> - <title>".to_string())?;
            ConsoleInput::Command(SessionCommand::RequestTrack {
                artist: artist.trim().to_string(),
                title: title.trim().to_string(),
            })
        }
        "play" => ConsoleInput::Command(SessionCommand::PlayFromQueue(index(rest)?)),
        "remove" => ConsoleInput::Command(SessionCommand::RemoveFromQueue(index(rest)?)),
        "history" => ConsoleInput::Command(SessionCommand::PlayFromHistory(index(rest)?)),
        "prev" | "previous" => ConsoleInput::Command(SessionCommand::Previous),
        "next" => ConsoleInput::Command(SessionCommand::Next),
        "pause" => ConsoleInput::Command(SessionCommand::Pause),
        "resume" => ConsoleInput::Command(SessionCommand::Resume),
        "status" | "s" => ConsoleInput::Status,
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" | "q" => ConsoleInput::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(input))
}

fn index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("expected a position starting at 1, got {arg:?}")),
    }
}

fn describe_track(track: &Track) -> String {
    if track.artist().is_empty() {
        track.title().to_string()
    } else {
        format!("{} - {}", track.artist(), track.title())
    }
}

pub fn describe_notice(notice: &SessionNotice) -> String {
    match notice {
        SessionNotice::TrackActivated(track) => format!("now playing: {}", describe_track(track)),
        SessionNotice::TrackQueued { track, position } => {
            format!("queued #{}: {}", position + 1, describe_track(track))
        }
        SessionNotice::ArtworkChanged(track) => {
            format!("artwork: {}", track.cover().unwrap_or("none"))
        }
        SessionNotice::Mood(mood) => format!("mood: {mood}"),
        SessionNotice::Theme(theme) => format!(
            "theme: tint {} dark {} text {}",
            theme.tint.to_hex(),
            theme.tint_dark.to_hex(),
            theme.text_on_tint.to_hex()
        ),
        SessionNotice::Idle { .. } => "queue finished".to_string(),
        SessionNotice::Error(message) => format!("error: {message}"),
    }
}

pub fn describe_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut lines = Vec::new();

    match &snapshot.state.active_track {
        Some(track) => {
            let status = if snapshot.state.is_playing { "playing" } else { "stopped" };
            let clock = if snapshot.state.duration_seconds.is_finite() {
                format!(
                    " [{:.0}s / {:.0}s]",
                    snapshot.state.position_seconds, snapshot.state.duration_seconds
                )
            } else {
                String::new()
            };
            lines.push(format!("{status}: {}{clock}", describe_track(track)));
        }
        None => lines.push("nothing playing".to_string()),
    }

    if snapshot.inference_in_flight {
        lines.push("waiting for the API...".to_string());
    }

    lines.push(format!("queue ({}):", snapshot.queue.len()));
    for (i, track) in snapshot.queue.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, describe_track(track)));
    }

    lines.push(format!("history ({}):", snapshot.history.len()));
    for (i, entry) in snapshot.history.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, describe_track(&entry.track)));
    }

    lines.join("\n")
}
