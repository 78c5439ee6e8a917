use std::io::{IsTerminal, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use rowburst::events::{EventRenderer, ProgressSnapshot};

/// Terminal side of the event sink: log lines on stdout, the progress bar
/// on stderr. When stderr is not a TTY progress is written as plain lines.
pub(crate) struct TerminalRenderer {
    style: ProgressStyle,
    no_color: bool,
    interactive: bool,
    bar_visible: bool,
    last: Option<ProgressSnapshot>,
}

impl TerminalRenderer {
    pub(crate) fn new(no_color: bool) -> Self {
        Self {
            style: ProgressStyle::new(30),
            no_color,
            interactive: std::io::stderr().is_terminal(),
            bar_visible: false,
            last: None,
        }
    }

    fn clear_bar(&mut self) {
        if !self.bar_visible {
            return;
        }
        let mut out = std::io::stderr();
        let cleared = queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))
            .and_then(|()| out.flush());
        if cleared.is_err() {
            self.interactive = false;
        }
        self.bar_visible = false;
    }

    fn draw_bar(&mut self, snapshot: &ProgressSnapshot) {
        let line = build_progress_line(&self.style, snapshot, self.no_color);
        if render_progress_line(&line, self.no_color).is_err() {
            self.interactive = false;
            return;
        }
        self.bar_visible = true;
    }
}

impl EventRenderer for TerminalRenderer {
    fn render_logs(&mut self, lines: &[String]) {
        self.clear_bar();
        let mut out = std::io::stdout().lock();
        for line in lines {
            if writeln!(out, "{}", line).is_err() {
                return;
            }
        }
        drop(out.flush());
        if self.interactive
            && let Some(snapshot) = self.last
        {
            self.draw_bar(&snapshot);
        }
    }

    fn render_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.last = Some(*snapshot);
        if self.interactive {
            self.draw_bar(snapshot);
        } else {
            eprintln!("{}", plain_progress_line(snapshot));
        }
    }

    fn finish(&mut self) {
        if self.bar_visible {
            drop(finish_progress_line());
            self.bar_visible = false;
        }
    }
}

fn render_progress_line(line: &[ProgressSegment], no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if no_color {
            queue!(out, Print(&segment.text))?;
        } else if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn percent_text(snapshot: &ProgressSnapshot) -> String {
    let percent_x100 = snapshot.percent_x100();
    let whole = percent_x100.checked_div(100).unwrap_or(0);
    let frac = percent_x100.checked_rem(100).unwrap_or(0);
    format!("{}.{:02}%", whole, frac)
}

fn plain_progress_line(snapshot: &ProgressSnapshot) -> String {
    format!(
        "progress {} ({}/{}) success: {} error: {}",
        percent_text(snapshot),
        snapshot.processed,
        snapshot.total,
        snapshot.success,
        snapshot.error
    )
}

fn build_progress_line(
    style: &ProgressStyle,
    snapshot: &ProgressSnapshot,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let size_u64 = u64::try_from(size).unwrap_or(u64::MAX);
    let scaled = snapshot
        .percent_x100()
        .saturating_mul(size_u64)
        .checked_div(10_000)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );
    let percent = format!(" {}", percent_text(snapshot));
    let counts = format!(" | {}/{}", snapshot.processed, snapshot.total);
    let success = format!(" ok {}", snapshot.success);
    let error = format!(" err {}", snapshot.error);

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent),
            ProgressSegment::plain(counts),
            ProgressSegment::plain(success),
            ProgressSegment::plain(error),
        ]
    } else {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent, Color::Cyan),
            ProgressSegment::colored(counts, Color::Yellow),
            ProgressSegment::colored(success, Color::Green),
            ProgressSegment::colored(error, Color::Red),
        ]
    }
}

struct ProgressStyle {
    size: usize,
    begin: String,
    end: String,
    fill: String,
    empty: String,
}

impl ProgressStyle {
    fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[".to_owned(),
            end: "]".to_owned(),
            fill: "#".to_owned(),
            empty: "-".to_owned(),
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
