//! Terminal output for the chat.
//!
//! [`Renderer`] is the sink for everything the interactive driver prints.
//! [`TranscriptView`] sits between the transcript and a renderer and emits
//! only what changed since the last call, so a reveal shows up as a growing
//! line instead of a reprinted transcript.

use std::io::{self, Stdout, Write};

use crate::transcript::{Speaker, Turn, TurnId};

/// ANSI escape code for bold text (used for speaker headers).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for informational messages).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user header).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the assistant header).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for sidebar headings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Called when a turn begins; prints its speaker header.
    fn start_turn(&mut self, speaker: Speaker);

    /// Print a chunk of turn text.
    ///
    /// This is called incrementally as a reply is revealed.
    fn print_text(&mut self, text: &str);

    /// Called when a turn is final.
    fn finish_turn(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a titled block of sidebar content.
    fn print_section(&mut self, title: &str, body: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    line_start: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            line_start: true,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Whether ANSI styling is emitted.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.line_start = text.ends_with('\n');
    }

    fn styled(&mut self, style: &str, text: &str) {
        if self.use_color {
            self.write(&format!("{style}{text}{ANSI_RESET}"));
        } else {
            self.write(text);
        }
        self.line_start = text.ends_with('\n');
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn start_turn(&mut self, speaker: Speaker) {
        self.ensure_line_start();
        let (color, label) = match speaker {
            Speaker::User => (ANSI_CYAN, "You"),
            Speaker::Assistant => (ANSI_GREEN, "Assistant"),
        };
        if self.use_color {
            self.write(&format!("{ANSI_BOLD}{color}{label}:{ANSI_RESET} "));
        } else {
            self.write(&format!("{label}: "));
        }
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn finish_turn(&mut self) {
        self.write("\n");
    }

    fn print_error(&mut self, error: &str) {
        self.ensure_line_start();
        self.styled(ANSI_RED, &format!("Error: {error}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.ensure_line_start();
        self.styled(ANSI_DIM, &format!("{info}\n"));
    }

    fn print_section(&mut self, title: &str, body: &str) {
        self.ensure_line_start();
        self.styled(ANSI_YELLOW, &format!("=== {title} ===\n"));
        self.write(body);
        self.ensure_line_start();
    }
}

/////////////////////////////////////////// TranscriptView /////////////////////////////////////////

/// Tracks how much of the transcript has been printed.
#[derive(Debug, Default)]
pub struct TranscriptView {
    printed_through: Option<TurnId>,
    open: Option<OpenTurn>,
}

#[derive(Debug)]
struct OpenTurn {
    id: TurnId,
    printed: usize,
}

impl TranscriptView {
    /// Creates a view that has printed nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets what was printed, so the next render replays every turn.
    pub fn reset(&mut self) {
        self.printed_through = None;
        self.open = None;
    }

    /// Notes that other output was printed; a revealing turn restarts on a fresh line.
    pub fn interrupt(&mut self) {
        self.open = None;
    }

    /// Prints what changed in `turns` since the previous call.
    ///
    /// New turns get a speaker header, the revealing turn gets its new
    /// suffix, and a turn that became final ends its line.
    pub fn render(&mut self, turns: &[Turn], renderer: &mut dyn Renderer) {
        let vanished = self
            .open
            .as_ref()
            .filter(|open| !turns.iter().any(|turn| turn.id == open.id))
            .map(|open| open.id);
        if let Some(id) = vanished {
            renderer.finish_turn();
            self.printed_through = Some(id);
            self.open = None;
        }
        for turn in turns {
            if self.printed_through.is_some_and(|done| turn.id <= done) {
                continue;
            }
            let printed = match &self.open {
                Some(open) if open.id == turn.id => open.printed,
                _ => {
                    renderer.start_turn(turn.speaker);
                    0
                }
            };
            if let Some(suffix) = turn.text.get(printed..) {
                renderer.print_text(suffix);
            }
            if turn.is_revealing {
                self.open = Some(OpenTurn {
                    id: turn.id,
                    printed: turn.text.len().max(printed),
                });
                break;
            }
            renderer.finish_turn();
            self.printed_through = Some(turn.id);
            self.open = None;
        }
    }
}
