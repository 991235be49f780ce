//! The interactive chat loop.
//!
//! [`ChatSession`] owns a [`SessionController`] and drives it from a single
//! task: user events, finished backend requests and reveal deadlines are
//! multiplexed with `tokio::select!`, so every transcript mutation happens on
//! the same task in the order the events were observed.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep_until};

use crate::chat::commands::{ChatCommand, help_text, parse_command};
use crate::chat::config::ChatConfig;
use crate::client::{ContentSource, ReplySource};
use crate::error::Result;
use crate::render::{Renderer, TranscriptView};
use crate::reveal::{Jitter, RandomJitter};
use crate::session::{SessionController, SessionState};
use crate::sidebar::{SidebarSections, SidebarTab, format_sections};
use crate::transcript::Transcript;
use crate::types::AnalysisBundle;

/// Input from the person at the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// A chat message.
    Submit(String),
    /// Show the revealing reply in full.
    Skip,
    /// A slash command other than quit and skip.
    Command(ChatCommand),
    /// Leave the chat.
    Quit,
}

impl UserEvent {
    /// Interprets one line of input.  Blank lines yield `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match parse_command(line) {
            Some(ChatCommand::Quit) => UserEvent::Quit,
            Some(ChatCommand::Skip) => UserEvent::Skip,
            Some(command) => UserEvent::Command(command),
            None => UserEvent::Submit(line.to_string()),
        })
    }
}

enum Completion {
    Reply(Result<String>),
    Content(Result<AnalysisBundle>),
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A chat session bound to a backend.
pub struct ChatSession<B, J: Jitter = RandomJitter> {
    backend: Arc<B>,
    config: ChatConfig,
    controller: SessionController<J>,
    view: TranscriptView,
    sidebar: SidebarSections,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
    generating: bool,
    input_closed: bool,
}

impl<B> ChatSession<B, RandomJitter>
where
    B: ReplySource + ContentSource + 'static,
{
    /// Creates a session; jitter is seeded from the configuration when a seed is set.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        let jitter = config
            .seed
            .map(RandomJitter::seeded)
            .unwrap_or_default();
        Self::with_jitter(backend, config, jitter)
    }
}

impl<B, J> ChatSession<B, J>
where
    B: ReplySource + ContentSource + 'static,
    J: Jitter,
{
    /// Creates a session with an explicit jitter source.
    pub fn with_jitter(backend: B, config: ChatConfig, jitter: J) -> Self {
        let controller = SessionController::with_jitter(config.reveal.clone(), jitter);
        Self {
            backend: Arc::new(backend),
            config,
            controller,
            view: TranscriptView::new(),
            sidebar: SidebarSections::default(),
            pending: FuturesUnordered::new(),
            generating: false,
            input_closed: false,
        }
    }

    /// Returns the controller that owns the transcript.
    pub fn controller(&self) -> &SessionController<J> {
        &self.controller
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the most recently generated sidebar content.
    pub fn sidebar(&self) -> &SidebarSections {
        &self.sidebar
    }

    /// Runs until the user quits, or until input ends and all work has settled.
    pub async fn run(
        &mut self,
        mut events: UnboundedReceiver<UserEvent>,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        loop {
            self.view.render(self.controller.turns(), renderer);
            if self.input_closed
                && self.pending.is_empty()
                && self.controller.state() == SessionState::Idle
            {
                break;
            }
            let deadline = self.controller.next_deadline();
            let wake_at = deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                event = events.recv(), if !self.input_closed => match event {
                    Some(event) => {
                        if self.handle_event(event, renderer) == Flow::Quit {
                            self.finish(renderer);
                            break;
                        }
                    }
                    None => self.input_closed = true,
                },
                Some(completion) = self.pending.next(), if !self.pending.is_empty() => {
                    self.handle_completion(completion, renderer);
                }
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    if self.controller.tick(Instant::now()) > 0 {
                        self.autosave(renderer);
                    }
                }
                else => break,
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: UserEvent, renderer: &mut dyn Renderer) -> Flow {
        let now = Instant::now();
        match event {
            UserEvent::Submit(text) => self.submit(text, now, renderer),
            UserEvent::Skip => self.skip(now, renderer),
            UserEvent::Command(command) => return self.handle_command(command, now, renderer),
            UserEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn submit(&mut self, text: String, now: Instant, renderer: &mut dyn Renderer) {
        if let Err(err) = self.controller.submit_user_input(&text, now) {
            self.error(renderer, &err.to_string());
            return;
        }
        let backend = Arc::clone(&self.backend);
        self.pending.push(Box::pin(async move {
            Completion::Reply(backend.send_message(&text).await)
        }));
    }

    fn skip(&mut self, now: Instant, renderer: &mut dyn Renderer) {
        if self.controller.cancel_active_reveal(now) {
            self.autosave(renderer);
        } else {
            self.info(renderer, "Nothing is revealing. Type /quit to exit.");
        }
    }

    fn handle_completion(&mut self, completion: Completion, renderer: &mut dyn Renderer) {
        let now = Instant::now();
        match completion {
            Completion::Reply(reply) => {
                if let Err(err) = self.controller.reply_result(reply, now) {
                    self.error(renderer, &err.to_string());
                }
            }
            Completion::Content(Ok(bundle)) => {
                self.generating = false;
                if let Some(message) = &bundle.error {
                    self.error(renderer, &format!("analysis reported an error: {message}"));
                }
                self.sidebar = format_sections(&bundle);
                self.info(renderer, "Analysis updated. Use /tab to view it.");
            }
            Completion::Content(Err(err)) => {
                self.generating = false;
                self.error(renderer, &format!("failed to fetch analysis: {err}"));
            }
        }
    }

    fn handle_command(
        &mut self,
        command: ChatCommand,
        now: Instant,
        renderer: &mut dyn Renderer,
    ) -> Flow {
        match command {
            ChatCommand::Quit => return Flow::Quit,
            ChatCommand::Skip => self.skip(now, renderer),
            ChatCommand::Help => self.info(renderer, help_text()),
            ChatCommand::Clear => match self.controller.clear(now) {
                Ok(()) => self.info(renderer, "Conversation cleared."),
                Err(err) => self.error(renderer, &err.to_string()),
            },
            ChatCommand::Speed(ms) => {
                self.config.reveal.typing_speed = Duration::from_millis(ms);
                self.apply_reveal_config();
                self.info(renderer, &format!("Typing speed set to {ms} ms per character."));
            }
            ChatCommand::Delay(ms) => {
                self.config.reveal.initial_delay = Duration::from_millis(ms);
                self.apply_reveal_config();
                self.info(renderer, &format!("Initial delay set to {ms} ms."));
            }
            ChatCommand::Pause(factor) => {
                self.config.reveal.punctuation_pause_multiplier = factor;
                self.apply_reveal_config();
                self.info(renderer, &format!("Punctuation pause factor set to {factor}."));
            }
            ChatCommand::Jitter(enabled) => {
                self.config.reveal.randomize_speed = enabled;
                self.apply_reveal_config();
                let state = if enabled { "on" } else { "off" };
                self.info(renderer, &format!("Typing jitter {state}."));
            }
            ChatCommand::Generate => self.generate(renderer),
            ChatCommand::Tab(Some(tab)) => self.show_tab(tab, renderer),
            ChatCommand::Tab(None) => {
                for tab in SidebarTab::ALL {
                    self.show_tab(tab, renderer);
                }
            }
            ChatCommand::TranscriptPath(path) => {
                self.config.transcript_path = Some(path.clone().into());
                self.info(renderer, &format!("Auto-saving transcript to {path}."));
                self.autosave(renderer);
            }
            ChatCommand::ClearTranscriptPath => {
                self.config.transcript_path = None;
                self.info(renderer, "Transcript auto-save disabled.");
            }
            ChatCommand::SaveTranscript(path) => {
                match self.controller.transcript().save_to(&path) {
                    Ok(()) => self.info(renderer, &format!("Transcript saved to {path}.")),
                    Err(err) => self.error(renderer, &err.to_string()),
                }
            }
            ChatCommand::LoadTranscript(path) => match Transcript::load_from(&path) {
                Ok(transcript) => {
                    let count = transcript.len();
                    self.controller.replace_transcript(transcript, now);
                    self.view.reset();
                    self.info(renderer, &format!("Loaded {count} turns from {path}."));
                }
                Err(err) => self.error(renderer, &err.to_string()),
            },
            ChatCommand::Stats => {
                let text = self.stats_text();
                self.info(renderer, &text);
            }
            ChatCommand::ShowConfig => {
                let text = self.config_text();
                self.info(renderer, &text);
            }
            ChatCommand::Invalid(message) => self.error(renderer, &message),
        }
        Flow::Continue
    }

    fn generate(&mut self, renderer: &mut dyn Renderer) {
        if self.generating {
            self.info(renderer, "Analysis is already being generated.");
            return;
        }
        self.generating = true;
        let backend = Arc::clone(&self.backend);
        self.pending.push(Box::pin(async move {
            Completion::Content(backend.fetch_generated_content().await)
        }));
        self.info(renderer, "Generating analysis...");
    }

    fn show_tab(&mut self, tab: SidebarTab, renderer: &mut dyn Renderer) {
        renderer.print_section(tab.title(), self.sidebar.section(tab));
        self.view.interrupt();
    }

    fn apply_reveal_config(&mut self) {
        self.controller.set_config(self.config.reveal.clone());
    }

    /// Cancels everything in flight so the transcript is final on exit.
    fn finish(&mut self, renderer: &mut dyn Renderer) {
        let now = Instant::now();
        while self.controller.cancel_active_reveal(now) {}
        self.view.render(self.controller.turns(), renderer);
        self.autosave(renderer);
    }

    fn autosave(&mut self, renderer: &mut dyn Renderer) {
        let Some(path) = self.config.transcript_path.clone() else {
            return;
        };
        if self.controller.state() == SessionState::Revealing {
            return;
        }
        if let Err(err) = self.controller.transcript().save_to(&path) {
            self.error(renderer, &format!("auto-save failed: {err}"));
        }
    }

    fn info(&mut self, renderer: &mut dyn Renderer, message: &str) {
        renderer.print_info(message);
        self.view.interrupt();
    }

    fn error(&mut self, renderer: &mut dyn Renderer, message: &str) {
        renderer.print_error(message);
        self.view.interrupt();
    }

    fn stats_text(&self) -> String {
        let stats = self.controller.stats();
        let mut out = String::from("Session statistics:\n");
        let _ = writeln!(
            out,
            "  Turns: {} ({} user, {} assistant)",
            stats.turns, stats.user_turns, stats.assistant_turns
        );
        let _ = writeln!(out, "  State: {:?}", self.controller.state());
        let _ = writeln!(out, "  Queued replies: {}", stats.queued_replies);
        let _ = writeln!(out, "  Requests in flight: {}", self.pending.len());
        let _ = writeln!(
            out,
            "  Reveals: {} started, {} completed, {} skipped",
            stats.reveals_started, stats.reveals_completed, stats.reveals_cancelled
        );
        let _ = writeln!(out, "  Failed replies: {}", stats.reply_failures);
        let _ = write!(out, "  Stale callbacks discarded: {}", stats.stale_callbacks);
        out
    }

    fn config_text(&self) -> String {
        let reveal = &self.config.reveal;
        let mut out = String::from("Current configuration:\n");
        let _ = writeln!(
            out,
            "  Backend: {}",
            self.config.api_url.as_deref().unwrap_or("(default)")
        );
        let _ = writeln!(out, "  Typing speed: {:?}", reveal.typing_speed);
        let _ = writeln!(out, "  Initial delay: {:?}", reveal.initial_delay);
        let _ = writeln!(
            out,
            "  Punctuation pause factor: {}",
            reveal.punctuation_pause_multiplier
        );
        let _ = writeln!(
            out,
            "  Jitter: {}",
            if reveal.randomize_speed { "on" } else { "off" }
        );
        match &self.config.transcript_path {
            Some(path) => {
                let _ = write!(out, "  Transcript: {}", path.display());
            }
            None => {
                let _ = write!(out, "  Transcript: (not saved)");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
    use tokio::time::sleep;

    use super::*;
    use crate::Error;
    use crate::render::PlainTextRenderer;
    use crate::reveal::{NoJitter, RevealConfig};
    use crate::session::FALLBACK_REPLY;
    use crate::transcript::Speaker;

    #[derive(Default)]
    struct StubBackend {
        delay: Duration,
        replies: HashMap<String, String>,
        bundle: Option<AnalysisBundle>,
    }

    impl StubBackend {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        fn reply(mut self, input: &str, output: &str) -> Self {
            self.replies.insert(input.to_string(), output.to_string());
            self
        }
    }

    #[async_trait]
    impl ReplySource for StubBackend {
        async fn send_message(&self, text: &str) -> Result<String> {
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            self.replies
                .get(text)
                .cloned()
                .ok_or_else(|| Error::internal_server("no canned reply"))
        }
    }

    #[async_trait]
    impl ContentSource for StubBackend {
        async fn fetch_generated_content(&self) -> Result<AnalysisBundle> {
            sleep(Duration::from_millis(5)).await;
            self.bundle
                .clone()
                .ok_or_else(|| Error::service_unavailable("analysis offline", None))
        }
    }

    fn steady() -> ChatConfig {
        ChatConfig::new().without_color().with_reveal(
            RevealConfig::new()
                .with_typing_speed(Duration::from_millis(10))
                .with_initial_delay(Duration::ZERO)
                .with_randomize_speed(false),
        )
    }

    fn session(backend: StubBackend, config: ChatConfig) -> ChatSession<StubBackend, NoJitter> {
        ChatSession::with_jitter(backend, config, NoJitter)
    }

    fn submit(tx: &UnboundedSender<UserEvent>, text: &str) {
        tx.send(UserEvent::Submit(text.to_string())).unwrap();
    }

    fn texts(session: &ChatSession<StubBackend, NoJitter>) -> Vec<(Speaker, String)> {
        session
            .controller()
            .turns()
            .iter()
            .map(|turn| (turn.speaker, turn.text.clone()))
            .collect()
    }

    #[test]
    fn events_from_lines() {
        assert_eq!(UserEvent::from_line("   "), None);
        assert_eq!(UserEvent::from_line("/quit"), Some(UserEvent::Quit));
        assert_eq!(UserEvent::from_line("/skip"), Some(UserEvent::Skip));
        assert_eq!(
            UserEvent::from_line("/generate"),
            Some(UserEvent::Command(ChatCommand::Generate))
        );
        assert_eq!(
            UserEvent::from_line(" How big is the market? "),
            Some(UserEvent::Submit("How big is the market?".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_revealed_on_schedule() {
        let backend = StubBackend::default().reply("Hello", "Hi!");
        let mut session = session(backend, steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();
        submit(&tx, "Hello");
        drop(tx);

        let start = Instant::now();
        session.run(rx, &mut renderer).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(30), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(40), "{elapsed:?}");
        assert_eq!(
            texts(&session),
            vec![
                (Speaker::User, "Hello".to_string()),
                (Speaker::Assistant, "Hi!".to_string())
            ]
        );
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, "You: Hello\nAssistant: Hi!\n");
        let stats = session.controller().stats();
        assert_eq!(stats.reveals_completed, 1);
        assert_eq!(stats.reveals_cancelled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_shows_the_full_reply() {
        let backend = StubBackend::default().reply("Tell me", "A long and winding answer.");
        let mut session = session(backend, steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();

        let driver = async {
            submit(&tx, "Tell me");
            sleep(Duration::from_millis(45)).await;
            tx.send(UserEvent::Skip).unwrap();
            drop(tx);
        };
        let start = Instant::now();
        let (result, ()) = tokio::join!(session.run(rx, &mut renderer), driver);
        result.unwrap();

        assert!(start.elapsed() < Duration::from_millis(100));
        let turns = session.controller().turns();
        assert_eq!(turns[1].text, "A long and winding answer.");
        assert!(!turns[1].is_revealing);
        let stats = session.controller().stats();
        assert_eq!(stats.reveals_cancelled, 1);
        assert_eq!(stats.reveals_completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_reveal_in_arrival_order() {
        let backend = StubBackend::with_delay(Duration::from_millis(20))
            .reply("first", "one.")
            .reply("second", "two.");
        let mut session = session(backend, steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();

        let driver = async {
            submit(&tx, "first");
            sleep(Duration::from_millis(5)).await;
            submit(&tx, "second");
            drop(tx);
        };
        let (result, ()) = tokio::join!(session.run(rx, &mut renderer), driver);
        result.unwrap();

        assert_eq!(
            texts(&session),
            vec![
                (Speaker::User, "first".to_string()),
                (Speaker::User, "second".to_string()),
                (Speaker::Assistant, "one.".to_string()),
                (Speaker::Assistant, "two.".to_string()),
            ]
        );
        let stats = session.controller().stats();
        assert_eq!(stats.reveals_completed, 2);
        assert!(session.controller().turns().iter().all(|t| !t.is_revealing));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_request_shows_fallback() {
        let mut session = session(StubBackend::default(), steady().with_reveal(
            RevealConfig::new()
                .with_typing_speed(Duration::from_millis(1))
                .with_initial_delay(Duration::ZERO)
                .with_randomize_speed(false),
        ));
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();
        submit(&tx, "unknown question");
        drop(tx);

        session.run(rx, &mut renderer).await.unwrap();

        let turns = session.controller().turns();
        assert_eq!(turns[1].text, FALLBACK_REPLY);
        assert_eq!(session.controller().stats().reply_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_finalizes_the_reveal() {
        let backend = StubBackend::default().reply("go", "Still typing this out.");
        let mut session = session(backend, steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();

        let driver = async {
            submit(&tx, "go");
            sleep(Duration::from_millis(25)).await;
            tx.send(UserEvent::Quit).unwrap();
            // The sender outlives the session; quitting must not wait for input to close.
            tx
        };
        let (result, _tx) = tokio::join!(session.run(rx, &mut renderer), driver);
        result.unwrap();

        let turns = session.controller().turns();
        assert_eq!(turns[1].text, "Still typing this out.");
        assert!(!turns[1].is_revealing);
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.ends_with("Assistant: Still typing this out.\n"), "{output}");
    }

    #[tokio::test(start_paused = true)]
    async fn generate_fills_the_sidebar() {
        let bundle: AnalysisBundle = serde_json::from_value(json!({
            "swot": {"strengths": ["fast"]},
            "graphs": {"monthly_revenue": {"data": [1, 2]}}
        }))
        .unwrap();
        let backend = StubBackend {
            bundle: Some(bundle),
            ..StubBackend::default()
        };
        let mut session = session(backend, steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();

        let driver = async {
            tx.send(UserEvent::Command(ChatCommand::Generate)).unwrap();
            tx.send(UserEvent::Command(ChatCommand::Generate)).unwrap();
            sleep(Duration::from_millis(20)).await;
            tx.send(UserEvent::Command(ChatCommand::Tab(Some(SidebarTab::Swot))))
                .unwrap();
            drop(tx);
        };
        let (result, ()) = tokio::join!(session.run(rx, &mut renderer), driver);
        result.unwrap();

        assert!(session.sidebar().swot_analysis.contains("• fast"));
        assert!(session.sidebar().graphs.contains("## Monthly Revenue"));
        assert!(session.sidebar().market_trends.starts_with("No business"));
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("Analysis is already being generated."));
        assert!(output.contains("=== SWOT Analysis ===\n# SWOT Analysis"));
    }

    #[tokio::test(start_paused = true)]
    async fn generate_failure_is_reported() {
        let mut session = session(StubBackend::default(), steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();
        tx.send(UserEvent::Command(ChatCommand::Generate)).unwrap();
        drop(tx);

        session.run(rx, &mut renderer).await.unwrap();

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("Error: failed to fetch analysis"), "{output}");
        assert_eq!(session.sidebar(), &SidebarSections::default());
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_commands_adjust_pacing() {
        let mut session = session(StubBackend::default(), steady());
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();
        for command in [
            ChatCommand::Speed(5),
            ChatCommand::Delay(100),
            ChatCommand::Pause(4.0),
            ChatCommand::Jitter(true),
            ChatCommand::Invalid("/speed expects milliseconds".to_string()),
        ] {
            tx.send(UserEvent::Command(command)).unwrap();
        }
        drop(tx);

        session.run(rx, &mut renderer).await.unwrap();

        let reveal = session.controller().config();
        assert_eq!(reveal.typing_speed, Duration::from_millis(5));
        assert_eq!(reveal.initial_delay, Duration::from_millis(100));
        assert_eq!(reveal.punctuation_pause_multiplier, 4.0);
        assert!(reveal.randomize_speed);
        assert_eq!(&session.config().reveal, reveal);
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("Error: /speed expects milliseconds"));
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_is_autosaved() {
        let path = std::env::temp_dir().join(format!(
            "thinkchat-autosave-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let backend = StubBackend::default().reply("save me", "Saved.");
        let config = steady().with_transcript_path(Some(path.clone()));
        let mut session = session(backend, config);
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        let (tx, rx) = unbounded_channel();
        submit(&tx, "save me");
        drop(tx);

        session.run(rx, &mut renderer).await.unwrap();

        let loaded = Transcript::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.turns()[1].text, "Saved.");
    }
}
