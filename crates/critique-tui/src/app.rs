use critique_core::error::CompletionResult;
use critique_core::{ChatMessage, ChatRole, Config, ConversationTurn, Critic, OpenAIClient};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub type TurnTask = JoinHandle<CompletionResult<ConversationTurn>>;

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in chars, not bytes

    // Conversation window (display only; never sent back to the model)
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub scroll: u16,
    pub chat_height: u16, // inner height of the chat pane, updated during render
    pub chat_rows: u16,   // wrapped row count of the conversation, measured during render
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // The in-flight turn, if any
    pub task: Option<TurnTask>,
    pub critic: Critic,
}

impl App {
    /// Starts a session: the greeting is the first thing on screen.
    pub fn new(critic: Critic) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input: String::new(),
            cursor: 0,
            messages: vec![ChatMessage::greeting()],
            loading: false,
            scroll: 0,
            chat_height: 0,
            chat_rows: 0,
            animation_frame: 0,
            task: None,
            critic,
        }
    }

    /// Send the input box as a new turn. Returns false if there was nothing to
    /// send or a turn is already running.
    pub fn submit(&mut self) -> bool {
        if self.input.trim().is_empty() || self.task.is_some() {
            return false;
        }

        let text = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.messages.push(ChatMessage::new(ChatRole::User, text.clone()));
        self.loading = true;
        self.scroll_to_bottom();

        let critic = self.critic.clone();
        self.task = Some(tokio::spawn(async move { critic.critique(&text).await }));
        true
    }

    /// Collect the running turn if it has completed. Never waits.
    pub async fn poll_task(&mut self) {
        let finished = self.task.as_ref().is_some_and(|t| t.is_finished());
        if !finished {
            return;
        }
        if let Some(task) = self.task.take() {
            let result = task.await;
            self.finish_turn(result);
        }
    }

    /// Either both the critique and the analytics line, or exactly one error.
    pub fn finish_turn(&mut self, result: Result<CompletionResult<ConversationTurn>, JoinError>) {
        self.loading = false;
        self.task = None;

        match result {
            Ok(Ok(turn)) => {
                debug!(category = %turn.category, input_chars = turn.input.chars().count(), "turn finished");
                self.messages.extend(turn.into_messages());
            }
            Ok(Err(e)) => self.messages.push(ChatMessage::error(&e)),
            Err(e) => {
                error!(error = %e, "critique task did not complete");
                self.messages.push(ChatMessage::error(&format!("critique task failed: {}", e)));
            }
        }
        self.scroll_to_bottom();
    }

    pub fn quit(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.should_quit = true;
    }

    /// Switch to the next known chat model and remember it for next time.
    pub fn cycle_model(&mut self) {
        let models = OpenAIClient::list_models();
        let next = models
            .iter()
            .position(|m| m == self.critic.model())
            .map(|i| (i + 1) % models.len())
            .unwrap_or(0);
        let model = models[next].clone();

        self.critic.set_model(&model);
        info!(model = %model, "switched model");
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Config::save_default_model(&model) {
                warn!(error = %e, "could not save model choice");
            }
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    /// Scroll so the newest message (or "Thinking...") is visible. The exact
    /// offset is settled by `clamp_scroll` on the next render.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = u16::MAX;
    }

    /// Called by the renderer once `chat_rows` reflects the current wrapping.
    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> u16 {
        self.chat_rows.saturating_sub(self.visible_height())
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }
}
