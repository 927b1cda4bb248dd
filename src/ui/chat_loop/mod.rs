//! Interactive chat loop.
//!
//! One task owns the [`SessionState`]. Terminal input, the spinner timer and
//! exchange progress all arrive as messages and are applied in order through
//! [`apply_action`]; the screen is redrawn after each one. Each exchange runs
//! on its own spawned task and reports back over a channel.

pub mod keybindings;
pub mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::backend::Backend;
use ratatui::crossterm::event::{self, Event};
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::core::builtin_providers::find_builtin_provider;
use crate::core::chat_stream::{ChatBackend, ExchangeRequest};
use crate::core::config::{Config, ConfigStore};
use crate::core::constants::{SPINNER_INTERVAL, SYSTEM_PROMPT};
use crate::core::message::Message;
use crate::core::project_context;
use crate::core::session::{apply_action, SessionAction, SessionCommand, SessionState};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;

use self::keybindings::action_for_event;
use self::lifecycle::{install_panic_hook, restore_terminal, setup_terminal};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Progress of the in-flight exchange, sent from its worker task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    Delta(String),
    Completed(String),
    Failed(String),
}

impl From<ExchangeEvent> for SessionAction {
    fn from(event: ExchangeEvent) -> Self {
        match event {
            ExchangeEvent::Delta(text) => SessionAction::TextDelta(text),
            ExchangeEvent::Completed(reply) => SessionAction::ExchangeCompleted(reply),
            ExchangeEvent::Failed(error) => SessionAction::ExchangeFailed(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Everything the loop owns for one interactive session.
pub struct ChatRuntime {
    state: SessionState,
    theme: Theme,
    store: ConfigStore,
    config: Config,
    backend: Arc<dyn ChatBackend>,
    exchange_tx: UnboundedSender<ExchangeEvent>,
    exchange_rx: UnboundedReceiver<ExchangeEvent>,
}

impl ChatRuntime {
    /// `config` carries the effective settings, including any command-line
    /// overrides; `store` is where history changes are written and API keys
    /// are read from.
    pub fn new(store: ConfigStore, config: Config, backend: Arc<dyn ChatBackend>) -> Self {
        let (exchange_tx, exchange_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(config.provider.clone(), config.model.clone()),
            theme: Theme::default(),
            store,
            config,
            backend,
            exchange_tx,
            exchange_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session until it exits.
    ///
    /// If `ui_events` closes, the loop lets an in-flight exchange finish and
    /// then returns.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut ui_events: UnboundedReceiver<UiEvent>,
    ) -> Result<(), Box<dyn Error>> {
        let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut input_closed = false;
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|f| ui(f, &self.state, &self.theme))?;
                needs_redraw = false;
            }

            let action = tokio::select! {
                biased;

                Some(event) = self.exchange_rx.recv() => {
                    needs_redraw = true;
                    Some(SessionAction::from(event))
                }
                event = ui_events.recv(), if !input_closed => {
                    needs_redraw = true;
                    match event {
                        Some(UiEvent::Crossterm(event)) => action_for_event(&event),
                        None => {
                            tracing::debug!("terminal input closed");
                            input_closed = true;
                            None
                        }
                    }
                }
                _ = spinner.tick() => {
                    needs_redraw = self.state.streaming;
                    Some(SessionAction::SpinnerTick)
                }
            };

            if let Some(command) = action.and_then(|action| apply_action(&mut self.state, action)) {
                if self.execute(command) == Flow::Exit {
                    break;
                }
            }

            if self.state.exit_requested || (input_closed && !self.state.streaming) {
                break;
            }
        }

        Ok(())
    }

    fn execute(&mut self, command: SessionCommand) -> Flow {
        match command {
            SessionCommand::StartExchange { prompt } => {
                self.start_exchange(prompt);
                Flow::Continue
            }
            SessionCommand::ClearHistory => {
                if let Err(err) = self.store.clear_history() {
                    self.report_persistence_error(err);
                }
                Flow::Continue
            }
            SessionCommand::RecordExchange { prompt, reply } => {
                let exchange = [Message::user(prompt), Message::assistant(reply)];
                if let Err(err) = self.store.append_history(&exchange) {
                    self.report_persistence_error(err);
                }
                Flow::Continue
            }
            SessionCommand::Exit => Flow::Exit,
        }
    }

    fn report_persistence_error(&mut self, err: impl std::fmt::Display) {
        tracing::warn!("failed to update history: {err}");
        self.state.last_error = Some(format!("Failed to save history: {err}"));
    }

    fn start_exchange(&mut self, prompt: String) {
        let Some(profile) = find_builtin_provider(&self.state.provider) else {
            let error = format!("Unknown provider: {}", self.state.provider);
            apply_action(&mut self.state, SessionAction::ExchangeFailed(error));
            return;
        };

        // Keys are re-read so one saved mid-session takes effect.
        let mut request = ExchangeRequest {
            profile: profile.clone(),
            api_key: self.store.load().resolve_api_key(profile),
            model: self.state.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![Message::system(SYSTEM_PROMPT)],
        };

        let backend = Arc::clone(&self.backend);
        let events = self.exchange_tx.clone();
        tokio::spawn(async move {
            let context = match tokio::task::spawn_blocking(project_context::current).await {
                Ok(context) => context,
                Err(err) => {
                    tracing::warn!("project context task failed: {err}");
                    String::new()
                }
            };
            request
                .messages
                .push(Message::user(project_context::compose_prompt(&context, &prompt)));

            let delta_events = events.clone();
            let mut on_delta = move |text: &str| {
                let _ = delta_events.send(ExchangeEvent::Delta(text.to_string()));
            };

            let outcome = match backend.exchange(request, &mut on_delta).await {
                Ok(reply) => ExchangeEvent::Completed(reply),
                Err(err) => {
                    tracing::warn!("exchange failed: {err}");
                    ExchangeEvent::Failed(err.to_string())
                }
            };
            // The loop may already be gone if the user quit mid-exchange.
            let _ = events.send(outcome);
        });
    }
}

/// Blocking reader forwarding terminal events until the receiver is dropped.
fn spawn_event_reader(events: UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !events.is_closed() {
            match event::poll(INPUT_POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if events.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::debug!("failed to read terminal event: {err}"),
                },
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!("terminal polling failed: {err}");
                    break;
                }
            }
        }
    })
}

pub async fn run_chat(
    store: ConfigStore,
    config: Config,
    backend: Arc<dyn ChatBackend>,
) -> Result<(), Box<dyn Error>> {
    let mut runtime = ChatRuntime::new(store, config, backend);

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let reader = spawn_event_reader(event_tx);

    let result = runtime.run(&mut terminal, event_rx).await;

    // Dropping the receiver inside `run` stops the reader on its next poll.
    if let Err(err) = reader.await {
        tracing::debug!("event reader ended abnormally: {err}");
    }
    restore_terminal(&mut terminal)?;

    result
}
