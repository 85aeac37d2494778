//! Main TUI application.
//!
//! Handles:
//! - Composition of the asset, model and session adapters
//! - Input event handling for the current interview step
//! - Background analysis via the worker

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::adapters::assets::SYMPTOMS_FILE;
use crate::adapters::{
    load_catalog, ConditionBook, DeadlineClassifier, LinearModel, MemorySessionStore,
};
use crate::application::{ConsultationService, ConversationEngine, DiagnosisService, Interaction};
use crate::config::AppConfig;
use crate::domain::{ConversationState, Effect, Step};

use super::styles::MedicalTheme;
use super::ui::{
    chat::render_chat,
    intake::{render_intake, IntakeForm},
    render_disclaimer, render_header,
};
use super::worker::{AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle};

/// Analyzer wired to the on-disk model and reference tables.
pub type LocalAnalyzer = DiagnosisService<DeadlineClassifier<LinearModel>, ConditionBook>;

/// Session hosting used by the terminal app.
pub type LocalConsultations = ConsultationService<LocalAnalyzer, MemorySessionStore>;

/// Main application state
pub struct App {
    should_quit: bool,

    consultations: LocalConsultations,

    /// The single session this terminal drives
    session_id: String,

    /// Last state returned by the service
    state: ConversationState,

    /// Input widgets for `state.step`
    form: IntakeForm,

    /// Pending analysis worker (if running)
    pending_worker: Option<AnalysisWorkerHandle>,
}

impl App {
    /// Create a new application from configuration.
    ///
    /// Refuses to start without a symptom catalog or a loadable model.
    ///
    /// # Errors
    /// Returns error if assets cannot be loaded or verified.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let assets = config.assets_path.as_path();
        if !assets.exists() {
            return Err(anyhow!(
                "Assets directory not found at {:?}. Set MEDICHAT_ASSETS_PATH to a directory containing {} and model.json.",
                assets,
                SYMPTOMS_FILE
            ));
        }

        let catalog = Arc::new(load_catalog(&assets.join(SYMPTOMS_FILE))?);
        let knowledge = Arc::new(ConditionBook::load(assets)?);
        let model = LinearModel::load(assets, &catalog, config.require_manifest)
            .with_context(|| format!("Failed to load model from {assets:?}"))?;
        let classifier = Arc::new(DeadlineClassifier::new(model, config.classifier_timeout));

        let analyzer = DiagnosisService::new(
            catalog,
            classifier,
            knowledge,
            config.ranking.clone(),
            &config.triage,
        );
        let consultations = ConsultationService::new(
            Arc::new(ConversationEngine::new(analyzer)),
            Arc::new(MemorySessionStore::new()),
        );

        Self::with_dependencies(consultations, &config.user)
    }

    /// Create application with an injected service (Composition Root pattern).
    ///
    /// # Errors
    /// Returns error if the session cannot be opened.
    pub fn with_dependencies(consultations: LocalConsultations, user: &str) -> Result<Self> {
        let (session_id, interaction) = consultations.open(user)?;
        let form = IntakeForm::for_step(interaction.state.step);

        Ok(Self {
            should_quit: false,
            consultations,
            session_id,
            state: interaction.state,
            form,
            pending_worker: None,
        })
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        if let Err(e) = self.consultations.close(&self.session_id) {
            tracing::warn!("Failed to close session: {}", e);
        }

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(6),
                        Constraint::Length(self.panel_height()),
                        Constraint::Length(2),
                    ])
                    .split(f.area());

                render_header(f, chunks[0], &self.state.user, self.state.step);
                render_chat(f, chunks[1], &self.state.transcript, "Consultation");

                if self.pending_worker.is_some() {
                    render_notice(f, chunks[2], "Analyzing...", "Scoring your symptoms");
                } else if self.state.step == Step::Complete {
                    render_notice(
                        f,
                        chunks[2],
                        "[N/Enter] Start New Consultation",
                        "[Ctrl+Q] Quit",
                    );
                } else {
                    render_intake(f, chunks[2], &self.form, self.consultations.catalog());
                }

                render_disclaimer(f, chunks[3]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn panel_height(&self) -> u16 {
        if self.pending_worker.is_some() || self.state.step == Step::Complete {
            return 4;
        }
        match self.form.step {
            Step::AskSymptoms => 15,
            Step::AskLifestyle => 9,
            _ => 8,
        }
    }

    /// Poll the background worker for progress updates.
    fn poll_worker(&mut self) {
        loop {
            let Some(progress) = self.pending_worker.as_ref().and_then(|w| w.try_recv()) else {
                break;
            };

            match progress {
                AnalysisProgress::Analyzing => {}
                AnalysisProgress::Complete(interaction) => {
                    self.pending_worker = None;
                    self.apply(*interaction);
                    break;
                }
                AnalysisProgress::Error(message) => {
                    self.pending_worker = None;
                    tracing::error!("Analysis submission failed: {}", message);
                    self.form.error_message = Some(message);
                    break;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.pending_worker.is_some() {
            return;
        }

        if self.state.step == Step::Complete {
            if matches!(key, KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N')) {
                self.new_consultation();
            }
            return;
        }

        let catalog = self.consultations.catalog();
        match key {
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.shift(false, catalog),
            KeyCode::Right => self.form.shift(true, catalog),
            KeyCode::Char(' ') => self.form.toggle(catalog),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let input = match self.form.to_step_input() {
            Ok(input) => input,
            Err(message) => {
                self.form.error_message = Some(message);
                return;
            }
        };

        if self.state.step == Step::AskDuration {
            let worker =
                AnalysisWorker::spawn(self.consultations.clone(), self.session_id.clone(), input);
            self.pending_worker = Some(worker);
            self.form.clear_sensitive();
            return;
        }

        match self.consultations.submit(&self.session_id, input) {
            Ok(interaction) => self.apply(interaction),
            Err(e) => self.form.error_message = Some(e.to_string()),
        }
    }

    fn new_consultation(&mut self) {
        match self.consultations.reset(&self.session_id) {
            Ok(interaction) => self.apply(interaction),
            Err(e) => tracing::error!("Failed to reset consultation: {}", e),
        }
    }

    /// Adopt a new session state and rebuild the form if the step moved.
    fn apply(&mut self, interaction: Interaction) {
        let rejection = interaction.effects.iter().find_map(|effect| match effect {
            Effect::Rejected(reason) => Some(reason.to_string()),
            _ => None,
        });

        if interaction.state.step != self.form.step {
            self.form.clear_sensitive();
            self.form = IntakeForm::for_step(interaction.state.step);
        }
        self.form.error_message = rejection;
        self.state = interaction.state;
    }
}

fn render_notice(f: &mut Frame, area: Rect, primary: &str, secondary: &str) {
    let notice = Paragraph::new(vec![
        Line::from(Span::styled(format!(" {primary}"), MedicalTheme::focused())),
        Line::from(Span::styled(format!(" {secondary}"), MedicalTheme::text_muted())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(notice, area);
}
