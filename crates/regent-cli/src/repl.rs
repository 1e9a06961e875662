//! The interactive loop driving a [`GameSessionController`].

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use regent_application::{GameSessionController, SessionView};
use regent_core::game::{Advisor, DecreeConsequence, GamePhase};

use crate::command::{Command, HELP};
use crate::helper::CliHelper;
use crate::render;

/// One exchange of a private audience. Kept by the REPL only; the controller
/// never records audiences in the transcript.
struct AudienceLine {
    advisor: Advisor,
    message: String,
    response: String,
}

pub struct Repl {
    controller: Arc<GameSessionController>,
    audiences: Vec<AudienceLine>,
    /// Consequences of the most recent decree, offered to `/skip`.
    last_consequences: Vec<DecreeConsequence>,
    /// Transcript entries already printed for the chapter on screen.
    printed: usize,
    shown_chapter: Option<String>,
}

impl Repl {
    pub fn new(controller: Arc<GameSessionController>) -> Self {
        Self {
            controller,
            audiences: Vec::new(),
            last_consequences: Vec::new(),
            printed: 0,
            shown_chapter: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new()));

        println!("{}", "=== Shadow Regent ===".bright_magenta().bold());
        self.greet();

        loop {
            let prompt = format!("{}> ", self.controller.phase());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match trimmed.parse::<Command>() {
                        Ok(Command::Quit) => {
                            println!("{}", "Long live the regent.".bright_green());
                            break;
                        }
                        Ok(command) => self.execute(command).await,
                        Err(err) => render::error(&err.to_string()),
                    }
                    self.sync();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "CTRL-D detected. Exiting...".bright_green());
                    break;
                }
                Err(err) => {
                    tracing::error!("[Repl] Readline failed: {}", err);
                    render::error(&format!("{:?}", err));
                    break;
                }
            }
        }

        Ok(())
    }

    fn greet(&mut self) {
        let view = self.controller.view();
        if !view.has_api_key {
            render::info("Set your API key with /key <api-key>, then /new to begin.");
        } else if view.session.has_session() {
            render::info(&format!(
                "Restored game {} in phase {}. /resume refreshes it from the server.",
                view.session.session_id.as_deref().unwrap_or_default(),
                view.session.phase
            ));
            if let Some(scene) = &view.session.current_chapter {
                render::scene(scene);
            }
            self.sync();
        } else {
            render::info("Type /new to begin, /help for commands.");
        }
        println!();
    }

    async fn execute(&mut self, command: Command) {
        let controller = Arc::clone(&self.controller);

        match command {
            Command::SetKey(key) => {
                controller.set_api_key(&key).await;
                render::info("API key saved.");
            }
            Command::SetModel(model) => {
                controller.set_model(&model).await;
                match controller.credentials().model {
                    Some(model) => render::info(&format!("Model set to {}.", model)),
                    None => render::info("Using the server's default model."),
                }
            }
            Command::NewGame => {
                if controller.start_new_game().await {
                    self.reset_local();
                    self.show_new_game(&controller.view());
                }
            }
            Command::Lens(key) => {
                if controller.select_observation_lens(&key).await {
                    let view = controller.view();
                    if let Some(mountain) = &view.session.mountain_view {
                        render::prose("From the mountain", mountain);
                    }
                    render::chapters(&view.session.chapters);
                }
            }
            Command::Chapters => {
                let view = controller.view();
                render::chapters(&view.session.chapters);
                render::pending(&view.session.pending_consequences);
            }
            Command::Chapter(id) => {
                if controller.start_chapter(&id).await {
                    self.audiences.clear();
                    self.last_consequences.clear();
                    if let Some(scene) = &controller.view().session.current_chapter {
                        render::scene(scene);
                    }
                }
            }
            Command::Decree(decree) => self.decree(&decree, None).await,
            Command::Follow(advisor, decree) => self.decree(&decree, Some(advisor)).await,
            Command::Ask(advisor, message) => {
                if let Some(reply) = controller.private_audience(advisor, &message).await {
                    render::audience(&reply);
                    self.audiences.push(AudienceLine {
                        advisor,
                        message,
                        response: reply.response,
                    });
                    tracing::debug!(
                        "[Repl] {} audience exchanges this chapter",
                        self.audiences.len()
                    );
                }
            }
            Command::Skip => {
                if self.last_consequences.is_empty() {
                    render::info("Nothing to defer.");
                } else {
                    let consequences = std::mem::take(&mut self.last_consequences);
                    let count = consequences.len();
                    if controller.skip_consequences(consequences).await {
                        render::info(&format!("{} consequences deferred.", count));
                    }
                }
            }
            Command::Event => match &controller.view().session.pending_event {
                Some(event) => render::event(event),
                None => render::info("No event awaits your answer."),
            },
            Command::Answer(choice) => {
                if let Some(response) = controller.handle_event_choice(&choice).await {
                    self.sync();
                    render::event_outcome(&response.result);
                }
            }
            Command::Back => {
                let left = controller.back_to_chapter_select().await;
                self.after_leaving(left);
            }
            Command::Next => {
                let left = controller.go_to_next_chapter().await;
                self.after_leaving(left);
            }
            Command::State => self.show_state(&controller.view()),
            Command::Resume => {
                if controller.resume_session().await {
                    self.show_state(&controller.view());
                }
            }
            Command::Audit => {
                if controller.load_final_audit().await {
                    if let Some(audit) = &controller.view().session.final_audit {
                        render::audit(audit);
                    }
                }
            }
            Command::Abandon => {
                controller.abandon_session().await;
                self.reset_local();
                render::info("Game abandoned.");
            }
            Command::Exit => {
                controller.exit_to_setup().await;
                self.reset_local();
                render::info("Back at the start. Your key is kept.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn decree(&mut self, decree: &str, followed: Option<Advisor>) {
        let Some(response) = self.controller.submit_decision(decree, followed).await else {
            return;
        };

        // The transcript is printed by `sync`; only extras go here.
        self.sync();
        if let Some(delta) = &response.power_changes {
            render::power_changes(delta);
        }
        if let Some(audit) = &response.final_audit {
            render::audit(audit);
        } else if let Some(next) = &response.next_chapter_available {
            render::info(&format!("{} is now open. Type /next.", next.name));
        } else if response.chapter_ended() {
            render::info("Type /back to return to the chapter list.");
        }

        self.last_consequences = response.decree_consequences;
        if !self.last_consequences.is_empty() {
            render::decree_consequences(&self.last_consequences);
        }

        if let Some(event) = &response.event {
            render::event(event);
        }
    }

    fn after_leaving(&mut self, left: bool) {
        if left {
            self.audiences.clear();
            self.last_consequences.clear();
            render::chapters(&self.controller.view().session.chapters);
        } else {
            render::info("You are not in a chapter.");
        }
    }

    fn show_new_game(&self, view: &SessionView) {
        if let Some(intro) = &view.session.intro {
            render::prose("Prologue", intro);
        }
        if let Some(scene) = &view.session.initialization_scene {
            render::prose("The court", scene);
        }
        match view.session.phase {
            GamePhase::LensSelection => render::lens_choices(&view.session.lens_choices),
            _ => render::chapters(&view.session.chapters),
        }
    }

    fn show_state(&self, view: &SessionView) {
        match &view.session.game_state {
            Some(state) => {
                let hide = view
                    .session
                    .current_chapter
                    .as_ref()
                    .is_some_and(|c| c.hide_values);
                render::state(state, hide);
                render::pending(&view.session.pending_consequences);
            }
            None => render::info("No game state yet."),
        }

        if !self.audiences.is_empty() {
            println!("{}", "Audiences this chapter:".bright_black());
            for line in &self.audiences {
                println!("  you -> {}: {}", line.advisor.title(), line.message);
                println!("  {}", line.response.bright_black());
            }
        }
    }

    fn reset_local(&mut self) {
        self.audiences.clear();
        self.last_consequences.clear();
        self.printed = 0;
        self.shown_chapter = None;
    }

    /// Prints transcript entries not yet shown and surfaces the error slot.
    fn sync(&mut self) {
        let view = self.controller.view();
        let session = &view.session;

        let chapter = session.current_chapter.as_ref().map(|c| c.id.clone());
        if chapter != self.shown_chapter || session.dialogue.len() < self.printed {
            self.printed = 0;
            self.shown_chapter = chapter;
        }

        for entry in &session.dialogue[self.printed..] {
            render::entry(entry);
        }
        self.printed = session.dialogue.len();

        if let Some(error) = &view.error {
            render::error(error);
            self.controller.clear_error();
        }
    }
}
