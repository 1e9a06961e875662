//! Transcript line builders.
//!
//! Pure functions from server responses to `DialogueEntry` batches. The
//! controller decides when a batch is appended; these only decide what is in
//! it and in which order.

use regent_core::game::{
    Advisor, ChapterScene, DialogueEntry, GameEvent, LensChoice, SelectedLens, Speaker,
};
use regent_core::gateway::{ChapterResult, DecisionResponse, EventOutcome};

/// System line announcing the chosen lens.
pub fn lens_selected(lens: &SelectedLens, choice: Option<&LensChoice>, message: &str) -> DialogueEntry {
    let name = if lens.name.is_empty() { &lens.key } else { &lens.name };
    let mut content = format!("Observation lens chosen: {}.", name);

    if let Some(effect) = choice.map(|c| c.effect.as_str()).filter(|e| !e.is_empty()) {
        content.push(' ');
        content.push_str(effect);
    }
    if !message.is_empty() {
        content.push(' ');
        content.push_str(message);
    }

    DialogueEntry::system(0, content)
}

/// Opening narration followed by one entry per advisor present in the
/// council debate, in lion, fox, balance order.
pub fn chapter_opening(scene: &ChapterScene) -> Vec<DialogueEntry> {
    let mut entries = Vec::new();

    if !scene.opening_narration.is_empty() {
        entries.push(DialogueEntry::system(0, scene.opening_narration.clone()));
    }

    for (advisor, suggestion) in scene.council_debate.present() {
        let content = if suggestion.reasoning.is_empty() {
            suggestion.suggestion.clone()
        } else {
            format!("{}\n\nReasoning: {}", suggestion.suggestion, suggestion.reasoning)
        };
        entries.push(DialogueEntry::new(0, Speaker::from(advisor), content));
    }

    entries
}

/// The player's decree followed by each advisor reply that is present.
pub fn decision_batch(input: &str, response: &DecisionResponse) -> Vec<DialogueEntry> {
    let turn = response.turn;
    let analysis = &response.decision_analysis;

    let mut entries = vec![
        DialogueEntry::new(turn, Speaker::Player, input)
            .with_flags(analysis.is_promise, analysis.is_secret_action),
    ];

    entries.extend(Advisor::ALL.into_iter().filter_map(|advisor| {
        response
            .advisor_responses
            .response(advisor)
            .map(|text| DialogueEntry::new(turn, Speaker::from(advisor), text))
    }));

    entries
}

/// Judgment, causal seed, echo, advisor changes, leverage, leaks and
/// warnings for one turn, as plain lines.
pub fn decision_notes(response: &DecisionResponse) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(judgment) = &response.judgment {
        let mut line = format!("Judgment: {}", judgment.player_strategy);
        if !judgment.outcome_level.is_empty() {
            line.push_str(&format!(" ({})", judgment.outcome_level));
        }
        if !judgment.machiavelli_critique.is_empty() {
            line.push_str(&format!(". {}", judgment.machiavelli_critique));
        }
        notes.push(line);
        if !judgment.consequence.is_empty() {
            notes.push(format!("Consequence: {}", judgment.consequence));
        }
    }

    if let Some(seed) = &response.causal_seed {
        notes.push(format!("A seed has been planted: {}", seed.description));
    }

    if let Some(echo) = &response.echo_triggered {
        let mut line = format!("Echo of the past: {}", echo.echo_message);
        if !echo.crisis.is_empty() {
            line.push_str(&format!(" Crisis: {}", echo.crisis));
        }
        notes.push(line);
    }

    for (advisor, change) in &response.advisor_changes {
        let mut line = format!("{} is now {}", advisor, change.status);
        if !change.warning.is_empty() {
            line.push_str(&format!(". {}", change.warning));
        }
        notes.push(line);
    }

    if let Some(leverage) = &response.leverage_gained {
        match &leverage.advisor {
            Some(advisor) => notes.push(format!(
                "{} now holds leverage over you: {}",
                advisor, leverage.description
            )),
            None => notes.push(format!("Leverage gained: {}", leverage.description)),
        }
    }

    if let Some(leak) = &response.secret_leaked {
        notes.push(format!("A secret has leaked: {}", leak.description));
    }

    notes.extend(response.warnings.iter().map(|w| format!("Warning: {}", w)));

    notes
}

/// Notes as system entries for `turn`.
pub fn note_entries(turn: u32, notes: &[String]) -> Vec<DialogueEntry> {
    notes
        .iter()
        .map(|note| DialogueEntry::system(turn, note.clone()))
        .collect()
}

/// Victory or defeat line closing a chapter.
pub fn chapter_end(turn: u32, result: &ChapterResult) -> DialogueEntry {
    let headline = if result.victory {
        "Chapter complete."
    } else {
        "Chapter lost."
    };

    let content = match result.message.as_deref().filter(|m| !m.is_empty()) {
        Some(message) => format!("{} {}", headline, message),
        None => headline.to_string(),
    };

    DialogueEntry::system(turn, content)
}

/// System line announcing a realm event and its narration.
pub fn event_raised(turn: u32, event: &GameEvent) -> DialogueEntry {
    let mut content = format!("Event: {}", event.title);
    if !event.narration.is_empty() {
        content.push_str("\n\n");
        content.push_str(&event.narration);
    }
    DialogueEntry::system(turn, content)
}

/// The choice made for an event, its warnings and any game-over narration.
pub fn event_resolved(turn: u32, outcome: &EventOutcome) -> Vec<DialogueEntry> {
    let mut entries = vec![DialogueEntry::system(
        turn,
        format!("You chose: {}", outcome.choice_made),
    )];

    entries.extend(
        outcome
            .warnings
            .iter()
            .map(|w| DialogueEntry::system(turn, format!("Warning: {}", w))),
    );

    if let Some(narration) = outcome.game_over_narration.as_deref().filter(|n| !n.is_empty()) {
        entries.push(DialogueEntry::system(turn, narration.to_string()));
    }

    entries
}
