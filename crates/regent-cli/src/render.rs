//! Colored terminal output.

use std::collections::BTreeMap;

use colored::{ColoredString, Colorize};
use regent_core::game::{
    Advisor, ChapterInfo, ChapterScene, ChapterStatus, DecreeConsequence, DialogueEntry,
    FinalAudit, GameEvent, GameState, LensChoice, PendingConsequence, Speaker,
};
use regent_core::gateway::{AudienceReply, EventOutcome, PowerDelta};

fn speaker_label(speaker: Speaker) -> ColoredString {
    match speaker {
        Speaker::Player => "[You]".green().bold(),
        Speaker::Lion => "[Lion]".red().bold(),
        Speaker::Fox => "[Fox]".yellow().bold(),
        Speaker::Balance => "[Balance]".cyan().bold(),
        Speaker::System => "[Chronicle]".bright_black(),
    }
}

pub fn entry(entry: &DialogueEntry) {
    let mut label = speaker_label(entry.speaker).to_string();
    if entry.is_promise {
        label.push_str(&" (promise)".magenta().to_string());
    }
    if entry.is_secret_action {
        label.push_str(&" (secret)".bright_black().to_string());
    }
    println!("{}", label);

    for line in entry.content.lines() {
        match entry.speaker {
            Speaker::System => println!("{}", line.bright_black()),
            Speaker::Player => println!("{}", line.green()),
            _ => println!("{}", line.bright_blue()),
        }
    }
    println!();
}

pub fn info(message: &str) {
    println!("{}", message.bright_black());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("Error: {}", message).red());
}

pub fn prose(title: &str, text: &str) {
    println!("{}", title.bright_magenta().bold());
    for line in text.lines() {
        println!("{}", line);
    }
    println!();
}

pub fn lens_choices(choices: &BTreeMap<String, LensChoice>) {
    println!("{}", "Choose how you see your court (/lens <key>):".bright_yellow());
    for (key, choice) in choices {
        println!("  {} {}", key.bold(), choice.name);
        if !choice.description.is_empty() {
            println!("    {}", choice.description);
        }
        if !choice.warning.is_empty() {
            println!("    {}", choice.warning.yellow());
        }
    }
    println!();
}

pub fn chapters(chapters: &[ChapterInfo]) {
    if chapters.is_empty() {
        info("No chapters yet.");
        return;
    }

    for chapter in chapters {
        let status = match chapter.status {
            ChapterStatus::Locked => "locked".bright_black(),
            ChapterStatus::Available => "available".green(),
            ChapterStatus::Active => "active".bright_cyan(),
            ChapterStatus::Completed => "completed".blue(),
            ChapterStatus::Failed => "failed".red(),
        };
        let subtitle = chapter
            .subtitle
            .as_deref()
            .map(|s| format!(" - {}", s))
            .unwrap_or_default();
        println!("  {:<12} {}{} [{}]", chapter.id, chapter.name.bold(), subtitle, status);
    }
    println!();
}

pub fn scene(scene: &ChapterScene) {
    println!(
        "{}",
        format!("=== {} (turn {}/{}) ===", scene.name, scene.current_turn, scene.max_turns)
            .bright_magenta()
            .bold()
    );
    if !scene.background.is_empty() {
        println!("{}", scene.background);
    }
    if !scene.dilemma.is_empty() {
        println!("{}", scene.dilemma.bright_yellow());
    }
    println!();
}

pub fn state(state: &GameState, hide_values: bool) {
    let power = &state.power;
    if hide_values {
        println!(
            "Authority: {}  Fear: {}  Love: {}",
            power.authority.label, power.fear.label, power.love.label
        );
    } else {
        println!(
            "Authority: {:.0}  Fear: {:.0}  Love: {:.0}  (total {:.0})",
            power.authority.value, power.fear.value, power.love.value, power.total
        );
    }

    for advisor in Advisor::ALL {
        let relation = state.relations.get(advisor);
        let mut line = format!("  {:<8} trust {:.0}", advisor.title(), relation.trust);
        if relation.is_hostile {
            line.push_str(" hostile");
        }
        println!("{}", line);
    }

    println!(
        "Credit {:.0}, promises {}, leverage against you {}",
        state.credit_score, state.active_promises, state.leverage_count
    );
    for warning in &state.warnings {
        println!("{}", format!("! {}", warning).yellow());
    }
    if let Some(reason) = state.game_over_reason.as_deref().filter(|_| state.game_over) {
        println!("{}", format!("Game over: {}", reason).red().bold());
    }
    println!();
}

pub fn power_changes(delta: &PowerDelta) {
    println!(
        "{}",
        format!(
            "Authority {:+.0}  Fear {:+.0}  Love {:+.0}",
            delta.authority, delta.fear, delta.love
        )
        .bright_black()
    );
}

pub fn decree_consequences(consequences: &[DecreeConsequence]) {
    println!("{}", "Consequences of your decree:".bright_yellow());
    for c in consequences {
        println!("  [{}] {}", c.severity, c.description);
    }
    info("Type /skip to defer them to a later chapter.");
}

pub fn event(event: &GameEvent) {
    println!("{}", format!("Event: {}", event.title).bright_red().bold());
    for choice in &event.choices {
        let impact = &choice.impact;
        println!(
            "  {} {} {}",
            choice.id.bold(),
            choice.text,
            format!(
                "(authority {:+.0}, fear {:+.0}, love {:+.0})",
                impact.authority, impact.fear, impact.love
            )
            .bright_black()
        );
    }
    info("Type /answer <choice-id> to respond.");
}

pub fn event_outcome(outcome: &EventOutcome) {
    power_changes(&outcome.impact);
    if outcome.game_over {
        println!("{}", "Your rule has collapsed.".red().bold());
    }
    println!();
}

pub fn pending(pending: &[PendingConsequence]) {
    if pending.is_empty() {
        return;
    }
    println!("{}", "Deferred consequences:".bright_yellow());
    for p in pending {
        let due = p
            .remaining_turns
            .map(|t| format!(", due in {} turns", t))
            .unwrap_or_default();
        println!(
            "  {} (from {} turn {}{})",
            p.consequence.description, p.source_chapter, p.source_turn, due
        );
    }
    println!();
}

pub fn audience(reply: &AudienceReply) {
    println!("{}", speaker_label(Speaker::from(reply.advisor)));
    println!("{}", reply.response.italic());
    if reply.trust_change != 0.0 {
        println!("{}", format!("(trust {:+.0})", reply.trust_change).bright_black());
    }
    println!();
}

pub fn audit(audit: &FinalAudit) {
    println!("{}", "=== Final Audit ===".bright_magenta().bold());
    println!("{}", audit.reputation.bold());
    println!("Score: {:.1}", audit.final_score);
    println!(
        "Decisions: {} ({} violent, {} deceptive, {} fair)",
        audit.total_decisions,
        audit.violent_decisions,
        audit.deceptive_decisions,
        audit.fair_decisions
    );
    println!(
        "Promises: {} made, {} broken ({:.0}% kept)",
        audit.promises_made,
        audit.promises_broken,
        audit.promise_reliability * 100.0
    );
    println!(
        "Secrets leaked: {}, leverage held against you: {}",
        audit.secrets_leaked, audit.leverages_held
    );
    if let Some(summary) = &audit.summary {
        println!();
        println!("{}", summary);
    }
    println!();
}
