use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

const ADVISORS: [&str; 3] = ["lion", "fox", "balance"];

/// rustyline helper: slash-command completion, hints and highlighting.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if !line.starts_with('/') {
            return (0, Vec::new());
        }

        match line.split_once(' ') {
            None => (
                0,
                self.commands
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .cloned()
                    .collect(),
            ),
            // Second word of /follow and /ask names an advisor.
            Some((cmd, rest)) if (cmd == "/follow" || cmd == "/ask") && !rest.contains(' ') => (
                cmd.len() + 1,
                ADVISORS
                    .iter()
                    .filter(|a| a.starts_with(rest))
                    .map(|a| format!("{} ", a))
                    .collect(),
            ),
            Some(_) => (0, Vec::new()),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.trim_end().to_string(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_command_prefix() {
        let helper = CliHelper::new();
        let (start, words) = helper.candidates("/ch");
        assert_eq!(start, 0);
        assert_eq!(words, vec!["/chapters".to_string(), "/chapter".to_string()]);
    }

    #[test]
    fn test_completes_advisor_after_follow() {
        let helper = CliHelper::new();
        let (start, words) = helper.candidates("/follow f");
        assert_eq!(start, "/follow ".len());
        assert_eq!(words, vec!["fox ".to_string()]);

        let (_, words) = helper.candidates("/follow fox raise taxes");
        assert!(words.is_empty());
    }

    #[test]
    fn test_plain_text_has_no_candidates() {
        let helper = CliHelper::new();
        assert!(helper.candidates("burn the").1.is_empty());
    }
}
