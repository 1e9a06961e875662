//! Chapter list entries and the active chapter scene.

use super::advisor::Advisor;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Availability of a chapter in the chapter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChapterStatus {
    #[default]
    Locked,
    Available,
    Active,
    Completed,
    Failed,
}

impl ChapterStatus {
    /// Whether the client lets the player try to enter a chapter with this
    /// status. Only locked chapters are refused locally; replaying a completed
    /// or failed chapter is the server's call.
    pub fn is_playable(self) -> bool {
        !matches!(self, ChapterStatus::Locked)
    }
}

/// One entry of the chapter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub complexity: u8,
    #[serde(default)]
    pub status: ChapterStatus,
}

/// A single advisor's opening recommendation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvisorSuggestion {
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub reasoning: String,
}

/// The council's initial debate for a chapter. Any advisor may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilDebate {
    pub lion: Option<AdvisorSuggestion>,
    pub fox: Option<AdvisorSuggestion>,
    pub balance: Option<AdvisorSuggestion>,
}

impl CouncilDebate {
    pub fn suggestion(&self, advisor: Advisor) -> Option<&AdvisorSuggestion> {
        match advisor {
            Advisor::Lion => self.lion.as_ref(),
            Advisor::Fox => self.fox.as_ref(),
            Advisor::Balance => self.balance.as_ref(),
        }
    }

    /// Present suggestions in transcript order.
    pub fn present(&self) -> impl Iterator<Item = (Advisor, &AdvisorSuggestion)> {
        Advisor::ALL
            .into_iter()
            .filter_map(|advisor| self.suggestion(advisor).map(|s| (advisor, s)))
    }
}

/// Descriptive snapshot of the chapter being played.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterScene {
    pub id: String,
    pub name: String,
    pub subtitle: Option<String>,
    /// Difficulty, 1 to 5.
    pub complexity: u8,
    pub max_turns: u32,
    pub current_turn: u32,
    pub background: String,
    pub scene_snapshot: String,
    pub dilemma: String,
    pub opening_narration: String,
    pub council_debate: CouncilDebate,
    /// Obscure the power vector in the UI.
    pub hide_values: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_skips_absent_advisors_in_order() {
        let debate = CouncilDebate {
            lion: None,
            fox: Some(AdvisorSuggestion {
                suggestion: "Bribe the guard".into(),
                reasoning: "Cheap".into(),
            }),
            balance: Some(AdvisorSuggestion::default()),
        };

        let order: Vec<Advisor> = debate.present().map(|(a, _)| a).collect();
        assert_eq!(order, vec![Advisor::Fox, Advisor::Balance]);
    }

    #[test]
    fn test_chapter_info_status_defaults_to_locked() {
        let info: ChapterInfo =
            serde_json::from_str(r#"{"id": "chapter_3", "name": "The Siege"}"#).unwrap();
        assert_eq!(info.status, ChapterStatus::Locked);
        assert!(!info.status.is_playable());
    }

    #[test]
    fn test_finished_chapters_stay_enterable() {
        assert!(ChapterStatus::Failed.is_playable());
        assert!(ChapterStatus::Completed.is_playable());
        assert!(ChapterStatus::Available.is_playable());
    }
}
