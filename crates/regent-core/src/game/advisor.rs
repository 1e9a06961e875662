//! The three council advisors.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One of the three fixed council personas.
///
/// Ordering matters: transcript batches always list advisors as
/// lion, fox, balance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Advisor {
    /// Force.
    Lion,
    /// Cunning.
    Fox,
    /// Justice.
    Balance,
}

impl Advisor {
    /// Transcript order.
    pub const ALL: [Advisor; 3] = [Advisor::Lion, Advisor::Fox, Advisor::Balance];

    /// Display title used in rendered transcript lines.
    pub fn title(self) -> &'static str {
        match self {
            Advisor::Lion => "Lion",
            Advisor::Fox => "Fox",
            Advisor::Balance => "Balance",
        }
    }
}
