use serde::{Deserialize, Serialize};
use std::fmt;

/// One named stage of the fixed benchmark sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Reset,
    Seed,
    ReadCount,
    Update,
    Delete,
    Create,
    FinalReadCount,
}

impl Phase {
    /// Every phase, in execution (and reporting) order.
    pub const ALL: [Phase; 7] =
        [Phase::Reset, Phase::Seed, Phase::ReadCount, Phase::Update, Phase::Delete, Phase::Create, Phase::FinalReadCount];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Reset => "Reset",
            Phase::Seed => "Seed",
            Phase::ReadCount => "ReadCount",
            Phase::Update => "Update",
            Phase::Delete => "Delete",
            Phase::Create => "Create",
            Phase::FinalReadCount => "FinalReadCount",
        }
    }

    /// The phase that follows this one, `None` once the run is done.
    pub fn next(&self) -> Option<Phase> {
        let index = Phase::ALL.iter().position(|phase| phase == self)?;
        Phase::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
