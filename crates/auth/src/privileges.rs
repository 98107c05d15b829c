use core::str::FromStr;

use serde::{Deserialize, Serialize};
use shopdesk_core::{DomainError, DomainResult};

/// Capability level granted to a staff account.
///
/// Privileges are totally ordered: `READ < CREATE < UPDATE`. Holding a
/// privilege implies every lower one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Privilege {
    Read,
    Create,
    Update,
}

impl Privilege {
    pub const ALL: [Privilege; 3] = [Privilege::Read, Privilege::Create, Privilege::Update];

    /// Position in the hierarchy (1-based).
    pub fn rank(&self) -> u8 {
        match self {
            Privilege::Read => 1,
            Privilege::Create => 2,
            Privilege::Update => 3,
        }
    }

    /// Whether holding `self` is enough for an operation needing `required`.
    pub fn satisfies(&self, required: Privilege) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Read => "READ",
            Privilege::Create => "CREATE",
            Privilege::Update => "UPDATE",
        }
    }
}

impl core::fmt::Display for Privilege {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privilege {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "READ" => Ok(Privilege::Read),
            "CREATE" => Ok(Privilege::Create),
            "UPDATE" => Ok(Privilege::Update),
            other => Err(DomainError::validation(format!(
                "unknown privilege '{}'",
                other
            ))),
        }
    }
}
