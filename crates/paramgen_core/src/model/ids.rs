//! Unique identifiers for repository entities

use serde::{Deserialize, Serialize};

/// Index of a Parameter in a repository's arena.
///
/// Several scenario keys may point at the same id when one definition row
/// declares several scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterId(pub u32);
