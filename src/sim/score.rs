//! Score aggregation

use super::state::Target;

/// Points for every eliminated target
pub fn aggregate_score(targets: &[Target], per_target: u32) -> u32 {
    let dead = targets.iter().filter(|t| !t.alive).count() as u32;
    dead.saturating_mul(per_target)
}
