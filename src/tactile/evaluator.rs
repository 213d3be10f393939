use super::types::{Decision, VoteRecord};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Which side wins when both means clear the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    DownFirst,
}

/// Conflicting votes resolve to a press.
pub const TIE_BREAK: TieBreak = TieBreak::DownFirst;

/// Turns one key's vote statistics into a decision.
///
/// A vote with no `down` data releases the key. Comparisons are strict, so a
/// mean sitting exactly on the threshold does not count for its side.
pub fn decide(vote: &VoteRecord, threshold: f64) -> Decision {
    let Some(down) = vote.down_mean else {
        return Decision::Release;
    };
    let up = vote.up_mean.unwrap_or(0.0);

    let pressed = down > threshold;
    let released = up > threshold;

    match (TIE_BREAK, pressed, released) {
        (TieBreak::DownFirst, true, _) => Decision::Press,
        (TieBreak::DownFirst, false, true) => Decision::Release,
        _ => Decision::NoChange,
    }
}
