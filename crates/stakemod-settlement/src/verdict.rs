//! Majority rule over a contestation's vote tally.
//!
//! A `yay` vote upholds the contestation. More yays than nays means the
//! poster loses; more nays means the moderator loses. Ties (including a
//! contestation nobody voted on) are broken by [`TieBreak`].

use std::cmp::Ordering;

use stakemod_types::{Outcome, TieBreak};

/// Decide the outcome of a vote. Never returns [`Outcome::Unresolved`].
#[must_use]
pub fn tally(yay_count: u64, nay_count: u64, tie_break: TieBreak) -> Outcome {
    match yay_count.cmp(&nay_count) {
        Ordering::Greater => Outcome::PosterLoses,
        Ordering::Less => Outcome::ModeratorLoses,
        Ordering::Equal => match tie_break {
            TieBreak::FavorPoster => Outcome::ModeratorLoses,
            TieBreak::FavorModerator => Outcome::PosterLoses,
        },
    }
}
