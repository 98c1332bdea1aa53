//! Queue ranking - vote bookkeeping for the party queue
//!
//! The queue is the play order. It is re-ranked after every vote: most votes
//! first, ties broken by the earlier `added_at`, then by insertion sequence
//! so songs added in the same millisecond keep their insertion order.

use std::cmp::Ordering;

use crate::domain::entities::Song;

/// Direction of a single vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl From<bool> for VoteDirection {
    fn from(increment: bool) -> Self {
        if increment {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }
}

/// Adjust the votes of `song_id` and re-rank the queue.
///
/// Returns the song's new vote count, or `None` when the id is not queued
/// (in which case the queue is left untouched).
pub fn apply_vote(queue: &mut [Song], song_id: &str, direction: VoteDirection) -> Option<u32> {
    let song = queue.iter_mut().find(|s| s.id == song_id)?;

    song.votes = match direction {
        VoteDirection::Up => song.votes.saturating_add(1),
        VoteDirection::Down => song.votes.saturating_sub(1),
    };
    let votes = song.votes;

    rank_queue(queue);
    Some(votes)
}

/// Sort descending by votes, then ascending by `added_at` and `seq`
pub fn rank_queue(queue: &mut [Song]) {
    queue.sort_by(compare_rank);
}

/// True when the queue is in ranking order
pub fn is_ranked(queue: &[Song]) -> bool {
    queue
        .windows(2)
        .all(|pair| compare_rank(&pair[0], &pair[1]) != Ordering::Greater)
}

fn compare_rank(a: &Song, b: &Song) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.added_at.cmp(&b.added_at))
        .then_with(|| a.seq.cmp(&b.seq))
}
