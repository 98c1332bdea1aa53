pub mod queue_ranking;

pub use queue_ranking::{apply_vote, is_ranked, rank_queue, VoteDirection};
