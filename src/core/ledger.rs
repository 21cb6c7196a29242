use crate::domain::model::{ActorId, CastVote, VoteKind, VoteSet, VoteStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub vote_count: i64,
    /// The actor's vote after the transition; `None` when it was toggled off.
    pub resulting: Option<VoteKind>,
}

/// Toggle transitions over a `VoteSet`.
///
/// Callers are expected to have rejected self-votes and ineligible actors
/// already; the ledger only maintains the set invariants.
pub struct VoteLedger;

impl VoteLedger {
    pub fn apply_vote(
        votes: &mut VoteSet,
        actor_id: &ActorId,
        kind: VoteKind,
        at: DateTime<Utc>,
    ) -> VoteOutcome {
        let (same, opposite) = match kind {
            VoteKind::Up => (&mut votes.upvoters, &mut votes.downvoters),
            VoteKind::Down => (&mut votes.downvoters, &mut votes.upvoters),
        };

        opposite.retain(|v| &v.voter != actor_id);

        let already_cast = same.iter().any(|v| &v.voter == actor_id);
        let resulting = if already_cast {
            same.retain(|v| &v.voter != actor_id);
            None
        } else {
            same.push(CastVote {
                voter: actor_id.clone(),
                cast_at: at,
            });
            Some(kind)
        };

        let outcome = VoteOutcome {
            vote_count: votes.vote_count(),
            resulting,
        };
        tracing::debug!(
            actor = %actor_id,
            requested = ?kind,
            resulting = ?outcome.resulting,
            vote_count = outcome.vote_count,
            "Applied vote"
        );
        outcome
    }

    pub fn vote_status(votes: &VoteSet, actor_id: &ActorId) -> VoteStatus {
        let has_upvoted = votes.has_upvoted(actor_id);
        let has_downvoted = votes.has_downvoted(actor_id);
        let vote_kind = if has_upvoted {
            Some(VoteKind::Up)
        } else if has_downvoted {
            Some(VoteKind::Down)
        } else {
            None
        };

        VoteStatus {
            has_upvoted,
            has_downvoted,
            vote_kind,
        }
    }
}
