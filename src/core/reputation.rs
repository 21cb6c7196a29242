use crate::domain::model::Actor;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const VOTE_THRESHOLD: u32 = 15;
pub const COMMENT_THRESHOLD: u32 = 50;
pub const EDIT_OTHERS_THRESHOLD: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Vote,
    Comment,
    EditOthers,
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatedAction::Vote => f.write_str("vote"),
            GatedAction::Comment => f.write_str("comment"),
            GatedAction::EditOthers => f.write_str("edit others' content"),
        }
    }
}

/// Minimum reputation per gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationPolicy {
    pub vote: u32,
    pub comment: u32,
    pub edit_others: u32,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            vote: VOTE_THRESHOLD,
            comment: COMMENT_THRESHOLD,
            edit_others: EDIT_OTHERS_THRESHOLD,
        }
    }
}

impl ReputationPolicy {
    pub fn required_for(&self, action: GatedAction) -> u32 {
        match action {
            GatedAction::Vote => self.vote,
            GatedAction::Comment => self.comment,
            GatedAction::EditOthers => self.edit_others,
        }
    }

    pub fn permits(&self, actor: &Actor, action: GatedAction) -> bool {
        actor.reputation >= self.required_for(action)
    }

    pub fn can_vote(&self, actor: &Actor) -> bool {
        self.permits(actor, GatedAction::Vote)
    }

    pub fn can_comment(&self, actor: &Actor) -> bool {
        self.permits(actor, GatedAction::Comment)
    }

    pub fn can_edit_others(&self, actor: &Actor) -> bool {
        self.permits(actor, GatedAction::EditOthers)
    }
}
