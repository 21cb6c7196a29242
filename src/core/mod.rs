pub mod acceptance;
pub mod interaction;
pub mod ledger;
pub mod notification;
pub mod reputation;

pub use crate::domain::model::{Votable, VotableRef, VoteKind, VoteSet};
pub use crate::domain::ports::{ActorStore, NotificationSink, QuestionStore, VotableStore};
pub use crate::utils::error::Result;
