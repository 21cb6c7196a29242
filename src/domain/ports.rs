use crate::domain::model::{
    Actor, ActorId, Answer, AnswerId, NotificationEvent, Question, QuestionId, Votable, VotableRef,
};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ActorStore: Send + Sync {
    async fn get_actor(&self, id: &ActorId) -> Result<Actor>;

    async fn get_reputation(&self, id: &ActorId) -> Result<u32> {
        Ok(self.get_actor(id).await?.reputation)
    }
}

/// Saves are compare-and-set on `version`: a record whose version differs
/// from the stored one is rejected with `VersionConflict`, otherwise it is
/// written with `version + 1`.
#[async_trait]
pub trait VotableStore: Send + Sync {
    async fn load(&self, reference: &VotableRef) -> Result<Votable>;
    async fn save(&self, votable: Votable) -> Result<()>;
    async fn insert_answer(&self, answer: Answer) -> Result<()>;
    async fn delete_answer(&self, id: &AnswerId) -> Result<Answer>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn load_question(&self, id: &QuestionId) -> Result<Question>;
    async fn save_question(&self, question: Question) -> Result<()>;
}

/// Best-effort hand-off to whatever persists or pushes notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn enqueue(&self, event: NotificationEvent) -> Result<()>;
}
