use crate::config::toml_config::{EngineConfig, DEFAULT_MAX_RETRIES};
use crate::core::acceptance::AcceptanceArbiter;
use crate::core::ledger::VoteLedger;
use crate::core::notification::NotificationDispatcher;
use crate::core::reputation::{GatedAction, ReputationPolicy};
use crate::domain::model::{
    AcceptReceipt, AcceptRequest, Actor, ActorId, Answer, AnswerId, NotificationEvent, QuestionId,
    Votable, VotableRef, VoteKind, VoteReceipt, VoteRequest, VoteStatus,
};
use crate::domain::ports::{ActorStore, NotificationSink, QuestionStore, VotableStore};
use crate::utils::error::{InteractionError, Result};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReceipt {
    pub answer_id: AnswerId,
    /// The removed answer was the accepted one and the question lost it.
    pub acceptance_released: bool,
}

/// Entry point for every vote, acceptance and answer mutation.
///
/// Each call loads the record it touches, computes the next state on a
/// private copy and saves it with a version check. A version conflict replays
/// the whole call, eligibility checks included, up to `max_retries` times.
/// Notifications go out only after the save succeeded.
pub struct InteractionService<A, V, Q>
where
    A: ActorStore,
    V: VotableStore,
    Q: QuestionStore,
{
    actors: Arc<A>,
    votables: Arc<V>,
    questions: Arc<Q>,
    dispatcher: NotificationDispatcher,
    policy: ReputationPolicy,
    max_retries: u32,
}

impl<A, V, Q> InteractionService<A, V, Q>
where
    A: ActorStore,
    V: VotableStore,
    Q: QuestionStore,
{
    pub fn new(
        actors: Arc<A>,
        votables: Arc<V>,
        questions: Arc<Q>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            actors,
            votables,
            questions,
            dispatcher: NotificationDispatcher::new(sink),
            policy: ReputationPolicy::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_policy(mut self, policy: ReputationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_policy(config.reputation)
            .with_max_retries(config.max_retries())
    }

    pub fn policy(&self) -> &ReputationPolicy {
        &self.policy
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for n in 1..=self.max_retries {
            match attempt().await {
                Err(e) if e.is_retryable() => {
                    tracing::debug!("{} attempt {}/{} conflicted: {}", operation, n, self.max_retries, e);
                }
                other => return other,
            }
        }

        tracing::warn!("{} gave up after {} attempts", operation, self.max_retries);
        Err(InteractionError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }

    async fn load_answer(&self, id: &AnswerId) -> Result<Answer> {
        match self.votables.load(&VotableRef::Answer(id.clone())).await? {
            Votable::Answer(answer) => Ok(answer),
            Votable::Question(_) => Err(InteractionError::not_found("Answer", id.as_str())),
        }
    }

    fn require(&self, actor: &Actor, action: GatedAction) -> Result<()> {
        if self.policy.permits(actor, action) {
            return Ok(());
        }
        Err(InteractionError::InsufficientReputation {
            action: action.to_string(),
            required: self.policy.required_for(action),
            actual: actor.reputation,
        })
    }

    pub async fn cast_vote(
        &self,
        actor_id: &ActorId,
        reference: &VotableRef,
        kind: VoteKind,
    ) -> Result<VoteReceipt> {
        let (receipt, event) = self
            .with_retries("cast_vote", move || {
                self.try_cast_vote(actor_id, reference, kind)
            })
            .await?;

        tracing::info!(
            actor = %actor_id,
            target = %reference,
            vote_count = receipt.vote_count,
            resulting = ?receipt.resulting_vote_kind,
            "Vote recorded"
        );
        self.dispatcher.dispatch(event).await;
        Ok(receipt)
    }

    async fn try_cast_vote(
        &self,
        actor_id: &ActorId,
        reference: &VotableRef,
        kind: VoteKind,
    ) -> Result<(VoteReceipt, Option<NotificationEvent>)> {
        let mut votable = self.votables.load(reference).await?;

        if votable.author_id() == actor_id {
            return Err(InteractionError::SelfVoteForbidden {
                target: reference.votable_type().to_string(),
            });
        }

        let actor = self.actors.get_actor(actor_id).await?;
        self.require(&actor, GatedAction::Vote)?;

        let outcome = VoteLedger::apply_vote(votable.votes_mut(), actor_id, kind, Utc::now());
        let event = NotificationDispatcher::for_vote(&votable, &actor, &outcome);
        self.votables.save(votable).await?;

        Ok((
            VoteReceipt {
                vote_count: outcome.vote_count,
                resulting_vote_kind: outcome.resulting,
            },
            event,
        ))
    }

    pub async fn vote(&self, request: &VoteRequest) -> Result<VoteReceipt> {
        self.cast_vote(&request.actor_id, &request.votable_ref(), request.vote_kind)
            .await
    }

    pub async fn accept_answer(
        &self,
        actor_id: &ActorId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<AcceptReceipt> {
        let (receipt, event) = self
            .with_retries("accept_answer", move || {
                self.try_accept_answer(actor_id, question_id, answer_id)
            })
            .await?;

        if receipt.changed {
            tracing::info!(question = %question_id, answer = %answer_id, "Answer accepted");
        }
        self.dispatcher.dispatch(event).await;
        Ok(receipt)
    }

    async fn try_accept_answer(
        &self,
        actor_id: &ActorId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<(AcceptReceipt, Option<NotificationEvent>)> {
        let mut question = self.questions.load_question(question_id).await?;
        let answer = self.load_answer(answer_id).await?;

        if &question.author_id != actor_id {
            return Err(InteractionError::NotAuthorized {
                reason: "only the question author can accept answers".to_string(),
            });
        }
        if !question.status.is_open() {
            return Err(InteractionError::QuestionClosed {
                question_id: question.id.to_string(),
                status: question.status.to_string(),
            });
        }

        let outcome = AcceptanceArbiter::accept(&mut question, &answer, Utc::now())?;
        if !outcome.changed {
            return Ok((AcceptReceipt { changed: false }, None));
        }

        let accepter = self.actors.get_actor(actor_id).await?;
        let event = NotificationDispatcher::for_acceptance(&question, &answer, &accepter, &outcome);
        self.questions.save_question(question).await?;

        Ok((AcceptReceipt { changed: true }, event))
    }

    pub async fn accept(&self, request: &AcceptRequest) -> Result<AcceptReceipt> {
        self.accept_answer(&request.actor_id, &request.question_id, &request.answer_id)
            .await
    }

    /// Posts a new answer and notifies the question author.
    pub async fn submit_answer(&self, actor_id: &ActorId, question_id: &QuestionId) -> Result<Answer> {
        let (answer, event) = self
            .with_retries("submit_answer", move || {
                self.try_submit_answer(actor_id, question_id)
            })
            .await?;

        tracing::info!(question = %question_id, answer = %answer.id, author = %actor_id, "Answer submitted");
        self.dispatcher.dispatch(event).await;
        Ok(answer)
    }

    async fn try_submit_answer(
        &self,
        actor_id: &ActorId,
        question_id: &QuestionId,
    ) -> Result<(Answer, Option<NotificationEvent>)> {
        let mut question = self.questions.load_question(question_id).await?;
        if !question.status.is_open() {
            return Err(InteractionError::QuestionClosed {
                question_id: question.id.to_string(),
                status: question.status.to_string(),
            });
        }

        let author = self.actors.get_actor(actor_id).await?;
        for existing in &question.answer_ids {
            if &self.load_answer(existing).await?.author_id == actor_id {
                return Err(InteractionError::AlreadyAnswered {
                    question_id: question.id.to_string(),
                });
            }
        }

        let answer = Answer::new(
            uuid::Uuid::new_v4().to_string(),
            question.id.clone(),
            actor_id.clone(),
        );
        let event = NotificationDispatcher::for_answer_created(&question, &answer, &author);

        // The answer must exist before the question lists it.
        self.votables.insert_answer(answer.clone()).await?;
        question.answer_ids.push(answer.id.clone());
        if let Err(e) = self.questions.save_question(question).await {
            if let Err(cleanup) = self.votables.delete_answer(&answer.id).await {
                tracing::warn!(
                    answer = %answer.id,
                    error = %cleanup,
                    "Failed to discard unlisted answer"
                );
            }
            return Err(e);
        }

        Ok((answer, event))
    }

    /// Removes an answer. Its author may always do so; anyone else needs the
    /// edit-others reputation. Removing the accepted answer leaves the
    /// question with none.
    pub async fn remove_answer(&self, actor_id: &ActorId, answer_id: &AnswerId) -> Result<RemovalReceipt> {
        let (receipt, event) = self
            .with_retries("remove_answer", move || self.try_remove_answer(actor_id, answer_id))
            .await?;

        tracing::info!(
            answer = %answer_id,
            removed_by = %actor_id,
            acceptance_released = receipt.acceptance_released,
            "Answer removed"
        );
        self.dispatcher.dispatch(event).await;
        Ok(receipt)
    }

    async fn try_remove_answer(
        &self,
        actor_id: &ActorId,
        answer_id: &AnswerId,
    ) -> Result<(RemovalReceipt, Option<NotificationEvent>)> {
        let answer = self.load_answer(answer_id).await?;
        let actor = self.actors.get_actor(actor_id).await?;

        let moderated = &answer.author_id != actor_id;
        if moderated && !self.policy.can_edit_others(&actor) {
            return Err(InteractionError::NotAuthorized {
                reason: "only the author can remove this answer".to_string(),
            });
        }

        let mut question = self.questions.load_question(&answer.question_id).await?;
        question.answer_ids.retain(|id| id != answer_id);
        let acceptance_released = AcceptanceArbiter::release(&mut question, answer_id);
        let title = question.title.clone();
        self.questions.save_question(question).await?;
        // The question no longer lists the answer, so a leftover record is
        // unreachable and the removal stands.
        if let Err(e) = self.votables.delete_answer(answer_id).await {
            tracing::warn!(answer = %answer_id, error = %e, "Failed to delete removed answer record");
        }

        let event = moderated.then(|| {
            NotificationDispatcher::system(
                answer.author_id.clone(),
                "Your answer was removed",
                &format!("Your answer to \"{}\" was removed by a moderator", title),
            )
        });

        Ok((
            RemovalReceipt {
                answer_id: answer_id.clone(),
                acceptance_released,
            },
            event,
        ))
    }

    pub async fn vote_status(&self, actor_id: &ActorId, reference: &VotableRef) -> Result<VoteStatus> {
        let votable = self.votables.load(reference).await?;
        Ok(VoteLedger::vote_status(votable.votes(), actor_id))
    }

    pub async fn can_comment(&self, actor_id: &ActorId) -> Result<bool> {
        let actor = self.actors.get_actor(actor_id).await?;
        Ok(self.policy.can_comment(&actor))
    }

    pub async fn can_edit_others(&self, actor_id: &ActorId) -> Result<bool> {
        let actor = self.actors.get_actor(actor_id).await?;
        Ok(self.policy.can_edit_others(&actor))
    }

    /// Fails with `InsufficientReputation` unless the actor may comment.
    pub async fn ensure_can_comment(&self, actor_id: &ActorId) -> Result<()> {
        let actor = self.actors.get_actor(actor_id).await?;
        self.require(&actor, GatedAction::Comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInbox, InMemoryStore};
    use crate::domain::model::{Question, QuestionStatus};

    type Service = InteractionService<InMemoryStore, InMemoryStore, InMemoryStore>;

    fn actor(id: &str, reputation: u32) -> Actor {
        Actor {
            id: ActorId::new(id),
            username: id.to_string(),
            reputation,
        }
    }

    fn setup() -> (Arc<InMemoryStore>, Arc<InMemoryInbox>, Service) {
        let store = Arc::new(InMemoryStore::new());
        store.put_actor(actor("x", 20));
        store.put_actor(actor("y", 100));
        store.put_actor(actor("q", 5));
        store.put_actor(actor("newbie", 14));

        let mut question = Question::new("q1", "q", "Title");
        question.answer_ids = vec![AnswerId::new("a1"), AnswerId::new("a2")];
        store.put_question(question);
        store.put_answer(Answer::new("a1", "q1", "y"));
        store.put_answer(Answer::new("a2", "q1", "x"));

        let inbox = Arc::new(InMemoryInbox::new());
        let service = InteractionService::new(store.clone(), store.clone(), store.clone(), inbox.clone());
        (store, inbox, service)
    }

    #[tokio::test]
    async fn test_self_vote_rejected_before_reputation() {
        let (store, _, service) = setup();

        // q has too little reputation to vote at all, yet the self-vote rule wins.
        let result = service
            .cast_vote(&ActorId::new("q"), &VotableRef::Question(QuestionId::new("q1")), VoteKind::Up)
            .await;

        assert!(matches!(result, Err(InteractionError::SelfVoteForbidden { .. })));
        assert_eq!(store.question(&QuestionId::new("q1")).unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_reputation_gate() {
        let (_, _, service) = setup();
        let target = VotableRef::Answer(AnswerId::new("a1"));

        let result = service.cast_vote(&ActorId::new("newbie"), &target, VoteKind::Down).await;
        match result {
            Err(InteractionError::InsufficientReputation { required, actual, .. }) => {
                assert_eq!(required, 15);
                assert_eq!(actual, 14);
            }
            other => panic!("expected reputation failure, got {:?}", other),
        }

        let receipt = service.cast_vote(&ActorId::new("x"), &target, VoteKind::Down).await.unwrap();
        assert_eq!(receipt.vote_count, -1);
    }

    #[tokio::test]
    async fn test_unknown_votable() {
        let (_, _, service) = setup();

        let result = service
            .cast_vote(&ActorId::new("x"), &VotableRef::Answer(AnswerId::new("nope")), VoteKind::Up)
            .await;
        assert!(matches!(result, Err(InteractionError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_accept_requires_question_author() {
        let (_, inbox, service) = setup();

        let result = service
            .accept_answer(&ActorId::new("y"), &QuestionId::new("q1"), &AnswerId::new("a1"))
            .await;

        assert!(matches!(result, Err(InteractionError::NotAuthorized { .. })));
        assert!(inbox.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_accept_on_closed_question() {
        let (store, _, service) = setup();
        let mut question = store.question(&QuestionId::new("q1")).unwrap();
        question.status = QuestionStatus::Closed;
        store.put_question(question);

        let result = service
            .accept_answer(&ActorId::new("q"), &QuestionId::new("q1"), &AnswerId::new("a1"))
            .await;

        match result {
            Err(InteractionError::QuestionClosed { status, .. }) => assert_eq!(status, "closed"),
            other => panic!("expected closed question, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accept_answer_of_other_question() {
        let (store, _, service) = setup();
        store.put_answer(Answer::new("stray", "q2", "y"));

        let result = service
            .accept_answer(&ActorId::new("q"), &QuestionId::new("q1"), &AnswerId::new("stray"))
            .await;

        assert!(matches!(result, Err(InteractionError::MismatchedQuestion { .. })));
    }

    #[tokio::test]
    async fn test_comment_gate() {
        let (_, _, service) = setup();

        assert!(!service.can_comment(&ActorId::new("x")).await.unwrap());
        assert!(service.can_comment(&ActorId::new("y")).await.unwrap());
        assert!(matches!(
            service.ensure_can_comment(&ActorId::new("x")).await,
            Err(InteractionError::InsufficientReputation { required: 50, .. })
        ));
        assert!(!service.can_edit_others(&ActorId::new("y")).await.unwrap());
    }

    #[tokio::test]
    async fn test_configured_thresholds() {
        let (_, _, service) = setup();
        let config = EngineConfig::from_toml_str("[reputation]\nvote = 1\ncomment = 2\nedit_others = 3\n")
            .unwrap();
        let service = service.with_config(&config);

        let receipt = service
            .cast_vote(&ActorId::new("q"), &VotableRef::Answer(AnswerId::new("a1")), VoteKind::Up)
            .await
            .unwrap();
        assert_eq!(receipt.resulting_vote_kind, Some(VoteKind::Up));
    }
}
