use crate::core::acceptance::AcceptOutcome;
use crate::core::ledger::VoteOutcome;
use crate::domain::model::{
    Actor, ActorId, Answer, NotificationEvent, NotificationId, NotificationKind, Question,
    QuestionId, Votable,
};
use crate::domain::ports::NotificationSink;
use crate::utils::error::InteractionError;
use chrono::Utc;
use std::sync::Arc;

/// Turns committed transitions into notification events and hands them to a
/// sink. Translation looks only at the resulting state; delivery failures are
/// logged and never reach the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

fn event(
    recipient_id: ActorId,
    sender_id: Option<ActorId>,
    kind: NotificationKind,
    subject_question_id: Option<QuestionId>,
    answer: Option<&Answer>,
    title: String,
    message: String,
) -> NotificationEvent {
    NotificationEvent {
        id: NotificationId::new(uuid::Uuid::new_v4().to_string()),
        recipient_id,
        sender_id,
        kind,
        subject_question_id,
        subject_answer_id: answer.map(|a| a.id.clone()),
        title,
        message,
        created_at: Utc::now(),
    }
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn for_vote(
        votable: &Votable,
        voter: &Actor,
        outcome: &VoteOutcome,
    ) -> Option<NotificationEvent> {
        let kind = outcome.resulting?;
        if votable.author_id() == &voter.id {
            return None;
        }

        let (content_type, content_title, answer) = match votable {
            Votable::Question(q) => ("question", q.title.as_str(), None),
            Votable::Answer(a) => ("answer", "your answer", Some(a)),
        };
        let verb = kind.past_tense();

        Some(event(
            votable.author_id().clone(),
            Some(voter.id.clone()),
            NotificationKind::Vote,
            Some(votable.question_id().clone()),
            answer,
            format!("Your {} was {}", content_type, verb),
            format!(
                "{} {} your {} \"{}\"",
                voter.username, verb, content_type, content_title
            ),
        ))
    }

    pub fn for_acceptance(
        question: &Question,
        answer: &Answer,
        accepter: &Actor,
        outcome: &AcceptOutcome,
    ) -> Option<NotificationEvent> {
        if !outcome.changed {
            return None;
        }

        Some(event(
            answer.author_id.clone(),
            Some(accepter.id.clone()),
            NotificationKind::Accept,
            Some(question.id.clone()),
            Some(answer),
            "Your answer was accepted".to_string(),
            format!(
                "{} accepted your answer to \"{}\"",
                accepter.username, question.title
            ),
        ))
    }

    pub fn for_answer_created(
        question: &Question,
        answer: &Answer,
        answerer: &Actor,
    ) -> Option<NotificationEvent> {
        if question.author_id == answerer.id {
            return None;
        }

        Some(event(
            question.author_id.clone(),
            Some(answerer.id.clone()),
            NotificationKind::Answer,
            Some(question.id.clone()),
            Some(answer),
            "New answer to your question".to_string(),
            format!(
                "{} answered your question \"{}\"",
                answerer.username, question.title
            ),
        ))
    }

    /// Platform-originated notice with no sending actor.
    pub fn system(recipient_id: ActorId, title: &str, message: &str) -> NotificationEvent {
        event(
            recipient_id,
            None,
            NotificationKind::System,
            None,
            None,
            title.to_string(),
            message.to_string(),
        )
    }

    /// Enqueues the event, if any. Returns whether an event was delivered.
    pub async fn dispatch(&self, event: Option<NotificationEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };

        let id = event.id.clone();
        let recipient = event.recipient_id.clone();
        match self.sink.enqueue(event).await {
            Ok(()) => {
                tracing::debug!(notification = %id, recipient = %recipient, "Notification enqueued");
                true
            }
            Err(e) => {
                let failure = InteractionError::NotificationDeliveryFailed {
                    message: e.to_string(),
                };
                tracing::warn!(
                    notification = %id,
                    recipient = %recipient,
                    "{}",
                    failure
                );
                false
            }
        }
    }
}
