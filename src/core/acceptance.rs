use crate::domain::model::{Answer, AnswerId, Question};
use crate::utils::error::{InteractionError, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    pub changed: bool,
    /// Previously accepted answer that this acceptance replaced.
    pub superseded: Option<AnswerId>,
}

/// Owns the accepted-answer slot of a question. The slot is a single
/// optional reference, so a question has at most one accepted answer, and it
/// only ever names an answer the question currently lists.
///
/// Authorization and question status are checked by the caller.
pub struct AcceptanceArbiter;

impl AcceptanceArbiter {
    pub fn accept(
        question: &mut Question,
        answer: &Answer,
        at: DateTime<Utc>,
    ) -> Result<AcceptOutcome> {
        if answer.question_id != question.id || !question.lists_answer(&answer.id) {
            return Err(InteractionError::MismatchedQuestion {
                question_id: question.id.to_string(),
                answer_id: answer.id.to_string(),
            });
        }

        if question.accepted_answer_id.as_ref() == Some(&answer.id) {
            tracing::debug!(question = %question.id, answer = %answer.id, "Answer already accepted");
            return Ok(AcceptOutcome {
                changed: false,
                superseded: None,
            });
        }

        let superseded = question.accepted_answer_id.replace(answer.id.clone());
        question.accepted_at = Some(at);

        if let Some(previous) = &superseded {
            tracing::info!(
                question = %question.id,
                previous = %previous,
                accepted = %answer.id,
                "Accepted answer superseded"
            );
        }

        Ok(AcceptOutcome {
            changed: true,
            superseded,
        })
    }

    /// Drops the acceptance if it points at `answer_id`. Returns whether it did.
    pub fn release(question: &mut Question, answer_id: &AnswerId) -> bool {
        if question.accepted_answer_id.as_ref() == Some(answer_id) {
            question.accepted_answer_id = None;
            question.accepted_at = None;
            true
        } else {
            false
        }
    }
}
