//! In-memory implementations of the store and sink ports.
//!
//! Records are versioned; saves are compare-and-set, so concurrent writers on
//! the same record see `VersionConflict` instead of silently overwriting each
//! other. Different records live in different shards and never contend.

use crate::domain::model::{
    Actor, ActorId, Answer, AnswerId, NotificationEvent, NotificationId, Question, QuestionId,
    StoredNotification, Votable, VotableRef,
};
use crate::domain::ports::{ActorStore, NotificationSink, QuestionStore, VotableStore};
use crate::utils::error::{InteractionError, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::hash::Hash;
use tokio::sync::RwLock;

trait Versioned {
    fn version(&self) -> u64;
    fn bump(&mut self);
}

impl Versioned for Question {
    fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

impl Versioned for Answer {
    fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

fn compare_and_set<K, V>(map: &DashMap<K, V>, key: &K, entity: &str, mut next: V) -> Result<()>
where
    K: Eq + Hash + std::fmt::Display,
    V: Versioned,
{
    let mut current = map
        .get_mut(key)
        .ok_or_else(|| InteractionError::not_found(entity, key.to_string()))?;

    if current.version() != next.version() {
        return Err(InteractionError::VersionConflict {
            id: key.to_string(),
            expected: next.version(),
            found: current.version(),
        });
    }

    next.bump();
    *current = next;
    Ok(())
}

#[derive(Default)]
pub struct InMemoryStore {
    actors: DashMap<ActorId, Actor>,
    questions: DashMap<QuestionId, Question>,
    answers: DashMap<AnswerId, Answer>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_actor(&self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    /// Seeds a question as-is, replacing any record with the same id.
    pub fn put_question(&self, question: Question) {
        self.questions.insert(question.id.clone(), question);
    }

    /// Seeds an answer as-is. Does not touch the parent's answer list.
    pub fn put_answer(&self, answer: Answer) {
        self.answers.insert(answer.id.clone(), answer);
    }

    pub fn question(&self, id: &QuestionId) -> Option<Question> {
        self.questions.get(id).map(|q| q.clone())
    }

    pub fn answer(&self, id: &AnswerId) -> Option<Answer> {
        self.answers.get(id).map(|a| a.clone())
    }

    pub fn actors(&self) -> Vec<Actor> {
        let mut actors: Vec<Actor> = self.actors.iter().map(|a| a.value().clone()).collect();
        actors.sort_by(|a, b| a.id.cmp(&b.id));
        actors
    }

    pub fn questions(&self) -> Vec<Question> {
        let mut questions: Vec<Question> =
            self.questions.iter().map(|q| q.value().clone()).collect();
        questions.sort_by(|a, b| a.id.cmp(&b.id));
        questions
    }

    pub fn answers(&self) -> Vec<Answer> {
        let mut answers: Vec<Answer> = self.answers.iter().map(|a| a.value().clone()).collect();
        answers.sort_by(|a, b| a.id.cmp(&b.id));
        answers
    }
}

#[async_trait]
impl ActorStore for InMemoryStore {
    async fn get_actor(&self, id: &ActorId) -> Result<Actor> {
        self.actors
            .get(id)
            .map(|a| a.clone())
            .ok_or_else(|| InteractionError::not_found("Actor", id.as_str()))
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn load_question(&self, id: &QuestionId) -> Result<Question> {
        self.question(id)
            .ok_or_else(|| InteractionError::not_found("Question", id.as_str()))
    }

    async fn save_question(&self, question: Question) -> Result<()> {
        let id = question.id.clone();
        compare_and_set(&self.questions, &id, "Question", question)
    }
}

#[async_trait]
impl VotableStore for InMemoryStore {
    async fn load(&self, reference: &VotableRef) -> Result<Votable> {
        match reference {
            VotableRef::Question(id) => self.load_question(id).await.map(Votable::Question),
            VotableRef::Answer(id) => self
                .answer(id)
                .map(Votable::Answer)
                .ok_or_else(|| InteractionError::not_found("Answer", id.as_str())),
        }
    }

    async fn save(&self, votable: Votable) -> Result<()> {
        match votable {
            Votable::Question(q) => self.save_question(q).await,
            Votable::Answer(a) => {
                let id = a.id.clone();
                compare_and_set(&self.answers, &id, "Answer", a)
            }
        }
    }

    async fn insert_answer(&self, answer: Answer) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        match self.answers.entry(answer.id.clone()) {
            Entry::Occupied(existing) => Err(InteractionError::VersionConflict {
                id: existing.key().to_string(),
                expected: 0,
                found: existing.get().version,
            }),
            Entry::Vacant(slot) => {
                slot.insert(answer);
                Ok(())
            }
        }
    }

    async fn delete_answer(&self, id: &AnswerId) -> Result<Answer> {
        self.answers
            .remove(id)
            .map(|(_, answer)| answer)
            .ok_or_else(|| InteractionError::not_found("Answer", id.as_str()))
    }
}

/// Notification sink that keeps every event in a per-process inbox, with the
/// read/clear operations the notification routes need.
#[derive(Default)]
pub struct InMemoryInbox {
    entries: RwLock<Vec<StoredNotification>>,
}

impl InMemoryInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<StoredNotification>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn all(&self) -> Vec<StoredNotification> {
        self.entries.read().await.clone()
    }

    /// Newest first.
    pub async fn list(&self, recipient: &ActorId, unread_only: bool) -> Vec<StoredNotification> {
        let entries = self.entries.read().await;
        let mut found: Vec<StoredNotification> = entries
            .iter()
            .filter(|n| &n.event.recipient_id == recipient)
            .filter(|n| !unread_only || !n.is_read())
            .cloned()
            .collect();
        found.sort_by(|a, b| b.event.created_at.cmp(&a.event.created_at));
        found
    }

    pub async fn unread_count(&self, recipient: &ActorId) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|n| &n.event.recipient_id == recipient && !n.is_read())
            .count()
    }

    pub async fn mark_read(&self, recipient: &ActorId, id: &NotificationId) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|n| &n.event.id == id && &n.event.recipient_id == recipient)
            .ok_or_else(|| InteractionError::not_found("Notification", id.as_str()))?;

        if entry.read_at.is_none() {
            entry.read_at = Some(Utc::now());
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, recipient: &ActorId) -> usize {
        let now = Utc::now();
        let mut marked = 0;
        for entry in self.entries.write().await.iter_mut() {
            if &entry.event.recipient_id == recipient && entry.read_at.is_none() {
                entry.read_at = Some(now);
                marked += 1;
            }
        }
        marked
    }

    pub async fn remove(&self, recipient: &ActorId, id: &NotificationId) -> Result<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|n| !(&n.event.id == id && &n.event.recipient_id == recipient));

        if entries.len() == before {
            return Err(InteractionError::not_found("Notification", id.as_str()));
        }
        Ok(())
    }

    pub async fn clear(&self, recipient: &ActorId) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|n| &n.event.recipient_id != recipient);
        before - entries.len()
    }
}

#[async_trait]
impl NotificationSink for InMemoryInbox {
    async fn enqueue(&self, event: NotificationEvent) -> Result<()> {
        self.entries.write().await.push(StoredNotification {
            event,
            read_at: None,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notification::NotificationDispatcher;

    #[tokio::test]
    async fn test_save_bumps_version() {
        let store = InMemoryStore::new();
        store.put_question(Question::new("q1", "u1", "Title"));

        let mut question = store.load_question(&QuestionId::new("q1")).await.unwrap();
        question.title = "Edited".to_string();
        store.save_question(question).await.unwrap();

        let reloaded = store.load_question(&QuestionId::new("q1")).await.unwrap();
        assert_eq!(reloaded.version, 1);
        assert_eq!(reloaded.title, "Edited");
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store = InMemoryStore::new();
        store.put_answer(Answer::new("a1", "q1", "u1"));
        let reference = VotableRef::Answer(AnswerId::new("a1"));

        let first = store.load(&reference).await.unwrap();
        let second = store.load(&reference).await.unwrap();

        store.save(first).await.unwrap();
        let result = store.save(second).await;

        assert!(matches!(
            result,
            Err(InteractionError::VersionConflict {
                expected: 0,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_reputation_lookup() {
        let store = InMemoryStore::new();
        store.put_actor(Actor {
            id: ActorId::new("u1"),
            username: "alice".to_string(),
            reputation: 42,
        });

        let reputation = tokio_test::block_on(store.get_reputation(&ActorId::new("u1"))).unwrap();
        assert_eq!(reputation, 42);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = InMemoryStore::new();

        assert!(matches!(
            store.get_actor(&ActorId::new("ghost")).await,
            Err(InteractionError::NotFound { .. })
        ));
        assert!(matches!(
            store.save_question(Question::new("q404", "u1", "t")).await,
            Err(InteractionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_answer_rejects_duplicates() {
        let store = InMemoryStore::new();
        store.insert_answer(Answer::new("a1", "q1", "u1")).await.unwrap();

        assert!(store.insert_answer(Answer::new("a1", "q1", "u2")).await.is_err());
        let removed = store.delete_answer(&AnswerId::new("a1")).await.unwrap();
        assert_eq!(removed.author_id, ActorId::new("u1"));
    }

    #[tokio::test]
    async fn test_inbox_read_state() {
        let inbox = InMemoryInbox::new();
        let y = ActorId::new("y");
        let first = NotificationDispatcher::system(y.clone(), "One", "first");
        let first_id = first.id.clone();
        inbox.enqueue(first).await.unwrap();
        inbox
            .enqueue(NotificationDispatcher::system(y.clone(), "Two", "second"))
            .await
            .unwrap();
        inbox
            .enqueue(NotificationDispatcher::system(ActorId::new("z"), "Other", "x"))
            .await
            .unwrap();

        assert_eq!(inbox.unread_count(&y).await, 2);

        inbox.mark_read(&y, &first_id).await.unwrap();
        assert_eq!(inbox.list(&y, true).await.len(), 1);
        assert!(inbox.mark_read(&ActorId::new("z"), &first_id).await.is_err());

        assert_eq!(inbox.mark_all_read(&y).await, 1);
        assert_eq!(inbox.unread_count(&y).await, 0);

        inbox.remove(&y, &first_id).await.unwrap();
        assert_eq!(inbox.clear(&y).await, 1);
        assert_eq!(inbox.all().await.len(), 1);
    }
}
