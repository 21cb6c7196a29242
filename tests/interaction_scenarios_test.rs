use qa_interaction::domain::model::{
    AcceptRequest, Actor, ActorId, Answer, AnswerId, NotificationKind, Question, QuestionId,
    VotableRef, VotableType, VoteKind, VoteRequest,
};
use qa_interaction::{InMemoryInbox, InMemoryStore, InteractionError, InteractionService};
use std::sync::Arc;

type Service = InteractionService<InMemoryStore, InMemoryStore, InMemoryStore>;

struct Fixture {
    store: Arc<InMemoryStore>,
    inbox: Arc<InMemoryInbox>,
    service: Service,
}

fn actor(id: &str, reputation: u32) -> Actor {
    Actor {
        id: ActorId::new(id),
        username: format!("{}-name", id),
        reputation,
    }
}

/// Question q1 by Q with answers a1 (by Y) and a2 (by Z).
fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    store.put_actor(actor("X", 20));
    store.put_actor(actor("Y", 150));
    store.put_actor(actor("Z", 30));
    store.put_actor(actor("Q", 1));
    store.put_actor(actor("rep14", 14));
    store.put_actor(actor("rep15", 15));

    store.put_question(
        Question::new("q1", "Q", "What is a lifetime?")
            .with_answer_ids([AnswerId::new("a1"), AnswerId::new("a2")]),
    );
    store.put_answer(Answer::new("a1", "q1", "Y"));
    store.put_answer(Answer::new("a2", "q1", "Z"));

    let inbox = Arc::new(InMemoryInbox::new());
    let service = InteractionService::new(store.clone(), store.clone(), store.clone(), inbox.clone());
    Fixture {
        store,
        inbox,
        service,
    }
}

fn a1() -> VotableRef {
    VotableRef::Answer(AnswerId::new("a1"))
}

#[tokio::test]
async fn test_upvote_then_toggle_off_scenario() {
    let f = fixture();
    let x = ActorId::new("X");

    let first = f.service.cast_vote(&x, &a1(), VoteKind::Up).await.unwrap();
    assert_eq!(first.vote_count, 1);
    assert_eq!(first.resulting_vote_kind, Some(VoteKind::Up));

    let y_inbox = f.inbox.list(&ActorId::new("Y"), false).await;
    assert_eq!(y_inbox.len(), 1);
    assert_eq!(y_inbox[0].event.kind, NotificationKind::Vote);
    assert_eq!(y_inbox[0].event.sender_id, Some(x.clone()));
    assert_eq!(y_inbox[0].event.subject_answer_id, Some(AnswerId::new("a1")));

    let second = f.service.cast_vote(&x, &a1(), VoteKind::Up).await.unwrap();
    assert_eq!(second.vote_count, 0);
    assert_eq!(second.resulting_vote_kind, None);

    // Toggling off produces no further notification.
    assert_eq!(f.inbox.all().await.len(), 1);
}

#[tokio::test]
async fn test_alternating_votes_keep_exclusivity() {
    let f = fixture();
    let x = ActorId::new("X");
    let kinds = [VoteKind::Up, VoteKind::Down, VoteKind::Up, VoteKind::Down, VoteKind::Down];
    let expected_counts = [1, -1, 1, -1, 0];

    for (kind, expected) in kinds.into_iter().zip(expected_counts) {
        let receipt = f.service.cast_vote(&x, &a1(), kind).await.unwrap();
        assert_eq!(receipt.vote_count, expected);

        let status = f.service.vote_status(&x, &a1()).await.unwrap();
        assert!(!(status.has_upvoted && status.has_downvoted));
        assert_eq!(status.vote_kind, receipt.resulting_vote_kind);
    }

    // Four switches notified, the final toggle-off did not.
    assert_eq!(f.inbox.list(&ActorId::new("Y"), false).await.len(), 4);
}

#[tokio::test]
async fn test_self_vote_leaves_state_untouched() {
    let f = fixture();

    for kind in [VoteKind::Up, VoteKind::Down] {
        let result = f.service.cast_vote(&ActorId::new("Y"), &a1(), kind).await;
        assert!(matches!(result, Err(InteractionError::SelfVoteForbidden { .. })));
    }

    let answer = f.store.answer(&AnswerId::new("a1")).unwrap();
    assert_eq!(answer.votes().vote_count(), 0);
    assert_eq!(answer.version, 0);
    assert!(f.inbox.all().await.is_empty());
}

#[tokio::test]
async fn test_reputation_boundary() {
    let f = fixture();
    let question = VotableRef::Question(QuestionId::new("q1"));

    for kind in [VoteKind::Up, VoteKind::Down] {
        let result = f.service.cast_vote(&ActorId::new("rep14"), &question, kind).await;
        assert!(matches!(
            result,
            Err(InteractionError::InsufficientReputation { required: 15, actual: 14, .. })
        ));
    }

    let receipt = f
        .service
        .cast_vote(&ActorId::new("rep15"), &question, VoteKind::Down)
        .await
        .unwrap();
    assert_eq!(receipt.vote_count, -1);

    let notice = &f.inbox.list(&ActorId::new("Q"), false).await[0];
    assert_eq!(notice.event.title, "Your question was downvoted");
    assert_eq!(
        notice.event.message,
        "rep15-name downvoted your question \"What is a lifetime?\""
    );
}

#[tokio::test]
async fn test_accept_then_supersede() {
    let f = fixture();
    let q = ActorId::new("Q");
    let q1 = QuestionId::new("q1");

    let first = f.service.accept_answer(&q, &q1, &AnswerId::new("a1")).await.unwrap();
    assert!(first.changed);
    assert_eq!(f.inbox.list(&ActorId::new("Y"), false).await.len(), 1);

    let second = f.service.accept_answer(&q, &q1, &AnswerId::new("a2")).await.unwrap();
    assert!(second.changed);

    let question = f.store.question(&q1).unwrap();
    assert_eq!(question.accepted_answer_id(), Some(&AnswerId::new("a2")));

    // The second call notified Z only; Y got nothing new.
    let z_inbox = f.inbox.list(&ActorId::new("Z"), false).await;
    assert_eq!(z_inbox.len(), 1);
    assert_eq!(z_inbox[0].event.kind, NotificationKind::Accept);
    assert_eq!(z_inbox[0].event.title, "Your answer was accepted");
    assert_eq!(f.inbox.list(&ActorId::new("Y"), false).await.len(), 1);
}

#[tokio::test]
async fn test_reaccept_is_idempotent() {
    let f = fixture();
    let request = AcceptRequest {
        actor_id: ActorId::new("Q"),
        question_id: QuestionId::new("q1"),
        answer_id: AnswerId::new("a1"),
    };

    assert!(f.service.accept(&request).await.unwrap().changed);
    let version_after_first = f.store.question(&QuestionId::new("q1")).unwrap().version;

    assert!(!f.service.accept(&request).await.unwrap().changed);
    assert_eq!(
        f.store.question(&QuestionId::new("q1")).unwrap().version,
        version_after_first
    );
    assert_eq!(f.inbox.all().await.len(), 1);
}

#[tokio::test]
async fn test_vote_request_surface() {
    let f = fixture();
    let request: VoteRequest = serde_json::from_value(serde_json::json!({
        "actor_id": "Z",
        "votable_type": "answer",
        "votable_id": "a1",
        "vote_kind": "downvote"
    }))
    .unwrap();
    assert_eq!(request.votable_type, VotableType::Answer);

    let receipt = f.service.vote(&request).await.unwrap();
    let body = serde_json::to_value(receipt).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "vote_count": -1, "resulting_vote_kind": "down" })
    );
}

#[tokio::test]
async fn test_failures_map_to_status_codes() {
    let f = fixture();

    let not_found = f
        .service
        .cast_vote(&ActorId::new("X"), &VotableRef::Question(QuestionId::new("q404")), VoteKind::Up)
        .await
        .unwrap_err();
    assert_eq!(not_found.status_code(), 404);

    let forbidden = f
        .service
        .accept_answer(&ActorId::new("X"), &QuestionId::new("q1"), &AnswerId::new("a1"))
        .await
        .unwrap_err();
    assert_eq!(forbidden.status_code(), 403);

    let self_vote = f
        .service
        .cast_vote(&ActorId::new("Z"), &VotableRef::Answer(AnswerId::new("a2")), VoteKind::Up)
        .await
        .unwrap_err();
    assert_eq!(self_vote.status_code(), 400);
}
