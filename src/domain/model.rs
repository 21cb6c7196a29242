use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(ActorId);
string_id!(QuestionId);
string_id!(AnswerId);
string_id!(NotificationId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub username: String,
    pub reputation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    #[serde(alias = "upvote")]
    Up,
    #[serde(alias = "downvote")]
    Down,
}

impl VoteKind {
    pub fn past_tense(self) -> &'static str {
        match self {
            VoteKind::Up => "upvoted",
            VoteKind::Down => "downvoted",
        }
    }
}

impl std::str::FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "upvote" => Ok(VoteKind::Up),
            "down" | "downvote" => Ok(VoteKind::Down),
            other => Err(format!("unknown vote kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub voter: ActorId,
    pub cast_at: DateTime<Utc>,
}

/// Up and down voters of one votable. An actor sits in at most one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSet {
    pub(crate) upvoters: Vec<CastVote>,
    pub(crate) downvoters: Vec<CastVote>,
}

impl VoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vote_count(&self) -> i64 {
        self.upvoters.len() as i64 - self.downvoters.len() as i64
    }

    pub fn upvoters(&self) -> impl Iterator<Item = &ActorId> {
        self.upvoters.iter().map(|v| &v.voter)
    }

    pub fn downvoters(&self) -> impl Iterator<Item = &ActorId> {
        self.downvoters.iter().map(|v| &v.voter)
    }

    pub fn has_upvoted(&self, actor_id: &ActorId) -> bool {
        self.upvoters.iter().any(|v| &v.voter == actor_id)
    }

    pub fn has_downvoted(&self, actor_id: &ActorId) -> bool {
        self.downvoters.iter().any(|v| &v.voter == actor_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStatus {
    pub has_upvoted: bool,
    pub has_downvoted: bool,
    pub vote_kind: Option<VoteKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionStatus {
    #[default]
    Open,
    Closed,
    Duplicate,
    OnHold,
}

impl QuestionStatus {
    pub fn is_open(self) -> bool {
        self == QuestionStatus::Open
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuestionStatus::Open => "open",
            QuestionStatus::Closed => "closed",
            QuestionStatus::Duplicate => "duplicate",
            QuestionStatus::OnHold => "on-hold",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub author_id: ActorId,
    pub title: String,
    #[serde(default)]
    pub status: QuestionStatus,
    #[serde(default)]
    pub(crate) votes: VoteSet,
    #[serde(default)]
    pub(crate) answer_ids: Vec<AnswerId>,
    #[serde(default)]
    pub(crate) accepted_answer_id: Option<AnswerId>,
    #[serde(default)]
    pub(crate) accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, author_id: impl Into<ActorId>, title: &str) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            title: title.to_string(),
            status: QuestionStatus::Open,
            votes: VoteSet::new(),
            answer_ids: Vec::new(),
            accepted_answer_id: None,
            accepted_at: None,
            version: 0,
        }
    }

    /// Seeds the answer list of a record that is not yet stored.
    pub fn with_answer_ids(mut self, answer_ids: impl IntoIterator<Item = AnswerId>) -> Self {
        self.answer_ids = answer_ids.into_iter().collect();
        self
    }

    pub fn votes(&self) -> &VoteSet {
        &self.votes
    }

    pub fn answer_ids(&self) -> &[AnswerId] {
        &self.answer_ids
    }

    pub fn lists_answer(&self, answer_id: &AnswerId) -> bool {
        self.answer_ids.contains(answer_id)
    }

    pub fn accepted_answer_id(&self) -> Option<&AnswerId> {
        self.accepted_answer_id.as_ref()
    }

    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    pub fn has_accepted_answer(&self) -> bool {
        self.accepted_answer_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub author_id: ActorId,
    #[serde(default)]
    pub(crate) votes: VoteSet,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Answer {
    pub fn new(
        id: impl Into<AnswerId>,
        question_id: impl Into<QuestionId>,
        author_id: impl Into<ActorId>,
    ) -> Self {
        Self {
            id: id.into(),
            question_id: question_id.into(),
            author_id: author_id.into(),
            votes: VoteSet::new(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn votes(&self) -> &VoteSet {
        &self.votes
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for AnswerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotableType {
    Question,
    Answer,
}

impl fmt::Display for VotableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VotableType::Question => f.write_str("question"),
            VotableType::Answer => f.write_str("answer"),
        }
    }
}

impl std::str::FromStr for VotableType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "question" => Ok(VotableType::Question),
            "answer" => Ok(VotableType::Answer),
            other => Err(format!("unknown votable type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum VotableRef {
    Question(QuestionId),
    Answer(AnswerId),
}

impl VotableRef {
    pub fn from_parts(votable_type: VotableType, id: impl Into<String>) -> Self {
        match votable_type {
            VotableType::Question => VotableRef::Question(QuestionId(id.into())),
            VotableType::Answer => VotableRef::Answer(AnswerId(id.into())),
        }
    }

    pub fn votable_type(&self) -> VotableType {
        match self {
            VotableRef::Question(_) => VotableType::Question,
            VotableRef::Answer(_) => VotableType::Answer,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            VotableRef::Question(id) => id.as_str(),
            VotableRef::Answer(id) => id.as_str(),
        }
    }
}

impl fmt::Display for VotableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.votable_type(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Votable {
    Question(Question),
    Answer(Answer),
}

impl Votable {
    pub fn reference(&self) -> VotableRef {
        match self {
            Votable::Question(q) => VotableRef::Question(q.id.clone()),
            Votable::Answer(a) => VotableRef::Answer(a.id.clone()),
        }
    }

    pub fn author_id(&self) -> &ActorId {
        match self {
            Votable::Question(q) => &q.author_id,
            Votable::Answer(a) => &a.author_id,
        }
    }

    /// The question this votable lives under: itself, or the answer's parent.
    pub fn question_id(&self) -> &QuestionId {
        match self {
            Votable::Question(q) => &q.id,
            Votable::Answer(a) => &a.question_id,
        }
    }

    pub fn votes(&self) -> &VoteSet {
        match self {
            Votable::Question(q) => &q.votes,
            Votable::Answer(a) => &a.votes,
        }
    }

    pub(crate) fn votes_mut(&mut self) -> &mut VoteSet {
        match self {
            Votable::Question(q) => &mut q.votes,
            Votable::Answer(a) => &mut a.votes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Answer,
    Vote,
    Accept,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: NotificationId,
    pub recipient_id: ActorId,
    /// `None` for system notifications.
    pub sender_id: Option<ActorId>,
    pub kind: NotificationKind,
    pub subject_question_id: Option<QuestionId>,
    pub subject_answer_id: Option<AnswerId>,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Inbox entry wrapping an immutable event with its read state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotification {
    pub event: NotificationEvent,
    pub read_at: Option<DateTime<Utc>>,
}

impl StoredNotification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub actor_id: ActorId,
    pub votable_type: VotableType,
    pub votable_id: String,
    pub vote_kind: VoteKind,
}

impl VoteRequest {
    pub fn votable_ref(&self) -> VotableRef {
        VotableRef::from_parts(self.votable_type, self.votable_id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub vote_count: i64,
    pub resulting_vote_kind: Option<VoteKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptRequest {
    pub actor_id: ActorId,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptReceipt {
    pub changed: bool,
}
