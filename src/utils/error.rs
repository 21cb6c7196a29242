use thiserror::Error;

#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("Cannot vote on your own {target}")]
    SelfVoteForbidden { target: String },

    #[error("You need at least {required} reputation to {action} (current: {actual})")]
    InsufficientReputation {
        action: String,
        required: u32,
        actual: u32,
    },

    #[error("Not authorized: {reason}")]
    NotAuthorized { reason: String },

    #[error("Answer {answer_id} does not belong to question {question_id}")]
    MismatchedQuestion {
        question_id: String,
        answer_id: String,
    },

    #[error("Question {question_id} is {status}")]
    QuestionClosed { question_id: String, status: String },

    #[error("You have already answered question {question_id}")]
    AlreadyAnswered { question_id: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Version conflict on {id}: expected {expected}, found {found}")]
    VersionConflict { id: String, expected: u64, found: u64 },

    #[error("Gave up after {attempts} attempts due to concurrent writes")]
    RetriesExhausted { attempts: u32 },

    #[error("Notification delivery failed: {message}")]
    NotificationDeliveryFailed { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Eligibility,
    Authorization,
    State,
    Concurrency,
    Delivery,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InteractionError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SelfVoteForbidden { .. } | Self::InsufficientReputation { .. } => {
                ErrorCategory::Eligibility
            }
            Self::NotAuthorized { .. } => ErrorCategory::Authorization,
            Self::MismatchedQuestion { .. }
            | Self::QuestionClosed { .. }
            | Self::AlreadyAnswered { .. }
            | Self::NotFound { .. } => ErrorCategory::State,
            Self::VersionConflict { .. } | Self::RetriesExhausted { .. } => {
                ErrorCategory::Concurrency
            }
            Self::NotificationDeliveryFailed { .. } => ErrorCategory::Delivery,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Delivery => ErrorSeverity::Low,
            ErrorCategory::Concurrency => ErrorSeverity::Medium,
            ErrorCategory::Eligibility | ErrorCategory::Authorization | ErrorCategory::State => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Conflicts are worth replaying; everything else is a final answer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// HTTP status the request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SelfVoteForbidden { .. }
            | Self::MismatchedQuestion { .. }
            | Self::QuestionClosed { .. }
            | Self::AlreadyAnswered { .. } => 400,
            Self::InsufficientReputation { .. } | Self::NotAuthorized { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::VersionConflict { .. } => 409,
            Self::RetriesExhausted { .. } => 503,
            _ => 500,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::SelfVoteForbidden { .. } => "Vote on content written by other users",
            Self::InsufficientReputation { .. } => {
                "Earn reputation by asking and answering questions"
            }
            Self::NotAuthorized { .. } => "Only the question author can perform this action",
            Self::MismatchedQuestion { .. } => "Pick an answer posted to this question",
            Self::QuestionClosed { .. } => "Reopen the question first",
            Self::AlreadyAnswered { .. } => "Edit your existing answer instead",
            Self::NotFound { .. } => "Check the identifier and try again",
            Self::VersionConflict { .. } | Self::RetriesExhausted { .. } => {
                "The record is busy, retry the request"
            }
            Self::NotificationDeliveryFailed { .. } => "Check the notification sink",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check that the state file exists and is valid JSON"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::System => format!("Internal error: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InteractionError>;
