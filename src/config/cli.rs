use crate::domain::model::{VotableType, VoteKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "qa-interaction")]
#[command(about = "Votes, answer acceptance and notifications for a Q&A site")]
pub struct CliConfig {
    #[arg(long, default_value = "./qa-state.json", help = "JSON state file")]
    pub state: PathBuf,

    #[arg(long, help = "TOML engine configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Cast (or toggle off) a vote on a question or answer
    Vote {
        #[arg(long)]
        actor: String,
        #[arg(long = "type", value_name = "question|answer")]
        votable_type: VotableType,
        #[arg(long)]
        id: String,
        #[arg(long, value_name = "up|down")]
        kind: VoteKind,
    },
    /// Accept an answer as the question author
    Accept {
        #[arg(long)]
        actor: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
    },
    /// Post an answer to an open question
    Answer {
        #[arg(long)]
        actor: String,
        #[arg(long)]
        question: String,
    },
    /// Remove an answer
    RemoveAnswer {
        #[arg(long)]
        actor: String,
        #[arg(long)]
        answer: String,
    },
    /// Show how an actor voted on a question or answer
    Status {
        #[arg(long)]
        actor: String,
        #[arg(long = "type", value_name = "question|answer")]
        votable_type: VotableType,
        #[arg(long)]
        id: String,
    },
    /// List an actor's notifications
    Notifications {
        #[arg(long)]
        actor: String,
        #[arg(long)]
        unread: bool,
        #[arg(long, help = "Mark everything listed as read")]
        mark_read: bool,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Vote { .. } => "vote",
            Command::Accept { .. } => "accept",
            Command::Answer { .. } => "answer",
            Command::RemoveAnswer { .. } => "remove-answer",
            Command::Status { .. } => "status",
            Command::Notifications { .. } => "notifications",
        }
    }

    /// Read-only commands leave the state file untouched.
    pub fn mutates_state(&self) -> bool {
        !matches!(self, Command::Status { .. })
    }
}
