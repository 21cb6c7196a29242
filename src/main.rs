use anyhow::Context;
use clap::Parser;
use qa_interaction::adapters::snapshot::{Snapshot, SnapshotFile};
use qa_interaction::config::Command;
use qa_interaction::domain::model::{ActorId, AnswerId, QuestionId, VotableRef};
use qa_interaction::utils::error::ErrorSeverity;
use qa_interaction::utils::{logger, validation::Validate};
use qa_interaction::{CliConfig, EngineConfig, InMemoryInbox, InMemoryStore, InteractionService};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let verbose = cli.verbose || config.logging.verbose;
    if cli.json_logs || config.logging.format == "json" {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting qa-interaction {}", cli.command.name());
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let file = SnapshotFile::new(&cli.state);
    let (store, inbox) = file
        .read()
        .with_context(|| format!("loading state from {}", file.path().display()))?
        .into_stores();
    let store = Arc::new(store);
    let inbox = Arc::new(inbox);

    let service = InteractionService::new(store.clone(), store.clone(), store.clone(), inbox.clone())
        .with_config(&config);

    match run(&service, &inbox, &cli.command).await {
        Ok(output) => {
            if cli.command.mutates_state() {
                let snapshot = Snapshot::capture(&store, &inbox).await;
                file.write(&snapshot)
                    .with_context(|| format!("saving state to {}", file.path().display()))?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Err(e) => {
            tracing::error!(
                "{} failed: {} (Category: {:?}, Severity: {:?})",
                cli.command.name(),
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            println!(
                "{}",
                json!({ "error": e.to_string(), "status": e.status_code() })
            );

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(
    service: &InteractionService<InMemoryStore, InMemoryStore, InMemoryStore>,
    inbox: &InMemoryInbox,
    command: &Command,
) -> qa_interaction::Result<serde_json::Value> {
    match command {
        Command::Vote {
            actor,
            votable_type,
            id,
            kind,
        } => {
            let target = VotableRef::from_parts(*votable_type, id.as_str());
            let receipt = service.cast_vote(&ActorId::new(actor.as_str()), &target, *kind).await?;
            Ok(serde_json::to_value(receipt)?)
        }
        Command::Accept {
            actor,
            question,
            answer,
        } => {
            let receipt = service
                .accept_answer(
                    &ActorId::new(actor.as_str()),
                    &QuestionId::new(question.as_str()),
                    &AnswerId::new(answer.as_str()),
                )
                .await?;
            Ok(serde_json::to_value(receipt)?)
        }
        Command::Answer { actor, question } => {
            let answer = service
                .submit_answer(&ActorId::new(actor.as_str()), &QuestionId::new(question.as_str()))
                .await?;
            Ok(serde_json::to_value(answer)?)
        }
        Command::RemoveAnswer { actor, answer } => {
            let receipt = service
                .remove_answer(&ActorId::new(actor.as_str()), &AnswerId::new(answer.as_str()))
                .await?;
            Ok(json!({
                "answer_id": receipt.answer_id,
                "acceptance_released": receipt.acceptance_released,
            }))
        }
        Command::Status {
            actor,
            votable_type,
            id,
        } => {
            let target = VotableRef::from_parts(*votable_type, id.as_str());
            let status = service.vote_status(&ActorId::new(actor.as_str()), &target).await?;
            Ok(serde_json::to_value(status)?)
        }
        Command::Notifications {
            actor,
            unread,
            mark_read,
        } => {
            let recipient = ActorId::new(actor.as_str());
            let listed = inbox.list(&recipient, *unread).await;
            if *mark_read {
                let marked = inbox.mark_all_read(&recipient).await;
                tracing::info!("Marked {} notifications read for {}", marked, recipient);
            }
            Ok(serde_json::to_value(listed)?)
        }
    }
}
