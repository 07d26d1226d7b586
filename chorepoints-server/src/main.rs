use chorepoints_server::config::{AppConfig, ConfigError};
use chorepoints_server::storage::Store;
use chorepoints_server::{Engine, InvitationPolicy, WorkflowError};
mod cli;

use std::io::ErrorKind;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = cli::Cli::parse();

    // Console-only logging with env-driven level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("config file not found; using defaults");
            AppConfig::default()
        }
        Err(e) => {
            tracing::error!(error=%e, "Failed to load config");
            std::process::exit(2);
        }
    };

    let db_path = config.db_path();
    // Ensure data dir exists when using default
    if let Some(parent) = std::path::Path::new(&db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = match Store::connect_sqlite(&db_path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, path=%db_path, "Failed to connect DB");
            std::process::exit(3);
        }
    };

    if let cli::Command::Migrate = args.command {
        if let Err(e) = store.seed_from_config(&config.seed).await {
            tracing::error!(error=%e, "Failed to seed DB");
            std::process::exit(4);
        }
        tracing::info!(path=%db_path, "database ready");
        return;
    }

    let policy = match InvitationPolicy::try_from(&config.invitations) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error=%e, "Invalid invitation policy");
            std::process::exit(2);
        }
    };
    let engine = Engine::new(store, policy);
    if let Err(e) = run(&engine, args.command).await {
        tracing::error!(error=%e, "command failed");
        std::process::exit(1);
    }
}

async fn run(engine: &Engine, command: cli::Command) -> Result<(), WorkflowError> {
    use cli::Command;
    match command {
        Command::Migrate => {}
        Command::Balance { child } => {
            println!("{}", engine.balance(&child).await?);
        }
        Command::History { child } => {
            for e in engine.history(&child).await? {
                println!(
                    "{}\t{:+}\t{}\t{}\t{}",
                    e.created_at,
                    e.change_amount,
                    e.kind,
                    e.created_by,
                    e.note.as_deref().unwrap_or("")
                );
            }
        }
        Command::Adjust {
            parent,
            child,
            amount,
            note,
        } => {
            engine
                .adjust_points(&parent, &child, amount, note.as_deref())
                .await?;
            println!("{}", engine.balance(&child).await?);
        }
        Command::Assign {
            parent,
            child,
            task,
        } => {
            println!("{}", engine.assign_task(&parent, &child, &task).await?);
        }
        Command::Submit { child, assignment } => {
            engine.submit_task(&child, &assignment).await?;
        }
        Command::Verify {
            parent,
            assignment,
            decision,
        } => {
            engine.verify_task(&parent, &assignment, decision).await?;
        }
        Command::Claim { child, reward } => {
            println!("{}", engine.claim_reward(&child, &reward).await?);
        }
        Command::Review {
            parent,
            claim,
            decision,
        } => {
            engine.review_claim(&parent, &claim, decision).await?;
        }
        Command::Invite { parent, child } => {
            println!(
                "{}",
                engine.generate_invitation_code(&parent, &child).await?
            );
        }
        Command::Accept { parent, code } => {
            engine.accept_invitation(&parent, &code).await?;
        }
    }
    Ok(())
}
