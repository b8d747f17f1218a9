// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courierlink - plan limits, messaging quotas, and chat between couriers
//! and businesses.
//!
//! This is the binary entry point. Every command runs once against the
//! configured SQLite database and exits.

mod chat;
mod doctor;
mod plans;
mod profile;
mod session;
mod status;
mod usage;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgGroup, Parser, Subcommand};
use courierlink_config::model::{CourierlinkConfig, GateConfig};
use courierlink_config::ConfigError;
use courierlink_core::{ConversationId, CourierlinkError, MatchStore, PlanTier, UserId};
use courierlink_plans::gate::GateState;
use courierlink_plans::{BlockingModal, Notice};
use courierlink_storage::SqliteStorage;
use serde::Serialize;
use tracing::{debug, error};

use crate::chat::Target;
use crate::profile::ProfileAction;
use crate::session::CliSession;

/// Courierlink - plan limits and chat for couriers and businesses.
#[derive(Parser, Debug)]
#[command(name = "courierlink", version, about, long_about = None)]
struct Cli {
    /// Load this configuration file instead of the standard lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Act as this user.
    #[arg(long = "as", global = true, value_name = "USER")]
    acting_as: Option<String>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List plan tiers and their daily limits.
    Plans,
    /// Show a business's plan and today's usage.
    Status {
        /// Business user to inspect (defaults to --as).
        #[arg(long)]
        user: Option<String>,
    },
    /// Manage courier and business profiles.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Start a chat with a courier or a business.
    #[command(group(ArgGroup::new("target").required(true).args(["courier", "business"])))]
    Contact {
        /// Courier user to contact (as a business).
        #[arg(long)]
        courier: Option<String>,
        /// Business user to contact (as a courier).
        #[arg(long)]
        business: Option<String>,
    },
    /// Send a message into a conversation.
    Send {
        #[arg(long)]
        conversation: String,
        /// Message text.
        text: String,
    },
    /// Show a conversation's messages, oldest first.
    Messages {
        #[arg(long)]
        conversation: String,
        /// Only the most recent N messages.
        #[arg(long)]
        limit: Option<i64>,
        /// Mark the other side's messages as read.
        #[arg(long)]
        mark_read: bool,
    },
    /// List conversations of the --as user, most recent first.
    Conversations,
    /// Record one application approval for the --as business.
    Approve,
    /// Roll over usage counters whose 24 hour window has passed.
    ResetUsage,
    /// Run diagnostic checks.
    Doctor,
    /// Print the effective configuration.
    Config,
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Create a courier profile.
    CreateCourier {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
    },
    /// Create a business profile on the free plan.
    CreateBusiness {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
    },
    /// Change a business's plan. Usage counters are kept.
    SetPlan {
        #[arg(long)]
        user: String,
        #[arg(long)]
        plan: PlanTier,
    },
}

impl From<ProfileCommands> for ProfileAction {
    fn from(command: ProfileCommands) -> Self {
        match command {
            ProfileCommands::CreateCourier { user, name } => Self::CreateCourier { user, name },
            ProfileCommands::CreateBusiness { user, name } => Self::CreateBusiness { user, name },
            ProfileCommands::SetPlan { user, plan } => Self::SetPlan { user, plan },
        }
    }
}

/// How a command that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    /// The request was answered with a notice instead of being carried out.
    Refused,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            courierlink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);
    debug!(
        app = %config.app.name,
        database = %config.storage.database_path,
        "configuration loaded"
    );

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    match run(cli.command, cli.acting_as.as_deref(), cli.json, use_color, &config).await {
        Ok(Outcome::Done) => {}
        Ok(Outcome::Refused) => std::process::exit(2),
        Err(err) => {
            report_error(&err, &config.gate, cli.json);
            std::process::exit(exit_code(&err));
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CourierlinkConfig, Vec<ConfigError>> {
    match path {
        Some(path) => courierlink_config::load_and_validate_path(path),
        None => courierlink_config::load_and_validate(),
    }
}

async fn run(
    command: Option<Commands>,
    acting_as: Option<&str>,
    json: bool,
    use_color: bool,
    config: &CourierlinkConfig,
) -> Result<Outcome, CourierlinkError> {
    let Some(command) = command else {
        println!("courierlink: use --help for available commands");
        return Ok(Outcome::Done);
    };

    match command {
        Commands::Plans => {
            plans::run_plans(json, use_color);
            return Ok(Outcome::Done);
        }
        Commands::Doctor => return Ok(doctor::run_doctor(config, use_color).await),
        Commands::Config => {
            print_config(config, json)?;
            return Ok(Outcome::Done);
        }
        _ => {}
    }

    let storage = Arc::new(open_storage(config).await?);
    let store: Arc<dyn MatchStore> = storage.clone();
    let session = Arc::new(CliSession::new(acting_as));

    let outcome = match command {
        Commands::Status { user } => {
            let user = user
                .or_else(|| acting_as.map(str::to_string))
                .ok_or(CourierlinkError::Unauthenticated)?;
            status::run_status(store.as_ref(), &UserId(user), json, use_color).await?;
            Outcome::Done
        }
        Commands::Profile { action } => {
            profile::run_profile(&storage, action.into(), json).await?;
            Outcome::Done
        }
        Commands::Contact { courier, business } => {
            let target = match (courier, business) {
                (Some(courier), _) => Target::Courier(courier),
                (None, Some(business)) => Target::Business(business),
                (None, None) => {
                    return Err(CourierlinkError::Internal("no contact target".into()));
                }
            };
            chat::run_contact(store, session, &config.gate, &target, json).await?
        }
        Commands::Send { conversation, text } => {
            chat::run_send(store, session, &ConversationId(conversation), &text, json).await?
        }
        Commands::Messages {
            conversation,
            limit,
            mark_read,
        } => {
            chat::run_messages(
                store,
                session,
                &ConversationId(conversation),
                limit,
                mark_read,
                json,
            )
            .await?
        }
        Commands::Conversations => chat::run_conversations(store, session, json).await?,
        Commands::Approve => usage::run_approve(&storage, session.as_ref(), json).await?,
        Commands::ResetUsage => {
            usage::run_reset_usage(&storage, json).await?;
            Outcome::Done
        }
        Commands::Plans | Commands::Doctor | Commands::Config => Outcome::Done,
    };

    storage.close().await?;
    Ok(outcome)
}

async fn open_storage(config: &CourierlinkConfig) -> Result<SqliteStorage, CourierlinkError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

fn print_config(config: &CourierlinkConfig, json: bool) -> Result<(), CourierlinkError> {
    if json {
        print_json(config);
    } else {
        let rendered = courierlink_config::render_toml(config)
            .map_err(|e| CourierlinkError::Config(e.to_string()))?;
        print!("{rendered}");
    }
    Ok(())
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Error output shaped like the notice the web client would show.
#[derive(Debug, Serialize)]
struct ErrorReport {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modal: Option<BlockingModal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sign_in: Option<String>,
}

fn error_report(err: &CourierlinkError, gate: &GateConfig) -> ErrorReport {
    let mut report = ErrorReport {
        error: err.to_string(),
        notice: None,
        modal: None,
        sign_in: None,
    };
    match err {
        CourierlinkError::Unauthenticated => report.sign_in = Some(gate.sign_in_path.clone()),
        CourierlinkError::QuotaExhausted { .. } => {
            report.modal = BlockingModal::for_state(GateState::BlockedExhausted, &gate.upgrade_url);
        }
        other => {
            report.notice =
                Some(Notice::from_error(other, &gate.upgrade_url).unwrap_or_else(Notice::generic));
        }
    }
    report
}

/// Errors the web client answers with a notice exit like a refused request.
fn exit_code(err: &CourierlinkError) -> i32 {
    match err {
        CourierlinkError::Unauthenticated
        | CourierlinkError::RoleMismatch { .. }
        | CourierlinkError::SelfContactRejected
        | CourierlinkError::QuotaExhausted { .. }
        | CourierlinkError::InboundRequestsDisabled { .. } => 2,
        _ => 1,
    }
}

fn report_error(err: &CourierlinkError, gate: &GateConfig, json: bool) {
    if err.is_retryable() {
        error!(error = %err, "command failed");
    } else {
        debug!(error = %err, "command refused");
    }

    let report = error_report(err, gate);
    if json {
        print_json(&report);
        return;
    }
    if let Some(url) = &report.sign_in {
        eprintln!("courierlink: sign in required (pass --as <user>): {url}");
    }
    if let Some(modal) = &report.modal {
        eprintln!("courierlink: {}", modal.title);
        eprintln!("  {}", modal.body);
        eprintln!("  {}: {}", modal.upgrade_label, modal.upgrade_url);
    }
    if let Some(notice) = &report.notice {
        eprintln!("courierlink: {}", notice.message);
        if let Some(action) = &notice.action {
            eprintln!("  {}: {}", action.label, action.url);
        }
        eprintln!("  ({})", report.error);
    }
}

/// Initialize the tracing subscriber. Logs go to stderr so `--json` output
/// stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courierlink={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
