//! Chat command: interactive REPL over a [`RouterClient`].
//!
//! Queries are submitted on spawned tasks so the prompt stays responsive; typing a new
//! query while one is outstanding supersedes it. Notifications are printed as they are
//! pushed.

use crate::cli::output::{
    format_health, format_history, format_metrics_table, format_notification, format_response,
    HealthView,
};
use crate::cli::ChatArgs;
use crate::client::RouterClient;
use crate::config::ClientConfig;
use crate::controller::SubmitOutcome;
use crate::notify::NotificationEvent;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const HELP: &str = "\
Commands:
  /system [text]  set the system prompt (no text clears it)
  /model [name]   force a model (no name restores automatic routing)
  /history        list recent queries
  /recall N       load history entry N; press Enter to send it
  /metrics        show routing metrics
  /health         show backend health
  /clear          clear history and responses
  /reset          cancel, clear and reset metrics
  /restore        reload the stored session
  /help           show this help
  /quit           exit
Anything else is sent as a query.";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Blank line: send the recalled draft, if any
    Empty,
    Query(String),
    SystemPrompt(Option<String>),
    Model(Option<String>),
    History,
    /// 1-based history position
    Recall(usize),
    Metrics,
    Health,
    Clear,
    Reset,
    Restore,
    Help,
    Quit,
    Invalid(String),
}

/// Classify a line of input.
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Query(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let optional = || (!rest.is_empty()).then(|| rest.to_string());

    match name {
        "system" => ChatInput::SystemPrompt(optional()),
        "model" => ChatInput::Model(optional()),
        "history" => ChatInput::History,
        "recall" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => ChatInput::Recall(n),
            _ => ChatInput::Invalid("usage: /recall N (N starts at 1)".to_string()),
        },
        "metrics" => ChatInput::Metrics,
        "health" => ChatInput::Health,
        "clear" => ChatInput::Clear,
        "reset" => ChatInput::Reset,
        "restore" => ChatInput::Restore,
        "help" | "?" => ChatInput::Help,
        "quit" | "exit" | "q" => ChatInput::Quit,
        other => ChatInput::Invalid(format!("unknown command '/{}', try /help", other)),
    }
}

fn spawn_notification_printer(
    mut events: broadcast::Receiver<NotificationEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(NotificationEvent::Pushed(notification)) => {
                    eprintln!("{}", format_notification(&notification));
                }
                Ok(NotificationEvent::Dismissed { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Notification printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_submit(
    client: &Arc<RouterClient>,
    query: String,
    system_prompt: Option<String>,
    model: Option<String>,
) {
    if client.is_loading() {
        println!("{}", "(previous query superseded)".dimmed());
    }
    let client = Arc::clone(client);
    tokio::spawn(async move {
        match client
            .submit(&query, system_prompt.as_deref(), model.as_deref())
            .await
        {
            Ok(SubmitOutcome::Completed(entry)) => println!("\n{}", format_response(&entry)),
            // Failures arrive as notifications
            Ok(SubmitOutcome::Failed { .. }) | Ok(SubmitOutcome::Discarded) => {}
            Err(e) => eprintln!("{}", e.to_string().yellow()),
        }
    });
}

fn prompt(model: Option<&str>) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    match model {
        Some(model) => write!(stdout, "{} {} ", format!("[{}]", model).dimmed(), ">".bold())?,
        None => write!(stdout, "{} ", ">".bold())?,
    }
    stdout.flush()
}

/// Run the interactive session until `/quit`, end of input or Ctrl-C.
pub async fn run_chat(args: ChatArgs, mut config: ClientConfig) -> anyhow::Result<()> {
    if args.fresh {
        config.session.restore_on_start = false;
    }
    if args.no_health_check {
        config.health_check.enabled = false;
    }

    let client = Arc::new(RouterClient::from_config(&config)?);
    let printer = spawn_notification_printer(client.notifications().subscribe());
    client.start().await;

    println!(
        "Connected to {} {}",
        config.server.base_url.bold(),
        "(type /help for commands)".dimmed()
    );
    let restored = client.session().response_count();
    if restored > 0 {
        println!("Loaded {} response(s) from previous session", restored);
    } else if client.has_stored_session() {
        println!("A previous session is stored, type /restore to load it");
    }

    let mut system_prompt = args.system_prompt;
    let mut model = args.model;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(model.as_deref())?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_input(&line) {
            ChatInput::Empty => {
                let draft = client.controller().draft();
                if !draft.is_empty() {
                    spawn_submit(&client, draft, system_prompt.clone(), model.clone());
                }
            }
            ChatInput::Query(query) => {
                client.controller().set_draft(query.clone());
                spawn_submit(&client, query, system_prompt.clone(), model.clone());
            }
            ChatInput::SystemPrompt(text) => {
                match &text {
                    Some(_) => println!("System prompt set"),
                    None => println!("System prompt cleared"),
                }
                system_prompt = text;
            }
            ChatInput::Model(name) => {
                match &name {
                    Some(name) => println!("Forcing model {}", name.bold()),
                    None => println!("Automatic routing restored"),
                }
                model = name;
            }
            ChatInput::History => {
                let history = client.session().history();
                if history.is_empty() {
                    println!("No history yet");
                } else {
                    println!("{}", format_history(&history));
                }
            }
            ChatInput::Recall(n) => match client.recall(n - 1) {
                Some(query) => println!("Recalled: {} {}", query, "(Enter to send)".dimmed()),
                None => println!("No history entry {}", n),
            },
            ChatInput::Metrics => {
                client.metrics().refresh().await;
                match client.metrics().summary() {
                    Some(summary) => println!("{}", format_metrics_table(&summary)),
                    None => println!("Metrics unavailable"),
                }
            }
            ChatInput::Health => {
                if !client.health().is_running() {
                    client.health().poll_once().await;
                }
                println!(
                    "{}",
                    format_health(&HealthView::from(&client.health().snapshot()))
                );
            }
            ChatInput::Clear => {
                client.clear_history();
                println!("History cleared");
            }
            ChatInput::Reset => {
                client.reset_session().await;
                println!("Session reset");
            }
            ChatInput::Restore => {
                client.restore_session();
            }
            ChatInput::Help => println!("{}", HELP),
            ChatInput::Quit => break,
            ChatInput::Invalid(message) => println!("{}", message.yellow()),
        }
    }

    client.shutdown();
    printer.abort();
    Ok(())
}
