use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use engineer_cli::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use engineer_cli::confirm::StdinGate;
use engineer_cli::export::export_history;
use engineer_cli::transports::transport_from_env;
use engineer_cli::turn::{run_turn, TurnError};
use engineer_cli::logging;
use session_engine::{EngineConfig, ModelRegistry, ModelRole, Session};
use tool_gateway::{ToolGateway, ToolLimits};

const SYSTEM_PROMPT: &str = "\
You are a careful coding assistant working inside the user's project. \
Use the provided tools to read, create, and edit files or run shell \
commands; prefer small, verifiable steps and report what you changed.";

fn main() -> anyhow::Result<()> {
    logging::init();

    let root = env::current_dir()?;
    let config_path = env::var("ENGINEER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| root.join("config.json"));
    let config = EngineConfig::load(&config_path)?;

    let limits = ToolLimits {
        read_max_bytes: config.max_multiple_read_size,
        create_max_bytes: config.max_file_content_size_create,
        min_edit_score: config.min_edit_score,
        shell_timeout_secs: config.shell_timeout_secs,
        shell_max_output_bytes: config.shell_max_output_bytes,
        require_shell_confirmation: config.require_shell_confirmation,
    };

    let registry = ModelRegistry::from_config(&config);
    let mut session = Session::new(
        config,
        registry,
        &root,
        Some(SYSTEM_PROMPT.to_string()),
    )?;
    let mut gateway = ToolGateway::new(&root, session.walk_filter(), limits, StdinGate)?;
    let mut transport = transport_from_env()?;

    println!(
        "engineer_cli — model {} — {} (type /help for commands)",
        session.active_model().id,
        root.display()
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_slash_command(input) {
            Some(SlashCommand::Quit) => break,
            Some(command) => handle_command(command, &mut session),
            None => match run_turn(&mut session, transport.as_mut(), &mut gateway, input) {
                Ok(summary) => {
                    for warning in &summary.warnings {
                        eprintln!("warning: {warning}");
                    }
                    println!("{}", summary.assistant_text);
                }
                Err(TurnError::Transport(error)) => {
                    eprintln!("transport error: {error} (session unchanged, retry when ready)");
                }
                Err(TurnError::Engine(error)) => {
                    eprintln!("error: {error}");
                }
            },
        }
    }

    Ok(())
}

fn handle_command(command: SlashCommand, session: &mut Session) {
    match command {
        SlashCommand::Help => println!("{HELP_TEXT}"),
        SlashCommand::Clear => {
            session.clear();
            println!("history and attached files cleared");
        }
        SlashCommand::Context => print_context(session),
        SlashCommand::Export => match export_history(session.history(), session.root()) {
            Ok(path) => println!("exported to {}", path.display()),
            Err(error) => eprintln!("export failed: {error:#}"),
        },
        SlashCommand::Fuzzy => {
            let enabled = session.toggle_fuzzy();
            println!(
                "fuzzy matching {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        SlashCommand::Reasoner => match session.toggle_reasoner() {
            Ok((profile, _)) => println!("active model: {}", profile.id),
            Err(error) => eprintln!("error: {error}"),
        },
        SlashCommand::Model(None) => {
            for profile in session.registry().list_all() {
                let marker = if profile.id == session.active_model().id {
                    "*"
                } else {
                    " "
                };
                let role = match profile.role {
                    ModelRole::Default => " (default)",
                    ModelRole::Reasoner => " (reasoner)",
                    ModelRole::Other => "",
                };
                println!(
                    "{marker} {} — {} tokens{role}",
                    profile.id, profile.context_tokens
                );
            }
        }
        SlashCommand::Model(Some(id)) => match session.switch_model(&id) {
            Ok((profile, report)) => {
                println!("active model: {}", profile.id);
                if report.dropped_messages > 0 || report.evicted_files > 0 {
                    println!(
                        "truncated for the smaller context: {} message(s), {} file(s)",
                        report.dropped_messages, report.evicted_files
                    );
                }
            }
            Err(error) => eprintln!("error: {error}"),
        },
        SlashCommand::Add(None) => println!("usage: /add <pattern>"),
        SlashCommand::Add(Some(pattern)) => match session.add_file(&pattern) {
            Ok(outcome) => {
                println!(
                    "attached {} (score {})",
                    outcome.path.display(),
                    outcome.score
                );
                if outcome.report.evicted_files > 0 {
                    println!("evicted {} older file(s)", outcome.report.evicted_files);
                }
            }
            Err(error) => eprintln!("error: {error}"),
        },
        SlashCommand::Remove(None) => println!("usage: /remove <pattern>"),
        SlashCommand::Remove(Some(pattern)) => match session.remove_file(&pattern) {
            Ok(path) => println!("detached {}", path.display()),
            Err(error) => eprintln!("error: {error}"),
        },
        SlashCommand::Unknown(command) => {
            println!("unknown command {command}; try /help");
        }
        SlashCommand::Quit => {}
    }
}

fn print_context(session: &Session) {
    let info = session.context_info();
    println!("model:     {}", info.model_id);
    println!("messages:  {}", info.message_count);
    println!("files:     {}", info.file_count);
    println!(
        "tokens:    ~{} / {} ({:.1}%)",
        info.estimated_tokens, info.capacity, info.usage_percent
    );

    if info.critical_limit {
        println!("status:    critical — aggressive truncation active");
    } else if info.approaching_limit {
        println!("status:    approaching the context limit");
    } else {
        println!("status:    ok");
    }

    for file in session.files() {
        println!(
            "  {} ({} bytes, ~{} tokens)",
            file.path.display(),
            file.size_bytes,
            file.estimated_tokens
        );
    }
}
