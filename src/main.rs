//! jaat-chat CLI binary entry point.

use std::io::{BufRead, Write};

use clap::Parser;
use jaat_chat::cli::{AskArgs, Cli, Commands, ReplCommand, REPL_HELP};
use jaat_chat::config::ChatConfig;
use jaat_chat::session::{ChatSession, ReplyOutcome, ThinkingDelay};
use jaat_chat::types::{Conversation, Role};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match build_session(&cli) {
        Ok(mut session) => match cli.command {
            Commands::Chat => handle_chat(&mut session).await,
            Commands::Ask(args) => handle_ask(&mut session, &args).await,
            Commands::List => handle_list(&session),
            Commands::Show(args) => handle_show(&session, &args.id),
            Commands::Delete(args) => handle_delete(&mut session, &args.id),
            Commands::Clear => session.clear_all().map_err(Into::into),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_session(cli: &Cli) -> Result<ChatSession, Box<dyn std::error::Error>> {
    let mut config = ChatConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if cli.no_delay {
        config = config.with_thinking_delay(ThinkingDelay::none());
    }
    tracing::debug!(data_dir = %config.data_dir.display(), "starting session");
    Ok(ChatSession::from_config(&config)?)
}

async fn handle_ask(
    session: &mut ChatSession,
    args: &AskArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    session.open()?;
    if args.new {
        session.start_new_conversation()?;
    }
    let Some(pending) = session.submit(&args.text())? else {
        return Err("message must not be blank".into());
    };
    if let ReplyOutcome::Delivered(conversation) = pending.deliver().await? {
        if let Some(reply) = conversation.last_message() {
            println!("{}", reply.content);
        }
    }
    Ok(())
}

async fn handle_chat(session: &mut ChatSession) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(conversation) = session.open()? {
        print_conversation(&conversation);
    } else {
        println!("No conversations yet. Say hello!");
    }
    println!("Type /help for commands.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        match ReplCommand::parse(&line?) {
            ReplCommand::Message(text) => {
                let Some(pending) = session.submit(&text)? else {
                    continue;
                };
                eprint!("…thinking");
                let outcome = pending.deliver().await?;
                eprint!("\r          \r");
                if let ReplyOutcome::Delivered(conversation) = outcome {
                    if let Some(reply) = conversation.last_message() {
                        println!("{}\n", reply.content);
                    }
                }
            }
            ReplCommand::New => {
                let conversation = session.start_new_conversation()?;
                println!("Started conversation {}", conversation.id);
            }
            ReplCommand::List => handle_list(session)?,
            ReplCommand::Open(id) => match session.open_conversation(&id)? {
                Some(conversation) => print_conversation(&conversation),
                None => println!("No conversation with id {id}"),
            },
            ReplCommand::Delete(id) => handle_delete(session, &id)?,
            ReplCommand::Clear => {
                session.clear_all()?;
                println!("All conversations deleted.");
            }
            ReplCommand::Help => println!("{REPL_HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(line) => println!("Unknown command: {line} (try /help)"),
        }
    }
    Ok(())
}

fn handle_list(session: &ChatSession) -> Result<(), Box<dyn std::error::Error>> {
    let conversations = session.store().list_by_recency();
    if conversations.is_empty() {
        println!("No conversations.");
        return Ok(());
    }
    let active = session.store().active_conversation();
    for conversation in conversations {
        let marker = if active.as_deref() == Some(conversation.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {}  {}",
            conversation.id,
            conversation.created_at.format("%Y-%m-%d %H:%M"),
            conversation.title
        );
    }
    Ok(())
}

fn handle_show(session: &ChatSession, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    match session.store().get_conversation(id) {
        Some(conversation) => {
            print_conversation(&conversation);
            Ok(())
        }
        None => Err(format!("No conversation with id {id}").into()),
    }
}

fn handle_delete(session: &mut ChatSession, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if session.delete_conversation(id)? {
        println!("Deleted {id}");
    } else {
        println!("No conversation with id {id}");
    }
    Ok(())
}

fn print_conversation(conversation: &Conversation) {
    println!("# {}", conversation.title);
    for message in &conversation.messages {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "jaat",
        };
        println!("{speaker}: {}\n", message.content);
    }
}
