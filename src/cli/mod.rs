//! CLI definitions for jaat-chat.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Jaat-AI demo chat
#[derive(Parser, Debug)]
#[command(name = "jaat-chat", version, about = "Jaat-AI demo chat in the terminal")]
pub struct Cli {
    /// Directory for persisted conversations (overrides JAAT_CHAT_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Reply immediately instead of simulating thinking time
    #[arg(long, global = true)]
    pub no_delay: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat on stdin
    Chat,
    /// Send one message to the active conversation and print the reply
    Ask(AskArgs),
    /// List conversations, most recent first
    List,
    /// Print a conversation's messages
    Show(IdArgs),
    /// Delete a conversation
    Delete(IdArgs),
    /// Delete every conversation
    Clear,
}

/// Arguments for `jaat-chat ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Message text (words are joined with spaces)
    #[arg(required = true)]
    pub message: Vec<String>,

    /// Start a new conversation for this message
    #[arg(long)]
    pub new: bool,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.message.join(" ")
    }
}

/// A single conversation id argument.
#[derive(Parser, Debug)]
pub struct IdArgs {
    /// Conversation id
    pub id: String,
}

/// One line of input in the interactive chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    New,
    List,
    Open(String),
    Delete(String),
    Clear,
    Help,
    Quit,
    /// Slash command that was not recognized or is missing its argument.
    Invalid(String),
}

impl ReplCommand {
    /// Parse a line. Anything not starting with `/` is a chat message.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match (name, arg) {
            ("new", _) => Self::New,
            ("list", _) => Self::List,
            ("clear", _) => Self::Clear,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            ("open", id) if !id.is_empty() => Self::Open(id.to_string()),
            ("delete", id) if !id.is_empty() => Self::Delete(id.to_string()),
            _ => Self::Invalid(line.to_string()),
        }
    }
}

pub const REPL_HELP: &str = "\
Commands:
  /new           start a new conversation
  /list          list conversations
  /open <id>     switch to a conversation
  /delete <id>   delete a conversation
  /clear         delete every conversation
  /help          show this help
  /quit          leave";

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["jaat-chat", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert!(cli.data_dir.is_none());
        assert!(!cli.no_delay);
    }

    #[test]
    fn parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["jaat-chat", "ask", "--new", "what", "is", "this"]).unwrap();
        match cli.command {
            Commands::Ask(args) => {
                assert!(args.new);
                assert_eq!(args.text(), "what is this");
            }
            other => panic!("expected Ask, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli =
            Cli::try_parse_from(["jaat-chat", "list", "--data-dir", "/tmp/x", "--no-delay"])
                .unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.no_delay);
    }

    #[test]
    fn parse_show_requires_id() {
        assert!(Cli::try_parse_from(["jaat-chat", "show"]).is_err());
        let cli = Cli::try_parse_from(["jaat-chat", "show", "abc"]).unwrap();
        match cli.command {
            Commands::Show(args) => assert_eq!(args.id, "abc"),
            other => panic!("expected Show, got {other:?}"),
        }
    }

    #[test]
    fn parse_ask_without_message_is_error() {
        assert!(Cli::try_parse_from(["jaat-chat", "ask"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["jaat-chat"]).is_err());
    }

    #[test]
    fn repl_lines_parse() {
        assert_eq!(
            ReplCommand::parse("  hello there "),
            ReplCommand::Message("hello there".to_string())
        );
        assert_eq!(ReplCommand::parse("/new"), ReplCommand::New);
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
        assert_eq!(
            ReplCommand::parse("/open  abc-123 "),
            ReplCommand::Open("abc-123".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/delete"),
            ReplCommand::Invalid("/delete".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/dance"),
            ReplCommand::Invalid("/dance".to_string())
        );
    }
}
