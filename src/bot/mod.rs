//! Chat bot layer: command parsing, handling, transport and the poll loop

pub mod command;
pub mod handler;
pub mod runner;
pub mod transport;

pub use command::{Command, ParsedCommand};
pub use handler::CommandHandler;
pub use runner::run_command_loop;
pub use transport::{ChatTransport, IncomingMessage, TelegramTransport, Update};
