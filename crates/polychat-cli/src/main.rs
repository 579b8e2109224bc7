//! Terminal chat client for a polychat relay.

mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use polychat_client::{ChatView, Conversation, RelayClient};
use polychat_types::Provider;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP, Input};
use crate::render::TerminalView;

#[derive(Parser)]
#[command(name = "polychat-chat", version, about = "Chat with OpenAI, Anthropic and Google models through a polychat relay")]
struct Args {
    /// Base URL of the relay.
    #[arg(long, env = "POLYCHAT_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Provider to start with (openai, anthropic, google).
    #[arg(short, long, default_value = "openai")]
    provider: Provider,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let client = RelayClient::new(args.url);
    let mut conversation = Conversation::new(args.provider);

    repl(&client, &mut conversation).await
}

async fn repl(client: &RelayClient, conversation: &mut Conversation) -> Result<()> {
    let mut line_editor = Reedline::create();
    let mut view = TerminalView::new();

    render::print_welcome(conversation.provider());

    loop {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(conversation.provider().to_string()),
            DefaultPromptSegment::Empty,
        );
        let signal = line_editor
            .read_line(&prompt)
            .context("failed to read input")?;

        let line = match signal {
            Signal::Success(line) => line,
            Signal::CtrlC => continue,
            Signal::CtrlD => break,
            #[allow(unreachable_patterns)]
            _ => continue,
        };

        match commands::parse(&line) {
            Input::Empty => {}
            Input::Invalid(message) => render::print_error(&message),
            Input::Message(text) => {
                if let Err(e) = client.submit(conversation, &text, &mut view).await {
                    render::print_error(&e.to_string());
                }
            }
            Input::Command(Command::SwitchProvider(provider)) => {
                match conversation.switch_provider(provider) {
                    Ok(Some(notice)) => view.message_appended(notice),
                    Ok(None) => {
                        render::print_notice(&format!("Already using {}", provider.descriptor().label))
                    }
                    Err(e) => render::print_error(&e.to_string()),
                }
            }
            Input::Command(Command::ListProviders) => render::print_providers(conversation.provider()),
            Input::Command(Command::Clear) => match conversation.clear() {
                Ok(()) => render::print_welcome(conversation.provider()),
                Err(e) => render::print_error(&e.to_string()),
            },
            Input::Command(Command::Help) => {
                for line in HELP.lines() {
                    render::print_notice(line);
                }
            }
            Input::Command(Command::Quit) => break,
        }
    }

    Ok(())
}
