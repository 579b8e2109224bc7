//! Terminal rendering of the conversation.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use polychat_client::{ChatView, Message, Provider, Role};

/// Parse a `#rrggbb` descriptor color.
fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::Rgb {
        r: (value >> 16) as u8,
        g: (value >> 8) as u8,
        b: value as u8,
    })
}

pub fn provider_color(provider: Provider) -> Color {
    hex_color(provider.descriptor().color).unwrap_or(Color::Grey)
}

/// Provider label on a background of its color.
pub fn badge(provider: Provider) -> String {
    let label = format!(" {} ", provider.descriptor().label);
    label
        .with(Color::White)
        .on(provider_color(provider))
        .bold()
        .to_string()
}

pub fn print_welcome(current: Provider) {
    let rule = "─".repeat(60);
    println!();
    println!("  {}", "Welcome to polychat".bold());
    println!("  Start a conversation by typing a message below.");
    println!("  Replies stream in as they are generated.");
    println!("  {}", rule.as_str().dark_grey());
    print_providers(current);
    println!("  {}", rule.as_str().dark_grey());
    println!("  {}", "Type /help for commands.".dark_grey());
    println!();
}

pub fn print_providers(current: Provider) {
    for provider in Provider::ALL {
        let descriptor = provider.descriptor();
        let marker = if provider == current { "●" } else { " " };
        println!(
            "  {} {} {}",
            marker.with(provider_color(provider)),
            badge(provider),
            descriptor.model.dark_grey()
        );
    }
}

pub fn print_notice(text: &str) {
    println!("  {}", text.dark_grey());
}

pub fn print_error(text: &str) {
    println!("  {}", text.red());
}

/// Writes conversation updates to stdout as they happen.
#[derive(Default)]
pub struct TerminalView {
    waiting: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_waiting(&mut self) {
        if self.waiting {
            let _ = execute!(io::stdout(), MoveToColumn(0), Clear(ClearType::CurrentLine));
            self.waiting = false;
        }
    }
}

impl ChatView for TerminalView {
    fn message_appended(&mut self, message: &Message) {
        self.clear_waiting();
        match message.role() {
            // The prompt line already shows what the user typed
            Role::User => {}
            Role::Assistant => {
                if let Some(provider) = message.provider() {
                    println!("{}", badge(provider));
                }
                print!("{}", message.content());
            }
            Role::System => {
                let badge = message.provider().map(badge).unwrap_or_default();
                println!("{} {}", badge, message.content().italic().dark_grey());
                println!();
            }
        }
        let _ = io::stdout().flush();
    }

    fn delta(&mut self, _message: &Message, delta: &str) {
        print!("{delta}");
        let _ = io::stdout().flush();
    }

    fn waiting(&mut self, provider: Provider) {
        print!(
            "{} {}",
            badge(provider),
            "thinking...".italic().dark_grey()
        );
        let _ = io::stdout().flush();
        self.waiting = true;
    }

    fn turn_finished(&mut self) {
        self.clear_waiting();
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(
            hex_color("#10a37f"),
            Some(Color::Rgb {
                r: 0x10,
                g: 0xa3,
                b: 0x7f
            })
        );
        assert_eq!(hex_color("10a37f"), None);
        assert_eq!(hex_color("#fff"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_every_provider_has_a_color() {
        for provider in Provider::ALL {
            assert!(hex_color(provider.descriptor().color).is_some());
        }
    }

    #[test]
    fn test_badge_contains_label() {
        assert!(badge(Provider::Anthropic).contains("Anthropic"));
    }
}
