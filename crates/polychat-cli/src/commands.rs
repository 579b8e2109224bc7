//! REPL input parsing.

use polychat_types::Provider;

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    Command(Command),
    /// A slash command that could not be understood.
    Invalid(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    SwitchProvider(Provider),
    ListProviders,
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "\
/provider <name>   switch provider (openai, anthropic, google)
/providers         list providers
/clear             start a new conversation
/help              show this help
/quit              exit";

pub fn parse(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let command = match (name, arg) {
        ("provider" | "p", Some(arg)) => match arg.parse::<Provider>() {
            Ok(provider) => Command::SwitchProvider(provider),
            Err(e) => return Input::Invalid(e.to_string()),
        },
        ("provider" | "p", None) => {
            return Input::Invalid(format!(
                "Usage: /provider <name> (one of: {})",
                Provider::valid_names()
            ));
        }
        ("providers", _) => Command::ListProviders,
        ("clear", _) => Command::Clear,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => return Input::Invalid(format!("Unknown command: /{name}. Type /help for commands.")),
    };
    Input::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(parse("  hello there \n"), Input::Message("hello there".to_string()));
        assert_eq!(parse("   "), Input::Empty);
    }

    #[test]
    fn test_provider_switch() {
        assert_eq!(
            parse("/provider anthropic"),
            Input::Command(Command::SwitchProvider(Provider::Anthropic))
        );
        assert_eq!(
            parse("/p google"),
            Input::Command(Command::SwitchProvider(Provider::Google))
        );
    }

    #[test]
    fn test_provider_switch_errors() {
        match parse("/provider bogus") {
            Input::Invalid(message) => assert!(message.contains("openai, anthropic, google")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse("/provider"), Input::Invalid(_)));
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(parse("/providers"), Input::Command(Command::ListProviders));
        assert_eq!(parse("/clear"), Input::Command(Command::Clear));
        assert_eq!(parse("/quit"), Input::Command(Command::Quit));
        assert_eq!(parse("/exit"), Input::Command(Command::Quit));
        assert_eq!(parse("/help"), Input::Command(Command::Help));
        assert!(matches!(parse("/frobnicate"), Input::Invalid(_)));
        assert!(matches!(parse("/"), Input::Invalid(_)));
    }
}
