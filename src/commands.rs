#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    Context,
    Export,
    Fuzzy,
    Reasoner,
    Model(Option<String>),
    Add(Option<String>),
    Remove(Option<String>),
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or(trimmed);
    let argument = parts
        .next()
        .map(str::trim)
        .filter(|argument| !argument.is_empty())
        .map(str::to_string);

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/exit" | "/quit" => SlashCommand::Quit,
        "/clear" => SlashCommand::Clear,
        "/context" => SlashCommand::Context,
        "/export" => SlashCommand::Export,
        "/fuzzy" => SlashCommand::Fuzzy,
        "/reasoner" => SlashCommand::Reasoner,
        "/model" => SlashCommand::Model(argument),
        "/add" => SlashCommand::Add(argument),
        "/remove" => SlashCommand::Remove(argument),
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

pub const HELP_TEXT: &str = "\
Commands:
  /add <pattern>     attach a file to the conversation context
  /remove <pattern>  detach a file
  /model [name]      list models, or switch the active model
  /reasoner          toggle between the default and reasoner models
  /fuzzy             toggle fuzzy file matching
  /context           show context usage statistics
  /clear             reset history and attached files
  /export            write the conversation to a timestamped JSON file
  /help              show this help
  /exit, /quit       leave the session";

#[cfg(test)]
mod tests {
    use super::{parse_slash_command, SlashCommand};

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("hello world"), None);
        assert_eq!(parse_slash_command("  "), None);
    }

    #[test]
    fn bare_commands_parse() {
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/exit"), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command(" /fuzzy "), Some(SlashCommand::Fuzzy));
    }

    #[test]
    fn arguments_are_captured() {
        assert_eq!(
            parse_slash_command("/add src/main.rs"),
            Some(SlashCommand::Add(Some("src/main.rs".to_string())))
        );
        assert_eq!(parse_slash_command("/add"), Some(SlashCommand::Add(None)));
        assert_eq!(
            parse_slash_command("/model mixtral-8x7b-32768"),
            Some(SlashCommand::Model(Some("mixtral-8x7b-32768".to_string())))
        );
        assert_eq!(parse_slash_command("/model"), Some(SlashCommand::Model(None)));
    }

    #[test]
    fn unknown_commands_are_reported_verbatim() {
        assert_eq!(
            parse_slash_command("/frobnicate now"),
            Some(SlashCommand::Unknown("/frobnicate".to_string()))
        );
    }
}
