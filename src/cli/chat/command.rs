/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Quit,
    NewSession,
    Categories,
    Category(&'a str),
    Examples,
    Example(usize),
    Prompt(&'a str),
    Invalid(String),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Command::Prompt(line);
        }

        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (trimmed, ""),
        };

        match (name, arg) {
            ("/help", _) => Command::Help,
            ("/quit" | "/exit", _) => Command::Quit,
            ("/new" | "/clear", _) => Command::NewSession,
            ("/categories", _) => Command::Categories,
            ("/category", "") => Command::Invalid("Usage: /category <name>".to_string()),
            ("/category", name) => Command::Category(name),
            ("/examples", _) => Command::Examples,
            ("/example", n) => match n.parse() {
                Ok(n) => Command::Example(n),
                Err(_) => Command::Invalid("Usage: /example <n>".to_string()),
            },
            // Not one of ours, e.g. a path at the start of a question
            _ => Command::Prompt(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_prompt() {
        assert_eq!(Command::parse("  How many units? "), Command::Prompt("  How many units? "));
        assert_eq!(Command::parse("   "), Command::Prompt("   "));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse(" /quit "), Command::Quit);
        assert_eq!(Command::parse("/new"), Command::NewSession);
        assert_eq!(Command::parse("/categories"), Command::Categories);
        assert_eq!(Command::parse("/category  Service History "), Command::Category("Service History"));
        assert_eq!(Command::parse("/examples"), Command::Examples);
        assert_eq!(Command::parse("/example 2"), Command::Example(2));
    }

    #[test]
    fn test_bad_commands() {
        assert!(matches!(Command::parse("/category"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/example two"), Command::Invalid(_)));
    }

    #[test]
    fn test_unknown_slash_words_are_prompts() {
        assert_eq!(
            Command::parse("/var/log is full, why?"),
            Command::Prompt("/var/log is full, why?")
        );
        assert_eq!(Command::parse("/frobnicate"), Command::Prompt("/frobnicate"));
    }
}
