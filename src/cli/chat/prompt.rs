use rustyline::{Config, Editor, Result};

pub fn generate_prompt(category: &str) -> String {
    format!("[{}] > ", category)
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}
