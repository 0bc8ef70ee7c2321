#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    Skip,
    /// Step id or 1-based position.
    Jump(String),
    Complete,
    Set { field: String, value: String },
    Resend,
    Help,
    Quit,
    /// Free text, such as an email address or a code.
    Input(String),
}

pub const HELP: &[(&str, &str)] = &[
    ("next, n, <enter>", "validate this step and continue"),
    ("back, b", "return to the previous step"),
    ("skip, s", "skip an optional step"),
    ("go <step>", "jump to a step by id or number"),
    ("complete, c", "finish on the last step"),
    ("set <field> <value>", "fill a form field, e.g. set first John"),
    ("resend", "send a new verification code"),
    ("help, ?", "show this help"),
    ("quit, q", "leave"),
];

/// Maps one input line to a command. Unrecognised lines are passed through as input.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("" | "n" | "next", "") => Command::Next,
        ("b" | "back" | "p" | "prev", "") => Command::Back,
        ("s" | "skip", "") => Command::Skip,
        ("c" | "complete" | "done", "") => Command::Complete,
        ("g" | "go" | "goto", target) if !target.is_empty() => Command::Jump(target.to_string()),
        ("set", rest) if !rest.is_empty() => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        ("r" | "resend", "") => Command::Resend,
        ("h" | "help" | "?", "") => Command::Help,
        ("q" | "quit" | "exit", "") => Command::Quit,
        _ => Command::Input(line.to_string()),
    }
}
