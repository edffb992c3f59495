/// One-letter commands accepted at the review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mark reviewed and go to the next transaction.
    Next,
    Skip,
    Previous,
    Merchant,
    Notes,
    Category,
    BulkEdit,
    Tags,
    Date,
    Reload,
    Link,
    Find,
    Quit,
    Help,
    /// Anything else; carries the raw input for the error message.
    Unknown(String),
}

const HELP: &[(&str, &str)] = &[
    ("n", "Mark the current transaction as reviewed and go to the next transaction"),
    ("s", "Skip to the next transaction"),
    ("p", "Go to the previous transaction"),
    ("m", "Set the merchant for this transaction"),
    ("o", "Set the notes for this transaction"),
    ("c", "Set the category for this transaction"),
    ("b", "Bulk set transaction categories"),
    ("t", "Set the tags for this transaction"),
    ("d", "Set the date (when) for this transaction"),
    ("r", "Force reload this transaction"),
    ("l", "Open a link for this transaction"),
    ("f", "Find transactions for a given description"),
    ("q", "Quit"),
];

impl Command {
    pub fn parse(input: &str) -> Command {
        match input.trim() {
            "n" => Command::Next,
            "s" => Command::Skip,
            "p" => Command::Previous,
            "m" => Command::Merchant,
            "o" => Command::Notes,
            "c" => Command::Category,
            "b" => Command::BulkEdit,
            "t" => Command::Tags,
            "d" => Command::Date,
            "r" => Command::Reload,
            "l" => Command::Link,
            "f" => Command::Find,
            "q" => Command::Quit,
            "h" | "?" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }

    pub fn help_lines() -> Vec<String> {
        std::iter::once("Available Commands:".to_string())
            .chain(HELP.iter().map(|(key, text)| format!("  {key}\t{text}")))
            .collect()
    }
}
