use crate::jobs::ParsedCommand;

/// Split an input line into a launchable command.
///
/// Returns `None` for lines the shell ignores: blank lines and `#` comments.
/// A final standalone `&` token marks a background launch and is removed from
/// both the word list and the echoed command text. There is no quoting or
/// escaping; words are whitespace-separated.
pub fn parse_line(line: &str) -> Option<ParsedCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut words: Vec<&str> = trimmed.split_whitespace().collect();
    let background = match words.last() {
        Some(&"&") => {
            words.pop();
            true
        }
        _ => false,
    };
    // the line was nothing but "&"
    if words.is_empty() {
        return None;
    }

    let text = words.join(" ");
    let program = words[0].to_string();
    let args = words[1..].iter().map(|word| word.to_string()).collect();
    Some(ParsedCommand {
        program,
        args,
        background,
        text,
    })
}
