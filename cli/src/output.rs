//! Terminal messages. Status lines go to stderr so stdout stays clean for
//! `--json` output and the report body.

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Warn,
    Done
}

impl Tone {
    fn label(self) -> ColoredString {
        match self {
            Tone::Info => "info:".blue().bold(),
            Tone::Warn => "warning:".yellow().bold(),
            Tone::Done => "✓".green().bold()
        }
    }
}

fn status_line(tone: Tone, msg: &str) -> String {
    format!("{} {}", tone.label(), msg)
}

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn hint(msg: &str) {
    println!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn info(msg: &str) {
    eprintln!("{}", status_line(Tone::Info, msg));
}

pub fn warn(msg: &str) {
    eprintln!("{}", status_line(Tone::Warn, msg));
}

pub fn success(msg: &str) {
    eprintln!("{}", status_line(Tone::Done, msg));
}

/// `None` when every fetched ticket made it into the report.
pub fn dropped_tickets(processed: usize, fetched: usize) -> Option<String> {
    let dropped = fetched.checked_sub(processed).filter(|&n| n > 0)?;
    Some(format!(
        "{dropped} of {fetched} tickets could not be read and were left out"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_plain() {
        colored::control::set_override(false);
        assert_eq!(status_line(Tone::Warn, "slow"), "warning: slow");
        assert_eq!(status_line(Tone::Done, "saved"), "✓ saved");
    }

    #[test]
    fn test_dropped_tickets_message() {
        assert_eq!(dropped_tickets(5, 5), None);
        assert_eq!(dropped_tickets(0, 0), None);
        assert_eq!(
            dropped_tickets(2, 3).as_deref(),
            Some("1 of 3 tickets could not be read and were left out")
        );
        assert_eq!(
            dropped_tickets(0, 4).as_deref(),
            Some("4 of 4 tickets could not be read and were left out")
        );
    }
}
