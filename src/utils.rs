use std::fmt::Display;

use indicatif::{ProgressBar, ProgressStyle};
use inquire::{InquireError, Text};

use crate::error::{Error, Result};

// --- SHARED SPINNER ---
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

pub fn checkbox(active: bool) -> &'static str {
    if active { "- [x]" } else { "- [ ]" }
}

/// Shortens `s` to at most `max_len` characters, ending in `...` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Turns a typed answer into a zero-based index into a list of `len` items.
///
/// `q` cancels when `allow_quit` is set; anything that is not a number in
/// `1..=len` is rejected.
pub fn parse_selection(input: &str, len: usize, allow_quit: bool) -> Result<usize> {
    let input = input.trim();
    if allow_quit && input == "q" {
        return Err(Error::Cancelled);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(Error::InvalidSelection(input.to_string())),
    }
}

/// Asks for one line of input. Esc and Ctrl-C count as cancelling.
pub fn read_answer(message: &str) -> Result<String> {
    match Text::new(message).prompt() {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Err(Error::Cancelled)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prints `items` as a numbered menu and asks for a choice.
pub fn prompt_numbered<'a, T: Display>(items: &'a [T], noun: &'static str) -> Result<&'a T> {
    if items.is_empty() {
        return Err(Error::NothingToSelect(noun));
    }

    for (i, item) in items.iter().enumerate() {
        println!("{}. {}", i + 1, item);
    }
    println!();

    let answer = read_answer(&format!("Select {noun} (number, or 'q' to quit):"))?;
    let index = parse_selection(&answer, items.len(), true)?;
    Ok(&items[index])
}

/// Finds an item by its 1-based position first, then by `matches`.
pub fn resolve_identifier<'a, T>(
    items: &'a [T],
    identifier: &str,
    matches: impl Fn(&T) -> bool,
) -> Option<&'a T> {
    identifier
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=items.len()).contains(n))
        .map(|n| &items[n - 1])
        .or_else(|| items.iter().find(|item| matches(item)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("default", 15), "default");
        assert_eq!(truncate("exactly-fifteen", 15), "exactly-fifteen");
    }

    #[test]
    fn truncate_marks_cut_strings() {
        assert_eq!(truncate("a-very-long-namespace", 15), "a-very-long-...");
        assert_eq!(truncate("a-very-long-namespace", 15).chars().count(), 15);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("ñññññññ", 5), "ññ...");
    }

    #[test]
    fn selection_accepts_numbers_in_range() {
        assert_eq!(parse_selection("1", 3, true).unwrap(), 0);
        assert_eq!(parse_selection(" 3 \n", 3, false).unwrap(), 2);
    }

    #[test]
    fn selection_rejects_out_of_range_and_garbage() {
        for input in ["0", "4", "-1", "two", ""] {
            match parse_selection(input, 3, true) {
                Err(Error::InvalidSelection(got)) => assert_eq!(got, input.trim()),
                other => panic!("expected invalid selection for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn selection_quit_only_when_allowed() {
        assert!(matches!(parse_selection("q", 3, true), Err(Error::Cancelled)));
        assert!(matches!(
            parse_selection("q", 3, false),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn identifier_resolves_number_before_name() {
        let items = ["alpha", "2", "gamma"];
        assert_eq!(resolve_identifier(&items, "2", |s| *s == "2"), Some(&"2"));
        assert_eq!(resolve_identifier(&items, "1", |s| *s == "1"), Some(&"alpha"));
        assert_eq!(resolve_identifier(&items, "gamma", |s| *s == "gamma"), Some(&"gamma"));
    }

    #[test]
    fn identifier_out_of_range_falls_back_to_match() {
        let items = ["alpha", "beta"];
        assert_eq!(resolve_identifier(&items, "9", |s| *s == "9"), None);
        assert_eq!(resolve_identifier(&items, "delta", |s| *s == "delta"), None);
    }

    #[test]
    fn empty_menu_is_an_error() {
        let items: [&str; 0] = [];
        assert!(matches!(
            prompt_numbered(&items, "pod"),
            Err(Error::NothingToSelect("pod"))
        ));
    }

    #[test]
    fn checkbox_marks_active() {
        assert_eq!(checkbox(true), "- [x]");
        assert_eq!(checkbox(false), "- [ ]");
    }
}
