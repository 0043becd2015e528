//! Line and field helpers shared by the textual automaton formats.

use crate::bitset::StateId;
use crate::error::{AutomatonError, Result};

/// Numbered content lines of `input`: blank lines and lines starting with `#` are skipped.
/// Line numbers are 1-based positions in the original input.
pub fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.trim_start().is_empty() && !line.starts_with('#'))
}

/// Parses a non-negative state id.
pub fn parse_id(field: &str, line: usize) -> Result<StateId> {
    let field = field.trim();
    field
        .parse()
        .map_err(|_| AutomatonError::malformed(format!("line {line}: `{field}` is not a state id")))
}

/// Strips `<key>:` from a header line, returning the trimmed rest.
pub fn header<'a>(text: &'a str, key: &str, line: usize) -> Result<&'a str> {
    text.strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
        .ok_or_else(|| AutomatonError::malformed(format!("line {line}: expected `{key}: ...`")))
}

/// Fails with [`AutomatonError::OutOfRangeState`] unless `state < count`.
pub fn check_range(state: StateId, count: usize) -> Result<StateId> {
    if state < count {
        Ok(state)
    } else {
        Err(AutomatonError::OutOfRangeState { state, count })
    }
}

/// Pulls the next content line or reports which header was missing.
pub fn expect_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    what: &str,
) -> Result<(usize, &'a str)> {
    lines
        .next()
        .ok_or_else(|| AutomatonError::malformed(format!("missing {what} line")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_content_lines() {
        let input = "# comment\nstart: 0\n\n  \nend: 1\r\n#another\n3 4 #\n";
        let lines: Vec<_> = content_lines(input).collect();
        assert_eq!(lines, vec![(2, "start: 0"), (5, "end: 1"), (7, "3 4 #")]);
    }

    #[test]
    fn test_header() {
        assert_eq!(header("start: 12", "start", 1), Ok("12"));
        assert_eq!(header("start:12", "start", 1), Ok("12"));
        assert!(header("begin: 12", "start", 1).is_err());
        assert!(header("start 12", "start", 1).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 7 ", 1), Ok(7));
        assert!(matches!(
            parse_id("-1", 3),
            Err(AutomatonError::MalformedSerialization(message)) if message.starts_with("line 3")
        ));
        assert_eq!(
            check_range(4, 4),
            Err(AutomatonError::OutOfRangeState { state: 4, count: 4 })
        );
    }
}
