//! PS/2 set-2 scan codes for `ps2 type-string`
//!
//! The PS/2 firmware takes keys as hex make codes; it has no notion of
//! characters. Shifted characters are bracketed by the two left-shift
//! frames the firmware expects, so one frame sequence reproduces one
//! character on the target.

use km_protocol::Operation;
use tracing::warn;

/// Sent before a shifted key (left shift, code 12)
pub const SHIFT_PREFIX: &str = "12,0";
/// Sent after a shifted key
pub const SHIFT_SUFFIX: &str = "12,1";
/// Enter key
pub const ENTER: &str = "5A";

/// Characters that need shift on a US layout, besides capitals
const SHIFTED_SYMBOLS: &str = "~!@#$%^&*()_+{}|:\"<>?";

/// Make code for the key that produces `c`, ignoring shift
pub fn make_code(c: char) -> Option<&'static str> {
    let code = match c.to_ascii_lowercase() {
        'a' => "1C",
        'b' => "32",
        'c' => "21",
        'd' => "23",
        'e' => "24",
        'f' => "2B",
        'g' => "34",
        'h' => "33",
        'i' => "43",
        'j' => "3B",
        'k' => "42",
        'l' => "4B",
        'm' => "3A",
        'n' => "31",
        'o' => "44",
        'p' => "4D",
        'q' => "15",
        'r' => "2D",
        's' => "1B",
        't' => "2C",
        'u' => "3C",
        'v' => "2A",
        'w' => "1D",
        'x' => "22",
        'y' => "35",
        'z' => "1A",
        '0' | ')' => "45",
        '1' | '!' => "16",
        '2' | '@' => "1E",
        '3' | '#' => "26",
        '4' | '$' => "25",
        '5' | '%' => "2E",
        '6' | '^' => "36",
        '7' | '&' => "3D",
        '8' | '*' => "3E",
        '9' | '(' => "46",
        '`' | '~' => "0E",
        '-' | '_' => "4E",
        '=' | '+' => "55",
        '[' | '{' => "54",
        ']' | '}' => "5B",
        '\\' | '|' => "5D",
        ';' | ':' => "4C",
        '\'' | '"' => "52",
        ',' | '<' => "41",
        '.' | '>' => "49",
        '/' | '?' => "4A",
        ' ' => "29",
        _ => return None,
    };
    Some(code)
}

/// Returns whether `c` is typed with shift held
pub fn needs_shift(c: char) -> bool {
    c.is_ascii_uppercase() || SHIFTED_SYMBOLS.contains(c)
}

/// Keyboard frames that type `text`
///
/// Unmapped characters are skipped with a warning.
pub fn keystrokes(text: &str, enter: bool) -> Vec<Operation> {
    let mut operations = Vec::with_capacity(text.len() + 1);

    for c in text.chars() {
        let Some(code) = make_code(c) else {
            warn!("No scan code for {:?}, skipping", c);
            continue;
        };

        let shifted = needs_shift(c);
        if shifted {
            operations.push(Operation::Text(SHIFT_PREFIX.to_string()));
        }
        operations.push(Operation::Text(code.to_string()));
        if shifted {
            operations.push(Operation::Text(SHIFT_SUFFIX.to_string()));
        }
    }

    if enter {
        operations.push(Operation::Text(ENTER.to_string()));
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(ops: &[Operation]) -> Vec<&str> {
        ops.iter()
            .map(|op| match op {
                Operation::Text(code) => code.as_str(),
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_lowercase_and_space() {
        assert_eq!(codes(&keystrokes("a b", false)), ["1C", "29", "32"]);
    }

    #[test]
    fn test_shift_wrapping() {
        assert_eq!(
            codes(&keystrokes("Hi!", false)),
            ["12,0", "33", "12,1", "43", "12,0", "16", "12,1"]
        );
        assert_eq!(
            codes(&keystrokes("A", false)),
            [SHIFT_PREFIX, "1C", SHIFT_SUFFIX]
        );
    }

    #[test]
    fn test_symbol_pairs_share_keys() {
        assert_eq!(make_code(':'), make_code(';'));
        assert_eq!(make_code('_'), make_code('-'));
        assert!(needs_shift('_'));
        assert!(!needs_shift('-'));
    }

    #[test]
    fn test_unmapped_skipped_and_enter() {
        assert_eq!(codes(&keystrokes("é1\t", true)), ["16", "5A"]);
        assert!(keystrokes("", false).is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn printable_ascii_always_maps(c in proptest::char::range(' ', '~')) {
                let ops = keystrokes(&c.to_string(), false);
                let expected = if needs_shift(c) { 3 } else { 1 };
                prop_assert_eq!(ops.len(), expected);
            }

            #[test]
            fn shift_frames_balance(text in "[ -~]{0,40}") {
                let ops = keystrokes(&text, false);
                let prefixes = ops.iter().filter(|op| **op == Operation::Text(SHIFT_PREFIX.into())).count();
                let suffixes = ops.iter().filter(|op| **op == Operation::Text(SHIFT_SUFFIX.into())).count();
                prop_assert_eq!(prefixes, suffixes);
            }
        }
    }
}
