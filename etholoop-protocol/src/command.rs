//! Command decoding
//!
//! Decoding rules for one received line, after trimming ASCII whitespace:
//!
//! - empty: code 0, empty payload
//! - exactly one character: the character's code point, empty payload
//! - contains `:`: leading integer of the trimmed text before the first
//!   colon, trimmed text after it as payload
//! - otherwise: code 0, the whole line as payload

use heapless::String;

/// One decoded host command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command<const N: usize> {
    pub code: i32,
    pub payload: String<N>,
}

impl<const N: usize> Default for Command<N> {
    fn default() -> Self {
        Self::none()
    }
}

impl<const N: usize> Command<N> {
    /// Code 0 with an empty payload, the result of a poll with no input
    pub const fn none() -> Self {
        Self {
            code: 0,
            payload: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.code == 0 && self.payload.is_empty()
    }

    fn with(code: i32, payload: &str) -> Self {
        let mut command = Self::none();
        command.code = code;
        push_truncated(&mut command.payload, payload);
        command
    }
}

/// Decode a line into code and payload
pub fn decode_line<const N: usize>(line: &str) -> Command<N> {
    let line = line.trim_ascii();

    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Command::none(),
        (Some(single), None) => Command::with(single as i32, ""),
        _ => match line.split_once(':') {
            Some((code, payload)) => {
                Command::with(parse_leading_int(code.trim_ascii()), payload.trim_ascii())
            }
            None => Command::with(0, line),
        },
    }
}

/// Take a line verbatim: code 0, the trimmed line as payload
pub fn decode_raw<const N: usize>(line: &str) -> Command<N> {
    Command::with(0, line.trim_ascii())
}

/// Parse the integer at the start of `text`
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit, no digits at all gives 0. Out-of-range values saturate.
pub fn parse_leading_int(text: &str) -> i32 {
    let bytes = text.trim_ascii_start().as_bytes();
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let mut value: i32 = 0;
    for &byte in digits.iter().take_while(|byte| byte.is_ascii_digit()) {
        let digit = i32::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Push as much of `text` as fits, cutting at a char boundary
pub(crate) fn push_truncated<const N: usize>(target: &mut String<N>, text: &str) -> bool {
    let room = N - target.len();
    if text.len() <= room {
        let _ = target.push_str(text);
        return true;
    }
    let mut cut = room;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let _ = target.push_str(&text[..cut]);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Cmd = Command<64>;

    #[test]
    fn test_code_and_payload() {
        let cmd: Cmd = decode_line("5:trainingMode");
        assert_eq!(cmd.code, 5);
        assert_eq!(cmd.payload, "trainingMode");
    }

    #[test]
    fn test_single_character() {
        let cmd: Cmd = decode_line("A");
        assert_eq!(cmd.code, 65);
        assert_eq!(cmd.payload, "");

        let cmd: Cmd = decode_line("  a \r");
        assert_eq!(cmd.code, 97);
    }

    #[test]
    fn test_no_colon() {
        let cmd: Cmd = decode_line("no-colon-text");
        assert_eq!(cmd.code, 0);
        assert_eq!(cmd.payload, "no-colon-text");
    }

    #[test]
    fn test_empty() {
        assert!(decode_line::<64>("").is_none());
        assert!(decode_line::<64>(" \t\r").is_none());
    }

    #[test]
    fn test_whitespace_around_parts() {
        let cmd: Cmd = decode_line(" 12 :  2000 \r");
        assert_eq!(cmd.code, 12);
        assert_eq!(cmd.payload, "2000");
    }

    #[test]
    fn test_only_first_colon_splits() {
        let cmd: Cmd = decode_line("3:12:30:00");
        assert_eq!(cmd.code, 3);
        assert_eq!(cmd.payload, "12:30:00");
    }

    #[test]
    fn test_non_numeric_code() {
        let cmd: Cmd = decode_line("go:now");
        assert_eq!(cmd.code, 0);
        assert_eq!(cmd.payload, "now");

        let cmd: Cmd = decode_line(":3.14");
        assert_eq!(cmd.code, 0);
        assert_eq!(cmd.payload, "3.14");
    }

    #[test]
    fn test_raw_keeps_colons_and_single_chars() {
        let cmd: Cmd = decode_raw(" 5:trainingMode\n");
        assert_eq!(cmd.code, 0);
        assert_eq!(cmd.payload, "5:trainingMode");

        let cmd: Cmd = decode_raw("A");
        assert_eq!(cmd.code, 0);
        assert_eq!(cmd.payload, "A");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("42"), 42);
        assert_eq!(parse_leading_int("-17abc"), -17);
        assert_eq!(parse_leading_int("+8"), 8);
        assert_eq!(parse_leading_int("  9 "), 9);
        assert_eq!(parse_leading_int("x1"), 0);
        assert_eq!(parse_leading_int("-"), 0);
        assert_eq!(parse_leading_int("99999999999"), i32::MAX);
        assert_eq!(parse_leading_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn test_payload_truncated_at_char_boundary() {
        let cmd: Command<5> = decode_line("1:abcdé");
        assert_eq!(cmd.payload, "abcd");
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(line in ".{0,80}") {
            let cmd: Command<32> = decode_line(&line);
            prop_assert!(cmd.payload.len() <= 32);
        }

        #[test]
        fn prop_code_roundtrip(code in any::<i32>(), payload in "[a-zA-Z0-9]{1,20}") {
            let line = std::format!("{code}:{payload}");
            let cmd: Command<64> = decode_line(&line);
            prop_assert_eq!(cmd.code, code);
            prop_assert_eq!(cmd.payload.as_str(), payload.as_str());
        }
    }
}
