//! Character classification used by the scanner.

use unicode_xid::UnicodeXID;

/// Zero width non-joiner, allowed inside identifiers.
pub const ZWNJ: char = '\u{200C}';
/// Zero width joiner, allowed inside identifiers.
pub const ZWJ: char = '\u{200D}';

/// Returns true if `ch` can start an identifier.
pub fn is_id_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && UnicodeXID::is_xid_start(ch))
}

/// Returns true if `ch` can continue an identifier.
pub fn is_id_continue(ch: char) -> bool {
    ch == '$'
        || ch == '_'
        || ch.is_ascii_alphanumeric()
        || ch == ZWNJ
        || ch == ZWJ
        || (!ch.is_ascii() && UnicodeXID::is_xid_continue(ch))
}

/// Returns true for `\n`, `\r`, U+2028 and U+2029.
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Returns true for ECMAScript white space (not including line terminators).
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\u{000B}'
            | '\u{000C}'
            | ' '
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Decodes a hexadecimal digit.
pub fn hex_value(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

/// Returns true if `ch` is a digit in `radix`.
pub fn is_digit_in(ch: char, radix: u32) -> bool {
    ch.is_ascii() && ch.to_digit(radix).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classes() {
        assert!(is_id_start('a'));
        assert!(is_id_start('$'));
        assert!(is_id_start('_'));
        assert!(is_id_start('\u{e9}'));
        assert!(!is_id_start('1'));
        assert!(is_id_continue('1'));
        assert!(is_id_continue(ZWJ));
        assert!(!is_id_continue('-'));
    }

    #[test]
    fn test_whitespace_and_terminators() {
        assert!(is_whitespace('\u{3000}'));
        assert!(is_whitespace('\u{FEFF}'));
        assert!(!is_whitespace('\n'));
        assert!(is_line_terminator('\u{2029}'));
        assert!(!is_line_terminator(' '));
    }

    #[test]
    fn test_digits() {
        assert_eq!(hex_value('f'), Some(15));
        assert_eq!(hex_value('g'), None);
        assert!(is_digit_in('7', 8));
        assert!(!is_digit_in('8', 8));
        assert!(!is_digit_in('2', 2));
    }
}
