//! Boundary location by balanced delimiter scanning.

use std::ops::Range;

use regex::Regex;

/// A located declaration: `[start, end)` in the scanned text.
///
/// `start` is where the header match begins, `body_start` is the offset of
/// the opening delimiter and `end` is one past its matching closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub body_start: usize,
    pub end: usize,
}

impl Region {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The delimited body, delimiters included.
    pub fn body(&self) -> Range<usize> {
        self.body_start..self.end
    }

    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span()]
    }
}

/// Find the first declaration matching `header` and its balanced body.
///
/// Returns `None` if the header does not match, if no opening delimiter
/// follows it on the same statement, or if the delimiters never balance.
pub fn locate(text: &str, header: &Regex) -> Option<Region> {
    locate_from(text, header, 0)
}

/// Like [`locate`], searching from byte offset `from`.
pub fn locate_from(text: &str, header: &Regex, from: usize) -> Option<Region> {
    let found = header.find_at(text, from)?;
    let body_start = find_opener(text, found.start())?;
    let end = balanced_end(text, body_start)?;
    Some(Region {
        start: found.start(),
        body_start,
        end,
    })
}

fn closer_for(byte: u8) -> Option<u8> {
    match byte {
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        _ => None,
    }
}

fn is_closer(byte: u8) -> bool {
    matches!(byte, b'}' | b')' | b']')
}

/// Offset of the first opening delimiter at or after `from` on the current statement.
///
/// The search stops at a newline, a `;`, or a closing delimiter.
pub fn find_opener(text: &str, from: usize) -> Option<usize> {
    for (offset, &byte) in text.as_bytes()[from..].iter().enumerate() {
        if closer_for(byte).is_some() {
            return Some(from + offset);
        }
        if byte == b'\n' || byte == b';' || is_closer(byte) {
            return None;
        }
    }
    None
}

/// One past the delimiter closing the opener at `open`.
///
/// Returns `None` if `open` is not an opening delimiter, if a closer of the
/// wrong kind appears, or if the text ends before depth returns to zero.
pub fn balanced_end(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut expected = vec![closer_for(*bytes.get(open)?)?];
    // Delimiters are ASCII, so byte scanning never splits a UTF-8 sequence.
    for (offset, &byte) in bytes[open + 1..].iter().enumerate() {
        if let Some(closer) = closer_for(byte) {
            expected.push(closer);
        } else if is_closer(byte) {
            if expected.pop() != Some(byte) {
                return None;
            }
            if expected.is_empty() {
                return Some(open + 1 + offset + 1);
            }
        }
    }
    None
}

/// End of the statement continuing at `from`: one past the next newline at depth zero.
///
/// Delimited groups met on the way are skipped as a whole. An unbalanced
/// group or a stray closer ends the statement just before it.
pub fn statement_end(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut cursor = from;
    while cursor < bytes.len() {
        let byte = bytes[cursor];
        if byte == b'\n' {
            return cursor + 1;
        }
        if closer_for(byte).is_some() {
            match balanced_end(text, cursor) {
                Some(end) => {
                    cursor = end;
                    continue;
                }
                None => return cursor,
            }
        }
        if is_closer(byte) {
            return cursor;
        }
        cursor += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_locate_simple_block() {
        let text = "export type A = {\n  id: string\n}\nexport type B = {}\n";
        let region = locate(text, &header(r"export type A\b")).unwrap();
        assert_eq!(region.as_str(text), "export type A = {\n  id: string\n}");
        assert_eq!(&text[region.body()], "{\n  id: string\n}");
    }

    #[test]
    fn test_locate_nested_block() {
        let text = "type $UserPayload<E = D> = {\n  scalars: R<{\n    id: string\n  }, E[\"r\"]>\n  composites: {}\n}\ntype After = {}";
        let region = locate(text, &header(r"type \$UserPayload\b")).unwrap();
        assert!(region.as_str(text).ends_with("composites: {}\n}"));
        assert!(!region.as_str(text).contains("After"));
    }

    #[test]
    fn test_locate_is_first_match() {
        let text = "type A = { a: 1 }\ntype A = { b: 2 }\n";
        let region = locate(text, &header(r"type A\b")).unwrap();
        assert_eq!(region.as_str(text), "type A = { a: 1 }");
        let second = locate_from(text, &header(r"type A\b"), region.end).unwrap();
        assert_eq!(second.as_str(text), "type A = { b: 2 }");
    }

    #[test]
    fn test_locate_not_found() {
        let text = "export type A = {}\n";
        assert!(locate(text, &header(r"export type Missing\b")).is_none());
    }

    #[test]
    fn test_locate_without_body_on_statement() {
        // The opener on the next line belongs to another declaration.
        let text = "export type User = Payload<X>\nexport type Other = {\n}\n";
        assert!(locate(text, &header(r"export type User\b")).is_none());
    }

    #[test]
    fn test_unbalanced_is_not_found() {
        let text = "export type Broken = {\n  id: string\n";
        assert!(locate(text, &header(r"export type Broken\b")).is_none());
    }

    #[test]
    fn test_mismatched_closer_is_not_found() {
        let text = "export type Broken = {\n  id: (string}\n)\n";
        assert!(locate(text, &header(r"export type Broken\b")).is_none());
    }

    #[test]
    fn test_statement_end_includes_generic_tail() {
        let text = "type U = AtLeast<{\n  id?: string\n}, \"id\">\nnext";
        let region = locate(text, &header(r"type U\b")).unwrap();
        let end = statement_end(text, region.end);
        assert_eq!(&text[region.start..end], "type U = AtLeast<{\n  id?: string\n}, \"id\">\n");
    }

    #[test]
    fn test_statement_end_stops_at_stray_closer() {
        let text = "  type Inner = X\n}";
        assert_eq!(statement_end(text, 0), 17);
        assert_eq!(statement_end("type T = X }", 0), 11);
    }
}
