//! Field retyping recipes.
//!
//! A property's type expression is read up to the end of its statement and
//! split into top-level union members. Each recipe matches one member shape
//! and replaces only the `string` token, so whitespace, optional markers,
//! wrapper types and `| null` survive byte for byte. Once `string` is gone no
//! recipe matches again, which makes every recipe idempotent.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)[ \t]*\??[ \t]*:")
        .expect("invalid property regex")
});

const STRING: &str = "string";
const NULL: &str = "null";

/// Keywords that never name a filter or operations wrapper.
const PRIMITIVES: [&str; 10] = [
    "string",
    "number",
    "boolean",
    "bigint",
    "symbol",
    "object",
    "undefined",
    "unknown",
    "any",
    "never",
];

/// Member shapes a field type can be rewritten from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipe {
    /// `name: string`, `name?: string`
    Bare,
    /// `name: string | null`, `name?: string | null`
    Nullable,
    /// `name?: Wrapper<…> | string`, optionally followed by `| null`
    FilterUnion,
}

impl Recipe {
    pub const ALL: [Recipe; 3] = [Recipe::Bare, Recipe::Nullable, Recipe::FilterUnion];

    /// The member to replace, if `members` has this recipe's shape.
    fn target(self, members: &[&str]) -> Option<usize> {
        match (self, members) {
            (Recipe::Bare, [STRING]) => Some(0),
            (Recipe::Nullable, [STRING, NULL]) => Some(0),
            (Recipe::FilterUnion, _) => {
                let without_null = match members {
                    [rest @ .., NULL] => rest,
                    all => all,
                };
                let [wrappers @ .., STRING] = without_null else {
                    return None;
                };
                let valid = !wrappers.is_empty()
                    && wrappers
                        .iter()
                        .all(|wrapper| !wrapper.is_empty() && !PRIMITIVES.contains(wrapper));
                valid.then_some(wrappers.len())
            }
            _ => None,
        }
    }
}

/// Result of applying a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten<'a> {
    pub text: Cow<'a, str>,
    pub replaced: usize,
}

impl Rewritten<'_> {
    pub fn is_changed(&self) -> bool {
        self.replaced > 0
    }

    /// The new text if anything was replaced.
    pub fn into_changed(self) -> Option<String> {
        match self.text {
            Cow::Owned(text) if self.replaced > 0 => Some(text),
            _ => None,
        }
    }
}

/// Retypes every `string`-typed occurrence of one property to a nominal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRewrite<'a> {
    field: &'a str,
    nominal: &'a str,
}

impl<'a> FieldRewrite<'a> {
    pub fn new(field: &'a str, nominal: &'a str) -> Self {
        Self { field, nominal }
    }

    pub fn field(&self) -> &str {
        self.field
    }

    pub fn nominal(&self) -> &str {
        self.nominal
    }

    /// Apply all recipes.
    pub fn apply<'t>(&self, text: &'t str) -> Rewritten<'t> {
        self.apply_recipes(text, &Recipe::ALL)
    }

    /// Apply the given recipes only.
    pub fn apply_recipes<'t>(&self, text: &'t str, recipes: &[Recipe]) -> Rewritten<'t> {
        let mut replacements: Vec<Range<usize>> = Vec::new();
        for captures in PROPERTY.captures_iter(text) {
            let (Some(property), Some(name)) = (captures.get(0), captures.name("name")) else {
                continue;
            };
            if name.as_str() != self.field || !is_property_start(text, name.start()) {
                continue;
            }
            let members = union_members(text, property.end());
            let member_texts: Vec<&str> =
                members.iter().map(|range| &text[range.clone()]).collect();
            if let Some(index) = recipes
                .iter()
                .find_map(|recipe| recipe.target(&member_texts))
            {
                replacements.push(members[index].clone());
            }
        }

        // A wrapper may itself contain the property, so matches can come out of order.
        replacements.sort_by_key(|range| range.start);
        replacements.dedup();

        if replacements.is_empty() {
            return Rewritten {
                text: Cow::Borrowed(text),
                replaced: 0,
            };
        }

        let mut out = String::with_capacity(text.len() + replacements.len() * self.nominal.len());
        let mut last = 0;
        for range in &replacements {
            out.push_str(&text[last..range.start]);
            out.push_str(self.nominal);
            last = range.end;
        }
        out.push_str(&text[last..]);
        Rewritten {
            text: Cow::Owned(out),
            replaced: replacements.len(),
        }
    }
}

/// Whether a property name at `start` is not the tail of a longer path or literal.
fn is_property_start(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '\'' | '"')))
}

/// Top-level union members of the type expression starting at `from`, trimmed.
///
/// The expression ends at a newline, `;` or `,` at depth zero, or at a closer
/// that would leave the enclosing group.
fn union_members(text: &str, from: usize) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut members = Vec::new();
    let mut member_start = from;
    let mut depth = 0usize;
    let mut cursor = from;

    while cursor < bytes.len() {
        match bytes[cursor] {
            b'{' | b'(' | b'[' | b'<' => depth += 1,
            // `=>` is an arrow, not a closer.
            b'>' if cursor > 0 && bytes[cursor - 1] == b'=' => {}
            b'}' | b')' | b']' | b'>' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b'\n' | b';' | b',' if depth == 0 => break,
            b'|' if depth == 0 => {
                members.push(trimmed(text, member_start..cursor));
                member_start = cursor + 1;
            }
            _ => {}
        }
        cursor += 1;
    }
    members.push(trimmed(text, member_start..cursor));
    members
}

fn trimmed(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    start..end.max(start)
}
