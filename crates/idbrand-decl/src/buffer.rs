//! The declaration buffer as an ordered sequence of parsed blocks.
//!
//! Each block owns its text, so growing one block or inserting new text never
//! moves another block's offsets. Blocks are addressed by [`BlockId`], which
//! stays valid across insertions.

use std::fmt::{self, Display};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::region::{find_opener, locate_from, statement_end};

static DECLARATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?(?:type|interface)[ \t]+(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .expect("invalid declaration header regex")
});

/// Stable handle to a block of a [`DeclarationBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

/// One `type` or `interface` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    text: String,
    /// Delimited body relative to `text`, delimiters included.
    body: Option<Range<usize>>,
}

impl Block {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full declaration text including leading indentation and the trailing newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn body(&self) -> Option<&str> {
        self.body.clone().map(|range| &self.text[range])
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Leading whitespace of the header line.
    pub fn indent(&self) -> &str {
        let trimmed = self.text.trim_start_matches([' ', '\t']);
        &self.text[..self.text.len() - trimmed.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Text(String),
    Block(BlockId),
}

/// Generated declarations split into named blocks and the opaque text between them.
///
/// Serializing an unmodified buffer reproduces the parsed text byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationBuffer {
    blocks: Vec<Block>,
    order: Vec<Slot>,
}

impl DeclarationBuffer {
    pub fn parse(text: &str) -> Self {
        let mut buffer = Self::default();
        let mut text_start = 0;
        let mut cursor = 0;

        while let Some(captures) = DECLARATION_HEADER.captures_at(text, cursor) {
            let (Some(header), Some(name)) = (captures.get(0), captures.name("name")) else {
                break;
            };
            let start = header.start();
            let Some((end, body)) = block_extent(text, start, header.end()) else {
                // Malformed body: leave the header in the surrounding text.
                cursor = header.end();
                continue;
            };
            if text_start < start {
                buffer.push_text(&text[text_start..start]);
            }
            buffer.push_block(Block {
                name: name.as_str().to_string(),
                text: text[start..end].to_string(),
                body: body.map(|range| range.start - start..range.end - start),
            });
            text_start = end;
            cursor = end;
        }

        if text_start < text.len() {
            buffer.push_text(&text[text_start..]);
        }
        buffer
    }

    fn push_text(&mut self, text: &str) {
        self.order.push(Slot::Text(text.to_string()));
    }

    fn push_block(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(block);
        self.order.push(Slot::Block(id));
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.order.iter().filter_map(|slot| match slot {
            Slot::Block(id) => Some((*id, &self.blocks[id.0])),
            Slot::Text(_) => None,
        })
    }

    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks().map(|(_, block)| block.name())
    }

    /// The first block named `name`.
    pub fn find(&self, name: &str) -> Option<BlockId> {
        self.blocks()
            .find(|(_, block)| block.name == name)
            .map(|(id, _)| id)
    }

    /// The first block named `name` that has a delimited body.
    pub fn find_with_body(&self, name: &str) -> Option<BlockId> {
        self.blocks()
            .find(|(_, block)| block.name == name && block.has_body())
            .map(|(id, _)| id)
    }

    pub fn contains_block(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Blocks whose name satisfies `predicate`, in document order.
    pub fn blocks_where(&self, mut predicate: impl FnMut(&str) -> bool) -> Vec<BlockId> {
        self.blocks()
            .filter(|(_, block)| predicate(&block.name))
            .map(|(id, _)| id)
            .collect()
    }

    /// Rewrite the body of a block in place.
    ///
    /// `rewrite` receives the body (delimiters included) and returns the
    /// replacement, if any. Returns whether the block changed. Blocks without a
    /// body are left alone.
    pub fn rewrite_body(
        &mut self,
        id: BlockId,
        rewrite: impl FnOnce(&str) -> Option<String>,
    ) -> bool {
        let block = &mut self.blocks[id.0];
        let Some(range) = block.body.clone() else {
            return false;
        };
        let Some(replacement) = rewrite(&block.text[range.clone()]) else {
            return false;
        };
        if replacement == block.text[range.clone()] {
            return false;
        }
        let new_end = range.start + replacement.len();
        block.text.replace_range(range.clone(), &replacement);
        block.body = Some(range.start..new_end);
        true
    }

    /// Insert `text` immediately before block `id`.
    ///
    /// Declarations in the inserted text become blocks of their own.
    pub fn insert_before(&mut self, id: BlockId, text: &str) {
        let position = self
            .order
            .iter()
            .position(|slot| *slot == Slot::Block(id))
            .unwrap_or(self.order.len());
        self.splice(position, text);
    }

    /// Insert `text` immediately after block `id`.
    pub fn insert_after(&mut self, id: BlockId, text: &str) {
        let position = self
            .order
            .iter()
            .position(|slot| *slot == Slot::Block(id))
            .map_or(self.order.len(), |position| position + 1);
        self.splice(position, text);
    }

    /// Insert `text` at the very start of the buffer.
    pub fn prepend(&mut self, text: &str) {
        self.splice(0, text);
    }

    fn splice(&mut self, position: usize, text: &str) {
        let inserted = Self::parse(text);
        let offset = self.blocks.len();
        self.blocks.extend(inserted.blocks);
        let slots = inserted.order.into_iter().map(|slot| match slot {
            Slot::Block(BlockId(index)) => Slot::Block(BlockId(index + offset)),
            text => text,
        });
        self.order.splice(position..position, slots);
    }

    pub fn into_text(self) -> String {
        self.to_string()
    }
}

impl Display for DeclarationBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.order {
            match slot {
                Slot::Text(text) => f.write_str(text)?,
                Slot::Block(id) => f.write_str(&self.blocks[id.0].text)?,
            }
        }
        Ok(())
    }
}

/// End of the declaration whose header spans `start..header_end`, and its body range.
///
/// `None` when the header opens a body that never balances.
fn block_extent(
    text: &str,
    start: usize,
    header_end: usize,
) -> Option<(usize, Option<Range<usize>>)> {
    if find_opener(text, header_end).is_none() {
        return Some((statement_end(text, header_end), None));
    }
    let region = locate_from(text, &DECLARATION_HEADER, start)?;
    Some((statement_end(text, region.end), Some(region.body())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"/**
 * Model User
 */
export type User = $Result.DefaultSelection<Prisma.$UserPayload>

export namespace Prisma {
  export type $UserPayload<ExtArgs extends $Extensions.InternalArgs = $Extensions.DefaultArgs> = {
    name: "User"
    scalars: $Extensions.GetPayloadResult<{
      id: string
      email: string
    }, ExtArgs["result"]["user"]>
    composites: {}
  }

  export type UserWhereUniqueInput = Prisma.AtLeast<{
    id?: string
    email?: string
  }, "id" | "email">
}
"#;

    #[test]
    fn test_parse_is_lossless() {
        let buffer = DeclarationBuffer::parse(SAMPLE);
        assert_eq!(buffer.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_finds_blocks_in_order() {
        let buffer = DeclarationBuffer::parse(SAMPLE);
        let names: Vec<_> = buffer.block_names().collect();
        assert_eq!(names, vec!["User", "$UserPayload", "UserWhereUniqueInput"]);
    }

    #[test]
    fn test_bodiless_and_bodied_blocks() {
        let buffer = DeclarationBuffer::parse(SAMPLE);
        let user = buffer.block(buffer.find("User").unwrap());
        assert!(!user.has_body());
        assert_eq!(
            user.text(),
            "export type User = $Result.DefaultSelection<Prisma.$UserPayload>\n"
        );

        let unique = buffer.block(buffer.find_with_body("UserWhereUniqueInput").unwrap());
        assert_eq!(unique.indent(), "  ");
        assert!(unique.text().ends_with("}, \"id\" | \"email\">\n"));
        assert_eq!(
            unique.body().unwrap(),
            "{\n    id?: string\n    email?: string\n  }"
        );
    }

    #[test]
    fn test_rewrite_body_grows_block_only() {
        let mut buffer = DeclarationBuffer::parse(SAMPLE);
        let unique = buffer.find("UserWhereUniqueInput").unwrap();
        let changed = buffer.rewrite_body(unique, |body| {
            Some(body.replace("id?: string", "id?: UserIdentifier"))
        });
        assert!(changed);
        let text = buffer.to_string();
        assert!(text.contains("    id?: UserIdentifier\n    email?: string\n  }, \"id\" | \"email\">"));
        // The payload is untouched.
        assert!(text.contains("      id: string\n"));
    }

    #[test]
    fn test_rewrite_body_without_change() {
        let mut buffer = DeclarationBuffer::parse(SAMPLE);
        let user = buffer.find("User").unwrap();
        assert!(!buffer.rewrite_body(user, |body| Some(body.to_string())));
        let payload = buffer.find("$UserPayload").unwrap();
        assert!(!buffer.rewrite_body(payload, |_| None));
        assert_eq!(buffer.to_string(), SAMPLE);
    }

    #[test]
    fn test_insert_before_keeps_ids_valid() {
        let mut buffer = DeclarationBuffer::parse(SAMPLE);
        let user = buffer.find("User").unwrap();
        let unique = buffer.find("UserWhereUniqueInput").unwrap();

        buffer.insert_before(user, "export type UserId = Flavor<string, '__UserId'>\n");
        assert!(buffer.contains_block("UserId"));
        assert_eq!(buffer.block(unique).name(), "UserWhereUniqueInput");
        assert!(buffer.to_string().contains(
            " */\nexport type UserId = Flavor<string, '__UserId'>\nexport type User = "
        ));
    }

    #[test]
    fn test_prepend_and_insert_after() {
        let mut buffer = DeclarationBuffer::parse("export type A = {}\n");
        let a = buffer.find("A").unwrap();
        buffer.insert_after(a, "export type B = string\n");
        buffer.prepend("// header\n");
        assert_eq!(
            buffer.to_string(),
            "// header\nexport type A = {}\nexport type B = string\n"
        );
        let names: Vec<_> = buffer.block_names().collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_malformed_header_stays_text() {
        let text = "export type Broken = {\n  id: string\nexport type Fine = {}\n";
        let buffer = DeclarationBuffer::parse(text);
        assert_eq!(buffer.to_string(), text);
        assert!(!buffer.contains_block("Broken"));
    }

    #[test]
    fn test_block_body_is_located_region() {
        let buffer = DeclarationBuffer::parse(SAMPLE);
        let header = Regex::new(r"export type \$UserPayload\b").unwrap();
        let region = crate::locate(SAMPLE, &header).unwrap();
        let payload = buffer.block(buffer.find("$UserPayload").unwrap());
        assert_eq!(payload.body(), Some(&SAMPLE[region.body()]));
    }

    #[test]
    fn test_blocks_where() {
        let buffer = DeclarationBuffer::parse(SAMPLE);
        let ids = buffer.blocks_where(|name| name.starts_with("User"));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_interfaces_are_blocks() {
        let text = "export interface Flavoring<FlavorT> {\n  _type?: FlavorT\n}\nexport type Flavor<T, FlavorT> = T & Flavoring<FlavorT>\n";
        let buffer = DeclarationBuffer::parse(text);
        let names: Vec<_> = buffer.block_names().collect();
        assert_eq!(names, vec!["Flavoring", "Flavor"]);
        assert_eq!(buffer.to_string(), text);
    }
}
