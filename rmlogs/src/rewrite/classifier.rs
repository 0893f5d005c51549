//! Enclosing error-handler detection.
//!
//! [`BlockCursor`] walks the code bytes of a source once, front to back,
//! keeping a stack of the brackets that are still open. Handler blocks are
//! recognised when their `{` is pushed, so classifying an offset only looks
//! at the stack.

use super::locator::is_ident_byte;
use super::scanner::{Region, RegionMap};

/// The nearest enclosing block introduced by the error-handling keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingBlock {
    /// Offset of the block's opening `{`.
    pub open_brace: usize,
    /// First identifier of the handler's parameter list, if any.
    pub parameter: Option<String>,
}

/// Where an occurrence sits relative to error handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Inside an error-handling block.
    InsideHandler(EnclosingBlock),
    /// Anywhere else.
    Elsewhere,
}

/// Classifies the code at `offset` by looking at its enclosing blocks.
///
/// The innermost block whose header matches `keyword` wins. Blocks with
/// other headers are passed through, so a callback inside a handler still
/// counts. To classify many offsets of one source, advance a single
/// [`BlockCursor`] instead.
#[must_use]
pub fn classify(source: &str, regions: &RegionMap, offset: usize, keyword: &str) -> Placement {
    let mut cursor = BlockCursor::new(source, regions, keyword);
    cursor.advance_to(offset);
    cursor.placement()
}

/// A bracket that is open at the cursor position.
#[derive(Debug, Clone)]
struct Opener {
    byte: u8,
    offset: usize,
    /// Last code byte before the bracket.
    before: Option<usize>,
    /// Handler parameter, for `{` that opens a handler block.
    handler: Option<Option<String>>,
}

/// The most recently closed `( ... )`.
#[derive(Debug, Clone, Copy)]
struct Group {
    open: usize,
    close: usize,
    before: Option<usize>,
}

/// Forward cursor over the code bytes of a source.
///
/// Offsets passed to [`BlockCursor::advance_to`] must not decrease.
#[derive(Debug)]
pub struct BlockCursor<'a> {
    source: &'a str,
    regions: &'a RegionMap,
    keyword: &'a str,
    pos: usize,
    next_region: usize,
    last_code: Option<usize>,
    line_start: usize,
    open: Vec<Opener>,
    last_group: Option<Group>,
}

impl<'a> BlockCursor<'a> {
    /// Creates a cursor at the start of `source`. An empty `keyword` never
    /// matches a handler.
    #[must_use]
    pub fn new(source: &'a str, regions: &'a RegionMap, keyword: &'a str) -> Self {
        Self {
            source,
            regions,
            keyword,
            pos: 0,
            next_region: 0,
            last_code: None,
            line_start: 0,
            open: Vec::new(),
            last_group: None,
        }
    }

    /// Consumes every byte before `target`.
    pub fn advance_to(&mut self, target: usize) {
        let bytes = self.source.as_bytes();
        let target = target.min(bytes.len());
        let regions: &[Region] = self.regions.regions();

        while self.pos < target {
            let pending = regions.get(self.next_region);
            if let Some(region) = pending.filter(|r| r.range.start <= self.pos) {
                let end = region.range.end.min(bytes.len());
                if let Some(nl) = bytes[self.pos..end].iter().rposition(|&b| b == b'\n') {
                    self.line_start = self.pos + nl + 1;
                }
                self.pos = end.max(self.pos + 1);
                self.next_region += 1;
                continue;
            }

            let i = self.pos;
            self.pos += 1;
            match bytes[i] {
                b'\n' => {
                    self.line_start = i + 1;
                    continue;
                }
                b if b.is_ascii_whitespace() => continue,
                b'{' => {
                    let handler = self.handler_header();
                    self.push(b'{', i, handler);
                }
                b @ (b'(' | b'[') => self.push(b, i, None),
                b'}' => self.close(b'{', i),
                b')' => self.close(b'(', i),
                b']' => self.close(b'[', i),
                _ => {}
            }
            self.last_code = Some(i);
        }
    }

    /// Last non-whitespace code byte before the cursor.
    #[must_use]
    pub fn last_code(&self) -> Option<usize> {
        self.last_code
    }

    /// Start of the line the cursor is on.
    #[must_use]
    pub fn line_start(&self) -> usize {
        self.line_start
    }

    /// Whether the innermost open bracket is `(` or `[`.
    #[must_use]
    pub fn inside_open_group(&self) -> bool {
        self.open.last().is_some_and(|o| o.byte != b'{')
    }

    /// Classification of the cursor position.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.open
            .iter()
            .rev()
            .find_map(|o| {
                o.handler.as_ref().map(|parameter| EnclosingBlock {
                    open_brace: o.offset,
                    parameter: parameter.clone(),
                })
            })
            .map_or(Placement::Elsewhere, Placement::InsideHandler)
    }

    fn push(&mut self, byte: u8, offset: usize, handler: Option<Option<String>>) {
        self.open.push(Opener {
            byte,
            offset,
            before: self.last_code,
            handler,
        });
    }

    /// Pops up to the nearest opener of kind `want`; a stray closer is ignored.
    fn close(&mut self, want: u8, offset: usize) {
        let Some(idx) = self.open.iter().rposition(|o| o.byte == want) else {
            return;
        };
        self.open.truncate(idx + 1);
        if let Some(opener) = self.open.pop() {
            if want == b'(' {
                self.last_group = Some(Group {
                    open: opener.offset,
                    close: offset,
                    before: opener.before,
                });
            }
        }
    }

    /// Checks the header in front of a `{` about to be pushed.
    ///
    /// Accepts `keyword (params) {` and the binding-less `keyword {`.
    /// Returns the captured parameter on a match.
    fn handler_header(&self) -> Option<Option<String>> {
        if self.keyword.is_empty() {
            return None;
        }
        let bytes = self.source.as_bytes();
        let before_brace = self.last_code?;

        let (keyword_end, parameter) = if bytes[before_brace] == b')' {
            let group = self.last_group.filter(|g| g.close == before_brace)?;
            (
                group.before? + 1,
                first_identifier(self.source, self.regions, group.open + 1, before_brace),
            )
        } else {
            (before_brace + 1, None)
        };

        let keyword_start = keyword_end.checked_sub(self.keyword.len())?;
        if &bytes[keyword_start..keyword_end] != self.keyword.as_bytes() {
            return None;
        }
        if keyword_start > 0 && is_ident_byte(bytes[keyword_start - 1]) {
            return None;
        }
        Some(parameter)
    }
}

/// First identifier in `source[from..to]`, skipping whitespace and comments.
fn first_identifier(source: &str, regions: &RegionMap, from: usize, to: usize) -> Option<String> {
    let bytes = source.as_bytes();
    let start = (from..to).find(|&i| regions.is_code(i) && !bytes[i].is_ascii_whitespace())?;
    let len = bytes[start..to]
        .iter()
        .take_while(|&&b| is_ident_byte(b))
        .count();
    if len == 0 || bytes[start].is_ascii_digit() {
        return None;
    }
    Some(source[start..start + len].to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(source: &str) -> Placement {
        let regions = RegionMap::scan(source);
        let offset = source.find("HERE").unwrap();
        classify(source, &regions, offset, "catch")
    }

    fn parameter(source: &str) -> Option<String> {
        match placement(source) {
            Placement::InsideHandler(block) => block.parameter,
            Placement::Elsewhere => panic!("expected handler for {source}"),
        }
    }

    #[test]
    fn test_direct_catch_block() {
        let source = "try { f(); } catch (err) { HERE }";
        assert_eq!(parameter(source), Some("err".to_owned()));
    }

    #[test]
    fn test_outside_any_block() {
        assert_eq!(placement("HERE; try { } catch (e) { }"), Placement::Elsewhere);
    }

    #[test]
    fn test_after_closed_catch_block() {
        let source = "try { } catch (e) { log(e); }\nfunction f() { HERE }";
        assert_eq!(placement(source), Placement::Elsewhere);
    }

    #[test]
    fn test_try_block_is_not_a_handler() {
        assert_eq!(placement("try { HERE } catch (e) { }"), Placement::Elsewhere);
    }

    #[test]
    fn test_nested_blocks_inside_handler_count() {
        let source = "try {} catch (e) {\n  if (x) {\n    items.forEach((i) => { HERE });\n  }\n}";
        assert_eq!(parameter(source), Some("e".to_owned()));
    }

    #[test]
    fn test_sibling_block_before_occurrence() {
        let source = "try {} catch (e) {\n  if (x) { a(); }\n  HERE\n}";
        assert_eq!(parameter(source), Some("e".to_owned()));
    }

    #[test]
    fn test_braces_in_literals_and_comments_are_ignored() {
        let source = "try {} catch (e) { s = '}'; /* } */ t = `}`; HERE }";
        assert_eq!(parameter(source), Some("e".to_owned()));
    }

    #[test]
    fn test_destructured_and_optional_bindings() {
        assert_eq!(parameter("try {} catch ({ message }) { HERE }"), None);
        assert_eq!(parameter("try {} catch { HERE }"), None);
        assert_eq!(
            parameter("try {} catch (/* why */ error) { HERE }"),
            Some("error".to_owned())
        );
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        assert_eq!(placement("function mycatch(e) { HERE }"), Placement::Elsewhere);
        assert_eq!(placement("function f(catcher) { HERE }"), Placement::Elsewhere);
    }

    #[test]
    fn test_promise_catch_is_not_a_block_header() {
        assert_eq!(
            placement("p.catch((e) => { HERE });"),
            Placement::Elsewhere
        );
    }

    #[test]
    fn test_custom_keyword() {
        let source = "rescue (e) { HERE }";
        let regions = RegionMap::scan(source);
        let offset = source.find("HERE").unwrap();
        assert!(matches!(
            classify(source, &regions, offset, "rescue"),
            Placement::InsideHandler(_)
        ));
    }

    #[test]
    fn test_unbalanced_closing_brace_falls_back_to_elsewhere() {
        assert_eq!(placement("catch (e) { } } HERE"), Placement::Elsewhere);
    }

    #[test]
    fn test_cursor_classifies_many_offsets_in_one_pass() {
        let source = "a();\ntry { b(); } catch (e) {\n  HERE1;\n}\nHERE2;\n";
        let regions = RegionMap::scan(source);
        let mut cursor = BlockCursor::new(source, &regions, "catch");

        cursor.advance_to(source.find("HERE1").unwrap());
        assert!(matches!(cursor.placement(), Placement::InsideHandler(_)));
        assert_eq!(cursor.line_start(), source.find("  HERE1").unwrap());
        assert!(!cursor.inside_open_group());

        cursor.advance_to(source.find("HERE2").unwrap());
        assert_eq!(cursor.placement(), Placement::Elsewhere);
        assert_eq!(source.as_bytes()[cursor.last_code().unwrap()], b'}');
    }

    #[test]
    fn test_cursor_tracks_lines_through_comments() {
        let source = "/* one\n two */ HERE";
        let regions = RegionMap::scan(source);
        let mut cursor = BlockCursor::new(source, &regions, "catch");
        cursor.advance_to(source.find("HERE").unwrap());
        assert_eq!(cursor.line_start(), source.find(" two").unwrap());
        assert_eq!(cursor.last_code(), None);
    }
}
