//! Single-file components.
//!
//! In a `.vue` file only the bodies of `<script>` elements are code; the
//! template and style sections are copied untouched.

use super::{transform, RewriteRules, TransformResult};
use crate::utils::LineIndex;
use std::ops::Range;

const OPEN_TAG: &[u8] = b"<script";
const CLOSE_TAG: &[u8] = b"</script";

/// Byte ranges of the `<script>` element bodies in `source`.
///
/// An element without a closing tag is ignored.
#[must_use]
pub fn script_blocks(source: &str) -> Vec<Range<usize>> {
    let bytes = source.as_bytes();
    let mut blocks = Vec::new();
    let mut from = 0;

    while let Some(open) = find_tag(bytes, from, OPEN_TAG) {
        let Some(gt) = bytes[open..].iter().position(|&b| b == b'>') else {
            break;
        };
        let body_start = open + gt + 1;
        let Some(close) = find_tag(bytes, body_start, CLOSE_TAG) else {
            break;
        };
        blocks.push(body_start..close);
        from = close + CLOSE_TAG.len();
    }
    blocks
}

/// Next case-insensitive `tag` at or after `from` that is followed by
/// whitespace or `>`, so `<scripts>` does not match.
fn find_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + tag.len() <= bytes.len() {
        if bytes[i..i + tag.len()].eq_ignore_ascii_case(tag)
            && bytes
                .get(i + tag.len())
                .map_or(true, |b| *b == b'>' || b.is_ascii_whitespace())
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Transforms every `<script>` body of a component and leaves the rest.
///
/// Reported lines refer to the whole file.
#[must_use]
pub fn transform_component(source: &str, rules: &RewriteRules) -> TransformResult {
    let blocks = script_blocks(source);
    if blocks.is_empty() {
        return TransformResult::unchanged(source);
    }

    let line_index = LineIndex::new(source);
    let mut result = TransformResult::default();
    let mut text = String::with_capacity(source.len());
    let mut copied = 0;

    for block in blocks {
        let line_offset = line_index.line_number(block.start) - 1;
        let body = transform(&source[block.clone()], rules);

        text.push_str(&source[copied..block.start]);
        text.push_str(&body.rewritten_text);
        copied = block.end;

        result.deleted_count += body.deleted_count;
        result.rewritten_count += body.rewritten_count;
        result
            .changes
            .extend(body.changes.into_iter().map(|mut change| {
                change.line += line_offset;
                change
            }));
        result
            .skipped
            .extend(body.skipped.into_iter().map(|mut skipped| {
                skipped.line += line_offset;
                skipped
            }));
    }
    text.push_str(&source[copied..]);
    result.rewritten_text = text;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = "\
<template>
  <p>Don't console.log(here)</p>
</template>

<script setup lang=\"ts\">
console.log('mounted')
function save() {
  try {
    api.save()
  } catch (e) {
    console.log(e)
  }
}
</script>

<style>
.a { color: red; }
</style>
";

    #[test]
    fn test_script_blocks() {
        let blocks = script_blocks(COMPONENT);
        assert_eq!(blocks.len(), 1);
        let body = &COMPONENT[blocks[0].clone()];
        assert!(body.starts_with("\nconsole.log('mounted')"));
        assert!(body.ends_with("}\n"));
    }

    #[test]
    fn test_similar_tags_are_not_scripts() {
        assert!(script_blocks("<scripts>console.log(1)</scripts>").is_empty());
        assert!(script_blocks("<script>console.log(1)").is_empty());
        assert_eq!(script_blocks("<SCRIPT>a</SCRIPT><script>b</script>").len(), 2);
    }

    #[test]
    fn test_transform_component_only_touches_scripts() {
        let result = transform_component(COMPONENT, &RewriteRules::default());

        assert!(result
            .rewritten_text
            .contains("<p>Don't console.log(here)</p>"));
        assert!(!result.rewritten_text.contains("console.log('mounted')"));
        assert!(result.rewritten_text.contains("    console.error(e)\n"));
        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.rewritten_count, 1);
        assert_eq!(result.changes[0].line, 6);
        assert_eq!(result.changes[1].line, 11);
    }

    #[test]
    fn test_component_without_script_is_unchanged() {
        let source = "<template><p>console.log(1);</p></template>";
        let result = transform_component(source, &RewriteRules::default());
        assert_eq!(result.rewritten_text, source);
        assert!(!result.is_modified());
    }
}
