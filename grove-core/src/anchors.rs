//! Anchor extraction from raw source text.

use grove_types::{Anchor, AnchorKind};

/// Scan the source for heading and fenced-code-block landmarks.
///
/// Single forward pass: one `inside_fence` flag and two monotonically
/// increasing counters. Headings (`#` through `######` followed by
/// whitespace) only count outside fences. A fence delimiter line
/// toggles the flag; the opener and its closer share one
/// `sequence_index`. An unterminated fence leaves a dangling
/// `CodeFenceStart`; downstream consumers skip anchors they cannot
/// match, so that is fine here.
pub fn extract_anchors(source: &str) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let mut heading_index = 0;
    let mut code_block_index = 0;
    let mut inside_fence = false;

    for (line_index, line) in source.lines().enumerate() {
        if line.starts_with("```") {
            if inside_fence {
                anchors.push(Anchor {
                    line: line_index,
                    kind: AnchorKind::CodeFenceEnd,
                    sequence_index: code_block_index,
                });
                code_block_index += 1;
                inside_fence = false;
            } else {
                anchors.push(Anchor {
                    line: line_index,
                    kind: AnchorKind::CodeFenceStart,
                    sequence_index: code_block_index,
                });
                inside_fence = true;
            }
        } else if !inside_fence && is_heading(line) {
            anchors.push(Anchor {
                line: line_index,
                kind: AnchorKind::Heading,
                sequence_index: heading_index,
            });
            heading_index += 1;
        }
    }

    anchors
}

fn is_heading(line: &str) -> bool {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && matches!(line.as_bytes().get(hashes), Some(&b' ') | Some(&b'\t'))
}
