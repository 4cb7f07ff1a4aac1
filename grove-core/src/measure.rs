//! Off-surface measurement of soft-wrapped line offsets.
//!
//! The editing surface soft-wraps long lines, so a line index alone
//! cannot give a pixel offset; the text has to be re-flowed under the
//! surface's own metrics. In the browser this is done against a hidden
//! mirror element; here the mirror is [`MirrorMetrics`] plus one pass
//! of wrap arithmetic over the text. Both must agree with the surface
//! on every property that affects text flow.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// How the surface wraps long lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// pre-wrap with break-word: soft-wrap at whitespace, hard-break
    /// words wider than the surface.
    #[default]
    PreWrap,

    /// No soft wrapping (the surface scrolls horizontally).
    None,
}

/// Metrics of the editing surface that affect text flow. The mirror
/// measurement is only as good as the agreement between these and the
/// live surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorMetrics {
    /// Inner width available to text, in pixels (the surface width
    /// with padding and borders already taken off).
    pub content_width: f64,

    /// Horizontal advance of one column of the surface font, pixels.
    /// Editing surfaces use a fixed-advance font; a proportional
    /// shaper would plug in here.
    pub char_width: f64,

    /// Vertical advance of one visual row, pixels.
    pub line_height: f64,

    /// Distance from the surface's top edge to the first row, pixels.
    pub padding_top: f64,

    /// Columns per tab stop.
    pub tab_size: usize,

    pub wrap: WrapMode,
}

impl Default for MirrorMetrics {
    fn default() -> Self {
        Self {
            content_width: 800.0,
            char_width: 8.0,
            line_height: 20.0,
            padding_top: 0.0,
            tab_size: 4,
            wrap: WrapMode::PreWrap,
        }
    }
}

impl MirrorMetrics {
    /// Columns that fit on one visual row.
    fn columns(&self) -> usize {
        if self.char_width <= 0.0 {
            return 1;
        }
        ((self.content_width / self.char_width).floor() as usize).max(1)
    }
}

/// Measure the top offset of each requested line within the wrapped
/// text, in pixels from the surface top.
///
/// The whole batch is measured in one pass over the text: `lines` must
/// be sorted ascending so each measurement only extends the running
/// prefix. Lines past the end of the text measure at the text bottom.
/// Offsets are not clamped against the surface's scrollable extent;
/// that is the caller's job.
pub fn measure_line_offsets(text: &str, lines: &[usize], metrics: &MirrorMetrics) -> Vec<f64> {
    if lines.is_empty() {
        return Vec::new();
    }
    debug_assert!(
        lines.windows(2).all(|w| w[0] <= w[1]),
        "anchor lines must be sorted ascending"
    );

    let mut offsets = Vec::with_capacity(lines.len());
    let mut requested = lines.iter().copied().peekable();
    let mut rows_above = 0usize;

    for (index, line) in text.split('\n').enumerate() {
        while requested.peek() == Some(&index) {
            offsets.push(metrics.padding_top + rows_above as f64 * metrics.line_height);
            requested.next();
        }
        if requested.peek().is_none() {
            return offsets;
        }
        rows_above += visual_rows(line, metrics);
    }

    let bottom = metrics.padding_top + rows_above as f64 * metrics.line_height;
    while requested.next().is_some() {
        offsets.push(bottom);
    }

    offsets
}

/// Number of visual rows a logical line occupies on the surface.
fn visual_rows(line: &str, metrics: &MirrorMetrics) -> usize {
    match metrics.wrap {
        WrapMode::None => 1,
        WrapMode::PreWrap => wrapped_rows(line, metrics.columns(), metrics.tab_size),
    }
}

fn wrapped_rows(line: &str, columns: usize, tab_size: usize) -> usize {
    let mut rows = 1usize;
    let mut col = 0usize;

    for token in tokenize(line) {
        match token {
            Token::Space => {
                // Whitespace at the wrap edge hangs past it rather
                // than forcing a new row.
                col = (col + 1).min(columns);
            }
            Token::Tab => {
                let advance = tab_size.max(1) - col % tab_size.max(1);
                col = (col + advance).min(columns);
            }
            Token::Word(width) => {
                if col + width <= columns {
                    col += width;
                } else if width <= columns {
                    rows += 1;
                    col = width;
                } else {
                    // Word wider than the surface: hard break.
                    let mut remaining = width - (columns - col);
                    while remaining > 0 {
                        rows += 1;
                        let take = remaining.min(columns);
                        col = take;
                        remaining -= take;
                    }
                }
            }
        }
    }

    rows
}

enum Token {
    Word(usize),
    Space,
    Tab,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = 0usize;

    for grapheme in line.graphemes(true) {
        match grapheme {
            " " => {
                if word > 0 {
                    tokens.push(Token::Word(word));
                    word = 0;
                }
                tokens.push(Token::Space);
            }
            "\t" => {
                if word > 0 {
                    tokens.push(Token::Word(word));
                    word = 0;
                }
                tokens.push(Token::Tab);
            }
            _ => word += UnicodeWidthStr::width(grapheme),
        }
    }
    if word > 0 {
        tokens.push(Token::Word(word));
    }

    tokens
}
