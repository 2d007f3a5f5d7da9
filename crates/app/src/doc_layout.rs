//! Lightweight markdown styling for the document view.
//!
//! The document is shown in a selectable text area, so every source character
//! must stay in the laid-out text (selection offsets index the raw markdown).
//! Markers are kept and only styled:
//! - `# Heading` through `#### Heading`
//! - `- bullet` and `* bullet` list items
//! - `**bold**`
//! - `` `inline code` ``

use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Color32, FontId};

const BASE_SIZE: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Heading(usize),
    Bullet,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpanKind {
    Plain,
    Bold,
    Code,
}

fn line_kind(line: &str) -> LineKind {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=4).contains(&hashes) && trimmed[hashes..].starts_with(' ') {
        return LineKind::Heading(hashes);
    }
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
        return LineKind::Bullet;
    }
    LineKind::Body
}

/// Split a line into styled spans. Concatenating the spans gives back the line.
fn spans(line: &str) -> Vec<(&str, SpanKind)> {
    let mut out = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        let bold = remaining.find("**");
        let code = remaining.find('`');
        let next = match (bold, code) {
            (Some(b), Some(c)) if c < b => Some((c, SpanKind::Code, 1)),
            (Some(b), _) => Some((b, SpanKind::Bold, 2)),
            (None, Some(c)) => Some((c, SpanKind::Code, 1)),
            (None, None) => None,
        };

        let Some((pos, kind, marker_len)) = next else {
            out.push((remaining, SpanKind::Plain));
            break;
        };

        let marker = &remaining[pos..pos + marker_len];
        let after = &remaining[pos + marker_len..];
        match after.find(marker) {
            Some(end) => {
                if pos > 0 {
                    out.push((&remaining[..pos], SpanKind::Plain));
                }
                let span_end = pos + marker_len + end + marker_len;
                out.push((&remaining[pos..span_end], kind));
                remaining = &remaining[span_end..];
            }
            None => {
                // No closing marker, rest is plain
                out.push((remaining, SpanKind::Plain));
                break;
            }
        }
    }

    out
}

/// Build the layout for a whole document. `job.text` equals `text`.
pub fn layout_job(text: &str, dark: bool) -> LayoutJob {
    let base_color = if dark {
        Color32::from_rgb(220, 220, 230)
    } else {
        Color32::from_rgb(40, 40, 50)
    };
    let heading_color = Color32::from_rgb(16, 150, 110);
    let code_bg = if dark {
        Color32::from_rgb(60, 60, 70)
    } else {
        Color32::from_rgb(230, 232, 236)
    };

    let mut job = LayoutJob::default();
    for line in text.split_inclusive('\n') {
        match line_kind(line) {
            LineKind::Heading(level) => {
                let size = match level {
                    1 => 24.0,
                    2 => 20.0,
                    3 => 18.0,
                    _ => 16.0,
                };
                job.append(
                    line,
                    0.0,
                    TextFormat {
                        font_id: FontId::proportional(size),
                        color: heading_color,
                        ..Default::default()
                    },
                );
            }
            LineKind::Bullet | LineKind::Body => {
                for (span, kind) in spans(line) {
                    let format = match kind {
                        SpanKind::Plain => TextFormat {
                            font_id: FontId::proportional(BASE_SIZE),
                            color: base_color,
                            ..Default::default()
                        },
                        SpanKind::Bold => TextFormat {
                            font_id: FontId::proportional(BASE_SIZE),
                            color: if dark { Color32::WHITE } else { Color32::BLACK },
                            ..Default::default()
                        },
                        SpanKind::Code => TextFormat {
                            font_id: FontId::monospace(BASE_SIZE - 1.0),
                            color: base_color,
                            background: code_bg,
                            ..Default::default()
                        },
                    };
                    job.append(span, 0.0, format);
                }
            }
        }
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kinds() {
        assert_eq!(line_kind("# 2141 Examination Guidelines"), LineKind::Heading(1));
        assert_eq!(line_kind("### I. Graham factors\n"), LineKind::Heading(3));
        assert_eq!(line_kind("##### too deep"), LineKind::Body);
        assert_eq!(line_kind("#hashtag"), LineKind::Body);
        assert_eq!(line_kind("  - scope and content"), LineKind::Bullet);
        assert_eq!(line_kind("plain text"), LineKind::Body);
    }

    #[test]
    fn test_spans_keep_markers() {
        let line = "The **Graham** factors use `35 U.S.C. 103` here";
        let parts = spans(line);
        assert_eq!(
            parts,
            vec![
                ("The ", SpanKind::Plain),
                ("**Graham**", SpanKind::Bold),
                (" factors use ", SpanKind::Plain),
                ("`35 U.S.C. 103`", SpanKind::Code),
                (" here", SpanKind::Plain),
            ]
        );
        let rebuilt: String = parts.iter().map(|(s, _)| *s).collect();
        assert_eq!(rebuilt, line);
    }

    #[test]
    fn test_unclosed_marker_is_plain() {
        assert_eq!(spans("a **b"), vec![("a **b", SpanKind::Plain)]);
    }

    #[test]
    fn test_layout_preserves_text() {
        let doc = "# 2143\n\nSome **bold** text\n- a bullet with `code`\nno newline at end";
        assert_eq!(layout_job(doc, false).text, doc);
        assert_eq!(layout_job(doc, true).text, doc);
    }
}
