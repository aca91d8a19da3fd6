//! Rich Text Format export.
//!
//! Produces a plain RTF 1.x document: title, description and the markdown
//! body flattened to paragraphs. Inline emphasis is kept; tables, images and
//! raw HTML are dropped.

use std::fmt::Write;

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use folio_repo::Item;

const HEADER: &str = "{\\rtf1\\ansi\\deff0{\\fonttbl{\\f0 Helvetica;}{\\f1 Courier;}}\\fs22\n";

/// Export an item as an RTF document.
#[must_use]
pub fn to_rtf(item: &Item) -> String {
    let mut rtf = String::from(HEADER);
    rtf.push_str("{\\b\\fs36 ");
    push_escaped(&mut rtf, &item.title);
    rtf.push_str("}\\par\n");
    if !item.description.is_empty() {
        rtf.push_str("{\\i ");
        push_escaped(&mut rtf, &item.description);
        rtf.push_str("}\\par\n");
    }
    rtf.push_str("\\par\n");

    for event in Parser::new(&item.body) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                rtf.push_str(match level {
                    HeadingLevel::H1 => "{\\b\\fs32 ",
                    HeadingLevel::H2 => "{\\b\\fs28 ",
                    _ => "{\\b ",
                });
            }
            Event::End(TagEnd::Heading(_)) => rtf.push_str("}\\par\n"),
            Event::Start(Tag::Emphasis) => rtf.push_str("{\\i "),
            Event::Start(Tag::Strong) => rtf.push_str("{\\b "),
            Event::Start(Tag::CodeBlock(_)) => rtf.push_str("{\\f1 "),
            Event::Start(Tag::Item) => rtf.push_str("\\bullet  "),
            Event::End(TagEnd::Emphasis | TagEnd::Strong) => rtf.push('}'),
            Event::End(TagEnd::CodeBlock) => rtf.push_str("}\\par\n"),
            Event::End(TagEnd::Paragraph | TagEnd::Item) => rtf.push_str("\\par\n"),
            Event::Code(code) => {
                rtf.push_str("{\\f1 ");
                push_escaped(&mut rtf, &code);
                rtf.push('}');
            }
            Event::Text(text) => push_escaped(&mut rtf, &text),
            Event::SoftBreak => rtf.push(' '),
            Event::HardBreak => rtf.push_str("\\line "),
            _ => {}
        }
    }

    rtf.push('}');
    rtf
}

/// Escape control characters and encode non-ASCII as `\uN?`.
fn push_escaped(rtf: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                rtf.push('\\');
                rtf.push(c);
            }
            '\n' => rtf.push_str("\\line "),
            c if c.is_ascii() => rtf.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit code units.
                    let _ = write!(rtf, "\\u{}?", i16::from_ne_bytes(unit.to_ne_bytes()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_repo::{ItemType, Route};

    use super::*;

    fn item(body: &str) -> Item {
        Item::new(Route::root(), "Title {1}", ItemType::Document)
            .with_description("About")
            .with_body(body)
    }

    #[test]
    fn test_document_frame() {
        let rtf = to_rtf(&item(""));

        assert!(rtf.starts_with("{\\rtf1"));
        assert!(rtf.ends_with('}'));
        assert!(rtf.contains("{\\b\\fs36 Title \\{1\\}}\\par"));
        assert!(rtf.contains("{\\i About}\\par"));
    }

    #[test]
    fn test_body_paragraphs_and_emphasis() {
        let rtf = to_rtf(&item("## Section\n\nSome *words* here."));

        assert!(rtf.contains("{\\b\\fs28 Section}\\par"));
        assert!(rtf.contains("Some {\\i words} here.\\par"));
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let rtf = to_rtf(&item("Grüße"));

        assert!(rtf.contains("Gr\\u252?\\u223?e"));
    }

    #[test]
    fn test_astral_characters_use_surrogates() {
        let rtf = to_rtf(&item("😀"));

        assert!(rtf.contains("\\u-10179?\\u-8704?"));
    }
}
