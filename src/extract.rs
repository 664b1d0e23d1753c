//! Heading-bounded text extraction over Federal Register full-text XML.
//!
//! Notices mark section boundaries with `HD` elements. The text of a section
//! is everything between its heading and the next heading at the same level,
//! with all markup stripped.

use quick_xml::events::Event;
use quick_xml::Reader;

const HEADING_TAG: &[u8] = b"HD";

/// Outcome of a single field extraction. `Found` may carry an empty string
/// when the next heading follows immediately; callers decide whether to log
/// the other two and continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    NotFound,
    Malformed(String),
}

/// Return the tag-stripped text between the first heading whose content
/// equals `heading` and the next heading at the same level.
///
/// Many notices render an extra space after the heading text, so the label
/// is matched with and without one trailing space.
pub fn text_after_heading(xml: &str, heading: &str) -> Extraction {
    let spaced = format!("{heading} ");

    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    // Locate the heading: accumulate each HD's text content and compare it
    // against the two accepted label forms.
    let mut in_heading = false;
    let mut heading_text = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == HEADING_TAG => {
                in_heading = true;
                heading_text.clear();
            }
            Ok(Event::Text(t)) if in_heading => match t.unescape() {
                Ok(text) => heading_text.push_str(&text),
                Err(e) => return Extraction::Malformed(e.to_string()),
            },
            Ok(Event::End(e)) if in_heading && e.name().as_ref() == HEADING_TAG => {
                in_heading = false;
                if heading_text == heading || heading_text == spaced {
                    break;
                }
            }
            Ok(Event::Eof) => return Extraction::NotFound,
            Err(e) => return Extraction::Malformed(e.to_string()),
            Ok(_) => {}
        }
        buf.clear();
    }

    // Walk the siblings that follow, accumulating their raw markup until
    // the next sibling heading, the end of the enclosing element, or end of
    // input. Depth keeps everything nested inside one sibling together, so
    // a heading buried in a table does not end the section.
    let start = reader.buffer_position() as usize;
    let mut end = start;
    let mut depth = 0u32;
    loop {
        buf.clear();
        let before = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if depth == 0 && e.name().as_ref() == HEADING_TAG {
                    end = before;
                    break;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) if depth == 0 && e.name().as_ref() == HEADING_TAG => {
                end = before;
                break;
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    // Closes the enclosing element; no more siblings.
                    end = before;
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                end = before;
                break;
            }
            Err(e) => return Extraction::Malformed(e.to_string()),
            Ok(_) => {}
        }
    }

    // Re-parse the accumulated markup and keep only its character data.
    match strip_tags(&xml[start..end]) {
        Ok(text) => Extraction::Found(text.trim().to_string()),
        Err(reason) => Extraction::Malformed(reason),
    }
}

/// Text content of the first child element of the first `section` element.
/// Notice titles live in the first child of the `PRIACT` document element.
pub fn first_child_text(xml: &str, section: &str) -> Extraction {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == section.as_bytes() => break,
            Ok(Event::Eof) => return Extraction::NotFound,
            Err(e) => return Extraction::Malformed(e.to_string()),
            Ok(_) => {}
        }
        buf.clear();
    }

    // Skip interleaved text until the first child element, then collect the
    // child's text content.
    let mut out = String::new();
    let mut depth = 0u32;
    let mut in_child = false;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                in_child = true;
                depth += 1;
            }
            Ok(Event::Empty(_)) if !in_child => {
                // Self-closing first child carries no text.
                return Extraction::Found(String::new());
            }
            Ok(Event::Text(t)) if in_child => match t.unescape() {
                Ok(text) => out.push_str(&text),
                Err(e) => return Extraction::Malformed(e.to_string()),
            },
            Ok(Event::End(_)) => {
                if !in_child {
                    // The section closed without any child elements.
                    return Extraction::NotFound;
                }
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => return Extraction::NotFound,
            Err(e) => return Extraction::Malformed(e.to_string()),
            Ok(_) => {}
        }
    }

    Extraction::Found(out.trim().to_string())
}

fn strip_tags(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => out.push_str(&text),
                Err(e) => return Err(e.to_string()),
            },
            Ok(Event::CData(c)) => out.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            Ok(_) => {}
        }
        buf.clear();
    }
    Ok(out)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn found(extraction: Extraction) -> String {
        match extraction {
            Extraction::Found(text) => text,
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn text_between_headings() {
        let xml =
            "<DOC><HD>SYSTEM NAME:</HD><P>Payroll records.</P><HD>NEXT:</HD><P>other</P></DOC>";
        assert_eq!(
            found(text_after_heading(xml, "SYSTEM NAME:")),
            "Payroll records."
        );
    }

    #[test]
    fn heading_with_trailing_space_matches() {
        let exact = "<DOC><HD>PURPOSE:</HD><P>Tracking.</P></DOC>";
        let spaced = "<DOC><HD>PURPOSE: </HD><P>Tracking.</P></DOC>";
        assert_eq!(
            found(text_after_heading(exact, "PURPOSE:")),
            found(text_after_heading(spaced, "PURPOSE:"))
        );
    }

    #[test]
    fn embedded_markup_is_stripped() {
        let xml = "<DOC><HD>AUTHORITY:</HD><P>5 U.S.C. 301 <E T=\"04\">et seq.</E> and others.</P></DOC>";
        let text = found(text_after_heading(xml, "AUTHORITY:"));
        assert_eq!(text, "5 U.S.C. 301 et seq. and others.");
        assert!(!text.contains('<'));
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = "<DOC><HD>A:</HD><P>Records &amp; files</P></DOC>";
        assert_eq!(found(text_after_heading(xml, "A:")), "Records & files");
    }

    #[test]
    fn adjacent_headings_yield_empty_text() {
        let xml = "<DOC><HD>PURPOSE:</HD><HD>RETENTION:</HD><P>Kept forever.</P></DOC>";
        assert_eq!(found(text_after_heading(xml, "PURPOSE:")), "");
    }

    #[test]
    fn heading_at_end_of_document_yields_empty_text() {
        let xml = "<DOC><HD>PURPOSE:</HD></DOC>";
        assert_eq!(found(text_after_heading(xml, "PURPOSE:")), "");
    }

    #[test]
    fn missing_heading_is_not_found() {
        let xml = "<DOC><HD>PURPOSE:</HD><P>x</P></DOC>";
        assert_eq!(
            text_after_heading(xml, "SYSTEM NAME:"),
            Extraction::NotFound
        );
    }

    #[test]
    fn stops_before_the_next_heading() {
        let xml = "<DOC><HD>A:</HD><P>first</P><P>second</P><HD>B:</HD><P>third</P></DOC>";
        let text = found(text_after_heading(xml, "A:"));
        assert!(text.contains("first") && text.contains("second"));
        assert!(!text.contains("third"));
    }

    #[test]
    fn self_closing_heading_bounds_the_section() {
        let xml = "<DOC><HD>A:</HD><P>kept</P><HD/><P>dropped</P></DOC>";
        assert_eq!(found(text_after_heading(xml, "A:")), "kept");
    }

    #[test]
    fn stops_at_the_end_of_the_enclosing_element() {
        let xml = "<DOC><SEC><HD>A:</HD><P>inside</P></SEC><P>outside</P></DOC>";
        assert_eq!(found(text_after_heading(xml, "A:")), "inside");
    }

    #[test]
    fn heading_nested_in_a_sibling_does_not_end_the_walk() {
        let xml =
            "<DOC><HD>A:</HD><SEC><HD>inner heading</HD><P>body</P></SEC><HD>B:</HD></DOC>";
        let text = found(text_after_heading(xml, "A:"));
        assert!(text.contains("inner heading") && text.contains("body"));
    }

    #[test]
    fn unknown_entity_is_malformed() {
        let xml = "<DOC><HD>A:</HD><P>&nosuch;</P><HD>B:</HD></DOC>";
        assert!(matches!(
            text_after_heading(xml, "A:"),
            Extraction::Malformed(_)
        ));
    }

    #[test]
    fn first_child_of_section() {
        let xml = "<NOTICE><PRIACT>\n  <HD SOURCE=\"HED\">Notice Title</HD><HD>SYSTEM NAME:</HD></PRIACT></NOTICE>";
        assert_eq!(found(first_child_text(xml, "PRIACT")), "Notice Title");
    }

    #[test]
    fn first_child_missing_section_is_not_found() {
        let xml = "<DOC><P>nothing here</P></DOC>";
        assert_eq!(first_child_text(xml, "PRIACT"), Extraction::NotFound);
    }

    #[test]
    fn section_without_child_elements_is_not_found() {
        let xml = "<PRIACT>\n just text \n</PRIACT>";
        assert_eq!(first_child_text(xml, "PRIACT"), Extraction::NotFound);
    }

    #[test]
    fn notice_fixture_fields() {
        let xml = std::fs::read_to_string("tests/fixtures/notice.xml").unwrap();
        assert_eq!(
            found(text_after_heading(&xml, "SYSTEM NAME:")),
            "Payroll Accounting and Reporting System (GSA/PPFM-8)."
        );
        assert_eq!(
            found(text_after_heading(
                &xml,
                "AUTHORITIES FOR MAINTENANCE OF THE SYSTEM:"
            )),
            "5 U.S.C. 5501 et seq.; 31 U.S.C. 3512."
        );
        assert_eq!(
            found(first_child_text(&xml, "PRIACT")),
            "Privacy Act of 1974; Notice of an Updated System of Records"
        );
    }
}
