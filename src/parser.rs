use crate::document::{Document, Node};
use crate::element::{Attribute, Element};
use crate::eol::Eol;
use crate::error::{Error, Result};
use encoding_rs::Encoding;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Options when parsing xml.
///
/// - `default_eol`: line ending used when the text has no line break to detect one from.
/// - `indent`: indentation unit for inserted elements. Detected from the document when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub default_eol: Eol,
    pub indent: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            default_eol: Eol::Lf,
            indent: None,
        }
    }
}

// An attribute as written, `value` still escaped.
struct RawAttribute<'a> {
    lead: &'a str,
    key: &'a str,
    eq: &'a str,
    quote: char,
    value: &'a str,
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

// Splits the content of a start tag after its name into attributes
// and the whitespace before `>` or `/>`.
fn split_start_tag(raw: &str, name_len: usize) -> Option<(Vec<RawAttribute<'_>>, &str)> {
    let mut rest = raw.get(name_len..)?;
    let mut attributes = Vec::new();
    loop {
        let after_lead = rest.trim_start_matches(is_space);
        if after_lead.is_empty() {
            return Some((attributes, rest));
        }
        let lead = &rest[..rest.len() - after_lead.len()];
        let key_len = after_lead.find(|c: char| c == '=' || is_space(c))?;
        let (key, after_key) = after_lead.split_at(key_len);
        let after_eq = after_key
            .trim_start_matches(is_space)
            .strip_prefix('=')?
            .trim_start_matches(is_space);
        let eq = &after_key[..after_key.len() - after_eq.len()];
        let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = &after_eq[1..];
        let value_len = body.find(quote)?;
        attributes.push(RawAttribute {
            lead,
            key,
            eq,
            quote,
            value: &body[..value_len],
        });
        rest = &body[value_len + 1..];
    }
}

pub(crate) struct DocumentParser {
    document: Document,
}

impl DocumentParser {
    pub(crate) fn parse_str(
        text: &str,
        encoding: &'static Encoding,
        opts: ReadOptions,
    ) -> Result<Document> {
        let eol = Eol::detect(text).unwrap_or(opts.default_eol);
        let mut parser = DocumentParser {
            document: Document::empty(eol, encoding, opts),
        };
        let text = match text.strip_prefix('\u{FEFF}') {
            Some(rest) => {
                parser.document.bom = true;
                rest
            }
            None => text,
        };
        let mut reader = Reader::from_str(text);
        // Raw end tag names are kept, so names are matched here instead.
        reader
            .check_end_names(false)
            .trim_markup_names_in_closing_tags(false);
        parser.parse_content(reader)?;
        if parser.document.container().child_elements(&parser.document).is_empty() {
            return Err(Error::MalformedXml("Document has no root element".to_string()));
        }
        Ok(parser.document)
    }

    fn handle_bytes_start(&mut self, element_stack: &[Element], ev: &BytesStart) -> Result<Element> {
        let mut_doc = &mut self.document;
        let name = String::from_utf8(ev.name().to_vec())?;
        let raw_start = std::str::from_utf8(&**ev)?;
        let (layout, tag_tail) = split_start_tag(raw_start, name.len())
            .ok_or_else(|| Error::MalformedXml(format!("Cannot read start tag <{}>", raw_start)))?;
        let mut values: Vec<String> = Vec::new();
        for attr in ev.attributes() {
            let attr = attr?;
            values.push(String::from_utf8(attr.unescaped_value()?.to_vec())?);
        }
        if values.len() != layout.len() {
            return Err(Error::MalformedXml(format!(
                "Cannot read attributes of <{}>",
                name
            )));
        }
        let attributes = layout
            .into_iter()
            .zip(values)
            .map(|(raw, value)| {
                Attribute::from_source(raw.lead, raw.key, raw.eq, raw.quote, raw.value, value)
            })
            .collect();
        let element = Element::with_data(mut_doc, name, attributes, tag_tail.to_string());
        let parent = element_stack
            .last()
            .copied()
            .unwrap_or_else(|| mut_doc.container());
        parent.push_child(mut_doc, Node::Element(element));
        Ok(element)
    }

    fn push_node(&mut self, element_stack: &[Element], node: Node) {
        let parent = element_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.document.container());
        parent.push_child(&mut self.document, node);
    }

    // Returns if document parsing is finished.
    fn handle_event(&mut self, element_stack: &mut Vec<Element>, event: Event) -> Result<bool> {
        match event {
            Event::Start(ref ev) => {
                let element = self.handle_bytes_start(element_stack, ev)?;
                element_stack.push(element);
            }
            Event::End(ref ev) => {
                let raw_end = String::from_utf8(ev.name().to_vec())?;
                let elem = match element_stack.pop() {
                    Some(elem) if elem.name(&self.document) == raw_end.trim_end() => elem,
                    Some(elem) => {
                        return Err(Error::MalformedXml(format!(
                            "Closing tag mismatch. Expected {}, found {}",
                            elem.name(&self.document),
                            raw_end.trim_end(),
                        )))
                    }
                    None => {
                        return Err(Error::MalformedXml(format!(
                            "Closing tag {} has no opening tag",
                            raw_end.trim_end()
                        )))
                    }
                };
                let mut_doc = &mut self.document;
                elem.set_raw_end(mut_doc, raw_end);
                // distinguish <tag></tag> and <tag />
                if !elem.has_children(mut_doc) {
                    elem.push_child(mut_doc, Node::Text(String::new()));
                }
            }
            Event::Empty(ref ev) => {
                self.handle_bytes_start(element_stack, ev)?;
            }
            // Text is stored escaped so it is written back unchanged.
            // The reader reports empty text between adjacent tags.
            Event::Text(ev) => {
                if !ev.escaped().is_empty() {
                    let content = String::from_utf8(ev.escaped().to_vec())?;
                    self.push_node(element_stack, Node::Text(content));
                }
            }
            Event::DocType(ev) => {
                let content = String::from_utf8(ev.escaped().to_vec())?;
                self.push_node(element_stack, Node::DocType(content));
            }
            Event::Comment(ev) => {
                let content = String::from_utf8(ev.escaped().to_vec())?;
                self.push_node(element_stack, Node::Comment(content));
            }
            Event::CData(ev) => {
                let content = String::from_utf8(ev.escaped().to_vec())?;
                self.push_node(element_stack, Node::CData(content));
            }
            Event::PI(ev) => {
                let content = String::from_utf8(ev.escaped().to_vec())?;
                self.push_node(element_stack, Node::PI(content));
            }
            Event::Decl(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                self.push_node(element_stack, Node::Decl(content));
            }
            Event::Eof => {
                if let Some(elem) = element_stack.last() {
                    return Err(Error::MalformedXml(format!(
                        "Element {} is not closed",
                        elem.name(&self.document)
                    )));
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn parse_content(&mut self, mut reader: Reader<&[u8]>) -> Result<()> {
        let mut buf = Vec::with_capacity(200); // reduce time increasing capacity at start.
        // the container is the implicit parent while the stack is empty
        let mut element_stack: Vec<Element> = Vec::new();

        loop {
            let ev = reader.read_event(&mut buf)?;
            tracing::trace!(event = ?ev);
            if self.handle_event(&mut element_stack, ev)? {
                return Ok(());
            }
            buf.clear();
        }
    }
}
