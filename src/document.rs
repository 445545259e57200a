use crate::element::{unescape_str, Element, ElementData};
use crate::eol::Eol;
use crate::error::Result;
use crate::parser::{DocumentParser, ReadOptions};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::str::FromStr;

/// A node of the tree. Every variant other than `Element` holds its
/// source text verbatim, without the surrounding markup.
///
/// `Text` is kept escaped, so untouched text is written back byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    PI(String),
    DocType(String),
    Decl(String),
}

impl Node {
    pub fn as_element(&self) -> Option<Element> {
        match self {
            Self::Element(elem) => Some(*elem),
            _ => None,
        }
    }

    pub(crate) fn build_text_content(&self, document: &Document, buf: &mut String) {
        match self {
            Node::Element(elem) => elem.build_text_content(document, buf),
            Node::Text(text) => buf.push_str(&unescape_str(text)),
            Node::CData(text) => buf.push_str(text),
            _ => {}
        }
    }

    /// Whitespace-only text, `""` included.
    pub(crate) fn is_blank_text(&self) -> bool {
        match self {
            Node::Text(text) => text.bytes().all(|b| b.is_ascii_whitespace()),
            _ => false,
        }
    }
}

/// Represents a project file.
///
/// Holds the element tree together with the line ending and encoding
/// the file was read with. Load once, edit as often as needed, then
/// call [`Document::serialize()`].
///
/// # Examples
/// ```
/// use csproj_edit::Document;
/// use std::str::FromStr;
///
/// let mut doc = Document::from_str("<Project>\n  <PropertyGroup>\n    <OutputType>Exe</OutputType>\n  </PropertyGroup>\n</Project>\n").unwrap();
/// doc.insert_node("PropertyGroup", "Nullable", "enable").unwrap();
/// assert!(doc.exists_node_value("PropertyGroup", "Nullable", "enable"));
/// let xml = doc.serialize().unwrap();
/// assert!(xml.contains("    <Nullable>enable</Nullable>\n  </PropertyGroup>"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) store: Vec<ElementData>,
    container: Element,
    pub(crate) eol: Eol,
    pub(crate) encoding: &'static Encoding,
    pub(crate) bom: bool,
    pub(crate) read_opts: ReadOptions,
}

impl Document {
    pub(crate) fn empty(eol: Eol, encoding: &'static Encoding, read_opts: ReadOptions) -> Document {
        let (container, container_data) = Element::container();
        Document {
            store: vec![container_data],
            container,
            eol,
            encoding,
            bom: false,
            read_opts,
        }
    }

    pub fn container(&self) -> Element {
        self.container
    }

    /// The project element. A document always has one.
    pub fn root_element(&self) -> Element {
        self.container
            .child_elements(self)
            .first()
            .copied()
            .unwrap_or(self.container)
    }

    pub fn eol(&self) -> Eol {
        self.eol
    }

    /// Encoding the text was decoded from. Only used when writing bytes.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether the source started with a byte order mark.
    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Number of lines of the serialized document.
    pub fn line_count(&self) -> Result<usize> {
        Ok(self.eol.line_count(&self.serialize()?))
    }
}

// Read and write
impl Document {
    /// Parses already decoded text.
    ///
    /// `encoding` is what the text was decoded from and is handed back when
    /// the document is written as bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedXml`](crate::Error::MalformedXml): Could not read XML,
    ///   or there is no root element.
    pub fn load(text: &str, encoding: &'static Encoding) -> Result<Document> {
        DocumentParser::parse_str(text, encoding, ReadOptions::default())
    }

    pub fn parse_str_with_opts(
        text: &str,
        encoding: &'static Encoding,
        opts: ReadOptions,
    ) -> Result<Document> {
        DocumentParser::parse_str(text, encoding, opts)
    }

    /// Writes document as xml string.
    pub fn serialize(&self) -> Result<String> {
        let mut buf: Vec<u8> = Vec::with_capacity(200);
        self.write(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Write document to writer. Will be written in UTF-8.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        if self.bom {
            writer.write_all("\u{FEFF}".as_bytes())?;
        }
        let mut writer = Writer::new(writer);
        self.write_nodes(&mut writer, self.container.children(self))?;
        Ok(())
    }

    fn write_nodes(&self, writer: &mut Writer<impl Write>, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Element(eid) => self.write_element(writer, *eid)?,
                Node::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_escaped_str(text)))?
                }
                Node::DocType(text) => {
                    writer.write_event(Event::DocType(BytesText::from_escaped_str(text)))?
                }
                Node::Comment(text) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped_str(text)))?
                }
                Node::CData(text) => {
                    writer.write_event(Event::CData(BytesText::from_escaped_str(text)))?
                }
                Node::PI(text) => {
                    writer.write_event(Event::PI(BytesText::from_escaped_str(text)))?
                }
                Node::Decl(text) => writer.write_event(Event::Decl(BytesDecl::from_start(
                    BytesStart::borrowed(text.as_bytes(), 3),
                )))?,
            };
        }
        Ok(())
    }

    fn write_element(&self, writer: &mut Writer<impl Write>, element: Element) -> Result<()> {
        let start_tag = element.start_tag(self);
        let name_len = element.name(self).len();
        let start = BytesStart::borrowed(start_tag.as_bytes(), name_len);
        if element.has_children(self) {
            writer.write_event(Event::Start(start))?;
            self.write_nodes(writer, element.children(self))?;
            let end = element.end_tag(self);
            writer.write_event(Event::End(BytesEnd::borrowed(end.as_bytes())))?;
        } else {
            writer.write_event(Event::Empty(start))?;
        }
        Ok(())
    }
}

impl FromStr for Document {
    type Err = crate::Error;

    /// Parses UTF-8 text with default options.
    fn from_str(s: &str) -> Result<Document> {
        Document::load(s, UTF_8)
    }
}
