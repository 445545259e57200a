use crate::document::{Document, Node};
use quick_xml::escape::unescape;

const TEXT_SPECIAL: [char; 3] = ['&', '<', '>'];

/// An attribute of a start tag, together with the way it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    key: String,
    value: String, // unescaped
    // Whitespace before the key.
    lead: String,
    // `=` with any whitespace around it.
    eq: String,
    quote: char,
    raw_value: String,
}

impl Attribute {
    pub(crate) fn new(key: &str, value: &str) -> Attribute {
        Attribute {
            key: key.to_string(),
            value: value.to_string(),
            lead: " ".to_string(),
            eq: "=".to_string(),
            quote: '"',
            raw_value: escape_chars(value, &['&', '<', '"']),
        }
    }

    /// Attribute as read from a start tag, `raw_value` still escaped.
    pub(crate) fn from_source(
        lead: &str,
        key: &str,
        eq: &str,
        quote: char,
        raw_value: &str,
        value: String,
    ) -> Attribute {
        Attribute {
            key: key.to_string(),
            value,
            lead: lead.to_string(),
            eq: eq.to_string(),
            quote,
            raw_value: raw_value.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) {
        self.raw_value = escape_chars(value, &['&', '<', self.quote]);
        self.value = value.to_string();
    }

    fn write_to(&self, buf: &mut String) {
        buf.push_str(&self.lead);
        buf.push_str(&self.key);
        buf.push_str(&self.eq);
        buf.push(self.quote);
        buf.push_str(&self.raw_value);
        buf.push(self.quote);
    }
}

/// Data of an element, owned by the [`Document`] it belongs to.
#[derive(Debug, Clone)]
pub struct ElementData {
    name: String,
    attributes: Vec<Attribute>, // in source order
    // Whitespace before `>` or `/>` in the start tag.
    tag_tail: String,
    // Name part of the end tag as read, may carry trailing whitespace.
    raw_end: Option<String>,
    parent: Option<Element>,
    children: Vec<Node>,
}

/// Represents an Xml Element.
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// So you do not need to bother with having a reference.
///
/// Because the actual data of the element is stored in [`Document`],
/// most methods takes `&Document` as its first argument.
/// Mutation goes through the addressing methods of [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    id: usize,
}

impl Element {
    /// Create a new detached element with name.
    pub(crate) fn new<S: Into<String>>(document: &mut Document, name: S) -> Element {
        Self::with_data(document, name.into(), Vec::new(), String::new())
    }

    pub(crate) fn with_data(
        document: &mut Document,
        name: String,
        attributes: Vec<Attribute>,
        tag_tail: String,
    ) -> Element {
        let elem = Element {
            id: document.store.len(),
        };
        document.store.push(ElementData {
            name,
            attributes,
            tag_tail,
            raw_end: None,
            parent: None,
            children: Vec::new(),
        });
        elem
    }

    pub(crate) fn container() -> (Element, ElementData) {
        let elem_data = ElementData {
            name: String::new(),
            attributes: Vec::new(),
            tag_tail: String::new(),
            raw_end: None,
            parent: None,
            children: Vec::new(),
        };
        (Element { id: 0 }, elem_data)
    }

    /// The container holds the root element together with
    /// the declaration, comments and whitespace around it.
    pub fn is_container(&self) -> bool {
        self.id == 0
    }
}

impl Element {
    fn data<'a>(&self, document: &'a Document) -> &'a ElementData {
        &document.store[self.id]
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut ElementData {
        &mut document.store[self.id]
    }

    /// Tag name, including its namespace prefix if there is one.
    pub fn name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).name
    }

    /// Renames the element, keeping the layout of both tags.
    pub(crate) fn set_name<S: Into<String>>(&self, document: &mut Document, name: S) {
        let data = self.mut_data(document);
        let name = name.into();
        let old_len = data.name.len();
        if let Some(raw_end) = data.raw_end.as_mut() {
            raw_end.replace_range(..old_len, &name);
        }
        data.name = name;
    }

    /// Attributes in the order they appear in the start tag.
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a [Attribute] {
        &self.data(document).attributes
    }

    pub fn attribute<'a>(&self, document: &'a Document, key: &str) -> Option<&'a str> {
        self.attributes(document)
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attributes(&self, document: &Document) -> bool {
        !self.attributes(document).is_empty()
    }

    /// Overwrites the value if `key` exists, appends the attribute otherwise.
    pub(crate) fn set_attribute(&self, document: &mut Document, key: &str, value: &str) {
        let data = self.mut_data(document);
        match data.attributes.iter_mut().find(|attr| attr.key == key) {
            Some(attr) if attr.value == value => {}
            Some(attr) => attr.set_value(value),
            None => data.attributes.push(Attribute::new(key, value)),
        }
    }

    pub(crate) fn remove_attribute(&self, document: &mut Document, key: &str) -> Option<String> {
        let data = self.mut_data(document);
        let pos = data.attributes.iter().position(|attr| attr.key == key)?;
        Some(data.attributes.remove(pos).value)
    }

    /// Renames `key` in place. An attribute already named `new_key` is dropped.
    pub(crate) fn rename_attribute(&self, document: &mut Document, key: &str, new_key: &str) {
        let data = self.mut_data(document);
        let pos = match data.attributes.iter().position(|attr| attr.key == key) {
            Some(pos) => pos,
            None => return,
        };
        data.attributes[pos].key = new_key.to_string();
        let mut i = 0;
        data.attributes.retain(|attr| {
            let keep = i == pos || attr.key != new_key;
            i += 1;
            keep
        });
    }

    /// Content of the start tag without `<` and `>` or `/>`.
    ///
    /// Attributes that were not modified keep their source text.
    pub(crate) fn start_tag(&self, document: &Document) -> String {
        let data = self.data(document);
        let mut tag = data.name.clone();
        for attr in data.attributes.iter() {
            attr.write_to(&mut tag);
        }
        tag.push_str(&data.tag_tail);
        tag
    }

    /// Drops the whitespace before `/>`, for an empty tag that gets children.
    pub(crate) fn trim_tag_tail(&self, document: &mut Document) {
        self.mut_data(document).tag_tail.clear();
    }

    pub(crate) fn end_tag<'a>(&self, document: &'a Document) -> &'a str {
        let data = self.data(document);
        data.raw_end.as_deref().unwrap_or(&data.name)
    }

    pub(crate) fn set_raw_end(&self, document: &mut Document, raw_end: String) {
        self.mut_data(document).raw_end = Some(raw_end);
    }

    pub(crate) fn build_text_content(&self, document: &Document, buf: &mut String) {
        for node in self.children(document) {
            node.build_text_content(document, buf);
        }
    }

    /// Concatenated, unescaped text of all descendants.
    pub fn text_content(&self, document: &Document) -> String {
        let mut buf = String::new();
        self.build_text_content(document, &mut buf);
        buf
    }

    /// Replaces all children with a single text node.
    pub(crate) fn set_text_content(&self, document: &mut Document, text: &str) {
        self.clear_children(document);
        let raw = escape_chars(text, &TEXT_SPECIAL);
        self.mut_data(document).children.push(Node::Text(raw));
    }

    pub fn parent(&self, document: &Document) -> Option<Element> {
        self.data(document).parent
    }

    pub fn children<'a>(&self, document: &'a Document) -> &'a Vec<Node> {
        &self.data(document).children
    }

    pub fn has_children(&self, document: &Document) -> bool {
        !self.children(document).is_empty()
    }

    pub fn child_elements(&self, document: &Document) -> Vec<Element> {
        self.children(document)
            .iter()
            .filter_map(|node| node.as_element())
            .collect()
    }

    /// Position of `element` among all child nodes.
    pub(crate) fn child_index(&self, document: &Document, element: Element) -> Option<usize> {
        self.children(document)
            .iter()
            .position(|node| node.as_element() == Some(element))
    }

    /// Equivalent to `vec.push()`. Elements must be detached.
    pub(crate) fn push_child(&self, document: &mut Document, node: Node) {
        if let Node::Element(elem) = node {
            debug_assert!(!elem.is_container() && elem.parent(document).is_none());
            elem.mut_data(document).parent = Some(*self);
        }
        self.mut_data(document).children.push(node);
    }

    /// Equivalent to `vec.insert()`. Elements must be detached.
    pub(crate) fn insert_child(&self, document: &mut Document, index: usize, node: Node) {
        if let Node::Element(elem) = node {
            debug_assert!(!elem.is_container() && elem.parent(document).is_none());
            elem.mut_data(document).parent = Some(*self);
        }
        self.mut_data(document).children.insert(index, node);
    }

    pub(crate) fn clear_children(&self, document: &mut Document) {
        let children = std::mem::take(&mut self.mut_data(document).children);
        for node in children {
            if let Node::Element(elem) = node {
                elem.mut_data(document).parent = None;
            }
        }
    }

    /// Removes the element from its parent, leaving the nodes around it.
    pub(crate) fn detatch(&self, document: &mut Document) {
        let parent = match self.parent(document) {
            Some(parent) => parent,
            None => return,
        };
        if let Some(pos) = parent.child_index(document, *self) {
            parent.mut_data(document).children.remove(pos);
        }
        self.mut_data(document).parent = None;
    }
}

/// Escapes only the characters in `special`.
fn escape_chars(text: &str, special: &[char]) -> String {
    let mut buf = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if !special.contains(&c) => buf.push(c),
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            c => buf.push(c),
        }
    }
    buf
}

/// Unescapes raw text, keeping it as is if it holds an unknown entity.
pub(crate) fn unescape_str(raw: &str) -> String {
    match unescape(raw.as_bytes()) {
        Ok(text) => String::from_utf8_lossy(&text).into_owned(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;
    use std::str::FromStr;

    #[test]
    fn test_children() {
        let xml = r#"<outer>
            inside outer
            <middle>
                <inner>
                    inside
                </inner>
                after inside
            </middle>
            <after>
                inside after
            </after>
        </outer>"#;
        let doc = Document::from_str(xml).unwrap();
        let outer = doc.root_element();
        let middle = outer.child_elements(&doc)[0];
        let inner = middle.child_elements(&doc)[0];
        let after = outer.child_elements(&doc)[1];
        assert_eq!(doc.container().child_elements(&doc).len(), 1);
        assert_eq!(outer.name(&doc), "outer");
        assert_eq!(middle.name(&doc), "middle");
        assert_eq!(inner.name(&doc), "inner");
        assert_eq!(after.name(&doc), "after");
        // whitespace is kept as text nodes
        assert_eq!(outer.children(&doc).len(), 5);
        assert_eq!(outer.child_elements(&doc).len(), 2);
        assert_eq!(middle.parent(&doc), Some(outer));
        assert_eq!(inner.text_content(&doc).trim(), "inside");
    }

    #[test]
    fn test_attribute_order_and_escape() {
        let xml = r#"<root b="2" a="&lt;1&gt;" c='3' />"#;
        let doc = Document::from_str(xml).unwrap();
        let root = doc.root_element();
        let keys: Vec<&str> = root
            .attributes(&doc)
            .iter()
            .map(|attr| attr.key())
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(root.attribute(&doc, "a"), Some("<1>"));
        assert!(root.has_attributes(&doc));
        assert_eq!(root.start_tag(&doc), r#"root b="2" a="&lt;1&gt;" c='3' "#);
    }

    #[test]
    fn test_edited_start_tag() {
        let xml = "<root b=\"'1'\" \n   a='1' c=\"x\" />";
        let mut doc = Document::from_str(xml).unwrap();
        let root = doc.root_element();
        root.set_attribute(&mut doc, "a", "x&y'\"");
        assert_eq!(
            root.start_tag(&doc),
            "root b=\"'1'\" \n   a='x&amp;y&apos;\"' c=\"x\" "
        );
        root.set_attribute(&mut doc, "d", "<\"");
        assert_eq!(
            root.start_tag(&doc),
            "root b=\"'1'\" \n   a='x&amp;y&apos;\"' c=\"x\" d=\"&lt;&quot;\" "
        );
        root.rename_attribute(&mut doc, "a", "c");
        assert_eq!(root.attributes(&doc).len(), 3);
        assert_eq!(root.attribute(&doc, "c"), Some("x&y'\""));
        assert_eq!(root.remove_attribute(&mut doc, "c"), Some("x&y'\"".to_string()));
        assert_eq!(root.remove_attribute(&mut doc, "d"), Some("<\"".to_string()));
        assert_eq!(root.start_tag(&doc), "root b=\"'1'\" ");
    }

    #[test]
    fn test_rename_keeps_tags() {
        let mut doc = Document::from_str("<root>\n  <a  x=\"'1'\">t</a >\n</root>").unwrap();
        let a = doc.root_element().child_elements(&doc)[0];
        a.set_name(&mut doc, "bcd");
        assert_eq!(a.start_tag(&doc), "bcd  x=\"'1'\"");
        assert_eq!(a.end_tag(&doc), "bcd ");
        assert_eq!(
            doc.serialize().unwrap(),
            "<root>\n  <bcd  x=\"'1'\">t</bcd >\n</root>"
        );
    }

    #[test]
    fn test_text_keeps_quotes() {
        let mut doc = Document::from_str("<root/>").unwrap();
        let root = doc.root_element();
        root.set_text_content(&mut doc, "it's \"a\" < b & c > d");
        assert_eq!(
            doc.serialize().unwrap(),
            "<root>it's \"a\" &lt; b &amp; c &gt; d</root>"
        );
        assert_eq!(root.text_content(&doc), "it's \"a\" < b & c > d");
    }
}
