//! Layout of inserted elements and blank line compaction.
//!
//! New elements are laid out the way the surrounding file already is:
//! one element per line, indented like their siblings, using the
//! document's line ending.

use crate::document::{Document, Node};
use crate::element::Element;
use crate::eol::Eol;
use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_INDENT: &str = "  ";

/// Indentation of the line `element` starts on.
///
/// `None` if the element does not start its own line.
pub(crate) fn indent_of(document: &Document, element: Element) -> Option<String> {
    let parent = element.parent(document)?;
    let pos = parent.child_index(document, element)?;
    if pos == 0 {
        return None;
    }
    match &parent.children(document)[pos - 1] {
        Node::Text(text) => {
            let line_start = text.rfind('\n')? + 1;
            let indent = &text[line_start..];
            if indent.bytes().all(|b| b == b' ' || b == b'\t') {
                Some(indent.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// One level of indentation, taken from the root element's first child.
pub(crate) fn indent_unit(document: &Document) -> String {
    if let Some(indent) = &document.read_opts.indent {
        return indent.clone();
    }
    let root = document.root_element();
    let root_indent = indent_of(document, root).unwrap_or_default();
    root.child_elements(document)
        .first()
        .and_then(|first| indent_of(document, *first))
        .and_then(|indent| {
            indent
                .strip_prefix(root_indent.as_str())
                .filter(|unit| !unit.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

/// Indentation for a new child of `parent`.
pub(crate) fn child_indent(document: &Document, parent: Element) -> String {
    let last_on_own_line = parent
        .child_elements(document)
        .last()
        .and_then(|last| indent_of(document, *last));
    match last_on_own_line {
        Some(indent) => indent,
        None => {
            let mut indent = indent_of(document, parent).unwrap_or_default();
            indent.push_str(&indent_unit(document));
            indent
        }
    }
}

fn line_break(document: &Document, indent: &str) -> Node {
    let mut text = document.eol().as_str().to_string();
    text.push_str(indent);
    Node::Text(text)
}

/// Appends a detached `element` as the last child of `parent`, on its own line.
pub(crate) fn append_formatted(document: &mut Document, parent: Element, element: Element) {
    let indent = child_indent(document, parent);
    let children = parent.children(document);
    let only_empty_text = children
        .iter()
        .all(|node| matches!(node, Node::Text(text) if text.is_empty()));
    let before_closing = children
        .last()
        .filter(|node| node.is_blank_text())
        .map_or(false, |node| matches!(node, Node::Text(text) if text.contains('\n')));

    let open = line_break(document, &indent);

    if only_empty_text {
        // <Group /> or <Group></Group>
        let closing = line_break(document, &indent_of(document, parent).unwrap_or_default());
        if !parent.has_children(document) {
            parent.trim_tag_tail(document);
        }
        parent.clear_children(document);
        parent.push_child(document, open);
        parent.push_child(document, Node::Element(element));
        parent.push_child(document, closing);
    } else if before_closing {
        let pos = parent.children(document).len() - 1;
        parent.insert_child(document, pos, open);
        parent.insert_child(document, pos + 1, Node::Element(element));
    } else {
        parent.push_child(document, open);
        parent.push_child(document, Node::Element(element));
    }
}

/// Inserts a detached `element` right after `anchor`, with the same indentation.
pub(crate) fn insert_after_formatted(document: &mut Document, anchor: Element, element: Element) {
    let parent = match anchor.parent(document) {
        Some(parent) => parent,
        None => return,
    };
    let pos = match parent.child_index(document, anchor) {
        Some(pos) => pos,
        None => return,
    };
    match indent_of(document, anchor) {
        Some(indent) => {
            let open = line_break(document, &indent);
            parent.insert_child(document, pos + 1, open);
            parent.insert_child(document, pos + 2, Node::Element(element));
        }
        None => parent.insert_child(document, pos + 1, Node::Element(element)),
    }
}

static BLANK_LINE_CRLF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\r\n").unwrap());
static BLANK_LINE_LF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\n").unwrap());

/// Removes every line holding nothing but spaces and tabs.
pub(crate) fn compact_blank_lines(text: &str, eol: Eol) -> String {
    let blank_line = match eol {
        Eol::CrLf => &BLANK_LINE_CRLF,
        Eol::Lf => &BLANK_LINE_LF,
    };
    blank_line.replace_all(text, "").into_owned()
}
