use crate::document::Document;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::format::{append_formatted, compact_blank_lines, insert_after_formatted};
use crate::parser::DocumentParser;

/// How a replace operation rewrites an attribute key or group tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rename<'a> {
    /// Replace the whole name.
    To(&'a str),
    /// Replace every occurrence of `pattern` inside the name,
    /// e.g. `Include` with `In` -> `Ex` becomes `Exclude`.
    Substitute {
        pattern: &'a str,
        replacement: &'a str,
    },
}

impl Rename<'_> {
    pub fn apply(&self, name: &str) -> String {
        match *self {
            Rename::To(new_name) => new_name.to_string(),
            Rename::Substitute { pattern, .. } if pattern.is_empty() => name.to_string(),
            Rename::Substitute {
                pattern,
                replacement,
            } => name.replace(pattern, replacement),
        }
    }
}

// Insert
impl Document {
    /// Appends `<tag>text</tag>` to the first group named `group`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingContainer`]: There is no group named `group`.
    pub fn insert_node(&mut self, group: &str, tag: &str, text: &str) -> Result<()> {
        let target = self.first_group(group)?;
        let element = Element::new(self, tag);
        element.set_text_content(self, text);
        append_formatted(self, target, element);
        Ok(())
    }

    /// Adds a new `node` element carrying `key="value"`.
    ///
    /// Never modifies an existing element: the new one goes right after the
    /// first node accepted by `predicate`, or at the end of the first group
    /// when no node is accepted. A node with N occurrences has N + 1 afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingContainer`]: There is no group named `group`.
    pub fn insert_attribute<F>(
        &mut self,
        group: &str,
        node: &str,
        key: &str,
        value: &str,
        predicate: F,
    ) -> Result<()>
    where
        F: Fn(&Document, Element) -> bool,
    {
        let target = self.first_group(group)?;
        let anchor = self
            .nodes(group, node)
            .into_iter()
            .find(|elem| predicate(self, *elem));
        let element = Element::new(self, node);
        element.set_attribute(self, key, value);
        match anchor {
            Some(anchor) => insert_after_formatted(self, anchor, element),
            None => append_formatted(self, target, element),
        }
        Ok(())
    }

    /// Appends a new, empty group to the root element, even if one with
    /// the same tag already exists.
    pub fn insert_group(&mut self, tag: &str) {
        let root = self.root_element();
        let element = Element::new(self, tag);
        append_formatted(self, root, element);
    }

    fn first_group(&self, group: &str) -> Result<Element> {
        self.groups(group)
            .first()
            .copied()
            .ok_or_else(|| Error::MissingContainer {
                group: group.to_string(),
            })
    }
}

// Set
impl Document {
    /// Sets `key="value"` on the first node accepted by `predicate`.
    ///
    /// Does nothing if there is no such node. The number of nodes never changes.
    pub fn set_attribute<F>(&mut self, group: &str, node: &str, key: &str, value: &str, predicate: F)
    where
        F: Fn(&Document, Element) -> bool,
    {
        let target = self
            .nodes(group, node)
            .into_iter()
            .find(|elem| predicate(self, *elem));
        if let Some(target) = target {
            target.set_attribute(self, key, value);
        }
    }

    /// Replaces the text of the first node accepted by `predicate`.
    ///
    /// Does nothing if there is no such node.
    pub fn set_node_value<F>(&mut self, group: &str, node: &str, value: &str, predicate: F)
    where
        F: Fn(&Document, Element) -> bool,
    {
        let target = self
            .nodes(group, node)
            .into_iter()
            .find(|elem| predicate(self, *elem));
        if let Some(target) = target {
            target.set_text_content(self, value);
        }
    }
}

// Replace
impl Document {
    /// Renames attribute `key` on every node where it currently equals `value`.
    /// The value itself is kept.
    ///
    /// Does nothing if no node has `key="value"`.
    pub fn replace_attribute(
        &mut self,
        group: &str,
        node: &str,
        key: &str,
        value: &str,
        rename: Rename<'_>,
    ) {
        let new_key = rename.apply(key);
        if new_key == key {
            return;
        }
        for elem in self.nodes(group, node) {
            if elem.attribute(self, key) == Some(value) {
                elem.rename_attribute(self, key, &new_key);
            }
        }
    }

    /// Renames every group named `tag`. Does nothing if there is none.
    pub fn replace_group(&mut self, tag: &str, rename: Rename<'_>) {
        let new_tag = rename.apply(tag);
        if new_tag == tag {
            return;
        }
        for group in self.groups(tag) {
            group.set_name(self, new_tag.as_str());
        }
    }
}

// Remove
impl Document {
    /// Removes `key` from every node where it equals `value`.
    pub fn remove_attribute(&mut self, group: &str, node: &str, key: &str, value: &str) {
        for elem in self.nodes(group, node) {
            if elem.attribute(self, key) == Some(value) {
                elem.remove_attribute(self, key);
            }
        }
    }

    /// Removes every matching node. The lines they were on stay, blank.
    pub fn remove_node(&mut self, group: &str, node: &str) {
        for elem in self.nodes(group, node) {
            elem.detatch(self);
        }
    }

    /// Removes every group named `tag` with all of its content.
    ///
    /// With `leave_blank_line`, one blank line remains where each group was.
    /// Otherwise every blank line of the whole document is removed afterwards,
    /// including ones that were there before.
    ///
    /// # Errors
    ///
    /// Only fails if the compacted document cannot be read back, which
    /// would mean the document was not well formed to begin with.
    pub fn remove_group(&mut self, tag: &str, leave_blank_line: bool) -> Result<()> {
        let groups = self.groups(tag);
        if groups.is_empty() {
            return Ok(());
        }
        for group in groups {
            group.detatch(self);
        }
        if !leave_blank_line {
            self.compact()?;
        }
        Ok(())
    }

    /// Drops all blank lines by rewriting the document from its compacted text.
    fn compact(&mut self) -> Result<()> {
        let text = self.serialize()?;
        let compacted = compact_blank_lines(&text, self.eol);
        if compacted == text {
            return Ok(());
        }
        let mut fresh = DocumentParser::parse_str(&compacted, self.encoding, self.read_opts.clone())?;
        fresh.eol = self.eol;
        *self = fresh;
        Ok(())
    }
}
