use crate::document::Document;
use crate::element::Element;

/// Locates elements by `group`, then `node`, then attribute key and value.
///
/// Groups are the direct children of the root element, nodes the direct
/// children of a group. Every group with a matching tag is searched, not
/// just the first one.
///
/// ```
/// use csproj_edit::{Address, Document};
/// use std::str::FromStr;
///
/// let doc = Document::from_str(r#"<Project>
///   <ItemGroup><Compile Include="App.cs" /></ItemGroup>
///   <ItemGroup><Compile Include="Lib.cs" /></ItemGroup>
/// </Project>"#).unwrap();
/// let all = doc.resolve(&Address::group("ItemGroup").node("Compile"));
/// assert_eq!(all.len(), 2);
/// let lib = doc.resolve(&Address::group("ItemGroup").node("Compile").attribute("Include").value("Lib.cs"));
/// assert_eq!(lib.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address<'a> {
    group: &'a str,
    node: Option<&'a str>,
    key: Option<&'a str>,
    value: Option<&'a str>,
}

impl<'a> Address<'a> {
    pub fn group(group: &'a str) -> Address<'a> {
        Address {
            group,
            node: None,
            key: None,
            value: None,
        }
    }

    pub fn node(self, node: &'a str) -> Address<'a> {
        Address {
            node: Some(node),
            ..self
        }
    }

    /// Keep elements that carry the attribute `key`.
    pub fn attribute(self, key: &'a str) -> Address<'a> {
        Address {
            key: Some(key),
            ..self
        }
    }

    /// Keep elements whose attribute equals `value`. Needs [`Address::attribute()`].
    pub fn value(self, value: &'a str) -> Address<'a> {
        Address {
            value: Some(value),
            ..self
        }
    }

    fn accepts(&self, document: &Document, element: Element) -> bool {
        match (self.key, self.value) {
            (Some(key), Some(value)) => element.attribute(document, key) == Some(value),
            (Some(key), None) => element.attribute(document, key).is_some(),
            (None, _) => true,
        }
    }
}

// Addressing
impl Document {
    /// All elements matching `address`, in document order. Never fails,
    /// an address that matches nothing gives an empty `Vec`.
    pub fn resolve(&self, address: &Address) -> Vec<Element> {
        let groups = self
            .root_element()
            .child_elements(self)
            .into_iter()
            .filter(|group| group.name(self) == address.group);
        let found: Vec<Element> = match address.node {
            Some(node) => groups
                .flat_map(|group| group.child_elements(self))
                .filter(|elem| elem.name(self) == node)
                .collect(),
            None => groups.collect(),
        };
        found
            .into_iter()
            .filter(|elem| address.accepts(self, *elem))
            .collect()
    }

    pub(crate) fn groups(&self, group: &str) -> Vec<Element> {
        self.resolve(&Address::group(group))
    }

    pub(crate) fn nodes(&self, group: &str, node: &str) -> Vec<Element> {
        self.resolve(&Address::group(group).node(node))
    }
}

// Existence and retrieval
impl Document {
    pub fn exists_group(&self, group: &str) -> bool {
        !self.groups(group).is_empty()
    }

    pub fn exists_node(&self, group: &str, node: &str) -> bool {
        !self.nodes(group, node).is_empty()
    }

    /// A node whose text equals `value` exists.
    pub fn exists_node_value(&self, group: &str, node: &str, value: &str) -> bool {
        self.nodes(group, node)
            .into_iter()
            .any(|elem| elem.text_content(self) == value)
    }

    pub fn exists_attribute(&self, group: &str, node: &str, key: &str) -> bool {
        !self
            .resolve(&Address::group(group).node(node).attribute(key))
            .is_empty()
    }

    pub fn exists_attribute_value(&self, group: &str, node: &str, key: &str, value: &str) -> bool {
        !self
            .resolve(&Address::group(group).node(node).attribute(key).value(value))
            .is_empty()
    }

    /// Tag of every group named `group`, one entry per occurrence.
    pub fn get_group(&self, group: &str) -> Vec<String> {
        self.groups(group)
            .into_iter()
            .map(|elem| elem.name(self).to_string())
            .collect()
    }

    /// Tags of all groups, in document order.
    pub fn get_groups(&self) -> Vec<String> {
        self.root_element()
            .child_elements(self)
            .into_iter()
            .map(|elem| elem.name(self).to_string())
            .collect()
    }

    /// Tag of every matching node, one entry per occurrence.
    pub fn get_node(&self, group: &str, node: &str) -> Vec<String> {
        self.nodes(group, node)
            .into_iter()
            .map(|elem| elem.name(self).to_string())
            .collect()
    }

    /// Tags of all nodes inside every group named `group`.
    pub fn get_nodes(&self, group: &str) -> Vec<String> {
        self.groups(group)
            .into_iter()
            .flat_map(|elem| elem.child_elements(self))
            .map(|elem| elem.name(self).to_string())
            .collect()
    }

    /// Text of every matching node.
    pub fn get_node_value(&self, group: &str, node: &str) -> Vec<String> {
        self.nodes(group, node)
            .into_iter()
            .map(|elem| elem.text_content(self))
            .collect()
    }

    /// Key of the first attribute of every matching node.
    /// Nodes without attributes are skipped, duplicates are kept.
    pub fn get_attribute(&self, group: &str, node: &str) -> Vec<String> {
        self.nodes(group, node)
            .into_iter()
            .filter_map(|elem| {
                let first = elem.attributes(self).first()?;
                Some(first.key().to_string())
            })
            .collect()
    }

    /// Value of `key` on every matching node that has it.
    pub fn get_attribute_value(&self, group: &str, node: &str, key: &str) -> Vec<String> {
        self.nodes(group, node)
            .into_iter()
            .filter_map(|elem| elem.attribute(self, key).map(str::to_string))
            .collect()
    }
}
