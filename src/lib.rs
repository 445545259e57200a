//! Edit msbuild style project files (`.csproj` and friends) from code,
//! without touching the bytes you did not mean to change.
//!
//! A [`Document`] is read once, edited through string addresses of the form
//! `group` / `node` / attribute, and serialized again. Line endings,
//! indentation, attribute quoting, comments and the file encoding all
//! survive the round trip; inserted elements follow the file's own layout.
//!
//! The four kinds of edits behave differently on purpose:
//!
//! - `insert_*` always adds, and fails with [`Error::MissingContainer`]
//!   if the group to insert into does not exist.
//! - `set_*` changes an existing element in place, or does nothing.
//! - `replace_*` renames, but only where the current value matches.
//! - `remove_*` deletes, and does nothing if nothing matches.
//!
//! ```
//! use csproj_edit::{Document, Rename};
//! use std::str::FromStr;
//!
//! let mut doc = Document::from_str("<Project>\r\n  <ItemGroup>\r\n    <Compile Include=\"App.cs\" />\r\n  </ItemGroup>\r\n</Project>\r\n").unwrap();
//! doc.replace_attribute("ItemGroup", "Compile", "Include", "App.cs", Rename::Substitute { pattern: "In", replacement: "Ex" });
//! assert!(doc.exists_attribute_value("ItemGroup", "Compile", "Exclude", "App.cs"));
//! assert_eq!(
//!     doc.serialize().unwrap(),
//!     "<Project>\r\n  <ItemGroup>\r\n    <Compile Exclude=\"App.cs\" />\r\n  </ItemGroup>\r\n</Project>\r\n"
//! );
//! ```

mod address;
mod document;
mod edit;
mod element;
mod eol;
mod error;
mod format;
mod io;
mod parser;

pub use crate::address::Address;
pub use crate::document::{Document, Node};
pub use crate::edit::Rename;
pub use crate::element::{Attribute, Element};
pub use crate::eol::Eol;
pub use crate::error::{Error, Result};
pub use crate::parser::ReadOptions;
pub use encoding_rs;
