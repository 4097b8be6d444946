//! xml/mod.rs
//! Document tree, builder and (de)serialization.

pub mod tree;
pub mod builder;
pub mod serialize;

pub use tree::Element;
pub use builder::{build_document, build_tree, column_tags};
pub use serialize::{parse_xml, to_pretty_string, to_pretty_xml};
