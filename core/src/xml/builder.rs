// ## 📂 File: `src/xml/builder.rs`

//! xml/builder.rs
//! Header fields + rows -> document tree.
//!
//! Shape (fixed):
//! ```text
//! <ExcelConverter xmlns=".." schemaVersion="1.0">
//!   <Header> <Field>value</Field> ... </Header>   only when fields were supplied
//!   <Data>
//!     <Row> <Column>text</Column> ... </Row>       one per source row, source order
//!   </Data>
//! </ExcelConverter>
//! ```
//!
//! Design notes:
//! - Column tags are computed once and reused for every row.
//! - Duplicate sanitized column tags: the first keeps the tag, later ones get the
//!   smallest free `.N` suffix. Duplicate header names: last value, first position.
//! - The builder is pure. Same input, same tree.

use std::collections::{HashMap, HashSet};

use crate::constants::{DATA_TAG, HEADER_TAG, RECORD_TAG, ROOT_TAG, XML_NAMESPACE, XML_SCHEMA_VERSION};
use crate::headers::HeaderFieldSet;
use crate::sanitize::{sanitize_header_name, sanitize_tag};
use crate::source::{coerce, CellValue, TabularSource};
use crate::types::ConvertError;
use crate::utils::xml_safe_text;
use crate::xml::tree::Element;

/// Sanitize column names and make the resulting tags unique.
pub fn column_tags(column_order: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(column_order.len());
    column_order
        .iter()
        .map(|name| {
            let base = sanitize_tag(name);
            let tag = if taken.contains(&base) {
                let mut n = 1usize;
                loop {
                    let candidate = format!("{}.{}", base, n);
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                    n += 1;
                }
            } else {
                base
            };
            taken.insert(tag.clone());
            tag
        })
        .collect()
}

/// Sanitized header entries with duplicates folded.
fn header_entries(fields: &HeaderFieldSet, strict: bool) -> Result<Vec<(String, String)>, ConvertError> {
    let mut entries: Vec<(String, String)> = Vec::with_capacity(fields.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(fields.len());

    for field in fields {
        let tag = sanitize_header_name(&field.name, strict)?;
        let value = xml_safe_text(&field.value).into_owned();
        match index.get(&tag) {
            Some(&pos) => entries[pos].1 = value,
            None => {
                index.insert(tag.clone(), entries.len());
                entries.push((tag, value));
            }
        }
    }
    Ok(entries)
}

/// Assemble the document tree.
///
/// Errors:
/// - `EmptySource` when `rows` is empty (checked first).
/// - `TagSanitization` when a header name has no usable characters, or in
///   strict mode is not already a valid tag.
pub fn build_tree(
    header_fields: &HeaderFieldSet,
    rows: &[Vec<CellValue>],
    column_order: &[String],
    strict: bool,
) -> Result<Element, ConvertError> {
    if rows.is_empty() {
        return Err(ConvertError::EmptySource);
    }

    let mut root = Element::new(ROOT_TAG)
        .with_attribute("xmlns", XML_NAMESPACE)
        .with_attribute("schemaVersion", XML_SCHEMA_VERSION);

    if !header_fields.is_empty() {
        let mut header = Element::new(HEADER_TAG);
        for (tag, value) in header_entries(header_fields, strict)? {
            header.push(Element::leaf(tag, value));
        }
        root.push(header);
    }

    let tags = column_tags(column_order);
    let mut data = Element::new(DATA_TAG);
    data.children.reserve(rows.len());
    for row in rows {
        let mut record = Element::new(RECORD_TAG);
        record.children.reserve(tags.len());
        for (idx, tag) in tags.iter().enumerate() {
            let text = row.get(idx).map(coerce).unwrap_or_default();
            record.push(Element::leaf(tag.clone(), xml_safe_text(&text).into_owned()));
        }
        data.push(record);
    }
    root.push(data);

    Ok(root)
}

/// `build_tree` over a whole `TabularSource`.
pub fn build_document(header_fields: &HeaderFieldSet, source: &TabularSource, strict: bool) -> Result<Element, ConvertError> {
    build_tree(header_fields, &source.rows, &source.columns, strict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicate_columns_get_numbered_suffixes() {
        let tags = column_tags(&names(&["Amount", "Amount", "Amount ", "Amount.1", "$$"]));
        assert_eq!(tags, vec!["Amount", "Amount.1", "Amount_", "Amount.1.1", "EMPTY_TAG"]);
    }

    #[test]
    fn duplicate_header_names_keep_first_position_last_value() {
        let fields: HeaderFieldSet = vec![("Region", "North"), ("Batch", "7"), ("Region", "South")]
            .into_iter()
            .collect();
        let root = build_tree(&fields, &[vec![CellValue::Integer(1)]], &names(&["A"]), false).unwrap();
        let header = root.child(HEADER_TAG).unwrap();
        let got: Vec<_> = header.children.iter().map(|c| (c.name.as_str(), c.text.as_str())).collect();
        assert_eq!(got, vec![("Region", "South"), ("Batch", "7")]);
    }

    #[test]
    fn header_section_only_when_fields_present() {
        let root = build_tree(&HeaderFieldSet::new(), &[vec![CellValue::Missing]], &names(&["A"]), false).unwrap();
        assert!(root.child(HEADER_TAG).is_none());
        assert_eq!(root.find("Data/Row/A").map(|e| e.text.as_str()), Some(""));
    }

    #[test]
    fn empty_rows_fail_before_header_checks() {
        let fields: HeaderFieldSet = vec![("***", "x")].into_iter().collect();
        assert!(matches!(build_tree(&fields, &[], &names(&["A"]), false), Err(ConvertError::EmptySource)));
    }

    #[test]
    fn control_characters_dropped_from_text() {
        let root = build_tree(
            &HeaderFieldSet::new(),
            &[vec![CellValue::from("a\u{0}b")]],
            &names(&["A"]),
            false,
        )
        .unwrap();
        assert_eq!(root.find("Data/Row/A").map(|e| e.text.as_str()), Some("ab"));
    }
}
