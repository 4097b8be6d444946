#[cfg(test)]
mod tests {
    use sheetxml_core::constants::{DATA_TAG, HEADER_TAG, RECORD_TAG, ROOT_TAG, XML_NAMESPACE};
    use sheetxml_core::headers::{parse_header_fields, HeaderFieldSet};
    use sheetxml_core::source::{CellValue, TabularSource};
    use sheetxml_core::types::ConvertError;
    use sheetxml_core::xml::{build_document, parse_xml, to_pretty_string, to_pretty_xml};

    fn people() -> TabularSource {
        TabularSource::from_records(vec![vec![
            ("First Name", CellValue::from("Jo")),
            ("Age", CellValue::Float(30.0)),
        ]])
    }

    #[test]
    fn test_record_fields_use_sanitized_names() {
        let root = build_document(&HeaderFieldSet::new(), &people(), false).unwrap();
        assert_eq!(root.name, ROOT_TAG);
        assert_eq!(root.attribute("xmlns"), Some(XML_NAMESPACE));
        assert_eq!(root.attribute("schemaVersion"), Some("1.0"));

        let row = root.find("Data/Row").unwrap();
        let fields: Vec<_> = row.children.iter().map(|c| (c.name.as_str(), c.text.as_str())).collect();
        assert_eq!(fields, vec![("First_Name", "Jo"), ("Age", "30")]);
    }

    #[test]
    fn test_full_document_text() {
        let header = parse_header_fields(r#"[{"name":"Region","value":"North West"}]"#).unwrap();
        let root = build_document(&header, &people(), false).unwrap();
        let text = to_pretty_string(&root).unwrap();
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<ExcelConverter xmlns=\"http://www.example.com/xml/converter\" schemaVersion=\"1.0\">\n",
            "  <Header>\n",
            "    <Region>North West</Region>\n",
            "  </Header>\n",
            "  <Data>\n",
            "    <Row>\n",
            "      <First_Name>Jo</First_Name>\n",
            "      <Age>30</Age>\n",
            "    </Row>\n",
            "  </Data>\n",
            "</ExcelConverter>\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_missing_cell_keeps_empty_element() {
        let src = TabularSource::from_records(vec![
            vec![("Name", CellValue::from("Jo")), ("Age", CellValue::Integer(30))],
            vec![("Name", CellValue::from("Al"))],
        ]);
        let root = build_document(&HeaderFieldSet::new(), &src, false).unwrap();
        let rows: Vec<_> = root.child(DATA_TAG).unwrap().children_named(RECORD_TAG).collect();
        assert_eq!(rows.len(), 2);
        let age = rows[1].child("Age").unwrap();
        assert_eq!(age.text, "");

        let xml = to_pretty_string(&root).unwrap();
        assert!(xml.contains("      <Age></Age>\n"));
    }

    #[test]
    fn test_header_with_empty_source_is_empty_source() {
        let header: HeaderFieldSet = vec![("Region", "North West")].into_iter().collect();
        let src = TabularSource::new(vec!["Name".into()], vec![]);
        assert!(matches!(build_document(&header, &src, false), Err(ConvertError::EmptySource)));
    }

    #[test]
    fn test_unsanitizable_header_name_is_rejected() {
        let header: HeaderFieldSet = vec![("!!!", "x")].into_iter().collect();
        match build_document(&header, &people(), false) {
            Err(ConvertError::TagSanitization { name }) => assert_eq!(name, "!!!"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_rejects_header_names_needing_changes() {
        let header: HeaderFieldSet = vec![("Report Date", "2024-01-01")].into_iter().collect();
        assert!(build_document(&header, &people(), true).is_err());
        let root = build_document(&header, &people(), false).unwrap();
        assert_eq!(root.find("Header/Report_Date").unwrap().text, "2024-01-01");
    }

    #[test]
    fn test_serialization_is_byte_reproducible_and_parses_back() {
        let header: HeaderFieldSet = vec![("Batch", "<7> & \"q\"")].into_iter().collect();
        let root = build_document(&header, &people(), false).unwrap();
        let a = to_pretty_xml(&root).unwrap();
        let b = to_pretty_xml(&build_document(&header, &people(), false).unwrap()).unwrap();
        assert_eq!(a, b);

        let back = parse_xml(&a).unwrap();
        assert_eq!(back, root);
        assert_eq!(back.find("Header/Batch").unwrap().text, "<7> & \"q\"");
        assert!(back.child(HEADER_TAG).is_some());
    }
}
