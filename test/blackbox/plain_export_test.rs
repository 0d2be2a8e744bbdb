mod common;

use common::{addr, category, document, field, item, subcategory};
use servicedoc_xlsx::document::{FieldType, Item};
use servicedoc_xlsx::render::plain::{PlainExporter, PLAIN_SHEET_NAME};
use servicedoc_xlsx::xlsx::package::XlsxPackage;
use servicedoc_xlsx::xlsx::workbook_xml::WorkbookXml;
use servicedoc_xlsx::xlsx::TemplateWorkbook;

#[test]
fn flat_export_lists_one_row_per_item() {
    let mut first = item("Cambiar batería", 0);
    first.additional_fields = vec![
        field("Serie", FieldType::Number),
        field("Foto", FieldType::File),
    ];
    first.additional_fields[0].required = true;
    let second = Item {
        approvers: "Ana".to_string(),
        notes: "Solo horario laboral".to_string(),
        ..item("Instalar Office", 0)
    };
    let doc = document(vec![
        category("Hardware", vec![subcategory("Laptops", "Jane\nBob", vec![first])]),
        category("Software", vec![subcategory("Office", "Luis", vec![second])]),
    ]);

    let bytes = PlainExporter::export(&doc).expect("export");
    let package = XlsxPackage::from_bytes(&bytes).expect("package");
    assert_eq!(
        WorkbookXml::sheet_names(&package).expect("names"),
        vec![PLAIN_SHEET_NAME.to_string()]
    );

    let workbook = TemplateWorkbook::open(&bytes, PLAIN_SHEET_NAME).expect("open");
    let sheet = workbook.sheet();
    assert_eq!(sheet.text(addr("A1")), "Categoría");
    assert_eq!(sheet.text(addr("K1")), "Observaciones");
    assert_eq!(sheet.text(addr("A2")), "Hardware");
    assert_eq!(sheet.text(addr("D2")), "Serie* (Número), Foto (Archivo)");
    assert_eq!(sheet.text(addr("F2")), "Nivel 1\nMesa de ayuda\nSoporte en sitio");
    assert_eq!(sheet.text(addr("I2")), "Jane\nBob");
    assert_eq!(sheet.text(addr("I3")), "Ana");
    assert_eq!(sheet.text(addr("K3")), "Solo horario laboral");
    assert!(sheet.merges().is_empty());

    let header = sheet.style(addr("A1")).expect("header style");
    assert_eq!(sheet.style(addr("K1")), Some(header));
    assert_eq!(sheet.style(addr("A2")), None);

    let styles = package.read_part_string("xl/styles.xml").expect("styles");
    assert!(styles.contains(r#"rgb="FFE0E0E0""#));
    let sheet_xml = package
        .read_part_string("xl/worksheets/sheet1.xml")
        .expect("sheet xml");
    assert!(sheet_xml.contains(r#"<col min="4" max="4" width="40" customWidth="1"/>"#));
}

#[test]
fn flat_export_of_empty_document_has_only_the_header() {
    let bytes = PlainExporter::export(&document(vec![])).expect("export");
    let workbook = TemplateWorkbook::open(&bytes, PLAIN_SHEET_NAME).expect("open");
    assert_eq!(workbook.sheet().last_row(), 1);
}
