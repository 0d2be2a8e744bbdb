use servicedoc_xlsx::common::errors::AppError;
use servicedoc_xlsx::xlsx::cell_address::{CellAddress, CellRange};
use servicedoc_xlsx::xlsx::shared_strings::SharedStrings;
use servicedoc_xlsx::xlsx::sheet_model::{CellValue, Worksheet};
use servicedoc_xlsx::xlsx::sheet_xml::SheetXml;
use servicedoc_xlsx::xlsx::templates::{SheetSpec, XlsxTemplates};
use servicedoc_xlsx::xlsx::TemplateWorkbook;

fn addr(a1: &str) -> CellAddress {
    CellAddress::parse(a1).expect("address")
}

fn range(a1: &str) -> CellRange {
    CellRange::parse(a1).expect("range")
}

const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="B2:C4"/><sheetData><row r="2" spans="2:3" ht="24" customHeight="1"><c r="B2" s="3" t="s"><v>0</v></c><c r="C2"><f>1+1</f><v>2</v></c></row><row r="3" s="5"><c r="B3" t="inlineStr"><is><t>sin formato</t></is></c></row><row r="4" s="6" customFormat="1"><c r="B4" t="inlineStr"><is><t>FLUJOGRAMA</t></is></c></row></sheetData><mergeCells count="1"><mergeCell ref="B2:C3"/></mergeCells><hyperlinks><hyperlink ref="C6" r:id="rId1" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/></hyperlinks><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#;

fn shared() -> SharedStrings {
    SharedStrings::parse(r#"<sst><si><t>CATEGORÍA</t></si></sst>"#).expect("sst")
}

fn parsed() -> Worksheet {
    SheetXml::parse(SHEET, &shared()).expect("parse")
}

fn row_tag(xml: &str, row: u32) -> &str {
    let start = xml.find(&format!(r#"<row r="{row}""#)).expect("row");
    let end = start + xml[start..].find('>').expect("row end");
    &xml[start..end]
}

fn template() -> Vec<u8> {
    let sheet = SheetSpec::new("Hoja1")
        .with_text(addr("B18"), "CATEGORÍA")
        .with_value(addr("C5"), CellValue::Number(12.5))
        .with_value(addr("D5"), CellValue::Boolean(true))
        .with_merge(CellRange::parse("B18:B19").expect("range"))
        .with_merge(CellRange::parse("B40:G41").expect("range"))
        .with_text(addr("B40"), "FLUJOGRAMA")
        .with_row_height(40, 30.0)
        .with_extra_xml(
            r#"<dataValidations count="1"><dataValidation type="list" sqref="G45 H10"><formula1>"Sí,No"</formula1></dataValidation></dataValidations>"#,
        );
    XlsxTemplates::workbook(&[sheet], false).expect("template")
}

#[test]
fn template_values_are_decoded() {
    let workbook = TemplateWorkbook::open(&template(), "Hoja1").expect("open");
    let sheet = workbook.sheet();
    assert_eq!(sheet.text(addr("B18")), "CATEGORÍA");
    assert_eq!(sheet.value(addr("C5")), CellValue::Number(12.5));
    assert_eq!(sheet.value(addr("D5")), CellValue::Boolean(true));
    assert_eq!(sheet.value(addr("Z99")), CellValue::Empty);
    assert_eq!(sheet.merges().len(), 2);
    assert_eq!(sheet.row_height(40), Some(30.0));
}

#[test]
fn untouched_cells_survive_a_save() {
    let mut workbook = TemplateWorkbook::open(&template(), "Hoja1").expect("open");
    workbook
        .sheet_mut()
        .set_value(addr("C6"), CellValue::text("nuevo & <texto>"));
    let bytes = workbook.to_bytes().expect("save");

    let reopened = TemplateWorkbook::open(&bytes, "Hoja1").expect("reopen");
    let sheet = reopened.sheet();
    assert_eq!(sheet.text(addr("B18")), "CATEGORÍA");
    assert_eq!(sheet.value(addr("C5")), CellValue::Number(12.5));
    assert_eq!(sheet.text(addr("C6")), "nuevo & <texto>");
}

#[test]
fn inserted_rows_move_cells_merges_heights_and_references() {
    let mut workbook = TemplateWorkbook::open(&template(), "Hoja1").expect("open");
    workbook.insert_rows(40, 5).expect("insert");
    let bytes = workbook.to_bytes().expect("save");

    let reopened = TemplateWorkbook::open(&bytes, "Hoja1").expect("reopen");
    let sheet = reopened.sheet();
    assert_eq!(sheet.text(addr("B45")), "FLUJOGRAMA");
    assert_eq!(sheet.text(addr("B40")), "");
    assert_eq!(sheet.row_height(45), Some(30.0));
    assert_eq!(
        sheet.merge_at(addr("C46")),
        Some(CellRange::parse("B45:G46").expect("range"))
    );
    assert_eq!(
        sheet.merge_at(addr("B19")),
        Some(CellRange::parse("B18:B19").expect("range"))
    );
    assert!(sheet.tail_xml().contains(r#"sqref="G50 H10""#));
    assert_eq!(sheet.used_range().expect("used").to_a1(), "B5:G46");
}

#[test]
fn parse_reads_values_rows_and_merges() {
    let sheet = parsed();
    assert_eq!(sheet.text(addr("B2")), "CATEGORÍA");
    assert_eq!(sheet.value(addr("C2")), CellValue::Number(2.0));
    assert_eq!(sheet.text(addr("B4")), "FLUJOGRAMA");
    assert_eq!(sheet.style(addr("B2")), Some(3));
    assert_eq!(sheet.row_height(2), Some(24.0));
    assert_eq!(sheet.merges().len(), 1);
    assert!(!sheet.tail_xml().contains("mergeCells"));
}

#[test]
fn render_keeps_template_cells_and_places_merges_before_hyperlinks() {
    let xml = SheetXml::render(&parsed()).expect("render");
    assert!(xml.contains(r#"<c r="C2"><f>1+1</f><v>2</v></c>"#));
    let merges = xml.find("<mergeCells").expect("merges");
    let links = xml.find("<hyperlinks").expect("hyperlinks");
    assert!(merges < links);
    assert!(xml.ends_with("</worksheet>"));
}

#[test]
fn row_custom_format_flag_is_written_back_as_parsed() {
    let sheet = parsed();
    assert!(!sheet.row(3).expect("row 3").custom_format);
    assert!(sheet.row(4).expect("row 4").custom_format);

    let xml = SheetXml::render(&sheet).expect("render");
    let unformatted = row_tag(&xml, 3);
    assert!(unformatted.contains(r#"s="5""#));
    assert!(!unformatted.contains("customFormat"));
    let formatted = row_tag(&xml, 4);
    assert!(formatted.contains(r#"s="6""#));
    assert!(formatted.contains(r#"customFormat="1""#));
}

#[test]
fn parsed_rows_shift_with_merges_and_tail_refs() {
    let mut sheet = parsed();
    sheet.insert_rows(3, 2).expect("insert");
    assert_eq!(sheet.text(addr("B6")), "FLUJOGRAMA");
    assert_eq!(sheet.text(addr("B5")), "sin formato");
    assert_eq!(sheet.merges()[0].to_a1(), "B2:C5");
    assert!(sheet.tail_xml().contains(r#"ref="C8""#));

    let xml = SheetXml::render(&sheet).expect("render");
    assert!(xml.contains(r#"<c r="B6" t="inlineStr">"#));
    assert!(xml.contains(r#"<dimension ref="B2:C6"/>"#));
    assert!(row_tag(&xml, 6).contains(r#"customFormat="1""#));
}

#[test]
fn written_text_replaces_shared_string_cell() {
    let mut sheet = parsed();
    sheet.set_value(addr("B2"), CellValue::text("A & B <1>"));
    assert_eq!(sheet.text(addr("B2")), "A & B <1>");
    let xml = SheetXml::render(&sheet).expect("render");
    assert!(xml.contains("A &amp; B &lt;1&gt;"));
    assert!(!xml.contains(r#"t="s""#));
    assert!(xml.contains(r#"<c r="B2" s="3" t="inlineStr">"#));
}

#[test]
fn merge_rejects_overlap_and_skips_single_cells() {
    let mut sheet = Worksheet::default();
    assert!(sheet.merge(range("B20:B21")).expect("merge"));
    assert!(!sheet.merge(range("C20")).expect("single"));
    let err = sheet.merge(range("B21:C22")).expect_err("overlap");
    assert!(matches!(err, AppError::MergeConflict(_)));
    assert_eq!(sheet.merges().len(), 1);
}

#[test]
fn unmerge_reports_whether_a_merge_was_removed() {
    let mut sheet = Worksheet::default();
    sheet.merge(range("B20:D20")).expect("merge");
    assert!(!sheet.unmerge_at(addr("E20")));
    assert!(sheet.unmerge_at(addr("C20")));
    assert!(!sheet.unmerge_at(addr("C20")));
}

#[test]
fn used_range_covers_cells_and_merges() {
    let mut sheet = Worksheet::default();
    sheet.set_value(addr("C3"), CellValue::Number(1.0));
    sheet.merge(range("B5:E6")).expect("merge");
    assert_eq!(sheet.used_range().expect("used").to_a1(), "B3:E6");
    assert_eq!(sheet.last_row(), 3);
}
