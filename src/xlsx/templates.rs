use crate::common::errors::AppError;
use crate::xlsx::cell_address::{CellAddress, CellRange};
use crate::xlsx::content_types::DRAWING_CONTENT_TYPE;
use crate::xlsx::package::{XlsxPackage, CONTENT_TYPES_PART};
use crate::xlsx::relationships::{
    Relationships, REL_TYPE_CALC_CHAIN, REL_TYPE_DRAWING, REL_TYPE_OFFICE_DOCUMENT,
    REL_TYPE_SHARED_STRINGS, REL_TYPE_STYLES, REL_TYPE_WORKSHEET,
};
use crate::xlsx::sheet_model::CellValue;
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Cursor;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

#[derive(Debug, Clone, Default)]
pub struct SheetSpec {
    pub name: String,
    pub cells: Vec<(CellAddress, CellValue)>,
    pub merges: Vec<CellRange>,
    pub row_heights: Vec<(u32, f64)>,
    pub column_widths: Vec<(u32, f64)>,
    pub drawing_xml: Option<String>,
    // Elements written between `mergeCells` and `pageMargins`, in schema order.
    pub extra_xml: Option<String>,
}

impl SheetSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, addr: CellAddress, value: CellValue) -> Self {
        self.cells.push((addr, value));
        self
    }

    pub fn with_text(self, addr: CellAddress, text: &str) -> Self {
        self.with_value(addr, CellValue::text(text))
    }

    pub fn with_merge(mut self, range: CellRange) -> Self {
        self.merges.push(range);
        self
    }

    pub fn with_row_height(mut self, row: u32, height: f64) -> Self {
        self.row_heights.push((row, height));
        self
    }

    pub fn with_column_width(mut self, col: u32, width: f64) -> Self {
        self.column_widths.push((col, width));
        self
    }

    pub fn with_drawing(mut self, drawing_xml: &str) -> Self {
        self.drawing_xml = Some(drawing_xml.to_string());
        self
    }

    pub fn with_extra_xml(mut self, xml: &str) -> Self {
        self.extra_xml = Some(xml.to_string());
        self
    }
}

pub struct XlsxTemplates;

impl XlsxTemplates {
    pub fn blank_workbook(sheet_name: &str) -> Result<Vec<u8>, AppError> {
        Self::workbook(&[SheetSpec::new(sheet_name)], false)
    }

    pub fn workbook(sheets: &[SheetSpec], with_calc_chain: bool) -> Result<Vec<u8>, AppError> {
        if sheets.is_empty() {
            return Err(AppError::InvalidInput(
                "a workbook needs at least one sheet".to_string(),
            ));
        }

        let mut package = XlsxPackage::new();
        let mut shared: Vec<String> = Vec::new();
        let mut overrides: Vec<(String, &str)> = vec![
            (
                "/xl/workbook.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ),
            (
                "/xl/styles.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
            ),
            (
                "/xl/sharedStrings.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
            ),
        ];

        let mut workbook_rels = Relationships::default();
        let mut sheet_entries = String::new();

        for (index, sheet) in sheets.iter().enumerate() {
            let number = index + 1;
            let part = format!("xl/worksheets/sheet{number}.xml");
            let rel_id = workbook_rels.add(REL_TYPE_WORKSHEET, &format!("worksheets/sheet{number}.xml"));
            sheet_entries.push_str(&format!(
                r#"<sheet name="{}" sheetId="{number}" r:id="{rel_id}"/>"#,
                XmlUtil::escape_attr(&sheet.name)
            ));

            let drawing_rel = match &sheet.drawing_xml {
                Some(drawing) => {
                    let drawing_part = format!("xl/drawings/drawing{number}.xml");
                    package.set_part(&drawing_part, drawing.as_bytes().to_vec());
                    let mut sheet_rels = Relationships::default();
                    let id = sheet_rels.add(REL_TYPE_DRAWING, &format!("../drawings/drawing{number}.xml"));
                    package.set_part(
                        &format!("xl/worksheets/_rels/sheet{number}.xml.rels"),
                        sheet_rels.render().into_bytes(),
                    );
                    overrides.push((format!("/{drawing_part}"), DRAWING_CONTENT_TYPE));
                    Some(id)
                }
                None => None,
            };

            let xml = Self::sheet_xml(sheet, &mut shared, drawing_rel.as_deref())?;
            package.set_part(&part, xml.into_bytes());
            overrides.push((
                format!("/{part}"),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            ));
        }

        workbook_rels.add(REL_TYPE_STYLES, "styles.xml");
        workbook_rels.add(REL_TYPE_SHARED_STRINGS, "sharedStrings.xml");
        if with_calc_chain {
            workbook_rels.add(REL_TYPE_CALC_CHAIN, "calcChain.xml");
            package.set_part("xl/calcChain.xml", Self::calc_chain_xml().as_bytes().to_vec());
            overrides.push((
                "/xl/calcChain.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml",
            ));
        }

        let mut root_rels = Relationships::default();
        root_rels.add(REL_TYPE_OFFICE_DOCUMENT, "xl/workbook.xml");

        package.set_part(
            CONTENT_TYPES_PART,
            Self::content_types_xml(&overrides).into_bytes(),
        );
        package.set_part("_rels/.rels", root_rels.render().into_bytes());
        package.set_part("xl/workbook.xml", Self::workbook_xml(&sheet_entries).into_bytes());
        package.set_part("xl/_rels/workbook.xml.rels", workbook_rels.render().into_bytes());
        package.set_part("xl/styles.xml", Self::styles_xml().as_bytes().to_vec());
        package.set_part(
            "xl/sharedStrings.xml",
            Self::shared_strings_xml(&shared)?.into_bytes(),
        );

        package.to_bytes()
    }

    fn content_types_xml(overrides: &[(String, &str)]) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        for (part, content_type) in overrides {
            out.push_str(&format!(
                r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
            ));
        }
        out.push_str("</Types>");
        out
    }

    fn workbook_xml(sheet_entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{MAIN_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView/></bookViews><sheets>{sheet_entries}</sheets></workbook>"#
        )
    }

    pub fn styles_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#
    }

    fn calc_chain_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<calcChain xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><c r="A1" i="1"/></calcChain>"#
    }

    fn shared_strings_xml(strings: &[String]) -> Result<String, AppError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut sst = BytesStart::new("sst");
        sst.push_attribute(("xmlns", MAIN_NS));
        sst.push_attribute(("count", strings.len().to_string().as_str()));
        sst.push_attribute(("uniqueCount", strings.len().to_string().as_str()));
        writer.write_event(Event::Start(sst))?;
        for value in strings {
            writer.write_event(Event::Start(BytesStart::new("si")))?;
            let mut t = BytesStart::new("t");
            t.push_attribute(("xml:space", "preserve"));
            writer.write_event(Event::Start(t))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("si")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sst")))?;

        let body = String::from_utf8(writer.into_inner().into_inner())?;
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n{body}"
        ))
    }

    fn sheet_xml(
        sheet: &SheetSpec,
        shared: &mut Vec<String>,
        drawing_rel: Option<&str>,
    ) -> Result<String, AppError> {
        let mut rows: BTreeMap<u32, BTreeMap<u32, &CellValue>> = BTreeMap::new();
        for (addr, value) in &sheet.cells {
            rows.entry(addr.row).or_default().insert(addr.col, value);
        }
        let heights: BTreeMap<u32, f64> = sheet.row_heights.iter().copied().collect();
        for row in heights.keys() {
            rows.entry(*row).or_default();
        }

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        if rows.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("sheetData")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
            for (row, cells) in &rows {
                let mut start = BytesStart::new("row");
                start.push_attribute(("r", row.to_string().as_str()));
                if let Some(height) = heights.get(row) {
                    start.push_attribute(("ht", height.to_string().as_str()));
                    start.push_attribute(("customHeight", "1"));
                }
                writer.write_event(Event::Start(start))?;
                for (col, value) in cells {
                    Self::write_cell(&mut writer, CellAddress::new(*row, *col), value, shared)?;
                }
                writer.write_event(Event::End(BytesEnd::new("row")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
        }
        let sheet_data = String::from_utf8(writer.into_inner().into_inner())?;

        let mut cols = String::new();
        if !sheet.column_widths.is_empty() {
            cols.push_str("<cols>");
            for (col, width) in &sheet.column_widths {
                cols.push_str(&format!(
                    r#"<col min="{col}" max="{col}" width="{width}" customWidth="1"/>"#
                ));
            }
            cols.push_str("</cols>");
        }

        let mut tail = String::new();
        if !sheet.merges.is_empty() {
            tail.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
            for merge in &sheet.merges {
                tail.push_str(&format!(r#"<mergeCell ref="{merge}"/>"#));
            }
            tail.push_str("</mergeCells>");
        }
        if let Some(extra) = &sheet.extra_xml {
            tail.push_str(extra);
        }
        tail.push_str(r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#);
        if let Some(rel) = drawing_rel {
            tail.push_str(&format!(r#"<drawing r:id="{rel}"/>"#));
        }

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1"/><sheetViews><sheetView workbookViewId="0"/></sheetViews><sheetFormatPr defaultRowHeight="15"/>{cols}{sheet_data}{tail}</worksheet>"#
        ))
    }

    fn write_cell(
        writer: &mut Writer<Cursor<Vec<u8>>>,
        addr: CellAddress,
        value: &CellValue,
        shared: &mut Vec<String>,
    ) -> Result<(), AppError> {
        let mut start = BytesStart::new("c");
        start.push_attribute(("r", addr.to_a1().as_str()));
        let content = match value {
            CellValue::Empty => None,
            CellValue::String(text) => {
                let index = match shared.iter().position(|s| s == text) {
                    Some(index) => index,
                    None => {
                        shared.push(text.clone());
                        shared.len() - 1
                    }
                };
                start.push_attribute(("t", "s"));
                Some(index.to_string())
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Boolean(b) => {
                start.push_attribute(("t", "b"));
                Some(if *b { "1" } else { "0" }.to_string())
            }
        };

        match content {
            None => writer.write_event(Event::Empty(start))?,
            Some(v) => {
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(&v)))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
        Ok(())
    }
}
