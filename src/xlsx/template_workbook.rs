use crate::common::errors::AppError;
use crate::xlsx::content_types::{image_content_type, ContentTypes, DRAWING_CONTENT_TYPE};
use crate::xlsx::drawing::{PictureAnchor, SheetDrawing};
use crate::xlsx::package::{XlsxPackage, CONTENT_TYPES_PART};
use crate::xlsx::relationships::{
    rels_for_part, relative_target, resolve_target, Relationships, REL_TYPE_DRAWING,
    REL_TYPE_IMAGE, REL_TYPE_SHARED_STRINGS, REL_TYPE_STYLES,
};
use crate::xlsx::shared_strings::SharedStrings;
use crate::xlsx::sheet_model::Worksheet;
use crate::xlsx::sheet_xml::{SheetXml, DRAWING_SUCCESSORS};
use crate::xlsx::styles::{CellStyle, StyleSheet};
use crate::xlsx::workbook_xml::WorkbookXml;
use crate::xlsx::xml::XmlUtil;
use tracing::debug;

pub struct TemplateWorkbook {
    package: XlsxPackage,
    sheet_name: String,
    sheet_part: String,
    sheet: Worksheet,
    styles_part: String,
    styles: StyleSheet,
    drawing_part: Option<String>,
    drawing_xml: Option<String>,
}

impl TemplateWorkbook {
    pub fn open(bytes: &[u8], sheet_name: &str) -> Result<Self, AppError> {
        let package = XlsxPackage::from_bytes(bytes)?;
        let entry = WorkbookXml::find_sheet(&package, sheet_name)?;

        let workbook_part = WorkbookXml::workbook_part(&package)?;
        let workbook_rels =
            Relationships::parse(&package.read_part_string(&rels_for_part(&workbook_part))?)?;

        let shared = match workbook_rels.first_of_type(REL_TYPE_SHARED_STRINGS) {
            Some(rel) => {
                let part = resolve_target(&workbook_part, &rel.target);
                match package.read_optional_part_string(&part)? {
                    Some(xml) => SharedStrings::parse(&xml)?,
                    None => SharedStrings::default(),
                }
            }
            None => SharedStrings::default(),
        };

        let styles_part = workbook_rels
            .first_of_type(REL_TYPE_STYLES)
            .map(|rel| resolve_target(&workbook_part, &rel.target))
            .ok_or_else(|| AppError::InvalidXlsxFormat("workbook has no styles part".to_string()))?;
        let styles = StyleSheet::parse(&package.read_part_string(&styles_part)?)?;

        let sheet = SheetXml::parse(&package.read_part_string(&entry.part)?, &shared)?;

        let mut drawing_part = None;
        let mut drawing_xml = None;
        if let Some(rel_id) = SheetXml::tail_element_attr(sheet.tail_xml(), "drawing", "id")? {
            let sheet_rels = package
                .read_optional_part_string(&rels_for_part(&entry.part))?
                .map(|xml| Relationships::parse(&xml))
                .transpose()?
                .unwrap_or_default();
            if let Some(rel) = sheet_rels.by_id(&rel_id) {
                let part = resolve_target(&entry.part, &rel.target);
                drawing_xml = package.read_optional_part_string(&part)?;
                drawing_part = Some(part);
            }
        }

        debug!(
            sheet = sheet_name,
            part = %entry.part,
            merges = sheet.merges().len(),
            has_drawing = drawing_xml.is_some(),
            "opened template sheet"
        );

        Ok(Self {
            package,
            sheet_name: sheet_name.to_string(),
            sheet_part: entry.part,
            sheet,
            styles_part,
            styles,
            drawing_part,
            drawing_xml,
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn sheet(&self) -> &Worksheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut Worksheet {
        &mut self.sheet
    }

    pub fn register_style(&mut self, style: &CellStyle) -> u32 {
        self.styles.register(style)
    }

    pub fn has_drawing(&self) -> bool {
        self.drawing_xml.is_some()
    }

    pub fn drawing_xml(&self) -> Option<&str> {
        self.drawing_xml.as_deref()
    }

    pub fn insert_rows(&mut self, at: u32, count: u32) -> Result<(), AppError> {
        self.sheet.insert_rows(at, count)?;
        if let Some(xml) = self.drawing_xml.take() {
            self.drawing_xml = Some(SheetDrawing::shift_anchor_rows(&xml, at, count)?);
        }
        Ok(())
    }

    pub fn add_image(
        &mut self,
        bytes: &[u8],
        extension: &str,
        anchor: PictureAnchor,
    ) -> Result<(), AppError> {
        let media_part = self
            .package
            .next_free_part_name("xl/media/image", &format!(".{extension}"));
        self.package.set_part(&media_part, bytes.to_vec());

        let drawing_part = self.ensure_drawing()?;

        let drawing_rels_part = rels_for_part(&drawing_part);
        let mut drawing_rels = self
            .package
            .read_optional_part_string(&drawing_rels_part)?
            .map(|xml| Relationships::parse(&xml))
            .transpose()?
            .unwrap_or_default();
        let image_rel = drawing_rels.add(REL_TYPE_IMAGE, &relative_target(&drawing_part, &media_part));
        self.package
            .set_part(&drawing_rels_part, drawing_rels.render().into_bytes());

        let current = self.drawing_xml.take().unwrap_or_else(SheetDrawing::empty_part);
        self.drawing_xml = Some(SheetDrawing::append_picture(&current, &anchor, &image_rel)?);

        self.update_content_types(|types| {
            types.ensure_default(extension, image_content_type(extension))
        })?;

        debug!(media = %media_part, drawing = %drawing_part, row = anchor.row, col = anchor.col, "embedded picture");
        Ok(())
    }

    fn ensure_drawing(&mut self) -> Result<String, AppError> {
        if let Some(part) = &self.drawing_part {
            return Ok(part.clone());
        }

        let part = self
            .package
            .next_free_part_name("xl/drawings/drawing", ".xml");
        let sheet_rels_part = rels_for_part(&self.sheet_part);
        let mut sheet_rels = self
            .package
            .read_optional_part_string(&sheet_rels_part)?
            .map(|xml| Relationships::parse(&xml))
            .transpose()?
            .unwrap_or_default();
        let rel_id = sheet_rels.add(REL_TYPE_DRAWING, &relative_target(&self.sheet_part, &part));
        self.package
            .set_part(&sheet_rels_part, sheet_rels.render().into_bytes());

        SheetXml::ensure_relationship_namespace(&mut self.sheet);
        let element = format!(
            r#"<{} r:id="{rel_id}"/>"#,
            XmlUtil::qualified(self.sheet.prefix(), "drawing")
        );
        let tail = SheetXml::insert_tail_element(self.sheet.tail_xml(), &element, DRAWING_SUCCESSORS)?;
        self.sheet.set_tail_xml(tail);

        self.update_content_types(|types| types.ensure_override(&part, DRAWING_CONTENT_TYPE))?;

        self.drawing_part = Some(part.clone());
        self.drawing_xml = Some(SheetDrawing::empty_part());
        Ok(part)
    }

    fn update_content_types(
        &mut self,
        edit: impl FnOnce(&mut ContentTypes) -> Result<(), AppError>,
    ) -> Result<(), AppError> {
        let mut types = ContentTypes::parse(&self.package.read_part_string(CONTENT_TYPES_PART)?)?;
        edit(&mut types)?;
        self.package
            .set_part(CONTENT_TYPES_PART, types.into_xml().into_bytes());
        Ok(())
    }

    // Serializes the edited package. The calculation chain is dropped since
    // cells may have moved; spreadsheet apps rebuild it on load.
    pub fn to_bytes(mut self) -> Result<Vec<u8>, AppError> {
        let sheet_xml = SheetXml::render(&self.sheet)?;
        self.package.set_part(&self.sheet_part, sheet_xml.into_bytes());

        let styles_xml = self.styles.into_xml()?;
        self.package.set_part(&self.styles_part, styles_xml.into_bytes());

        if let (Some(part), Some(xml)) = (&self.drawing_part, &self.drawing_xml) {
            self.package.set_part(part, xml.clone().into_bytes());
        }

        if let Some(calc_chain) = WorkbookXml::drop_calc_chain(&mut self.package)? {
            let mut types =
                ContentTypes::parse(&self.package.read_part_string(CONTENT_TYPES_PART)?)?;
            types.remove_override(&calc_chain);
            self.package
                .set_part(CONTENT_TYPES_PART, types.into_xml().into_bytes());
            debug!(part = %calc_chain, "dropped calculation chain");
        }

        self.package.to_bytes()
    }
}
