use crate::common::errors::AppError;
use crate::xlsx::package::XlsxPackage;
use crate::xlsx::relationships::{
    rels_for_part, resolve_target, Relationships, REL_TYPE_CALC_CHAIN, REL_TYPE_OFFICE_DOCUMENT,
};
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::Event;
use quick_xml::Reader;

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub rel_id: String,
    pub part: String,
}

pub struct WorkbookXml;

impl WorkbookXml {
    pub fn workbook_part(package: &XlsxPackage) -> Result<String, AppError> {
        let Some(root_rels) = package.read_optional_part_string("_rels/.rels")? else {
            return Ok(DEFAULT_WORKBOOK_PART.to_string());
        };
        let rels = Relationships::parse(&root_rels)?;
        Ok(rels
            .first_of_type(REL_TYPE_OFFICE_DOCUMENT)
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string()))
    }

    pub fn sheets(package: &XlsxPackage) -> Result<Vec<SheetEntry>, AppError> {
        let workbook_part = Self::workbook_part(package)?;
        let workbook = package.read_part_string(&workbook_part)?;
        let rels_xml = package.read_part_string(&rels_for_part(&workbook_part))?;
        let rels = Relationships::parse(&rels_xml)?;

        let mut reader = Reader::from_str(&workbook);
        reader.config_mut().trim_text(true);
        let mut sheets = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"sheet") =>
                {
                    let name = XmlUtil::attr_value(&e, b"name")?.unwrap_or_default();
                    let rel_id = XmlUtil::attr_value(&e, b"id")?.unwrap_or_default();
                    let part = rels
                        .by_id(&rel_id)
                        .map(|r| resolve_target(&workbook_part, &r.target))
                        .ok_or_else(|| {
                            AppError::InvalidXlsxFormat(format!(
                                "sheet {name} has no worksheet relationship"
                            ))
                        })?;
                    sheets.push(SheetEntry { name, rel_id, part });
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(sheets)
    }

    pub fn sheet_names(package: &XlsxPackage) -> Result<Vec<String>, AppError> {
        Ok(Self::sheets(package)?.into_iter().map(|s| s.name).collect())
    }

    pub fn find_sheet(package: &XlsxPackage, name: &str) -> Result<SheetEntry, AppError> {
        Self::sheets(package)?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AppError::SheetNotFound(name.to_string()))
    }

    pub fn drop_calc_chain(package: &mut XlsxPackage) -> Result<Option<String>, AppError> {
        let workbook_part = Self::workbook_part(package)?;
        let rels_part = rels_for_part(&workbook_part);
        let Some(rels_xml) = package.read_optional_part_string(&rels_part)? else {
            return Ok(None);
        };
        let mut rels = Relationships::parse(&rels_xml)?;
        let Some(calc_part) = rels
            .first_of_type(REL_TYPE_CALC_CHAIN)
            .map(|r| resolve_target(&workbook_part, &r.target))
        else {
            return Ok(None);
        };

        rels.remove_type(REL_TYPE_CALC_CHAIN);
        package.set_part(&rels_part, rels.render().into_bytes());
        package.remove_part(&calc_part);
        Ok(Some(calc_part))
    }
}
