use crate::document::GeneralData;
use crate::render::anchors::ResolvedAnchors;
use crate::xlsx::sheet_model::{CellValue, Worksheet};

pub fn document_title(general: &GeneralData, default_title: &str) -> String {
    let name = general.service_name.trim();
    if name.is_empty() {
        default_title.to_string()
    } else {
        name.to_uppercase()
    }
}

pub fn write_general_fields(
    sheet: &mut Worksheet,
    anchors: &ResolvedAnchors,
    general: &GeneralData,
    default_title: &str,
) {
    sheet.set_value(
        anchors.title,
        CellValue::text(document_title(general, default_title)),
    );
    for (key, addr) in &anchors.general {
        let value = general.value_of(key).unwrap_or_default();
        sheet.set_value(*addr, CellValue::text(value));
    }
}
