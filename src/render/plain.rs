use crate::common::errors::AppError;
use crate::document::{AdditionalField, ServiceDocument, TwoTierGroup};
use crate::xlsx::cell_address::CellAddress;
use crate::xlsx::styles::{Alignment, BorderStyle, CellStyle, FontStyle, VerticalAlign};
use crate::xlsx::templates::{SheetSpec, XlsxTemplates};
use crate::xlsx::TemplateWorkbook;
use tracing::info;

pub const PLAIN_SHEET_NAME: &str = "Detalle";
const HEADER_FILL: &str = "FFE0E0E0";

const COLUMNS: [(&str, f64); 11] = [
    ("Categoría", 20.0),
    ("Subcategoría", 20.0),
    ("Ítem", 25.0),
    ("Campos adicionales", 40.0),
    ("SLA", 15.0),
    ("Grupo", 20.0),
    ("Tipo de información", 18.0),
    ("Buzón", 25.0),
    ("Aprobadores", 25.0),
    ("Formulario", 30.0),
    ("Observaciones", 30.0),
];

pub struct PlainExporter;

impl PlainExporter {
    pub fn export(document: &ServiceDocument) -> Result<Vec<u8>, AppError> {
        let mut spec = SheetSpec::new(PLAIN_SHEET_NAME);
        for (index, (title, width)) in COLUMNS.iter().enumerate() {
            let col = index as u32 + 1;
            spec = spec
                .with_text(CellAddress::new(1, col), title)
                .with_column_width(col, *width);
        }

        let mut row = 2;
        for category in &document.categories {
            for subcategory in &category.subcategories {
                for item in &subcategory.items {
                    let values = [
                        category.name.clone(),
                        subcategory.name.clone(),
                        item.name.clone(),
                        Self::fields_summary(&item.additional_fields),
                        item.sla.clone(),
                        Self::two_tier_text(&item.group),
                        item.info_type.clone(),
                        item.mailbox.clone(),
                        item.effective_approvers(subcategory).to_string(),
                        item.form_link.clone(),
                        item.notes.clone(),
                    ];
                    for (index, value) in values.iter().enumerate() {
                        if !value.is_empty() {
                            spec = spec.with_text(CellAddress::new(row, index as u32 + 1), value);
                        }
                    }
                    row += 1;
                }
            }
        }

        let bytes = XlsxTemplates::workbook(&[spec], false)?;
        let mut workbook = TemplateWorkbook::open(&bytes, PLAIN_SHEET_NAME)?;
        let header = workbook.register_style(&CellStyle {
            font: FontStyle {
                name: "Calibri".to_string(),
                size: 11.0,
                bold: true,
                color: None,
            },
            fill: Some(HEADER_FILL.to_string()),
            border: BorderStyle::default(),
            alignment: Alignment {
                horizontal: None,
                vertical: Some(VerticalAlign::Center),
                wrap_text: false,
            },
        });
        for col in 1..=COLUMNS.len() as u32 {
            workbook
                .sheet_mut()
                .set_style(CellAddress::new(1, col), Some(header));
        }

        info!(rows = row - 2, "flat detail export written");
        workbook.to_bytes()
    }

    pub fn fields_summary(fields: &[AdditionalField]) -> String {
        fields
            .iter()
            .map(|field| {
                let marker = if field.required { "*" } else { "" };
                format!("{}{} ({})", field.title, marker, field.field_type.label())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn two_tier_text(group: &TwoTierGroup) -> String {
        match (group.title.trim().is_empty(), group.content.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => group.title.clone(),
            (true, false) => group.content.clone(),
            (false, false) => format!("{}\n{}", group.title, group.content),
        }
    }
}
