pub mod cell_address;
pub mod content_types;
pub mod drawing;
pub mod package;
pub mod relationships;
pub mod shared_strings;
pub mod sheet_model;
pub mod sheet_xml;
pub mod styles;
pub mod template_workbook;
pub mod templates;
pub mod workbook_xml;
pub mod xml;

pub use template_workbook::TemplateWorkbook;
