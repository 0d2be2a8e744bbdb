use crate::common::errors::AppError;
use crate::xlsx::TemplateWorkbook;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub original_row: u32,
    pub label_row: u32,
    pub inserted_rows: u32,
}

pub fn desired_label_row(original_row: u32, estimated_last_row: u32, margin: u32) -> u32 {
    original_row.max(estimated_last_row + margin)
}

pub fn displace_trailing_block(
    workbook: &mut TemplateWorkbook,
    original_row: u32,
    estimated_last_row: u32,
    margin: u32,
) -> Result<Displacement, AppError> {
    let label_row = desired_label_row(original_row, estimated_last_row, margin);
    let inserted_rows = label_row - original_row;

    if inserted_rows > 0 {
        workbook.insert_rows(original_row, inserted_rows)?;
        info!(
            from = original_row,
            to = label_row,
            inserted_rows,
            "moved trailing block below the detail table"
        );
    }

    Ok(Displacement {
        original_row,
        label_row,
        inserted_rows,
    })
}
