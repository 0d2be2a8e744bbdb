use crate::document::Category;

pub const SUBCATEGORY_SEPARATOR_ROWS: u32 = 1;
pub const CATEGORY_SEPARATOR_ROWS: u32 = 2;

pub fn total_rows(categories: &[Category]) -> u32 {
    let mut rows = 0u32;
    for (cat_index, category) in categories.iter().enumerate() {
        for (sub_index, subcategory) in category.subcategories.iter().enumerate() {
            rows += subcategory.items.iter().map(|item| item.row_count()).sum::<u32>();
            if sub_index + 1 < category.subcategories.len() {
                rows += SUBCATEGORY_SEPARATOR_ROWS;
            }
        }
        if cat_index + 1 < categories.len() {
            rows += CATEGORY_SEPARATOR_ROWS;
        }
    }
    rows
}

// Last row the table will occupy when it starts at `start_row`, or
// `start_row - 1` when there is nothing to render. Never touches a sheet.
pub fn estimate_last_row(categories: &[Category], start_row: u32) -> u32 {
    start_row + total_rows(categories) - 1
}
