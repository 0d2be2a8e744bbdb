use crate::xlsx::cell_address::CellRange;
use crate::xlsx::sheet_model::{CellValue, Worksheet};

// Clears values, merges and styles inside `region`. Merges that only touch the
// region are removed whole. Returns the number of merges removed; running it
// twice is a no-op the second time.
pub fn reset_area(sheet: &mut Worksheet, region: CellRange) -> usize {
    let mut removed = 0;
    for addr in region.cells() {
        // Most cells are not merged; that is not worth a log line.
        if sheet.unmerge_at(addr) {
            removed += 1;
        }
        if sheet.cell(addr).is_some() {
            sheet.set_value(addr, CellValue::Empty);
            sheet.set_style(addr, None);
        }
    }
    removed
}
