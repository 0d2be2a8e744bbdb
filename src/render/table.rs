use crate::config::ColumnMap;
use crate::document::{AdditionalField, Category, Item, Subcategory, TwoTierGroup};
use crate::render::estimate::{CATEGORY_SEPARATOR_ROWS, SUBCATEGORY_SEPARATOR_ROWS};
use crate::xlsx::cell_address::{CellAddress, CellRange};
use crate::xlsx::sheet_model::{CellValue, Worksheet};
use serde::Serialize;
use tracing::warn;

// Inclusive row interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSpan {
    pub start: u32,
    pub end: u32,
}

impl RowSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end + 1 - self.start
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.start && row <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorKind {
    Subcategory,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemSpan {
    pub rows: RowSpan,
    // First item of its subcategory; no divider is drawn above it.
    pub leading: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetailLayout {
    pub start_row: u32,
    // `start_row - 1` when nothing was rendered.
    pub last_row: u32,
    pub categories: Vec<RowSpan>,
    pub subcategories: Vec<RowSpan>,
    pub items: Vec<ItemSpan>,
    pub separators: Vec<(u32, SeparatorKind)>,
    pub merge_conflicts: Vec<String>,
}

impl DetailLayout {
    pub fn is_empty(&self) -> bool {
        self.last_row < self.start_row
    }

    pub fn occupied(&self) -> Option<RowSpan> {
        (!self.is_empty()).then(|| RowSpan::new(self.start_row, self.last_row))
    }

    pub fn separator_at(&self, row: u32) -> Option<SeparatorKind> {
        self.separators
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, kind)| *kind)
    }
}

pub struct TableRenderer {
    columns: ColumnMap,
    start_row: u32,
    max_additional_fields: usize,
}

impl TableRenderer {
    pub fn new(columns: ColumnMap, start_row: u32, max_additional_fields: usize) -> Self {
        Self {
            columns,
            start_row,
            max_additional_fields,
        }
    }

    pub fn render(&self, sheet: &mut Worksheet, categories: &[Category]) -> DetailLayout {
        let mut layout = DetailLayout {
            start_row: self.start_row,
            last_row: self.start_row - 1,
            ..DetailLayout::default()
        };
        let mut cursor = self.start_row;

        for (cat_index, category) in categories.iter().enumerate() {
            let category_start = cursor;

            for (sub_index, subcategory) in category.subcategories.iter().enumerate() {
                cursor = self.render_subcategory(sheet, subcategory, cursor, &mut layout);

                if sub_index + 1 < category.subcategories.len() {
                    for _ in 0..SUBCATEGORY_SEPARATOR_ROWS {
                        let range = CellRange::from_bounds(
                            cursor,
                            self.columns.subcategory,
                            cursor,
                            self.columns.last(),
                        );
                        self.clear_row(sheet, cursor);
                        self.merge(sheet, range, &mut layout);
                        layout.separators.push((cursor, SeparatorKind::Subcategory));
                        cursor += 1;
                    }
                }
            }

            if cursor > category_start {
                let span = RowSpan::new(category_start, cursor - 1);
                self.write_spanning(sheet, self.columns.category, span, &category.name, &mut layout);
                layout.categories.push(span);
            }

            if cat_index + 1 < categories.len() {
                for _ in 0..CATEGORY_SEPARATOR_ROWS {
                    let range =
                        CellRange::from_bounds(cursor, self.columns.first(), cursor, self.columns.last());
                    self.clear_row(sheet, cursor);
                    self.merge(sheet, range, &mut layout);
                    layout.separators.push((cursor, SeparatorKind::Category));
                    cursor += 1;
                }
            }
        }

        layout.last_row = cursor - 1;
        layout
    }

    fn render_subcategory(
        &self,
        sheet: &mut Worksheet,
        subcategory: &Subcategory,
        start: u32,
        layout: &mut DetailLayout,
    ) -> u32 {
        let mut cursor = start;
        for (index, item) in subcategory.items.iter().enumerate() {
            let rows = self.render_item(sheet, item, cursor, layout);
            layout.items.push(ItemSpan {
                rows,
                leading: index == 0,
            });
            cursor = rows.end + 1;
        }

        if cursor == start {
            return cursor;
        }

        let span = RowSpan::new(start, cursor - 1);
        self.write_spanning(sheet, self.columns.subcategory, span, &subcategory.name, layout);
        self.write_spanning(
            sheet,
            self.columns.approvers,
            span,
            &Self::subcategory_approvers(subcategory),
            layout,
        );
        layout.subcategories.push(span);
        cursor
    }

    fn render_item(
        &self,
        sheet: &mut Worksheet,
        item: &Item,
        start: u32,
        layout: &mut DetailLayout,
    ) -> RowSpan {
        let rows = RowSpan::new(start, start + item.row_count() - 1);
        let columns = self.columns;

        if item.additional_fields.len() > self.max_additional_fields {
            warn!(
                item = %item.name,
                fields = item.additional_fields.len(),
                limit = self.max_additional_fields,
                "item has more additional fields than the template is sized for"
            );
        }

        for (col, text) in [
            (columns.item, item.name.as_str()),
            (columns.sla, item.sla.as_str()),
            (columns.info_type, item.info_type.as_str()),
            (columns.mailbox, item.mailbox.as_str()),
            (columns.form_link, item.form_link.as_str()),
        ] {
            self.write_spanning(sheet, col, rows, text, layout);
        }

        for (col, group) in [
            (columns.group, &item.group),
            (columns.assist_groups, &item.assist_groups),
            (columns.user_groups, &item.user_groups),
        ] {
            self.write_two_tier(sheet, col, rows, group, layout);
        }

        for offset in 0..rows.len() {
            let row = start + offset;
            let field = item.additional_fields.get(offset as usize);
            let (title, kind) = field
                .map(|f| (Self::field_title(f), f.field_type.label().to_string()))
                .unwrap_or_default();
            sheet.set_value(CellAddress::new(row, columns.field_title), CellValue::text(title));
            sheet.set_value(CellAddress::new(row, columns.field_type), CellValue::text(kind));
        }

        rows
    }

    fn write_two_tier(
        &self,
        sheet: &mut Worksheet,
        col: u32,
        rows: RowSpan,
        group: &TwoTierGroup,
        layout: &mut DetailLayout,
    ) {
        sheet.set_value(CellAddress::new(rows.start, col), CellValue::text(group.title.as_str()));
        if rows.len() < 2 {
            return;
        }
        let content = RowSpan::new(rows.start + 1, rows.end);
        self.write_spanning(sheet, col, content, &group.content, layout);
    }

    // Writes `text` at the top of `rows` and merges the column span. Single rows stay unmerged.
    fn write_spanning(
        &self,
        sheet: &mut Worksheet,
        col: u32,
        rows: RowSpan,
        text: &str,
        layout: &mut DetailLayout,
    ) {
        sheet.set_value(CellAddress::new(rows.start, col), CellValue::text(text));
        if rows.len() > 1 {
            self.merge(sheet, CellRange::column_span(col, rows.start, rows.end), layout);
        }
    }

    fn merge(&self, sheet: &mut Worksheet, range: CellRange, layout: &mut DetailLayout) {
        if let Err(err) = sheet.merge(range) {
            warn!(range = %range, error = %err, "merge skipped");
            layout.merge_conflicts.push(range.to_a1());
        }
    }

    fn clear_row(&self, sheet: &mut Worksheet, row: u32) {
        for col in self.columns.all() {
            sheet.set_value(CellAddress::new(row, col), CellValue::Empty);
        }
    }

    fn field_title(field: &AdditionalField) -> String {
        if field.required {
            format!("{} *", field.title)
        } else {
            field.title.clone()
        }
    }

    fn subcategory_approvers(subcategory: &Subcategory) -> String {
        let mut effective = subcategory
            .items
            .iter()
            .map(|item| item.effective_approvers(subcategory));
        match effective.next() {
            Some(first) if effective.all(|other| other == first) => first.to_string(),
            _ => subcategory.approvers.clone(),
        }
    }
}
