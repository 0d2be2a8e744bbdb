use crate::config::{ColumnMap, StyleConfig};
use crate::render::table::{DetailLayout, SeparatorKind};
use crate::xlsx::cell_address::CellAddress;
use crate::xlsx::styles::{
    Alignment, BorderStyle, BorderWeight, CellStyle, FontStyle, HorizontalAlign, VerticalAlign,
};
use crate::xlsx::TemplateWorkbook;
use std::collections::HashSet;

pub struct StylePainter<'a> {
    config: &'a StyleConfig,
    columns: ColumnMap,
}

impl<'a> StylePainter<'a> {
    pub fn new(config: &'a StyleConfig, columns: ColumnMap) -> Self {
        Self { config, columns }
    }

    pub fn paint(&self, workbook: &mut TemplateWorkbook, layout: &DetailLayout) -> usize {
        let Some(occupied) = layout.occupied() else {
            return 0;
        };

        let divider_rows: HashSet<u32> = if self.config.item_dividers {
            layout
                .items
                .iter()
                .filter(|item| !item.leading)
                .map(|item| item.rows.start)
                .collect()
        } else {
            HashSet::new()
        };

        let mut used = HashSet::new();
        for row in occupied.start..=occupied.end {
            let separator = layout.separator_at(row);
            for col in self.columns.first()..=self.columns.last() {
                let style =
                    self.cell_style(row, col, occupied.start, occupied.end, separator, &divider_rows);
                let id = workbook.register_style(&style);
                used.insert(id);
                workbook.sheet_mut().set_style(CellAddress::new(row, col), Some(id));
            }

            let sheet = workbook.sheet_mut();
            if sheet.row_height(row).is_none() {
                sheet.set_row_height(row, self.config.min_row_height);
            }
        }
        used.len()
    }

    fn cell_style(
        &self,
        row: u32,
        col: u32,
        first_row: u32,
        last_row: u32,
        separator: Option<SeparatorKind>,
        divider_rows: &HashSet<u32>,
    ) -> CellStyle {
        let is_label = col == self.columns.category
            || (col == self.columns.subcategory && separator.is_none());

        // The category column runs through subcategory separators inside its merge.
        let filled = match separator {
            Some(SeparatorKind::Category) => true,
            Some(SeparatorKind::Subcategory) => col != self.columns.category,
            None => false,
        };

        let medium = Some(BorderWeight::Medium);
        let mut border = BorderStyle::all(BorderWeight::Thin, Some(self.config.border_color.clone()));
        if row == first_row || (divider_rows.contains(&row) && self.crosses_items(col)) {
            border.top = BorderWeight::max(border.top, medium);
        }
        if row == last_row {
            border.bottom = BorderWeight::max(border.bottom, medium);
        }
        if col == self.columns.first() {
            border.left = BorderWeight::max(border.left, medium);
        }
        if col == self.columns.last() {
            border.right = BorderWeight::max(border.right, medium);
        }

        CellStyle {
            font: FontStyle {
                name: self.config.font_name.clone(),
                size: if is_label {
                    self.config.label_font_size
                } else {
                    self.config.font_size
                },
                bold: is_label,
                color: None,
            },
            fill: filled.then(|| self.config.separator_fill.clone()),
            border,
            alignment: Alignment {
                horizontal: is_label.then_some(HorizontalAlign::Center),
                vertical: Some(VerticalAlign::Center),
                wrap_text: true,
            },
        }
    }

    fn crosses_items(&self, col: u32) -> bool {
        col != self.columns.category && col != self.columns.subcategory && col != self.columns.approvers
    }
}
