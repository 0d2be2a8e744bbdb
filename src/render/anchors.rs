use crate::common::errors::AppError;
use crate::config::{ColumnMap, TemplateLayout};
use crate::xlsx::cell_address::CellAddress;
use crate::xlsx::sheet_model::Worksheet;
use serde::Serialize;
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSource {
    Configured,
    Scanned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnchors {
    pub title: CellAddress,
    pub general: Vec<(&'static str, CellAddress)>,
    pub header_row: u32,
    pub detail_start_row: u32,
    pub columns: ColumnMap,
    pub trailing: Option<CellAddress>,
    pub source: AnchorSource,
}

pub fn normalize_label(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(|c| c.to_uppercase())
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct AnchorResolver<'a> {
    layout: &'a TemplateLayout,
}

impl<'a> AnchorResolver<'a> {
    pub fn new(layout: &'a TemplateLayout) -> Self {
        Self { layout }
    }

    pub fn resolve(&self, sheet: &Worksheet) -> Result<ResolvedAnchors, AppError> {
        let layout = self.layout;
        let header_label = normalize_label(&layout.category_header_label);
        let configured_columns = layout.columns.resolve()?;

        let configured_header = CellAddress::new(
            layout.detail_start_row.saturating_sub(2).max(1),
            configured_columns.category,
        );

        let (header, columns, source) =
            if normalize_label(&sheet.text(configured_header)) == header_label {
                (configured_header, configured_columns, AnchorSource::Configured)
            } else {
                let found = self.scan(sheet, &header_label, 1).ok_or_else(|| {
                    AppError::AnchorNotFound(format!(
                        "no \"{}\" header in the first {} rows x {} columns",
                        layout.category_header_label, layout.scan_rows, layout.scan_cols
                    ))
                })?;
                warn!(
                    expected = %configured_header,
                    found = %found,
                    "detail header moved; using scanned anchors"
                );
                (
                    found,
                    ColumnMap::from_category_column(found.col),
                    AnchorSource::Scanned,
                )
            };

        let detail_start_row = header.row + 2;
        let trailing = self.resolve_trailing(sheet, header.row, detail_start_row)?;

        let mut general = Vec::with_capacity(13);
        for (key, cell) in layout.general_cells.entries() {
            general.push((key, CellAddress::parse(cell)?));
        }

        debug!(
            header = %header,
            detail_start_row,
            trailing = ?trailing.map(|t| t.to_a1()),
            ?source,
            "resolved template anchors"
        );

        Ok(ResolvedAnchors {
            title: CellAddress::parse(&layout.title_cell)?,
            general,
            header_row: header.row,
            detail_start_row,
            columns,
            trailing,
            source,
        })
    }

    fn resolve_trailing(
        &self,
        sheet: &Worksheet,
        header_row: u32,
        detail_start_row: u32,
    ) -> Result<Option<CellAddress>, AppError> {
        let layout = self.layout;
        if layout.trailing_label.trim().is_empty() {
            return Ok(None);
        }
        let label = normalize_label(&layout.trailing_label);

        let configured = CellAddress::new(layout.trailing_label_row, layout.trailing_column_index()?);
        if configured.row > detail_start_row && normalize_label(&sheet.text(configured)) == label {
            return Ok(Some(configured));
        }

        // A label inside or above the detail area would be overwritten by the table.
        let found = self.scan(sheet, &label, detail_start_row.max(header_row) + 1);
        if found.is_none() {
            debug!(label = %layout.trailing_label, "template has no trailing block below the table");
        }
        Ok(found)
    }

    // Row-major search, starting at `from_row`, for the first cell whose
    // normalized text equals `label`.
    fn scan(&self, sheet: &Worksheet, label: &str, from_row: u32) -> Option<CellAddress> {
        let last_row = self.layout.scan_rows.max(from_row);
        (from_row..=last_row)
            .flat_map(|row| (1..=self.layout.scan_cols).map(move |col| CellAddress::new(row, col)))
            .find(|addr| {
                let text = sheet.text(*addr);
                !text.is_empty() && normalize_label(&text) == label
            })
    }
}
