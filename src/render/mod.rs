pub mod anchors;
pub mod displacement;
pub mod estimate;
pub mod file_name;
pub mod general;
pub mod image;
pub mod plain;
pub mod reset;
pub mod style;
pub mod table;

use crate::common::errors::AppError;
use crate::common::fs::FsUtil;
use crate::common::json::JsonUtil;
use crate::config::{StyleConfig, TemplateLayout};
use crate::document::ServiceDocument;
use crate::xlsx::cell_address::CellRange;
use crate::xlsx::drawing::PictureAnchor;
use crate::xlsx::TemplateWorkbook;
use anchors::{AnchorResolver, AnchorSource, ResolvedAnchors};
use displacement::displace_trailing_block;
use image::FlowchartImage;
use serde::Serialize;
use style::StylePainter;
use table::{DetailLayout, RowSpan, TableRenderer};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub sheet: String,
    pub anchor_source: AnchorSource,
    pub detail_start_row: u32,
    // `None` when the tree was empty.
    pub occupied_rows: Option<RowSpan>,
    // Row of the trailing block label after displacement.
    pub trailing_label_row: Option<u32>,
    pub inserted_rows: u32,
    pub merges_cleared: usize,
    pub merge_conflicts: Vec<String>,
    pub flowchart_embedded: bool,
}

impl RenderReport {
    pub fn to_json(&self) -> Result<serde_json::Value, AppError> {
        JsonUtil::to_value(self)
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub report: RenderReport,
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    layout: TemplateLayout,
    style: StyleConfig,
}

impl DocumentRenderer {
    pub fn new(mut layout: TemplateLayout, style: StyleConfig) -> Result<Self, AppError> {
        layout.validate()?;
        Ok(Self { layout, style })
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    // Renders `document` into a copy of `template`. Fails before producing any
    // output when the sheet or the detail header cannot be found.
    pub fn render(
        &self,
        document: &ServiceDocument,
        template: &[u8],
    ) -> Result<RenderOutcome, AppError> {
        let mut workbook = TemplateWorkbook::open(template, &self.layout.sheet_name)?;
        let anchors = AnchorResolver::new(&self.layout).resolve(workbook.sheet())?;

        general::write_general_fields(
            workbook.sheet_mut(),
            &anchors,
            &document.general,
            &self.layout.default_title,
        );

        let start = anchors.detail_start_row;
        let estimated_last = estimate::estimate_last_row(&document.categories, start);
        let mut trailing_label_row = anchors.trailing.map(|t| t.row);
        let mut inserted_rows = 0;
        let mut merges_cleared = 0;
        let mut detail = DetailLayout {
            start_row: start,
            last_row: start - 1,
            ..DetailLayout::default()
        };

        if estimated_last >= start {
            // Displace before anything below the table is addressed.
            let reset_end = match anchors.trailing {
                Some(label) => {
                    let moved = displace_trailing_block(
                        &mut workbook,
                        label.row,
                        estimated_last,
                        self.layout.margin_rows,
                    )?;
                    trailing_label_row = Some(moved.label_row);
                    inserted_rows = moved.inserted_rows;
                    moved.label_row - 1
                }
                None => estimated_last,
            };

            let region = CellRange::from_bounds(
                start,
                anchors.columns.first(),
                reset_end,
                anchors.columns.last(),
            );
            merges_cleared = reset::reset_area(workbook.sheet_mut(), region);
            debug!(region = %region, merges_cleared, "cleared detail area");

            detail = TableRenderer::new(anchors.columns, start, self.layout.max_additional_fields)
                .render(workbook.sheet_mut(), &document.categories);
            debug_assert_eq!(detail.last_row, estimated_last);

            StylePainter::new(&self.style, anchors.columns).paint(&mut workbook, &detail);
        } else {
            debug!("document has no detail rows; template detail area left as is");
        }

        let flowchart_embedded = match &document.flowchart {
            Some(flowchart) => {
                let anchor = self.flowchart_anchor(&anchors, trailing_label_row, &detail)?;
                FlowchartImage::insert(&mut workbook, flowchart, anchor)?
            }
            None => false,
        };

        let report = RenderReport {
            sheet: workbook.sheet_name().to_string(),
            anchor_source: anchors.source,
            detail_start_row: start,
            occupied_rows: detail.occupied(),
            trailing_label_row,
            inserted_rows,
            merges_cleared,
            merge_conflicts: detail.merge_conflicts.clone(),
            flowchart_embedded,
        };

        info!(
            document = %document.id,
            sheet = %report.sheet,
            source = ?report.anchor_source,
            items = document.item_count(),
            last_row = detail.last_row,
            trailing_label_row = ?report.trailing_label_row,
            inserted_rows,
            merge_conflicts = report.merge_conflicts.len(),
            flowchart_embedded,
            "rendered service document"
        );

        Ok(RenderOutcome {
            bytes: workbook.to_bytes()?,
            file_name: file_name::download_file_name(&document.general, &self.layout),
            report,
        })
    }

    pub fn render_file(
        &self,
        document: &ServiceDocument,
        template_path: &str,
        output_path: &str,
    ) -> Result<RenderReport, AppError> {
        let template = FsUtil::read_xlsx(template_path)?;
        let outcome = self.render(document, &template)?;
        let written = FsUtil::write_xlsx(output_path, &outcome.bytes)?;
        debug!(path = %written.display(), "wrote rendered document");
        Ok(outcome.report)
    }

    fn flowchart_anchor(
        &self,
        anchors: &ResolvedAnchors,
        trailing_label_row: Option<u32>,
        detail: &DetailLayout,
    ) -> Result<PictureAnchor, AppError> {
        let (row, col) = match (trailing_label_row, anchors.trailing) {
            (Some(row), Some(label)) => (row + 1, label.col),
            _ => (
                detail.last_row + self.layout.margin_rows + 1,
                self.layout.trailing_column_index()?,
            ),
        };
        Ok(PictureAnchor {
            row,
            col,
            width_px: self.layout.flowchart_width_px,
            height_px: self.layout.flowchart_height_px,
        })
    }
}
