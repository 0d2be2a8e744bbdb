use crate::common::errors::AppError;
use crate::common::json::JsonUtil;
use crate::xlsx::cell_address::{column_letter_to_index, CellAddress};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralCells {
    pub service_name: String,
    pub service_objective: String,
    pub template: String,
    pub scope: String,
    pub site: String,
    pub contact: String,
    pub beneficiaries: String,
    pub service_reach: String,
    pub retention_time: String,
    pub requires_reports: String,
    pub observations: String,
    pub authorized_by: String,
    pub reviewed_by: String,
}

impl Default for GeneralCells {
    fn default() -> Self {
        Self {
            service_name: "C3".to_string(),
            service_objective: "C4".to_string(),
            template: "C5".to_string(),
            scope: "C6".to_string(),
            site: "C7".to_string(),
            contact: "C8".to_string(),
            beneficiaries: "C9".to_string(),
            service_reach: "C10".to_string(),
            retention_time: "C11".to_string(),
            requires_reports: "C12".to_string(),
            observations: "C13".to_string(),
            authorized_by: "C14".to_string(),
            reviewed_by: "C15".to_string(),
        }
    }
}

impl GeneralCells {
    pub fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("serviceName", self.service_name.as_str()),
            ("serviceObjective", self.service_objective.as_str()),
            ("template", self.template.as_str()),
            ("scope", self.scope.as_str()),
            ("site", self.site.as_str()),
            ("contact", self.contact.as_str()),
            ("beneficiaries", self.beneficiaries.as_str()),
            ("serviceReach", self.service_reach.as_str()),
            ("retentionTime", self.retention_time.as_str()),
            ("requiresReports", self.requires_reports.as_str()),
            ("observations", self.observations.as_str()),
            ("authorizedBy", self.authorized_by.as_str()),
            ("reviewedBy", self.reviewed_by.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailColumns {
    pub category: String,
    pub subcategory: String,
    pub item: String,
    pub field_title: String,
    pub field_type: String,
    pub sla: String,
    pub group: String,
    pub info_type: String,
    pub mailbox: String,
    pub approvers: String,
    pub form_link: String,
    pub assist_groups: String,
    pub user_groups: String,
}

impl Default for DetailColumns {
    fn default() -> Self {
        Self {
            category: "B".to_string(),
            subcategory: "C".to_string(),
            item: "D".to_string(),
            field_title: "E".to_string(),
            field_type: "F".to_string(),
            sla: "G".to_string(),
            group: "H".to_string(),
            info_type: "I".to_string(),
            mailbox: "J".to_string(),
            approvers: "K".to_string(),
            form_link: "L".to_string(),
            assist_groups: "M".to_string(),
            user_groups: "N".to_string(),
        }
    }
}

impl DetailColumns {
    pub fn resolve(&self) -> Result<ColumnMap, AppError> {
        Ok(ColumnMap {
            category: column_letter_to_index(&self.category)?,
            subcategory: column_letter_to_index(&self.subcategory)?,
            item: column_letter_to_index(&self.item)?,
            field_title: column_letter_to_index(&self.field_title)?,
            field_type: column_letter_to_index(&self.field_type)?,
            sla: column_letter_to_index(&self.sla)?,
            group: column_letter_to_index(&self.group)?,
            info_type: column_letter_to_index(&self.info_type)?,
            mailbox: column_letter_to_index(&self.mailbox)?,
            approvers: column_letter_to_index(&self.approvers)?,
            form_link: column_letter_to_index(&self.form_link)?,
            assist_groups: column_letter_to_index(&self.assist_groups)?,
            user_groups: column_letter_to_index(&self.user_groups)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub category: u32,
    pub subcategory: u32,
    pub item: u32,
    pub field_title: u32,
    pub field_type: u32,
    pub sla: u32,
    pub group: u32,
    pub info_type: u32,
    pub mailbox: u32,
    pub approvers: u32,
    pub form_link: u32,
    pub assist_groups: u32,
    pub user_groups: u32,
}

impl ColumnMap {
    pub fn from_category_column(category: u32) -> Self {
        Self {
            category,
            subcategory: category + 1,
            item: category + 2,
            field_title: category + 3,
            field_type: category + 4,
            sla: category + 5,
            group: category + 6,
            info_type: category + 7,
            mailbox: category + 8,
            approvers: category + 9,
            form_link: category + 10,
            assist_groups: category + 11,
            user_groups: category + 12,
        }
    }

    pub fn all(&self) -> [u32; 13] {
        [
            self.category,
            self.subcategory,
            self.item,
            self.field_title,
            self.field_type,
            self.sla,
            self.group,
            self.info_type,
            self.mailbox,
            self.approvers,
            self.form_link,
            self.assist_groups,
            self.user_groups,
        ]
    }

    pub fn first(&self) -> u32 {
        self.all().into_iter().min().unwrap_or(self.category)
    }

    pub fn last(&self) -> u32 {
        self.all().into_iter().max().unwrap_or(self.user_groups)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateLayout {
    pub sheet_name: String,
    pub title_cell: String,
    pub general_cells: GeneralCells,
    pub detail_start_row: u32,
    pub columns: DetailColumns,
    pub category_header_label: String,
    pub trailing_label: String,
    pub trailing_label_row: u32,
    pub trailing_column: String,
    pub margin_rows: u32,
    pub scan_rows: u32,
    pub scan_cols: u32,
    pub flowchart_width_px: u32,
    pub flowchart_height_px: u32,
    pub default_title: String,
    pub file_name_prefix: String,
    pub fallback_file_name: String,
    pub max_additional_fields: usize,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Hoja1".to_string(),
            title_cell: "B1".to_string(),
            general_cells: GeneralCells::default(),
            detail_start_row: 20,
            columns: DetailColumns::default(),
            category_header_label: "CATEGORÍA".to_string(),
            trailing_label: "FLUJOGRAMA".to_string(),
            trailing_label_row: 49,
            trailing_column: "B".to_string(),
            margin_rows: 3,
            scan_rows: 200,
            scan_cols: 30,
            flowchart_width_px: 800,
            flowchart_height_px: 450,
            default_title: "DOCUMENTACIÓN MESA DE SERVICIOS".to_string(),
            file_name_prefix: "DOCUMENTACION - ".to_string(),
            fallback_file_name: "MESA DE SERVICIOS".to_string(),
            max_additional_fields: 30,
        }
    }
}

impl TemplateLayout {
    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let mut layout: Self = JsonUtil::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    // Rejects unusable anchors and clamps the margin to at least one row.
    pub fn validate(&mut self) -> Result<(), AppError> {
        if self.sheet_name.trim().is_empty() {
            return Err(AppError::InvalidInput("sheet name is empty".to_string()));
        }
        CellAddress::parse(&self.title_cell)?;
        for (field, cell) in self.general_cells.entries() {
            CellAddress::parse(cell).map_err(|_| {
                AppError::InvalidInput(format!("invalid cell for {field}: {cell}"))
            })?;
        }
        self.columns.resolve()?;
        column_letter_to_index(&self.trailing_column)?;

        if self.detail_start_row < 3 {
            return Err(AppError::InvalidInput(format!(
                "detail start row must leave room for the header: {}",
                self.detail_start_row
            )));
        }
        if self.category_header_label.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "category header label is empty".to_string(),
            ));
        }
        if self.scan_rows == 0 || self.scan_cols == 0 {
            return Err(AppError::InvalidInput("scan limits must be positive".to_string()));
        }
        if self.margin_rows == 0 {
            warn!("margin of 0 rows would let the table touch the trailing label; using 1");
            self.margin_rows = 1;
        }
        Ok(())
    }

    pub fn trailing_column_index(&self) -> Result<u32, AppError> {
        column_letter_to_index(&self.trailing_column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub font_name: String,
    pub font_size: f64,
    pub label_font_size: f64,
    // ARGB.
    pub separator_fill: String,
    pub border_color: String,
    pub min_row_height: f64,
    pub item_dividers: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: "Calibri".to_string(),
            font_size: 10.0,
            label_font_size: 12.0,
            separator_fill: "FFD9D9D9".to_string(),
            border_color: "FF000000".to_string(),
            min_row_height: 18.0,
            item_dividers: true,
        }
    }
}

impl StyleConfig {
    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let config: Self = JsonUtil::from_str(text)?;
        if config.font_size <= 0.0 || config.label_font_size <= 0.0 {
            return Err(AppError::InvalidInput("font sizes must be positive".to_string()));
        }
        Ok(config)
    }
}
