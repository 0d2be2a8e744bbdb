use servicedoc_xlsx::common::errors::AppError;
use servicedoc_xlsx::common::fs::FsUtil;
use servicedoc_xlsx::config::{StyleConfig, TemplateLayout};
use servicedoc_xlsx::document::{FieldType, ServiceDocument};
use servicedoc_xlsx::render::anchors::AnchorSource;
use servicedoc_xlsx::render::table::RowSpan;
use servicedoc_xlsx::render::RenderReport;
use serde_json::json;

#[test]
fn resolve_xlsx_path_requires_xlsx_extension() {
    let err = FsUtil::resolve_xlsx_path("demo.ods").expect_err("should fail");
    assert!(matches!(err, AppError::InvalidPath(_)));
    assert!(FsUtil::resolve_xlsx_path("  ").is_err());
    assert!(FsUtil::resolve_xlsx_path("salida.XLSX").expect("upper").is_absolute());
}

#[test]
fn read_missing_template_reports_file_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("no-existe.xlsx");
    let err = FsUtil::read_xlsx(&path.to_string_lossy()).expect_err("missing");
    assert!(matches!(err, AppError::FileNotFound(_)));
}

#[test]
fn layout_json_uses_camel_case_keys() {
    let layout = TemplateLayout::from_json_str(
        r#"{
            "detailStartRow": 22,
            "trailingLabel": "DIAGRAMA",
            "columns": {"approvers": "P"},
            "flowchartWidthPx": 640
        }"#,
    )
    .expect("layout");
    assert_eq!(layout.detail_start_row, 22);
    assert_eq!(layout.trailing_label, "DIAGRAMA");
    assert_eq!(layout.columns.resolve().expect("columns").approvers, 16);
    assert_eq!(layout.flowchart_width_px, 640);
    assert_eq!(layout.flowchart_height_px, 450);
}

#[test]
fn layout_rejects_start_row_without_header_room() {
    let err = TemplateLayout::from_json_str(r#"{"detailStartRow": 2}"#).expect_err("start row");
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn style_config_rejects_non_positive_sizes() {
    assert!(StyleConfig::from_json_str(r#"{"fontSize": 0}"#).is_err());
    let style = StyleConfig::from_json_str(r#"{"separatorFill": "FFCCCCCC"}"#).expect("style");
    assert_eq!(style.separator_fill, "FFCCCCCC");
    assert!(style.item_dividers);
}

#[test]
fn document_decodes_from_json_value() {
    let document = ServiceDocument::from_json_value(json!({
        "general": {"serviceName": "Correo"},
        "categories": [{
            "name": "Cuentas",
            "subcategories": [{
                "name": "Altas",
                "items": [{
                    "name": "Crear buzón",
                    "additionalFields": [{"title": "Área", "fieldType": "single-select"}],
                    "assistGroups": {"title": "N2", "content": "Correo"}
                }]
            }]
        }],
        "flowchart": {"fileName": "f.png", "mimeType": "image/png", "data": ""}
    }))
    .expect("document");
    assert_eq!(document.item_count(), 1);
    let item = &document.categories[0].subcategories[0].items[0];
    assert_eq!(item.additional_fields[0].field_type, FieldType::SingleSelect);
    assert_eq!(item.assist_groups.title, "N2");
    assert!(document.flowchart.is_some());
}

#[test]
fn render_report_serializes_for_logging() {
    let report = RenderReport {
        sheet: "Hoja1".to_string(),
        anchor_source: AnchorSource::Scanned,
        detail_start_row: 20,
        occupied_rows: Some(RowSpan::new(20, 25)),
        trailing_label_row: Some(49),
        inserted_rows: 0,
        merges_cleared: 2,
        merge_conflicts: vec![],
        flowchart_embedded: false,
    };
    let value = report.to_json().expect("json");
    assert_eq!(value["anchorSource"], "scanned");
    assert_eq!(value["occupiedRows"], json!({"start": 20, "end": 25}));
    assert_eq!(value["trailingLabelRow"], 49);
}
