use servicedoc_xlsx::common::errors::AppError;
use servicedoc_xlsx::config::{ColumnMap, TemplateLayout};
use servicedoc_xlsx::document::{FieldType, Item, ServiceDocument, Subcategory};

#[test]
fn wizard_draft_decodes_with_defaults() {
    let json = r#"{
        "id": "doc-1",
        "general": {"nombreServicio": "Soporte TI"},
        "detalle": [{
            "id": "c1", "nombre": "Hardware",
            "subcategorias": [{
                "id": "s1", "nombre": "Laptops", "aprobadores": "Jane\nBob",
                "items": [{
                    "id": "i1", "itemNombre": "Replace battery",
                    "camposAdicionales": [{"titulo": "Serie", "tipo": "Número", "requerido": true}],
                    "grupo": {"titulo": "N1", "contenido": "Mesa\nCampo"}
                }]
            }]
        }]
    }"#;
    let document = ServiceDocument::from_json_str(json).expect("decode");
    assert_eq!(document.general.service_name, "Soporte TI");
    let subcategory = &document.categories[0].subcategories[0];
    let item = &subcategory.items[0];
    assert_eq!(item.additional_fields[0].field_type, FieldType::Number);
    assert!(item.additional_fields[0].required);
    assert_eq!(item.group.content, "Mesa\nCampo");
    assert_eq!(item.effective_approvers(subcategory), "Jane\nBob");
    assert_eq!(item.row_count(), 2);
    assert!(document.flowchart.is_none());
}

#[test]
fn field_types_accept_codes_and_labels() {
    let types: Vec<FieldType> =
        serde_json::from_str(r#"["single-select", "Casilla", "Checkbox", "Fecha y hora"]"#)
            .expect("types");
    assert_eq!(
        types,
        vec![
            FieldType::SingleSelect,
            FieldType::Checkbox,
            FieldType::Checkbox,
            FieldType::Datetime
        ]
    );
    assert_eq!(FieldType::MultiSelect.label(), "Selección múltiple");
}

#[test]
fn item_override_wins_over_subcategory_approvers() {
    let subcategory = Subcategory {
        approvers: "Jane".to_string(),
        ..Subcategory::default()
    };
    let item = Item {
        approvers: "Ana".to_string(),
        ..Item::default()
    };
    assert_eq!(item.effective_approvers(&subcategory), "Ana");
    assert_eq!(Item::default().effective_approvers(&subcategory), "Jane");
}

#[test]
fn layout_defaults_match_corporate_template() {
    let layout = TemplateLayout::default();
    let columns = layout.columns.resolve().expect("columns");
    assert_eq!(columns, ColumnMap::from_category_column(2));
    assert_eq!(columns.first(), 2);
    assert_eq!(columns.last(), 14);
    assert_eq!(layout.general_cells.reviewed_by, "C15");
}

#[test]
fn partial_layout_keeps_defaults_and_clamps_margin() {
    let layout = TemplateLayout::from_json_str(r#"{"sheetName":"Servicios","marginRows":0}"#)
        .expect("layout");
    assert_eq!(layout.sheet_name, "Servicios");
    assert_eq!(layout.margin_rows, 1);
    assert_eq!(layout.detail_start_row, 20);
}

#[test]
fn invalid_column_letter_is_rejected() {
    let err = TemplateLayout::from_json_str(r#"{"columns":{"sla":"G1"}}"#).expect_err("invalid");
    assert!(matches!(err, AppError::InvalidCellAddress(_)));
}
