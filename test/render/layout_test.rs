#[path = "../blackbox/common/mod.rs"]
mod common;

use common::{category, corporate_template, item, range, subcategory, tree_ending_at_40};
use servicedoc_xlsx::config::ColumnMap;
use servicedoc_xlsx::document::{AdditionalField, Category, Item, Subcategory};
use servicedoc_xlsx::render::displacement::{desired_label_row, displace_trailing_block};
use servicedoc_xlsx::render::estimate::{estimate_last_row, total_rows};
use servicedoc_xlsx::render::reset::reset_area;
use servicedoc_xlsx::render::table::{DetailLayout, RowSpan, SeparatorKind, TableRenderer};
use servicedoc_xlsx::xlsx::cell_address::{CellAddress, CellRange};
use servicedoc_xlsx::xlsx::sheet_model::{CellValue, Worksheet};
use servicedoc_xlsx::xlsx::TemplateWorkbook;

const START: u32 = 20;

fn columns() -> ColumnMap {
    ColumnMap::from_category_column(2)
}

fn render(tree: &[Category]) -> (Worksheet, DetailLayout) {
    let mut sheet = Worksheet::default();
    let layout = TableRenderer::new(columns(), START, 30).render(&mut sheet, tree);
    (sheet, layout)
}

fn mixed_tree() -> Vec<Category> {
    vec![
        category(
            "Hardware",
            vec![
                subcategory("Laptops", "Jane\nBob", vec![item("A", 0), item("B", 4), item("C", 1)]),
                subcategory("Impresoras", "Luis", vec![item("D", 2)]),
                subcategory("Monitores", "Ana", vec![item("E", 9), item("F", 3)]),
            ],
        ),
        category("Software", vec![subcategory("Office", "Eva", vec![item("G", 0)])]),
        category(
            "Redes",
            vec![
                subcategory("VPN", "Leo", vec![item("H", 5)]),
                subcategory("WiFi", "Leo", vec![item("I", 2), item("J", 2)]),
            ],
        ),
    ]
}

#[test]
fn estimate_matches_rendered_last_row() {
    let trees = vec![
        mixed_tree(),
        tree_ending_at_40().categories,
        vec![category("Solo", vec![subcategory("Uno", "", vec![item("x", 30)])])],
        vec![
            category("Vacía", vec![]),
            category("Otra", vec![subcategory("S", "", vec![item("y", 0)])]),
        ],
    ];
    for tree in trees {
        let (_, layout) = render(&tree);
        assert_eq!(layout.last_row, estimate_last_row(&tree, START));
        assert!(layout.merge_conflicts.is_empty());
    }
}

#[test]
fn every_item_takes_max_of_two_and_field_count() {
    let tree = mixed_tree();
    let (_, layout) = render(&tree);
    let expected: Vec<u32> = tree
        .iter()
        .flat_map(|c| &c.subcategories)
        .flat_map(|s| &s.items)
        .map(|i| (i.additional_fields.len() as u32).max(2))
        .collect();
    let actual: Vec<u32> = layout.items.iter().map(|i| i.rows.len()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn approvers_merge_covers_exactly_the_subcategory_items() {
    let tree = mixed_tree();
    let (sheet, layout) = render(&tree);
    let approvers = columns().approvers;

    for span in &layout.subcategories {
        let merge = sheet
            .merge_at(CellAddress::new(span.start, approvers))
            .expect("approvers merge");
        assert_eq!((merge.start.row, merge.end.row), (span.start, span.end));

        let items: Vec<RowSpan> = layout
            .items
            .iter()
            .map(|i| i.rows)
            .filter(|rows| span.contains(rows.start))
            .collect();
        assert_eq!(items.first().map(|r| r.start), Some(span.start));
        assert_eq!(items.last().map(|r| r.end), Some(span.end));
        assert!(layout.separators.iter().all(|(row, _)| !span.contains(*row)));
    }
}

#[test]
fn separators_sit_between_siblings_only() {
    let tree = mixed_tree();
    let (sheet, layout) = render(&tree);

    let subcategory_rows: Vec<u32> = layout
        .separators
        .iter()
        .filter(|(_, kind)| *kind == SeparatorKind::Subcategory)
        .map(|(row, _)| *row)
        .collect();
    let category_rows: Vec<u32> = layout
        .separators
        .iter()
        .filter(|(_, kind)| *kind == SeparatorKind::Category)
        .map(|(row, _)| *row)
        .collect();

    // Hardware has three subcategories, Redes two.
    assert_eq!(subcategory_rows.len(), 3);
    assert_eq!(category_rows.len(), 4);
    for pair in layout.subcategories.windows(2) {
        let gap = pair[1].start - pair[0].end - 1;
        assert!(gap == 1 || gap == 2, "gap of {gap} rows");
    }
    for pair in layout.categories.windows(2) {
        assert_eq!(pair[1].start - pair[0].end - 1, 2);
    }
    assert!(!layout.separators.iter().any(|(row, _)| *row == layout.last_row));

    let first = category_rows[0];
    assert_eq!(
        sheet.merge_at(CellAddress::new(first, 8)),
        Some(CellRange::from_bounds(first, 2, first, 14))
    );
}

#[test]
fn scenario_a_row_layout() {
    let tree = vec![category(
        "Hardware",
        vec![subcategory("Laptops", "Jane\nBob", vec![item("Replace battery", 0)])],
    )];
    let (sheet, layout) = render(&tree);
    assert_eq!(layout.occupied(), Some(RowSpan::new(20, 21)));
    assert_eq!(sheet.merge_at(CellAddress::new(21, 2)), Some(range("B20:B21")));
    assert_eq!(sheet.merge_at(CellAddress::new(21, 3)), Some(range("C20:C21")));
    assert_eq!(sheet.merge_at(CellAddress::new(21, 11)), Some(range("K20:K21")));
    assert_eq!(sheet.text(CellAddress::new(20, 11)), "Jane\nBob");
}

#[test]
fn scenario_c_two_categories_use_six_rows() {
    let tree = vec![
        category("A", vec![subcategory("S1", "", vec![item("x", 0)])]),
        category("B", vec![subcategory("S2", "", vec![item("y", 0)])]),
    ];
    let (sheet, layout) = render(&tree);
    assert_eq!(layout.last_row, 25);
    assert_eq!(layout.categories, vec![RowSpan::new(20, 21), RowSpan::new(24, 25)]);
    assert_eq!(sheet.text(CellAddress::new(24, 4)), "y");
}

#[test]
fn scenario_d_inserts_thirteen_rows_at_the_label() {
    assert_eq!(desired_label_row(30, 40, 3), 43);

    let mut workbook = TemplateWorkbook::open(&corporate_template(), "Hoja1").expect("open");
    let moved = displace_trailing_block(&mut workbook, 49, 60, 3).expect("displace");
    assert_eq!(moved.label_row, 63);
    assert_eq!(moved.inserted_rows, 14);
    assert_eq!(workbook.sheet().text(CellAddress::new(63, 2)), "FLUJOGRAMA");
    assert_eq!(workbook.sheet().text(CellAddress::new(49, 2)), "");
    assert_eq!(workbook.sheet().text(CellAddress::new(3, 2)), "Nombre del servicio");
}

#[test]
fn displacement_is_a_no_op_with_enough_room() {
    let mut workbook = TemplateWorkbook::open(&corporate_template(), "Hoja1").expect("open");
    let moved = displace_trailing_block(&mut workbook, 49, 30, 3).expect("displace");
    assert_eq!(moved.label_row, 49);
    assert_eq!(moved.inserted_rows, 0);
    assert_eq!(workbook.sheet().text(CellAddress::new(49, 2)), "FLUJOGRAMA");
}

#[test]
fn scenario_e_empty_tree() {
    let (sheet, layout) = render(&[]);
    assert_eq!(layout.last_row, START - 1);
    assert_eq!(estimate_last_row(&[], START), START - 1);
    assert!(sheet.merges().is_empty());
}

#[test]
fn reset_twice_leaves_identical_region() {
    let mut workbook = TemplateWorkbook::open(&corporate_template(), "Hoja1").expect("open");
    let region = range("B20:N48");
    let sheet = workbook.sheet_mut();

    assert_eq!(reset_area(sheet, region), 2);
    let merges_after_first = sheet.merges().to_vec();
    let text_after_first: Vec<String> = region.cells().map(|a| sheet.text(a)).collect();

    assert_eq!(reset_area(sheet, region), 0);
    assert_eq!(sheet.merges(), merges_after_first.as_slice());
    let text_after_second: Vec<String> = region.cells().map(|a| sheet.text(a)).collect();
    assert_eq!(text_after_first, text_after_second);
    assert!(text_after_second.iter().all(String::is_empty));
    assert_eq!(sheet.merge_at(CellAddress::new(18, 2)), Some(range("B18:B19")));
}

#[test]
fn merge_conflicts_are_recorded_and_rendering_continues() {
    let mut sheet = Worksheet::default();
    sheet.merge(range("D20:E20")).expect("stray merge");

    let tree = vec![category(
        "Hardware",
        vec![subcategory("Laptops", "Jane", vec![item("Replace battery", 0)])],
    )];
    let layout = TableRenderer::new(columns(), START, 30).render(&mut sheet, &tree);

    assert_eq!(layout.merge_conflicts, vec!["D20:D21".to_string()]);
    assert_eq!(layout.last_row, estimate_last_row(&tree, START));
    assert_eq!(layout.last_row, 21);
    assert_eq!(sheet.merge_at(CellAddress::new(20, 5)), Some(range("D20:E20")));
    assert_eq!(sheet.text(CellAddress::new(20, 4)), "Replace battery");
    assert_eq!(sheet.text(CellAddress::new(20, 11)), "Jane");
    assert_eq!(sheet.merge_at(CellAddress::new(21, 11)), Some(range("K20:K21")));
}

#[test]
fn items_take_at_least_two_rows_in_the_estimate() {
    let one = |fields| vec![category("A", vec![subcategory("S", "", vec![item("x", fields)])])];
    assert_eq!(estimate_last_row(&one(0), START), 21);
    assert_eq!(estimate_last_row(&one(3), START), 22);
}

#[test]
fn estimate_counts_separators_between_siblings() {
    let two_categories = vec![
        category("A", vec![subcategory("S", "", vec![item("x", 0)])]),
        category("B", vec![subcategory("T", "", vec![item("y", 0)])]),
    ];
    assert_eq!(total_rows(&two_categories), 6);

    let two_subcategories = vec![category(
        "A",
        vec![
            subcategory("S", "", vec![item("x", 0)]),
            subcategory("T", "", vec![item("y", 1), item("z", 4)]),
        ],
    )];
    assert_eq!(total_rows(&two_subcategories), 2 + 1 + 2 + 4);
}

#[test]
fn empty_groups_take_no_rows_but_keep_their_separators() {
    let tree = vec![
        category(
            "A",
            vec![
                subcategory("Vacia", "", vec![]),
                subcategory("S", "", vec![item("x", 5), item("y", 0)]),
                subcategory("T", "", vec![item("z", 2)]),
            ],
        ),
        category("Sin datos", vec![]),
        category("C", vec![subcategory("U", "", vec![item("w", 1)])]),
    ];
    let leading_empty = vec![category(
        "A",
        vec![subcategory("Vacia", "", vec![]), subcategory("S", "", vec![item("x", 0)])],
    )];
    assert_eq!(total_rows(&leading_empty), 3);

    let (_, layout) = render(&tree);
    assert_eq!(layout.last_row, estimate_last_row(&tree, START));
    assert!(layout.merge_conflicts.is_empty());
}

#[test]
fn uniform_item_approvers_become_the_subcategory_text() {
    let with_override = |name: &str| Item {
        approvers: "Ana".to_string(),
        ..item(name, 0)
    };
    let uniform = Subcategory {
        items: vec![with_override("a"), with_override("b")],
        ..subcategory("S", "Jane", vec![])
    };
    let (sheet, _) = render(&[category("A", vec![uniform])]);
    assert_eq!(sheet.text(CellAddress::new(START, columns().approvers)), "Ana");

    let mixed = subcategory("S", "Jane", vec![item("c", 0), with_override("d")]);
    let (sheet, _) = render(&[category("A", vec![mixed])]);
    assert_eq!(sheet.text(CellAddress::new(START, columns().approvers)), "Jane");
}

#[test]
fn required_field_titles_are_marked() {
    let mut required = item("x", 0);
    required.additional_fields = vec![
        AdditionalField {
            title: "Serie".to_string(),
            required: true,
            ..AdditionalField::default()
        },
        AdditionalField {
            title: "Foto".to_string(),
            ..AdditionalField::default()
        },
    ];
    let (sheet, _) = render(&[category("A", vec![subcategory("S", "", vec![required])])]);
    assert_eq!(sheet.text(CellAddress::new(20, columns().field_title)), "Serie *");
    assert_eq!(sheet.text(CellAddress::new(21, columns().field_title)), "Foto");
}

#[test]
fn desired_label_row_keeps_margin_and_never_moves_up() {
    assert_eq!(desired_label_row(30, 40, 3), 43);
    assert_eq!(desired_label_row(49, 21, 3), 49);
    assert_eq!(desired_label_row(49, 46, 3), 49);
    assert_eq!(desired_label_row(49, 47, 3), 50);
}

#[test]
fn reset_clears_values_styles_and_touching_merges() {
    let mut sheet = Worksheet::default();
    sheet.set_value(CellAddress::new(20, 2), CellValue::text("viejo"));
    sheet.set_style(CellAddress::new(20, 2), Some(7));
    sheet.merge(range("B20:B23")).expect("merge");
    sheet.merge(range("E19:F20")).expect("merge");

    let region = range("B20:N30");
    assert_eq!(reset_area(&mut sheet, region), 2);
    assert!(sheet.merges().is_empty());
    assert_eq!(sheet.value(CellAddress::new(20, 2)), CellValue::Empty);
    assert_eq!(sheet.style(CellAddress::new(20, 2)), None);

    assert_eq!(reset_area(&mut sheet, region), 0);
    assert!(sheet.used_range().is_none());
}
