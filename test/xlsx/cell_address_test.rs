use servicedoc_xlsx::common::errors::AppError;
use servicedoc_xlsx::xlsx::cell_address::{
    column_index_to_letter, column_letter_to_index, CellAddress, CellRange,
};

#[test]
fn column_labels_round_trip() {
    for label in ["A", "B", "Z", "AA", "AZ", "BA", "ZZ", "AAA", "XFD"] {
        let index = column_letter_to_index(label).expect("index");
        assert_eq!(column_index_to_letter(index).expect("letter"), label);
    }
    assert_eq!(column_letter_to_index("aa").expect("lower"), 27);
    assert_eq!(column_index_to_letter(28).expect("letter"), "AB");
}

#[test]
fn invalid_columns_are_rejected() {
    for bad in ["", "A1", "-", "XFE"] {
        let err = column_letter_to_index(bad).expect_err(bad);
        assert!(matches!(err, AppError::InvalidCellAddress(_)));
    }
    assert!(column_index_to_letter(0).is_err());
}

#[test]
fn parse_and_format_cell_address() {
    let c12 = CellAddress::parse("C12").expect("valid address");
    assert_eq!(c12.row, 12);
    assert_eq!(c12.col, 3);
    assert_eq!(c12.to_a1(), "C12");
    assert!(matches!(
        CellAddress::parse("12A").expect_err("invalid"),
        AppError::InvalidCellAddress(_)
    ));
}

#[test]
fn ranges_grow_or_move_on_row_insertion() {
    let below = CellRange::parse("B49:G49").expect("range");
    let crossing = CellRange::parse("K20:K50").expect("range");
    let above = CellRange::parse("B18:B19").expect("range");
    assert_eq!(below.shifted_for_insert(49, 13).to_a1(), "B62:G62");
    assert_eq!(crossing.shifted_for_insert(49, 13).to_a1(), "K20:K63");
    assert_eq!(above.shifted_for_insert(49, 13), above);
    assert_eq!(CellRange::parse("D21:B20").expect("range").to_a1(), "B20:D21");
}
