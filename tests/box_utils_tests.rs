use tablegrid::utils::box_utils::{
    iob, iob_for_columns, non_maxima_suppression, sort_by_center_y, symmetric_iob,
    symmetric_iob_for_columns,
};
use tablegrid::{Bounds, StructureBox, StructureKind};

fn row(confidence: f64, top: f64, bottom: f64) -> StructureBox {
    StructureBox::new(
        confidence,
        StructureKind::Row,
        Bounds::new(0.0, top, 100.0, bottom),
    )
}

// Geometry Tests

#[test]
fn test_intersect_disjoint_is_empty() {
    let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let b = Bounds::new(20.0, 20.0, 30.0, 30.0);
    let intersection = a.intersect(&b);
    assert_eq!(intersection.area(), 0.0);
    assert_eq!(intersection, Bounds::zero());
}

#[test]
fn test_iob_is_asymmetric() {
    // Box 1: 0,0 to 10,10 (Area 100)
    // Box 2: 0,0 to 20,20 (Area 400)
    let small = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let large = Bounds::new(0.0, 0.0, 20.0, 20.0);
    assert!((iob(&small, &large) - 1.0).abs() < 1e-6);
    assert!((iob(&large, &small) - 0.25).abs() < 1e-6);
    assert!((symmetric_iob(&large, &small) - 1.0).abs() < 1e-6);
}

#[test]
fn test_column_variants_ignore_y() {
    let word = Bounds::new(10.0, 500.0, 20.0, 510.0);
    let column = Bounds::new(15.0, 0.0, 60.0, 10.0);
    assert!((iob_for_columns(&word, &column) - 0.5).abs() < 1e-6);
    assert!((symmetric_iob_for_columns(&column, &word) - 0.5).abs() < 1e-6);
}

#[test]
fn test_degenerate_bounds() {
    let point = Bounds::new(5.0, 5.0, 5.0, 5.0);
    assert!(point.is_empty());
    assert_eq!(iob(&point, &Bounds::new(0.0, 0.0, 10.0, 10.0)), 0.0);
}

// Non-Maxima Suppression Tests

#[test]
fn test_nms_is_idempotent() {
    let mut rows = vec![
        row(0.9, 0.0, 10.0),
        row(0.4, 1.0, 11.0),
        row(0.8, 10.0, 20.0),
        row(0.7, 19.0, 30.0),
        row(0.95, 30.0, 40.0),
        row(0.2, 31.0, 39.0),
    ];
    sort_by_center_y(&mut rows);

    let first = non_maxima_suppression(&mut rows, 0.1);
    let survivors = rows.clone();
    let second = non_maxima_suppression(&mut rows, 0.1);

    assert!(first > 0);
    assert_eq!(second, 0);
    assert_eq!(rows, survivors);
}

#[test]
fn test_nms_keeps_adjacent_pairs_clean() {
    let mut rows: Vec<StructureBox> = (0..20)
        .map(|i| {
            let top = i as f64 * 4.0;
            row(0.5 + (i % 3) as f64 * 0.1, top, top + 10.0)
        })
        .collect();
    sort_by_center_y(&mut rows);

    non_maxima_suppression(&mut rows, 0.1);

    for pair in rows.windows(2) {
        assert!(iob(&pair[0].bounds, &pair[1].bounds) <= 0.1);
    }
}

#[test]
fn test_nms_empty_input() {
    let mut rows: Vec<StructureBox> = Vec::new();
    assert_eq!(non_maxima_suppression(&mut rows, 0.1), 0);
}
