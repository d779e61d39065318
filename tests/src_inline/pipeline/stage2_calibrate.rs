use super::*;

#[test]
fn test_calibrate_affine() {
    let out = calibrate(&[0.0, 1.0, -2.0], 2.0, 0.5);
    assert_eq!(out, vec![0.5, 2.5, -3.5]);
}

#[test]
fn test_identity_is_noop() {
    let cal = Calibration::identity();
    assert!(cal.is_identity());
    let raw = vec![0.9, -0.5, 2.1];
    assert_eq!(calibrate(&raw, cal.scale, cal.offset), raw);
}

#[test]
fn test_inverse_round_trip() {
    let cal = Calibration::affinity_v1();
    let values = vec![-3.25, 0.0, 4.7, 11.0, 1e-9];
    let raw = calibrate_inverse(&values, cal.scale, cal.offset);
    let back = calibrate(&raw, cal.scale, cal.offset);
    for (a, b) in values.iter().zip(back.iter()) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
}

#[test]
fn test_apply_table_keeps_other_columns() {
    let table = PredictionTable {
        entity_ids: vec!["x".to_string(), "y".to_string()],
        frames: vec![3.0, 4.0],
        y_true: vec![6.0, 7.0],
        y_pred_raw: vec![0.0, 1.0],
        weights: vec![1.0, 0.25],
    };
    let cal = Calibration::affinity_v1();
    let rows = cal.apply_table(table);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].entity_id, "x");
    assert_eq!(rows[0].frame_id, 3.0);
    assert_eq!(rows[0].y_pred, cal.offset);
    assert!((rows[1].y_pred - (cal.scale + cal.offset)).abs() < 1e-12);
    assert_eq!(rows[1].y_true, 7.0);
    assert_eq!(rows[1].weight, 0.25);
}
