mod support;

use activevol::classify::{IntensityClassifier, scan_boundaries, strip_width};

#[test]
fn plateau_ramp_boundaries() {
    let (dims, smoothed) = support::plateau_ramp();
    assert_eq!(strip_width(dims.nx), 8);

    let scan = scan_boundaries(&smoothed, dims).unwrap();
    assert_eq!(scan.black, 10.0);
    // every row of the 4x4 cross-section is inside the central window
    assert_eq!(scan.rows.len(), 16);
    for row in &scan.rows {
        assert_eq!((row.left, row.right), (28, 187));
    }

    let histogram = scan.band_histogram(&smoothed, dims);
    assert_eq!(histogram.total(), 16 * 2 * 8);
    for (bin, &count) in histogram.counts().iter().enumerate() {
        let expected = if (52..=66).contains(&bin) && bin % 2 == 0 { 32 } else { 0 };
        assert_eq!(count, expected, "bin {bin}");
    }
}

#[test]
fn plateau_ramp_classification() {
    let (dims, smoothed) = support::plateau_ramp();
    let mut classifier = IntensityClassifier::new();
    let c = classifier.classify(&smoothed, dims).unwrap();

    // the full histogram is empty between the dark level and the first ramp step
    assert_eq!(c.index_min_color, 11);
    assert_eq!(c.black, Some(10.0));
    assert!(
        (44..=52).contains(&c.ind_black_left),
        "left bound {}",
        c.ind_black_left
    );
    assert!(
        (68..=90).contains(&c.ind_black_right),
        "right bound {}",
        c.ind_black_right
    );

    let curve = classifier.color_probability();
    let (l, r) = (c.ind_black_left, c.ind_black_right);
    assert!(curve[..=l].iter().all(|&p| p == 0.0));
    assert!(curve[r..].iter().all(|&p| p == 1.0));
    assert!(curve[l..=r].windows(2).all(|w| w[0] <= w[1]));

    let koefs = classifier.color_koefs();
    assert_eq!(koefs[11], 0.0);
    assert!(koefs[200] > koefs[100]);
    assert!(koefs.iter().all(|k| (0.0..1.0).contains(k)));
}

#[test]
fn contrast_free_volume_uses_full_histogram() {
    let (dims, smoothed) = support::plateau_ramp();
    let flat: Vec<f32> = smoothed.iter().map(|_| 30.0).collect();
    let mut classifier = IntensityClassifier::new();
    let c = classifier.classify(&flat, dims).unwrap();

    assert_eq!(c.black, None);
    assert_eq!(classifier.histogram().total(), dims.len() as u64);
    assert!(c.ind_black_left < 30 && 30 < c.ind_black_right);
}
