use wardheap_core::SampleMatrix;

/// Samples on the parabola `y = x²` for `x` in `0..count`.
#[must_use]
pub fn parabola(count: usize) -> SampleMatrix {
    let rows = (0..count)
        .map(|x| {
            let x = x as f64;
            vec![x, x * x]
        })
        .collect();
    SampleMatrix::try_from_rows(rows).expect("parabola samples are valid")
}

/// Two tight groups far apart on the line.
#[must_use]
pub fn two_groups() -> SampleMatrix {
    SampleMatrix::try_from_flat(1, vec![0.0, 0.2, 0.4, 50.0, 50.3]).expect("valid samples")
}
