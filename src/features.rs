//! Lag-feature construction and the chronological train/test split.

use ndarray::{s, Array1, Array2};

use crate::data::SensorTable;

/// Build the supervised lag dataset from the cleaned, time-sorted table.
///
/// Output row `i` holds the target's previous `lags` values as features,
/// most recent first, with the value at row `i` as the label. The leading
/// `lags` rows have no full window and are dropped, so the result has
/// `len - lags` rows (or none when the table is too short).
pub fn make_supervised(table: &SensorTable, lags: usize) -> (Array2<f64>, Array1<f64>) {
    debug_assert!(lags >= 1);

    let series = &table.target;
    let n = series.len();
    if n <= lags {
        return (Array2::zeros((0, lags)), Array1::zeros(0));
    }

    let rows = n - lags;
    let mut x = Array2::zeros((rows, lags));
    let mut y = Array1::zeros(rows);
    for i in lags..n {
        let row = i - lags;
        for j in 0..lags {
            // Column j carries the value j + 1 steps back.
            x[[row, j]] = series[i - 1 - j];
        }
        y[row] = series[i];
    }
    (x, y)
}

/// Split aligned features and labels at `floor(n * ratio)`, keeping time
/// order. Nothing is shuffled, so a rerun over the same data reproduces the
/// exact same sets.
pub fn time_split(
    x: Array2<f64>,
    y: Array1<f64>,
    ratio: f64,
) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
    let n = x.nrows();
    let split = (n as f64 * ratio) as usize;

    let x_train = x.slice(s![..split, ..]).to_owned();
    let x_test = x.slice(s![split.., ..]).to_owned();
    let y_train = y.slice(s![..split]).to_owned();
    let y_test = y.slice(s![split..]).to_owned();
    (x_train, x_test, y_train, y_test)
}
