use crate::matrix::Matrix;

/// Compute the arithmetic mean of every column.
///
/// # Arguments
///
/// * `mat` - The input matrix.
///
/// # Returns
///
/// A vector with one mean per column. A matrix without rows yields zeros.
pub fn column_means(mat: &Matrix) -> Vec<f64> {
    let mut means = vec![0.0; mat.cols()];
    if mat.rows() == 0 {
        return means;
    }

    for r in 0..mat.rows() {
        means
            .iter_mut()
            .zip(mat.row(r).iter())
            .for_each(|(m, v)| *m += v);
    }

    let n = mat.rows() as f64;
    means.iter_mut().for_each(|m| *m /= n);
    means
}

/// Subtract the column means from every row so each column has zero mean.
///
/// # Arguments
///
/// * `mat` - The matrix to center in place.
pub fn center_in_place(mat: &mut Matrix) {
    let means = column_means(mat);
    for r in 0..mat.rows() {
        mat.row_mut(r)
            .iter_mut()
            .zip(means.iter())
            .for_each(|(v, m)| *v -= m);
    }
}
