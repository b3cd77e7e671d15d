//! Small dense least-squares polynomial fitting.

/// Fits `y = c0 + c1*x + ... + c_degree*x^degree` to the points in the
/// least-squares sense and returns the coefficients, lowest power first.
///
/// Returns `None` when there are fewer points than coefficients or the
/// normal equations are singular.
pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = degree + 1;
    if xs.len() != ys.len() || xs.len() < n {
        return None;
    }

    // Normal equations (A^T A) c = A^T y with A the Vandermonde matrix.
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; n];
    for (&x, &y) in xs.iter().zip(ys) {
        let mut xp = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += xp;
            if k < n {
                rhs[k] += xp * y;
            }
            xp *= x;
        }
    }

    let mut matrix: Vec<Vec<f64>> = (0..n).map(|row| power_sums[row..row + n].to_vec()).collect();
    solve_in_place(&mut matrix, &mut rhs)?;
    Some(rhs)
}

/// Evaluates a polynomial given lowest power first.
pub fn evaluate_polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Gaussian elimination with partial pivoting; the solution replaces `rhs`.
fn solve_in_place(matrix: &mut [Vec<f64>], rhs: &mut [f64]) -> Option<()> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))?;
        if matrix[pivot][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * rhs[k]).sum();
        rhs[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_quartic() {
        let coefficients = [0.3, -0.2, 0.05, 0.01, -0.002];
        let xs: Vec<f64> = [0.0, 1.0, 2.0, 3.0, 6.0, 7.0, 8.0, 9.0].iter().map(|x| x - 4.5).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| evaluate_polynomial(&coefficients, x)).collect();

        let fitted = fit_polynomial(&xs, &ys, 4).unwrap();
        for (a, b) in fitted.iter().zip(coefficients) {
            assert!((a - b).abs() < 1e-6, "{:?}", fitted);
        }
    }

    #[test]
    fn test_line_through_noisy_points() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.1, 4.9, 7.0];
        let line = fit_polynomial(&xs, &ys, 1).unwrap();
        assert!((line[1] - 1.98).abs() < 1e-9);
        assert!((line[0] - 1.03).abs() < 1e-9);
    }

    #[test]
    fn test_underdetermined_fit() {
        assert!(fit_polynomial(&[0.0, 1.0], &[1.0, 2.0], 2).is_none());
        assert!(fit_polynomial(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 2).is_none());
    }

    #[test]
    fn test_evaluate_polynomial() {
        assert_eq!(evaluate_polynomial(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(evaluate_polynomial(&[], 2.0), 0.0);
    }
}
