use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

/// Matrix-vector multiply: result[i] = sum_j mat[i][j] * v[j].
pub(crate) fn matrix_vector_multiply(mat: &[Vec<Decimal>], v: &[Decimal]) -> Vec<Decimal> {
    mat.iter()
        .map(|row| row.iter().zip(v.iter()).map(|(a, b)| *a * *b).sum())
        .collect()
}

/// Portfolio variance: w' * Sigma * w.
pub(crate) fn portfolio_variance(w: &[Decimal], cov: &[Vec<Decimal>]) -> Decimal {
    let sigma_w = matrix_vector_multiply(cov, w);
    w.iter().zip(sigma_w.iter()).map(|(wi, sw)| *wi * *sw).sum()
}

/// Square root, clamped to zero for non-positive input.
pub(crate) fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}
