use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("sequence matrix is empty, nothing to project")]
    EmptyMatrix,
    #[error("cannot extract {requested} components from a {rows}x{cols} matrix")]
    TooManyComponents {
        requested: usize,
        rows: usize,
        cols: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Pca {
    /// Column-per-component basis, d x k.
    pub components: Array2<f64>,
    /// Explained variance per component, descending.
    pub eigenvalues: Vec<f64>,
    /// Projected data, n x k.
    pub projected: Array2<f64>,
}

/// Principal component analysis via power iteration with deflation. The
/// covariance matrix here is at most d x d for d-dimensional embeddings, so
/// the iterative method is plenty.
pub fn pca(matrix: &Array2<f64>, components: usize) -> Result<Pca, ProjectionError> {
    let (n, d) = matrix.dim();
    if n == 0 || d == 0 {
        return Err(ProjectionError::EmptyMatrix);
    }
    if components > n.min(d) {
        return Err(ProjectionError::TooManyComponents {
            requested: components,
            rows: n,
            cols: d,
        });
    }

    let mean = matrix
        .mean_axis(Axis(0))
        .ok_or(ProjectionError::EmptyMatrix)?;
    let centered = matrix - &mean;

    let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
    let mut cov = centered.t().dot(&centered) / denom;

    let mut basis = Array2::<f64>::zeros((d, components));
    let mut eigenvalues = Vec::with_capacity(components);
    for c in 0..components {
        let (v, lambda) = dominant_eigenvector(&cov);
        basis.column_mut(c).assign(&v);
        eigenvalues.push(lambda);
        // Deflate so the next iteration converges on the next component.
        let outer = outer_product(&v, &v);
        cov = cov - outer * lambda;
    }

    let projected = centered.dot(&basis);
    Ok(Pca {
        components: basis,
        eigenvalues,
        projected,
    })
}

fn dominant_eigenvector(m: &Array2<f64>) -> (Array1<f64>, f64) {
    let d = m.nrows();
    // Deterministic, not-axis-aligned start vector.
    let mut v = Array1::from_shape_fn(d, |i| 1.0 + (i as f64) * 1e-3);
    let norm = norm2(&v);
    v /= norm;

    let mut lambda = 0.0;
    for _ in 0..500 {
        let w = m.dot(&v);
        let n = norm2(&w);
        if n < 1e-12 {
            // Degenerate direction (zero variance); current unit vector stands.
            return (v, 0.0);
        }
        let next = w / n;
        let delta = (&next - &v).mapv(f64::abs).sum();
        v = next;
        lambda = v.dot(&m.dot(&v));
        if delta < 1e-12 {
            break;
        }
    }
    (v, lambda)
}

fn outer_product(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    let (la, lb) = (a.len(), b.len());
    Array2::from_shape_fn((la, lb), |(i, j)| a[i] * b[j])
}

fn norm2(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}
