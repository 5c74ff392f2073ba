use apachescope::plot::{scatter_2d, scatter_3d, PlotError};
use ndarray::Array2;
use std::fs;
use tempfile::tempdir;

fn points(cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((20, cols), |(i, j)| (i as f64) * 0.5 - (j as f64))
}

#[test]
fn renders_2d_scatter_as_svg() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pca_2d.svg");
    scatter_2d(&points(2), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("circle"));
}

#[test]
fn renders_3d_scatter_as_svg() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pca_3d.svg");
    scatter_3d(&points(3), &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
}

#[test]
fn wrong_column_count_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.svg");
    assert!(matches!(
        scatter_2d(&points(3), &path),
        Err(PlotError::WrongShape { got: 3, want: 2 })
    ));
    assert!(matches!(
        scatter_3d(&points(2), &path),
        Err(PlotError::WrongShape { got: 2, want: 3 })
    ));
}

#[test]
fn single_point_still_renders() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one.svg");
    scatter_2d(&Array2::zeros((1, 2)), &path).unwrap();
    assert!(path.exists());
}
