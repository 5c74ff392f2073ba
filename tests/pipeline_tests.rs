use apachescope::{driver, embedding, filter, plot, projection, windowing};
use chrono::Duration;
use std::fs;
use tempfile::tempdir;

// Three 5-minute windows of traffic plus two unclassifiable lines.
const LOG: &str = "\
[Sun Jul 20 02:10:07 2025] [notice] jk2_init() Found child 61 in scoreboard slot 3
[Sun Jul 20 02:10:08 2025] [error] mod_jk child workerEnv in error state 1
[Sun Jul 20 02:11:30 2025] [notice] workerEnv.init() ok /etc/httpd/conf/workers2.properties
[Sun Jul 20 02:16:00 2025] [error] mod_jk child workerEnv in error state 2
[Sun Jul 20 02:17:12 2025] [notice] jk2_init() Found child 62 in scoreboard slot 4
[Sun Jul 20 02:21:00 2025] [warn] something nobody templated
garbled line
[Sun Jul 20 02:22:40 2025] [notice] mod_jk2 Shutting down
";

#[test]
fn full_pipeline_from_log_to_plots() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("Apache.log");
    let table = dir.path().join("classified_logs.csv");
    let e0_table = dir.path().join("e0_classified_logs.csv");
    let model_path = dir.path().join("log_event_vectors_5min.json");
    let matrix_path = dir.path().join("log_sequence_matrix_5min.json");
    fs::write(&log, LOG).unwrap();

    // Stage 1: classify.
    let rows = driver::classify_file(&log, &table).unwrap();
    assert_eq!(rows, 8);

    // Stage 2: unknown extraction sees exactly the two untemplated lines.
    let kept = filter::filter_unknown(&table, Some(&e0_table)).unwrap();
    assert_eq!(kept.len(), 3);

    // Stage 3: window and embed.
    let records = windowing::read_records(&table).unwrap();
    let sequences = windowing::build_window_sequences(&records, Duration::minutes(5));
    // 02:10, 02:15, 02:20 buckets; the garbled line has no timestamp.
    assert_eq!(sequences.len(), 3);
    assert_eq!(sequences[0].event_ids, vec!["E1", "E3", "E2"]);
    assert_eq!(sequences[2].event_ids, vec!["E0", "E9"]);

    let params = embedding::TrainParams {
        vector_size: 8,
        epochs: 2,
        ..embedding::TrainParams::default()
    };
    let model = embedding::EventVectorModel::load_or_train(&model_path, &sequences, params).unwrap();
    assert!(model_path.exists());
    let matrix = embedding::sequence_matrix(&model, &sequences);
    embedding::save_matrix(&matrix, &matrix_path).unwrap();

    // Stage 4: project and render.
    let loaded = embedding::load_matrix(&matrix_path).unwrap().mapv(f64::from);
    assert_eq!(loaded.dim(), (3, 8));
    let p2 = projection::pca(&loaded, 2).unwrap();
    let p3 = projection::pca(&loaded, 3).unwrap();
    let svg2 = dir.path().join("pca_2d.svg");
    let svg3 = dir.path().join("pca_3d.svg");
    plot::scatter_2d(&p2.projected, &svg2).unwrap();
    plot::scatter_3d(&p3.projected, &svg3).unwrap();
    assert!(svg2.exists() && svg3.exists());
}
