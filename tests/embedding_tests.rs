use apachescope::embedding::{sequence_matrix, EventVectorModel, TrainParams};
use apachescope::windowing::WindowSequence;
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

fn seq(minute: u32, ids: &[&str]) -> WindowSequence {
    WindowSequence {
        start: Utc.with_ymd_and_hms(2025, 7, 20, 2, minute, 0).unwrap(),
        event_ids: ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn small_params() -> TrainParams {
    TrainParams {
        vector_size: 16,
        epochs: 3,
        ..TrainParams::default()
    }
}

fn corpus() -> Vec<WindowSequence> {
    vec![
        seq(0, &["E1", "E2", "E1", "E3"]),
        seq(5, &["E2", "E2", "E1"]),
        seq(10, &["E3", "E0"]),
    ]
}

#[test]
fn vocabulary_covers_every_event_id_at_min_count_one() {
    let model = EventVectorModel::train(&corpus(), small_params()).unwrap();
    for id in ["E0", "E1", "E2", "E3"] {
        assert!(model.vector(id).is_some(), "{id} missing from vocab");
        assert_eq!(model.vector(id).unwrap().len(), 16);
    }
    assert!(model.vector("E99").is_none());
    assert_eq!(model.vector_size(), 16);
}

#[test]
fn training_is_deterministic_for_a_fixed_seed() {
    let a = EventVectorModel::train(&corpus(), small_params()).unwrap();
    let b = EventVectorModel::train(&corpus(), small_params()).unwrap();
    for id in ["E0", "E1", "E2", "E3"] {
        assert_eq!(a.vector(id).unwrap(), b.vector(id).unwrap());
    }
}

#[test]
fn empty_corpus_is_a_typed_error() {
    let err = EventVectorModel::train(&[], small_params());
    assert!(err.is_err());
}

#[test]
fn sequence_vector_is_the_mean_of_member_embeddings() {
    let model = EventVectorModel::train(&corpus(), small_params()).unwrap();
    let ids = vec!["E1".to_string(), "E2".to_string()];
    let avg = model.sequence_vector(&ids);
    let v1 = model.vector("E1").unwrap();
    let v2 = model.vector("E2").unwrap();
    for i in 0..16 {
        let expect = (v1[i] + v2[i]) / 2.0;
        assert!((avg[i] - expect).abs() < 1e-6);
    }
}

#[test]
fn all_out_of_vocabulary_sequence_maps_to_zero_vector() {
    let model = EventVectorModel::train(&corpus(), small_params()).unwrap();
    let avg = model.sequence_vector(&["E98".to_string(), "E99".to_string()]);
    assert!(avg.iter().all(|&x| x == 0.0));
    assert_eq!(avg.len(), 16);
}

#[test]
fn save_then_load_round_trips_the_vectors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let model = EventVectorModel::train(&corpus(), small_params()).unwrap();
    model.save(&path).unwrap();

    let loaded = EventVectorModel::load(&path).unwrap();
    assert_eq!(loaded.vocab(), model.vocab());
    for id in ["E0", "E1", "E2", "E3"] {
        assert_eq!(loaded.vector(id).unwrap(), model.vector(id).unwrap());
    }
}

#[test]
fn load_or_train_prefers_the_persisted_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let first = EventVectorModel::load_or_train(&path, &corpus(), small_params()).unwrap();
    assert!(path.exists());

    // Different corpus, same path: the persisted model must win.
    let other = vec![seq(0, &["E7", "E8"])];
    let second = EventVectorModel::load_or_train(&path, &other, small_params()).unwrap();
    assert_eq!(second.vocab(), first.vocab());
    assert!(second.vector("E7").is_none());
}

#[test]
fn sequence_matrix_has_one_row_per_window() {
    let sequences = corpus();
    let model = EventVectorModel::train(&sequences, small_params()).unwrap();
    let m = sequence_matrix(&model, &sequences);
    assert_eq!(m.dim(), (3, 16));
    let direct = model.sequence_vector(&sequences[1].event_ids);
    assert_eq!(m.row(1), direct.view());
}
