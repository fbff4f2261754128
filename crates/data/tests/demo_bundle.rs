use std::fs;

use postwise_core::config::PipelineConfig;
use postwise_core::domain::scheme::SchemeFamily;
use postwise_core::recommend::{RecommendOptions, SchemeRecommender};
use postwise_data::{
    demo_dataset, demo_models, load_dataset, load_models, write_demo_bundle, DataError,
    DEMO_PAST_COLUMN,
};

#[test]
fn written_bundle_loads_back_to_the_demo_dataset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    let models_dir = dir.path().join("models");
    write_demo_bundle(&data_dir, &models_dir).expect("write bundle");

    let dataset = load_dataset(&data_dir, DEMO_PAST_COLUMN).expect("load dataset");
    assert_eq!(dataset, demo_dataset());

    let models = load_models(&models_dir).expect("load models");
    let expected = demo_models();
    for family in SchemeFamily::ALL {
        let loaded = models.family(family);
        let built = expected.family(family);
        assert_eq!(loaded.dense.input_width(), built.dense.input_width());
        assert_eq!(loaded.dense.output_width(), family.schemes().len());
        assert_eq!(loaded.branch.output_width(), family.schemes().len());
    }
}

#[test]
fn loaded_bundle_drives_the_recommender() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    let models_dir = dir.path().join("models");
    write_demo_bundle(&data_dir, &models_dir).expect("write bundle");

    let dataset = load_dataset(&data_dir, DEMO_PAST_COLUMN).expect("load dataset");
    let models = load_models(&models_dir).expect("load models");
    let recommender = SchemeRecommender::new(&dataset, &models, &PipelineConfig::default());

    for row in dataset.features.rows() {
        let result = recommender
            .recommend_both(&row.post_office, 2, 1, true, 7)
            .expect("every demo office can be scored");
        assert_eq!(result.savings.schemes.len(), 2);
        assert_eq!(result.insurance.schemes.len(), 1);
        assert!(result.savings.neighbors.iter().all(|n| n.post_office != row.post_office));
        for scheme in &result.insurance.schemes {
            assert!(SchemeFamily::Insurance.schemes().contains(&scheme.as_str()));
        }
    }

    let plain = recommender
        .recommend("Aluva SO", SchemeFamily::Savings, RecommendOptions::new(3, false), 7)
        .expect("plain ranking");
    let expected: Vec<_> = plain.scores.iter().take(3).map(|s| s.scheme.clone()).collect();
    assert_eq!(plain.schemes, expected);
}

#[test]
fn missing_model_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    let models_dir = dir.path().join("models");
    write_demo_bundle(&data_dir, &models_dir).expect("write bundle");
    fs::remove_file(models_dir.join("insurance_branch.json")).expect("remove");

    match load_models(&models_dir) {
        Err(DataError::Io { path, .. }) => assert!(path.ends_with("insurance_branch.json")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn mis_shaped_model_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    let models_dir = dir.path().join("models");
    write_demo_bundle(&data_dir, &models_dir).expect("write bundle");
    fs::write(
        models_dir.join("savings_dense.json"),
        r#"{"layers":[{"weights":[[1.0,2.0]],"bias":[0.0],"activation":"relu"}]}"#,
    )
    .expect("overwrite");

    assert!(matches!(load_models(&models_dir), Err(DataError::InvalidModel { .. })));
}
