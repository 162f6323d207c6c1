// tests/model_artifacts.rs
use std::fs;

use job_cluster_notifier::config::ModelPaths;
use job_cluster_notifier::{PipelineContext, PostingRecord};

fn write_models(dir: &std::path::Path, centers: &str) -> ModelPaths {
    let vectorizer = dir.join("tfidf_vectorizer.json");
    fs::write(
        &vectorizer,
        r#"{
            "vocabulary": { "python": 0, "sql": 1, "machine learning": 2, "figma": 3 },
            "idf": [1.2, 1.0, 1.9, 2.3],
            "ngram_range": [1, 2],
            "sublinear_tf": false,
            "norm": "l2"
        }"#,
    )
    .unwrap();
    let kmeans = dir.join("kmeans_model.json");
    fs::write(&kmeans, centers).unwrap();
    ModelPaths {
        vectorizer_path: vectorizer,
        kmeans_path: kmeans,
    }
}

#[test]
fn load_exports_and_classify() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_models(
        dir.path(),
        r#"{ "cluster_centers": [[0.5, 0.4, 0.7, 0.0], [0.0, 0.0, 0.0, 1.0]] }"#,
    );
    let ctx = PipelineContext::load(&paths).unwrap();
    assert_eq!(ctx.n_clusters(), 2);
    assert_eq!(ctx.dimension(), 4);

    let out = ctx
        .classify(&[
            PostingRecord {
                raw_skills: "Python, Machine-Learning".into(),
                ..PostingRecord::default()
            },
            PostingRecord {
                raw_skills: "Figma".into(),
                ..PostingRecord::default()
            },
        ])
        .unwrap();
    assert_eq!(out[0].normalized_skills, "python machine learning");
    assert_eq!(out[0].cluster_id.0, 0);
    assert_eq!(out[1].cluster_id.0, 1);
}

#[test]
fn inconsistent_exports_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_models(dir.path(), r#"{ "cluster_centers": [[0.5, 0.5, 0.0]] }"#);
    let err = PipelineContext::load(&paths).err().expect("must fail");
    assert!(err.to_string().contains("dimension mismatch"));

    let paths = write_models(dir.path(), r#"{ "cluster_centers": [] }"#);
    assert!(PipelineContext::load(&paths).is_err());
}

#[test]
fn missing_export_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ModelPaths {
        vectorizer_path: dir.path().join("nope.json"),
        kmeans_path: dir.path().join("nope2.json"),
    };
    let err = PipelineContext::load(&paths).err().expect("must fail");
    assert!(format!("{err:#}").contains("nope.json"));
}
