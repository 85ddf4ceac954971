//! End-to-end tests of the quiz pipeline: tables → merge → session → tracker.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use tagdrill_core::engine::{QuizEngine, QuizEngineConfig};
use tagdrill_core::proficiency::{FileStore, ProficiencyTracker};
use tagdrill_core::session::{QuizSession, SessionOptions};
use tagdrill_core::table::TableKind;
use tagdrill_core::{load_reference_data, Answers, Category, CategorySelection, Field};
use tagdrill_sources::{DirectorySource, MemorySource};

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[tokio::test]
async fn e2e_single_equipment_item() {
    let source = MemorySource::new().with_table(TableKind::Equipment, "tag,name\nP101,Pump A");
    let loaded = load_reference_data(&source).await.unwrap();
    let tracker = ProficiencyTracker::in_memory();

    let mut session = QuizSession::start(
        &loaded.data,
        SessionOptions::new(Category::Equipment),
        &mut rng(),
    )
    .unwrap();
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.fields(&loaded.data), Some(vec![Field::Name]));

    let submission = session
        .submit(
            &Answers::new().with(Field::Name, "pump a"),
            &loaded.data,
            &tracker,
        )
        .unwrap();
    assert!(submission.correct);
    assert!(session.advance(submission.ticket));

    assert_eq!(session.correct(), 1);
    assert!(session.is_finished());
    let record = tracker.get(Category::Equipment, "P101");
    assert_eq!(record.level, 1);
    assert_eq!(record.correct, 1);
}

#[tokio::test]
async fn e2e_performance_merge_and_loose_grading() {
    let source = MemorySource::new().with_table(
        TableKind::Performance,
        "tag,name,flow_m3h,power_kw\nP201A,循环泵,120,55\nP201B,循环泵,250,55kW\nP201,循环泵,120,",
    );
    let loaded = load_reference_data(&source).await.unwrap();
    let record = &loaded.data.performance["P201"];
    assert_eq!(record.spec(Field::FlowM3h), Some("120/250"));
    assert_eq!(record.spec(Field::PowerKw), Some("55"));

    let tracker = ProficiencyTracker::in_memory();
    let mut session = QuizSession::start(
        &loaded.data,
        SessionOptions::new(Category::PerformanceSpec),
        &mut rng(),
    )
    .unwrap();

    let answers = Answers::new()
        .with(Field::Name, "循环泵")
        .with(Field::FlowM3h, "250 m3/h")
        .with(Field::PowerKw, "55 KW");
    let submission = session.submit(&answers, &loaded.data, &tracker).unwrap();
    assert!(submission.correct, "{:?}", submission.grading);
}

#[tokio::test]
async fn e2e_mixed_exam_over_directory_with_file_store() {
    let data_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();

    let equipment: String = std::iter::once("tag,name".to_string())
        .chain((0..10).map(|i| format!("P{}, 泵{i}", 100 + i)))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(data_dir.path().join("equipment.csv"), equipment).unwrap();
    std::fs::write(
        data_dir.path().join("valves.csv"),
        "tag,name,floor\nXV1,进料阀,1F\nXV2,出料阀,2F\nXV3,排污阀,\n",
    )
    .unwrap();

    let loaded = load_reference_data(&DirectorySource::new(data_dir.path()))
        .await
        .unwrap();
    assert_eq!(loaded.data.len(Category::Equipment), 10);

    let tracker = Arc::new(ProficiencyTracker::open(Arc::new(FileStore::new(
        store_dir.path(),
    ))));
    let engine = QuizEngine::new(
        Arc::new(loaded.data),
        Arc::clone(&tracker),
        QuizEngineConfig {
            pause: Duration::ZERO,
        },
    );

    let options = SessionOptions::new(CategorySelection::Mixed).exam(true);
    let progress = engine.start(options, &mut rng()).unwrap();
    // ceil(10 × 0.33) + ceil(3 × 0.33)
    assert_eq!(progress.total, 5);

    while engine.current_item().is_some() {
        engine
            .submit(&Answers::new().with(Field::Name, "1"))
            .unwrap();
    }
    let summary = engine.summary().unwrap();
    assert_eq!(summary.correct, 5);
    assert_eq!(tracker.snapshot().len(), 5);

    // A fresh tracker over the same directory sees the persisted mapping.
    let reopened = ProficiencyTracker::open(Arc::new(FileStore::new(store_dir.path())));
    assert_eq!(reopened.snapshot().len(), 5);
    assert!(reopened.snapshot().iter().all(|e| e.record.level == 1));
}
