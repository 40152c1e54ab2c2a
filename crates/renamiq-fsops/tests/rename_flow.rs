use std::fs;

use renamiq_events::EventBus;
use renamiq_fsops::{
    RenameErrorKind, RenameOperation, RenameService, UndoJournal, load_undo_journal,
    retain_failed_entries, save_undo_journal,
};
use renamiq_telemetry::Metrics;
use renamiq_test_support::fixtures::{entry_names, scratch_dir, seed_files};

fn service() -> anyhow::Result<RenameService> {
    Ok(RenameService::new(EventBus::with_capacity(32), Metrics::new()?))
}

#[tokio::test]
async fn inventory_then_rename_then_undo_through_journal() -> anyhow::Result<()> {
    let service = service()?;
    let dir = scratch_dir("flow")?;
    seed_files(
        dir.path(),
        &[("IMG_2.jpg", b"two"), ("IMG_1.jpg", b"one"), ("notes.txt", b"n")],
    )?;
    let journal_path = dir.path().join(".renamiq-undo.json");

    let files = service
        .list_directory(dir.path().to_path_buf(), Some("*.jpg".to_string()))
        .await?;
    assert_eq!(files.len(), 2);

    let operations = files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            RenameOperation::new(&file.path, format!("holiday_{:02}{}", index + 1, file.ext))
        })
        .collect();
    let outcome = service.execute_batch(operations).await?;
    assert!(outcome.summary().is_clean());
    assert_eq!(
        entry_names(dir.path())?,
        vec!["holiday_01.jpg", "holiday_02.jpg", "notes.txt"]
    );
    assert_eq!(fs::read(dir.path().join("holiday_01.jpg"))?, b"one");

    save_undo_journal(
        &journal_path,
        &UndoJournal::new(outcome.batch_id, outcome.undo_data.clone()),
    )?;
    let journal = load_undo_journal(&journal_path)?
        .ok_or_else(|| anyhow::anyhow!("journal should exist"))?;
    let results = service.undo_batch(journal.entries.clone()).await?;
    assert_eq!(retain_failed_entries(&journal_path, &journal, &results)?, 0);

    assert_eq!(
        entry_names(dir.path())?,
        vec!["IMG_1.jpg", "IMG_2.jpg", "notes.txt"]
    );
    Ok(())
}

#[tokio::test]
async fn result_list_always_matches_input_length() -> anyhow::Result<()> {
    let service = service()?;
    let dir = scratch_dir("flow-mixed")?;
    let paths = seed_files(dir.path(), &[("a.txt", b"a"), ("b.txt", b"b")])?;

    let outcome = service
        .execute_batch(vec![
            RenameOperation::new(&paths[0], "b.txt"),
            RenameOperation::new(&paths[0], ""),
            RenameOperation::new(&paths[0], "a<b.txt"),
            RenameOperation::new(dir.path().join("nope.txt"), "c.txt"),
            RenameOperation::new(&paths[1], "b.txt"),
            RenameOperation::new(&paths[1], "c.txt"),
        ])
        .await?;

    let kinds: Vec<_> = outcome.results.iter().map(|result| result.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(RenameErrorKind::TargetExists),
            Some(RenameErrorKind::InvalidName),
            Some(RenameErrorKind::InvalidName),
            Some(RenameErrorKind::SourceNotFound),
            None,
            None,
        ]
    );
    assert_eq!(outcome.undo_data.len(), 1);
    assert_eq!(outcome.undo_data[0].old_path, dir.path().join("c.txt"));
    assert_eq!(outcome.undo_data[0].new_path, paths[1]);
    Ok(())
}
