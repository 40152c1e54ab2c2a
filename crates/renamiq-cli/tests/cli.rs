use std::fs;

use renamiq_cli::run_from;
use renamiq_test_support::fixtures::{entry_names, path_string, scratch_dir, seed_file, seed_files};

#[tokio::test]
async fn rename_then_undo_through_journal_flag() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-flow")?;
    let work = dir.path().join("work");
    fs::create_dir(&work)?;
    let paths = seed_files(&work, &[("IMG_1.jpg", b"one"), ("IMG_2.jpg", b"two")])?;
    let journal = path_string(&dir.path().join("undo.json"));

    let code = run_from([
        "renamiq".to_string(),
        "rename".to_string(),
        "--map".to_string(),
        format!("{}=holiday-1.jpg", path_string(&paths[0])),
        "--map".to_string(),
        format!("{}=holiday-2.jpg", path_string(&paths[1])),
        "--journal".to_string(),
        journal.clone(),
    ])
    .await;
    assert_eq!(code, 0);
    assert_eq!(entry_names(&work)?, vec!["holiday-1.jpg", "holiday-2.jpg"]);

    let code = run_from(["renamiq", "undo", "--journal", journal.as_str()]).await;
    assert_eq!(code, 0);
    assert_eq!(entry_names(&work)?, vec!["IMG_1.jpg", "IMG_2.jpg"]);

    // The journal is emptied once every entry is restored.
    let code = run_from(["renamiq", "undo", "--journal", journal.as_str()]).await;
    assert_eq!(code, 0);
    Ok(())
}

#[tokio::test]
async fn configured_journal_is_used_without_flag() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-config")?;
    let work = dir.path().join("work");
    fs::create_dir(&work)?;
    let paths = seed_files(&work, &[("a.txt", b"a")])?;
    let journal = dir.path().join("configured-undo.json");
    let config = seed_file(
        dir.path(),
        "config.json",
        serde_json::json!({ "undo": { "journal_path": journal } })
            .to_string()
            .as_bytes(),
    )?;
    let config = path_string(&config);

    let mapping = format!("{}=b.txt", path_string(&paths[0]));
    let code = run_from([
        "renamiq",
        "--config",
        config.as_str(),
        "rename",
        "--map",
        mapping.as_str(),
    ])
    .await;
    assert_eq!(code, 0);
    assert!(journal.is_file());

    let code = run_from(["renamiq", "--config", config.as_str(), "undo"]).await;
    assert_eq!(code, 0);
    assert_eq!(entry_names(&work)?, vec!["a.txt"]);
    Ok(())
}

#[tokio::test]
async fn dry_run_leaves_the_folder_untouched() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-preview")?;
    let paths = seed_files(dir.path(), &[("a.txt", b"a"), ("b.txt", b"b")])?;
    let journal = dir.path().join("undo.json");

    let first = format!("{}=b.txt", path_string(&paths[0]));
    let second = format!("{}=c.txt", path_string(&paths[1]));
    let journal_arg = path_string(&journal);
    let code = run_from([
        "renamiq",
        "--output",
        "json",
        "rename",
        "--dry-run",
        "--map",
        first.as_str(),
        "--map",
        second.as_str(),
        "--journal",
        journal_arg.as_str(),
    ])
    .await;
    // `a.txt -> b.txt` collides with the file that still exists.
    assert_eq!(code, 1);
    assert_eq!(entry_names(dir.path())?, vec!["a.txt", "b.txt"]);
    assert!(!journal.exists());
    Ok(())
}

#[tokio::test]
async fn failed_items_exit_with_partial_code() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-partial")?;
    let paths = seed_files(dir.path(), &[("a.txt", b"a")])?;
    let journal_arg = path_string(&dir.path().join("undo.json"));

    let good = format!("{}=renamed.txt", path_string(&paths[0]));
    let missing = format!("{}=other.txt", path_string(&dir.path().join("missing.txt")));
    let invalid = format!("{}=bad:name.txt", path_string(&dir.path().join("renamed.txt")));
    let code = run_from([
        "renamiq",
        "--progress",
        "--metrics",
        "rename",
        "--map",
        good.as_str(),
        "--map",
        missing.as_str(),
        "--map",
        invalid.as_str(),
        "--journal",
        journal_arg.as_str(),
    ])
    .await;
    assert_eq!(code, 1);
    assert_eq!(entry_names(dir.path())?, vec!["renamed.txt", "undo.json"]);
    Ok(())
}

#[tokio::test]
async fn invalid_input_exits_with_validation_code() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-invalid")?;
    let plan = seed_file(dir.path(), "plan.json", b"{ not json")?;
    let plan = path_string(&plan);

    assert_eq!(run_from(["renamiq", "rename"]).await, 2);
    assert_eq!(run_from(["renamiq", "rename", "--plan", plan.as_str()]).await, 2);
    assert_eq!(run_from(["renamiq", "rename", "--map", "no-separator"]).await, 2);
    assert_eq!(run_from(["renamiq", "frobnicate"]).await, 2);
    Ok(())
}

#[tokio::test]
async fn templates_save_and_load_through_the_cli() -> anyhow::Result<()> {
    let dir = scratch_dir("cli-templates")?;
    let document = seed_file(dir.path(), "doc.json", br#"{ "pattern": "{n}-{i}" }"#)?;
    let document = path_string(&document);
    let target = path_string(&dir.path().join("holiday"));

    let code = run_from([
        "renamiq",
        "template",
        "save",
        target.as_str(),
        "--from",
        document.as_str(),
    ])
    .await;
    assert_eq!(code, 0);
    let saved = dir.path().join("holiday.rnq");
    assert!(saved.is_file());

    let saved = path_string(&saved);
    assert_eq!(run_from(["renamiq", "template", "load", saved.as_str()]).await, 0);
    let missing = path_string(&dir.path().join("missing.rnq"));
    assert_eq!(run_from(["renamiq", "template", "load", missing.as_str()]).await, 3);
    Ok(())
}
