use anyhow::Result;
use quire_common::RemoteError;
use quire_sheets::{
    CellValue, EditError, MemorySheetStore, QuireConfig, SheetDirective, SheetSnapshot,
    Spreadsheet, SpreadsheetSnapshot,
};

fn costs(row_count: usize) -> SheetSnapshot {
    SheetSnapshot {
        sheet_id: Some(7),
        title: "Costs".to_string(),
        frozen_row_count: 1,
        row_count,
        rows: vec![
            vec!["Item".into(), "Cost".into()],
            vec!["Paper".into(), 12.5.into()],
            vec!["Ink".into(), 3.into(), CellValue::Empty],
            vec![],
        ],
    }
}

fn store(row_count: usize) -> MemorySheetStore {
    MemorySheetStore::with_spreadsheet(
        "s1",
        SpreadsheetSnapshot {
            spreadsheet_id: Some("s1".to_string()),
            title: Some("Budget".to_string()),
            sheets: vec![costs(row_count)],
        },
    )
}

fn update(row: usize, col: usize, value: impl Into<CellValue>) -> SheetDirective {
    SheetDirective::UpdateCell {
        sheet_id: Some(7),
        row,
        col,
        value: value.into(),
    }
}

#[tokio::test]
async fn test_load_and_read() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    assert_eq!(spreadsheet.title(), Some("Budget"));
    assert_eq!(spreadsheet.sheet_titles(), vec!["Costs"]);

    let sheet = spreadsheet.sheet("Costs")?;
    assert_eq!(sheet.headers(), vec!["Item", "Cost"]);
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.lookup("Item", "Ink").unwrap().num("Cost", 0.0), 3.0);
    assert!(matches!(
        spreadsheet.sheet("Income"),
        Err(EditError::Structural(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_set_queues_physical_update() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    assert!(sheet.set(0, "Cost", 14)?);
    assert!(!sheet.set(1, "Cost", "3")?);
    assert_eq!(sheet.pending(), &[update(1, 1, 14)]);

    sheet.commit().await?;
    assert!(sheet.pending().is_empty());

    let batches = spreadsheet.store().batches().await;
    assert_eq!(batches, vec![("s1".to_string(), vec![update(1, 1, 14)])]);
    Ok(())
}

#[tokio::test]
async fn test_commit_with_nothing_queued_makes_no_call() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    sheet.set(0, "Item", "Paper")?;
    sheet.commit().await?;
    assert!(spreadsheet.store().batches().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_growth_within_spare_rows() -> Result<()> {
    // Three filled rows out of four leaves one spare
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    sheet.set(2, "Item", "Glue")?;
    assert_eq!(sheet.pending_appends(), 1);
    sheet.commit().await?;

    sheet.set(3, "Item", "Tape")?;
    sheet.commit().await?;

    let batches = spreadsheet.store().batches().await;
    assert_eq!(batches[0].1, vec![update(3, 0, "Glue")]);
    assert_eq!(
        batches[1].1,
        vec![
            SheetDirective::AppendRows {
                sheet_id: Some(7),
                count: 1
            },
            update(4, 0, "Tape"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_growth_past_spare_rows_appends_first() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    sheet.set(3, "Item", "Glue")?;
    assert_eq!(sheet.len(), 4);
    sheet.commit().await?;

    let batches = spreadsheet.store().batches().await;
    assert_eq!(
        batches[0].1,
        vec![
            SheetDirective::AppendRows {
                sheet_id: Some(7),
                count: 2
            },
            update(4, 0, "Glue"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_implicit_append_is_bounded() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    let err = sheet.set(2 + 150, "Item", "far").unwrap_err();
    assert!(matches!(
        err,
        EditError::ImplicitAppendLimit {
            requested: 150,
            limit: 100
        }
    ));
    assert_eq!(sheet.len(), 2);
    assert!(sheet.pending().is_empty());

    assert!(sheet.set(2 + 50, "Item", "near")?);
    assert_eq!(sheet.len(), 2 + 51);
    assert_eq!(sheet.pending_appends(), 51);
    Ok(())
}

#[tokio::test]
async fn test_configured_append_limit() -> Result<()> {
    let config = QuireConfig {
        implicit_append_limit: 5,
        ..Default::default()
    };
    let spreadsheet = Spreadsheet::load_with_config(store(4), "s1", config).await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    assert!(sheet.set(2 + 6, "Item", "x").is_err());
    assert!(sheet.set(2 + 5, "Item", "x")?);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_is_read_only() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(4), "s1").await?;
    let mut sheet = spreadsheet.snapshot("Costs")?;

    assert!(!sheet.is_editable());
    assert!(matches!(sheet.set(0, "Cost", 1), Err(EditError::ReadOnly(_))));
    assert!(matches!(sheet.commit().await, Err(EditError::ReadOnly(_))));
    Ok(())
}

#[tokio::test]
async fn test_failed_commit_keeps_batch() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(3), "s1").await?;
    let mut sheet = spreadsheet.sheet("Costs")?;

    sheet.set(2, "Cost", 1)?;
    spreadsheet
        .store()
        .fail_next(RemoteError::Transport("timeout".to_string()))
        .await;
    assert!(matches!(
        sheet.commit().await,
        Err(EditError::Remote(RemoteError::Transport(_)))
    ));
    assert_eq!(sheet.pending().len(), 1);
    assert_eq!(sheet.pending_appends(), 1);

    sheet.commit().await?;
    let batches = spreadsheet.store().batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].1.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_sheet_without_rows_is_structural() -> Result<()> {
    let spreadsheet = Spreadsheet::load(store(0), "s1").await?;
    assert!(matches!(
        spreadsheet.sheet("Costs"),
        Err(EditError::Structural(_))
    ));
    Ok(())
}
