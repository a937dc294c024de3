//! Table offsets, cell writes and lazily inserted tables

mod common;

use anyhow::Result;
use common::DocBuilder;
use quire_common::{CellStyle, Color, TableCellStyle, TextStyle};
use quire_editor::{
    CellRange, CellValue, Directive, Document, DocumentSnapshot, EditError, Link,
    MemoryDocumentStore, QuireConfig, RowObject, RowTarget, TextRange,
};
use serde_json::json;

fn text(at: usize, text: &str) -> Directive {
    Directive::InsertText {
        at,
        text: text.to_string(),
    }
}

fn delete(start: usize, end: usize) -> Directive {
    Directive::DeleteRange {
        range: TextRange::new(start, end),
    }
}

fn row(fields: &[(&str, &str)]) -> RowObject {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), CellValue::from(*value)))
        .collect()
}

async fn load(builder: DocBuilder) -> Result<Document<MemoryDocumentStore>> {
    Ok(Document::load(builder.store(), "doc").await?)
}

#[tokio::test]
async fn test_cell_write_shifts_following_elements() -> Result<()> {
    let builder = DocBuilder::new()
        .pad_to(100)
        .table(&[&["abcdefg"], &["abcdefg"], &["abcdefg"]])
        .paragraph("after");
    let mut doc = load(builder).await?;

    let table_id = doc.find(|e| e.is_table(), false).unwrap().id();
    assert_eq!(doc.tail()?.start(), 132);

    {
        let mut table = doc.table(table_id, 1)?;
        assert_eq!(table.headers(), vec!["abcdefg"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.content_start(RowTarget::Data(1), 0)?, 123);

        assert!(table.set(1, "abcdefg", "x")?);
        assert_eq!(table.get(1, "abcdefg"), &CellValue::from("x"));
    }

    assert_eq!(doc.pending(), &[delete(123, 130), text(123, "x")]);
    assert_eq!(doc.tail()?.start(), 126);
    Ok(())
}

#[tokio::test]
async fn test_unchanged_value_is_not_written() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name", "Score"], &["a", "1"]])).await?;

    let id = doc.head()?.next()?.id();
    let mut table = doc.table(id, 1)?;
    assert!(!table.set(0, "Name", "a")?);
    assert!(!table.set(0, "Score", 1)?);
    assert!(!table.set(0, "Missing", "x")?);
    assert!(doc.pending().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_row_past_the_end_is_rejected() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name"], &["a"]])).await?;

    let id = doc.head()?.next()?.id();
    let mut table = doc.table(id, 1)?;
    let err = table.set(5, "Name", "x").unwrap_err();
    assert!(matches!(err, EditError::RowOutOfBounds { row: 5, length: 1 }));
    assert!(matches!(
        table.content_start(RowTarget::Header(1), 0),
        Err(EditError::RowOutOfBounds { row: 1, length: 1 })
    ));
    assert!(doc.pending().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_appended_row_addresses_like_loaded_row() -> Result<()> {
    let mut grown = load(DocBuilder::new().table(&[&["A", "B"], &["x", "y"]]).paragraph("end")).await?;
    let mut loaded = load(
        DocBuilder::new()
            .table(&[&["A", "B"], &["x", "y"], &["", ""]])
            .paragraph("end"),
    )
    .await?;

    let grown_id = grown.head()?.next()?.id();
    let index = grown.table(grown_id, 1)?.append(&row(&[("A", "1")]))?;
    assert_eq!(index, 1);

    let loaded_id = loaded.head()?.next()?.id();
    loaded.table(loaded_id, 1)?.set(1, "A", "1")?;

    assert_eq!(
        grown.pending()[0],
        Directive::InsertRow {
            table_start: 1,
            after_row: 1
        }
    );
    assert_eq!(&grown.pending()[1..], loaded.pending());
    assert_eq!(grown.tail()?.start(), loaded.tail()?.start());
    Ok(())
}

#[tokio::test]
async fn test_set_after_delete_uses_new_layout() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name"], &["a"], &["bb"], &["ccc"]])).await?;

    let id = doc.head()?.next()?.id();
    {
        let mut table = doc.table(id, 1)?;
        table.delete(0)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "Name"), &CellValue::from("ccc"));
        table.set(1, "Name", "z")?;
    }

    assert_eq!(
        doc.pending(),
        &[
            Directive::DeleteRow {
                table_start: 1,
                row: 1
            },
            delete(16, 19),
            text(16, "z"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_only_row_cannot_be_deleted() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["a"]])).await?;

    let id = doc.head()?.next()?.id();
    let mut table = doc.table(id, 0)?;
    assert!(matches!(table.delete(0), Err(EditError::Structural(_))));
    Ok(())
}

#[tokio::test]
async fn test_frozen_rows_fixed_on_first_open() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Group"], &["Name"], &["a"]])).await?;

    let id = doc.head()?.next()?.id();
    assert_eq!(doc.table(id, 2)?.headers(), vec!["Name"]);
    assert_eq!(doc.table(id, 2)?.len(), 1);
    assert!(matches!(doc.table(id, 1), Err(EditError::Structural(_))));
    Ok(())
}

#[tokio::test]
async fn test_link_value_gets_link_style() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name"], &["a"]])).await?;

    let id = doc.head()?.next()?.id();
    doc.table(id, 1)?
        .set(0, "Name", Link::new("https://example.com", "site"))?;

    assert_eq!(
        doc.pending(),
        &[
            delete(11, 12),
            text(11, "site"),
            Directive::SetTextStyle {
                range: TextRange::new(11, 15),
                style: TextStyle::new().with_link("https://example.com"),
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_inserted_table_is_addressable() -> Result<()> {
    let mut doc = load(DocBuilder::new().heading("Intro").paragraph("body")).await?;

    let body = doc.tail()?.id();
    let table_id = doc.insert_table_before(body, vec!["A".into(), "Bc".into()])?;

    assert_eq!(
        doc.pending(),
        &[
            Directive::InsertTable {
                at: 7,
                rows: 1,
                columns: 2
            },
            text(11, "A"),
            text(14, "Bc"),
        ]
    );
    assert_eq!(doc.element(table_id)?.start(), 7);
    assert_eq!(doc.tail()?.start(), 18);

    {
        let mut table = doc.table(table_id, 1)?;
        assert_eq!(table.table_start(), 8);
        assert_eq!(table.headers(), vec!["A", "Bc"]);
        assert!(table.is_empty());
        table.append(&row(&[("A", "1")]))?;
    }

    assert_eq!(
        &doc.pending()[3..],
        &[
            Directive::InsertRow {
                table_start: 8,
                after_row: 0
            },
            text(19, "1"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_insert_table_needs_columns() -> Result<()> {
    let mut doc = load(DocBuilder::new().paragraph("body")).await?;

    let body = doc.tail()?.id();
    let err = doc.insert_table_before(body, Vec::new()).unwrap_err();
    assert!(matches!(err, EditError::Structural(_)));
    assert!(doc.pending().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_style_header_row() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name", "Score"], &["a", "1"]])).await?;

    let cell = TableCellStyle {
        background_color: Color::from_hex("#eeeeee"),
        ..Default::default()
    };
    let style = CellStyle::new()
        .with_cell(cell.clone())
        .with_text(TextStyle::new().bold());

    let id = doc.head()?.next()?.id();
    doc.table(id, 1)?.style_row(&style, RowTarget::Header(0))?;

    assert_eq!(
        doc.pending(),
        &[
            Directive::SetCellStyle {
                cells: CellRange {
                    table_start: 1,
                    row: 0,
                    col: 0,
                    row_span: 1,
                    col_span: 2,
                },
                style: cell,
            },
            Directive::SetTextStyle {
                range: TextRange::new(4, 15),
                style: TextStyle::new().bold(),
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_style_span_outside_table() -> Result<()> {
    let mut doc = load(DocBuilder::new().table(&[&["Name", "Score"], &["a", "1"]])).await?;

    let style = CellStyle::new().with_text(TextStyle::new().bold());
    let id = doc.head()?.next()?.id();
    {
        let mut table = doc.table(id, 1)?;
        assert!(matches!(
            table.style(&style, RowTarget::Data(0), 1, 2),
            Err(EditError::Structural(_))
        ));
        assert!(matches!(
            table.style(&style, RowTarget::Data(0), 1, usize::MAX),
            Err(EditError::Structural(_))
        ));
    }
    assert!(doc.pending().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mention_cell_is_not_blank() -> Result<()> {
    let snapshot: DocumentSnapshot = serde_json::from_value(json!({
        "body": { "content": [
            { "endIndex": 1, "sectionBreak": {} },
            { "startIndex": 1, "endIndex": 14, "table": { "rows": 2, "columns": 1, "tableRows": [
                { "startIndex": 2, "endIndex": 9, "tableCells": [{
                    "startIndex": 3, "endIndex": 9,
                    "content": [{ "startIndex": 4, "endIndex": 9, "paragraph": { "elements": [
                        { "startIndex": 4, "endIndex": 9, "textRun": { "content": "Name\n" } }
                    ] } }]
                }] },
                { "startIndex": 9, "endIndex": 13, "tableCells": [{
                    "startIndex": 10, "endIndex": 13,
                    "content": [{ "startIndex": 11, "endIndex": 13, "paragraph": { "elements": [
                        { "startIndex": 11, "endIndex": 12, "person": { "personProperties": { "name": "Ada" } } },
                        { "startIndex": 12, "endIndex": 13, "textRun": { "content": "\n" } }
                    ] } }]
                }] }
            ] } }
        ] }
    }))?;
    let mut doc = Document::from_snapshot(
        MemoryDocumentStore::new(),
        "doc",
        snapshot,
        QuireConfig::default(),
    )?;

    let id = doc.tail()?.id();
    {
        let mut table = doc.table(id, 1)?;
        assert_eq!(table.get(0, "Name"), &CellValue::from("Ada"));
        assert!(table.set(0, "Name", "")?);
    }
    assert_eq!(doc.pending(), &[delete(11, 12)]);
    Ok(())
}

fn with_bumped_tail(builder: &DocBuilder) -> DocumentSnapshot {
    let mut snapshot = builder.snapshot();
    if let Some(last) = snapshot.body.as_mut().and_then(|body| body.content.last_mut()) {
        last.end_index = last.end_index.map(|end| end + 1);
    }
    snapshot
}

#[tokio::test]
async fn test_size_mismatch_strict_and_lenient() -> Result<()> {
    let builder = DocBuilder::new().table(&[&["Name"], &["a"]]);

    let strict = QuireConfig {
        strict_table_sizes: true,
        ..Default::default()
    };
    let mut doc = Document::from_snapshot(
        MemoryDocumentStore::new(),
        "doc",
        with_bumped_tail(&builder),
        strict,
    )?;
    let id = doc.tail()?.id();
    assert!(matches!(doc.table(id, 1), Err(EditError::Structural(_))));

    let mut doc = Document::from_snapshot(
        MemoryDocumentStore::new(),
        "doc",
        with_bumped_tail(&builder),
        QuireConfig::default(),
    )?;
    let id = doc.tail()?.id();
    assert_eq!(doc.table(id, 1)?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_table_without_dimensions_is_structural() -> Result<()> {
    let snapshot: DocumentSnapshot = serde_json::from_value(json!({
        "body": { "content": [
            { "endIndex": 1, "sectionBreak": {} },
            { "startIndex": 1, "endIndex": 3, "table": { "tableRows": [] } }
        ] }
    }))?;

    let err = Document::from_snapshot(
        MemoryDocumentStore::new(),
        "doc",
        snapshot,
        QuireConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EditError::Structural(_)));
    Ok(())
}
