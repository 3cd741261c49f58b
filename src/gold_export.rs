use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::gold::GoldStore;
use crate::store::FactStore;

pub struct ExportReport {
    pub top_players: usize,
    pub facts: usize,
}

/// Write the Top-N view and the fact table to an xlsx workbook.
pub fn export_gold_workbook(gold: &GoldStore, path: &Path) -> Result<ExportReport> {
    let top = gold.top_players()?;
    let facts = gold.list_all()?;

    let mut top_rows = vec![vec![
        Cell::Text("Rank".to_string()),
        Cell::Text("Player ID".to_string()),
        Cell::Text("Player".to_string()),
        Cell::Text("Team".to_string()),
        Cell::Text("Composite Score".to_string()),
    ]];
    for row in &top {
        top_rows.push(vec![
            Cell::Number(row.rank as f64),
            Cell::Number(row.player_id as f64),
            Cell::Text(row.name.clone()),
            Cell::Text(row.team.clone()),
            Cell::Number(row.composite_score),
        ]);
    }

    let mut fact_rows = vec![
        [
            "Fact ID",
            "Player ID",
            "Performance ID",
            "Discipline ID",
            "Value ID",
            "Date ID",
            "Composite Score",
            "Ranking",
        ]
        .iter()
        .map(|h| Cell::Text(h.to_string()))
        .collect::<Vec<_>>(),
    ];
    for f in &facts {
        fact_rows.push(vec![
            Cell::Number(f.fact_id.unwrap_or_default() as f64),
            Cell::Number(f.player_id as f64),
            Cell::Number(f.performance_id as f64),
            Cell::Number(f.discipline_id as f64),
            Cell::Number(f.value_id as f64),
            Cell::Number(f.date_id as f64),
            Cell::Number(f.composite_score),
            Cell::Number(f.ranking as f64),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopPlayers")?;
        write_rows(sheet, &top_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Facts")?;
        write_rows(sheet, &fact_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        top_players: top.len(),
        facts: facts.len(),
    })
}

enum Cell {
    Text(String),
    Number(f64),
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match value {
                Cell::Text(s) => worksheet.write_string(r, c, s).map(|_| ()),
                Cell::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
