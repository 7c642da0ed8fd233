use std::io::Write;

use blotto::{
    dataset::{OpponentTable, TableLayout},
    error::BlottoError,
    FRONTS, TOTAL,
};

/// Renders a score sheet export: a header, six leading metadata columns,
/// the ten allocation columns and a trailing total.
fn score_sheet(rows: usize) -> String {
    let mut text = String::from("id,name,team,round,rank,notes,f1,f2,f3,f4,f5,f6,f7,f8,f9,f10,total\n");
    for i in 0..rows {
        let mut units = [10u32; FRONTS];
        units[i % FRONTS] += 5;
        units[(i + 3) % FRONTS] -= 5;
        let cells: Vec<String> = units.iter().map(|u| u.to_string()).collect();
        text.push_str(&format!(
            "{},player{},,1,{},,{},{}\n",
            i,
            i,
            i + 1,
            cells.join(","),
            TOTAL
        ));
    }
    text
}

#[test]
fn test_blotto_layout_reads_the_allocation_block() {
    let text = score_sheet(80);
    let table = OpponentTable::parse_str(&text, &TableLayout::blotto_scores()).unwrap();

    assert_eq!(table.len(), 78);
    assert_eq!(table.columns(), FRONTS);
    assert_eq!(table.row(0), &[15, 10, 10, 5, 10, 10, 10, 10, 10, 10]);
    for row in table.rows() {
        assert_eq!(row.iter().sum::<u32>(), TOTAL);
    }
}

#[test]
fn test_short_sheet_is_rejected() {
    let text = score_sheet(40);
    let result = OpponentTable::parse_str(&text, &TableLayout::blotto_scores());
    assert!(matches!(result, Err(BlottoError::InvalidTable(_))));
}

#[test]
fn test_malformed_cell_reports_line_and_column() {
    let mut text = score_sheet(3);
    text = text.replacen("0,player0,,1,1,,15", "0,player0,,1,1,,fifteen", 1);
    let layout = TableLayout::blotto_scores().with_rows(3);

    match OpponentTable::parse_str(&text, &layout) {
        Err(BlottoError::Dataset { line, column, message }) => {
            assert_eq!(line, 2);
            assert_eq!(column, 7);
            assert!(message.contains("fifteen"));
        }
        other => panic!("Expected Dataset error, got {:?}", other),
    }
}

#[test]
fn test_expected_total_is_enforced() {
    let text = "50,50\n60,50\n";
    let layout = TableLayout::new(2).with_expected_total(100);
    assert!(matches!(
        OpponentTable::parse_str(text, &layout),
        Err(BlottoError::InvalidTable(_))
    ));

    let layout = TableLayout::new(2);
    assert_eq!(OpponentTable::parse_str(text, &layout).unwrap().len(), 2);
}

#[test]
fn test_whitespace_and_blank_lines() {
    let text = "\n  1 2 3\n\n4\t5\t6\n";
    let table = OpponentTable::parse_str(text, &TableLayout::new(3)).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.row(1), &[4, 5, 6]);
}

#[test]
fn test_from_path_round_trip() {
    let path = std::env::temp_dir().join(format!("blotto-sheet-{}.csv", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(score_sheet(78).as_bytes()).unwrap();
    }

    let table = OpponentTable::from_path(&path, &TableLayout::blotto_scores().with_fixed_total());
    std::fs::remove_file(&path).unwrap();

    let table = table.unwrap();
    assert_eq!(table.len(), 78);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = OpponentTable::from_path("/definitely/not/here.csv", &TableLayout::default());
    assert!(matches!(result, Err(BlottoError::Io(_))));
}

#[cfg(feature = "serde")]
#[test]
fn test_deserialized_tables_are_validated() {
    let table: OpponentTable = serde_json::from_str("[[1,2,3],[4,5,6]]").unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(serde_json::to_string(&table).unwrap(), "[[1,2,3],[4,5,6]]");

    assert!(serde_json::from_str::<OpponentTable>("[]").is_err());
    assert!(serde_json::from_str::<OpponentTable>("[[]]").is_err());
    assert!(serde_json::from_str::<OpponentTable>("[[1,2,3],[4,5]]").is_err());
    assert!(serde_json::from_str::<OpponentTable>(r#"{"columns":0,"cells":[]}"#).is_err());
}
