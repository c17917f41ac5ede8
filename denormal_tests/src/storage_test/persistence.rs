use super::*;

#[test]
fn autocommit_insert_is_written_immediately() {
    let path = temp_dir("autocommit");
    let storage = DiskStorage::open(&path).unwrap();
    storage.create_table("ledger", &ledger_schema()).unwrap();
    storage
        .insert("ledger", entry(1, Some("tab\tand \"quotes\""), "10.25", false))
        .unwrap();

    let reopened = DiskStorage::open(&path).unwrap();
    reopened.bootstrap_table("ledger", &ledger_schema()).unwrap();
    let row = reopened.get("ledger", 1).unwrap().unwrap();
    assert_eq!(row.values, entry(1, Some("tab\tand \"quotes\""), "10.25", false));
}

#[test]
fn row_file_is_one_json_array_per_line() {
    let path = temp_dir("format");
    let storage = DiskStorage::open(&path).unwrap();
    storage.create_table("ledger", &ledger_schema()).unwrap();
    storage.insert("ledger", entry(2, None, "1.50", true)).unwrap();
    storage.insert("ledger", entry(1, Some("a"), "3", false)).unwrap();

    let content = std::fs::read_to_string(path.join("tables").join("ledger.rows")).unwrap();
    assert_eq!(
        content,
        "[1,\"a\",\"3\",false]\n[2,null,\"1.50\",true]\n"
    );
}

#[test]
fn transaction_writes_reach_disk_only_on_commit() {
    let path = temp_dir("tx");
    let storage = DiskStorage::open(&path).unwrap();
    storage.create_table("ledger", &ledger_schema()).unwrap();
    storage.insert("ledger", entry(1, None, "5", false)).unwrap();
    let file = path.join("tables").join("ledger.rows");
    let before = std::fs::read_to_string(&file).unwrap();

    storage.begin().unwrap();
    storage
        .update_columns("ledger", 1, &[("settled".to_string(), Value::Bool(true))])
        .unwrap();
    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
    storage.commit().unwrap();
    assert_ne!(std::fs::read_to_string(&file).unwrap(), before);

    storage.begin().unwrap();
    storage
        .update_columns("ledger", 1, &[("settled".to_string(), Value::Bool(false))])
        .unwrap();
    storage.rollback().unwrap();
    let reopened = DiskStorage::open(&path).unwrap();
    reopened.bootstrap_table("ledger", &ledger_schema()).unwrap();
    assert_eq!(
        reopened.get("ledger", 1).unwrap().unwrap().values[3],
        Value::Bool(true)
    );
}

#[test]
fn corrupt_row_reports_table_and_line() {
    let path = temp_dir("corrupt");
    let storage = DiskStorage::open(&path).unwrap();
    std::fs::write(
        path.join("tables").join("ledger.rows"),
        "[1,null,\"2\",true]\n\n[2,null,\"x\",true]\n",
    )
    .unwrap();
    let err = storage.bootstrap_table("ledger", &ledger_schema()).unwrap_err();
    match err {
        StorageError::Corrupt { table, line, reason } => {
            assert_eq!(table, "ledger");
            assert_eq!(line, 3);
            assert!(reason.contains("Expected decimal"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn short_row_is_rejected() {
    let path = temp_dir("arity");
    let storage = DiskStorage::open(&path).unwrap();
    std::fs::write(path.join("tables").join("ledger.rows"), "[1,null]\n").unwrap();
    assert!(matches!(
        storage.bootstrap_table("ledger", &ledger_schema()),
        Err(StorageError::Corrupt { line: 1, .. })
    ));
}

#[test]
fn commit_without_transaction_is_an_error() {
    let storage = DiskStorage::open(temp_dir("no_tx")).unwrap();
    assert!(matches!(storage.commit(), Err(StorageError::NoTransaction)));
}
