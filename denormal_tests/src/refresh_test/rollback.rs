use super::*;
use denormal_core::types::{Record, Row};
use std::cell::Cell;

/// Delegates to a [`MemStorage`] but rejects writes to one table after a
/// number of successful writes to it.
struct FailingWrites {
    inner: MemStorage,
    table: &'static str,
    allowed: Cell<usize>,
}

impl StorageEngine for FailingWrites {
    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError> {
        self.inner.create_table(table, schema)
    }

    fn schema(&self, table: &str) -> Result<Schema, StorageError> {
        self.inner.schema(table)
    }

    fn insert(&self, table: &str, row: Row) -> Result<i64, StorageError> {
        self.inner.insert(table, row)
    }

    fn count(&self, table: &str) -> Result<usize, StorageError> {
        self.inner.count(table)
    }

    fn max_pk(&self, table: &str) -> Result<Option<i64>, StorageError> {
        self.inner.max_pk(table)
    }

    fn fetch_after(
        &self,
        table: &str,
        after: i64,
        limit: usize,
    ) -> Result<Vec<Record>, StorageError> {
        self.inner.fetch_after(table, after, limit)
    }

    fn get(&self, table: &str, pk: i64) -> Result<Option<Record>, StorageError> {
        self.inner.get(table, pk)
    }

    fn find_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StorageError> {
        self.inner.find_by(table, column, value)
    }

    fn update_columns(
        &self,
        table: &str,
        pk: i64,
        values: &[(String, Value)],
    ) -> Result<(), StorageError> {
        if table == self.table {
            if self.allowed.get() == 0 {
                return Err(StorageError::NotNullable {
                    table: table.to_string(),
                    column: values[0].0.clone(),
                });
            }
            self.allowed.set(self.allowed.get() - 1);
        }
        self.inner.update_columns(table, pk, values)
    }

    fn begin(&self) -> Result<(), StorageError> {
        self.inner.begin()
    }

    fn commit(&self) -> Result<(), StorageError> {
        self.inner.commit()
    }

    fn rollback(&self) -> Result<(), StorageError> {
        self.inner.rollback()
    }
}

const BOTH: [&str; 2] = ["shop.Customer.order_count", "shop.Order.customer_name"];

#[test]
fn failure_on_second_table_rolls_back_the_first() {
    let (inner, catalog) = mem_shop();
    let storage = FailingWrites {
        inner,
        table: "shop.Order",
        allowed: Cell::new(2),
    };

    let err = FieldUpdater::new(&storage, &catalog).run(&BOTH, None).unwrap_err();
    assert!(matches!(
        err,
        DenormalError::Storage(StorageError::NotNullable { .. })
    ));

    assert_eq!(
        order_counts(&storage.inner),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
    // The two orders written before the failure are rolled back too
    assert_eq!(column(&storage.inner, "shop.Order", 1, 2), Value::Null);
    assert_eq!(column(&storage.inner, "shop.Order", 2, 2), Value::Null);
    assert!(!storage.inner.in_transaction());
}

#[test]
fn unknown_column_is_rejected_by_storage_and_rolls_back() {
    let (storage, catalog) = mem_shop();
    let err = FieldUpdater::new(&storage, &catalog)
        .run(&["shop.Customer.order_count", "shop.Order.no_such_field"], None)
        .unwrap_err();
    assert!(matches!(
        err,
        DenormalError::Storage(StorageError::UnknownColumn { ref column, .. })
            if column == "no_such_field"
    ));
    assert_eq!(
        order_counts(&storage),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
}

#[test]
fn unknown_second_model_rolls_back_the_first() {
    let (storage, catalog) = mem_shop();
    let err = FieldUpdater::new(&storage, &catalog)
        .run(&["shop.Customer.order_count", "shop.Missing.total"], None)
        .unwrap_err();
    assert!(matches!(err, DenormalError::ModelNotFound(_)));
    assert_eq!(
        order_counts(&storage),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
}

#[test]
fn unknown_column_on_empty_table_is_never_noticed() {
    let storage = MemStorage::new();
    let mut catalog = Catalog::new();
    let model = customer_model();
    storage.create_table(model.name(), &model.schema).unwrap();
    catalog.add_model(model).unwrap();

    let reports = FieldUpdater::new(&storage, &catalog)
        .run(&["shop.Customer.no_such_field"], None)
        .unwrap();
    assert_eq!(reports[0].rows, 0);
}

#[test]
fn failed_run_leaves_disk_untouched() {
    let db = disk_shop("rollback_disk");
    let path = db.path().to_path_buf();
    let before = std::fs::read_to_string(path.join("tables").join("shop.Customer.rows")).unwrap();

    let err = db
        .update_fields(&["shop.Customer.order_count", "shop.Order.bogus"], None)
        .unwrap_err();
    assert!(matches!(
        err,
        DenormalError::Storage(StorageError::UnknownColumn { .. })
    ));
    assert_eq!(
        order_counts(db.storage()),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
    drop(db);

    let after = std::fs::read_to_string(path.join("tables").join("shop.Customer.rows")).unwrap();
    assert_eq!(before, after);
    let db = Database::open(&path).unwrap();
    assert_eq!(
        order_counts(db.storage()),
        vec![Value::Int(0), Value::Int(0), Value::Int(0)]
    );
}
