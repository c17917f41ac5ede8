use super::*;
use denormal_core::model::ModelRegistry;

fn account_model() -> Model {
    Model::new(
        "bank.Account",
        Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("balance", DataType::Decimal),
        ]),
    )
    .with_derived(
        "balance",
        Derivation::Sum {
            source: "ledger".into(),
            foreign_key: "account_id".into(),
            source_column: "amount".into(),
        },
    )
}

#[test]
fn catalog_save_load_roundtrip() {
    let mut catalog = Catalog::new();
    catalog.add_model(account_model()).unwrap();

    let path = temp_dir("catalog_roundtrip");
    std::fs::create_dir_all(&path).unwrap();
    let file = path.join("catalog.json");
    catalog.save_to_path(&file).unwrap();

    let loaded = Catalog::load_from_path(&file).unwrap();
    assert_eq!(loaded.models(), catalog.models());
    let model = loaded.get_model("bank.Account").unwrap();
    assert!(matches!(
        model.derivation("balance"),
        Some(Derivation::Sum { .. })
    ));
}

#[test]
fn missing_catalog_is_empty() {
    let path = temp_dir("catalog_missing");
    let loaded = Catalog::load_from_path(&path.join("catalog.json")).unwrap();
    assert!(loaded.models().is_empty());
}

#[test]
fn hand_written_catalog_is_accepted() {
    let path = temp_dir("catalog_hand");
    std::fs::create_dir_all(&path).unwrap();
    let catalog = serde_json::json!({
        "models": [{
            "name": "blog.Author",
            "schema": {
                "columns": [
                    {"name": "id", "dtype": "int"},
                    {"name": "posts", "dtype": "int"}
                ]
            },
            "derived": [
                {"column": "posts", "kind": "count", "source": "blog.Post", "foreign_key": "author_id"}
            ]
        }]
    });
    std::fs::write(path.join("catalog.json"), catalog.to_string()).unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(db.models().len(), 1);
    assert_eq!(db.models()[0].schema.primary_key, "id");
    assert!(path.join("tables").join("blog.Author.rows").exists());
}

#[test]
fn invalid_catalog_fails_open() {
    let path = temp_dir("catalog_invalid");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("catalog.json"), "{\"models\": [").unwrap();
    assert!(matches!(
        Database::open(&path),
        Err(DenormalError::Storage(StorageError::Json { .. }))
    ));
}

#[test]
fn created_models_survive_reopen() {
    let path = temp_dir("catalog_reopen");
    {
        let mut db = Database::open(&path).unwrap();
        db.create_model(account_model()).unwrap();
        db.insert("bank.Account", vec![Value::Int(1), Value::Decimal(0.into())])
            .unwrap();
        assert!(matches!(
            db.create_model(account_model()),
            Err(DenormalError::DuplicateModel(_))
        ));
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.models().len(), 1);
    assert_eq!(db.storage().count("bank.Account").unwrap(), 1);
}
