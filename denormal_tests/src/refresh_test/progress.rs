use super::*;

#[test]
fn progress_sees_each_table_start_every_row_and_finish() {
    let (storage, catalog) = mem_shop();
    let mut recorder = Recorder::default();
    FieldUpdater::new(&storage, &catalog)
        .with_chunk_size(2)
        .run(
            &["shop.Customer.order_count", "shop.Order.customer_name"],
            Some(&mut recorder as &mut dyn Progress),
        )
        .unwrap();

    let mut expected = vec!["start shop.Customer 3".to_string()];
    expected.extend(std::iter::repeat_n("advance 1".to_string(), 3));
    expected.push("finish".to_string());
    expected.push("start shop.Order 5".to_string());
    expected.extend(std::iter::repeat_n("advance 1".to_string(), 5));
    expected.push("finish".to_string());
    assert_eq!(recorder.events, expected);
}

#[test]
fn progress_does_not_change_the_writes() {
    let (with_storage, with_catalog) = mem_shop();
    let mut recorder = Recorder::default();
    FieldUpdater::new(&with_storage, &with_catalog)
        .run(&["shop.Customer.order_count"], Some(&mut recorder as &mut dyn Progress))
        .unwrap();

    let (without_storage, without_catalog) = mem_shop();
    FieldUpdater::new(&without_storage, &without_catalog)
        .run(&["shop.Customer.order_count"], None)
        .unwrap();

    assert_eq!(order_counts(&with_storage), order_counts(&without_storage));
}

#[test]
fn empty_table_still_starts_and_finishes() {
    let storage = MemStorage::new();
    let mut catalog = Catalog::new();
    let model = customer_model();
    storage.create_table(model.name(), &model.schema).unwrap();
    catalog.add_model(model).unwrap();

    let mut recorder = Recorder::default();
    let reports = FieldUpdater::new(&storage, &catalog)
        .run(&["shop.Customer.order_count"], Some(&mut recorder as &mut dyn Progress))
        .unwrap();
    assert_eq!(reports[0].rows, 0);
    assert_eq!(recorder.events, vec!["start shop.Customer 0", "finish"]);
}
