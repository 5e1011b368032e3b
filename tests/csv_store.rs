mod common;

use std::fs;

use common::temp_dir;
use earnings_core::{
    errors::EarningsError,
    storage::{Collection, CsvRowStore, Row, RowStore},
};

fn user_row(user: &str, hash: &str) -> Row {
    Row::from([
        ("user_id".to_string(), user.to_string()),
        ("credential_hash".to_string(), hash.to_string()),
    ])
}

#[test]
fn appended_rows_keep_their_cells() {
    let store = CsvRowStore::new(temp_dir()).unwrap();
    store
        .append_rows(Collection::Users, &[user_row("ana", "abc")])
        .unwrap();
    store
        .append_rows(Collection::Users, &[user_row("luis, jr", "")])
        .unwrap();

    let rows = store.read_all(Collection::Users).unwrap();
    assert_eq!(rows, vec![user_row("ana", "abc"), user_row("luis, jr", "")]);

    let text = fs::read_to_string(store.collection_path(Collection::Users)).unwrap();
    assert!(text.starts_with("user_id,credential_hash\n"));
}

#[test]
fn missing_collection_reads_empty() {
    let store = CsvRowStore::new(temp_dir()).unwrap();
    assert!(store.read_all(Collection::Budgets).unwrap().is_empty());
}

#[test]
fn foreign_header_is_reported_as_malformed() {
    let store = CsvRowStore::new(temp_dir()).unwrap();
    fs::write(
        store.collection_path(Collection::Users),
        "name,password\nana,1234\n",
    )
    .unwrap();

    let err = store.read_all(Collection::Users).unwrap_err();
    assert!(matches!(err, EarningsError::MalformedRow { .. }));
    assert_eq!(err.collection(), Some(Collection::Users));
    assert!(store
        .append_rows(Collection::Users, &[user_row("ana", "x")])
        .is_err());
}

#[test]
fn rewrite_replaces_previous_rows() {
    let store = CsvRowStore::new(temp_dir()).unwrap();
    store
        .append_rows(
            Collection::Users,
            &[user_row("ana", "a"), user_row("luis", "b")],
        )
        .unwrap();
    store
        .write_all(Collection::Users, &[user_row("luis", "b")])
        .unwrap();
    assert_eq!(
        store.read_all(Collection::Users).unwrap(),
        vec![user_row("luis", "b")]
    );
}
