//! What survives closing and reopening an on-disk catalog

#![cfg(feature = "sled-backend")]

mod testutils;

use fncache::{CacheArg, CacheArgs, NewFunctionCache};
use testutils::test_fixture::TestFixture;

#[test]
fn test_entries_survive_reopen() {
    let mut fixture = TestFixture::new().unwrap();
    let blur = fixture.function("sig_blur");
    let col3 = fixture.column(1, "col3");
    let entry = fixture.cache_over_columns("sig_blur(col3)", blur, &[col3]);

    fixture.reopen().unwrap();

    let catalog = fixture.catalog();
    let fetched = catalog
        .function_caches()
        .get_by_name_and_function("sig_blur(col3)", blur)
        .unwrap()
        .unwrap();
    assert_eq!(fetched, entry);
    assert_eq!(fetched.args, CacheArgs::new(vec![CacheArg::column(col3)]));
    assert_eq!(catalog.function_caches().dependents_of_column(col3).unwrap(), vec![entry.row_id]);
}

#[test]
fn test_row_ids_never_reused_across_reopen() {
    let mut fixture = TestFixture::new().unwrap();
    let blur = fixture.function("Blur");
    let first = fixture.cache_over_columns("a", blur, &[]);
    let second = fixture.cache_over_columns("b", blur, &[]);
    assert!(fixture
        .catalog()
        .drop_function_cache_catalog_entry(second.row_id)
        .unwrap());

    fixture.reopen().unwrap();

    let third = fixture
        .catalog()
        .insert_function_cache_catalog_entry(NewFunctionCache::new(
            "b",
            blur,
            "/tmp/b",
            CacheArgs::default(),
        ))
        .unwrap();
    assert_eq!(first.row_id, 1);
    assert_eq!(third.row_id, 3);
}

#[test]
fn test_unique_constraint_holds_after_reopen() {
    let mut fixture = TestFixture::new().unwrap();
    let blur = fixture.function("Blur");
    fixture.cache_over_columns("a", blur, &[]);

    fixture.reopen().unwrap();

    assert!(fixture
        .catalog()
        .insert_function_cache_catalog_entry(NewFunctionCache::new(
            "a",
            blur,
            "/tmp/a",
            CacheArgs::default(),
        ))
        .is_err());
    let tables = fixture.catalog().list_tables().unwrap();
    assert_eq!(tables[2].schema.name, "function_cache");
    assert_eq!(tables[2].row_count, 1);
}
