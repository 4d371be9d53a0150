use ibdecode::page::fil::PAGE_TYPE_INDEX;
use ibdecode::page::index::IndexPage;
use ibdecode::page::index_header::PageFormat;
use ibdecode::page::{Page, INFIMUM_ORIGIN, SUPREMUM_ORIGIN};
use ibdecode::types::error::PageError;
use ibdecode::types::value::Value;
use ibdecode::utils::mock::{blank_page, encode_row, users_table, IndexPageBuilder};

fn users_page_with_rows() -> Vec<u8> {
    let table = users_table();
    let mut builder = IndexPageBuilder::new(3);
    for (id, name, email) in [
        (1, "Alice", "alice@example.com"),
        (2, "Bob", "bob@example.com"),
        (3, "Charlie", "charlie@example.com"),
    ] {
        let row = encode_row(
            &table,
            &[
                Value::Int(id),
                Value::Text(name.into()),
                Value::Text(email.into()),
                Value::Timestamp {
                    epoch: 1_640_995_200,
                    micros: 0,
                },
            ],
            0x100 + id as u64,
            0x8000_0000_0000_10 + id as u64,
        );
        builder = builder.row(row);
    }
    builder.build()
}

#[test]
fn test_structural_parse() {
    let buf = users_page_with_rows();
    let page = IndexPage::parse(Page::new(3, buf).unwrap()).unwrap();

    assert_eq!(page.hdr.format, PageFormat::Compact);
    assert_eq!(page.hdr.num_user_recs, 3);
    assert_eq!(page.hdr.num_heap_recs, 5); // infimum + supremum + 3 rows
    assert_eq!(page.hdr.page_level, 0);
    assert!(page.is_leaf());
    assert!(page.is_root());
}

#[test]
fn test_directory_slots_are_reversed() {
    let buf = users_page_with_rows();
    let page = IndexPage::parse(Page::new(3, buf).unwrap()).unwrap();

    let slots = &page.dir_slots;
    assert_eq!(slots.len(), page.hdr.num_dir_slots as usize);
    assert_eq!(slots[0] as usize, INFIMUM_ORIGIN);
    assert_eq!(*slots.last().unwrap() as usize, SUPREMUM_ORIGIN);
    for &slot in slots.iter() {
        assert!((94..16376).contains(&(slot as usize)));
    }
}

#[test]
fn test_used_bytes() {
    let buf = users_page_with_rows();
    let page = IndexPage::parse(Page::new(3, buf).unwrap()).unwrap();

    let expected = page.hdr.heap_top as usize + 8 + 2 * page.hdr.num_dir_slots as usize
        - page.hdr.garbage_space as usize;
    assert_eq!(page.used_bytes(), expected);
}

#[test]
fn test_non_index_page_is_rejected() {
    let buf = blank_page(9, 0, 42); // freshly allocated page
    let page = Page::new(9, buf).unwrap();
    assert!(matches!(
        IndexPage::parse(page),
        Err(PageError::NotIndexPage {
            page_no: 9,
            page_type: 0
        })
    ));
}

#[test]
fn test_redundant_format_is_rejected() {
    let mut buf = users_page_with_rows();
    // Clear the compact bit in the heap-records flag word at offset 42
    buf[42] &= 0x7F;
    let page = Page::new(3, buf).unwrap();
    assert!(matches!(
        IndexPage::parse(page),
        Err(PageError::UnsupportedRedundantFormat { page_no: 3 })
    ));
}

#[test]
fn test_corrupt_system_record_literals() {
    let mut buf = users_page_with_rows();
    buf[INFIMUM_ORIGIN] = b'X';
    assert!(matches!(
        IndexPage::parse(Page::new(3, buf).unwrap()),
        Err(PageError::CorruptSystemRecord {
            which: "INFIMUM",
            ..
        })
    ));

    let mut buf = users_page_with_rows();
    buf[SUPREMUM_ORIGIN + 7] = 0;
    assert!(matches!(
        IndexPage::parse(Page::new(3, buf).unwrap()),
        Err(PageError::CorruptSystemRecord {
            which: "SUPREMUM",
            ..
        })
    ));
}

#[test]
fn test_internal_page_queries() {
    let table = users_table();
    let buf = IndexPageBuilder::new(10)
        .level(1)
        .prev(8)
        .row(ibdecode::utils::mock::encode_node_pointer(
            &table,
            &[Value::Int(1)],
            11,
        ))
        .build();
    let page = IndexPage::parse(Page::new(10, buf).unwrap()).unwrap();

    assert!(!page.is_leaf());
    assert!(!page.is_root()); // has a prev neighbor
    assert_eq!(page.hdr.page_level, 1);
}

#[test]
fn test_summary_fields() {
    let buf = users_page_with_rows();
    let page = IndexPage::parse(Page::new(3, buf).unwrap()).unwrap();
    let summary = page.summary();

    assert_eq!(summary.page_no, 3);
    assert_eq!(summary.page_type, PAGE_TYPE_INDEX);
    assert_eq!(summary.num_user_recs, 3);
    assert!(summary.is_leaf);
    assert!(summary.is_root);
    assert_eq!(summary.used_bytes, page.used_bytes());

    // Summaries are part of the output surface; they must serialize
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"num_user_recs\":3"));
}
