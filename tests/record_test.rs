use ibdecode::page::index::IndexPage;
use ibdecode::page::Page;
use ibdecode::record::CompactDecoder;
use ibdecode::schema::{Charset, Column, ColumnType, TableDef};
use ibdecode::types::error::PageError;
use ibdecode::types::record::Record;
use ibdecode::types::value::Value;
use ibdecode::utils::mock::{encode_node_pointer, encode_row, users_table, IndexPageBuilder};

fn decode_all(page: &IndexPage, table: &TableDef) -> Vec<Record> {
    let decoder = CompactDecoder::new(table);
    page.walk(1000, true)
        .map(|slot| decoder.decode(page, slot.unwrap().origin).unwrap())
        .collect()
}

#[test]
fn test_three_row_users_table() {
    let table = users_table();
    let rows = [
        (1i64, "Alice", "alice@example.com"),
        (2, "Bob", "bob@example.com"),
        (3, "Charlie", "charlie@example.com"),
    ];
    let mut builder = IndexPageBuilder::new(3);
    for (id, name, email) in rows {
        builder = builder.row(encode_row(
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
            0x200,
            0x80_0000_0000_0001,
        ));
    }
    let page = IndexPage::parse(Page::new(3, builder.build()).unwrap()).unwrap();
    let records = decode_all(&page, &table);

    assert_eq!(records.len(), 3);
    for (record, (id, name, email)) in records.iter().zip(rows) {
        // Signed decode must flip the sign bit back: ids are small and
        // positive, never the huge unflipped values
        assert_eq!(record.get("id"), Some(&Value::Int(id)));
        assert!(record.get("id").unwrap().as_int().unwrap() > 0);
        assert_eq!(record.get("name"), Some(&Value::Text(name.into())));
        assert_eq!(record.get("email"), Some(&Value::Text(email.into())));
        assert_eq!(
            record.get("created_at"),
            Some(&Value::Timestamp {
                epoch: 1_640_995_200,
                micros: 0
            })
        );
    }

    // Output order equals traversal order
    let ids: Vec<i64> = records
        .iter()
        .map(|r| r.get("id").unwrap().as_int().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_variable_length_header_ordering() {
    // Two VARCHARs of 5 and 17 bytes: behind the record header the
    // lengths sit in reverse, [0x11, 0x05, ...] reading upward in memory,
    // and must come back as [5, 17], never [17, 5].
    let mut table = TableDef::new("pair");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(
            Column::new("a", ColumnType::Varchar)
                .with_length(50)
                .with_charset(Charset::Latin1)
                .not_null(),
        )
        .unwrap();
    table
        .add_column(
            Column::new("b", ColumnType::Varchar)
                .with_length(50)
                .with_charset(Charset::Latin1)
                .not_null(),
        )
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();

    let row = encode_row(
        &table,
        &[
            Value::Int(9),
            Value::Text("AAAAA".into()),
            Value::Text("BBBBBBBBBBBBBBBBB".into()),
        ],
        1,
        0x80_0000_0000_0001,
    );
    let buf = IndexPageBuilder::new(1).row(row).build();

    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();
    let records = decode_all(&page, &table);
    let record = &records[0];

    assert_eq!(record.get("a"), Some(&Value::Text("AAAAA".into())));
    assert_eq!(
        record.get("b"),
        Some(&Value::Text("BBBBBBBBBBBBBBBBB".into()))
    );

    // Raw layout check: no nullable columns, so the two length bytes sit
    // directly below the 5-byte header, first column nearest to it.
    let origin = record.origin;
    assert_eq!(page.data()[origin - 6], 0x05);
    assert_eq!(page.data()[origin - 7], 0x11);
}

#[test]
fn test_transaction_columns_are_skipped() {
    let mut table = TableDef::new("t");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(
            Column::new("name", ColumnType::Varchar)
                .with_length(20)
                .with_charset(Charset::Latin1)
                .not_null(),
        )
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();

    let row = encode_row(
        &table,
        &[Value::Int(1), Value::Text("Alice".into())],
        0x0001_AEB3,
        0x81_0000_008E_0110,
    );
    let buf = IndexPageBuilder::new(1).row(row).build();
    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();

    // The record's data section is exactly the documented byte string:
    // key, 6-byte trx id, 7-byte roll pointer, then the name
    let records = decode_all(&page, &table);
    let record = &records[0];
    let expected = [
        0x80, 0x00, 0x00, 0x01, // id = 1, sign bit flipped
        0x00, 0x00, 0x00, 0x01, 0xAE, 0xB3, // trx id
        0x81, 0x00, 0x00, 0x00, 0x8E, 0x01, 0x10, // roll pointer
        0x41, 0x6C, 0x69, 0x63, 0x65, // "Alice"
    ];
    assert_eq!(
        &page.data()[record.origin..record.origin + expected.len()],
        &expected
    );

    assert_eq!(record.get("id"), Some(&Value::Int(1)));
    assert_eq!(record.get("name"), Some(&Value::Text("Alice".into())));
    // Only the two declared columns come back; the 13 hidden bytes never
    // surface as values
    assert_eq!(record.values.len(), 2);
}

#[test]
fn test_all_null_bitmap() {
    let table = users_table();
    let row = encode_row(
        &table,
        &[Value::Int(7), Value::Null, Value::Null, Value::Null],
        1,
        0x80_0000_0000_0001,
    );
    // id(4) + trx(6) + roll(7): nothing else in the data section
    assert_eq!(row.data.len(), 17);
    // pre is just the bitmap byte; NULL varlen columns consume no bytes
    assert_eq!(row.pre.len(), 1);

    let buf = IndexPageBuilder::new(1).row(row).build();
    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();
    let records = decode_all(&page, &table);
    let record = &records[0];

    assert_eq!(record.get("id"), Some(&Value::Int(7)));
    assert_eq!(record.get("name"), Some(&Value::Null));
    assert_eq!(record.get("email"), Some(&Value::Null));
    assert_eq!(record.get("created_at"), Some(&Value::Null));
}

#[test]
fn test_node_pointer_records() {
    let table = users_table();
    let buf = IndexPageBuilder::new(5)
        .level(1)
        .row(encode_node_pointer(&table, &[Value::Int(1)], 6))
        .row(encode_node_pointer(&table, &[Value::Int(100)], 7))
        .build();
    let page = IndexPage::parse(Page::new(5, buf).unwrap()).unwrap();
    let records = decode_all(&page, &table);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("id"), Some(&Value::Int(1)));
    assert_eq!(records[0].child_page_no, Some(6));
    assert_eq!(records[1].get("id"), Some(&Value::Int(100)));
    assert_eq!(records[1].child_page_no, Some(7));

    // Internal records carry only the key
    assert_eq!(records[0].values.len(), 1);
}

#[test]
fn test_length_header_escape_boundaries() {
    // wide: VARCHAR(100) utf8mb4 can reach 400 bytes, so lengths past 127
    // take the two-byte escape. narrow: VARBINARY(200) never exceeds 255
    // bytes, so a single byte always suffices, high bit or not.
    let mut table = TableDef::new("edges");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(
            Column::new("wide", ColumnType::Varchar)
                .with_length(100)
                .with_charset(Charset::Utf8mb4)
                .not_null(),
        )
        .unwrap();
    table
        .add_column(
            Column::new("narrow", ColumnType::VarBinary)
                .with_length(200)
                .not_null(),
        )
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();

    for (wide_len, narrow_len, header_bytes) in [(127, 127, 2), (128, 128, 3), (255, 200, 3)] {
        let wide = "x".repeat(wide_len);
        let narrow = vec![0xAB; narrow_len];
        let row = encode_row(
            &table,
            &[
                Value::Int(1),
                Value::Text(wide.clone()),
                Value::Bytes(narrow.clone()),
            ],
            1,
            0x80_0000_0000_0001,
        );
        // No nullable columns: pre is the variable-length vector alone
        assert_eq!(
            row.pre.len(),
            header_bytes,
            "wide={wide_len} narrow={narrow_len}"
        );

        let buf = IndexPageBuilder::new(1).row(row).build();
        let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();
        let records = decode_all(&page, &table);
        assert_eq!(records[0].get("wide"), Some(&Value::Text(wide)));
        assert_eq!(records[0].get("narrow"), Some(&Value::Bytes(narrow)));
    }
}

#[test]
fn test_overflow_flag_is_rejected() {
    let mut table = TableDef::new("big");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(Column::new("body", ColumnType::Text).not_null())
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();

    let row = encode_row(
        &table,
        &[Value::Int(1), Value::Text("x".repeat(300))],
        1,
        0x80_0000_0000_0001,
    );
    let mut buf = IndexPageBuilder::new(1).row(row).build();

    let page = IndexPage::parse(Page::new(1, buf.clone()).unwrap()).unwrap();
    let slot = page.walk(10, true).next().unwrap().unwrap();

    // Set the off-page bit in the first (upper) length byte, which sits
    // directly below the 5-byte record header
    buf[slot.origin - 6] |= 0x40;
    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();
    let decoder = CompactDecoder::new(&table);
    assert!(matches!(
        decoder.decode(&page, slot.origin),
        Err(PageError::OverflowUnsupported { ref column, .. }) if column == "body"
    ));
}

#[test]
fn test_system_records_decode_to_headers_only() {
    let table = users_table();
    let buf = IndexPageBuilder::new(1).build();
    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();
    let decoder = CompactDecoder::new(&table);

    let mut count = 0;
    for slot in page.walk(10, false) {
        let slot = slot.unwrap();
        let record = decoder.decode(&page, slot.origin).unwrap();
        assert!(record.is_system());
        assert!(record.values.is_empty());
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn test_node_pointer_with_variable_length_key() {
    // Internal records carry length headers only for the key's
    // variable-length columns, never for the rest of the row
    let mut table = TableDef::new("tags");
    table
        .add_column(
            Column::new("tag", ColumnType::Varchar)
                .with_length(40)
                .with_charset(Charset::Latin1)
                .not_null(),
        )
        .unwrap();
    table
        .add_column(Column::new("hits", ColumnType::BigInt).not_null())
        .unwrap();
    table
        .add_column(
            Column::new("note", ColumnType::Varchar)
                .with_length(40)
                .with_charset(Charset::Latin1),
        )
        .unwrap();
    table.set_primary_key(&["tag"]).unwrap();

    let buf = IndexPageBuilder::new(8)
        .level(2)
        .row(encode_node_pointer(
            &table,
            &[Value::Text("alpha".into())],
            9,
        ))
        .build();
    let page = IndexPage::parse(Page::new(8, buf).unwrap()).unwrap();
    let records = decode_all(&page, &table);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("tag"), Some(&Value::Text("alpha".into())));
    assert_eq!(records[0].child_page_no, Some(9));
    assert_eq!(records[0].values.len(), 1);
}

#[test]
fn test_unknown_column_type_fails_cleanly() {
    let mut table = TableDef::new("money");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(Column::new("amount", ColumnType::Decimal).not_null())
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();

    // Build against a schema without the DECIMAL column, then decode with
    // it; the decoder must refuse rather than guess a width.
    let mut build_table = TableDef::new("money");
    build_table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    build_table.set_primary_key(&["id"]).unwrap();
    let row = encode_row(&build_table, &[Value::Int(1)], 1, 0x80_0000_0000_0001);
    let buf = IndexPageBuilder::new(1).row(row).build();
    let page = IndexPage::parse(Page::new(1, buf).unwrap()).unwrap();

    let decoder = CompactDecoder::new(&table);
    let slot = page.walk(10, true).next().unwrap().unwrap();
    assert!(matches!(
        decoder.decode(&page, slot.origin),
        Err(PageError::UnknownColumnType { ref column, .. }) if column == "amount"
    ));
}
