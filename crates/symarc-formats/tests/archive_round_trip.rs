#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for archive files on disk
//!
//! Builds archives from text inputs through the public adapter entry
//! point, writes them to a temporary directory and reads them back.

use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use symarc_formats::SymarcFormat;
use symarc_formats::input::{AdapterOptions, InputError, InputFormat, load_file};
use symarc_formats::symbol::{HEADER_SIZE, SymbolDatabase, SymbolError, read_archive};
use tempfile::TempDir;

const NM_DUMP: &str = "\
0000000000400000 T __executable_start
0000000000401000 T _start
0000000000401040 t frame_dummy
0000000000401136 T main
0000000000401150 T main_loop
0000000000404010 D counter
                 U puts@GLIBC_2.2.5
";

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn build_archive(db: &mut SymbolDatabase, path: &Path) {
    db.compile();
    let mut out = BufWriter::new(File::create(path).unwrap());
    db.write_to(&mut out).unwrap();
    out.flush().unwrap();
}

fn names(db: &SymbolDatabase) -> Vec<(u64, String)> {
    db.iter()
        .map(|e| (e.offset, e.name_lossy().into_owned()))
        .collect()
}

#[test]
fn nm_dump_to_archive_and_back() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "app.nm", NM_DUMP.as_bytes());
    let output = dir.path().join("app.sym");

    let mut db = SymbolDatabase::new();
    let stats = load_file(
        InputFormat::GnuNm,
        &input,
        &mut db,
        &AdapterOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.appended, 5);
    build_archive(&mut db, &output);

    let mut file = File::open(&output).unwrap();
    let read = read_archive(&mut file).unwrap();
    assert_eq!(
        names(&read),
        vec![
            (0x0, "__executable_start()".to_string()),
            (0x1000, "_start()".to_string()),
            (0x1040, "frame_dummy()".to_string()),
            (0x1136, "main()".to_string()),
            (0x1150, "main_loop()".to_string()),
        ]
    );
    assert_eq!(read.lookup(0x1140).unwrap().name, b"main()");
    assert_eq!(read.lookup(0x2000).unwrap().name, b"main_loop()");
}

#[test]
fn archive_as_input_is_stable() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.sym");
    let second = dir.path().join("second.sym");

    let mut db = SymbolDatabase::new();
    db.append(0x2000, "render()");
    db.append(0x1000, "init()");
    db.append(0x1800, "init_audio()");
    build_archive(&mut db, &first);

    let mut again = SymbolDatabase::new();
    load_file(
        InputFormat::Symbol,
        &first,
        &mut again,
        &AdapterOptions::default(),
    )
    .unwrap();
    build_archive(&mut again, &second);

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);
    SymbolDatabase::verify_round_trip(&a).unwrap();
}

#[test]
fn single_symbol_file_layout() {
    let mut db = SymbolDatabase::new();
    db.append(0x1000, "main()");
    db.compile();
    let data = db.build().unwrap();

    assert_eq!(data.len(), HEADER_SIZE + 1 + 1 + 6);
    assert_eq!(&data[0..8], b"Symbolic");
    assert_eq!(&data[8..12], &[1, 0, 0, 0]);
    assert_eq!(&data[12..16], &[0, 1, 0, 3]);
    assert_eq!(&data[16..24], &0x1000u64.to_le_bytes());
    assert_eq!(&data[24..28], &1u32.to_le_bytes());
    assert_eq!(&data[28..32], &6u32.to_le_bytes());
    assert_eq!(&data[HEADER_SIZE + 2..], b"main()");
}

#[test]
fn empty_archive() {
    let mut db = SymbolDatabase::new();
    db.compile();
    let data = db.build().unwrap();
    assert_eq!(data.len(), HEADER_SIZE);

    let read = SymbolDatabase::parse(&data).unwrap();
    assert!(read.is_empty());
    assert_eq!(read.lookup(0), None);
}

#[test]
fn truncated_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut db = SymbolDatabase::new();
    db.append(0x10, "alpha()");
    db.append(0x20, "beta()");
    db.compile();
    let data = db.build().unwrap();
    let path = write_file(dir.path(), "short.sym", &data[..data.len() - 3]);

    let mut file = File::open(&path).unwrap();
    let err = read_archive(&mut file).unwrap_err();
    assert!(
        matches!(err, SymbolError::TruncatedData { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn missing_input_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.map");
    let mut db = SymbolDatabase::new();

    let err = load_file(
        InputFormat::GnuMap,
        &missing,
        &mut db,
        &AdapterOptions::default(),
    )
    .unwrap_err();
    match err {
        InputError::Open { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}
