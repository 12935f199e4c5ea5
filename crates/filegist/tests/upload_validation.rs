//! Upload validation integration tests.

use filegist::{ExtractionConfig, FilegistError, validate_upload};
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

fn rejection(name: &str, bytes: &[u8]) -> String {
    match validate_upload(name, bytes, &ExtractionConfig::default()) {
        Err(FilegistError::Validation { message, .. }) => message,
        other => panic!("expected {name} to be rejected, got {:?}", other),
    }
}

/// Test that a real ZIP archive passes content sniffing.
#[test]
fn test_zip_archive_accepted() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("a.txt", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"alpha").unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    assert!(validate_upload("upload", &bytes, &ExtractionConfig::default()).is_ok());
}

/// Test that source files are accepted regardless of their bytes.
#[test]
fn test_source_files_accepted() {
    let config = ExtractionConfig::default();
    for name in ["main.go", "App.KT", "query.sql", "deploy.zsh", "settings.ini"] {
        assert!(validate_upload(name, &[0xFF, 0x00, 0xFE], &config).is_ok(), "{name}");
    }
}

/// Test that plain text with an unknown extension is accepted.
#[test]
fn test_plain_text_without_extension() {
    let config = ExtractionConfig::default();
    assert!(validate_upload("Dockerfile", b"FROM rust:1.91\nRUN cargo build\n", &config).is_ok());
}

/// Test that only the sample window decides printability.
#[test]
fn test_printable_sample_window() {
    let mut bytes = vec![b'a'; 1000];
    bytes.extend_from_slice(&[0x00, 0x01]);
    assert!(validate_upload("data", &bytes, &ExtractionConfig::default()).is_ok());

    let mut bytes = vec![b'a'; 999];
    bytes.push(0x00);
    assert_eq!(rejection("data", &bytes), "File type could not be determined");
}

/// Test the size limit.
#[test]
fn test_size_limit() {
    let bytes = vec![b' '; 10 * 1024 * 1024 + 1];
    assert_eq!(rejection("notes.txt", &bytes), "File size exceeds 10MB limit");
}

/// Test that a sniffed but disallowed type is reported by MIME type.
#[test]
fn test_disallowed_type_names_mime() {
    let mut wasm = b"\0asm\x01\0\0\0".to_vec();
    wasm.resize(32, 0);
    assert_eq!(
        rejection("module.bin", &wasm),
        "File type 'application/wasm' is not supported"
    );
}
