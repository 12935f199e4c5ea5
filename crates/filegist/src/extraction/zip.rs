//! ZIP archive inspection.
//!
//! Reads the central directory straight from the buffer without inflating
//! anything. Every entry is listed; small stored (uncompressed) entries with a
//! text-like extension are previewed in the report. Compressed entries are listed
//! with their compression method but never recovered.
//!
//! Binary layouts follow APPNOTE.TXT. All multi-byte fields are little-endian.

use crate::core::classify::extension_of;
use crate::core::config::ZipConfig;
use crate::extraction::text::decode_utf8_lossy;
use crate::types::{ExtractedFileContent, FileType};
use crate::{FilegistError, Result};
use std::fmt;

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;

const EOCD_LEN: usize = 22;
const CENTRAL_DIRECTORY_FIXED_LEN: usize = 46;
const LOCAL_FILE_HEADER_FIXED_LEN: usize = 30;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// Extensions previewed in the archive report.
const TEXT_LIKE_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "js", "ts", "tsx", "jsx", "py", "html", "css", "xml", "csv", "yaml", "yml", "toml", "log",
    "rs", "go", "java", "c", "cpp", "h", "sh", "sql", "ini", "cfg", "conf", "env",
];

fn le_u16(raw: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([raw[at], raw[at + 1]])
}

fn le_u32(raw: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]])
}

fn signature_at(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at.checked_add(4)?)?;
    Some(le_u32(raw, 0))
}

/// Compression method of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Deflate64,
    Bzip2,
    Lzma,
    Zstd,
    Xz,
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(method: u16) -> Self {
        match method {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            9 => CompressionMethod::Deflate64,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            93 => CompressionMethod::Zstd,
            95 => CompressionMethod::Xz,
            other => CompressionMethod::Other(other),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => f.write_str("stored"),
            CompressionMethod::Deflate => f.write_str("deflate"),
            CompressionMethod::Deflate64 => f.write_str("deflate64"),
            CompressionMethod::Bzip2 => f.write_str("bzip2"),
            CompressionMethod::Lzma => f.write_str("lzma"),
            CompressionMethod::Zstd => f.write_str("zstd"),
            CompressionMethod::Xz => f.write_str("xz"),
            CompressionMethod::Other(method) => write!(f, "method {method}"),
        }
    }
}

/// End-of-central-directory record.
#[derive(Debug, Clone, Copy)]
pub struct EndOfCentralDirectory<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> EndOfCentralDirectory<'a> {
    /// Locate the record by scanning backward from the end of the buffer,
    /// within the window a maximal archive comment allows.
    pub fn locate(bytes: &'a [u8]) -> Option<Self> {
        let last = bytes.len().checked_sub(EOCD_LEN)?;
        let first = last.saturating_sub(MAX_COMMENT_LEN);

        (first..=last)
            .rev()
            .find(|&at| signature_at(bytes, at) == Some(EOCD_SIGNATURE))
            .map(|offset| Self {
                raw: &bytes[offset..offset + EOCD_LEN],
                offset,
            })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total_entries(&self) -> u16 {
        le_u16(self.raw, 10)
    }

    pub fn central_directory_size(&self) -> u32 {
        le_u32(self.raw, 12)
    }

    pub fn central_directory_offset(&self) -> u32 {
        le_u32(self.raw, 16)
    }

    pub fn comment_length(&self) -> u16 {
        le_u16(self.raw, 20)
    }
}

/// One central-directory file header, including its variable-length tail.
#[derive(Debug, Clone, Copy)]
pub struct CentralDirectoryRecord<'a> {
    raw: &'a [u8],
}

impl<'a> CentralDirectoryRecord<'a> {
    /// Parse the record at `offset`. `None` on a bad signature or when the
    /// record runs past the end of the buffer.
    pub fn parse(bytes: &'a [u8], offset: usize) -> Option<Self> {
        if signature_at(bytes, offset)? != CENTRAL_DIRECTORY_SIGNATURE {
            return None;
        }
        let fixed = bytes.get(offset..offset.checked_add(CENTRAL_DIRECTORY_FIXED_LEN)?)?;
        let variable = le_u16(fixed, 28) as usize + le_u16(fixed, 30) as usize + le_u16(fixed, 32) as usize;
        let raw = bytes.get(offset..offset + CENTRAL_DIRECTORY_FIXED_LEN + variable)?;
        Some(Self { raw })
    }

    pub fn compression_method(&self) -> u16 {
        le_u16(self.raw, 10)
    }

    pub fn compressed_size(&self) -> u32 {
        le_u32(self.raw, 20)
    }

    pub fn uncompressed_size(&self) -> u32 {
        le_u32(self.raw, 24)
    }

    pub fn name_length(&self) -> u16 {
        le_u16(self.raw, 28)
    }

    pub fn extra_length(&self) -> u16 {
        le_u16(self.raw, 30)
    }

    pub fn comment_length(&self) -> u16 {
        le_u16(self.raw, 32)
    }

    pub fn local_header_offset(&self) -> u32 {
        le_u32(self.raw, 42)
    }

    pub fn name(&self) -> &'a [u8] {
        let end = CENTRAL_DIRECTORY_FIXED_LEN + self.name_length() as usize;
        &self.raw[CENTRAL_DIRECTORY_FIXED_LEN..end]
    }

    /// Total length of the record; the next record starts right after it.
    pub fn record_len(&self) -> usize {
        self.raw.len()
    }
}

/// Local file header preceding an entry's data.
#[derive(Debug, Clone, Copy)]
pub struct LocalFileHeader<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> LocalFileHeader<'a> {
    pub fn parse(bytes: &'a [u8], offset: usize) -> Option<Self> {
        if signature_at(bytes, offset)? != LOCAL_FILE_HEADER_SIGNATURE {
            return None;
        }
        let raw = bytes.get(offset..offset.checked_add(LOCAL_FILE_HEADER_FIXED_LEN)?)?;
        Some(Self { raw, offset })
    }

    pub fn name_length(&self) -> u16 {
        le_u16(self.raw, 26)
    }

    pub fn extra_length(&self) -> u16 {
        le_u16(self.raw, 28)
    }

    /// Offset of the entry data in the archive buffer.
    pub fn data_offset(&self) -> usize {
        self.offset + LOCAL_FILE_HEADER_FIXED_LEN + self.name_length() as usize + self.extra_length() as usize
    }
}

/// An archive member as described by the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub local_header_offset: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub compression_method: CompressionMethod,
}

impl ZipEntry {
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

    pub fn is_text_like(&self) -> bool {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        TEXT_LIKE_EXTENSIONS.contains(&extension_of(base).as_str())
    }
}

impl From<CentralDirectoryRecord<'_>> for ZipEntry {
    fn from(record: CentralDirectoryRecord<'_>) -> Self {
        Self {
            name: decode_utf8_lossy(record.name()).into_owned(),
            local_header_offset: u64::from(record.local_header_offset()),
            compressed_size: u64::from(record.compressed_size()),
            uncompressed_size: u64::from(record.uncompressed_size()),
            compression_method: CompressionMethod::from_u16(record.compression_method()),
        }
    }
}

/// Lazy walk over the central directory.
///
/// Stops after the number of records announced by the end-of-central-directory
/// record, or at the first record with a bad signature or out-of-bounds length.
pub struct CentralDirectoryEntries<'a> {
    bytes: &'a [u8],
    pos: usize,
    remaining: u16,
}

impl<'a> CentralDirectoryEntries<'a> {
    pub fn new(bytes: &'a [u8], eocd: &EndOfCentralDirectory<'_>) -> Self {
        Self {
            bytes,
            pos: eocd.central_directory_offset() as usize,
            remaining: eocd.total_entries(),
        }
    }
}

impl Iterator for CentralDirectoryEntries<'_> {
    type Item = ZipEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let Some(record) = CentralDirectoryRecord::parse(self.bytes, self.pos) else {
            tracing::trace!(offset = self.pos, "central directory walk stopped at invalid record");
            self.remaining = 0;
            return None;
        };

        self.pos += record.record_len();
        self.remaining -= 1;
        Some(ZipEntry::from(record))
    }
}

/// Read every central-directory entry, directories included.
///
/// # Errors
///
/// [`FilegistError::CorruptArchive`] when no end-of-central-directory record is
/// found or no entry can be read.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<ZipEntry>> {
    let eocd = EndOfCentralDirectory::locate(bytes)
        .ok_or_else(|| FilegistError::CorruptArchive("end of central directory record not found".to_string()))?;

    let entries: Vec<ZipEntry> = CentralDirectoryEntries::new(bytes, &eocd).collect();

    if entries.is_empty() {
        return Err(FilegistError::CorruptArchive(
            "no central directory entries could be read".to_string(),
        ));
    }

    tracing::debug!(
        announced = eocd.total_entries(),
        recovered = entries.len(),
        "read zip central directory"
    );
    Ok(entries)
}

/// Why a text-like entry was not previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Compressed(CompressionMethod),
    TooLarge(u64),
    BadLocalHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Compressed(method) => write!(f, "{method}, not extracted"),
            SkipReason::TooLarge(size) => write!(f, "{size} bytes, too large to preview"),
            SkipReason::BadLocalHeader => f.write_str("unreadable local header"),
        }
    }
}

struct EntryPreview {
    text: String,
    cut: bool,
}

fn preview_entry(bytes: &[u8], entry: &ZipEntry, config: &ZipConfig) -> std::result::Result<EntryPreview, SkipReason> {
    if entry.compression_method != CompressionMethod::Stored {
        return Err(SkipReason::Compressed(entry.compression_method));
    }
    if entry.uncompressed_size >= config.max_entry_size {
        return Err(SkipReason::TooLarge(entry.uncompressed_size));
    }

    let header = LocalFileHeader::parse(bytes, entry.local_header_offset as usize).ok_or(SkipReason::BadLocalHeader)?;
    let start = header.data_offset();
    let stored = entry.compressed_size as usize;
    let wanted = stored.min(config.read_back_limit);
    let end = start.saturating_add(wanted).min(bytes.len());
    let data = bytes.get(start..end).ok_or(SkipReason::BadLocalHeader)?;

    // Drop a multi-byte character split by the read-back limit.
    let data = match std::str::from_utf8(data) {
        Err(e) if e.error_len().is_none() => &data[..e.valid_up_to()],
        _ => data,
    };

    Ok(EntryPreview {
        text: decode_utf8_lossy(data).into_owned(),
        cut: stored > wanted,
    })
}

fn format_preview(entry: &ZipEntry, preview: EntryPreview, config: &ZipConfig) -> String {
    let mut block = format!("=== {} ===\n", entry.name);

    if preview.text.chars().count() > config.max_entry_chars {
        block.extend(preview.text.chars().take(config.max_entry_chars));
        block.push_str(&format!("\n[... truncated to {} characters]", config.max_entry_chars));
    } else {
        block.push_str(&preview.text);
        if preview.cut {
            block.push_str(&format!(
                "\n[... showing first {} of {} bytes]",
                config.read_back_limit, entry.uncompressed_size
            ));
        }
    }

    block
}

/// Build the human-readable report for a ZIP buffer.
pub fn build_report(archive_name: &str, bytes: &[u8], config: &ZipConfig) -> Result<String> {
    let files: Vec<ZipEntry> = read_entries(bytes)?
        .into_iter()
        .filter(|entry| !entry.is_directory())
        .collect();

    let mut previews = Vec::new();
    let mut text_listing = Vec::new();
    let mut other_listing = Vec::new();

    for entry in &files {
        if !entry.is_text_like() {
            other_listing.push(format!("- {}", entry.name));
            continue;
        }

        match preview_entry(bytes, entry, config) {
            Ok(preview) => {
                text_listing.push(format!("- {}", entry.name));
                if !preview.text.trim().is_empty() {
                    previews.push(format_preview(entry, preview, config));
                }
            }
            Err(reason) => {
                tracing::trace!(entry = %entry.name, %reason, "zip entry not previewed");
                text_listing.push(format!("- {} ({})", entry.name, reason));
            }
        }
    }

    let mut sections = vec![format!("ZIP Archive: {}\nTotal entries: {}", archive_name, files.len())];
    sections.extend(previews);
    sections.push(format!("Text files found ({}):\n{}", text_listing.len(), text_listing.join("\n")));
    sections.push(format!("Other files ({}):\n{}", other_listing.len(), other_listing.join("\n")));

    Ok(sections
        .into_iter()
        .map(|section| section.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Inspect a ZIP buffer into an [`ExtractedFileContent`].
pub fn extract_zip(file_name: &str, bytes: &[u8], config: &ZipConfig) -> Result<ExtractedFileContent> {
    let content = build_report(file_name, bytes, config)?;
    let extracted_size = content.chars().count();

    Ok(ExtractedFileContent {
        file_name: file_name.to_string(),
        file_type: FileType::Zip,
        content,
        original_size: bytes.len() as u64,
        extracted_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8], zip::CompressionMethod)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_stored_text_entry_is_previewed() {
        let bytes = build_zip(&[("readme.txt", b"hello there\n", zip::CompressionMethod::Stored)]);
        let report = build_report("bundle.zip", &bytes, &ZipConfig::default()).unwrap();

        assert!(report.starts_with("ZIP Archive: bundle.zip\nTotal entries: 1"));
        assert!(report.contains("=== readme.txt ===\nhello there"));
        assert!(report.contains("Text files found (1):\n- readme.txt"));
        assert!(report.contains("Other files (0):"));
    }

    #[test]
    fn test_deflated_entry_is_listed_not_extracted() {
        let body = "compressible text ".repeat(50);
        let bytes = build_zip(&[("notes.md", body.as_bytes(), zip::CompressionMethod::Deflated)]);
        let report = build_report("a.zip", &bytes, &ZipConfig::default()).unwrap();

        assert!(report.contains("- notes.md (deflate, not extracted)"));
        assert!(!report.contains("=== notes.md ==="));
    }

    #[test]
    fn test_directories_are_filtered_and_others_listed() {
        let bytes = build_zip(&[
            ("src/", b"", zip::CompressionMethod::Stored),
            ("src/main.rs", b"fn main() {}", zip::CompressionMethod::Stored),
            ("logo.png", &[0x89, b'P', b'N', b'G'], zip::CompressionMethod::Stored),
        ]);
        let entries = read_entries(&bytes).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_directory());

        let report = build_report("a.zip", &bytes, &ZipConfig::default()).unwrap();
        assert!(report.contains("Total entries: 2"));
        assert!(report.contains("Text files found (1):\n- src/main.rs"));
        assert!(report.contains("Other files (1):\n- logo.png"));
    }

    #[test]
    fn test_read_back_limit_and_note() {
        let body = "x".repeat(3000);
        let bytes = build_zip(&[("big.log", body.as_bytes(), zip::CompressionMethod::Stored)]);
        let report = build_report("a.zip", &bytes, &ZipConfig::default()).unwrap();

        let block_start = report.find("=== big.log ===\n").unwrap() + "=== big.log ===\n".len();
        let block = &report[block_start..];
        assert!(block.starts_with(&"x".repeat(1000)));
        assert!(!block.starts_with(&"x".repeat(1001)));
        assert!(report.contains("[... showing first 1000 of 3000 bytes]"));
    }

    #[test]
    fn test_entry_block_truncated_to_max_chars() {
        let body = "y".repeat(500);
        let bytes = build_zip(&[("data.csv", body.as_bytes(), zip::CompressionMethod::Stored)]);
        let config = ZipConfig {
            max_entry_chars: 100,
            ..ZipConfig::default()
        };
        let report = build_report("a.zip", &bytes, &config).unwrap();

        assert!(report.contains(&format!("{}\n[... truncated to 100 characters]", "y".repeat(100))));
        assert!(!report.contains(&"y".repeat(101)));
    }

    #[test]
    fn test_large_entries_are_not_read() {
        let body = "z".repeat(60 * 1024);
        let bytes = build_zip(&[("huge.txt", body.as_bytes(), zip::CompressionMethod::Stored)]);
        let report = build_report("a.zip", &bytes, &ZipConfig::default()).unwrap();

        assert!(report.contains("- huge.txt (61440 bytes, too large to preview)"));
        assert!(!report.contains("=== huge.txt ==="));
    }

    #[test]
    fn test_bad_local_header_is_listed_not_previewed() {
        let bytes = build_zip(&[("readme.txt", b"hello there", zip::CompressionMethod::Stored)]);

        let mut wrong_signature = bytes.clone();
        wrong_signature[0] = 0;
        let report = build_report("bundle.zip", &wrong_signature, &ZipConfig::default()).unwrap();
        assert!(report.contains("Text files found (1):\n- readme.txt (unreadable local header)"));
        assert!(!report.contains("=== readme.txt ==="));
        assert!(!report.contains("hello there"));

        let mut overlong_name = bytes;
        overlong_name[26] = 0xFF;
        overlong_name[27] = 0xFF;
        let report = build_report("bundle.zip", &overlong_name, &ZipConfig::default()).unwrap();
        assert!(report.contains("- readme.txt (unreadable local header)"));
        assert!(!report.contains("=== readme.txt ==="));
    }

    #[test]
    fn test_missing_eocd_is_corrupt() {
        let err = read_entries(b"PK\x03\x04 not really a zip file at all").unwrap_err();
        assert!(matches!(err, FilegistError::CorruptArchive(_)));
        assert!(err.to_string().contains("end of central directory"));
    }

    #[test]
    fn test_eocd_without_entries_is_corrupt() {
        let mut bytes = vec![0u8; EOCD_LEN];
        bytes[..4].copy_from_slice(&EOCD_SIGNATURE.to_le_bytes());
        let err = read_entries(&bytes).unwrap_err();
        assert!(err.to_string().contains("no central directory entries"));
    }

    #[test]
    fn test_eocd_found_before_comment() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.set_comment("archive comment");
        zip.start_file("a.txt", SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored))
            .unwrap();
        zip.write_all(b"comment test").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let eocd = EndOfCentralDirectory::locate(&bytes).unwrap();
        assert_eq!(eocd.comment_length(), 15);
        assert_eq!(eocd.total_entries(), 1);
        assert_eq!(eocd.offset() + EOCD_LEN + 15, bytes.len());
    }

    #[test]
    fn test_truncated_central_directory_stops_walk() {
        let bytes = build_zip(&[
            ("a.txt", b"first", zip::CompressionMethod::Stored),
            ("b.txt", b"second", zip::CompressionMethod::Stored),
        ]);
        let eocd = EndOfCentralDirectory::locate(&bytes).unwrap();
        let cd_start = eocd.central_directory_offset() as usize;

        let mut corrupted = bytes.clone();
        let first = CentralDirectoryRecord::parse(&bytes, cd_start).unwrap();
        let second_start = cd_start + first.record_len();
        corrupted[second_start] = 0;

        let entries = read_entries(&corrupted).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.txt");
    }

    #[test]
    fn test_compression_method_labels() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8).to_string(), "deflate");
        assert_eq!(CompressionMethod::from_u16(93).to_string(), "zstd");
        assert_eq!(CompressionMethod::from_u16(99).to_string(), "method 99");
    }

    #[test]
    fn test_extract_zip_sizes() {
        let bytes = build_zip(&[("readme.txt", b"hello there", zip::CompressionMethod::Stored)]);
        let result = extract_zip("bundle.zip", &bytes, &ZipConfig::default()).unwrap();
        assert_eq!(result.file_type, FileType::Zip);
        assert_eq!(result.original_size, bytes.len() as u64);
        assert_eq!(result.extracted_size, result.content.chars().count());
    }
}
