//! Heuristic PDF text recovery.
//!
//! This is a byte-level scraper, not a PDF parser. It never resolves the xref
//! table, never inflates compressed streams and never decodes fonts. It recovers
//! text from uncompressed content streams, which covers simple generated PDFs, and
//! falls back to a raw scan for parenthesized ASCII runs when that finds too little.
//!
//! Known limitations:
//!
//! - Streams declaring `/FlateDecode` or `/ASCIIHexDecode` are skipped, so most
//!   PDFs produced by office suites yield nothing from the stream pass.
//! - The fallback scan can pick up strings that are not page text (metadata,
//!   annotations, font names in parentheses).
//! - Text encoded through custom font encodings comes out as garbage or not at all.

use crate::core::config::PdfConfig;
use crate::extraction::text::decode_utf8_lossy;
use crate::types::{ExtractedFileContent, FileType};
use crate::{FilegistError, Result};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

const PDF_HEADER: &[u8] = b"%PDF-";

const UNREADABLE_PDF_MESSAGE: &str = "Could not extract readable text from PDF. The PDF might be image-based, encrypted, or uses unsupported compression.";

/// Filter names whose streams are never scanned.
const UNSUPPORTED_FILTERS: [&[u8]; 4] = [b"/FlateDecode", b"/Fl", b"/ASCIIHexDecode", b"/AHx"];

static PARENTHESIZED_ASCII: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([\x20-\x27\x2A-\x7E]{3,})\)").expect("Parenthesized ASCII regex pattern is valid and should compile")
});

/// Text recovered from a PDF buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    /// Cleaned text, truncated to the configured maximum.
    pub text: String,
    /// Character count before truncation.
    pub extracted_size: usize,
    pub truncated: bool,
}

/// Check for the `%PDF-` header.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_HEADER)
}

/// Recover text from a PDF buffer.
///
/// # Errors
///
/// - [`FilegistError::InvalidPdf`] when the buffer does not start with `%PDF-`.
///   Nothing is scanned in that case.
/// - [`FilegistError::UnreadablePdf`] when fewer than `config.min_text_chars`
///   characters survive cleanup.
pub fn extract_pdf_text(bytes: &[u8], config: &PdfConfig) -> Result<PdfText> {
    if !has_pdf_header(bytes) {
        return Err(FilegistError::InvalidPdf(
            "file does not start with a %PDF- header".to_string(),
        ));
    }

    let mut text = clean_text(&stream_text(bytes));
    // Short stream text is discarded in favour of the raw scan, even when the
    // raw scan finds less.
    let used_fallback = text.chars().count() < config.min_stream_text_chars;
    if used_fallback {
        text = clean_text(&fallback_text(bytes));
    }

    let extracted_size = text.chars().count();
    tracing::trace!(extracted_size, used_fallback, "pdf text recovered");

    if extracted_size < config.min_text_chars {
        return Err(FilegistError::UnreadablePdf(UNREADABLE_PDF_MESSAGE.to_string()));
    }

    let truncated = extracted_size > config.max_chars;
    if truncated {
        text = text.chars().take(config.max_chars).collect();
        text.push_str(&format!(
            "\n\n[Content truncated: showing first {} of {} characters]",
            config.max_chars, extracted_size
        ));
    }

    Ok(PdfText {
        text,
        extracted_size,
        truncated,
    })
}

/// Recover text from a PDF buffer into an [`ExtractedFileContent`].
pub fn extract_pdf(file_name: &str, bytes: &[u8], config: &PdfConfig) -> Result<ExtractedFileContent> {
    let recovered = extract_pdf_text(bytes, config)?;
    Ok(ExtractedFileContent {
        file_name: file_name.to_string(),
        file_type: FileType::Pdf,
        content: recovered.text,
        original_size: bytes.len() as u64,
        extracted_size: recovered.extracted_size,
    })
}

/// A `stream ... endstream` block and the object dictionary preceding it.
#[derive(Debug, Clone, Copy)]
struct StreamBlock<'a> {
    dictionary: &'a [u8],
    data: &'a [u8],
}

impl StreamBlock<'_> {
    fn is_scannable(&self) -> bool {
        !UNSUPPORTED_FILTERS
            .iter()
            .any(|filter| contains_name(self.dictionary, filter))
    }
}

/// Iterator over the stream blocks of a PDF buffer, in file order.
struct StreamBlocks<'a> {
    bytes: &'a [u8],
    pos: usize,
    region_start: usize,
}

impl<'a> StreamBlocks<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            region_start: 0,
        }
    }
}

impl<'a> Iterator for StreamBlocks<'a> {
    type Item = StreamBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.bytes;

        loop {
            let keyword = self.pos + memmem::find(&bytes[self.pos..], b"stream")?;
            let after_keyword = keyword + b"stream".len();

            if keyword >= 3 && &bytes[keyword - 3..keyword] == b"end" {
                self.pos = after_keyword;
                self.region_start = after_keyword;
                continue;
            }

            let data_start = match bytes.get(after_keyword) {
                Some(b'\r') if bytes.get(after_keyword + 1) == Some(&b'\n') => after_keyword + 2,
                Some(b'\r') | Some(b'\n') => after_keyword + 1,
                // `stream` inside some other token
                _ => {
                    self.pos = after_keyword;
                    continue;
                }
            };

            let data_end = memmem::find(&bytes[data_start..], b"endstream")
                .map(|offset| data_start + offset)
                .unwrap_or(bytes.len());

            let region = &bytes[self.region_start..keyword];
            let dictionary = match memmem::rfind(region, b"obj") {
                Some(idx) => &region[idx..],
                None => region,
            };

            self.pos = (data_end + b"endstream".len()).min(bytes.len());
            self.region_start = self.pos;

            return Some(StreamBlock {
                dictionary,
                data: &bytes[data_start..data_end],
            });
        }
    }
}

/// True when `haystack` contains the PDF name `name` as a whole token.
fn contains_name(haystack: &[u8], name: &[u8]) -> bool {
    memmem::find_iter(haystack, name).any(|idx| {
        haystack
            .get(idx + name.len())
            .is_none_or(|next| !next.is_ascii_alphanumeric())
    })
}

/// Text shown by `Tj`, `TJ`, `'` and `"` in every scannable stream.
fn stream_text(bytes: &[u8]) -> String {
    let mut pieces = Vec::new();
    let mut scanned = 0usize;
    let mut skipped = 0usize;

    for block in StreamBlocks::new(bytes) {
        if block.is_scannable() {
            scanned += 1;
            collect_shown_text(block.data, &mut pieces);
        } else {
            skipped += 1;
        }
    }

    tracing::trace!(scanned, skipped, pieces = pieces.len(), "pdf stream scan finished");
    pieces.join(" ")
}

/// Parenthesized runs of printable ASCII anywhere in the buffer.
fn fallback_text(bytes: &[u8]) -> String {
    PARENTHESIZED_ASCII
        .captures_iter(bytes)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_utf8_lossy(m.as_bytes()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug)]
enum Operand {
    Str(String),
    Array(Vec<String>),
    Other,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    LiteralString(&'a [u8]),
    ArrayStart,
    ArrayEnd,
    Operator(&'a [u8]),
    Other,
}

fn collect_shown_text(content: &[u8], pieces: &mut Vec<String>) {
    let mut operands: Vec<Operand> = Vec::new();
    let mut array: Option<Vec<String>> = None;

    for token in Tokenizer::new(content) {
        match token {
            Token::LiteralString(raw) => {
                let value = decode_utf8_lossy(raw).into_owned();
                match array.as_mut() {
                    Some(items) => items.push(value),
                    None => operands.push(Operand::Str(value)),
                }
            }
            Token::ArrayStart => array = Some(Vec::new()),
            Token::ArrayEnd => {
                if let Some(items) = array.take() {
                    operands.push(Operand::Array(items));
                }
            }
            Token::Operator(op) => {
                // Operators never appear inside arrays in content streams.
                array = None;
                match (op, operands.last()) {
                    (b"Tj" | b"'" | b"\"", Some(Operand::Str(value))) => pieces.push(value.clone()),
                    (b"TJ", Some(Operand::Array(items))) => pieces.push(items.concat()),
                    _ => {}
                }
                operands.clear();
            }
            Token::Other => {
                if array.is_none() {
                    operands.push(Operand::Other);
                }
            }
        }
    }
}

/// Minimal content-stream tokenizer.
///
/// Literal strings are returned raw, escapes included; unescaping happens on the
/// joined text.
struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn literal_string(&mut self) -> &'a [u8] {
        let start = self.pos;
        let mut depth = 1usize;

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'(' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        let raw = &self.bytes[start..self.pos];
                        self.pos += 1;
                        return raw;
                    }
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }

        let end = self.bytes.len();
        self.pos = end;
        &self.bytes[start.min(end)..end]
    }

    fn skip_until(&mut self, stop: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && !stop(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\0' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.skip_until(|b| !is_whitespace(b));
            let byte = *self.bytes.get(self.pos)?;

            match byte {
                b'%' => {
                    self.skip_until(|b| b == b'\n' || b == b'\r');
                }
                b'(' => {
                    self.pos += 1;
                    return Some(Token::LiteralString(self.literal_string()));
                }
                b'[' => {
                    self.pos += 1;
                    return Some(Token::ArrayStart);
                }
                b']' => {
                    self.pos += 1;
                    return Some(Token::ArrayEnd);
                }
                b'<' => {
                    if self.bytes.get(self.pos + 1) == Some(&b'<') {
                        self.pos += 2;
                    } else {
                        self.skip_until(|b| b == b'>');
                        self.pos += 1;
                    }
                    return Some(Token::Other);
                }
                b'>' | b')' | b'{' | b'}' => {
                    self.pos += 1;
                    return Some(Token::Other);
                }
                b'/' => {
                    self.pos += 1;
                    self.skip_until(|b| is_whitespace(b) || is_delimiter(b));
                    return Some(Token::Other);
                }
                _ => {
                    let start = self.pos;
                    self.skip_until(|b| is_whitespace(b) || is_delimiter(b));
                    let word = &self.bytes[start..self.pos];
                    let numeric = word
                        .first()
                        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.'));
                    return Some(if numeric { Token::Other } else { Token::Operator(word) });
                }
            }
        }
    }
}

/// Resolve backslash escapes. Unknown escapes keep the escaped character.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

fn clean_text(raw: &str) -> String {
    unescape(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}
