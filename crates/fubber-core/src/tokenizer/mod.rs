//! Symmetric code tokenization.
//!
//! The same transformation runs over indexed source text and over query
//! leaves, so the stored index and the search query share one vocabulary.
//! Word runs are split at whitespace, underscores and camelCase
//! transitions; everything else is hex-escaped as `T<hex>K` so punctuation
//! survives an FTS backend that would otherwise strip it. `T2d3eK` is `->`.
//!
//! Detokenization reverses the escapes and the camel split for snippet
//! display. The reversal is best-effort: distinct sources can share one
//! token string (that is what makes the vocabulary canonical).

use std::sync::LazyLock;

use regex::Regex;

static HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T([0-9a-f]+)K$").unwrap());

static CAMEL_GLUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]) ([A-Z][a-z])").unwrap());

/// Tokenize source text or a query leaf into the canonical token string.
///
/// Splits on whitespace runs, word boundaries, lowercase→uppercase camel
/// transitions and either side of `_`; every run of non-word characters
/// becomes a single `T<hex>K` token over its UTF-8 bytes. Double quotes
/// are normalized to single quotes before escaping so the two string
/// styles collapse into one token.
pub fn tokenize(text: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut punct: Vec<u8> = Vec::new();
    let mut prev_lower = false;

    let flush_word = |word: &mut String, parts: &mut Vec<String>| {
        if !word.is_empty() {
            parts.push(std::mem::take(word));
        }
    };
    let flush_punct = |punct: &mut Vec<u8>, parts: &mut Vec<String>| {
        if !punct.is_empty() {
            parts.push(hex_escape(punct));
            punct.clear();
        }
    };

    for ch in text.chars() {
        let ch = if ch == '"' { '\'' } else { ch };

        if ch.is_ascii_alphanumeric() {
            flush_punct(&mut punct, &mut parts);
            if prev_lower && ch.is_ascii_uppercase() {
                flush_word(&mut word, &mut parts);
            }
            word.push(ch);
            prev_lower = ch.is_ascii_lowercase();
        } else if ch == '_' || ch.is_whitespace() {
            // Separators: split here, emit nothing.
            flush_word(&mut word, &mut parts);
            flush_punct(&mut punct, &mut parts);
            prev_lower = false;
        } else {
            flush_word(&mut word, &mut parts);
            let mut buf = [0u8; 4];
            punct.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            prev_lower = false;
        }
    }
    flush_word(&mut word, &mut parts);
    flush_punct(&mut punct, &mut parts);

    parts.join(" ")
}

/// Reverse tokenization for display.
pub fn detokenize(tokens: &str) -> String {
    detokenize_with_markers(tokens, "", "")
}

/// Reverse tokenization, preserving highlight markers the FTS backend
/// wrapped around matched tokens. Adjacent `<end> <start>` marker pairs
/// are elided so a run of matched tokens highlights as one span.
pub fn detokenize_with_markers(tokens: &str, start: &str, end: &str) -> String {
    struct Piece {
        text: String,
        is_word: bool,
        lead: bool,
        trail: bool,
    }

    let mut pieces: Vec<Piece> = Vec::new();
    for raw in tokens.split_whitespace() {
        let mut core = raw;
        let mut lead = false;
        let mut trail = false;
        if !start.is_empty() {
            if let Some(rest) = core.strip_prefix(start) {
                core = rest;
                lead = true;
            }
        }
        if !end.is_empty() {
            if let Some(rest) = core.strip_suffix(end) {
                core = rest;
                trail = true;
            }
        }
        let (text, is_word) = decode_token(core);
        pieces.push(Piece {
            text,
            is_word,
            lead,
            trail,
        });
    }

    // Elide marker pairs that would close and immediately reopen.
    for i in 1..pieces.len() {
        if pieces[i - 1].trail && pieces[i].lead {
            pieces[i - 1].trail = false;
            pieces[i].lead = false;
        }
    }

    // Join: whitespace survives only between two word tokens; decoded
    // punctuation glues to its neighbors.
    let mut out = String::new();
    let mut prev_word = false;
    for piece in &pieces {
        if prev_word && piece.is_word {
            out.push(' ');
        }
        if piece.lead {
            out.push_str(start);
        }
        out.push_str(&piece.text);
        if piece.trail {
            out.push_str(end);
        }
        prev_word = piece.is_word;
    }

    // Undo the camel split: glue `x Yz` back to `xYz`, repeatedly until
    // stable so longer runs close up.
    loop {
        let glued = CAMEL_GLUE.replace_all(&out, "$1$2");
        if glued == out {
            break;
        }
        out = glued.into_owned();
    }
    out
}

/// Decode a single token: a `T<hex>K` escape back to its bytes, or the
/// word run unchanged. Returns (text, is_word).
fn decode_token(core: &str) -> (String, bool) {
    if let Some(caps) = HEX_ESCAPE.captures(core) {
        let hex = &caps[1];
        if hex.len() % 2 == 0 {
            let bytes: Vec<u8> = (0..hex.len())
                .step_by(2)
                .filter_map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                .collect();
            return (String::from_utf8_lossy(&bytes).into_owned(), false);
        }
    }
    (core.to_string(), true)
}

fn hex_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push('T');
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out.push('K');
    out
}
