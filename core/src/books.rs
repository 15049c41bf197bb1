use crate::types::{Book, UNKNOWN_AUTHOR, UNKNOWN_PUBLISHER, UNKNOWN_TITLE, UNKNOWN_YEAR};
use lazy_static::lazy_static;
use regex::Regex;

/// A title/author pattern and the capture groups holding each field.
struct Strategy {
    name: &'static str,
    re: Regex,
    title: usize,
    author: Option<usize>,
}

lazy_static! {
    // Tested against the text after each newline; the marker stays with the following
    // chunk and adjacent boundaries never consume each other.
    static ref BOUNDARY: Regex = Regex::new(r"^(?:\d\.|제목:|Title:|책\s|Buch)").expect("valid regex");
    static ref ORDINAL: Regex = Regex::new(r"^\d+\.\s*").expect("valid regex");
    static ref STRATEGIES: Vec<Strategy> = vec![
        Strategy {
            name: "angle",
            re: Regex::new(r"^<([^>]+?)>\s*/\s*([^/]+?)\s*/").expect("valid regex"),
            title: 1,
            author: Some(2),
        },
        Strategy {
            name: "guillemet",
            re: Regex::new(r"^《([^》]+?)》\s*/\s*([^/]+?)\s*/").expect("valid regex"),
            title: 1,
            author: Some(2),
        },
        Strategy {
            name: "labelled",
            re: Regex::new(r"^(?:제목:|Title:)?\s*([^\n]+?)\s*(?:저자:|Author:)").expect("valid regex"),
            title: 1,
            author: None,
        },
    ];
    static ref SLASH_SPLIT: Regex = Regex::new(r"\s*/\s+").expect("valid regex");
    static ref OPEN_MARK: Regex = Regex::new(r#"^(?:<|《|")"#).expect("valid regex");
    static ref CLOSE_MARK: Regex = Regex::new(r#"(?:>|》|")\s*$"#).expect("valid regex");
    static ref PUBLISHER_YEAR: Regex = Regex::new(r"/([^/]+?)\s*/\s*[$c]?(\d{4})").expect("valid regex");
}

/// Split a free-text cell into citations and parse each one. Order is preserved and taken
/// as the ground-truth rank.
pub fn extract_books(cell: &str) -> Vec<Book> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    split_citations(cell)
        .into_iter()
        .filter_map(|chunk| parse_citation(chunk.trim()))
        .collect()
}

fn split_citations(cell: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (nl, _) in cell.match_indices('\n') {
        if BOUNDARY.is_match(&cell[nl + 1..]) {
            chunks.push(&cell[start..nl]);
            start = nl + 1;
        }
    }
    chunks.push(&cell[start..]);
    chunks
}

/// Parse a single citation. Returns `None` only when neither a title nor an author could
/// be recovered.
pub fn parse_citation(text: &str) -> Option<Book> {
    if text.is_empty() {
        return None;
    }
    let cleaned = ORDINAL.replace(text, "");
    let cleaned = cleaned.trim();

    let (title, author) = match_title_author(cleaned).unwrap_or_else(|| split_fallback(cleaned));
    let (publisher, year) = match PUBLISHER_YEAR.captures(cleaned) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    };

    if title.is_empty() && author.is_empty() {
        return None;
    }

    Some(Book {
        title: or_placeholder(title, UNKNOWN_TITLE),
        author: or_placeholder(author, UNKNOWN_AUTHOR),
        publisher: or_placeholder(publisher, UNKNOWN_PUBLISHER),
        year: or_placeholder(year, UNKNOWN_YEAR),
    })
}

fn match_title_author(text: &str) -> Option<(String, String)> {
    STRATEGIES.iter().find_map(|s| {
        let caps = s.re.captures(text)?;
        tracing::trace!(strategy = s.name, "citation matched");
        let title = caps.get(s.title).map(|m| m.as_str().to_string()).unwrap_or_default();
        let author = s
            .author
            .and_then(|g| caps.get(g))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        Some((title, author))
    })
}

fn split_fallback(text: &str) -> (String, String) {
    let mut parts = SLASH_SPLIT.split(text);
    let title = parts
        .next()
        .map(|first| {
            let t = OPEN_MARK.replace(first, "");
            CLOSE_MARK.replace(&t, "").trim().to_string()
        })
        .unwrap_or_default();
    let author = parts.next().map(|s| s.trim().to_string()).unwrap_or_default();
    (title, author)
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.is_empty() { placeholder.to_string() } else { value }
}
