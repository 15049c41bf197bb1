use crate::books::extract_books;
use crate::query_type::normalize;
use crate::types::{QuerySlot, SurveyRecord};

/// Rows with fewer fields than this are discarded.
pub const MIN_FIELDS: usize = 12;

// Positional column layout of the survey export.
const COL_TIMESTAMP: usize = 0;
const COL_NAME: usize = 1;
const COL_ID: usize = 2;
const COL_QUERY1: usize = 3;
const COL_BOOKS1: usize = 4;
const COL_QUERY2: usize = 5;
const COL_BOOKS2: usize = 6;
// Same column as COL_BOOKS2. The survey export has always been read this way.
const COL_QUERY_TYPE2: usize = 6;
const COL_QUERY3: usize = 7;
const COL_BOOKS3: usize = 8;
const COL_QUERY_TYPE1: usize = 9;
const COL_QUERY_TYPE3: usize = 11;

/// Split one delimited line into trimmed fields. Commas separate fields outside quotes; a
/// doubled quote inside a quoted field is a literal quote; any other quote toggles quoting.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Map a line onto a record. Returns `None` when the line is too short to carry the layout.
pub fn parse_record(line: &str) -> Option<SurveyRecord> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        tracing::debug!(fields = fields.len(), expected = MIN_FIELDS, "dropping short survey row");
        return None;
    }
    let f = |i: usize| fields[i].as_str();
    let slot = |query: usize, books: usize, query_type: usize| QuerySlot {
        query: f(query).to_string(),
        ground_truth: extract_books(f(books)),
        query_type: normalize(f(query_type)),
    };

    Some(SurveyRecord {
        timestamp: f(COL_TIMESTAMP).to_string(),
        respondent_name: f(COL_NAME).to_string(),
        respondent_id: f(COL_ID).to_string(),
        slots: [
            slot(COL_QUERY1, COL_BOOKS1, COL_QUERY_TYPE1),
            slot(COL_QUERY2, COL_BOOKS2, COL_QUERY_TYPE2),
            slot(COL_QUERY3, COL_BOOKS3, COL_QUERY_TYPE3),
        ],
    })
}

/// Split a document into rows. A newline inside a quoted field belongs to the field, so
/// multi-line book lists stay in one row. A row only spans lines when its quotes close and
/// the joined text carries a full record; otherwise its first line stands alone and the
/// scan resumes on the next line, so a stray quote cannot swallow the rows after it.
pub fn split_rows(content: &str) -> Vec<&str> {
    let mut offset = 0;
    let lines: Vec<(usize, &str)> = content
        .split('\n')
        .map(|line| {
            let start = offset;
            offset += line.len() + 1;
            (start, line)
        })
        .collect();

    let mut rows = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let (start, line) = lines[i];
        match closing_line(&lines[i..]) {
            Some(span) if span > 0 => {
                let (last_start, last) = lines[i + span];
                let joined = &content[start..last_start + last.len()];
                if split_fields(joined).len() >= MIN_FIELDS {
                    rows.push(joined);
                    i += span + 1;
                    continue;
                }
                tracing::debug!(line = i + 1, "unbalanced quote, row kept to its own line");
            }
            None => tracing::debug!(line = i + 1, "unbalanced quote, row kept to its own line"),
            Some(_) => {}
        }
        rows.push(line);
        i += 1;
    }
    rows
}

/// Offset of the line, relative to the first, on which the quotes opened so far balance.
fn closing_line(lines: &[(usize, &str)]) -> Option<usize> {
    let mut in_quotes = false;
    for (n, (_, line)) in lines.iter().enumerate() {
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
        if !in_quotes {
            return Some(n);
        }
    }
    None
}

/// Parse a whole survey export. The first row is the header; blank rows and short rows
/// are skipped.
pub fn parse_survey(content: &str) -> Vec<SurveyRecord> {
    let rows = split_rows(content);
    if rows.len() < 2 {
        return Vec::new();
    }
    let mut records = Vec::new();
    for (rowno, raw) in rows.iter().enumerate().skip(1) {
        let row = raw.trim();
        if row.is_empty() {
            continue;
        }
        match parse_record(row) {
            Some(rec) => records.push(rec),
            None => tracing::debug!(row = rowno + 1, "survey row discarded"),
        }
    }
    tracing::info!(records = records.len(), "parsed survey");
    records
}
