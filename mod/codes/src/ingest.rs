//! Code extraction from uploaded files.
//!
//! Uploads arrive in whatever layout the ISP's spreadsheet happened to
//! use, with no format flag. The extractors tolerate the observed
//! shapes:
//!
//! - one code per line/row
//! - a status marker (`unused`, any case) next to the code, either in an
//!   adjacent column or as a second token in the same cell
//! - a leading header row (`code`, `codes`, `wifi`, `status`, `unused`)
//!
//! Text content goes through [`parse_text`]; workbook files are decoded
//! to a cell grid by the uploading client and go through
//! [`extract_from_rows`]. Both return a deduplicated list (first
//! occurrence wins) with empty strings and bare markers dropped.
//! Undecodable binary content yields zero codes, never an error.

use std::collections::HashSet;

/// The status marker ISP exports put next to fresh codes. Never itself
/// a code value.
const MARKER: &str = "unused";

/// Tokens that mark a header row when they are the only cell content.
const HEADER_TOKENS: [&str; 5] = ["code", "codes", "wifi", "status", "unused"];

fn is_header_token(s: &str) -> bool {
    HEADER_TOKENS.contains(&s)
}

/// Parse an uploaded file body. Delimited text is parsed directly;
/// bytes that do not decode as UTF-8 (workbook binaries and the like)
/// yield an empty result.
pub fn parse_upload(bytes: &[u8], filename: &str) -> Vec<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_text(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => {
            tracing::debug!(filename, "upload body is not UTF-8 text, zero codes extracted");
            Vec::new()
        }
    }
}

/// Extract codes from delimited text, one candidate per line.
pub fn parse_text(content: &str) -> Vec<String> {
    finalize(content.lines().filter_map(extract_line))
}

/// Extract codes from a pre-decoded spreadsheet cell grid.
pub fn extract_from_rows(rows: &[Vec<String>]) -> Vec<String> {
    finalize(rows.iter().filter_map(|row| extract_row(row)))
}

/// One line of delimited text → candidate code.
///
/// Rules, in order: blank and header lines are skipped; comma lines
/// take the second field (falling back to the first when the second is
/// empty or the marker); marker lines take the first non-marker
/// whitespace token; anything else is the code itself.
fn extract_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let lower = line.to_lowercase();
    if lower.starts_with("code") || is_header_token(&lower) {
        return None;
    }

    if line.contains(',') {
        let mut fields = line.splitn(2, ',');
        let first = fields.next().unwrap_or("").trim();
        let second = fields.next().unwrap_or("").trim();
        if !second.is_empty() && !second.eq_ignore_ascii_case(MARKER) {
            return Some(second.to_string());
        }
        if !first.is_empty() && !first.eq_ignore_ascii_case(MARKER) {
            return Some(first.to_string());
        }
        return None;
    }

    if lower.contains(MARKER) {
        return line
            .split_whitespace()
            .find(|t| !t.eq_ignore_ascii_case(MARKER))
            .map(|t| t.to_string());
    }

    Some(line.to_string())
}

/// One spreadsheet row → candidate code.
fn extract_row(row: &[String]) -> Option<String> {
    let cells: Vec<&str> = row
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if cells.is_empty() {
        return None;
    }

    let first_lower = cells[0].to_lowercase();
    if cells.len() == 1 && is_header_token(&first_lower) {
        return None;
    }

    // Marker in column A, code in column B.
    if cells.len() >= 2 && first_lower == MARKER {
        return Some(cells[1].to_string());
    }

    // Marker and code crammed into a single cell.
    if cells.len() == 1 && first_lower.contains(MARKER) {
        return cells[0]
            .split_whitespace()
            .find(|t| !t.eq_ignore_ascii_case(MARKER))
            .map(|t| t.to_string());
    }

    Some(cells[0].to_string())
}

/// Drop empties and bare markers, dedupe keeping first occurrence.
fn finalize(candidates: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let code = candidate.trim();
        if code.is_empty() || code.eq_ignore_ascii_case(MARKER) {
            continue;
        }
        if seen.insert(code.to_string()) {
            out.push(code.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(grid: &[&[&str]]) -> Vec<Vec<String>> {
        grid.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn mixed_layout_lines() {
        let input = "Code\nunused  ABC123\nXYZ999\nabc,unused\nXYZ999\n";
        let out = parse_text(input);
        assert_eq!(out.len(), 3);
        assert!(out.contains(&"ABC123".to_string()));
        assert!(out.contains(&"abc".to_string()));
        assert!(out.contains(&"XYZ999".to_string()));
    }

    #[test]
    fn one_code_per_line() {
        let out = parse_text("AAA\nBBB\nCCC");
        assert_eq!(out, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn header_lines_are_skipped() {
        assert!(parse_text("code\nCODES,speed\nwifi\nstatus\nunused").is_empty());
    }

    #[test]
    fn marker_line_takes_other_token() {
        assert_eq!(parse_text("unused\tSSF09FG"), vec!["SSF09FG"]);
        assert_eq!(parse_text("UNUSED ab12"), vec!["ab12"]);
        // Marker afterward still finds the code.
        assert_eq!(parse_text("ab12 unused"), vec!["ab12"]);
        // Marker alone yields nothing.
        assert!(parse_text("unused").is_empty());
    }

    #[test]
    fn comma_line_takes_second_field() {
        assert_eq!(parse_text("ssf09fg,unused"), vec!["ssf09fg"]);
        assert_eq!(parse_text("unused,ssf09fg"), vec!["ssf09fg"]);
        assert_eq!(parse_text("ignored,CODE42"), vec!["CODE42"]);
        assert_eq!(parse_text("CODE42,"), vec!["CODE42"]);
        assert!(parse_text(",unused").is_empty());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = parse_text("AAA\nBBB\nAAA\naaa");
        // Case-sensitive on the code value itself.
        assert_eq!(out, vec!["AAA", "BBB", "aaa"]);
    }

    #[test]
    fn crlf_and_bom_tolerated() {
        let out = parse_upload("\u{feff}AAA\r\nBBB\r\n".as_bytes(), "codes.csv");
        assert_eq!(out, vec!["AAA", "BBB"]);
    }

    #[test]
    fn binary_upload_yields_nothing() {
        let out = parse_upload(&[0xD0, 0xCF, 0x11, 0xE0, 0xFF, 0xFE], "codes.xls");
        assert!(out.is_empty());
    }

    #[test]
    fn grid_header_and_pairs() {
        let grid = rows(&[
            &["Code"],
            &["unused", "ABC123"],
            &["XYZ999"],
            &["unused  ab12"],
            &["XYZ999"],
        ]);
        let out = extract_from_rows(&grid);
        assert_eq!(out, vec!["ABC123", "XYZ999", "ab12"]);
    }

    #[test]
    fn grid_skips_empty_and_marker_only_rows() {
        let grid = rows(&[&[], &["", "  "], &["unused"], &["CODE1", "extra"]]);
        assert_eq!(extract_from_rows(&grid), vec!["CODE1"]);
    }

    #[test]
    fn grid_header_only_when_single_cell() {
        // A two-cell row starting with "status" is data, not a header.
        let grid = rows(&[&["status", "CODE9"]]);
        assert_eq!(extract_from_rows(&grid), vec!["status"]);
    }
}
