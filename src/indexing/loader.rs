//! Tab-separated record reader
//!
//! One entity per line, a header line that is skipped:
//!
//! ```text
//! name \t score \t synonyms \t info1 \t info2 ...
//! ```
//!
//! Only the line terminator is stripped; trailing empty fields survive.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::entity::{BuildError, Record};

/// Field separator
pub const FIELD_SEPARATOR: char = '\t';

/// Split one line into a record.
pub fn parse_line(line_number: usize, line: &str) -> Record {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    Record::new(
        line_number,
        line.split(FIELD_SEPARATOR).map(String::from).collect(),
    )
}

/// Read all records after the header line.
///
/// I/O errors abort reading; field validation happens during the build.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>, BuildError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            continue;
        }
        records.push(parse_line(idx + 1, &line));
    }
    Ok(records)
}

/// Read all records of a file.
pub fn read_records_from_file(path: impl AsRef<Path>) -> Result<Vec<Record>, BuildError> {
    let file = File::open(path.as_ref())?;
    read_records(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TSV: &str = "name\tscore\tsynonyms\tinfos\n\
                       frei\t3\t\tfirst entity\tused for doctests\n\
                       brei\t2\t\tsecond entity\talso for doctests\n";

    #[test]
    fn test_header_is_skipped() {
        let records = read_records(Cursor::new(TSV)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(
            records[0].fields,
            vec!["frei", "3", "", "first entity", "used for doctests"]
        );
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_crlf_and_trailing_tabs() {
        let record = parse_line(2, "frei\t3\t\r\n");
        assert_eq!(record.fields, vec!["frei", "3", ""]);
    }

    #[test]
    fn test_header_only() {
        let records = read_records(Cursor::new("name\tscore\n")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = read_records_from_file("/definitely/not/here.tsv").unwrap_err();
        assert!(matches!(err, BuildError::Io(_)));
    }
}
