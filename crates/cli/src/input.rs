use crate::error::CliError;
use model::records::object::StringRecord;

/// Reads one JSON record per line, skipping blank lines.
pub async fn read_records(path: &str) -> Result<Vec<StringRecord>, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    parse_records(&source)
}

fn parse_records(source: &str) -> Result<Vec<StringRecord>, CliError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| CliError::InvalidRecord {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_skips_blanks() {
        let records = parse_records(
            "{\"key\": \"a\", \"value\": \"1\"}\n\n{\"key\": \"b\", \"value\": \"2\"}\n",
        )
        .unwrap();
        assert_eq!(
            records,
            vec![StringRecord::new("a", "1"), StringRecord::new("b", "2")]
        );
    }

    #[test]
    fn reports_the_offending_line() {
        let err = parse_records("{\"key\": \"a\", \"value\": \"1\"}\n{\"key\": 3}").unwrap_err();
        assert!(matches!(err, CliError::InvalidRecord { line: 2, .. }));
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(&path, "{\"key\": \"strkey\", \"value\": \"testval\"}\n").unwrap();

        let records = read_records(path.to_str().unwrap()).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
