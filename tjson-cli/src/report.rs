//! Rendering of engine comparisons

use crate::samples::{Attempt, Comparison};
use std::io::{self, Write};

/// Markdown `<details>` block per comparison
pub fn write_markdown<W: Write>(out: &mut W, comparisons: &[Comparison]) -> io::Result<()> {
    for comparison in comparisons {
        writeln!(out, "<details>\n")?;
        writeln!(out, "<summary>{}</summary>\n", comparison.type_name)?;
        quoted_block(out, "JSON Literal", "json", &comparison.json)?;
        quoted_block(out, "Rust Value", "", &comparison.value)?;
        attempt_block(out, "Standard Engine Decode Result", "", &comparison.standard.decoded)?;
        attempt_block(out, "Standard Engine Encode Result", "json", &comparison.standard.encoded)?;
        attempt_block(out, "Extended Engine Decode Result", "", &comparison.extended.decoded)?;
        attempt_block(out, "Extended Engine Encode Result", "json", &comparison.extended.encoded)?;
        writeln!(out, "</details>\n")?;
    }
    Ok(())
}

/// One JSON object per line
pub fn write_json_lines<W: Write>(out: &mut W, comparisons: &[Comparison]) -> io::Result<()> {
    for comparison in comparisons {
        serde_json::to_writer(&mut *out, comparison)?;
        writeln!(out)?;
    }
    Ok(())
}

fn attempt_block<W: Write>(out: &mut W, title: &str, lang: &str, attempt: &Attempt) -> io::Result<()> {
    // Error messages are prose, not JSON
    let lang = if attempt.is_ok() { lang } else { "" };
    quoted_block(out, title, lang, attempt.text())
}

fn quoted_block<W: Write>(out: &mut W, title: &str, lang: &str, body: &str) -> io::Result<()> {
    writeln!(out, "> {}:", title)?;
    writeln!(out, "> ```{}", lang)?;
    writeln!(out, "> {}", body)?;
    writeln!(out, "> ```")?;
    writeln!(out, "> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::Outcome;

    fn comparison() -> Comparison {
        Comparison {
            type_name: "Count".to_string(),
            json: "10".to_string(),
            value: "Count(10)".to_string(),
            standard: Outcome {
                decoded: Attempt::Error("Expected an object but was 10, a NUMBER, at path $".into()),
                encoded: Attempt::Ok(r#"{"value":10}"#.into()),
            },
            extended: Outcome {
                decoded: Attempt::Ok("Count(10)".into()),
                encoded: Attempt::Ok("10".into()),
            },
        }
    }

    #[test]
    fn test_markdown_block() {
        let mut out = Vec::new();
        write_markdown(&mut out, &[comparison()]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<details>\n\n<summary>Count</summary>\n"));
        assert!(text.contains("> JSON Literal:\n> ```json\n> 10\n> ```\n"));
        assert!(text.contains("> Standard Engine Decode Result:\n> ```\n> Expected an object"));
        assert!(text.contains("> Extended Engine Encode Result:\n> ```json\n> 10\n"));
        assert!(text.trim_end().ends_with("</details>"));
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        write_json_lines(&mut out, &[comparison(), comparison()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["type_name"], "Count");
        assert_eq!(parsed["standard"]["decoded"]["status"], "error");
        assert_eq!(parsed["extended"]["encoded"]["output"], "10");
    }
}
