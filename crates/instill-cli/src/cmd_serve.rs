use std::io::{BufRead, Write};
use std::path::Path;

use instill_bridge::Orchestrator;

/// `instill serve` — answer hook requests on stdin until EOF.
pub fn execute(root: &Path) -> anyhow::Result<()> {
    let mut orch = Orchestrator::load(root)?;
    tracing::info!(
        root = %orch.root().display(),
        scoped = orch.instructions().len(),
        repo = orch.repo_instructions().is_some(),
        "serving hook requests"
    );
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(&mut orch, stdin.lock(), stdout.lock())
}

pub fn serve(
    orch: &mut Orchestrator,
    reader: impl BufRead,
    mut writer: impl Write,
) -> anyhow::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if let Some(response) = instill_bridge::handle_line(orch, &line)? {
            writeln!(writer, "{response}")?;
            writer.flush()?;
        }
    }
    tracing::debug!(
        sessions = orch.tracker().session_count(),
        pending = orch.tracker().pending_count(),
        "input closed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use instill_core::InstillConfig;
    use std::fs;

    #[test]
    fn serve_answers_each_request_line() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".github").join("instructions");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("ts.instructions.md"),
            "---\napplyTo: \"**/*.ts\"\n---\nUse strict types.\n",
        )
        .unwrap();
        let mut orch = Orchestrator::load_with(tmp.path(), &InstillConfig::default()).unwrap();

        let input = concat!(
            r#"{"hook":"before_tool","sessionID":"S1","callID":"c1","tool":"read","args":{"filePath":"src/a.ts"}}"#,
            "\n\n",
            r#"{"hook":"after_tool","sessionID":"S1","callID":"c1","tool":"read","output":{"output":"body"}}"#,
            "\n",
            "garbage\n",
        );
        let mut out = Vec::new();
        serve(&mut orch, input.as_bytes(), &mut out).unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["ok"], true);
        assert!(lines[1]["output"]["output"]
            .as_str()
            .unwrap()
            .contains("<copilot-instruction:ts.instructions.md>"));
        assert_eq!(lines[2]["ok"], false);
    }
}
