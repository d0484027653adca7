use std::path::Path;

use instill_bridge::{render, Orchestrator};

/// `instill list`
pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let orch = Orchestrator::load(root)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list_json(&orch))?);
    } else {
        print!("{}", list_text(&orch));
    }
    Ok(())
}

/// `instill match <path>`
pub fn matching(root: &Path, path: &str) -> anyhow::Result<()> {
    let orch = Orchestrator::load(root)?;
    print!("{}", match_text(&orch, path));
    Ok(())
}

fn list_json(orch: &Orchestrator) -> serde_json::Value {
    let scoped: Vec<serde_json::Value> = orch
        .instructions()
        .iter()
        .map(|r| {
            serde_json::json!({
                "identity": r.identity,
                "applyTo": r.scope_patterns,
                "description": r.description,
                "source": r.source.display().to_string(),
            })
        })
        .collect();
    serde_json::json!({
        "root": orch.root().display().to_string(),
        "repoInstructions": orch.repo_instructions().is_some(),
        "instructions": scoped,
    })
}

fn list_text(orch: &Orchestrator) -> String {
    let mut out = String::new();
    let repo = if orch.repo_instructions().is_some() {
        "present"
    } else {
        "none"
    };
    out.push_str(&format!("repository instructions: {repo}\n"));
    out.push_str(&format!(
        "path-scoped instructions: {}\n",
        orch.instructions().len()
    ));
    for r in orch.instructions() {
        out.push_str(&format!("  {}  [{}]", r.identity, r.scope_patterns.join(", ")));
        if let Some(desc) = &r.description {
            out.push_str(&format!("  {desc}"));
        }
        out.push('\n');
    }
    out
}

fn match_text(orch: &Orchestrator, path: &str) -> String {
    let Some(relative) = orch.relative_path(path) else {
        return format!("{path}: outside project root\n");
    };
    let matched = orch.matching(&relative);
    if matched.is_empty() {
        return format!("{relative}: no matching instructions\n");
    }
    let mut out = format!("{relative}:\n");
    for r in &matched {
        out.push_str(&format!("  {}\n", r.identity));
    }
    out.push('\n');
    out.push_str(&render::instruction_blocks(&matched).unwrap_or_default());
    out.push('\n');
    out
}
