//! The list command

use colored::Colorize;
use optdeps_core::{ManifestDocument, OptionalPackage, is_valid_spec};
use serde::Serialize;
use serde_json::Value;

use crate::context::ProjectContext;
use crate::error::Result;

/// One declaration as reported by `list --json`.
#[derive(Debug, Serialize)]
struct ListedDeclaration {
    index: usize,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<OptionalPackage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn describe(index: usize, declaration: &Value) -> ListedDeclaration {
    let checked = if is_valid_spec(declaration) {
        OptionalPackage::from_declaration(declaration).map_err(|e| e.to_string())
    } else {
        Err("'name' and 'constraint' must be non-empty strings".to_string())
    };

    match checked {
        Ok(package) => ListedDeclaration {
            index,
            valid: true,
            package: Some(package),
            reason: None,
        },
        Err(reason) => ListedDeclaration {
            index,
            valid: false,
            package: None,
            reason: Some(reason),
        },
    }
}

/// Run the list command
pub fn run_list(ctx: &ProjectContext, json: bool) -> Result<()> {
    let document = ManifestDocument::load(ctx.manifest_path())?;
    let listed: Vec<ListedDeclaration> = document
        .view()
        .declarations(&ctx.settings.tool_key)
        .iter()
        .enumerate()
        .map(|(index, declaration)| describe(index, declaration))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        println!(
            "{} No optional packages declared under extra.{}",
            "Note:".dimmed(),
            ctx.settings.tool_key
        );
        return Ok(());
    }

    println!("{}", "Optional packages".bold());
    println!();
    for entry in &listed {
        match (&entry.package, &entry.reason) {
            (Some(package), _) => {
                let mut flags = Vec::new();
                if package.is_dev() {
                    flags.push("dev");
                }
                if package.is_module() {
                    flags.push("module");
                }
                println!(
                    "  {:<40} {:<12} {}",
                    package.name().green(),
                    package.constraint(),
                    flags.join(", ").dimmed()
                );
            }
            (None, reason) => {
                println!(
                    "  {} #{}: {}",
                    "invalid".red(),
                    entry.index,
                    reason.as_deref().unwrap_or_default()
                );
            }
        }
    }

    let valid = listed.iter().filter(|e| e.valid).count();
    println!();
    println!(
        "{} {} of {} declarations valid.",
        "Total:".dimmed(),
        valid,
        listed.len()
    );
    Ok(())
}
