use crate::core::{
    backend::VcsBackend,
    category::Category,
    classify::{classify, Classification, ComparisonMode, FileClassification},
    colors::format_classification_line,
    error::Result,
    output::{format_key_value, print_section_header},
    resolver::{resolve, ResolveContext},
    sync::sync_state,
};
use colored::*;

pub fn execute_status(ctx: &ResolveContext, mode: ComparisonMode) -> Result<()> {
    let result = resolve(ctx)?;
    let kind = result.kind;
    let (repo, config) = result.into_workspace()?;

    let branch = repo
        .current_branch()?
        .unwrap_or_else(|| "-detached-".to_string());

    println!();
    println!(
        "{}",
        format_key_value("Workspace:", &format!("{} [{kind}]", repo.root().display()), 11)
    );
    println!("{}", format_key_value("Branch:", &branch, 11));
    println!("{}", format_key_value("Comparing:", mode.as_str(), 11));
    let sync = sync_state(&repo, &config)?;
    println!("{}", format_key_value("Commits:", &sync.to_string(), 11));

    let classification = classify(&repo, &config, mode)?;
    print_grouped_sections(&classification);

    println!("\n{}\n", classification.summary().to_string().bright_black());
    Ok(())
}

/// Print the classification grouped the way `status` shows it
pub fn print_grouped_sections(classification: &Classification) {
    let changed_tracked: Vec<&FileClassification> = classification
        .iter()
        .filter(|e| e.has(Category::Tracked) && e.changes().next().is_some())
        .collect();
    let undecided = with_decision(classification, Category::Undecided);
    let untracked = with_decision(classification, Category::Untracked);
    let nested: Vec<&FileClassification> =
        classification.iter().filter(|e| e.nested_repo).collect();

    print_section("Changes to tracked files", &changed_tracked);
    print_section("Undecided files", &undecided);
    print_section("Untracked files", &untracked);
    print_section("Nested repositories", &nested);
}

fn with_decision(classification: &Classification, category: Category) -> Vec<&FileClassification> {
    classification
        .iter()
        .filter(|e| e.decision() == Some(category))
        .collect()
}

fn print_section(title: &str, entries: &[&FileClassification]) {
    if entries.is_empty() {
        return;
    }
    print_section_header(title);
    for entry in entries {
        println!("{}", format_classification_line(entry));
    }
}
