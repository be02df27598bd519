use crate::core::{
    error::Result,
    merge_preview::preview,
    output::{print_info, print_success},
    resolver::{resolve, ResolveContext},
};
use colored::*;

pub fn execute_preview(ctx: &ResolveContext, source: &str, head: &str, verbose: bool) -> Result<()> {
    let (repo, _config) = resolve(ctx)?.into_workspace()?;
    let result = preview(&repo, head, source)?;

    if result.is_noop() {
        print_info(&format!("Nothing to merge from {source} into {head}."));
        return Ok(());
    }

    println!("\n{}", format!("Merging {source} into {head}:").white().bold());
    if verbose {
        println!("{}", result.detailed());
    } else {
        println!("{}", result.summary());
    }

    if result.has_conflicts() {
        println!(
            "\n{}\n",
            format!("{} file(s) would conflict.", result.conflicting_files.len()).red()
        );
    } else {
        print_success("Merge would apply cleanly.");
        println!();
    }
    Ok(())
}
