use crate::core::{
    error::{Result, VglError},
    output::{format_key_value, print_hint, print_success},
    resolver::{resolve, ResolutionResult, ResolveContext},
    state::UserState,
};

/// Show how the current directory resolves; optionally remember or forget the
/// result in the user-level state file.
pub fn execute_resolve(ctx: &ResolveContext, remember: bool, forget: bool) -> Result<()> {
    if forget {
        forget_state(ctx)?;
    }

    let result = resolve(ctx)?;
    print_resolution(&result);

    if !result.is_usable() {
        return Err(VglError::unresolvable(
            result.message.clone().unwrap_or_else(|| result.kind.to_string()),
        ));
    }

    if remember {
        remember_state(ctx, result)?;
    }
    Ok(())
}

pub fn print_resolution(result: &ResolutionResult) {
    println!();
    println!("{}", format_key_value("Resolution:", result.kind.as_str(), 12));
    if let Some(root) = &result.repo_root {
        println!("{}", format_key_value("Root:", &root.display().to_string(), 12));
    }
    for (key, value) in &result.metadata {
        println!("{}", format_key_value(&format!("{key}:"), value, 12));
    }
    if let Some(message) = &result.message {
        println!("\n{message}");
    }
    if let Some(issue) = &result.issue {
        print_hint(issue.hint());
    }
}

fn remember_state(ctx: &ResolveContext, result: ResolutionResult) -> Result<()> {
    let state_file = match &ctx.state_file {
        Some(path) => path.clone(),
        None => {
            log::warn!("No user state location available, not remembering");
            return Ok(());
        }
    };

    let root = result.repo_root.clone();
    let (_, config) = result.into_workspace()?;
    if let Some(root) = root {
        UserState::from_config(&root, &config).write(&state_file)?;
        print_success(&format!("Remembered {} as the current repository.", root.display()));
    }
    Ok(())
}

fn forget_state(ctx: &ResolveContext) -> Result<()> {
    if let Some(path) = &ctx.state_file {
        if path.is_file() {
            std::fs::remove_file(path)?;
            log::debug!("Removed user state {}", path.display());
        }
    }
    Ok(())
}
