//! Terminal output helpers shared by the commands.
//!
//! Errors are red with a `✕ Error:` prefix, successes get a green check,
//! hints and secondary values are muted. Only the commands print; the engine
//! modules return values and log.

use colored::*;

/// Prints `✕ Error: <message>` surrounded by blank lines
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Error followed by usage lines and options
///
/// ```text
///
/// ✕ Error: <message>.
/// Usage:
///   <usage_pattern>
///
/// Options:
///   <flag>  <description>
///
/// ```
pub fn print_error_with_structured_usage(
    message: &str,
    usage_patterns: &[&str],
    options: &[(&str, &str)],
) {
    println!("\n{} {}.\n", "✕ Error:".red(), message.white());
    println!("{}", "Usage:".blue());

    for pattern in usage_patterns {
        println!("  {}", pattern.white());
    }

    if !options.is_empty() {
        println!("\n{}", "Options:".blue());
        for (flag, description) in options {
            println!("  {}  {}", flag.bright_black(), description.bright_black());
        }
    }

    println!();
}

pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Muted one-liner, used for recovery hints
pub fn print_hint(message: &str) {
    println!("{}", message.bright_black());
}

pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// `label: value` with the label muted and padded to `width`
pub fn format_key_value(label: &str, value: &str, width: usize) -> String {
    format!(
        "{} {}",
        format!("{label:<width$}").bright_black(),
        value.white()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_helpers_do_not_panic() {
        print_error("Test error message");
        print_success("Operation completed");
        print_info("Information message");
        print_hint("Run 'vgl create <path>' to make one.");
        print_section_header("Undecided");
    }

    #[test]
    fn test_format_key_value_pads_label() {
        let line = format_key_value("Root:", "/repo", 8);
        assert!(line.contains("Root:   "));
        assert!(line.contains("/repo"));
    }
}
