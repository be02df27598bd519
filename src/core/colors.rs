//! Color mapping for classification output.
//!
//! Every category has exactly one color so list entries, legends and
//! summaries agree.
//!
//! # Color Scheme
//! - **Added**: green
//! - **Modified**: yellow
//! - **Removed**: red
//! - **Renamed**: blue
//! - **Tracked**: white
//! - **Untracked**: magenta
//! - **Undecided**: cyan
//! - **Ignored**: bright black

use crate::core::category::Category;
use crate::core::classify::FileClassification;
use colored::*;

/// Returns a closure that colors any text the way `category` is colored
pub fn get_category_color_style(category: Category) -> Box<dyn Fn(&str) -> ColoredString> {
    match category {
        Category::Added => Box::new(|text: &str| text.green()),
        Category::Modified => Box::new(|text: &str| text.yellow()),
        Category::Removed => Box::new(|text: &str| text.red()),
        Category::Renamed => Box::new(|text: &str| text.blue()),
        Category::Tracked => Box::new(|text: &str| text.white()),
        Category::Untracked => Box::new(|text: &str| text.magenta()),
        Category::Undecided => Box::new(|text: &str| text.cyan()),
        Category::Ignored => Box::new(|text: &str| text.bright_black()),
    }
}

/// Colored symbol padded to two columns
pub fn get_aligned_symbol(category: Category) -> ColoredString {
    let color_fn = get_category_color_style(category);
    let symbol = category.as_str();
    match symbol.len() {
        2 => color_fn(symbol),
        _ => color_fn(&format!("{symbol} ")),
    }
}

pub fn get_colored_path(category: Category, path: &str) -> ColoredString {
    get_category_color_style(category)(path)
}

/// One list line: change symbols (or padding), then the colored path.
/// The path takes the color of its first change, falling back to its decision.
pub fn format_classification_line(entry: &FileClassification) -> String {
    let changes: Vec<Category> = entry.changes().collect();
    let symbols = if changes.is_empty() {
        "  ".to_string()
    } else {
        changes
            .iter()
            .map(|c| get_aligned_symbol(*c).to_string())
            .collect::<Vec<_>>()
            .join("")
    };

    let color = changes
        .first()
        .copied()
        .or_else(|| entry.decision())
        .unwrap_or(Category::Undecided);

    format!("  {symbols} {}", get_colored_path(color, &entry.to_string()))
}
