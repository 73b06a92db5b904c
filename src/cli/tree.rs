use crate::models::{AppState, Category, EntityId, Link};
use crate::search::{LinkFilter, filter_links, links_for_bundle};
use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a link title may render before it is cut
const MAX_TITLE_WIDTH: usize = 40;

pub fn margin() -> colored::ColoredString {
    "┃".bright_magenta()
}

/// Cut `text` to at most `max` terminal columns, marking the cut with '…'
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width + 1 > max {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out.push('…');
    out
}

fn connector(is_last: bool) -> &'static str {
    if is_last { "└── " } else { "├── " }
}

fn print_link_line(link: &Link, is_last: bool) {
    let star = if link.is_highlighted {
        "★ ".yellow()
    } else {
        "".normal()
    };
    let platform = link
        .social_media_type
        .map(|p| format!(" [{}]", p.display_name()))
        .unwrap_or_default();

    println!(
        "{}  {}{}{}{} {} {}",
        margin(),
        connector(is_last),
        star,
        truncate_to_width(&link.title, MAX_TITLE_WIDTH).bright_white(),
        platform.bright_cyan(),
        link.url.bright_black().italic(),
        format!("[{}]", link.id.short()).bright_black()
    );
}

/// Displays categories with their links in a tree-like structure
pub fn display_tree(state: &AppState, filter: &LinkFilter) {
    if state.categories.is_empty() && state.links.is_empty() {
        println!("{}  No categories or links found.", margin());
        return;
    }

    let links = filter_links(state, filter);
    let mut shown = 0;

    for category in &state.categories {
        if filter
            .category_id
            .as_ref()
            .is_some_and(|id| id != &category.id)
        {
            continue;
        }

        let in_category: Vec<&Link> = links
            .iter()
            .copied()
            .filter(|link| link.category_id == category.id)
            .collect();
        if in_category.is_empty() && (filter.highlighted_only || !filter.query.is_empty()) {
            continue;
        }

        println!(
            "{}  {} {} {}",
            margin(),
            "■".color(hex_to_color(&category.color)),
            category.name.bold(),
            format!("({})", in_category.len()).bright_black()
        );
        for (i, link) in in_category.iter().enumerate() {
            print_link_line(link, i == in_category.len() - 1);
        }
        shown += in_category.len();
    }

    // Links whose category no longer exists
    let orphans: Vec<&Link> = links
        .iter()
        .copied()
        .filter(|link| state.category(&link.category_id).is_none())
        .collect();
    if !orphans.is_empty() && filter.category_id.is_none() {
        println!("{}  {}", margin(), "Uncategorized".bold().bright_black());
        for (i, link) in orphans.iter().enumerate() {
            print_link_line(link, i == orphans.len() - 1);
        }
        shown += orphans.len();
    }

    if shown == 0 && !state.links.is_empty() {
        println!("{}  No links match the current filters.", margin());
    }
}

/// Displays bundles with the links they reference
pub fn display_bundles(state: &AppState) {
    if state.bundles.is_empty() {
        println!("{}  No bundles found.", margin());
        return;
    }

    for bundle in &state.bundles {
        let links = links_for_bundle(state, bundle);
        println!(
            "{}  {} {} {}",
            margin(),
            "󰏗".bright_blue(),
            bundle.name.bold(),
            format!("[{}]", bundle.id.short()).bright_black()
        );
        if !bundle.description.is_empty() {
            println!("{}  {}", margin(), bundle.description.italic());
        }
        if links.is_empty() {
            println!("{}  {}", margin(), "└── (empty)".bright_black());
        }
        for (i, link) in links.iter().enumerate() {
            print_link_line(link, i == links.len() - 1);
        }
    }
}

/// Find category ID by name (case insensitive, exact match first, then partial)
pub fn find_category_by_name(state: &AppState, name: &str) -> Option<EntityId> {
    if let Some(category) = state.category_by_name(name) {
        return Some(category.id.clone());
    }

    let name = name.trim().to_lowercase();
    let mut partial = state
        .categories
        .iter()
        .filter(|category| category.name.to_lowercase().contains(&name));
    match (partial.next(), partial.next()) {
        (Some(category), None) => Some(category.id.clone()),
        _ => None,
    }
}

pub fn list_all_categories(state: &AppState) {
    for (idx, category) in state.categories.iter().enumerate() {
        let count = state
            .links
            .iter()
            .filter(|link| link.category_id == category.id)
            .count();

        println!(
            "{}  {}. {} {} {}{}",
            margin(),
            (idx + 1).to_string().bright_yellow(),
            "■".color(hex_to_color(&category.color)),
            category.name.bright_white().bold(),
            format!("{} links", count).bright_black(),
            format!(" [{}]", category.id).bright_black().italic()
        );
    }
}

/// Parse a `#RRGGBB` color; anything else renders white
fn hex_to_color(hex: &str) -> colored::Color {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() == 6 {
        if let Ok(value) = u32::from_str_radix(hex, 16) {
            return colored::Color::TrueColor {
                r: (value >> 16) as u8,
                g: (value >> 8) as u8,
                b: value as u8,
            };
        }
    }
    colored::Color::White
}

/// Human readable line for a category, used in confirmations
pub fn describe_category(category: &Category) -> String {
    match &category.icon {
        Some(icon) => format!("{} ({}, {})", category.name, category.color, icon),
        None => format!("{} ({})", category.name, category.color),
    }
}
