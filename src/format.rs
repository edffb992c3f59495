// Presentation helpers: pure functions turning transactions and their parts
// into terminal strings. Colour comes from crossterm's `Stylize`.

use chrono::NaiveDate;
use crossterm::style::Stylize;

use crate::models::{Category, Tag, Transaction};

const UNCATEGORIZED: &str = "Uncategorized";
const NOTES_PREVIEW_CHARS: usize = 50;
const PREVIOUS_CATEGORY_HINTS: usize = 2;

/// Format a float as US currency with thousands separators: $1,234.56
pub fn currency(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if val < 0.0 && cents != "0.00" {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Currency coloured by sign: green for income, magenta otherwise.
pub fn amount(val: f64) -> String {
    let text = currency(val);
    if val > 0.0 {
        text.green().to_string()
    } else {
        text.magenta().to_string()
    }
}

pub fn date_plain(date: NaiveDate) -> String {
    date.format("%a %b %-d %Y").to_string()
}

pub fn date(date: NaiveDate) -> String {
    date_plain(date).cyan().bold().to_string()
}

/// `icon  name` without styling; used to count previous categories.
pub fn category_plain(category: &Category) -> String {
    format!("{}  {}", category.icon, category.name)
}

/// `icon  name`, with "Uncategorized" made hard to miss.
pub fn category(category: &Category) -> String {
    let name = category.name.as_str();
    let styled = if name == UNCATEGORIZED {
        name.yellow().bold().underlined().to_string()
    } else {
        name.yellow().to_string()
    };
    format!("{}  {}", category.icon, styled)
}

pub fn tags_plain(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "none".to_string();
    }
    tags.iter()
        .map(|t| format!("\u{1F3F7}\u{FE0F} {}", t.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn tags(tags: &[Tag]) -> String {
    if tags.is_empty() {
        tags_plain(tags).grey().to_string()
    } else {
        tags_plain(tags).yellow().to_string()
    }
}

/// Notes on one line, cut to the first 50 characters.
pub fn notes_preview(notes: &str) -> String {
    notes
        .split('\n')
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(NOTES_PREVIEW_CHARS)
        .collect()
}

/// Count how often each label occurs, keep the ones seen more than once,
/// most frequent first (ties keep first-seen order), top two only.
pub fn previous_categories<I>(labels: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.retain(|(_, n)| *n > 1);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(PREVIOUS_CATEGORY_HINTS);
    counts
}

/// The hint shown next to the category, e.g. `A x3, C x2`.
pub fn previous_categories_line<I>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let hints = previous_categories(labels);
    if hints.is_empty() {
        return None;
    }
    Some(
        hints
            .iter()
            .map(|(label, n)| format!("{label} x{n}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Transactions per merchant name, most common first.
pub fn merchant_counts(transactions: &[Transaction]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for txn in transactions {
        match counts.iter_mut().find(|(name, _)| *name == txn.merchant.name) {
            Some((_, n)) => *n += 1,
            None => counts.push((txn.merchant.name.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// One-line summary used by search listings and bulk selection.
pub fn search_result(txn: &Transaction) -> String {
    format!(
        "{}  {}  {} {} {} {}",
        date(txn.date),
        amount(txn.amount),
        txn.merchant.name.as_str().yellow(),
        category(&txn.category),
        tags(&txn.tags),
        notes_preview(txn.notes()).grey()
    )
}

/// Full card for the transaction under review. `position` is zero-based.
pub fn transaction_card(
    txn: &Transaction,
    position: usize,
    total: usize,
    previous: Option<&str>,
) -> Vec<String> {
    let mut headline = format!(
        "{}  {}  {} ",
        date(txn.date),
        amount(txn.amount),
        txn.merchant.name.as_str().yellow()
    );
    if txn.hide_from_reports {
        headline.push_str(&format!("{} ", "Hidden".red()));
    }
    if !txn.notes().is_empty() {
        let notes = txn
            .notes()
            .split('\n')
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        headline.push_str(&notes.grey().to_string());
    }

    let hint = previous
        .map(|line| format!(" {}", format!("(prev. txns.: {line})").grey()))
        .unwrap_or_default();
    let original_date = txn
        .original_date
        .map(|d| d.to_string())
        .unwrap_or_default();

    vec![
        format!("========== {} of {} ==========", position + 1, total),
        headline,
        format!("   {}: {}{}", "Category".bold(), category(&txn.category), hint),
        format!("   {}: {}", "Tags".bold(), tags(&txn.tags)),
        format!("   {}", txn.account.display_name.as_str().grey()),
        format!(
            "   {}\t{}",
            original_date.as_str().grey(),
            txn.plaid_name.as_str().grey()
        ),
    ]
}
