//! Markdown product tables

use super::{ProductCollection, ProductRecord};
use std::fmt::Write;

/// Column header of every product table
pub const TABLE_HEADER: &str = "| Product Name | Brand | Rating | Price | Link |";

const TABLE_SEPARATOR: &str = "|---|---|---|---|---|";

fn escape_cell(value: &str) -> String {
    value
        .trim()
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace(['\n', '\r'], " ")
}

fn link_cell(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        String::new()
    } else {
        format!("[Buy]({})", escape_cell(url))
    }
}

/// Render one `###` section per category, each holding a product table
pub fn render_product_tables(collection: &ProductCollection) -> String {
    let mut out = String::new();
    for (category, records) in collection.by_category() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "### {category}\n");
        let _ = writeln!(out, "{TABLE_HEADER}");
        let _ = writeln!(out, "{TABLE_SEPARATOR}");
        for record in records {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                escape_cell(&record.product_name),
                escape_cell(&record.brand),
                record.rating,
                escape_cell(&record.price),
                link_cell(&record.purchase_link),
            );
        }
    }
    out
}

/// Split a table row into unescaped cells
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.trim().chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    // Leading and trailing pipes leave empty edge cells
    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn unwrap_link(cell: &str) -> String {
    match (cell.starts_with('['), cell.find("]("), cell.ends_with(')')) {
        (true, Some(split), true) => cell[split + 2..cell.len() - 1].to_string(),
        _ => cell.to_string(),
    }
}

fn is_separator(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':')))
}

/// Read records back out of rendered tables
///
/// Only the displayed columns survive: vendor and description come back
/// empty. Rows that do not have five cells or a numeric rating are skipped.
pub fn parse_product_tables(markdown: &str) -> Vec<ProductRecord> {
    let mut category = String::new();
    let mut records = Vec::new();

    for line in markdown.lines() {
        let line = line.trim();
        if let Some(heading) = line.strip_prefix("###") {
            category = heading.trim().to_string();
            continue;
        }
        if !line.starts_with('|') {
            continue;
        }

        let cells = split_row(line);
        if cells.len() != 5 || is_separator(&cells) || cells[0] == "Product Name" {
            continue;
        }
        let Ok(rating) = cells[2].parse::<f64>() else {
            continue;
        };
        records.push(ProductRecord {
            product_name: cells[0].clone(),
            brand: cells[1].clone(),
            category: category.clone(),
            rating,
            price: cells[3].clone(),
            vendor: String::new(),
            purchase_link: unwrap_link(&cells[4]),
            description: String::new(),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, brand: &str, category: &str, rating: f64, price: &str) -> ProductRecord {
        ProductRecord {
            product_name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            rating,
            price: price.to_string(),
            vendor: "Amazon".to_string(),
            purchase_link: format!("https://www.amazon.com/s?k={}", name.replace(' ', "+")),
            description: "desc".to_string(),
        }
    }

    fn collection() -> ProductCollection {
        ProductCollection {
            categories: vec!["Strollers and car seats".into(), "Feeding".into()],
            records: vec![
                record("Graco Modes", "Graco", "Strollers and car seats", 4.7, "$249.99"),
                record("Anti-Colic Bottle", "Dr. Brown's", "Feeding", 4.8, "$24.99"),
                record("Pipe | Bottle", "Odd\\Brand", "Feeding", 4.0, "$9"),
            ],
        }
    }

    #[test]
    fn test_render_layout() {
        let rendered = render_product_tables(&collection());
        let expected = "### Strollers and car seats\n\n\
            | Product Name | Brand | Rating | Price | Link |\n\
            |---|---|---|---|---|\n\
            | Graco Modes | Graco | 4.7 | $249.99 | [Buy](https://www.amazon.com/s?k=Graco+Modes) |\n\
            \n\
            ### Feeding\n\n\
            | Product Name | Brand | Rating | Price | Link |\n\
            |---|---|---|---|---|\n\
            | Anti-Colic Bottle | Dr. Brown's | 4.8 | $24.99 | [Buy](https://www.amazon.com/s?k=Anti-Colic+Bottle) |\n\
            | Pipe \\| Bottle | Odd\\\\Brand | 4 | $9 | [Buy](https://www.amazon.com/s?k=Pipe+|+Bottle) |\n";
        // The link cell escapes pipes too
        let expected = expected.replace("k=Pipe+|+Bottle", "k=Pipe+\\|+Bottle");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_then_parse_round_trip() {
        let original = collection();
        let parsed = parse_product_tables(&render_product_tables(&original));

        let strip = |r: &ProductRecord| {
            (
                r.product_name.clone(),
                r.brand.clone(),
                r.category.clone(),
                r.rating,
                r.price.clone(),
                r.purchase_link.clone(),
            )
        };
        assert_eq!(
            parsed.iter().map(strip).collect::<Vec<_>>(),
            original.records.iter().map(strip).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let markdown = "### Feeding\n\
            | Product Name | Brand | Rating | Price | Link |\n\
            |:--|--|--:|--|--|\n\
            | Bottle | Acme | great | $5 | x |\n\
            | Too | few |\n\
            | Cup | Acme | 4.2 | $3 | https://target.com/cup |\n";
        let parsed = parse_product_tables(markdown);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].product_name, "Cup");
        assert_eq!(parsed[0].category, "Feeding");
        assert_eq!(parsed[0].purchase_link, "https://target.com/cup");
    }
}
