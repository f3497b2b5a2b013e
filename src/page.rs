use once_cell::sync::Lazy;
use scraper::{Html, Node, Selector};

// Selectors compiled once per process.
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to parse row selector")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td, th").expect("Failed to parse cell selector")
});

static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img[src]").expect("Failed to parse image selector")
});

const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// The views of a fetched page the extractors work on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Visible text, one line per non-empty text node.
    pub text: String,
    /// Table rows as normalized cell text.
    pub rows: Vec<Vec<String>>,
    /// `src` attribute of every image, in document order.
    pub images: Vec<String>,
}

impl PageSnapshot {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let rows = document
            .select(&ROW_SELECTOR)
            .map(|row| {
                row.select(&CELL_SELECTOR)
                    .map(|cell| normalize_ws(&cell.text().collect::<Vec<_>>().join(" ")))
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect();

        let images = document
            .select(&IMAGE_SELECTOR)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .collect();

        PageSnapshot {
            text: visible_text(&document),
            rows,
            images,
        }
    }

    /// Snapshot of already-extracted page text, with no tables or images.
    pub fn from_text(text: &str) -> Self {
        PageSnapshot {
            text: format_lines(text),
            ..PageSnapshot::default()
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

fn visible_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => HIDDEN_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        let line = normalize_ws(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Collapses every whitespace run (including non-breaking spaces) to one space.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims each line and drops blank ones.
pub fn format_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let line = normalize_ws(line);
        if line.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&line);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
<head><title>Load Management</title><style>.x { color: red; }</style></head>
<body>
  <h2>Today</h2>
  <script>var Today = "ignored";</script>
  <table>
    <tr><th>Program</th><th>Probability</th><th>Time</th></tr>
    <tr><td>Residential&nbsp;Interruptible   Water Heating</td><td> Unlikely </td><td>Undetermined</td></tr>
  </table>
  <img src="/images/gauge2.jpg?v=3" alt="gauge">
  <img alt="no source">
</body>
</html>"#;

    #[test]
    fn text_has_one_line_per_text_node() {
        let page = PageSnapshot::from_html(PAGE);
        let lines: Vec<&str> = page.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Today",
                "Program",
                "Probability",
                "Time",
                "Residential Interruptible Water Heating",
                "Unlikely",
                "Undetermined",
            ]
        );
    }

    #[test]
    fn rows_hold_normalized_cells() {
        let page = PageSnapshot::from_html(PAGE);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(
            page.rows[1],
            vec!["Residential Interruptible Water Heating", "Unlikely", "Undetermined"]
        );
    }

    #[test]
    fn images_skip_missing_src() {
        let page = PageSnapshot::from_html(PAGE);
        assert_eq!(page.images, vec!["/images/gauge2.jpg?v=3"]);
    }

    #[test]
    fn from_text_drops_blank_lines() {
        let page = PageSnapshot::from_text("  Today \n\n\n  Next   Day\n");
        assert_eq!(page.text, "Today\nNext Day");
        assert!(page.rows.is_empty());
    }
}
