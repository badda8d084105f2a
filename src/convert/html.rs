use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::{parse_csv, ConvertError};

/// CSS classes applied to every rendered table
const TABLE_CLASSES: &str = "dataframe table table-striped";

/// Render CSV text as an HTML `<table>` fragment.
///
/// The first column holds each row's 0-based position and has a blank
/// header cell. Column names and cell values are escaped; nulls render empty.
pub fn to_html_table(csv_text: &str) -> Result<String, ConvertError> {
    let table = parse_csv(csv_text)?;
    let options = FormatOptions::default().with_null("");

    let mut html = String::new();
    html.push_str(&format!("<table border=\"1\" class=\"{TABLE_CLASSES}\">\n"));

    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
    for field in table.schema.fields() {
        html.push_str(&format!("      <th>{}</th>\n", escape_html(field.name())));
    }
    html.push_str("    </tr>\n  </thead>\n");

    html.push_str("  <tbody>\n");
    let mut position = 0usize;
    for batch in &table.batches {
        let formatters = batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            html.push_str(&format!("    <tr>\n      <th>{position}</th>\n"));
            for formatter in &formatters {
                let value = formatter.value(row).try_to_string()?;
                html.push_str(&format!("      <td>{}</td>\n", escape_html(&value)));
            }
            html.push_str("    </tr>\n");
            position += 1;
        }
    }
    html.push_str("  </tbody>\n</table>");

    Ok(html)
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
