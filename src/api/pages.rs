//! Server-rendered HTML pages.

use crate::convert::escape_html;
use crate::storage::models::RecordSummary;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
</head>
<body>
<div class="container py-4">
  <nav class="mb-4"><a href="/">Upload</a> | <a href="/files">Files</a></nav>
  <h1>{title}</h1>
{body}
</div>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Upload form. Posts `file` and `description` back to `/`.
pub fn upload_page() -> String {
    layout(
        "Upload CSV",
        r#"  <form method="post" action="/" enctype="multipart/form-data">
    <div class="mb-3">
      <label class="form-label" for="file">CSV file</label>
      <input class="form-control" type="file" id="file" name="file" accept=".csv,text/csv">
    </div>
    <div class="mb-3">
      <label class="form-label" for="description">Description</label>
      <input class="form-control" type="text" id="description" name="description">
    </div>
    <button class="btn btn-primary" type="submit">Upload</button>
  </form>"#,
    )
}

pub fn list_page(records: &[RecordSummary]) -> String {
    let mut rows = String::new();
    for record in records {
        let id = record.id;
        rows.push_str(&format!(
            r#"      <tr>
        <td>{id}</td>
        <td>{filename}</td>
        <td>{description}</td>
        <td>
          <a href="/view_raw/{id}">Raw</a>
          <a href="/download_csv/{id}">CSV</a>
          <a href="/convert_to_parquet/{id}">Parquet</a>
          <a href="/view_parquet/{id}">Table</a>
          <a href="/edit/{id}">Edit</a>
          <form method="post" action="/delete/{id}" class="d-inline">
            <button class="btn btn-link p-0" type="submit">Delete</button>
          </form>
        </td>
      </tr>
"#,
            filename = escape_html(&record.filename),
            description = escape_html(&record.description),
        ));
    }

    let body = if records.is_empty() {
        r#"  <p>No files uploaded yet. <a href="/">Upload one</a>.</p>"#.to_string()
    } else {
        format!(
            r#"  <table class="table table-striped">
    <thead>
      <tr><th>ID</th><th>Filename</th><th>Description</th><th>Actions</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>"#
        )
    };

    layout("Files", &body)
}

pub fn edit_page(record: &RecordSummary) -> String {
    let body = format!(
        r#"  <p>{filename}</p>
  <form method="post" action="/edit/{id}">
    <div class="mb-3">
      <label class="form-label" for="description">Description</label>
      <input class="form-control" type="text" id="description" name="description" value="{description}">
    </div>
    <button class="btn btn-primary" type="submit">Save</button>
  </form>"#,
        id = record.id,
        filename = escape_html(&record.filename),
        description = escape_html(&record.description),
    );
    layout("Edit Description", &body)
}

/// Wraps an already-rendered table fragment.
pub fn table_page(filename: &str, table_html: &str) -> String {
    let body = format!("  <p>{}</p>\n{table_html}", escape_html(filename));
    layout("Table Preview", &body)
}
