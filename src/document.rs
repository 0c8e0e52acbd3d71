//! Combined HTML document: a fixed Japanese-reading shell around the chapter fragments.

use crate::model::{EpisodeRange, Novel};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors writing the output document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `{code}-{start}-{end}.html`
pub fn output_file_name(code: &str, range: EpisodeRange) -> String {
    format!("{}-{}-{}.html", code, range.start(), range.end())
}

/// Build the full document.
///
/// `title` and `author` are inserted as-is, without HTML escaping.
pub fn assemble(fragments: &[String], title: &str, author: &str, start: u32, end: u32) -> String {
    let mut doc = format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="author" content="{author}">
    <title>{title}:{start}-{end}</title>
    <style>
        body {{
            font-family: 'Noto Sans JP', sans-serif;
            line-height: 1.8;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }}
        h1 {{
            font-size: 1.5em;
            margin: 2em 0 1em 0;
            border-bottom: 1px solid #ddd;
            padding-bottom: 0.5em;
        }}
        .p-novel__body {{
            margin-bottom: 3em;
        }}
        .chapter {{
            margin-bottom: 4em;
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>著者: {author}</p>
    <hr>
"#
    );

    for fragment in fragments {
        doc.push_str(fragment);
        doc.push('\n');
    }

    doc.push_str("\n</body>\n</html>");
    doc
}

/// Assemble a downloaded novel.
pub fn render_novel(novel: &Novel) -> String {
    let fragments: Vec<String> = novel.fragments.iter().map(|f| f.html.clone()).collect();
    assemble(
        &fragments,
        &novel.metadata.title,
        &novel.metadata.author,
        novel.range.start(),
        novel.range.end(),
    )
}

/// Write `contents` to `path` as UTF-8, replacing any existing file.
pub fn write_document(path: &Path, contents: &str) -> Result<(), DocumentError> {
    std::fs::write(path, contents).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
