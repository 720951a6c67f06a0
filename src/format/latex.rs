//! LaTeX body writer.

use crate::model::{Alignment, LinkTable, ListKind, Paragraph, Span};
use std::fmt::Write;

/// Escape LaTeX special characters in running text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            c => out.push(c),
        }
    }
    out
}

/// Render paragraphs as a LaTeX fragment.
pub fn write_paragraphs(paragraphs: &[Paragraph], links: &LinkTable) -> String {
    let mut out = String::new();
    for p in paragraphs {
        write_paragraph(&mut out, p, links);
    }
    out
}

fn sectioning(level: u8) -> &'static str {
    match level {
        0 | 1 => "section*",
        2 => "subsection*",
        3 => "subsubsection*",
        4 => "paragraph",
        _ => "subparagraph",
    }
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph, links: &LinkTable) {
    match paragraph {
        Paragraph::Heading { level, body } => {
            let _ = writeln!(out, "\\{}{{{}}}\n", sectioning(*level), spans(body, links));
        }
        Paragraph::Span(body) => {
            let _ = writeln!(out, "{}\n", spans(body, links));
        }
        Paragraph::CodeBlock { code, .. } => {
            let _ = writeln!(out, "\\begin{{verbatim}}\n{code}\n\\end{{verbatim}}\n");
        }
        Paragraph::Raw(markup) => {
            let _ = writeln!(out, "{}\n", markup.trim_end());
        }
        Paragraph::Math(source) => {
            let _ = writeln!(out, "\\[{source}\\]\n");
        }
        Paragraph::HorizontalRule => out.push_str("\\noindent\\rule{\\linewidth}{0.4pt}\n\n"),
        Paragraph::List { kind, items } => {
            let env = match kind {
                ListKind::Unordered => "itemize",
                ListKind::Ordered { .. } => "enumerate",
            };
            let _ = writeln!(out, "\\begin{{{env}}}");
            if let ListKind::Ordered { start } = kind {
                if *start != 1 {
                    let _ = writeln!(out, "\\setcounter{{enumi}}{{{}}}", start.saturating_sub(1));
                }
            }
            for item in items {
                let _ = writeln!(out, "\\item {}", write_paragraphs(item, links).trim_end());
            }
            let _ = writeln!(out, "\\end{{{env}}}\n");
        }
        Paragraph::Quoted(children) => {
            let _ = writeln!(
                out,
                "\\begin{{quote}}\n{}\n\\end{{quote}}\n",
                write_paragraphs(children, links).trim_end()
            );
        }
        Paragraph::Table {
            alignments,
            header,
            rows,
        } => {
            let columns = header.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
            let colspec: String = (0..columns)
                .map(|i| match alignments.get(i) {
                    Some(Alignment::Center) => 'c',
                    Some(Alignment::Right) => 'r',
                    _ => 'l',
                })
                .collect();
            let _ = writeln!(out, "\\begin{{tabular}}{{{colspec}}}");
            if !header.is_empty() {
                let _ = writeln!(out, "{} \\\\ \\hline", row(header, links));
            }
            for r in rows {
                let _ = writeln!(out, "{} \\\\", row(r, links));
            }
            out.push_str("\\end{tabular}\n\n");
        }
    }
}

fn row(cells: &[Vec<Paragraph>], links: &LinkTable) -> String {
    cells
        .iter()
        .map(|cell| write_paragraphs(cell, links).trim().to_string())
        .collect::<Vec<_>>()
        .join(" & ")
}

fn spans(list: &[Span], links: &LinkTable) -> String {
    let mut out = String::new();
    for span in list {
        write_span(&mut out, span, links);
    }
    out
}

fn write_span(out: &mut String, span: &Span, links: &LinkTable) {
    match span {
        Span::Literal(text) => out.push_str(&escape(text)),
        Span::InlineCode(code) => {
            let _ = write!(out, "\\texttt{{{}}}", escape(code));
        }
        Span::Strong(body) => {
            let _ = write!(out, "\\textbf{{{}}}", spans(body, links));
        }
        Span::Emphasis(body) => {
            let _ = write!(out, "\\emph{{{}}}", spans(body, links));
        }
        Span::Math { source, display } => {
            if *display {
                let _ = write!(out, "\\[{source}\\]");
            } else {
                let _ = write!(out, "${source}$");
            }
        }
        Span::RawInline(markup) => out.push_str(markup),
        Span::DirectLink { body, url, .. } => {
            let _ = write!(out, "\\href{{{url}}}{{{}}}", spans(body, links));
        }
        Span::IndirectLink {
            body,
            original,
            key,
        } => match links.get(key) {
            Some(def) => {
                let _ = write!(out, "\\href{{{}}}{{{}}}", def.url, spans(body, links));
            }
            None => out.push_str(&escape(original)),
        },
        Span::DirectImage { url, .. } => {
            let _ = write!(out, "\\includegraphics{{{url}}}");
        }
        Span::IndirectImage { original, key, .. } => match links.get(key) {
            Some(def) => {
                let _ = write!(out, "\\includegraphics{{{}}}", def.url);
            }
            None => out.push_str(&escape(original)),
        },
        Span::HardLineBreak => out.push_str("\\\\\n"),
    }
}
