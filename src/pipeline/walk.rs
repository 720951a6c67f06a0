//! Recursive traversals over the paragraph/span tree.
//!
//! Every traversal matches on the paragraph variant: span-bearing blocks
//! have their spans visited, nested blocks are rebuilt with the same variant
//! around transformed children, leaves are passed through. Recursion depth
//! follows document nesting depth, which stays shallow for real documents.

use crate::model::{plain_text, Paragraph, Span};
use std::convert::Infallible;

/// Literal text of the first level-1 heading, searched depth-first through
/// nested blocks.
pub fn extract_title(paragraphs: &[Paragraph]) -> Option<String> {
    paragraphs.iter().find_map(|p| match p {
        Paragraph::Heading { level: 1, body } => Some(plain_text(body)),
        Paragraph::List { items, .. } => items.iter().find_map(|item| extract_title(item)),
        Paragraph::Quoted(children) => extract_title(children),
        Paragraph::Table { header, rows, .. } => header
            .iter()
            .chain(rows.iter().flatten())
            .find_map(|cell| extract_title(cell)),
        _ => None,
    })
}

/// Copy of the tree with every level-1 heading removed, at any depth.
pub fn drop_title(paragraphs: &[Paragraph]) -> Vec<Paragraph> {
    paragraphs
        .iter()
        .filter(|p| !matches!(p, Paragraph::Heading { level: 1, .. }))
        .map(|p| match p {
            Paragraph::List { kind, items } => Paragraph::List {
                kind: *kind,
                items: items.iter().map(|item| drop_title(item)).collect(),
            },
            Paragraph::Quoted(children) => Paragraph::Quoted(drop_title(children)),
            Paragraph::Table {
                alignments,
                header,
                rows,
            } => Paragraph::Table {
                alignments: alignments.clone(),
                header: header.iter().map(|cell| drop_title(cell)).collect(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| drop_title(cell)).collect())
                    .collect(),
            },
            other => other.clone(),
        })
        .collect()
}

/// Apply `f` to every span in the tree, including spans nested inside other
/// spans (children first) and inside nested blocks.
pub fn map_spans<F>(paragraphs: Vec<Paragraph>, mut f: F) -> Vec<Paragraph>
where
    F: FnMut(Span) -> Span,
{
    let result: Result<_, Infallible> = try_map_spans(paragraphs, &mut |s: Span| Ok(f(s)));
    match result {
        Ok(paragraphs) => paragraphs,
        Err(never) => match never {},
    }
}

/// Fallible [`map_spans`]: the first error aborts the traversal.
pub fn try_map_spans<F, E>(paragraphs: Vec<Paragraph>, f: &mut F) -> Result<Vec<Paragraph>, E>
where
    F: FnMut(Span) -> Result<Span, E>,
{
    paragraphs
        .into_iter()
        .map(|p| map_paragraph(p, f))
        .collect()
}

fn map_paragraph<F, E>(paragraph: Paragraph, f: &mut F) -> Result<Paragraph, E>
where
    F: FnMut(Span) -> Result<Span, E>,
{
    Ok(match paragraph {
        Paragraph::Heading { level, body } => Paragraph::Heading {
            level,
            body: map_span_list(body, f)?,
        },
        Paragraph::Span(spans) => Paragraph::Span(map_span_list(spans, f)?),
        Paragraph::List { kind, items } => Paragraph::List {
            kind,
            items: items
                .into_iter()
                .map(|item| try_map_spans(item, f))
                .collect::<Result<_, _>>()?,
        },
        Paragraph::Quoted(children) => Paragraph::Quoted(try_map_spans(children, f)?),
        Paragraph::Table {
            alignments,
            header,
            rows,
        } => Paragraph::Table {
            alignments,
            header: header
                .into_iter()
                .map(|cell| try_map_spans(cell, f))
                .collect::<Result<_, _>>()?,
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| try_map_spans(cell, f))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<_, _>>()?,
        },
        leaf @ (Paragraph::CodeBlock { .. }
        | Paragraph::Raw(_)
        | Paragraph::Math(_)
        | Paragraph::HorizontalRule) => leaf,
    })
}

fn map_span_list<F, E>(spans: Vec<Span>, f: &mut F) -> Result<Vec<Span>, E>
where
    F: FnMut(Span) -> Result<Span, E>,
{
    spans.into_iter().map(|s| map_span(s, f)).collect()
}

fn map_span<F, E>(span: Span, f: &mut F) -> Result<Span, E>
where
    F: FnMut(Span) -> Result<Span, E>,
{
    let span = match span {
        Span::Strong(body) => Span::Strong(map_span_list(body, f)?),
        Span::Emphasis(body) => Span::Emphasis(map_span_list(body, f)?),
        Span::DirectLink { body, url, title } => Span::DirectLink {
            body: map_span_list(body, f)?,
            url,
            title,
        },
        Span::IndirectLink {
            body,
            original,
            key,
        } => Span::IndirectLink {
            body: map_span_list(body, f)?,
            original,
            key,
        },
        other => other,
    };
    f(span)
}

/// Visit every span in the tree without rebuilding it.
pub fn for_each_span<F>(paragraphs: &[Paragraph], f: &mut F)
where
    F: FnMut(&Span),
{
    fn spans<F: FnMut(&Span)>(list: &[Span], f: &mut F) {
        for span in list {
            match span {
                Span::Strong(body)
                | Span::Emphasis(body)
                | Span::DirectLink { body, .. }
                | Span::IndirectLink { body, .. } => spans(body, f),
                _ => {}
            }
            f(span);
        }
    }

    for p in paragraphs {
        match p {
            Paragraph::Heading { body, .. } | Paragraph::Span(body) => spans(body, f),
            Paragraph::List { items, .. } => items.iter().for_each(|item| for_each_span(item, f)),
            Paragraph::Quoted(children) => for_each_span(children, f),
            Paragraph::Table { header, rows, .. } => header
                .iter()
                .chain(rows.iter().flatten())
                .for_each(|cell| for_each_span(cell, f)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListKind;

    fn lit(s: &str) -> Span {
        Span::Literal(s.into())
    }

    fn h(level: u8, text: &str) -> Paragraph {
        Paragraph::Heading {
            level,
            body: vec![lit(text)],
        }
    }

    fn para(text: &str) -> Paragraph {
        Paragraph::Span(vec![lit(text)])
    }

    #[test]
    fn title_from_top_level_heading() {
        let doc = vec![para("intro"), h(2, "Sub"), h(1, "Report Title"), h(1, "Second")];
        assert_eq!(extract_title(&doc).as_deref(), Some("Report Title"));
    }

    #[test]
    fn title_concatenates_formatted_text() {
        let doc = vec![Paragraph::Heading {
            level: 1,
            body: vec![lit("Sales "), Span::Strong(vec![lit("2024")]), Span::InlineCode("Q1".into())],
        }];
        assert_eq!(extract_title(&doc).as_deref(), Some("Sales 2024Q1"));
    }

    #[test]
    fn title_found_inside_nested_blocks() {
        let doc = vec![
            para("before"),
            Paragraph::Quoted(vec![Paragraph::List {
                kind: ListKind::Unordered,
                items: vec![vec![para("a")], vec![h(1, "Deep")]],
            }]),
        ];
        assert_eq!(extract_title(&doc).as_deref(), Some("Deep"));
    }

    #[test]
    fn no_title_without_level_one() {
        assert_eq!(extract_title(&[h(2, "Sub"), para("x")]), None);
        assert_eq!(extract_title(&[]), None);
    }

    #[test]
    fn drop_then_extract_is_none_for_single_heading() {
        let doc = vec![h(1, "Only"), para("body"), h(2, "Sub")];
        let dropped = drop_title(&doc);
        assert_eq!(extract_title(&dropped), None);
        assert_eq!(dropped, vec![para("body"), h(2, "Sub")]);
    }

    #[test]
    fn drop_preserves_wrappers_and_other_paragraphs() {
        let doc = vec![
            Paragraph::Quoted(vec![h(1, "Inner"), para("kept"), h(3, "Small")]),
            Paragraph::List {
                kind: ListKind::Ordered { start: 3 },
                items: vec![vec![h(1, "Item title"), para("item body")], vec![]],
            },
            Paragraph::HorizontalRule,
        ];
        let dropped = drop_title(&doc);
        assert_eq!(
            dropped,
            vec![
                Paragraph::Quoted(vec![para("kept"), h(3, "Small")]),
                Paragraph::List {
                    kind: ListKind::Ordered { start: 3 },
                    items: vec![vec![para("item body")], vec![]],
                },
                Paragraph::HorizontalRule,
            ]
        );
    }

    #[test]
    fn map_reaches_nested_spans() {
        let doc = vec![
            Paragraph::Span(vec![Span::Emphasis(vec![lit("a")])]),
            Paragraph::Quoted(vec![Paragraph::List {
                kind: ListKind::Unordered,
                items: vec![vec![para("b")]],
            }]),
            Paragraph::CodeBlock {
                code: "a".into(),
                language: None,
            },
        ];
        let upper = map_spans(doc, |s| match s {
            Span::Literal(t) => Span::Literal(t.to_uppercase()),
            other => other,
        });
        assert_eq!(
            upper,
            vec![
                Paragraph::Span(vec![Span::Emphasis(vec![lit("A")])]),
                Paragraph::Quoted(vec![Paragraph::List {
                    kind: ListKind::Unordered,
                    items: vec![vec![para("B")]],
                }]),
                Paragraph::CodeBlock {
                    code: "a".into(),
                    language: None,
                },
            ]
        );
    }

    #[test]
    fn try_map_stops_on_error() {
        let doc = vec![para("ok"), para("bad"), para("never")];
        let mut seen = Vec::new();
        let result: Result<_, String> = try_map_spans(doc, &mut |s: Span| {
            if let Span::Literal(ref t) = s {
                seen.push(t.clone());
                if t == "bad" {
                    return Err("failed".into());
                }
            }
            Ok(s)
        });
        assert_eq!(result.unwrap_err(), "failed");
        assert_eq!(seen, vec!["ok".to_string(), "bad".to_string()]);
    }

    #[test]
    fn for_each_visits_table_cells() {
        let doc = vec![Paragraph::Table {
            alignments: vec![],
            header: vec![vec![para("h")]],
            rows: vec![vec![vec![para("r1")], vec![para("r2")]]],
        }];
        let mut texts = Vec::new();
        for_each_span(&doc, &mut |s: &Span| {
            if let Span::Literal(t) = s {
                texts.push(t.clone());
            }
        });
        assert_eq!(texts, vec!["h", "r1", "r2"]);
    }
}
