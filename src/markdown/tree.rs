//! Bridge between markdown source text and [`DocumentNode`] trees.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use tracing::debug;

use super::syntax::{classify, visit_mut, DocumentNode, CODE};

fn parser(markdown: &str) -> Parser<'_> {
    Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
    )
}

/// Parse markdown into an mdast-shaped tree rooted at a `root` node.
#[must_use]
pub fn parse_tree(markdown: &str) -> DocumentNode {
    build(markdown).0
}

/// Run [`classify`] over the markdown's code blocks and write changed labels
/// back into the fence lines. Everything else is kept byte for byte.
///
/// Indented code blocks cannot carry a label and are left as they are.
#[must_use]
pub fn fix_code_fences(markdown: &str) -> String {
    let (mut tree, fences) = build(markdown);
    let before = code_langs(&mut tree);
    classify(&mut tree);
    let after = code_langs(&mut tree);

    let mut out = String::with_capacity(markdown.len() + 16);
    let mut cursor = 0;

    for ((fence, old), new) in fences.iter().zip(before).zip(after) {
        if old == new {
            continue;
        }
        let Some(info) = fence else {
            debug!(lang = ?new, "Leaving indented code block unlabeled");
            continue;
        };
        out.push_str(&markdown[cursor..info.start]);
        out.push_str(new.as_deref().unwrap_or(""));
        cursor = info.end;
    }

    out.push_str(&markdown[cursor..]);
    out
}

/// Build the tree and, for each code block in document order, the source span
/// of its fence info string (`None` for indented blocks).
fn build(markdown: &str) -> (DocumentNode, Vec<Option<Range<usize>>>) {
    let mut stack = vec![DocumentNode::new("root")];
    let mut fences = Vec::new();

    for (event, range) in parser(markdown).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if let Tag::CodeBlock(kind) = &tag {
                    fences.push(match kind {
                        CodeBlockKind::Fenced(_) => info_span(markdown, range.start),
                        CodeBlockKind::Indented => None,
                    });
                }
                stack.push(start_node(&tag));
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        push_child(&mut stack, finish_node(node));
                    }
                }
            }
            Event::Text(text) => {
                let in_code = stack.last().is_some_and(DocumentNode::is_code);
                if in_code {
                    if let Some(code) = stack.last_mut() {
                        code.value.get_or_insert_with(String::new).push_str(&text);
                    }
                } else {
                    push_child(&mut stack, leaf("text", &text));
                }
            }
            Event::Code(text) => push_child(&mut stack, leaf("inlineCode", &text)),
            Event::Html(html) | Event::InlineHtml(html) => {
                push_child(&mut stack, leaf("html", &html));
            }
            Event::SoftBreak | Event::HardBreak => {
                push_child(&mut stack, DocumentNode::new("break"));
            }
            Event::Rule => push_child(&mut stack, DocumentNode::new("thematicBreak")),
            _ => {}
        }
    }

    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            push_child(&mut stack, finish_node(node));
        }
    }

    let root = stack.pop().unwrap_or_else(|| DocumentNode::new("root"));
    (root, fences)
}

fn start_node(tag: &Tag<'_>) -> DocumentNode {
    match tag {
        Tag::Paragraph => DocumentNode::new("paragraph"),
        Tag::Heading { level, .. } => {
            let mut node = DocumentNode::new("heading");
            node.extra.insert("depth".to_string(), heading_depth(*level).into());
            node
        }
        Tag::BlockQuote(_) => DocumentNode::new("blockquote"),
        Tag::CodeBlock(kind) => {
            let lang = match kind {
                CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
                CodeBlockKind::Indented => None,
            };
            DocumentNode::code(lang, String::new())
        }
        Tag::HtmlBlock => DocumentNode::new("html"),
        Tag::List(start) => {
            let mut node = DocumentNode::new("list");
            node.extra
                .insert("ordered".to_string(), start.is_some().into());
            node
        }
        Tag::Item => DocumentNode::new("listItem"),
        Tag::Table(_) => DocumentNode::new("table"),
        Tag::TableHead | Tag::TableRow => DocumentNode::new("tableRow"),
        Tag::TableCell => DocumentNode::new("tableCell"),
        Tag::Emphasis => DocumentNode::new("emphasis"),
        Tag::Strong => DocumentNode::new("strong"),
        Tag::Strikethrough => DocumentNode::new("delete"),
        Tag::Link { dest_url, .. } => with_url("link", dest_url),
        Tag::Image { dest_url, .. } => with_url("image", dest_url),
        Tag::FootnoteDefinition(_) => DocumentNode::new("footnoteDefinition"),
        _ => DocumentNode::new("unknown"),
    }
}

/// mdast code values carry no trailing newline.
fn finish_node(mut node: DocumentNode) -> DocumentNode {
    if node.kind == CODE {
        if let Some(value) = node.value.as_mut() {
            if value.ends_with('\n') {
                value.pop();
            }
        }
    }
    node
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn with_url(kind: &str, url: &str) -> DocumentNode {
    let mut node = DocumentNode::new(kind);
    node.extra.insert("url".to_string(), url.into());
    node
}

fn leaf(kind: &str, value: &str) -> DocumentNode {
    let mut node = DocumentNode::new(kind);
    node.value = Some(value.to_string());
    node
}

fn push_child(stack: &mut [DocumentNode], node: DocumentNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn code_langs(tree: &mut DocumentNode) -> Vec<Option<String>> {
    let mut langs = Vec::new();
    visit_mut(tree, &mut |node| {
        if node.is_code() {
            langs.push(node.lang.clone());
        }
    });
    langs
}

/// Span of the info string on the opening fence line starting at `start`.
fn info_span(markdown: &str, start: usize) -> Option<Range<usize>> {
    let rest = markdown.get(start..)?;
    let line = rest.split('\n').next().unwrap_or("");
    let line = line.strip_suffix('\r').unwrap_or(line);

    let fence = line.trim_start_matches([' ', '\t', '>']);
    let indent = line.len() - fence.len();
    let fence_char = fence.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let fence_len = fence.len() - fence.trim_start_matches(fence_char).len();
    if fence_len < 3 {
        return None;
    }

    Some(start + indent + fence_len..start + line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree_shape() {
        let md = "# Title\n\nSome *text*\n\n```js\nvar a;\n```\n";
        let tree = parse_tree(md);

        assert_eq!(tree.kind, "root");
        let kinds: Vec<_> = tree.children.iter().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["heading", "paragraph", "code"]);
        assert_eq!(tree.children[0].extra["depth"], 1);

        let code = &tree.children[2];
        assert_eq!(code.lang.as_deref(), Some("js"));
        assert_eq!(code.value.as_deref(), Some("var a;"));

        let emphasis = &tree.children[1].children[1];
        assert_eq!(emphasis.kind, "emphasis");
        assert_eq!(emphasis.children[0].value.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_tree_info_string_first_word() {
        let tree = parse_tree("```jsx {1,3}\n<App />\n```\n");
        assert_eq!(tree.children[0].lang.as_deref(), Some("jsx"));
    }

    #[test]
    fn test_parse_tree_indented_code() {
        let tree = parse_tree("Para\n\n    var x;\n");
        let code = &tree.children[1];
        assert!(code.is_code());
        assert_eq!(code.lang, None);
        assert_eq!(code.value.as_deref(), Some("var x;"));
    }

    #[test]
    fn test_fix_clears_txt() {
        assert_eq!(
            fix_code_fences("```txt\nhello\n```\n"),
            "```\nhello\n```\n"
        );
    }

    #[test]
    fn test_fix_labels_javascript() {
        assert_eq!(
            fix_code_fences("```\nvar x = 1;\n```\n"),
            "```js\nvar x = 1;\n```\n"
        );
    }

    #[test]
    fn test_fix_leaves_other_labels() {
        let md = "```python\nvar = 1\n```\n";
        assert_eq!(fix_code_fences(md), md);
    }

    #[test]
    fn test_fix_only_touches_fences() {
        let md = "A variable in prose.\n\n```\nfunction(){}\n```\n\n~~~ txt\nplain\n~~~\n\nThe end, var.\n";
        assert_eq!(
            fix_code_fences(md),
            "A variable in prose.\n\n```js\nfunction(){}\n```\n\n~~~\nplain\n~~~\n\nThe end, var.\n"
        );
    }

    #[test]
    fn test_fix_keeps_indented_blocks() {
        let md = "Para\n\n    var x;\n";
        assert_eq!(fix_code_fences(md), md);
    }

    #[test]
    fn test_fix_without_code_is_identity() {
        let md = "# Hi\n\n![img](/a.png) and `var` inline\n";
        assert_eq!(fix_code_fences(md), md);
    }

    #[test]
    fn test_fix_crlf() {
        assert_eq!(
            fix_code_fences("```txt\r\nhello\r\n```\r\n"),
            "```\r\nhello\r\n```\r\n"
        );
    }

    #[test]
    fn test_info_span() {
        assert_eq!(info_span("```js\n", 0), Some(3..5));
        assert_eq!(info_span("  ~~~~ txt x\n", 0), Some(6..12));
        assert_eq!(info_span("``\n", 0), None);
        assert_eq!(info_span("text", 10), None);
    }
}
