use serde::{Deserialize, Serialize};

/// Node type of fenced and indented code blocks.
pub const CODE: &str = "code";

/// A node of a markdown syntax tree, in the mdast JSON shape.
///
/// Code nodes carry `lang` and `value`; fields this crate does not read are
/// kept in `extra` so a tree can be round-tripped through JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DocumentNode {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn code(lang: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            kind: CODE.to_string(),
            lang: lang.map(str::to_string),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn is_code(&self) -> bool {
        self.kind == CODE
    }
}

/// Visit every node depth-first, parent before children, in document order.
pub fn visit_mut<F>(node: &mut DocumentNode, callback: &mut F)
where
    F: FnMut(&mut DocumentNode),
{
    callback(node);
    for child in &mut node.children {
        visit_mut(child, callback);
    }
}

/// Label unlabeled JavaScript code blocks `js` and drop `txt` labels.
///
/// Other labels are left alone. A cleared `txt` block that looks like
/// JavaScript is labeled `js` on the next run; after that the tree is stable.
pub fn classify(tree: &mut DocumentNode) {
    visit_mut(tree, &mut classify_node);
}

fn classify_node(node: &mut DocumentNode) {
    if !node.is_code() {
        return;
    }
    if node.lang.is_none() && is_js(node.value.as_deref().unwrap_or("")) {
        node.lang = Some("js".to_string());
    } else if node.lang.as_deref() == Some("txt") {
        node.lang = None;
    }
}

/// Very rough JavaScript detection: any `function(` or `var` substring.
///
/// No word boundaries, so "variable" counts.
#[must_use]
pub fn is_js(text: &str) -> bool {
    text.contains("function(") || text.contains("var")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(node: &DocumentNode) -> Option<&str> {
        node.lang.as_deref()
    }

    #[test]
    fn test_is_js() {
        assert!(is_js("var x = 1;"));
        assert!(is_js("setTimeout(function() {}, 0)"));
        assert!(!is_js("function () {}"));
        assert!(!is_js("let x = 1;"));
        assert!(!is_js("VAR"));
    }

    #[test]
    fn test_is_js_false_positives() {
        assert!(is_js("this variable is not code"));
        assert!(is_js("SELECT * FROM invariants"));
        assert!(is_js("advar"));
    }

    #[test]
    fn test_unlabeled_js_becomes_js() {
        let mut node = DocumentNode::code(None, "var x = 1;");
        classify(&mut node);
        assert_eq!(lang(&node), Some("js"));
    }

    #[test]
    fn test_unlabeled_non_js_stays_unlabeled() {
        let mut node = DocumentNode::code(None, "$ npm install react");
        classify(&mut node);
        assert_eq!(lang(&node), None);
    }

    #[test]
    fn test_txt_label_is_cleared() {
        let mut node = DocumentNode::code(Some("txt"), "var x = 1;");
        classify(&mut node);
        assert_eq!(lang(&node), None);
    }

    #[test]
    fn test_other_labels_untouched() {
        let mut node = DocumentNode::code(Some("python"), "var = function(x)");
        classify(&mut node);
        assert_eq!(lang(&node), Some("python"));

        let mut node = DocumentNode::code(Some("TXT"), "plain");
        classify(&mut node);
        assert_eq!(lang(&node), Some("TXT"));
    }

    #[test]
    fn test_code_without_value() {
        let mut node = DocumentNode::new(CODE);
        classify(&mut node);
        assert_eq!(lang(&node), None);
    }

    #[test]
    fn test_non_code_nodes_untouched_and_children_visited() {
        let mut paragraph = DocumentNode::new("paragraph");
        paragraph.lang = Some("txt".to_string());
        paragraph.value = Some("var x".to_string());
        let mut tree = DocumentNode::new("root").with_children(vec![paragraph
            .with_children(vec![DocumentNode::code(None, "function(){}")])]);

        classify(&mut tree);

        let paragraph = &tree.children[0];
        assert_eq!(lang(paragraph), Some("txt"));
        assert_eq!(paragraph.value.as_deref(), Some("var x"));
        assert_eq!(lang(&paragraph.children[0]), Some("js"));
    }

    #[test]
    fn test_visit_order_is_preorder() {
        let mut tree = DocumentNode::new("root").with_children(vec![
            DocumentNode::new("a").with_children(vec![
                DocumentNode::new("a1"),
                DocumentNode::new("a2").with_children(vec![DocumentNode::new("a2x")]),
            ]),
            DocumentNode::new("b"),
        ]);

        let mut seen = Vec::new();
        visit_mut(&mut tree, &mut |node| seen.push(node.kind.clone()));
        assert_eq!(seen, vec!["root", "a", "a1", "a2", "a2x", "b"]);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut tree = DocumentNode::new("root").with_children(vec![
            DocumentNode::code(Some("txt"), "plain notes"),
            DocumentNode::code(None, "var b;"),
            DocumentNode::code(None, "echo hi"),
            DocumentNode::code(Some("js"), "let c;"),
            DocumentNode::new("blockquote")
                .with_children(vec![DocumentNode::code(Some("txt"), "notes")]),
        ]);

        classify(&mut tree);
        let once = tree.clone();
        classify(&mut tree);
        assert_eq!(tree, once);

        let langs: Vec<_> = once.children.iter().take(4).map(lang).collect();
        assert_eq!(langs, vec![None, Some("js"), None, Some("js")]);
        assert_eq!(lang(&once.children[4].children[0]), None);
    }

    #[test]
    fn test_cleared_txt_javascript_settles_after_second_pass() {
        let mut tree =
            DocumentNode::new("root").with_children(vec![DocumentNode::code(Some("txt"), "var a;")]);

        classify(&mut tree);
        assert_eq!(lang(&tree.children[0]), None);

        classify(&mut tree);
        assert_eq!(lang(&tree.children[0]), Some("js"));

        let settled = tree.clone();
        classify(&mut tree);
        assert_eq!(tree, settled);
    }

    #[test]
    fn test_mdast_json_round_trip_keeps_unknown_fields() {
        let json = r#"{
            "type": "root",
            "children": [
                {"type": "code", "lang": null, "value": "var x;", "position": {"start": 1}},
                {"type": "heading", "depth": 2, "children": [{"type": "text", "value": "Hi"}]}
            ]
        }"#;
        let mut tree: DocumentNode = serde_json::from_str(json).unwrap();
        classify(&mut tree);

        let out = serde_json::to_value(&tree).unwrap();
        assert_eq!(out["children"][0]["lang"], "js");
        assert_eq!(out["children"][0]["position"]["start"], 1);
        assert_eq!(out["children"][1]["depth"], 2);
    }
}
