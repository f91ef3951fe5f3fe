use serde::{Deserialize, Serialize};

/// One constituent of the syntactic tree.
///
/// `children` is `None` (or an empty vec) for leaves. Only the validator in
/// `parsing::response_parser` builds these from model output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntacticElement {
    pub text: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SyntacticElement>>,
}

impl SyntacticElement {
    pub fn leaf(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self { text: text.into(), label: label.into(), children: None }
    }

    pub fn branch(
        text: impl Into<String>,
        label: impl Into<String>,
        children: Vec<SyntacticElement>,
    ) -> Self {
        Self { text: text.into(), label: label.into(), children: Some(children) }
    }

    pub fn children(&self) -> &[SyntacticElement] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        !self.has_children()
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + count_nodes(self.children())
    }

    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(SyntacticElement::depth).max().unwrap_or(0)
    }
}

/// Total node count over a forest of top-level constituents.
pub fn count_nodes(elements: &[SyntacticElement]) -> usize {
    elements.iter().map(SyntacticElement::node_count).sum()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SentenceAnalysis {
    pub full_sentence: String,
    pub classification: String,
    pub structure: Vec<SyntacticElement>,
}

impl SentenceAnalysis {
    pub fn node_count(&self) -> usize {
        count_nodes(&self.structure)
    }

    pub fn top_level_labels(&self) -> Vec<&str> {
        self.structure.iter().map(|el| el.label.as_str()).collect()
    }
}
