//! Display rules for the syntactic tree, shared by the egui widget and the
//! text renderer.

pub mod export;
pub mod text_render;

pub use text_render::render_text_tree;

use crate::types::analysis::{count_nodes, SyntacticElement};

/// Coarse grouping of the free-text label, used only for colouring. Labels
/// outside the known prefixes fall into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelCategory {
    Subject,
    Predicate,
    Clause,
    Nexus,
    Nucleus,
    Complement,
    Phrase,
    Other,
}

impl LabelCategory {
    pub fn of(label: &str) -> Self {
        let label = label.trim();
        if label.starts_with("SN Sujeto") || label == "ST" {
            Self::Subject
        } else if label.starts_with("SV") {
            Self::Predicate
        } else if label.starts_with("Oración") || label.starts_with("Prop") {
            Self::Clause
        } else if label.eq_ignore_ascii_case("nx") || label.to_lowercase().starts_with("nx ") {
            Self::Nexus
        } else if label.contains("(N)") {
            Self::Nucleus
        } else if label.contains(" - ") {
            Self::Complement
        } else if label.starts_with('S') {
            Self::Phrase
        } else {
            Self::Other
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Subject => (96, 165, 250),     // blue-400
            Self::Predicate => (52, 211, 153),   // emerald-400
            Self::Clause => (244, 114, 182),     // pink-400
            Self::Nexus => (251, 191, 36),       // amber-400
            Self::Nucleus => (248, 113, 113),    // red-400
            Self::Complement => (167, 139, 250), // violet-400
            Self::Phrase => (45, 212, 191),      // teal-400
            Self::Other => (203, 213, 225),      // slate-300
        }
    }
}

/// Phrases (`S...`) and clauses (`Oración...`, `Prop...`) get a scope line
/// under their span.
pub fn is_phrase_or_clause(label: &str) -> bool {
    label.to_uppercase().starts_with('S') || label.starts_with("Oración") || label.starts_with("Prop")
}

/// How one node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDisplay {
    /// Leaves show their text above the label; branches show their children
    /// instead.
    pub show_text: bool,
    pub show_scope_line: bool,
    pub category: LabelCategory,
}

impl NodeDisplay {
    pub fn for_element(element: &SyntacticElement) -> Self {
        Self {
            show_text: element.is_leaf(),
            show_scope_line: is_phrase_or_clause(&element.label),
            category: LabelCategory::of(&element.label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Normal,
    Compact,
    SuperCompact,
}

impl Density {
    /// Bigger trees are drawn smaller so they still fit on screen.
    pub fn for_node_count(total_nodes: usize) -> Self {
        if total_nodes >= 30 {
            Self::SuperCompact
        } else if total_nodes >= 15 {
            Self::Compact
        } else {
            Self::Normal
        }
    }

    pub fn for_structure(structure: &[SyntacticElement]) -> Self {
        Self::for_node_count(count_nodes(structure))
    }

    pub fn metrics(self) -> DensityMetrics {
        match self {
            Self::Normal => DensityMetrics {
                text_size: 14.0,
                label_size: 11.0,
                node_padding: 4.0,
                node_spacing: 4.0,
                min_node_width: 75.0,
                text_max_width: 100.0,
                root_gap: 4.0,
            },
            Self::Compact => DensityMetrics {
                text_size: 12.0,
                label_size: 10.0,
                node_padding: 2.0,
                node_spacing: 2.0,
                min_node_width: 60.0,
                text_max_width: 90.0,
                root_gap: 2.0,
            },
            Self::SuperCompact => DensityMetrics {
                text_size: 8.0,
                label_size: 7.0,
                node_padding: 1.0,
                node_spacing: 1.0,
                min_node_width: 30.0,
                text_max_width: 50.0,
                root_gap: 1.0,
            },
        }
    }
}

/// Sizes in points for one density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityMetrics {
    pub text_size: f32,
    pub label_size: f32,
    pub node_padding: f32,
    pub node_spacing: f32,
    pub min_node_width: f32,
    pub text_max_width: f32,
    pub root_gap: f32,
}
