use super::NodeDisplay;
use crate::types::analysis::{SentenceAnalysis, SyntacticElement};

/// Plain-text rendering for the terminal: sentence, classification, then an
/// indented tree. Branches print their label, leaves their text and label.
pub fn render_text_tree(analysis: &SentenceAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!("Oración analizada: {}\n", analysis.full_sentence));
    out.push_str(&format!("Clasificación: {}\n", analysis.classification));
    out.push_str("Estructura sintáctica:\n");
    out.push_str(&render_forest(&analysis.structure));
    out
}

pub fn render_forest(elements: &[SyntacticElement]) -> String {
    let mut out = String::new();
    for (index, element) in elements.iter().enumerate() {
        write_node(&mut out, element, "", index + 1 == elements.len());
    }
    out
}

fn write_node(out: &mut String, element: &SyntacticElement, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    let display = NodeDisplay::for_element(element);
    if display.show_text {
        out.push_str(&format!("{}{}\"{}\" ({})\n", prefix, connector, element.text, element.label));
    } else {
        out.push_str(&format!("{}{}[{}]\n", prefix, connector, element.label));
    }

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    let children = element.children();
    for (index, child) in children.iter().enumerate() {
        write_node(out, child, &child_prefix, index + 1 == children.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_branches_by_label_and_leaves_by_text() {
        let structure = vec![
            SyntacticElement::branch("Juan", "SN Sujeto", vec![SyntacticElement::leaf("Juan", "N (N)")]),
            SyntacticElement::branch(
                "come manzanas",
                "SV - Predicado verbal",
                vec![
                    SyntacticElement::leaf("come", "V (N)"),
                    SyntacticElement::branch("manzanas", "SN - CD", vec![SyntacticElement::leaf("manzanas", "N (N)")]),
                ],
            ),
        ];
        let expected = "\
├── [SN Sujeto]
│   └── \"Juan\" (N (N))
└── [SV - Predicado verbal]
    ├── \"come\" (V (N))
    └── [SN - CD]
        └── \"manzanas\" (N (N))
";
        assert_eq!(render_forest(&structure), expected);
    }

    #[test]
    fn header_lines_come_first() {
        let analysis = SentenceAnalysis {
            full_sentence: "Llueve".to_string(),
            classification: "Oración impersonal".to_string(),
            structure: vec![SyntacticElement::leaf("Llueve", "V (N)")],
        };
        let rendered = render_text_tree(&analysis);
        assert!(rendered.starts_with("Oración analizada: Llueve\nClasificación: Oración impersonal\n"));
        assert!(rendered.ends_with("└── \"Llueve\" (V (N))\n"));
    }
}
