//! Prompt templates sent to the model. The rule block is shared between
//! analysis requests so every tree follows the same tagging convention.

pub const ONE_SHOT_EXAMPLE: &str = r#"
Ejemplo de formato JSON esperado para la oración "Juan come manzanas":
{
  "fullSentence": "Juan come manzanas",
  "classification": "Oración simple, predicativa, activa, transitiva",
  "structure": [
    {
      "text": "Juan",
      "label": "SN Sujeto",
      "children": [
        { "text": "Juan", "label": "N (N)" }
      ]
    },
    {
      "text": "come manzanas",
      "label": "SV - Predicado verbal",
      "children": [
        { "text": "come", "label": "V (N)" },
        {
          "text": "manzanas",
          "label": "SN - CD",
          "children": [
             { "text": "manzanas", "label": "N (N)" }
          ]
        }
      ]
    }
  ]
}
"#;

const RULES_HEADER: &str = r#"
**OBJETIVO GENERAL:**
Producir un árbol sintáctico que refleje la estructura gramatical según la NGLE.
**REGLA VISUAL IMPORTANTE:** En el nivel más alto (la base del árbol), el Sujeto y el Predicado deben estar al mismo nivel jerárquico en el array 'structure'.

**FORMATO JSON REQUERIDO:**
El objeto raíz debe tener:
- 'fullSentence': La oración completa (si generas una, ponla aquí).
- 'classification': Clasificación detallada de la oración.
- 'structure': Un array de elementos sintácticos (objetos con 'text', 'label' y opcionalmente 'children' recursivos).
"#;

const LABEL_GUIDE: &str = r#"
**GUÍA DE ETIQUETAS (NGLE):**

1.  **Nivel Oracional Principal:**
    *   'SN Sujeto': Sintagma Nominal Sujeto activo (SOLO si es un Sintagma Nominal estándar).
    *   'SN Sujeto paciente': Usar OBLIGATORIAMENTE si la oración es PASIVA (perifrástica con ser + participio) o PASIVA REFLEJA (con 'se' y concordancia).
    *   **SI EL SUJETO ES UNA ORACIÓN SUBORDINADA RELATIVA (Libre/Semilibre):** NO USAR 'SN Sujeto'. Usar directamente la etiqueta de la oración (ej: 'Oración - Subordinada Relativa Semilibre de Sujeto').
    *   'SV - Predicado verbal' o 'SV - Predicado nominal'.
    *   'ST': Sujeto Tácito.

2.  **Sintagmas y Núcleos:**
    *   'SN', 'SAdj', 'SAdv', 'SPrep'.
    *   Núcleos: 'N (N)', 'V (N)', 'Adj (N)', 'Adv (N)', 'Prep (N)'.
    *   'Det', 'nx' (nexo), 'Pron', 'Interj'.

3.  **Funciones:**
    *   'SN - CD', 'SN - CI', 'SN - Atrib', 'SN - CPred'.
    *   'SPrep - CD', 'SPrep - CI', 'SPrep - CRég', 'SPrep - CAg', 'SPrep - CN', 'SPrep - CAdj', 'SPrep - CAdv'.
    *   'SPrep - CC de [Lugar/Tiempo/Modo/etc.]'.

4.  **Oraciones Complejas (Subordinadas):**

    *   **Subordinadas Sustantivas:**
        *   'Oración - Subordinada Sustantiva de Sujeto', '... de CD', '... de Término', etc.

    *   **Subordinadas Relativas con Antecedente:**
        *   Etiqueta: 'Oración - Subordinada Relativa Especificativa (CN)' o 'Explicativa (CN)'.
        *   Deben ser hijas del SN antecedente.

    *   **Subordinadas Relativas LIBRES y SEMILIBRES (Sin antecedente):**
        *   **REGLA CRÍTICA (Sujeto):** Si funcionan como SUJETO, **NO las incluyas dentro de un nodo 'SN Sujeto'**. El nodo 'Oración - Subordinada Relativa Semilibre de Sujeto' (o Libre) debe ser hermano directo del 'SV - Predicado'.
        *   Estructura Libre (quien, donde...): 'Oración - Subordinada Relativa Libre de [Función]'.
        *   Estructura Semilibre (el que, la que, lo que...): 'Oración - Subordinada Relativa Semilibre de [Función]'.
        *   Ejemplo Sujeto: "Quien canta su mal espanta".
            *   Hijo 1: "Quien canta" -> 'Oración - Subordinada Relativa Libre de Sujeto' (NO dentro de SN).
            *   Hijo 2: "su mal espanta" -> 'SV - Predicado verbal'.

    *   **Subordinadas Construcciones (Antes Adverbiales):**
        *   Se denominan 'Construcciones' en la NGLE.
        *   **UBICACIÓN:** Deben estar SIEMPRE DENTRO del 'SV - Predicado verbal'.
        *   **Tipos:**
            *   'Oración - Subordinada Construcción de Tiempo' (o Temporal).
            *   'Oración - Subordinada Construcción de Lugar' (o Locativa).
            *   'Oración - Subordinada Construcción de Modo' (o Modal).
            *   'Oración - Subordinada Construcción Causal'.
            *   'Oración - Subordinada Construcción Final'.
            *   'Oración - Subordinada Construcción Condicional'.
            *   'Oración - Subordinada Construcción Concesiva'.
            *   'Oración - Subordinada Construcción Consecutiva' (Bimembre: cuantificador en principal + coda consecutiva).
            *   'Oración - Subordinada Construcción Comparativa' (Bimembre: cuantificador en principal + coda comparativa).
            *   'Oración - Subordinada Construcción Ilativa'.
        *   **Estructura:**
            *   El nexo ('nx') va DENTRO de la subordinada, como primer hijo.
            *   El resto es el predicado o estructura interna de la construcción.
            *   Si es bimembre (Comparativa/Consecutiva), el nexo (que, como) introduce el segundo segmento (la coda).

    *   **Subordinadas Superlativas:**
        *   'Oración - Subordinada Superlativa'. Estructura relativa compleja asociada a cuantificadores.

Proporciona SOLO el objeto JSON.
"#;

/// Header, one-shot example and label guide, in that order.
pub fn analysis_rules() -> String {
    format!("{}\n{}\n{}", RULES_HEADER, ONE_SHOT_EXAMPLE, LABEL_GUIDE)
}

pub fn analysis_prompt(sentence: &str) -> String {
    format!(
        "\nAnaliza sintácticamente la siguiente oración en español según los principios de la Nueva Gramática de la Lengua Española (NGLE) y proporciona la estructura en formato JSON. La oración es: '{}'.\n\n{}\n",
        sentence,
        analysis_rules()
    )
}

pub fn generation_prompt(criteria: &str) -> String {
    format!(
        r#"
Actúa como un experto profesor de lengua española.
Tu tarea es GENERAR UNA (1) oración en español natural y gramaticalmente correcta que cumpla estrictamente con los siguientes requisitos: "{}".

IMPORTANTE:
- Devuelve SOLAMENTE el texto de la oración.
- NO incluyas comillas, ni introducciones tipo "Aquí tienes la oración:", ni explicaciones.
- El texto debe estar listo para ser copiado y pegado en un analizador sintáctico.
"#,
        criteria
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::decode_analysis;

    #[test]
    fn analysis_prompt_embeds_sentence_and_rules() {
        let prompt = analysis_prompt("El perro ladra");
        assert!(prompt.contains("La oración es: 'El perro ladra'."));
        assert!(prompt.contains("GUÍA DE ETIQUETAS"));
        assert!(prompt.trim_end().ends_with("Proporciona SOLO el objeto JSON."));
    }

    #[test]
    fn one_shot_example_is_itself_a_valid_analysis() {
        let body = ONE_SHOT_EXAMPLE.split_once(':').map(|(_, json)| json).unwrap_or_default();
        let analysis = decode_analysis(body).unwrap();
        assert_eq!(analysis.full_sentence, "Juan come manzanas");
    }

    #[test]
    fn generation_prompt_quotes_the_criteria() {
        let prompt = generation_prompt("Oración condicional con verbo en subjuntivo");
        assert!(prompt.contains("requisitos: \"Oración condicional con verbo en subjuntivo\"."));
        assert!(prompt.contains("SOLAMENTE el texto de la oración"));
    }
}
