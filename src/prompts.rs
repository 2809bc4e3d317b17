//! Prompt and structured-output schema for magazine extraction.
//!
//! Centralising these here serves two purposes:
//!
//! 1. **Single source of truth** — the monetization rules, teaser behaviour,
//!    and column semantics are defined once, and the JSON schema sent as
//!    `responseSchema` mirrors [`crate::model`] field for field.
//!
//! 2. **Testability** — unit tests can inspect the prompt and schema without
//!    a live model call, so a renamed field breaks a test instead of
//!    silently producing unparsable responses.
//!
//! The prompt is in Portuguese, matching the publishing workflow this tool
//! grew out of; the model answers in the magazine's own language regardless.
//! Callers can override it via [`crate::config::AnalysisConfig::system_prompt`].

use serde_json::{json, Value};

/// Default system instruction: the "Analista de Layout e Conteúdo Digital"
/// persona, output-format contract, and monetization rules.
pub const SYSTEM_PROMPT: &str = r#"Você é o Analista de Layout e Conteúdo Digital (ALCD) de uma editora de revistas, especializado em engenharia reversa de layout de impressão.

Sua única saída deve ser um único bloco de código JSON totalmente formatado, sem nenhum texto explicativo, introdução ou conclusão. O JSON deve estar pronto para ser consumido por um aplicativo.

O JSON deve conter os dados de metadados da revista e uma lista de páginas. O formato rigoroso a ser seguido é este:

{
  "meta_revista": {
    "titulo": "Título Identificado da Revista",
    "edicao": "Mês e Ano (Ex: Junho 2025)",
    "idioma": "Idioma Principal do Conteúdo"
  },
  "paginas": [
    {
      "numero_pagina": "[Número da página]",
      "tipo_layout": "Capa / Índice / Editorial / Artigo Principal / Anúncio",
      "status_monetizacao": "gratis / premium_assinatura",
      "elementos": [
        {
          "tipo": "Titulo Principal / Subtítulo / Parágrafo de Texto / Imagem / Anúncio",
          "texto": "Conteúdo de texto extraído. Se for imagem ou anúncio, esta é a legenda ou descrição.",
          "coluna": "[1, 2 ou 3]",
          "coordenadas_aproximadas": "Ex: Superior Central, Rodapé Esquerdo, Coluna 2 Meio",
          "estilo_fonte": "Ex: Serif Negrito, Corpo Normal, Itálico",
          "teaser_gratuito": "APENAS SE 'status_monetizacao' FOR 'premium_assinatura', inclua aqui os 3 primeiros parágrafos do artigo como isca para o paywall. Caso contrário, deixe este campo vazio.",
          "nivel_hierarquico": "[1 para títulos principais, 2 para subtítulos, 3 para texto de corpo]"
        }
      ]
    }
  ]
}

Diretrizes de Editoração e Monetização:
Fidelidade Visual: Analise e mapeie o layout exatamente. Identifique o número de colunas usado na página (1, 2 ou 3) e atribua cada elemento à sua coluna correta.
Atribuição de status_monetizacao:
- Defina a Capa, Editorial e as primeiras 1-2 páginas de conteúdo como "gratis".
- Defina todos os artigos completos subsequentes como "premium_assinatura".
Geração do teaser_gratuito: Para qualquer artigo classificado como "premium_assinatura", garanta que o primeiro elemento de texto tenha o campo teaser_gratuito preenchido com os primeiros três parágrafos do artigo, fornecendo o conteúdo que aparecerá antes do paywall.
Coordenadas: Use termos descritivos de layout (e.g., "Superior Esquerdo", "Centro da Página", "Coluna 1") no campo coordenadas_aproximadas.
"#;

/// The single user turn accompanying the PDF attachment.
pub const USER_INSTRUCTION: &str =
    "Gere o JSON de editoração para o PDF carregado, seguindo as regras de monetização.";

/// Structured-output schema mirroring the `Magazine` shape.
///
/// Every leaf is typed as STRING on purpose: the upstream schema has always
/// been all-text and [`crate::model`] owns the tolerant numeric fallbacks.
/// Sent as `generationConfig.responseSchema`; the model is asked, not
/// guaranteed, to comply — [`crate::model::Magazine::from_model_json`] is the
/// enforcement point.
pub fn magazine_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "meta_revista": {
                "type": "OBJECT",
                "properties": {
                    "titulo": { "type": "STRING", "description": "Título Identificado da Revista" },
                    "edicao": { "type": "STRING", "description": "Mês e Ano (Ex: Junho 2025)" },
                    "idioma": { "type": "STRING", "description": "Idioma Principal do Conteúdo" }
                }
            },
            "paginas": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "numero_pagina": { "type": "STRING", "description": "Número da página" },
                        "tipo_layout": { "type": "STRING", "description": "Capa / Índice / Editorial / Artigo Principal / Anúncio" },
                        "status_monetizacao": { "type": "STRING", "description": "gratis / premium_assinatura" },
                        "elementos": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "tipo": { "type": "STRING", "description": "Titulo Principal / Subtítulo / Parágrafo de Texto / Imagem / Anúncio" },
                                    "texto": { "type": "STRING", "description": "Conteúdo de texto extraído. Se for imagem ou anúncio, esta é a legenda ou descrição." },
                                    "coluna": { "type": "STRING", "description": "[1, 2 ou 3]" },
                                    "coordenadas_aproximadas": { "type": "STRING", "description": "Ex: Superior Central, Rodapé Esquerdo, Coluna 2 Meio" },
                                    "estilo_fonte": { "type": "STRING", "description": "Ex: Serif Negrito, Corpo Normal, Itálico" },
                                    "teaser_gratuito": { "type": "STRING", "description": "APENAS SE 'status_monetizacao' FOR 'premium_assinatura', inclua aqui os 3 primeiros parágrafos do artigo como isca para o paywall. Caso contrário, deixe este campo vazio." },
                                    "nivel_hierarquico": { "type": "STRING", "description": "[1 para títulos principais, 2 para subtítulos, 3 para texto de corpo]" }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_states_monetization_rules() {
        assert!(SYSTEM_PROMPT.contains("premium_assinatura"));
        assert!(SYSTEM_PROMPT.contains("teaser_gratuito"));
        assert!(SYSTEM_PROMPT.contains("coluna"));
    }

    #[test]
    fn schema_mirrors_model_wire_names() {
        let schema = magazine_response_schema();
        let element_props = &schema["properties"]["paginas"]["items"]["properties"]["elementos"]
            ["items"]["properties"];
        for field in [
            "tipo",
            "texto",
            "coluna",
            "coordenadas_aproximadas",
            "estilo_fonte",
            "teaser_gratuito",
            "nivel_hierarquico",
        ] {
            assert_eq!(
                element_props[field]["type"], "STRING",
                "missing or mistyped schema field {field}"
            );
        }
        assert_eq!(
            schema["properties"]["meta_revista"]["properties"]["titulo"]["type"],
            "STRING"
        );
    }
}
