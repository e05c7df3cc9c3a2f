//! # Tokenizador por Fronteiras de Palavra
//!
//! Divide uma sentença em tokens usando as fronteiras de palavra do Unicode
//! (UAX #29, via `unicode-segmentation`). Espaços são descartados; pontuação
//! vira token próprio.
//!
//! Cada token preserva sua posição original **em caracteres**, pois é assim
//! que as menções de entidade são endereçadas em todo o pipeline.
//!
//! ## Exemplo
//!
//! ```rust
//! use ner_pipeline::tokenizer::tokenize;
//!
//! let tokens = tokenize("Dr. Curie moved to Paris.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["Dr.", "Curie", "moved", "to", "Paris", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Curie", ",", "Dr.").
    pub text: String,
    /// Offset de caractere inicial no texto original (inclusivo).
    pub start: usize,
    /// Offset de caractere final no texto original (exclusivo).
    pub end: usize,
}

/// Abreviações que mantêm o ponto final colado (ex: "Dr.", "St.")
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Mr", "Mrs", "Ms", "Prof", "St", "Jr", "Sr", "Gen", "Col", "Capt", "Lt", "Sgt",
    "Gov", "Sen", "Rep", "Rev", "Mt", "Ft", "Inc", "Ltd", "Co", "Corp", "vs", "etc",
];

/// Tokeniza um texto, retornando tokens com offsets em caracteres.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut char_pos = 0;

    for segment in text.split_word_bounds() {
        let len = segment.chars().count();
        let start = char_pos;
        char_pos += len;

        if segment.chars().all(char::is_whitespace) {
            continue;
        }

        // Cola o ponto na abreviação imediatamente anterior
        if segment == "." {
            if let Some(prev) = tokens.last_mut() {
                if prev.end == start && ABBREVIATIONS.contains(&prev.text.as_str()) {
                    prev.text.push('.');
                    prev.end = char_pos;
                    continue;
                }
            }
        }

        tokens.push(Token {
            text: segment.to_string(),
            start,
            end: char_pos,
        });
    }

    tokens
}
