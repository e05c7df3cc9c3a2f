//! # Dataset de Perguntas e NER Pré-computado
//!
//! Entradas do estágio de alinhamento:
//!
//! - **Casos** (`[{"_id", "question", "context": [[título, [sentenças]]]}]`).
//! - **NER pré-computado** (`{título: {"text_ner": [[menção, ...], ...]}}`),
//!   normalmente exportado do banco de documentos por
//!   [`DocumentStore::export_ner`](crate::store::DocumentStore::export_ner).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mention::EntityMention;

/// Uma pergunta com seus documentos de contexto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCase {
    #[serde(rename = "_id")]
    pub guid: String,
    pub question: String,
    /// Pares (título, sentenças). Títulos são únicos dentro do caso.
    pub context: Vec<(String, Vec<String>)>,
}

impl QuestionCase {
    /// Títulos do contexto, na ordem do caso.
    pub fn titles(&self) -> Vec<&str> {
        self.context.iter().map(|(title, _)| title.as_str()).collect()
    }
}

/// Entidades por sentença de um documento.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentNer {
    pub text_ner: Vec<Vec<EntityMention>>,
}

/// NER pré-computado, indexado pelo título do documento.
pub type NerIndex = HashMap<String, DocumentNer>;

/// Lê a lista de casos de um arquivo JSON.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<QuestionCase>> {
    read_json(path)
}

/// Lê o NER pré-computado `{título: {"text_ner": ...}}`.
pub fn load_ner(path: impl AsRef<Path>) -> Result<NerIndex> {
    read_json(path)
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Grava `value` como JSON compacto em `path`.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(&mut out, value)?;
    out.flush()?;
    Ok(())
}
