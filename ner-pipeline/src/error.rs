//! # Erros do Pipeline
//!
//! Todos os erros são fatais: não há retry nem recuperação parcial.
//! Condições "não encontrado" (um título ausente numa sentença) não são
//! erros e nunca chegam aqui.

use std::path::PathBuf;

use thiserror::Error;

/// Tipo `Result` usado em todo o crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// O caminho raiz do corpus não é arquivo nem diretório.
    #[error("Path {} is invalid", .0.display())]
    InvalidPath(PathBuf),

    /// O banco de destino já existe; nunca sobrescrevemos.
    #[error("{} already exists! Not overwriting.", .0.display())]
    DestinationExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Linha (ou arquivo) que não é um registro JSON válido.
    #[error("invalid JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// JSON inválido fora de um lote: datasets, gazetteer, colunas do banco.
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    /// `text` e `text_with_links` com tamanhos diferentes.
    #[error("document {id}: text has {text} sentences but text_with_links has {links}")]
    MisalignedRecord { id: String, text: usize, links: usize },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Violação de chave primária no banco (id repetido após normalização NFD).
    #[error("duplicate document id {0:?}")]
    DuplicateDocument(String),

    /// Erro ocorrido dentro de um lote; identifica o arquivo de origem.
    #[error("batch {}: {source}", path.display())]
    Batch {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Título do contexto ausente no NER pré-computado.
    #[error("case {guid}: title {title:?} missing from precomputed NER")]
    MissingTitle { guid: String, title: String },

    /// Número de sentenças do contexto difere do NER pré-computado.
    #[error("case {guid}: title {title:?} has {sentences} sentences but {tagged} tagged")]
    SentenceCountMismatch {
        guid: String,
        title: String,
        sentences: usize,
        tagged: usize,
    },

    #[error("unknown record filter {0:?}")]
    UnknownFilter(String),

    #[error("tagger error: {0}")]
    Tagger(String),

    /// O pool de workers não pôde ser criado.
    #[error("worker failure: {0}")]
    Worker(String),
}

impl Error {
    /// Anexa o caminho do lote ao erro.
    pub fn in_batch(self, path: impl Into<PathBuf>) -> Self {
        Error::Batch {
            path: path.into(),
            source: Box::new(self),
        }
    }

    pub fn tagger(msg: impl Into<String>) -> Self {
        Error::Tagger(msg.into())
    }
}
