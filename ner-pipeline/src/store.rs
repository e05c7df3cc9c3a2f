//! # Banco de Documentos (SQLite)
//!
//! Tabela única, escrita uma vez e nunca atualizada:
//!
//! ```sql
//! CREATE TABLE documents (id PRIMARY KEY, url, title, text, text_with_links, text_ner, sent_num);
//! ```
//!
//! As colunas `text`, `text_with_links` e `text_ner` guardam JSON:
//! listas de sentenças e, para `text_ner`, uma lista de menções
//! `[texto, início, fim, rótulo]` por sentença.
//!
//! O banco é criado do zero. Se já existir algo no destino a criação falha
//! antes de qualquer escrita. A tabela é criada fora da transação de
//! inserção, então uma execução interrompida deixa um banco que abre mas não
//! tem linhas.

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use unicode_normalization::UnicodeNormalization;

use crate::corpus::RawDocument;
use crate::dataset::DocumentNer;
use crate::error::{Error, Result};
use crate::mention::EntityMention;

pub const SCHEMA: &str =
    "CREATE TABLE documents (id PRIMARY KEY, url, title, text, text_with_links, text_ner, sent_num);";

/// Normaliza o id para a decomposição canônica (NFD).
pub fn normalize_id(id: &str) -> String {
    id.nfd().collect()
}

/// Uma linha da tabela `documents`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Chave primária, já em NFD.
    pub id: String,
    pub url: String,
    pub title: String,
    pub text: Vec<String>,
    pub text_with_links: Vec<String>,
    /// Uma lista de menções por sentença de `text`.
    pub text_ner: Vec<Vec<EntityMention>>,
    pub sent_num: usize,
}

impl StoredDocument {
    /// Monta a linha a partir do documento bruto e do NER de `text`.
    pub fn from_raw(doc: RawDocument, text_ner: Vec<Vec<EntityMention>>) -> Self {
        Self {
            id: normalize_id(&doc.id),
            url: doc.url,
            title: doc.title,
            sent_num: doc.text.len(),
            text: doc.text,
            text_with_links: doc.text_with_links,
            text_ner,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }
}

/// Colunas na ordem do esquema, com os blobs ainda em JSON.
type RawRow = (String, String, String, String, String, String, i64);

fn decode_row((id, url, title, text, links, ner, sent_num): RawRow) -> Result<StoredDocument> {
    Ok(StoredDocument {
        id,
        url,
        title,
        text: serde_json::from_str(&text)?,
        text_with_links: serde_json::from_str(&links)?,
        text_ner: serde_json::from_str(&ner)?,
        sent_num: sent_num as usize,
    })
}

/// Escritor único / leitor do banco de documentos.
///
/// Criado por [`DocumentStore::create`] fica numa transação aberta até
/// [`DocumentStore::commit`]; aberto por [`DocumentStore::open`] é só leitura.
pub struct DocumentStore {
    /// Conexão SQLite; nunca compartilhada entre threads.
    conn: Connection,
}

impl DocumentStore {
    /// Cria um banco novo em `path` e abre a transação de inserção.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::DestinationExists(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch("BEGIN;")?;
        Ok(Self { conn })
    }

    /// Abre um banco existente somente para leitura.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Insere as linhas de um lote, na ordem dada.
    ///
    /// Um id repetido (neste lote ou em outro já inserido) é fatal.
    pub fn insert_batch(&mut self, docs: &[StoredDocument]) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO documents VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)")?;
        for doc in docs {
            let inserted = stmt.execute(params![
                doc.id,
                doc.url,
                doc.title,
                serde_json::to_string(&doc.text)?,
                serde_json::to_string(&doc.text_with_links)?,
                serde_json::to_string(&doc.text_ner)?,
                doc.sent_num as i64,
            ]);
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    return Err(Error::DuplicateDocument(doc.id.clone()));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Confirma a transação de inserção e fecha o banco.
    pub fn commit(self) -> Result<()> {
        self.conn.execute_batch("COMMIT;")?;
        self.conn.close().map_err(|(_, e)| Error::Store(e))
    }

    /// Número de linhas visíveis nesta conexão.
    pub fn len(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    /// `true` se a tabela não tem linhas (ex: execução interrompida).
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Todos os ids, na ordem de inserção.
    ///
    /// Linhas de um mesmo lote aparecem juntas e na ordem do arquivo.
    pub fn document_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM documents ORDER BY rowid")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    /// Busca um documento; o id é normalizado antes da consulta.
    pub fn get(&self, id: &str) -> Result<Option<StoredDocument>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, url, title, text, text_with_links, text_ner, sent_num FROM documents WHERE id = ?1",
                [normalize_id(id)],
                StoredDocument::from_row,
            )
            .optional()?;
        row.map(decode_row).transpose()
    }

    /// NER de todos os documentos, indexado pelo título.
    ///
    /// Títulos repetidos mantêm a primeira linha em ordem de id.
    pub fn export_ner(&self) -> Result<BTreeMap<String, DocumentNer>> {
        let mut stmt = self.conn.prepare("SELECT title, text_ner FROM documents ORDER BY id")?;
        let mut rows = stmt.query([])?;
        let mut out = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let title: String = row.get(0)?;
            if out.contains_key(&title) {
                continue;
            }
            let ner: String = row.get(1)?;
            out.insert(title, DocumentNer { text_ner: serde_json::from_str(&ner)? });
        }
        Ok(out)
    }
}
