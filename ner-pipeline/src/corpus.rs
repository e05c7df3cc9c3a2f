//! # Leitura do Corpus
//!
//! O corpus é um arquivo ou uma árvore de diretórios. Cada arquivo é um
//! **lote**: um fluxo bzip2 com um documento JSON por linha.
//!
//! ```json
//! {"id": "12", "url": "https://...", "title": "Anarchism",
//!  "text": ["Anarchism is ...", "..."], "text_with_links": ["...", "..."]}
//! ```
//!
//! Uma linha que não é um registro válido derruba o lote inteiro; nada é
//! descartado em silêncio.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Um documento bruto, como aparece no lote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub url: String,
    pub title: String,
    /// Sentenças em texto puro.
    pub text: Vec<String>,
    /// As mesmas sentenças com marcação de links, alinhadas a `text`.
    pub text_with_links: Vec<String>,
    /// Campos adicionais do registro, preservados para os filtros.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawDocument {
    /// Garante que `text` e `text_with_links` têm o mesmo número de sentenças.
    pub fn check_aligned(&self) -> Result<()> {
        if self.text.len() != self.text_with_links.len() {
            return Err(Error::MisalignedRecord {
                id: self.id.clone(),
                text: self.text.len(),
                links: self.text_with_links.len(),
            });
        }
        Ok(())
    }
}

/// Enumera os lotes sob uma raiz.
///
/// `files()` pode ser chamado de novo a qualquer momento e refaz a varredura
/// do zero; não há retomada no meio do caminho.
#[derive(Debug, Clone)]
pub struct CorpusReader {
    root: PathBuf,
}

impl CorpusReader {
    /// Falha com [`Error::InvalidPath`] se `root` não é arquivo nem diretório.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_file() && !root.is_dir() {
            return Err(Error::InvalidPath(root));
        }
        Ok(Self { root })
    }

    /// Raiz informada na construção.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sequência preguiçosa dos arquivos de lote.
    pub fn files(&self) -> impl Iterator<Item = Result<PathBuf>> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_dir() => None,
                Ok(e) => Some(Ok(e.into_path())),
                Err(e) => Some(Err(Error::Io(e.into()))),
            })
    }
}

/// Decodifica um lote bzip2 do disco.
pub fn read_batch(path: &Path) -> Result<Vec<RawDocument>> {
    let file = File::open(path)?;
    parse_batch(BufReader::new(MultiBzDecoder::new(file)))
}

/// Lê um documento JSON por linha.
///
/// Toda linha precisa ser um registro; uma linha em branco também derruba o
/// lote. Só a quebra de linha final do fluxo não conta como linha.
pub fn parse_batch<R: BufRead>(reader: R) -> Result<Vec<RawDocument>> {
    let mut documents = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let doc = serde_json::from_str(&line).map_err(|source| Error::Json { line: i + 1, source })?;
        documents.push(doc);
    }
    Ok(documents)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    use bzip2::write::BzEncoder;
    use bzip2::Compression;

    /// Escreve um lote bzip2 com as linhas dadas.
    pub(crate) fn write_batch(path: &Path, lines: &[String]) {
        let file = File::create(path).unwrap();
        let mut enc = BzEncoder::new(file, Compression::fast());
        for line in lines {
            writeln!(enc, "{line}").unwrap();
        }
        enc.finish().unwrap();
    }

    pub(crate) fn doc_line(id: &str, title: &str, sentences: &[&str]) -> String {
        serde_json::json!({
            "id": id,
            "url": format!("https://en.wikipedia.org/wiki?curid={id}"),
            "title": title,
            "text": sentences,
            "text_with_links": sentences,
        })
        .to_string()
    }

    #[test]
    fn test_invalid_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(CorpusReader::new(&missing), Err(Error::InvalidPath(p)) if p == missing));
    }

    #[test]
    fn test_single_file_and_recursive_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("AA").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        write_batch(&dir.path().join("AA").join("wiki_00.bz2"), &[]);
        write_batch(&nested.join("wiki_01.bz2"), &[]);

        let reader = CorpusReader::new(dir.path()).unwrap();
        let files: Vec<PathBuf> = reader.files().collect::<Result<_>>().unwrap();
        assert_eq!(files.len(), 2);
        // rescan produz a mesma sequência
        let again: Vec<PathBuf> = reader.files().collect::<Result<_>>().unwrap();
        assert_eq!(files, again);

        let single = CorpusReader::new(&files[0]).unwrap();
        assert_eq!(single.files().count(), 1);
    }

    #[test]
    fn test_read_batch_roundtrip_keeps_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki_00.bz2");
        let mut line: serde_json::Value =
            serde_json::from_str(&doc_line("1", "Ada Lovelace", &["Ada wrote notes."])).unwrap();
        line["charoffset"] = serde_json::json!([[0, 3]]);
        write_batch(&path, &[line.to_string()]);

        let docs = read_batch(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Ada Lovelace");
        assert_eq!(docs[0].text, vec!["Ada wrote notes.".to_string()]);
        assert!(docs[0].extra.contains_key("charoffset"));
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let input = format!("{}\n{{not json\n", doc_line("1", "A", &["a"]));
        let err = parse_batch(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Json { line: 2, .. }));
    }

    #[test]
    fn test_blank_line_is_fatal() {
        let input = format!("{}\n\n{}\n", doc_line("1", "A", &["a"]), doc_line("2", "B", &["b"]));
        assert!(matches!(parse_batch(input.as_bytes()), Err(Error::Json { line: 2, .. })));

        let input = format!("{}\n   \n", doc_line("1", "A", &["a"]));
        assert!(matches!(parse_batch(input.as_bytes()), Err(Error::Json { line: 2, .. })));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let input = r#"{"id": "1", "url": "u", "title": "t", "text": ["a"]}"#;
        assert!(matches!(parse_batch(input.as_bytes()), Err(Error::Json { line: 1, .. })));
    }

    #[test]
    fn test_check_aligned() {
        let mut doc: RawDocument = serde_json::from_str(&doc_line("7", "T", &["a", "b"])).unwrap();
        assert!(doc.check_aligned().is_ok());
        doc.text_with_links.pop();
        assert!(matches!(
            doc.check_aligned(),
            Err(Error::MisalignedRecord { text: 2, links: 1, .. })
        ));
    }
}
