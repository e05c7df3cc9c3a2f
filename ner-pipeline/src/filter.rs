//! # Filtros de Registro
//!
//! Um filtro recebe o documento bruto antes do tagging e devolve o documento
//! (possivelmente transformado) ou `None` para descartá-lo.
//!
//! Os filtros são registrados por nome num [`FilterRegistry`] e cada worker
//! constrói a sua própria instância na inicialização.
//!
//! | Nome                  | Efeito                                             |
//! |-----------------------|----------------------------------------------------|
//! | `identity`            | mantém tudo (comportamento sem filtro)             |
//! | `skip-disambiguation` | descarta páginas "(disambiguation)" e "List of …"  |
//! | `skip-empty`          | descarta documentos sem nenhuma sentença não vazia |

use std::collections::BTreeMap;

use crate::corpus::RawDocument;
use crate::error::{Error, Result};

/// Pré-processamento de um registro bruto.
pub trait RecordFilter {
    fn preprocess(&self, record: RawDocument) -> Option<RawDocument>;
}

/// Construtor de filtro, chamado uma vez por worker.
pub type FilterConstructor = fn() -> Box<dyn RecordFilter>;

pub struct Identity;

impl RecordFilter for Identity {
    fn preprocess(&self, record: RawDocument) -> Option<RawDocument> {
        Some(record)
    }
}

pub struct SkipDisambiguation;

impl RecordFilter for SkipDisambiguation {
    fn preprocess(&self, record: RawDocument) -> Option<RawDocument> {
        let title = record.title.trim();
        if title.ends_with("(disambiguation)") || title.starts_with("List of") {
            return None;
        }
        Some(record)
    }
}

pub struct SkipEmpty;

impl RecordFilter for SkipEmpty {
    fn preprocess(&self, record: RawDocument) -> Option<RawDocument> {
        record
            .text
            .iter()
            .any(|s| !s.trim().is_empty())
            .then_some(record)
    }
}

fn identity() -> Box<dyn RecordFilter> {
    Box::new(Identity)
}

/// Tabela nome → construtor de filtro.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    constructors: BTreeMap<String, FilterConstructor>,
}

impl FilterRegistry {
    /// Registro vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro com os filtros embutidos.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("identity", identity);
        registry.register("skip-disambiguation", || Box::new(SkipDisambiguation));
        registry.register("skip-empty", || Box::new(SkipEmpty));
        registry
    }

    /// Registra (ou substitui) um construtor sob `name`.
    pub fn register(&mut self, name: impl Into<String>, constructor: FilterConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Resolve um nome de filtro; `None` resolve para a identidade.
    pub fn resolve(&self, name: Option<&str>) -> Result<FilterConstructor> {
        match name {
            None => Ok(identity as FilterConstructor),
            Some(name) => self
                .constructors
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnknownFilter(name.to_string())),
        }
    }

    /// Nomes registrados, em ordem alfabética.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, text: &[&str]) -> RawDocument {
        RawDocument {
            id: "1".into(),
            url: "u".into(),
            title: title.into(),
            text: text.iter().map(|s| s.to_string()).collect(),
            text_with_links: text.iter().map(|s| s.to_string()).collect(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_no_filter_is_identity() {
        let registry = FilterRegistry::new();
        let filter = registry.resolve(None).unwrap()();
        let d = doc("Paris", &["Paris is a city."]);
        assert_eq!(filter.preprocess(d.clone()), Some(d));
    }

    #[test]
    fn test_builtin_filters() {
        let registry = FilterRegistry::with_builtins();
        let skip = registry.resolve(Some("skip-disambiguation")).unwrap()();
        assert!(skip.preprocess(doc("Mercury (disambiguation)", &["x"])).is_none());
        assert!(skip.preprocess(doc("List of rivers", &["x"])).is_none());
        assert!(skip.preprocess(doc("Mercury (planet)", &["x"])).is_some());

        let empty = registry.resolve(Some("skip-empty")).unwrap()();
        assert!(empty.preprocess(doc("T", &[" ", ""])).is_none());
        assert!(empty.preprocess(doc("T", &["", "body"])).is_some());
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::with_builtins();
        assert!(matches!(
            registry.resolve(Some("drop-all")),
            Err(Error::UnknownFilter(n)) if n == "drop-all"
        ));
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["identity", "skip-disambiguation", "skip-empty"]
        );
    }

    #[test]
    fn test_custom_registration() {
        struct Upper;
        impl RecordFilter for Upper {
            fn preprocess(&self, mut record: RawDocument) -> Option<RawDocument> {
                record.title = record.title.to_uppercase();
                Some(record)
            }
        }
        let mut registry = FilterRegistry::new();
        registry.register("upper", || Box::new(Upper));
        let f = registry.resolve(Some("upper")).unwrap()();
        assert_eq!(f.preprocess(doc("ada", &["a"])).unwrap().title, "ADA");
    }
}
