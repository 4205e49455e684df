//! # Resolución de Targets
//! src/router/mod.rs
//!
//! Traduce el target de la request line a un recurso del árbol de
//! documentos.
//!
//! ```text
//! /                    → static   <root>/index.html
//! /docs/page.html      → static   <root>/docs/page.html
//! /cgi-bin/adder?1&2   → dynamic  <cgi_root>/cgi-bin/adder   args "1&2"
//! ```
//!
//! Cualquier target con un segmento `cgi-bin` es dinámico.

use crate::error::HandlerError;
use std::path::PathBuf;

/// Segmento que marca recursos ejecutables
pub const CGI_SEGMENT: &str = "cgi-bin";

/// Archivo servido cuando el target termina en `/`
pub const DEFAULT_INDEX: &str = "index.html";

/// Clasificación del recurso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Archivo servido tal cual
    Static,
    /// Salida de un ejecutable
    Dynamic,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Static => "static",
            ResourceKind::Dynamic => "dynamic",
        }
    }
}

/// Recurso resuelto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    /// Parte de ruta del target, sin argumentos (ej: `/cgi-bin/foo`)
    pub path: String,
    /// Ruta en disco
    pub filename: PathBuf,
    /// Lo que sigue a `?` en un target dinámico
    pub args: String,
}

/// Árbol de documentos: raíz estática y raíz de ejecutables
#[derive(Debug, Clone)]
pub struct DocumentTree {
    root: PathBuf,
    cgi_root: PathBuf,
}

impl DocumentTree {
    pub fn new(root: impl Into<PathBuf>, cgi_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cgi_root: cgi_root.into(),
        }
    }

    /// Resuelve un target a un recurso estático o dinámico
    ///
    /// # Errores
    ///
    /// `Forbidden` si el target tiene un segmento `..`.
    ///
    /// # Ejemplo
    /// ```
    /// use tiny_httpd::router::{DocumentTree, ResourceKind};
    ///
    /// let tree = DocumentTree::new("www", ".");
    /// let res = tree.resolve("/cgi-bin/foo?x=1").unwrap();
    /// assert_eq!(res.kind, ResourceKind::Dynamic);
    /// assert_eq!(res.path, "/cgi-bin/foo");
    /// assert_eq!(res.args, "x=1");
    /// ```
    pub fn resolve(&self, target: &str) -> Result<Resource, HandlerError> {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        if path.split('/').any(|segment| segment == "..") {
            return Err(HandlerError::Forbidden(target.to_string()));
        }

        let relative = path.trim_start_matches('/');

        if path.split('/').any(|segment| segment == CGI_SEGMENT) {
            return Ok(Resource {
                kind: ResourceKind::Dynamic,
                path: path.to_string(),
                filename: self.cgi_root.join(relative),
                args: query.to_string(),
            });
        }

        let mut filename = self.root.join(relative);
        if path.ends_with('/') {
            filename.push(DEFAULT_INDEX);
        }

        Ok(Resource {
            kind: ResourceKind::Static,
            path: path.to_string(),
            filename,
            args: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> DocumentTree {
        DocumentTree::new("/srv/www", "/srv/app")
    }

    #[test]
    fn test_root_maps_to_index() {
        let res = tree().resolve("/").unwrap();
        assert_eq!(res.kind, ResourceKind::Static);
        assert_eq!(res.filename, PathBuf::from("/srv/www/index.html"));
    }

    #[test]
    fn test_plain_file_is_static() {
        let res = tree().resolve("/index.html").unwrap();
        assert_eq!(res.kind, ResourceKind::Static);
        assert_eq!(res.filename, PathBuf::from("/srv/www/index.html"));
        assert!(res.args.is_empty());
    }

    #[test]
    fn test_subdirectory_index() {
        let res = tree().resolve("/docs/").unwrap();
        assert_eq!(res.filename, PathBuf::from("/srv/www/docs/index.html"));
    }

    #[test]
    fn test_cgi_with_args() {
        let res = tree().resolve("/cgi-bin/foo?x=1").unwrap();
        assert_eq!(res.kind, ResourceKind::Dynamic);
        assert_eq!(res.path, "/cgi-bin/foo");
        assert_eq!(res.args, "x=1");
        assert_eq!(res.filename, PathBuf::from("/srv/app/cgi-bin/foo"));
    }

    #[test]
    fn test_cgi_without_args() {
        let res = tree().resolve("/cgi-bin/foo").unwrap();
        assert_eq!(res.kind, ResourceKind::Dynamic);
        assert_eq!(res.args, "");
    }

    #[test]
    fn test_cgi_args_keep_later_question_marks() {
        let res = tree().resolve("/cgi-bin/foo?a=1?b=2").unwrap();
        assert_eq!(res.args, "a=1?b=2");
    }

    #[test]
    fn test_cgi_lookalike_is_static() {
        let res = tree().resolve("/cgi-bin-docs/readme.txt").unwrap();
        assert_eq!(res.kind, ResourceKind::Static);
    }

    #[test]
    fn test_static_query_is_dropped() {
        let res = tree().resolve("/page.html?v=2").unwrap();
        assert_eq!(res.filename, PathBuf::from("/srv/www/page.html"));
        assert!(res.args.is_empty());
    }

    #[test]
    fn test_parent_segment_forbidden() {
        assert!(matches!(tree().resolve("/../etc/passwd"), Err(HandlerError::Forbidden(_))));
        assert!(matches!(tree().resolve("/cgi-bin/../../bin/sh"), Err(HandlerError::Forbidden(_))));
    }
}
