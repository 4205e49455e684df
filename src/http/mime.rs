//! Tipo MIME a partir del nombre del archivo.

use std::path::Path;

/// Tipo usado cuando la extensión no es conocida
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Infiere el `Content-type` según la extensión del archivo
///
/// ```
/// use tiny_httpd::http::content_type_for;
/// use std::path::Path;
///
/// assert_eq!(content_type_for(Path::new("www/index.html")), "text/html");
/// assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("gif") => "image/gif",
        Some("jpg") => "image/jpeg",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html");
        assert_eq!(content_type_for(Path::new("img/logo.gif")), "image/gif");
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpeg");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(content_type_for(Path::new("README")), "text/plain");
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), "text/plain");
        assert_eq!(content_type_for(Path::new("page.HTML")), "text/plain");
    }
}
