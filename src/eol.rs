use std::fmt;

/// Line terminator convention of a document.
///
/// Detected once when the document is read and used for every line break
/// the editor writes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eol {
    /// `\r\n`
    CrLf,
    /// `\n`
    Lf,
}

impl Eol {
    /// Picks the dominant terminator of `text`.
    ///
    /// Returns `None` if `text` has no line break at all.
    /// When both styles appear equally often, `\r\n` wins.
    pub fn detect(text: &str) -> Option<Eol> {
        let bytes = text.as_bytes();
        let mut crlf = 0usize;
        let mut lf = 0usize;
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                if i > 0 && bytes[i - 1] == b'\r' {
                    crlf += 1;
                } else {
                    lf += 1;
                }
            }
        }
        match (crlf, lf) {
            (0, 0) => None,
            (crlf, lf) if crlf >= lf => Some(Eol::CrLf),
            _ => Some(Eol::Lf),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Eol::CrLf => "\r\n",
            Eol::Lf => "\n",
        }
    }

    /// Number of lines in `text` when split on this terminator.
    ///
    /// A trailing terminator produces a last, empty line.
    pub fn line_count(&self, text: &str) -> usize {
        text.split(self.as_str()).count()
    }
}

impl Default for Eol {
    fn default() -> Eol {
        Eol::Lf
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Eol;

    #[test]
    fn test_detect() {
        assert_eq!(Eol::detect("<a>\r\n</a>\r\n"), Some(Eol::CrLf));
        assert_eq!(Eol::detect("<a>\n</a>\n"), Some(Eol::Lf));
        assert_eq!(Eol::detect("<a></a>"), None);
        // mostly LF with one stray CRLF
        assert_eq!(Eol::detect("a\nb\nc\r\nd\n"), Some(Eol::Lf));
        assert_eq!(Eol::detect("a\r\nb\n"), Some(Eol::CrLf));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(Eol::CrLf.line_count("a\r\nb\r\n"), 3);
        assert_eq!(Eol::Lf.line_count("a\nb"), 2);
        assert_eq!(Eol::CrLf.to_string(), "\r\n");
    }
}
