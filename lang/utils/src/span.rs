use std::{fmt, path::PathBuf, sync::Arc};

/// Byte offsets of newlines in a source file, for turning offsets into
/// line/column pairs.
#[derive(Clone, Debug)]
pub struct FileInfo {
    newlines: Vec<usize>,
    path: Option<Arc<PathBuf>>,
}

impl FileInfo {
    pub fn new(s: &str, path: Option<Arc<PathBuf>>) -> Self {
        let mut newlines = vec![0];
        for (i, c) in s.char_indices() {
            if c == '\n' {
                newlines.push(i);
            }
        }
        newlines.push(s.len());
        FileInfo { newlines, path }
    }
    pub fn line_col(&self, offset: usize) -> LineCol {
        // first newline at or after the offset
        let idx = self.newlines.partition_point(|&nl| nl < offset).min(self.newlines.len() - 1);
        let start = if idx > 1 { self.newlines[idx - 1] + 1 } else { 0 };
        LineCol { line: idx.max(1), column: offset - start }
    }
    pub fn path(&self) -> PathBuf {
        self.path.as_ref().map(|p| p.to_path_buf()).unwrap_or_default()
    }
    pub fn name(&self) -> String {
        match &self.path {
            | Some(path) => path.display().to_string(),
            | None => "<input>".to_string(),
        }
    }
}

/// 1-based line, 0-based column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open byte range in some source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
    pub fn dummy() -> Self {
        Span::new(0, 0)
    }
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_col_of_offsets() {
        let info = FileInfo::new("ab\ncd\n", None);
        assert_eq!(info.line_col(0), LineCol { line: 1, column: 0 });
        assert_eq!(info.line_col(1), LineCol { line: 1, column: 1 });
        assert_eq!(info.line_col(3), LineCol { line: 2, column: 0 });
        assert_eq!(info.line_col(4), LineCol { line: 2, column: 1 });
        assert_eq!(info.name(), "<input>");
    }
}
