//! Line Buffer
//!
//! Accumulates `(depth, text)` records. Depth is relative to the buffer,
//! so a fragment can be rendered once and spliced under any parent: the
//! splice offsets each record by the parent's current depth.

/// Indentation emitted per nesting level
pub const INDENT_UNIT: &str = "  ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    depth: usize,
    records: Vec<(usize, String)>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current depth
    pub fn write_line(&mut self, text: impl Into<String>) {
        self.records.push((self.depth, text.into()));
    }

    /// Append several lines at the current depth
    pub fn write_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.write_line(line);
        }
    }

    /// Append `// ` comment lines
    pub fn write_comments(&mut self, lines: &[String]) {
        for line in lines {
            if line.is_empty() {
                self.write_line("//");
            } else {
                self.write_line(format!("// {}", line));
            }
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current depth for subsequently written lines
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Copy another buffer's records in, shifted by the current depth
    pub fn splice(&mut self, other: &LineBuffer) {
        let offset = self.depth;
        self.records.extend(
            other
                .records
                .iter()
                .map(|(depth, text)| (depth + offset, text.clone())),
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render to text, one terminated line per record. Empty lines carry
    /// no indentation.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for (depth, text) in &self.records {
            if !text.is_empty() {
                for _ in 0..*depth {
                    output.push_str(INDENT_UNIT);
                }
                output.push_str(text);
            }
            output.push('\n');
        }
        output
    }
}
