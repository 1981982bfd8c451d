//! Indentation-tracking text writer.

const INDENT: &str = "    ";

/// Accumulates emitted C# text. Newlines are always LF; the driver writes
/// UTF-8 without BOM.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buffer: String,
    indent: usize,
    at_line_start: bool,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    pub fn write(&mut self, text: &str) {
        if self.at_line_start && !text.is_empty() {
            for _ in 0..self.indent {
                self.buffer.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.buffer.push_str(text);
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.buffer.push('\n');
        self.at_line_start = true;
    }

    /// Blank separator line, collapsing runs.
    pub fn blank_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
        if !self.buffer.ends_with("\n\n") && !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn open_brace(&mut self) {
        self.write_line("{");
        self.increase_indent();
    }

    pub fn close_brace(&mut self) {
        self.decrease_indent();
        self.write_line("}");
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_applies_at_line_start() {
        let mut writer = SourceWriter::new();
        writer.write_line("namespace App");
        writer.open_brace();
        writer.write_line("class C { }");
        writer.close_brace();
        assert_eq!(writer.finish(), "namespace App\n{\n    class C { }\n}\n");
    }

    #[test]
    fn blank_lines_collapse() {
        let mut writer = SourceWriter::new();
        writer.write_line("a");
        writer.blank_line();
        writer.blank_line();
        writer.write_line("b");
        assert_eq!(writer.finish(), "a\n\nb\n");
    }
}
