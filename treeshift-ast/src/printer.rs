//! Printer collaborator
//!
//! [`DiffPrinter`] has two modes:
//!
//! - **Diff-aware** (an original [`SourceFile`] is supplied): every subtree
//!   that was parsed from that file and not modified since is copied verbatim
//!   from the original text, and so is the whitespace between original
//!   siblings. Only modified regions are rebuilt from their leaves.
//! - **Full print** (no original): the tree is rebuilt from its leaves, joined
//!   with the configured separator where two tokens would otherwise fuse.
//!
//! An unmodified tree printed against its own file reproduces the file
//! byte for byte.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AstError, Result};
use crate::ir::{Node, NodeId, SourceFile, Span};

/// Turns a syntax tree back into source text
pub trait Printer: Send + Sync {
    /// Print `root`; when `original` is given, reuse its text for untouched regions
    fn print(&self, root: &Node, original: Option<&SourceFile>) -> Result<String>;
}

fn default_reuse_original() -> bool {
    true
}

fn default_separator() -> String {
    " ".to_string()
}

/// Printer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Copy untouched regions from the original text
    #[serde(default = "default_reuse_original")]
    pub reuse_original: bool,

    /// Inserted between rebuilt tokens that would otherwise run together
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            reuse_original: default_reuse_original(),
            separator: default_separator(),
        }
    }
}

/// Diff-aware printer
#[derive(Debug, Clone, Default)]
pub struct DiffPrinter {
    options: PrintOptions,
}

impl DiffPrinter {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }
}

impl Printer for DiffPrinter {
    fn print(&self, root: &Node, original: Option<&SourceFile>) -> Result<String> {
        let file = original.filter(|_| self.options.reuse_original);
        let mut render = Render {
            file,
            separator: &self.options.separator,
            pristine: HashMap::new(),
        };

        let mut out = String::new();
        match file.zip(file.and_then(|f| root.span_in(f))) {
            Some((file, span)) => {
                tracing::trace!(kind = %root.kind(), "printing in diff-aware mode");
                // Leading and trailing file text only belongs to a root
                // that covers the whole file.
                if let Some(lead) = render.gap(Some(0), Some(span.start)) {
                    out.push_str(lead);
                }
                render.emit(root, &mut out)?;
                if let Some(trail) = render.gap(Some(span.end), Some(file.text().len())) {
                    out.push_str(trail);
                }
            }
            None => {
                tracing::trace!(kind = %root.kind(), "printing in full mode");
                render.emit(root, &mut out)?;
            }
        }
        Ok(out)
    }
}

fn slice(file: &SourceFile, start: usize, end: usize) -> Result<&str> {
    file.slice(Span::new(start, end, 0, 0)).ok_or_else(|| {
        AstError::print_error(format!(
            "range {start}..{end} is outside the original text ({} bytes)",
            file.text().len()
        ))
    })
}

struct Render<'a> {
    file: Option<&'a SourceFile>,
    separator: &'a str,
    pristine: HashMap<NodeId, bool>,
}

impl<'a> Render<'a> {
    fn span(&self, node: &Node) -> Option<Span> {
        self.file.and_then(|f| node.span_in(f))
    }

    /// Unmodified and parsed from the original, all the way down
    fn is_pristine(&mut self, node: &Node) -> bool {
        if let Some(&known) = self.pristine.get(&node.id()) {
            return known;
        }
        let pristine = !node.is_modified()
            && self.span(node).is_some()
            && node.children().iter().all(|c| self.is_pristine(c));
        self.pristine.insert(node.id(), pristine);
        pristine
    }

    fn emit(&mut self, node: &Node, out: &mut String) -> Result<()> {
        if self.is_pristine(node) {
            if let (Some(file), Some(span)) = (self.file, self.span(node)) {
                out.push_str(slice(file, span.start, span.end)?);
                return Ok(());
            }
        }

        let children = node.children();
        if children.is_empty() {
            out.push_str(&node.text().unwrap_or_default());
            return Ok(());
        }

        let own = self.span(node);
        let spans: Vec<Option<Span>> = children.iter().map(|c| self.span(c)).collect();
        for (i, child) in children.iter().enumerate() {
            let mut piece = String::new();
            self.emit(child, &mut piece)?;

            let whitespace = match i {
                0 => self.leading(own, &spans),
                _ => self.between(spans[i - 1], spans[i]),
            };
            match whitespace {
                Some(ws) => out.push_str(ws),
                None if i > 0 && needs_separator(out.chars().last(), piece.chars().next()) => {
                    out.push_str(self.separator);
                }
                None => {}
            }
            out.push_str(&piece);
        }

        if let Some(ws) = self.trailing(own, &spans) {
            out.push_str(ws);
        }
        Ok(())
    }

    /// Whitespace before the first child.
    ///
    /// A first child that is also the earliest surviving original child
    /// keeps the whitespace in front of it, even when the siblings that
    /// preceded it were removed.
    fn leading(&self, own: Option<Span>, spans: &[Option<Span>]) -> Option<&'a str> {
        let (own, first) = (own?, spans.first().copied().flatten()?);
        if let Some(gap) = self.gap(Some(own.start), Some(first.start)) {
            return Some(gap);
        }
        let earliest = spans.iter().flatten().all(|s| s.start >= first.start);
        earliest
            .then(|| self.run_before(first.start, own.start))
            .filter(|ws| ws.contains('\n'))
    }

    /// Whitespace between two consecutive children.
    ///
    /// Neighbours in the original keep the text between them. Otherwise a
    /// line break that surrounded either child in the original is reused,
    /// so rearranged statements stay on their own lines.
    fn between(&self, prev: Option<Span>, next: Option<Span>) -> Option<&'a str> {
        if let Some(gap) = self.gap(prev.map(|s| s.end), next.map(|s| s.start)) {
            return Some(gap);
        }
        let before_next = next.map(|s| self.run_before(s.start, 0));
        let after_prev = prev.map(|s| self.run_after(s.end, usize::MAX));
        before_next
            .into_iter()
            .chain(after_prev)
            .find(|ws| ws.contains('\n'))
    }

    /// Whitespace after the last child, up to the end of the node itself
    fn trailing(&self, own: Option<Span>, spans: &[Option<Span>]) -> Option<&'a str> {
        let own = own?;
        if let Some(gap) = self.gap(spans.last().copied().flatten().map(|s| s.end), Some(own.end)) {
            return Some(gap);
        }
        let floor = spans
            .iter()
            .flatten()
            .map(|s| s.end)
            .filter(|&end| end <= own.end)
            .max()
            .unwrap_or(own.start);
        Some(self.run_before(own.end, floor)).filter(|ws| !ws.is_empty())
    }

    /// Original text between two offsets, when it is only whitespace.
    ///
    /// Tokens and comments are nodes, so the text between two siblings that
    /// were neighbours in the original is always whitespace.
    fn gap(&self, from: Option<usize>, to: Option<usize>) -> Option<&'a str> {
        let (file, from, to) = (self.file?, from?, to?);
        file.text()
            .get(from..to)
            .filter(|gap| gap.chars().all(char::is_whitespace))
    }

    /// Whitespace in the original ending at `offset`, not reaching below `floor`
    fn run_before(&self, offset: usize, floor: usize) -> &'a str {
        let Some(text) = self.file.and_then(|f| f.text().get(floor.min(offset)..offset)) else {
            return "";
        };
        &text[text.trim_end_matches(char::is_whitespace).len()..]
    }

    /// Whitespace in the original starting at `offset`, not reaching past `ceil`
    fn run_after(&self, offset: usize, ceil: usize) -> &'a str {
        let Some(text) = self.file.and_then(|f| {
            let text = f.text();
            text.get(offset..ceil.min(text.len()).max(offset))
        }) else {
            return "";
        };
        let len = text.len() - text.trim_start_matches(char::is_whitespace).len();
        &text[..len]
    }
}

fn needs_separator(prev: Option<char>, next: Option<char>) -> bool {
    match (prev, next) {
        (Some(p), Some(n)) => {
            !(p.is_whitespace()
                || n.is_whitespace()
                || matches!(p, '(' | '[' | '.')
                || matches!(n, ';' | ',' | '.' | '(' | ')' | '[' | ']'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LanguageId;
    use crate::parser::{Parser, TreeSitterParser};

    fn print_diff(root: &Node) -> String {
        let file = root.source_file().unwrap();
        DiffPrinter::default().print(root, Some(&file)).unwrap()
    }

    #[test]
    fn test_unmodified_round_trip_is_exact() {
        let sources = [
            "\nvar foo;\n",
            "var foo;",
            "",
            "// leading comment\nfunction f(a,   b) {\n\treturn a+b; /* sum */\n}\n\n\n",
            "const s = `tpl ${x}`;   \r\n",
        ];
        for source in sources {
            let root = TreeSitterParser::javascript().parse(source).unwrap();
            assert_eq!(print_diff(&root), source, "round trip of {source:?}");
        }
    }

    #[test]
    fn test_round_trip_other_grammars() {
        let cases = [
            (LanguageId::Python, "def f(x):\n    # note\n    return x  \n"),
            (LanguageId::Rust, "fn main() {\n    let x = 1; // one\n}\n"),
            (LanguageId::Json, "{ \"a\" : [1, 2] }\n"),
        ];
        for (language, source) in cases {
            let root = TreeSitterParser::new(language).unwrap().parse(source).unwrap();
            assert_eq!(print_diff(&root), source);
        }
    }

    #[test]
    fn test_modified_leaf_keeps_surrounding_text() {
        let source = "\nvar  foo ; // keep me\nfoo();\n";
        let root = TreeSitterParser::javascript().parse(source).unwrap();
        let identifier = root
            .descendants()
            .into_iter()
            .find(|n| n.is_kind("identifier"))
            .unwrap();
        identifier.set_text("bar");

        assert_eq!(print_diff(&root), "\nvar  bar ; // keep me\nfoo();\n");
    }

    #[test]
    fn test_replaced_subtree_is_rebuilt() {
        let root = TreeSitterParser::javascript().parse("let x = 1;\n").unwrap();
        let declarator = root.child(0).unwrap().child(1).unwrap();
        let call = Node::new("call_expression")
            .with_field("function", Node::leaf("identifier", "compute"))
            .with_field(
                "arguments",
                Node::new("arguments")
                    .with_child(Node::token("("))
                    .with_child(Node::leaf("number", "2"))
                    .with_child(Node::token(")")),
            );
        declarator.set_child(2, call).unwrap();

        assert_eq!(print_diff(&root), "let x = compute(2);\n");
    }

    #[test]
    fn test_swapped_siblings_reuse_their_own_text() {
        let root = TreeSitterParser::javascript().parse("a;\nb;\n").unwrap();
        let first = root.child(0).unwrap();
        let second = root.child(1).unwrap();
        root.set_child(0, second).unwrap();
        root.set_child(1, first).unwrap();

        assert_eq!(print_diff(&root), "b;\na;\n");
    }

    #[test]
    fn test_swapped_statements_in_block_keep_indentation() {
        let root = TreeSitterParser::javascript()
            .parse("{\n  a;\n  b;\n}\n")
            .unwrap();
        let block = root.child(0).unwrap();
        let first = block.child(1).unwrap();
        let second = block.child(2).unwrap();
        block.set_child(1, second).unwrap();
        block.set_child(2, first).unwrap();

        assert_eq!(print_diff(&root), "{\n  b;\n  a;\n}\n");
    }

    #[test]
    fn test_replaced_statement_keeps_line_breaks() {
        let statement = || {
            Node::new("expression_statement")
                .with_child(Node::leaf("identifier", "x"))
                .with_child(Node::token(";"))
        };

        let root = TreeSitterParser::javascript().parse("a;\nb;\n").unwrap();
        root.set_child(0, statement()).unwrap();
        assert_eq!(print_diff(&root), "x;\nb;\n");

        let root = TreeSitterParser::javascript().parse("a;\nb;\n").unwrap();
        root.set_child(1, statement()).unwrap();
        assert_eq!(print_diff(&root), "a;\nx;\n");

        let root = TreeSitterParser::javascript().parse("a;\nb;\nc;\n").unwrap();
        root.set_child(1, statement()).unwrap();
        assert_eq!(print_diff(&root), "a;\nx;\nc;\n");
    }

    #[test]
    fn test_removed_statement_keeps_blank_lines_of_its_neighbours() {
        let root = TreeSitterParser::javascript().parse("a;\n\nb;\n").unwrap();
        root.remove_child(0).unwrap();
        assert_eq!(print_diff(&root), "\n\nb;\n");

        let root = TreeSitterParser::javascript()
            .parse("a;\n\nb;\n\nc;\n")
            .unwrap();
        root.remove_child(1).unwrap();
        assert_eq!(print_diff(&root), "a;\n\nc;\n");

        let root = TreeSitterParser::javascript().parse("a;\n\nb;\n").unwrap();
        root.remove_child(1).unwrap();
        assert_eq!(print_diff(&root), "a;\n");
    }

    #[test]
    fn test_swapped_arguments_do_not_gain_spaces() {
        let root = TreeSitterParser::javascript().parse("f(a, b);\n").unwrap();
        let arguments = root.child(0).unwrap().child(0).unwrap().child(1).unwrap();
        let a = arguments.child(1).unwrap();
        let b = arguments.child(3).unwrap();
        arguments.set_child(1, b).unwrap();
        arguments.set_child(3, a).unwrap();

        assert_eq!(print_diff(&root), "f(b, a);\n");
    }

    #[test]
    fn test_foreign_nodes_are_not_sliced_from_the_wrong_file() {
        let parser = TreeSitterParser::javascript();
        let target = parser.parse("x;\n").unwrap();
        let donor = parser.parse("somethingLonger;\n").unwrap();
        let donor_id = donor
            .descendants()
            .into_iter()
            .find(|n| n.is_kind("identifier"))
            .unwrap();

        let stmt = target.child(0).unwrap();
        stmt.set_child(0, donor_id).unwrap();
        assert_eq!(print_diff(&target), "somethingLonger;\n");
    }

    #[test]
    fn test_detached_subtree_prints_only_itself() {
        let root = TreeSitterParser::javascript()
            .parse("first();\nsecond(1,  2);\n")
            .unwrap();
        let call = root.child(1).unwrap().child(0).unwrap();
        let file = call.source_file().unwrap();

        let printed = DiffPrinter::default().print(&call, Some(&file)).unwrap();
        assert_eq!(printed, "second(1,  2)");
    }

    #[test]
    fn test_full_print_of_synthetic_tree() {
        let tree = Node::new("lexical_declaration")
            .with_child(Node::token("const"))
            .with_child(
                Node::new("variable_declarator")
                    .with_field("name", Node::leaf("identifier", "answer"))
                    .with_child(Node::token("="))
                    .with_field("value", Node::leaf("number", "42")),
            )
            .with_child(Node::token(";"));

        let printed = DiffPrinter::default().print(&tree, None).unwrap();
        assert_eq!(printed, "const answer = 42;");
    }

    #[test]
    fn test_reuse_original_can_be_disabled() {
        let root = TreeSitterParser::javascript().parse("var   foo;").unwrap();
        let file = root.source_file().unwrap();
        let printer = DiffPrinter::new(PrintOptions {
            reuse_original: false,
            separator: " ".to_string(),
        });
        assert_eq!(printer.print(&root, Some(&file)).unwrap(), "var foo;");
    }

    #[test]
    fn test_unrelated_original_falls_back_to_full_print() {
        let root = TreeSitterParser::javascript().parse("var   foo;").unwrap();
        let unrelated = SourceFile::new("var   foo;", LanguageId::JavaScript);
        let printed = DiffPrinter::default().print(&root, Some(&unrelated)).unwrap();
        assert_eq!(printed, "var foo;");
    }

    #[test]
    fn test_print_options_serde_defaults() {
        let options: PrintOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PrintOptions::default());
        assert!(options.reuse_original);
        assert_eq!(options.separator, " ");
    }

    #[test]
    fn test_needs_separator() {
        assert!(needs_separator(Some('r'), Some('f')));
        assert!(!needs_separator(Some('o'), Some(';')));
        assert!(!needs_separator(Some('('), Some('x')));
        assert!(!needs_separator(None, Some('x')));
        assert!(!needs_separator(Some(' '), Some('x')));
    }
}
