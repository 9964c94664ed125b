//! Parser collaborator
//!
//! [`Parser`] is the seam the core calls when it is handed source text.
//! [`TreeSitterParser`] is the bundled implementation: it runs a tree-sitter
//! grammar and converts the result into an owned [`Node`] tree whose every
//! node, tokens and comments included, carries its original span.

use std::sync::Arc;
use tree_sitter::TreeCursor;

use crate::error::{AstError, Result};
use crate::ir::{Edge, LanguageId, Node, Origin, SourceFile, Span};

/// Turns source text into a syntax tree
pub trait Parser: Send + Sync {
    /// Parse `source` and return the root node
    fn parse(&self, source: &str) -> Result<Node>;

    /// Language this parser reads
    fn language(&self) -> LanguageId;
}

/// Get the tree-sitter grammar for a language
pub fn grammar(language: LanguageId) -> Result<tree_sitter::Language> {
    let ts_lang = match language {
        LanguageId::Rust => tree_sitter_rust::LANGUAGE.into(),
        LanguageId::Python => tree_sitter_python::LANGUAGE.into(),
        LanguageId::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        LanguageId::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        LanguageId::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        LanguageId::Go => tree_sitter_go::LANGUAGE.into(),
        LanguageId::Java => tree_sitter_java::LANGUAGE.into(),
        LanguageId::C => tree_sitter_c::LANGUAGE.into(),
        LanguageId::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        LanguageId::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        LanguageId::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        LanguageId::Html => tree_sitter_html::LANGUAGE.into(),
        LanguageId::Css => tree_sitter_css::LANGUAGE.into(),
        LanguageId::Json => tree_sitter_json::LANGUAGE.into(),
        LanguageId::Bash => tree_sitter_bash::LANGUAGE.into(),
        LanguageId::Unknown => return Err(AstError::UnsupportedLanguage(language)),
    };
    Ok(ts_lang)
}

/// Tree-sitter backed parser
#[derive(Debug, Clone)]
pub struct TreeSitterParser {
    language: LanguageId,
    allow_errors: bool,
}

impl TreeSitterParser {
    /// Create a parser for `language`; fails if no grammar is bundled
    pub fn new(language: LanguageId) -> Result<Self> {
        grammar(language)?;
        Ok(Self {
            language,
            allow_errors: false,
        })
    }

    pub fn javascript() -> Self {
        Self {
            language: LanguageId::JavaScript,
            allow_errors: false,
        }
    }

    /// Keep trees that contain ERROR or MISSING nodes instead of failing
    pub fn allow_errors(mut self, allow: bool) -> Self {
        self.allow_errors = allow;
        self
    }

    fn ts_parser(&self) -> Result<tree_sitter::Parser> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar(self.language)?)
            .map_err(|e| AstError::TreeSitterError(e.to_string()))?;
        Ok(parser)
    }
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::javascript()
    }
}

impl Parser for TreeSitterParser {
    fn parse(&self, source: &str) -> Result<Node> {
        let tree = self
            .ts_parser()?
            .parse(source, None)
            .ok_or_else(|| AstError::TreeSitterError("parser produced no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() && !self.allow_errors {
            return Err(first_error(&mut root.walk()));
        }

        let file = SourceFile::new(source, self.language);
        let node = convert(&mut tree.walk(), &file);
        tracing::debug!(
            language = self.language.name(),
            bytes = source.len(),
            "parsed source"
        );
        Ok(node)
    }

    fn language(&self) -> LanguageId {
        self.language
    }
}

fn span_of(node: &tree_sitter::Node<'_>) -> Span {
    let (start, end) = (node.start_position(), node.end_position());
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
        start_line: start.row + 1,
        end_line: end.row + 1,
        start_column: start.column,
        end_column: end.column,
    }
}

/// Convert the subtree under the cursor, leaving the cursor where it started
fn convert(cursor: &mut TreeCursor<'_>, file: &Arc<SourceFile>) -> Node {
    let ts_node = cursor.node();
    let span = span_of(&ts_node);

    let mut children = Vec::new();
    if cursor.goto_first_child() {
        loop {
            let field = cursor.field_name().map(Arc::from);
            children.push(Edge {
                field,
                node: convert(cursor, file),
            });
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    let text = if children.is_empty() {
        Some(file.slice(span).unwrap_or_default().to_string())
    } else {
        None
    };

    Node::parsed(
        ts_node.kind(),
        ts_node.is_named(),
        text,
        children,
        Origin {
            file: file.clone(),
            span,
        },
    )
}

/// Locate the first ERROR or MISSING node in pre-order
fn first_error(cursor: &mut TreeCursor<'_>) -> AstError {
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected input".to_string()
            };
            return AstError::parse_error(message, pos.row + 1, pos.column + 1);
        }

        // Only descend into subtrees that contain the error
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                let pos = cursor.node().start_position();
                return AstError::parse_error("syntax error", pos.row + 1, pos.column + 1);
            }
        }
    }
}
