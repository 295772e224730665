//! Thin wrapper over the tree-sitter incremental parser.
//!
//! This is the only module that imports `tree_sitter` directly; everything
//! above it (the AST layer and the frontends) talks to [`CstNode`], never
//! to `tree_sitter::Node`. The wrapper exists so that swapping grammars,
//! or the parser itself, never ripples past this file.

mod cancellation;
mod visit;

pub use cancellation::CancellationToken;
pub use visit::{inspect, walk, Visitor};

use crate::error::{EngineError, Result};

/// Source languages the CST layer knows how to hand to tree-sitter.
///
/// A closed enumeration, per the supported-language registry contract:
/// only tags with a registered grammar parse, everything else is a
/// [`EngineError::UnsupportedLanguage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl Language {
    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::JavaScript | Language::Jsx => tree_sitter_javascript::language(),
            Language::TypeScript => tree_sitter_typescript::language_typescript(),
            Language::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }

    /// Parse a caller-supplied language tag. Unknown tags are
    /// [`EngineError::UnsupportedLanguage`], not a panic — the registry is
    /// closed but callers are not trusted to already know its members.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "jsx" => Ok(Language::Jsx),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "tsx" => Ok(Language::Tsx),
            other => Err(EngineError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// A 0-based byte offset plus row/column, exactly as tree-sitter reports it.
///
/// The AST layer normalizes `row` to 1-based when lifting this into a
/// [`crate::ast::Position`] — tree-sitter rows are 0-based, the AST never
/// is. Never mix the two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub byte: u32,
    pub row: u32,
    pub column: u32,
}

/// A parsed source file: owns the tree and the bytes it was parsed from, so
/// that every [`CstNode`] handed out can slice its own text.
pub struct CstTree {
    tree: tree_sitter::Tree,
    source: Vec<u8>,
}

impl CstTree {
    pub fn root(&self) -> CstNode<'_> {
        CstNode {
            node: self.tree.root_node(),
            source: &self.source,
        }
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }
}

/// Parse `source` under `language`, honoring `cancel`.
///
/// Never panics on malformed input: a syntactically broken file still
/// yields a root node whose subtrees may contain error nodes, detectable
/// with [`CstNode::is_error`]. The only failure mode is a parser that
/// couldn't even be constructed for the grammar, or a cancelled parse.
pub fn parse(source: &[u8], language: Language, cancel: &CancellationToken) -> Result<CstTree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| EngineError::Parse {
            file: String::new(),
            message: format!("failed to load grammar: {e}"),
        })?;

    // SAFETY: the flag outlives the parse call below; tree-sitter only
    // reads it, never writes it, and we hold the Arc alive in `cancel`.
    unsafe {
        parser.set_cancellation_flag(Some(cancel.flag()));
    }

    let tree = parser.parse(source, None).ok_or_else(|| {
        if cancel.is_cancelled() {
            EngineError::Cancelled
        } else {
            EngineError::Parse {
                file: String::new(),
                message: "parser produced no tree".to_string(),
            }
        }
    })?;

    Ok(CstTree {
        tree,
        source: source.to_vec(),
    })
}

/// A node in the concrete syntax tree, together with the source bytes it
/// was parsed from.
#[derive(Clone, Copy)]
pub struct CstNode<'a> {
    node: tree_sitter::Node<'a>,
    source: &'a [u8],
}

impl<'a> CstNode<'a> {
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Raw source bytes spanned by this node.
    pub fn value(&self) -> &'a [u8] {
        &self.source[self.node.start_byte()..self.node.end_byte()]
    }

    pub fn value_str(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.value())
    }

    pub fn named_child(&self, i: usize) -> Option<CstNode<'a>> {
        self.node.named_child(i).map(|node| CstNode {
            node,
            source: self.source,
        })
    }

    pub fn named_child_count(&self) -> usize {
        self.node.named_child_count()
    }

    pub fn named_children(&self) -> impl Iterator<Item = CstNode<'a>> + 'a {
        let source = self.source;
        let mut cursor = self.node.walk();
        let children: Vec<_> = self.node.named_children(&mut cursor).collect();
        children
            .into_iter()
            .map(move |node| CstNode { node, source })
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<CstNode<'a>> {
        self.node
            .child_by_field_name(name)
            .map(|node| CstNode {
                node,
                source: self.source,
            })
    }

    pub fn parent(&self) -> Option<CstNode<'a>> {
        self.node.parent().map(|node| CstNode {
            node,
            source: self.source,
        })
    }

    pub fn start_byte(&self) -> u32 {
        self.node.start_byte() as u32
    }

    pub fn end_byte(&self) -> u32 {
        self.node.end_byte() as u32
    }

    pub fn start_point(&self) -> Point {
        let p = self.node.start_position();
        Point {
            byte: self.start_byte(),
            row: p.row as u32,
            column: p.column as u32,
        }
    }

    pub fn end_point(&self) -> Point {
        let p = self.node.end_position();
        Point {
            byte: self.end_byte(),
            row: p.row as u32,
            column: p.column as u32,
        }
    }

    /// True if this exact node is a tree-sitter ERROR node.
    pub fn is_error(&self) -> bool {
        self.node.is_error()
    }

    /// True if this node or anything beneath it failed to parse.
    pub fn has_error(&self) -> bool {
        self.node.has_error()
    }
}

/// Strip one leading and one trailing quote (`'`, `"`, `` ` ``) if a
/// matching pair is present. Used to turn a raw string-literal CST slice
/// into the text a checker actually wants to compare against.
pub fn sanitize_node_value(bytes: &[u8]) -> &[u8] {
    const QUOTES: &[u8] = b"'\"`";
    if bytes.len() >= 2 && QUOTES.contains(&bytes[0]) && bytes[bytes.len() - 1] == bytes[0] {
        &bytes[1..bytes.len() - 1]
    } else {
        bytes
    }
}

/// `true` if `bytes` contains the literal suppression directive `#nosec`.
pub fn is_nosec(bytes: &[u8]) -> bool {
    const NEEDLE: &[u8] = b"#nosec";
    bytes
        .windows(NEEDLE.len())
        .any(|window| window == NEEDLE)
}

/// Walk named children of `parent`, skipping any child of kind
/// `type_to_skip` — used by the frontend to step over comment nodes while
/// still letting `#nosec` comments arm the lookahead-one skip (see
/// `frontend::ecma`).
pub fn iter_named_children_ignoring_node<'a, F>(
    parent: CstNode<'a>,
    type_to_skip: &str,
    mut f: F,
) where
    F: FnMut(CstNode<'a>),
{
    for child in parent.named_children() {
        if child.kind() == type_to_skip {
            continue;
        }
        f(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_matching_quotes() {
        assert_eq!(sanitize_node_value(b"\"hi\""), b"hi");
        assert_eq!(sanitize_node_value(b"'hi'"), b"hi");
        assert_eq!(sanitize_node_value(b"`hi`"), b"hi");
        assert_eq!(sanitize_node_value(b"hi"), b"hi");
        assert_eq!(sanitize_node_value(b"\"mismatched'"), b"\"mismatched'");
    }

    #[test]
    fn nosec_detection_is_substring() {
        assert!(is_nosec(b"// #nosec disable this check"));
        assert!(!is_nosec(b"// totally safe"));
    }

    #[test]
    fn parse_malformed_input_yields_error_nodes_not_panic() {
        let cancel = CancellationToken::new();
        let tree = parse(b"function( {", Language::JavaScript, &cancel).unwrap();
        assert!(tree.root().has_error());
    }

    #[test]
    fn parse_well_formed_input_has_no_errors() {
        let cancel = CancellationToken::new();
        let tree = parse(b"function f() { return 1; }", Language::JavaScript, &cancel).unwrap();
        assert!(!tree.root().has_error());
    }

    #[test]
    fn unknown_language_tag_is_an_error() {
        assert!(matches!(
            Language::from_tag("python"),
            Err(EngineError::UnsupportedLanguage(_))
        ));
        assert_eq!(Language::from_tag("ts").unwrap(), Language::TypeScript);
    }
}
