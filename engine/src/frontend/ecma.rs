//! Reference frontend for the ECMAScript family (JS/JSX/TS/TSX), grounded
//! on `services::ast_kotlin::KotlinAstParser::visit_node`'s
//! `match node.kind() { ... }` dispatch idiom and extended to cover the
//! full statement/expression surface this engine's IR builder expects.

use crate::ast::{
    self, AssignStmt, BasicLitExpr, BinaryExpr, CallExpr, ClassDecl, ConditionalExpr, Decl,
    Expr, Field, FieldList, File, ForInStmt, ForStmt, FuncDecl, FuncLit, IdentExpr, IfStmt,
    ImportDecl, IncExpr, KeyValueExpr, LabeledStmt, LitKind, MemberExpr, ObjectExpr, ObjectKind,
    Position, ReturnStmt, Stmt, SwitchCase, SwitchStmt, TemplateExpr, TryStmt, UnaryExpr,
    ValueDecl, WhileStmt,
};
use crate::config::EngineConfig;
use crate::cst::{is_nosec, parse as cst_parse, sanitize_node_value, CancellationToken, CstNode, Language};
use crate::error::{EngineError, Result};
use crate::frontend::Frontend;

pub struct EcmaFrontend;

impl Frontend for EcmaFrontend {
    fn parse(
        &self,
        name: Option<&str>,
        source: &[u8],
        config: &EngineConfig,
        cancel: &CancellationToken,
    ) -> Result<File> {
        if source.len() > config.max_source_bytes {
            return Err(EngineError::Parse {
                file: name.unwrap_or_default().to_string(),
                message: format!(
                    "source is {} bytes, exceeds max_source_bytes {}",
                    source.len(),
                    config.max_source_bytes
                ),
            });
        }
        let language = if name.map(|n| n.ends_with(".tsx")).unwrap_or(false) {
            Language::Tsx
        } else if name.map(|n| n.ends_with(".ts")).unwrap_or(false) {
            Language::TypeScript
        } else if name.map(|n| n.ends_with(".jsx")).unwrap_or(false) {
            Language::Jsx
        } else {
            Language::JavaScript
        };

        let tree = cst_parse(source, language, cancel).map_err(|e| match e {
            EngineError::Parse { message, .. } => EngineError::Parse {
                file: name.unwrap_or_default().to_string(),
                message,
            },
            other => other,
        })?;
        let root = tree.root();

        let mut file = File {
            name: name.map(str::to_string),
            ..Default::default()
        };

        // A `#nosec` comment as the file's very first named child silences
        // the whole file: the frontend returns a File carrying only its name.
        if let Some(first) = root.named_child(0) {
            if first.kind() == "comment" && is_nosec(first.value()) {
                return Ok(file);
            }
        }

        for top in named_children_respecting_nosec(root) {
            lower_top_level(top, &mut file);
        }

        Ok(file)
    }
}

/// Iterates `parent`'s named children honoring the mid-block `#nosec`
/// lookahead-one skip: a comment containing `#nosec` arms a one-shot flag
/// that drops the very next named sibling, whatever kind it is.
fn named_children_respecting_nosec<'a>(parent: CstNode<'a>) -> Vec<CstNode<'a>> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for child in parent.named_children() {
        if child.kind() == "comment" {
            if is_nosec(child.value()) {
                skip_next = true;
            }
            continue;
        }
        if skip_next {
            skip_next = false;
            continue;
        }
        out.push(child);
    }
    out
}

// ---------------------------------------------------------------------
// Top-level dispatch
// ---------------------------------------------------------------------

fn lower_top_level(node: CstNode<'_>, file: &mut File) {
    match node.kind() {
        "export_statement" => {
            if let Some(inner) = node.named_child(0) {
                lower_top_level(inner, file);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            file.decls.extend(lower_variable_declaration(node));
        }
        "function_declaration" => {
            file.decls.push(Decl::Func(lower_func_decl(node)));
        }
        "import_statement" => {
            file.decls
                .extend(lower_import_statement(node).into_iter().map(Decl::Import));
        }
        "class_declaration" => {
            file.decls.push(Decl::Class(lower_class_decl(node)));
        }
        "expression_statement" => {
            if let Some(inner) = node.named_child(0) {
                file.exprs.push(lower_expr(inner));
            }
        }
        "empty_statement" => {}
        _ => file.bad_nodes.push(ast::new_unsupported_node(node)),
    }
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

fn lower_variable_declaration(node: CstNode<'_>) -> Vec<Decl> {
    let mut decls = Vec::new();
    let mut pending_names: Vec<String> = Vec::new();
    let mut pending_values: Vec<Expr> = Vec::new();
    let pos = Position::of(node);

    let flush = |decls: &mut Vec<Decl>, names: &mut Vec<String>, values: &mut Vec<Expr>| {
        if !names.is_empty() {
            decls.push(Decl::Value(ValueDecl {
                names: std::mem::take(names),
                values: std::mem::take(values),
                pos,
            }));
        }
    };

    for declarator in node.named_children() {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        let name = name_node.value_str().to_string();
        let value_node = declarator.child_by_field_name("value");

        match value_node.map(|v| v.kind()) {
            Some("arrow_function") | Some("function") | Some("function_expression") => {
                flush(&mut decls, &mut pending_names, &mut pending_values);
                let func_lit = lower_func_lit(value_node.unwrap());
                decls.push(Decl::Func(FuncDecl {
                    name,
                    params: func_lit.params,
                    body: func_lit.body,
                    pos: Position::of(declarator),
                }));
            }
            Some("call_expression") if is_require_call(value_node.unwrap()) => {
                flush(&mut decls, &mut pending_names, &mut pending_values);
                let path = require_path(value_node.unwrap()).unwrap_or_default();
                decls.push(Decl::Import(ImportDecl {
                    path,
                    name: Some(name),
                    alias: None,
                    pos: Position::of(declarator),
                }));
            }
            Some("new_expression") => {
                let mut obj = lower_new_expression(value_node.unwrap());
                obj.name = Some(name.clone());
                pending_names.push(name);
                pending_values.push(Expr::Object(obj));
            }
            Some(_) => {
                pending_names.push(name);
                pending_values.push(lower_expr(value_node.unwrap()));
            }
            None => {
                pending_names.push(name);
            }
        }
    }
    flush(&mut decls, &mut pending_names, &mut pending_values);
    decls
}

fn is_require_call(call: CstNode<'_>) -> bool {
    call.child_by_field_name("function")
        .map(|f| f.kind() == "identifier" && f.value() == b"require")
        .unwrap_or(false)
}

fn require_path(call: CstNode<'_>) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    Some(String::from_utf8_lossy(sanitize_node_value(first.value())).to_string())
}

fn lower_func_decl(node: CstNode<'_>) -> FuncDecl {
    let name = node
        .child_by_field_name("name")
        .map(|n| n.value_str().to_string())
        .unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(lower_params)
        .unwrap_or_default();
    let body = node
        .child_by_field_name("body")
        .map(lower_stmt_block)
        .unwrap_or_default();
    FuncDecl {
        name,
        params,
        body,
        pos: Position::of(node),
    }
}

fn lower_params(params: CstNode<'_>) -> FieldList {
    params
        .named_children()
        .map(|p| lower_param(p))
        .collect()
}

fn lower_param(p: CstNode<'_>) -> Field {
    match p.kind() {
        "identifier" => Expr::Ident(IdentExpr {
            name: p.value_str().to_string(),
            pos: Position::of(p),
        }),
        // TypeScript wraps a plain parameter with its type annotation;
        // the annotation itself is dropped (no type-checking in scope).
        "required_parameter" | "optional_parameter" => p
            .child_by_field_name("pattern")
            .map(lower_param)
            .unwrap_or(Expr::Bad(ast::new_unsupported_node(p))),
        "assignment_pattern" => {
            let name = p
                .child_by_field_name("left")
                .map(|n| n.value_str().to_string())
                .unwrap_or_default();
            let default_value = p
                .child_by_field_name("right")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(p)));
            Expr::Object(ObjectExpr {
                name: Some(name),
                type_expr: None,
                elts: vec![default_value],
                kind: ObjectKind::DefaultParameter,
                pos: Position::of(p),
            })
        }
        "rest_pattern" | "spread_element" => Expr::Bad(ast::new_unsupported_node(p)),
        _ => Expr::Bad(ast::new_unsupported_node(p)),
    }
}

fn lower_import_statement(node: CstNode<'_>) -> Vec<ImportDecl> {
    let pos = Position::of(node);
    let path = node
        .child_by_field_name("source")
        .map(|n| String::from_utf8_lossy(sanitize_node_value(n.value())).to_string())
        .unwrap_or_default();

    let Some(clause) = node.named_children().find(|c| c.kind() == "import_clause") else {
        return vec![ImportDecl {
            path,
            name: None,
            alias: None,
            pos,
        }];
    };

    let mut decls = Vec::new();
    for item in clause.named_children() {
        match item.kind() {
            "identifier" => decls.push(ImportDecl {
                path: path.clone(),
                name: Some(item.value_str().to_string()),
                alias: None,
                pos,
            }),
            "namespace_import" => {
                if let Some(ident) = item.named_child(0) {
                    decls.push(ImportDecl {
                        path: path.clone(),
                        name: Some(ident.value_str().to_string()),
                        alias: None,
                        pos,
                    });
                }
            }
            "named_imports" => {
                for spec in item.named_children() {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let declared = spec
                        .child_by_field_name("name")
                        .map(|n| n.value_str().to_string())
                        .unwrap_or_default();
                    let alias = spec
                        .child_by_field_name("alias")
                        .map(|n| n.value_str().to_string());
                    decls.push(ImportDecl {
                        path: path.clone(),
                        name: Some(declared),
                        alias,
                        pos,
                    });
                }
            }
            _ => {}
        }
    }
    decls
}

fn lower_class_decl(node: CstNode<'_>) -> ClassDecl {
    let name = node
        .child_by_field_name("name")
        .map(|n| n.value_str().to_string())
        .unwrap_or_default();
    let mut methods = Vec::new();
    let mut fields = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        for member in body.named_children() {
            match member.kind() {
                "method_definition" => methods.push(lower_func_decl(member)),
                "field_definition" | "public_field_definition" => {
                    let field_name = member
                        .child_by_field_name("property")
                        .map(|n| n.value_str().to_string())
                        .unwrap_or_default();
                    let value = member.child_by_field_name("value").map(lower_expr);
                    fields.push(ValueDecl {
                        names: vec![field_name],
                        values: value.into_iter().collect(),
                        pos: Position::of(member),
                    });
                }
                _ => {}
            }
        }
    }
    ClassDecl {
        name,
        methods,
        fields,
        pos: Position::of(node),
    }
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn lower_stmt_block(block: CstNode<'_>) -> Vec<Stmt> {
    named_children_respecting_nosec(block)
        .into_iter()
        .map(lower_stmt)
        .collect()
}

/// `if`/`while`/`for`/labeled bodies may be a bare statement instead of a
/// `{ }` block; normalize both to a single [`Stmt`].
fn lower_body(node: CstNode<'_>) -> Box<Stmt> {
    Box::new(lower_stmt(node))
}

fn lower_stmt(node: CstNode<'_>) -> Stmt {
    match node.kind() {
        "statement_block" => Stmt::Block(lower_stmt_block(node)),
        "expression_statement" => match node.named_child(0) {
            Some(inner) if inner.kind() == "call_expression" => Stmt::Expr(lower_expr(inner)),
            Some(inner) => Stmt::Expr(lower_expr(inner)),
            None => Stmt::Block(vec![]),
        },
        "lexical_declaration" | "variable_declaration" => lower_nested_declaration(node),
        "function_declaration" => {
            // A named nested function is, semantically, a variable bound to
            // a closure — lower it the same way as `const g = function(){}`.
            let decl = lower_func_decl(node);
            Stmt::Assign(AssignStmt {
                lhs: vec![Expr::Ident(IdentExpr {
                    name: decl.name.clone(),
                    pos: decl.pos,
                })],
                rhs: vec![Expr::FuncLit(FuncLit {
                    params: decl.params,
                    body: decl.body,
                    pos: decl.pos,
                })],
                pos: decl.pos,
            })
        }
        "return_statement" => lower_return(node),
        "if_statement" => {
            let cond = node
                .child_by_field_name("condition")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let then_branch = node
                .child_by_field_name("consequence")
                .map(lower_body)
                .unwrap_or_else(|| Box::new(Stmt::Block(vec![])));
            let else_branch = node.child_by_field_name("alternative").map(lower_body);
            Stmt::If(IfStmt {
                cond: Box::new(cond),
                then_branch,
                else_branch,
                pos: Position::of(node),
            })
        }
        "while_statement" => {
            let cond = node
                .child_by_field_name("condition")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let body = node
                .child_by_field_name("body")
                .map(lower_body)
                .unwrap_or_else(|| Box::new(Stmt::Block(vec![])));
            Stmt::While(WhileStmt {
                cond: Box::new(cond),
                body,
                pos: Position::of(node),
            })
        }
        "for_statement" => {
            let init = node.child_by_field_name("initializer").map(|n| {
                if n.kind() == "lexical_declaration" || n.kind() == "variable_declaration" {
                    Box::new(lower_nested_declaration(n))
                } else {
                    Box::new(Stmt::Expr(lower_expr(n)))
                }
            });
            let cond = node
                .child_by_field_name("condition")
                .map(|n| Box::new(lower_expr(n)));
            let post = node
                .child_by_field_name("increment")
                .map(|n| Box::new(Stmt::Expr(lower_expr(n))));
            let body = node
                .child_by_field_name("body")
                .map(lower_body)
                .unwrap_or_else(|| Box::new(Stmt::Block(vec![])));
            Stmt::For(ForStmt {
                init,
                cond,
                post,
                body,
                pos: Position::of(node),
            })
        }
        "for_in_statement" => {
            let left = node
                .child_by_field_name("left")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let right = node
                .child_by_field_name("right")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            // `for`/`of` vs `for`/`in` is carried only by an anonymous
            // keyword token in the grammar, not a named field; recover it by
            // scanning the raw text between the bound and the iterable,
            // rather than the (possibly much longer) body.
            let is_of = match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
                (Some(l), Some(r)) if r.start_byte() >= l.end_byte() => {
                    let between = &node.value()[(l.end_byte() - node.start_byte()) as usize
                        ..(r.start_byte() - node.start_byte()) as usize];
                    String::from_utf8_lossy(between).contains("of")
                }
                _ => false,
            };
            let body = node
                .child_by_field_name("body")
                .map(lower_body)
                .unwrap_or_else(|| Box::new(Stmt::Block(vec![])));
            Stmt::ForIn(ForInStmt {
                left: Box::new(left),
                right: Box::new(right),
                body,
                is_of,
                pos: Position::of(node),
            })
        }
        "try_statement" => {
            let body = node
                .child_by_field_name("body")
                .map(lower_stmt_block)
                .unwrap_or_default();
            let (catch_param, catch_body) = node
                .named_children()
                .find(|c| c.kind() == "catch_clause")
                .map(|catch| {
                    let param = catch
                        .child_by_field_name("parameter")
                        .map(|n| n.value_str().to_string());
                    let body = catch
                        .child_by_field_name("body")
                        .map(lower_stmt_block)
                        .unwrap_or_default();
                    (param, Some(body))
                })
                .unwrap_or((None, None));
            let finally_body = node
                .named_children()
                .find(|c| c.kind() == "finally_clause")
                .and_then(|f| f.child_by_field_name("body"))
                .map(lower_stmt_block);
            Stmt::Try(TryStmt {
                body,
                catch_param,
                catch_body,
                finally_body,
                pos: Position::of(node),
            })
        }
        "switch_statement" => {
            let discriminant = node
                .child_by_field_name("value")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let mut cases = Vec::new();
            if let Some(body) = node.child_by_field_name("body") {
                for case in body.named_children() {
                    match case.kind() {
                        "switch_case" => {
                            let test = case.child_by_field_name("value").map(lower_expr);
                            let stmts = case
                                .named_children()
                                .filter(|c| c.kind() != "value")
                                .map(lower_stmt)
                                .collect();
                            cases.push(SwitchCase { test, body: stmts });
                        }
                        "switch_default" => {
                            let stmts = case.named_children().map(lower_stmt).collect();
                            cases.push(SwitchCase { test: None, body: stmts });
                        }
                        _ => {}
                    }
                }
            }
            Stmt::Switch(SwitchStmt {
                discriminant: Box::new(discriminant),
                cases,
                pos: Position::of(node),
            })
        }
        "labeled_statement" => {
            let label = node
                .child_by_field_name("label")
                .map(|n| n.value_str().to_string())
                .unwrap_or_default();
            let body = node
                .child_by_field_name("body")
                .map(lower_body)
                .unwrap_or_else(|| Box::new(Stmt::Block(vec![])));
            Stmt::Labeled(LabeledStmt {
                label,
                body,
                pos: Position::of(node),
            })
        }
        "break_statement" => Stmt::Break(
            node.named_child(0).map(|n| n.value_str().to_string()),
            Position::of(node),
        ),
        "continue_statement" => Stmt::Continue(
            node.named_child(0).map(|n| n.value_str().to_string()),
            Position::of(node),
        ),
        "export_statement" | "empty_statement" => Stmt::Block(vec![]),
        _ => Stmt::Bad(ast::new_unsupported_node(node)),
    }
}

fn lower_nested_declaration(node: CstNode<'_>) -> Stmt {
    let mut lhs = Vec::new();
    let mut rhs = Vec::new();
    for declarator in node.named_children() {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        lhs.push(Expr::Ident(IdentExpr {
            name: name_node.value_str().to_string(),
            pos: Position::of(name_node),
        }));
        if let Some(value_node) = declarator.child_by_field_name("value") {
            rhs.push(lower_expr(value_node));
        }
    }
    Stmt::Assign(AssignStmt {
        lhs,
        rhs,
        pos: Position::of(node),
    })
}

fn lower_return(node: CstNode<'_>) -> Stmt {
    let mut results = Vec::new();
    if let Some(value) = node.named_child(0) {
        flatten_sequence(value, &mut results);
    }
    Stmt::Return(ReturnStmt {
        results,
        pos: Position::of(node),
    })
}

/// `return a, b, c` parses as a right-nested `sequence_expression`; flatten
/// it into the `Results` list rather than keeping one nested AST shape.
fn flatten_sequence(node: CstNode<'_>, out: &mut Vec<Expr>) {
    if node.kind() == "sequence_expression" {
        if let Some(left) = node.child_by_field_name("left") {
            flatten_sequence(left, out);
        }
        if let Some(right) = node.child_by_field_name("right") {
            flatten_sequence(right, out);
        }
    } else {
        out.push(lower_expr(node));
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

fn lower_expr(node: CstNode<'_>) -> Expr {
    match node.kind() {
        "identifier" | "property_identifier" | "shorthand_property_identifier"
        | "this" => Expr::Ident(IdentExpr {
            name: node.value_str().to_string(),
            pos: Position::of(node),
        }),
        "number" => basic_lit(node, LitKind::Number, node.value_str().to_string()),
        "string" => basic_lit(
            node,
            LitKind::String,
            String::from_utf8_lossy(sanitize_node_value(node.value())).to_string(),
        ),
        "true" | "false" => basic_lit(node, LitKind::Bool, node.value_str().to_string()),
        "null" | "undefined" => basic_lit(node, LitKind::Null, node.value_str().to_string()),
        "regex" => basic_lit(node, LitKind::Regex, node.value_str().to_string()),
        "template_string" => {
            let subs = node
                .named_children()
                .filter(|c| c.kind() == "template_substitution")
                .filter_map(|sub| sub.named_child(0))
                .map(lower_expr)
                .collect();
            Expr::Template(TemplateExpr {
                raw: node.value_str().to_string(),
                subs,
                pos: Position::of(node),
            })
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(lower_expr)
            .unwrap_or(Expr::Bad(ast::new_unsupported_node(node))),
        "binary_expression" => {
            let op = node
                .child_by_field_name("operator")
                .map(|o| o.value_str().to_string())
                .unwrap_or_default();
            let left = node
                .child_by_field_name("left")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let right = node
                .child_by_field_name("right")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            Expr::Binary(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
                pos: Position::of(node),
            })
        }
        "unary_expression" => {
            let op = node
                .child_by_field_name("operator")
                .map(|o| o.value_str().to_string())
                .unwrap_or_default();
            let operand = node
                .child_by_field_name("argument")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                pos: Position::of(node),
            })
        }
        "update_expression" => {
            let op = node
                .child_by_field_name("operator")
                .map(|o| o.value_str().to_string())
                .unwrap_or_default();
            let operand_node = node.child_by_field_name("argument");
            let operand = operand_node
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let prefix = match (node.child_by_field_name("operator"), operand_node) {
                (Some(op_node), Some(arg)) => op_node.start_byte() < arg.start_byte(),
                _ => false,
            };
            Expr::Inc(IncExpr {
                op,
                operand: Box::new(operand),
                prefix,
                pos: Position::of(node),
            })
        }
        "ternary_expression" => {
            let cond = node
                .child_by_field_name("condition")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let then_expr = node
                .child_by_field_name("consequence")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let else_expr = node
                .child_by_field_name("alternative")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            Expr::Conditional(ConditionalExpr {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                pos: Position::of(node),
            })
        }
        "call_expression" => {
            let callee = node
                .child_by_field_name("function")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let args = node
                .child_by_field_name("arguments")
                .map(|a| {
                    a.named_children()
                        .map(|arg| {
                            if arg.kind() == "spread_element" {
                                Expr::Bad(ast::new_unsupported_node(arg))
                            } else {
                                lower_expr(arg)
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            Expr::Call(CallExpr {
                callee: Box::new(callee),
                args,
                pos: Position::of(node),
            })
        }
        "new_expression" => Expr::Object(lower_new_expression(node)),
        "member_expression" => {
            let object = node
                .child_by_field_name("object")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let property = node
                .child_by_field_name("property")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            Expr::Member(MemberExpr {
                object: Box::new(object),
                property: Box::new(property),
                computed: false,
                pos: Position::of(node),
            })
        }
        "subscript_expression" => {
            let object = node
                .child_by_field_name("object")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            let property = node
                .child_by_field_name("index")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(node)));
            Expr::Member(MemberExpr {
                object: Box::new(object),
                property: Box::new(property),
                computed: true,
                pos: Position::of(node),
            })
        }
        "object" => {
            let elts = node
                .named_children()
                .map(|pair| lower_object_member(pair))
                .collect();
            Expr::Object(ObjectExpr {
                name: None,
                type_expr: None,
                elts,
                kind: ObjectKind::HashMap,
                pos: Position::of(node),
            })
        }
        "array" => {
            let elts = node
                .named_children()
                .map(|elt| {
                    if elt.kind() == "spread_element" {
                        Expr::Bad(ast::new_unsupported_node(elt))
                    } else {
                        lower_expr(elt)
                    }
                })
                .collect();
            Expr::Object(ObjectExpr {
                name: None,
                type_expr: None,
                elts,
                kind: ObjectKind::Array,
                pos: Position::of(node),
            })
        }
        "arrow_function" | "function" | "function_expression" => {
            Expr::FuncLit(lower_func_lit(node))
        }
        _ => Expr::Bad(ast::new_unsupported_node(node)),
    }
}

fn basic_lit(node: CstNode<'_>, kind: LitKind, value: String) -> Expr {
    Expr::BasicLit(BasicLitExpr {
        kind,
        value,
        pos: Position::of(node),
    })
}

fn lower_object_member(pair: CstNode<'_>) -> Expr {
    match pair.kind() {
        "pair" => {
            let key_node = pair.child_by_field_name("key");
            let key = match key_node {
                // A bare property identifier key is emitted as a string
                // literal, never `Ident` — an IR consumer should never see
                // a nameless identifier value standing in for a key.
                Some(k) if k.kind() == "property_identifier" => basic_lit(
                    k,
                    LitKind::String,
                    k.value_str().to_string(),
                ),
                Some(k) => lower_expr(k),
                None => Expr::Bad(ast::new_unsupported_node(pair)),
            };
            let value = pair
                .child_by_field_name("value")
                .map(lower_expr)
                .unwrap_or(Expr::Bad(ast::new_unsupported_node(pair)));
            Expr::KeyValue(KeyValueExpr {
                key: Box::new(key),
                value: Box::new(value),
                pos: Position::of(pair),
            })
        }
        "shorthand_property_identifier" => Expr::KeyValue(KeyValueExpr {
            key: Box::new(basic_lit(
                pair,
                LitKind::String,
                pair.value_str().to_string(),
            )),
            value: Box::new(Expr::Ident(IdentExpr {
                name: pair.value_str().to_string(),
                pos: Position::of(pair),
            })),
            pos: Position::of(pair),
        }),
        "spread_element" => Expr::Bad(ast::new_unsupported_node(pair)),
        _ => Expr::Bad(ast::new_unsupported_node(pair)),
    }
}

fn lower_new_expression(node: CstNode<'_>) -> ObjectExpr {
    let type_expr = node.child_by_field_name("constructor").map(lower_expr);
    let args = node
        .child_by_field_name("arguments")
        .map(|a| a.named_children().map(lower_expr).collect())
        .unwrap_or_default();
    ObjectExpr {
        name: None,
        type_expr: type_expr.map(Box::new),
        elts: args,
        kind: ObjectKind::Constructor,
        pos: Position::of(node),
    }
}

fn lower_func_lit(node: CstNode<'_>) -> FuncLit {
    let params = node
        .child_by_field_name("parameters")
        .map(lower_params)
        .or_else(|| {
            // Arrow functions with a single bare parameter skip the
            // parenthesized `formal_parameters` node entirely: `a => a + 1`.
            node.named_children()
                .find(|c| c.kind() == "identifier")
                .map(|ident| vec![lower_param(ident)])
        })
        .unwrap_or_default();
    let body_node = node.child_by_field_name("body");
    let body = match body_node {
        Some(b) if b.kind() == "statement_block" => lower_stmt_block(b),
        Some(b) => vec![Stmt::Return(ReturnStmt {
            results: vec![lower_expr(b)],
            pos: Position::of(b),
        })],
        None => Vec::new(),
    };
    FuncLit {
        params,
        body,
        pos: Position::of(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn lower(src: &str) -> File {
        let cancel = CancellationToken::new();
        EcmaFrontend
            .parse(Some("t.js"), src.as_bytes(), &EngineConfig::default(), &cancel)
            .unwrap()
    }

    #[test]
    fn require_call_becomes_import_decl() {
        let file = lower("const foo = require('bar');");
        assert_eq!(file.decls.len(), 1);
        match &file.decls[0] {
            Decl::Import(d) => {
                assert_eq!(d.path, "bar");
                assert_eq!(d.name.as_deref(), Some("foo"));
            }
            other => panic!("expected ImportDecl, got {other:?}"),
        }
    }

    #[test]
    fn arrow_initializer_becomes_func_decl() {
        let file = lower("const add = (a, b) => { return a + b; };");
        assert_eq!(file.decls.len(), 1);
        match &file.decls[0] {
            Decl::Func(d) => assert_eq!(d.name, "add"),
            other => panic!("expected FuncDecl, got {other:?}"),
        }
    }

    #[test]
    fn plain_initializer_stays_value_decl() {
        let file = lower("const x = 1;");
        match &file.decls[0] {
            Decl::Value(d) => assert_eq!(d.names, vec!["x".to_string()]),
            other => panic!("expected ValueDecl, got {other:?}"),
        }
    }

    #[test]
    fn object_literal_tags_hashmap_and_strings_keys() {
        let file = lower("const o = { a: 1 };");
        let Decl::Value(d) = &file.decls[0] else {
            panic!("expected ValueDecl")
        };
        let Expr::Object(obj) = &d.values[0] else {
            panic!("expected ObjectExpr")
        };
        assert_eq!(obj.kind, ObjectKind::HashMap);
        let Expr::KeyValue(kv) = &obj.elts[0] else {
            panic!("expected KeyValueExpr")
        };
        match &*kv.key {
            Expr::BasicLit(lit) => {
                assert_eq!(lit.kind, LitKind::String);
                assert_eq!(lit.value, "a");
            }
            other => panic!("expected BasicLit string key, got {other:?}"),
        }
    }

    #[test]
    fn new_expression_binds_name_from_declarator() {
        let file = lower("const h = new Hasher(1);");
        let Decl::Value(d) = &file.decls[0] else {
            panic!("expected ValueDecl")
        };
        let Expr::Object(obj) = &d.values[0] else {
            panic!("expected ObjectExpr")
        };
        assert_eq!(obj.kind, ObjectKind::Constructor);
        assert_eq!(obj.name.as_deref(), Some("h"));
    }

    #[test]
    fn aliased_named_import_carries_both_names() {
        let file = lower("import { spawn as exec } from 'child_process';");
        match &file.decls[0] {
            Decl::Import(d) => {
                assert_eq!(d.path, "child_process");
                assert_eq!(d.name.as_deref(), Some("spawn"));
                assert_eq!(d.alias.as_deref(), Some("exec"));
            }
            other => panic!("expected ImportDecl, got {other:?}"),
        }
    }

    #[test]
    fn file_wide_nosec_comment_yields_only_a_name() {
        let file = lower("// #nosec\nconst x = eval('1');");
        assert!(file.decls.is_empty());
        assert!(file.exprs.is_empty());
    }

    #[test]
    fn nested_declaration_lowers_to_assign_stmt() {
        let file = lower("function f(){ const g = (a,b) => { return a+b; }; }");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected FuncDecl")
        };
        match &f.body[0] {
            Stmt::Assign(s) => {
                assert_eq!(s.lhs.len(), 1);
                assert!(matches!(s.rhs[0], Expr::FuncLit(_)));
            }
            other => panic!("expected AssignStmt, got {other:?}"),
        }
    }
}
