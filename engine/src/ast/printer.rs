//! Indented human-readable dump of a [`File`], used only by snapshot tests.
//!
//! Grounded on the teacher's disassembly-style debug formatting idiom
//! (`write!` into an accumulating `String`, one construct per line,
//! `None`/empty fields skipped rather than printed as `null`).

use super::*;
use std::fmt::Write as _;

pub fn print_file(file: &File) -> String {
    let mut out = String::new();
    if let Some(name) = &file.name {
        let _ = writeln!(out, "File {name}");
    } else {
        let _ = writeln!(out, "File");
    }
    for decl in &file.decls {
        print_decl(&mut out, decl, 1);
    }
    for expr in &file.exprs {
        print_expr(&mut out, expr, 1);
    }
    for bad in &file.bad_nodes {
        indent(&mut out, 1);
        let _ = writeln!(out, "BadNode {}", bad.message);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_decl(out: &mut String, decl: &Decl, depth: usize) {
    indent(out, depth);
    match decl {
        Decl::Func(d) => {
            let _ = writeln!(out, "FuncDecl {}", d.name);
            for stmt in &d.body {
                print_stmt(out, stmt, depth + 1);
            }
        }
        Decl::Import(d) => {
            let _ = writeln!(
                out,
                "ImportDecl path={} name={} alias={}",
                d.path,
                d.name.as_deref().unwrap_or("_"),
                d.alias.as_deref().unwrap_or("_")
            );
        }
        Decl::Value(d) => {
            let _ = writeln!(out, "ValueDecl {}", d.names.join(", "));
            for value in &d.values {
                print_expr(out, value, depth + 1);
            }
        }
        Decl::Class(d) => {
            let _ = writeln!(out, "ClassDecl {}", d.name);
            for method in &d.methods {
                print_decl(out, &Decl::Func(method.clone()), depth + 1);
            }
            for field in &d.fields {
                print_decl(out, &Decl::Value(field.clone()), depth + 1);
            }
        }
        Decl::Bad(b) => {
            let _ = writeln!(out, "BadNode {}", b.message);
        }
    }
}

fn print_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Block(stmts) => {
            let _ = writeln!(out, "Block");
            for s in stmts {
                print_stmt(out, s, depth + 1);
            }
        }
        Stmt::Expr(e) => {
            let _ = writeln!(out, "ExprStmt");
            print_expr(out, e, depth + 1);
        }
        Stmt::Assign(s) => {
            let _ = writeln!(out, "AssignStmt");
            for e in &s.lhs {
                print_expr(out, e, depth + 1);
            }
            for e in &s.rhs {
                print_expr(out, e, depth + 1);
            }
        }
        Stmt::Return(s) => {
            let _ = writeln!(out, "ReturnStmt");
            for e in &s.results {
                print_expr(out, e, depth + 1);
            }
        }
        Stmt::If(s) => {
            let _ = writeln!(out, "IfStmt");
            print_expr(out, &s.cond, depth + 1);
            print_stmt(out, &s.then_branch, depth + 1);
            if let Some(e) = &s.else_branch {
                print_stmt(out, e, depth + 1);
            }
        }
        Stmt::While(s) => {
            let _ = writeln!(out, "WhileStmt");
            print_expr(out, &s.cond, depth + 1);
            print_stmt(out, &s.body, depth + 1);
        }
        Stmt::For(s) => {
            let _ = writeln!(out, "ForStmt");
            if let Some(init) = &s.init {
                print_stmt(out, init, depth + 1);
            }
            if let Some(cond) = &s.cond {
                print_expr(out, cond, depth + 1);
            }
            if let Some(post) = &s.post {
                print_stmt(out, post, depth + 1);
            }
            print_stmt(out, &s.body, depth + 1);
        }
        Stmt::ForIn(s) => {
            let _ = writeln!(out, "ForInStmt of={}", s.is_of);
            print_expr(out, &s.left, depth + 1);
            print_expr(out, &s.right, depth + 1);
            print_stmt(out, &s.body, depth + 1);
        }
        Stmt::Try(s) => {
            let _ = writeln!(out, "TryStmt");
            for st in &s.body {
                print_stmt(out, st, depth + 1);
            }
            if let Some(catch) = &s.catch_body {
                indent(out, depth + 1);
                let _ = writeln!(out, "Catch {}", s.catch_param.as_deref().unwrap_or("_"));
                for st in catch {
                    print_stmt(out, st, depth + 2);
                }
            }
            if let Some(fin) = &s.finally_body {
                indent(out, depth + 1);
                let _ = writeln!(out, "Finally");
                for st in fin {
                    print_stmt(out, st, depth + 2);
                }
            }
        }
        Stmt::Switch(s) => {
            let _ = writeln!(out, "SwitchStmt");
            print_expr(out, &s.discriminant, depth + 1);
            for case in &s.cases {
                indent(out, depth + 1);
                match &case.test {
                    Some(t) => {
                        let _ = writeln!(out, "Case");
                        print_expr(out, t, depth + 2);
                    }
                    None => {
                        let _ = writeln!(out, "Default");
                    }
                }
                for st in &case.body {
                    print_stmt(out, st, depth + 2);
                }
            }
        }
        Stmt::Labeled(s) => {
            let _ = writeln!(out, "LabeledStmt {}", s.label);
            print_stmt(out, &s.body, depth + 1);
        }
        Stmt::Break(label, _) => {
            let _ = writeln!(out, "BreakStmt {}", label.as_deref().unwrap_or("_"));
        }
        Stmt::Continue(label, _) => {
            let _ = writeln!(out, "ContinueStmt {}", label.as_deref().unwrap_or("_"));
        }
        Stmt::Bad(b) => {
            let _ = writeln!(out, "BadNode {}", b.message);
        }
    }
}

fn print_expr(out: &mut String, expr: &Expr, depth: usize) {
    indent(out, depth);
    match expr {
        Expr::Ident(e) => {
            let _ = writeln!(out, "Ident {}", e.name);
        }
        Expr::BasicLit(e) => {
            let _ = writeln!(out, "BasicLit {:?} {}", e.kind, e.value);
        }
        Expr::Binary(e) => {
            let _ = writeln!(out, "BinaryExpr {}", e.op);
            print_expr(out, &e.left, depth + 1);
            print_expr(out, &e.right, depth + 1);
        }
        Expr::Unary(e) => {
            let _ = writeln!(out, "UnaryExpr {}", e.op);
            print_expr(out, &e.operand, depth + 1);
        }
        Expr::Inc(e) => {
            let _ = writeln!(out, "IncExpr {} prefix={}", e.op, e.prefix);
            print_expr(out, &e.operand, depth + 1);
        }
        Expr::Conditional(e) => {
            let _ = writeln!(out, "ConditionalExpr");
            print_expr(out, &e.cond, depth + 1);
            print_expr(out, &e.then_expr, depth + 1);
            print_expr(out, &e.else_expr, depth + 1);
        }
        Expr::Call(e) => {
            let _ = writeln!(out, "CallExpr");
            print_expr(out, &e.callee, depth + 1);
            for arg in &e.args {
                print_expr(out, arg, depth + 1);
            }
        }
        Expr::Member(e) => {
            let _ = writeln!(out, "MemberExpr computed={}", e.computed);
            print_expr(out, &e.object, depth + 1);
            print_expr(out, &e.property, depth + 1);
        }
        Expr::Object(e) => {
            let _ = writeln!(
                out,
                "ObjectExpr {:?} name={}",
                e.kind,
                e.name.as_deref().unwrap_or("_")
            );
            if let Some(t) = &e.type_expr {
                print_expr(out, t, depth + 1);
            }
            for elt in &e.elts {
                print_expr(out, elt, depth + 1);
            }
        }
        Expr::KeyValue(e) => {
            let _ = writeln!(out, "KeyValueExpr");
            print_expr(out, &e.key, depth + 1);
            print_expr(out, &e.value, depth + 1);
        }
        Expr::Template(e) => {
            let _ = writeln!(out, "TemplateExpr {}", e.raw);
            for sub in &e.subs {
                print_expr(out, sub, depth + 1);
            }
        }
        Expr::FuncLit(e) => {
            let _ = writeln!(out, "FuncLit");
            for stmt in &e.body {
                print_stmt(out, stmt, depth + 1);
            }
        }
        Expr::Bad(b) => {
            let _ = writeln!(out, "BadNode {}", b.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_a_func_decl_with_return() {
        let pos = Position::default();
        let file = File {
            name: Some("a.js".to_string()),
            decls: vec![Decl::Func(FuncDecl {
                name: "f".to_string(),
                params: vec![],
                body: vec![Stmt::Return(ReturnStmt {
                    results: vec![Expr::BasicLit(BasicLitExpr {
                        kind: LitKind::Number,
                        value: "1".to_string(),
                        pos,
                    })],
                    pos,
                })],
                pos,
            })],
            exprs: vec![],
            bad_nodes: vec![],
        };
        let printed = print_file(&file);
        assert!(printed.contains("FuncDecl f"));
        assert!(printed.contains("ReturnStmt"));
        assert!(printed.contains("BasicLit Number 1"));
    }
}
