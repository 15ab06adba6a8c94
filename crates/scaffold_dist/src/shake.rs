//! Removal of unreferenced top-level declarations.
//!
//! The pass is per file and name based: a declaration goes only when none of
//! the names it binds is exported or referenced anywhere in the same file.
//! Shadowed names count as references, which only keeps more code. Files
//! with JSX keep all their imports, since the classic runtime calls a
//! factory (`React`, `h`, ...) that no identifier names.

use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::GetSpan;
use std::{collections::HashSet, path::Path};

use scaffold_core::source_type_for;

use crate::rewrite::Edit;

/// Deletions for the dead top-level statements of `source`. Returns nothing
/// when the file does not parse cleanly.
pub fn dead_statement_edits(path: &Path, source: &str) -> Vec<Edit> {
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, source, source_type_for(path)).parse();
    if panicked || !errors.is_empty() {
        debug!("Not shaking {}: {} parse error(s)", path.display(), errors.len());
        return Vec::new();
    }

    let mut refs = References::default();
    refs.visit_program(&program);
    let exported = exported_locals(&program);
    let is_live = |name: &str| refs.names.contains(name) || exported.contains(name);

    let mut edits = Vec::new();
    for stmt in &program.body {
        if refs.has_jsx && matches!(stmt, Statement::ImportDeclaration(_)) {
            continue;
        }
        let Some(names) = candidate_names(stmt) else {
            continue;
        };
        if names.iter().any(|n| is_live(n.as_str())) {
            continue;
        }
        trace!("Removing unused {:?} from {}", names, path.display());
        let span = stmt.span();
        edits.push(Edit::delete(span.start as usize, line_end(source, span.end as usize)));
    }

    debug!("Tree-shaking removed {} statement(s) from {}", edits.len(), path.display());
    edits
}

#[derive(Default)]
struct References {
    names: HashSet<String>,
    has_jsx: bool,
}

impl<'a> Visit<'a> for References {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }

    fn visit_jsx_identifier(&mut self, ident: &JSXIdentifier<'a>) {
        self.names.insert(ident.name.to_string());
    }

    fn visit_jsx_element(&mut self, elem: &JSXElement<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_element(self, elem);
    }

    fn visit_jsx_fragment(&mut self, frag: &JSXFragment<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_fragment(self, frag);
    }
}

/// Names listed in local `export { a, b as c }` clauses.
fn exported_locals(program: &Program) -> HashSet<String> {
    let mut names = HashSet::new();
    for stmt in &program.body {
        if let Statement::ExportNamedDeclaration(decl) = stmt
            && decl.source.is_none()
        {
            for spec in &decl.specifiers {
                names.insert(spec.local.name().to_string());
            }
        }
    }
    names
}

/// Names bound by a removable statement, `None` when the statement must stay.
fn candidate_names(stmt: &Statement) -> Option<Vec<String>> {
    match stmt {
        Statement::FunctionDeclaration(func) => Some(vec![func.id.as_ref()?.name.to_string()]),
        Statement::ClassDeclaration(class) if class_is_inert(class) => {
            Some(vec![class.id.as_ref()?.name.to_string()])
        }
        Statement::TSInterfaceDeclaration(decl) => Some(vec![decl.id.name.to_string()]),
        Statement::TSTypeAliasDeclaration(decl) => Some(vec![decl.id.name.to_string()]),
        Statement::VariableDeclaration(decl) => {
            let mut names = Vec::new();
            for d in &decl.declarations {
                let ident = d.id.get_binding_identifier()?;
                if !d.init.as_ref().is_none_or(is_pure) {
                    return None;
                }
                names.push(ident.name.to_string());
            }
            (!names.is_empty()).then_some(names)
        }
        Statement::ImportDeclaration(decl) => {
            // Bare `import './x'` runs for its side effects
            let specifiers = decl.specifiers.as_ref()?;
            if specifiers.is_empty() {
                return None;
            }
            let names = specifiers
                .iter()
                .map(|s| match s {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => s.local.name.to_string(),
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => s.local.name.to_string(),
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        s.local.name.to_string()
                    }
                })
                .collect();
            Some(names)
        }
        _ => None,
    }
}

/// A class whose definition cannot run user code.
fn class_is_inert(class: &Class) -> bool {
    class.decorators.is_empty()
        && class.super_class.as_ref().is_none_or(|e| matches!(e, Expression::Identifier(_)))
        && class.body.body.iter().all(|el| match el {
            ClassElement::StaticBlock(_) => false,
            ClassElement::MethodDefinition(m) => m.decorators.is_empty() && !m.computed,
            ClassElement::PropertyDefinition(p) => {
                p.decorators.is_empty() && !p.computed && !(p.r#static && p.value.is_some())
            }
            ClassElement::AccessorProperty(a) => {
                a.decorators.is_empty() && !a.computed && !(a.r#static && a.value.is_some())
            }
            _ => true,
        })
}

fn is_pure(expr: &Expression) -> bool {
    match expr {
        Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::RegExpLiteral(_)
        | Expression::FunctionExpression(_)
        | Expression::ArrowFunctionExpression(_) => true,
        Expression::TemplateLiteral(t) => t.expressions.is_empty(),
        _ => false,
    }
}

/// Extends a deletion over the line break that follows it.
fn line_end(source: &str, end: usize) -> usize {
    let rest = &source[end.min(source.len())..];
    if rest.starts_with("\r\n") {
        end + 2
    } else if rest.starts_with('\n') {
        end + 1
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::apply_edits;

    fn shake(name: &str, src: &str) -> String {
        apply_edits(src, dead_statement_edits(Path::new(name), src))
    }

    #[test]
    fn test_removes_unused_function() {
        let src = "function unused() {}\nfunction used() {}\nused();\n";
        assert_eq!(shake("a.ts", src), "function used() {}\nused();\n");
    }

    #[test]
    fn test_keeps_exported_declarations() {
        let src = "export function a() {}\nfunction b() {}\nexport { b };\nexport default class C {}\n";
        assert_eq!(shake("a.ts", src), src);
    }

    #[test]
    fn test_keeps_names_used_only_in_types() {
        let src = "interface Props { x: number }\ntype Unused = string;\nexport const p: Props = { x: 1 };\n";
        assert_eq!(
            shake("a.ts", src),
            "interface Props { x: number }\nexport const p: Props = { x: 1 };\n"
        );
    }

    #[test]
    fn test_keeps_side_effecting_initializers() {
        let src = "const registered = register();\nconst name = 'x';\nconst fn = () => 1;\n";
        assert_eq!(shake("a.ts", src), "const registered = register();\n");
    }

    #[test]
    fn test_keeps_destructuring() {
        let src = "const { a } = obj;\n";
        assert_eq!(shake("a.ts", src), src);
    }

    #[test]
    fn test_unused_imports() {
        let src = "import { a, b } from './x';\nimport c from './y';\nimport './z';\nc();\n";
        assert_eq!(shake("a.ts", src), "import c from './y';\nimport './z';\nc();\n");
    }

    #[test]
    fn test_keeps_jsx_components() {
        let src = "import Button from './button';\nexport const App = () => <Button />;\n";
        assert_eq!(shake("app.tsx", src), src);
    }

    #[test]
    fn test_keeps_imports_in_files_with_jsx() {
        let src = "import React from 'react';\nimport * as Preact from 'preact';\nexport const App = () => <div />;\n";
        assert_eq!(shake("main.jsx", src), src);

        let frag = "import { h, Fragment } from 'preact';\nfunction unused() {}\nexport const F = () => <></>;\n";
        assert_eq!(
            shake("frag.tsx", frag),
            "import { h, Fragment } from 'preact';\nexport const F = () => <></>;\n"
        );
    }

    #[test]
    fn test_keeps_classes_with_static_initializers() {
        let src = "class B { static x = init(); }\nclass C { m() {} }\n";
        assert_eq!(shake("a.ts", src), "class B { static x = init(); }\n");
    }

    #[test]
    fn test_keeps_decorated_classes() {
        let src = "@dec\nclass A {}\n";
        assert_eq!(shake("a.ts", src), src);
    }

    #[test]
    fn test_recursive_function_is_kept() {
        let src = "function loop() { loop(); }\n";
        assert_eq!(shake("a.ts", src), src);
    }

    #[test]
    fn test_parse_errors_disable_shaking() {
        let src = "function unused() {}\nconst = ;\n";
        assert!(dead_statement_edits(Path::new("a.ts"), src).is_empty());
    }
}
