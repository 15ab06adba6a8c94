use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::{SourceType, Span};
use std::path::Path;

use crate::types::{SpecKind, Specifier};

/// Specifiers found in one source file, in source order.
#[derive(Debug, Clone, Default)]
pub struct ModuleScan {
    pub specifiers: Vec<Specifier>,
    /// Number of syntax errors the parser recovered from.
    pub errors: usize,
    /// The parser gave up; `specifiers` holds whatever was found before that.
    pub panicked: bool,
}

/// Parses `source` and collects every import/export module specifier.
///
/// Covers static imports (type-only included), re-exports, TypeScript
/// `import x = require()`, and string-literal `require()`/`import()` calls at
/// any depth.
pub fn scan_source(file: &Path, source: &str) -> ModuleScan {
    trace!("Parsing file for specifiers: {}", file.display());
    let st = source_type_for(file);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, source, st).parse();

    let mut specs: Vec<Specifier> = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let kind =
                    if decl.import_kind.is_type() { SpecKind::TypeOnly } else { SpecKind::Static };
                trace!("Found import: '{}' in {}", decl.source.value, file.display());
                specs.push(specifier(source, &decl.source, kind));
            }
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(src) = &decl.source {
                    let kind = if decl.export_kind.is_type() {
                        SpecKind::TypeOnly
                    } else {
                        SpecKind::ReExport
                    };
                    trace!("Found re-export: '{}' in {}", src.value, file.display());
                    specs.push(specifier(source, src, kind));
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                let kind =
                    if decl.export_kind.is_type() { SpecKind::TypeOnly } else { SpecKind::ReExport };
                trace!("Found star re-export: '{}' in {}", decl.source.value, file.display());
                specs.push(specifier(source, &decl.source, kind));
            }
            Statement::TSImportEqualsDeclaration(decl) => {
                if let TSModuleReference::ExternalModuleReference(ext) = &decl.module_reference {
                    trace!("Found import-equals: '{}' in {}", ext.expression.value, file.display());
                    specs.push(specifier(source, &ext.expression, SpecKind::Require));
                }
            }
            _ => {}
        }
    }

    // require() and import() can sit anywhere, including function bodies
    let mut calls = CallSpecifiers { source, specs: Vec::new() };
    calls.visit_program(&program);
    specs.extend(calls.specs);
    specs.sort_by_key(|s| s.span.start);

    debug!("Found {} specifiers in {}", specs.len(), file.display());
    ModuleScan { specifiers: specs, errors: errors.len(), panicked }
}

struct CallSpecifiers<'s> {
    source: &'s str,
    specs: Vec<Specifier>,
}

impl<'a> Visit<'a> for CallSpecifiers<'_> {
    fn visit_call_expression(&mut self, ce: &CallExpression<'a>) {
        if let Expression::Identifier(callee_ident) = &ce.callee
            && callee_ident.name.as_str() == "require"
            && ce.arguments.len() == 1
            && let Some(Expression::StringLiteral(sl)) = ce.arguments[0].as_expression()
        {
            trace!("Found require() call: '{}'", sl.value);
            self.specs.push(specifier(self.source, sl, SpecKind::Require));
        }
        walk::walk_call_expression(self, ce);
    }

    fn visit_import_expression(&mut self, ie: &ImportExpression<'a>) {
        if let Expression::StringLiteral(sl) = &ie.source {
            trace!("Found dynamic import(): '{}'", sl.value);
            self.specs.push(specifier(self.source, sl, SpecKind::Dynamic));
        }
        walk::walk_import_expression(self, ie);
    }
}

fn specifier(source: &str, lit: &StringLiteral, kind: SpecKind) -> Specifier {
    Specifier { request: lit.value.to_string(), kind, span: inner_span(source, lit.span) }
}

/// Narrows a string literal span to the text between its quotes.
fn inner_span(source: &str, span: Span) -> Span {
    let bytes = source.as_bytes();
    let (mut start, mut end) = (span.start, span.end);
    let is_quote = |b: Option<&u8>| matches!(b, Some(b'\'') | Some(b'"'));
    if end > start && is_quote(bytes.get(start as usize)) {
        start += 1;
    }
    if end > start && is_quote(bytes.get(end as usize - 1)) {
        end -= 1;
    }
    Span::new(start, end)
}

pub fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    SourceType::default()
        .with_module(!matches!(ext, Some("cjs")))
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx") | Some("js")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(name: &str, src: &str) -> ModuleScan {
        scan_source(Path::new(name), src)
    }

    fn requests(scan: &ModuleScan) -> Vec<&str> {
        scan.specifiers.iter().map(|s| s.request.as_str()).collect()
    }

    #[test]
    fn test_static_import_default() {
        let result = scan("test.js", "import foo from './foo';");
        assert_eq!(requests(&result), vec!["./foo"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::Static);
    }

    #[test]
    fn test_span_excludes_quotes() {
        let src = "import { bar } from \"./utils\";";
        let result = scan("test.js", src);
        let span = result.specifiers[0].span;
        assert_eq!(&src[span.start as usize..span.end as usize], "./utils");
    }

    #[test]
    fn test_side_effect_import() {
        let result = scan("test.js", "import './polyfills';");
        assert_eq!(requests(&result), vec!["./polyfills"]);
    }

    #[test]
    fn test_type_only_import_is_kept() {
        let result = scan("test.ts", "import type { Foo } from './types';");
        assert_eq!(requests(&result), vec!["./types"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::TypeOnly);
    }

    #[test]
    fn test_export_from() {
        let result = scan(
            "test.ts",
            "export { a } from './a';\nexport * from './b';\nexport * as c from './c';\nexport type { D } from './d';",
        );
        assert_eq!(requests(&result), vec!["./a", "./b", "./c", "./d"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::ReExport);
        assert_eq!(result.specifiers[1].kind, SpecKind::ReExport);
        assert_eq!(result.specifiers[3].kind, SpecKind::TypeOnly);
    }

    #[test]
    fn test_local_export_has_no_specifier() {
        let result = scan("test.ts", "const a = 1;\nexport { a };");
        assert!(result.specifiers.is_empty());
    }

    #[test]
    fn test_import_equals_require() {
        let result = scan("test.ts", "import fs = require('fs');");
        assert_eq!(requests(&result), vec!["fs"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::Require);
    }

    #[test]
    fn test_require_call() {
        let result = scan("test.js", "const fs = require('fs');");
        assert_eq!(requests(&result), vec!["fs"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::Require);
    }

    #[test]
    fn test_require_in_nested_function() {
        let result =
            scan("test.js", "function load() {\n  return require('./config');\n}\nload();");
        assert_eq!(requests(&result), vec!["./config"]);
    }

    #[test]
    fn test_dynamic_import_in_async_function() {
        let result = scan("test.ts", "async function lazy() { return await import('./lazy'); }");
        assert_eq!(requests(&result), vec!["./lazy"]);
        assert_eq!(result.specifiers[0].kind, SpecKind::Dynamic);
    }

    #[test]
    fn test_non_literal_require_ignored() {
        let result = scan("test.js", "const name = './a';\nconst m = require(name);");
        assert!(result.specifiers.is_empty());
    }

    #[test]
    fn test_specifiers_in_source_order() {
        let result = scan(
            "test.js",
            "const b = require('./b');\nimport a from './a';\nexport * from './c';",
        );
        assert_eq!(requests(&result), vec!["./b", "./a", "./c"]);
    }

    #[test]
    fn test_jsx_file() {
        let result =
            scan("test.jsx", "import React from 'react';\nexport const App = () => <div />;");
        assert_eq!(requests(&result), vec!["react"]);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn test_tsx_file() {
        let result = scan(
            "test.tsx",
            "import { Button } from './Button';\nexport const App = (p: { n: number }) => <Button n={p.n} />;",
        );
        assert_eq!(requests(&result), vec!["./Button"]);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn test_syntax_error_reported() {
        let result = scan("test.ts", "import { a } from './a';\nconst = ;");
        assert!(result.errors > 0 || result.panicked);
    }
}
