use oxc_span::Span;
use std::{collections::HashSet, path::Path};

use crate::constants::NODE_BUILTINS;

/// A module specifier as written in source.
#[derive(Debug, Clone)]
pub struct Specifier {
    pub request: String,
    pub kind: SpecKind,
    /// Byte range of the specifier text, quotes excluded.
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// `import ... from` or a side-effect `import '...'`
    Static,
    /// `import type ... from`, `export type ... from`
    TypeOnly,
    /// `export ... from`, `export * from`
    ReExport,
    /// `require('...')`, `import x = require('...')`
    Require,
    /// `import('...')`
    Dynamic,
}

/// How a specifier is treated by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierClass {
    /// Starts with `.` or is an absolute filesystem path; resolved on disk.
    Relative,
    /// A package, identified by its name (`lodash`, `@scope/name`).
    External { package: String },
}

pub fn classify(request: &str) -> SpecifierClass {
    if request.starts_with('.') || Path::new(request).is_absolute() {
        SpecifierClass::Relative
    } else {
        SpecifierClass::External { package: package_name(request) }
    }
}

/// Package name of a bare specifier: `@scope/name` for scoped packages, the
/// first path segment otherwise.
pub fn package_name(request: &str) -> String {
    let mut segments = request.split('/');
    let first = segments.next().unwrap_or_default();
    if first.starts_with('@')
        && let Some(second) = segments.next()
    {
        return format!("{}/{}", first, second);
    }
    first.to_string()
}

/// Node.js builtin modules, matched by package name.
#[derive(Debug, Clone)]
pub struct BuiltinModules {
    names: HashSet<&'static str>,
}

impl BuiltinModules {
    pub fn node() -> Self {
        Self { names: NODE_BUILTINS.iter().copied().collect() }
    }

    pub fn is_builtin(&self, package: &str) -> bool {
        package.starts_with("node:") || self.names.contains(package)
    }
}

impl Default for BuiltinModules {
    fn default() -> Self {
        Self::node()
    }
}
