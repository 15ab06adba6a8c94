//! File extension tables and the Node.js builtin module list.
//!
//! Resolution order matters: a relative specifier without an extension is
//! tried against `RESOLVE_EXTENSIONS` front to back and the first file that
//! exists wins, so `.ts` shadows a sibling `.js` of the same stem.

/// Extensions of files that are parsed for import/export specifiers
pub const JS_TS_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Extensions to try when resolving module imports (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

/// Index file names to try when resolving directory imports
pub const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "index.mts",
    "index.cts",
    "index.mjs",
    "index.cjs",
];

/// JavaScript extension in an import that may name a TypeScript source on disk
/// (`import './util.js'` compiled from `util.ts`).
pub const JS_TO_TS_EXTENSIONS: &[(&str, &[&str])] = &[
    ("js", &["ts", "tsx"]),
    ("jsx", &["tsx"]),
    ("mjs", &["mts"]),
    ("cjs", &["cts"]),
];

/// Modules shipped with Node.js. Never recorded as package dependencies.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_extensions_matches_js_ts_extensions() {
        assert_eq!(RESOLVE_EXTENSIONS.len(), JS_TS_EXTENSIONS.len());
        for ext in RESOLVE_EXTENSIONS {
            assert!(
                JS_TS_EXTENSIONS.contains(ext),
                "RESOLVE_EXTENSIONS contains '{}' which is not in JS_TS_EXTENSIONS",
                ext
            );
        }
    }

    #[test]
    fn test_resolve_order_prefers_typescript() {
        assert_eq!(&RESOLVE_EXTENSIONS[..4], &["ts", "tsx", "js", "jsx"]);
    }

    #[test]
    fn test_index_files_follow_resolve_order() {
        assert_eq!(INDEX_FILES.len(), RESOLVE_EXTENSIONS.len());
        for (index_file, ext) in INDEX_FILES.iter().zip(RESOLVE_EXTENSIONS) {
            assert_eq!(*index_file, format!("index.{}", ext));
        }
    }

    #[test]
    fn test_node_builtins_has_common_modules() {
        for name in ["fs", "path", "http", "crypto", "child_process", "url"] {
            assert!(NODE_BUILTINS.contains(&name), "missing builtin '{}'", name);
        }
        assert!(!NODE_BUILTINS.contains(&"lodash"));
    }
}
