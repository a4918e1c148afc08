//! Source fact extraction: one file's source text in, structured facts out.
//!
//! A parse failure is captured as `syntax_error` data on the returned facts,
//! never surfaced as an error across this boundary. Traversal is two-pass:
//! a first pass collects every binding in the file (declarations, parameters,
//! import locals), a second pass records imports, exports, and code issues
//! against that set. The flat binding set deliberately over-approximates
//! scoping, so the undeclared-identifier check under-reports instead of
//! false-positiving across sibling scopes.

use log::debug;
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser as OxcParser;
use oxc_span::{GetSpan, SourceType, Span};
use std::collections::HashSet;
use std::path::Path;

use crate::globals::is_global;
use crate::types::{
    BindingKind, DynamicImportDecl, ExportRecord, ImportBinding, ImportDecl, Issue, IssueKind,
    ModuleFacts, ReExportPair, SyntaxError,
};

const CONSOLE_METHODS: &[&str] = &[
    "log", "warn", "error", "info", "debug", "table", "dir", "assert", "count", "time", "timeEnd",
    "trace",
];

/// Capability contract for turning source text into [`ModuleFacts`].
pub trait FactExtractor: Send + Sync {
    fn extract(&self, source: &str, path: &Path, extension: &str) -> ModuleFacts;
}

/// Default extractor on the oxc parser.
pub struct OxcFactExtractor;

impl FactExtractor for OxcFactExtractor {
    fn extract(&self, source: &str, path: &Path, extension: &str) -> ModuleFacts {
        debug!("Extracting facts from {}", path.display());
        if extension == ".vue" {
            // Only the first <script> block of an SFC is analyzed
            return match vue_script_block(source) {
                Some((block, line_offset)) => extract_block(
                    block,
                    line_offset,
                    SourceType::default().with_typescript(true).with_jsx(true),
                ),
                None => ModuleFacts::empty(),
            };
        }
        extract_block(source, 0, source_type_for(extension))
    }
}

fn source_type_for(extension: &str) -> SourceType {
    let ts = matches!(extension, ".ts" | ".tsx" | ".mts" | ".cts");
    // JSX stays on for plain .js: React codebases use it without a .jsx suffix.
    // Plain .ts keeps it off so `<T>` casts parse.
    let jsx = !matches!(extension, ".ts" | ".mts" | ".cts");
    let mut st = SourceType::default().with_typescript(ts).with_jsx(jsx);
    if matches!(extension, ".mjs" | ".mts") {
        st = st.with_module(true);
    }
    st
}

/// Locates the content of the first `<script>` element and the number of
/// source lines preceding it, so issue lines stay file-relative.
fn vue_script_block(source: &str) -> Option<(&str, u32)> {
    let open = source.find("<script")?;
    let content_start = open + source[open..].find('>')? + 1;
    let content_end = content_start + source[content_start..].find("</script")?;
    let line_offset = source[..content_start].bytes().filter(|&b| b == b'\n').count() as u32;
    Some((&source[content_start..content_end], line_offset))
}

fn extract_block(source: &str, line_offset: u32, source_type: SourceType) -> ModuleFacts {
    let lines = LineIndex::new(source);
    let allocator = Allocator::default();
    let ret = OxcParser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let error = match ret.errors.first() {
            Some(err) => {
                let offset =
                    err.labels.as_ref().and_then(|l| l.first()).map(|l| l.offset() as u32);
                let (line, column) = match offset {
                    Some(o) => {
                        let (line, column) = lines.line_col(o);
                        (Some(line + line_offset), Some(column))
                    }
                    None => (None, None),
                };
                SyntaxError { message: err.message.to_string(), line, column }
            }
            None => SyntaxError { message: "Failed to parse source".into(), line: None, column: None },
        };
        return ModuleFacts::parse_failure(error);
    }

    let program = ret.program;

    let mut bindings = BindingCollector::default();
    bindings.visit_program(&program);

    let mut visitor = FactVisitor {
        lines: &lines,
        line_offset,
        bindings: &bindings,
        used: HashSet::new(),
        imports: Vec::new(),
        dynamic_imports: Vec::new(),
        exports: Vec::new(),
        code_issues: Vec::new(),
    };
    visitor.visit_program(&program);

    let mut code_issues = visitor.code_issues;
    for comment in &program.comments {
        let raw = &source[comment.span.start as usize..comment.span.end as usize];
        let text = raw
            .trim_start_matches("//")
            .trim_start_matches("/*")
            .trim_end_matches("*/")
            .trim();
        let upper = text.to_uppercase();
        let kind = if upper.starts_with("TODO") {
            Some(IssueKind::TodoComment)
        } else if upper.starts_with("FIXME") {
            Some(IssueKind::FixmeComment)
        } else {
            None
        };
        if let Some(kind) = kind {
            let line = lines.line_of(comment.span.start) + line_offset;
            code_issues.push(Issue::new(kind, text, Some(line)));
        }
    }

    let used = visitor.used;
    let unused_imports: Vec<String> =
        bindings.runtime_imports.iter().filter(|name| !used.contains(*name)).cloned().collect();

    ModuleFacts {
        file_not_found: false,
        syntax_error: None,
        imports: visitor.imports,
        dynamic_imports: visitor.dynamic_imports,
        exports: visitor.exports,
        unused_imports,
        code_issues,
    }
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i as u32 + 1);
            }
        }
        Self { starts }
    }

    fn line_of(&self, offset: u32) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }

    fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line_of(offset);
        let start = self.starts[(line - 1) as usize];
        (line, offset - start)
    }
}

/// Pass 1: every binding identifier in the file, plus import locals.
#[derive(Default)]
struct BindingCollector {
    declared: HashSet<String>,
    imported: HashSet<String>,
    /// Runtime (non-type) import locals in declaration order, for the
    /// unused-import report.
    runtime_imports: Vec<String>,
}

impl<'a> Visit<'a> for BindingCollector {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.declared.insert(it.name.to_string());
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let decl_is_type = it.import_kind.is_type();
        if let Some(specifiers) = &it.specifiers {
            for spec in specifiers {
                let (local, is_type) = match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        (s.local.name.to_string(), decl_is_type || s.import_kind.is_type())
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                        (s.local.name.to_string(), decl_is_type)
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        (s.local.name.to_string(), decl_is_type)
                    }
                };
                self.imported.insert(local.clone());
                if !is_type {
                    self.runtime_imports.push(local);
                }
            }
        }
        walk::walk_import_declaration(self, it);
    }
}

/// Pass 2: imports, exports, identifier usage, and code issues.
struct FactVisitor<'b> {
    lines: &'b LineIndex,
    line_offset: u32,
    bindings: &'b BindingCollector,
    used: HashSet<String>,
    imports: Vec<ImportDecl>,
    dynamic_imports: Vec<DynamicImportDecl>,
    exports: Vec<ExportRecord>,
    code_issues: Vec<Issue>,
}

impl FactVisitor<'_> {
    fn line(&self, span: Span) -> u32 {
        self.lines.line_of(span.start) + self.line_offset
    }

    fn mark_used(&mut self, name: &str) {
        if self.bindings.imported.contains(name) {
            self.used.insert(name.to_string());
        }
    }
}

impl<'a> Visit<'a> for FactVisitor<'_> {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        // Type-only declarations are not runtime imports
        if it.import_kind.is_type() {
            return;
        }

        let mut bindings = Vec::new();
        let mut specifier_count = 0;
        if let Some(specifiers) = &it.specifiers {
            specifier_count = specifiers.len();
            for spec in specifiers {
                match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        if s.import_kind.is_type() {
                            continue;
                        }
                        bindings.push(ImportBinding {
                            name: s.imported.name().to_string(),
                            alias: Some(s.local.name.to_string()),
                            kind: BindingKind::Named,
                        });
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                        bindings.push(ImportBinding {
                            name: "default".to_string(),
                            alias: Some(s.local.name.to_string()),
                            kind: BindingKind::Default,
                        });
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        bindings.push(ImportBinding {
                            name: "*".to_string(),
                            alias: Some(s.local.name.to_string()),
                            kind: BindingKind::Namespace,
                        });
                    }
                }
            }
        }

        // `import { type A, type B } from '...'` carries no runtime bindings
        if specifier_count > 0 && bindings.is_empty() {
            return;
        }

        self.imports.push(ImportDecl {
            specifier: it.source.value.to_string(),
            bindings,
            line: self.line(it.span),
        });
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(sl) = &it.source {
            self.dynamic_imports.push(DynamicImportDecl {
                specifier: sl.value.to_string(),
                line: self.line(it.span),
            });
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let line = self.line(it.span);
        if let Expression::Identifier(callee) = &it.callee {
            if callee.name.as_str() == "require"
                && it.arguments.len() == 1
                && let Some(Expression::StringLiteral(sl)) = it.arguments[0].as_expression()
            {
                self.imports.push(ImportDecl {
                    specifier: sl.value.to_string(),
                    bindings: vec![ImportBinding {
                        name: "default".to_string(),
                        alias: None,
                        kind: BindingKind::Require,
                    }],
                    line,
                });
            }
            if callee.name.as_str() == "eval" {
                self.code_issues.push(Issue::new(
                    IssueKind::EvalUsage,
                    "Usage of 'eval' is discouraged.",
                    Some(line),
                ));
            }
        }
        if let Expression::StaticMemberExpression(member) = &it.callee
            && let Expression::Identifier(obj) = &member.object
            && obj.name.as_str() == "console"
            && CONSOLE_METHODS.contains(&member.property.name.as_str())
        {
            let method = format!("console.{}", member.property.name);
            self.code_issues.push(
                Issue::new(IssueKind::ConsoleUsage, format!("Usage of '{}'.", method), Some(line))
                    .with_identifier(method),
            );
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        let line = self.line(it.span);
        if let Some(source) = &it.source {
            let pairs = it
                .specifiers
                .iter()
                .map(|s| ReExportPair {
                    local: s.local.name().to_string(),
                    exported: s.exported.name().to_string(),
                })
                .collect();
            self.exports.push(ExportRecord::ReExport {
                from: source.value.to_string(),
                pairs,
                line,
            });
            // Source-side specifier names are not local references
            return;
        }

        if let Some(declaration) = &it.declaration {
            let mut names = Vec::new();
            if let Declaration::VariableDeclaration(vd) = declaration {
                for decl in &vd.declarations {
                    if let BindingPatternKind::BindingIdentifier(id) = &decl.id.kind {
                        names.push(id.name.to_string());
                    }
                }
            } else if let Some(id) = declaration.id() {
                names.push(id.name.to_string());
            }
            if !names.is_empty() {
                self.exports.push(ExportRecord::Named { names, line });
            }
        } else if !it.specifiers.is_empty() {
            let names = it.specifiers.iter().map(|s| s.exported.name().to_string()).collect();
            self.exports.push(ExportRecord::Named { names, line });
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_default_declaration(&mut self, it: &ExportDefaultDeclaration<'a>) {
        self.exports.push(ExportRecord::Default { line: self.line(it.span) });
        walk::walk_export_default_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.exports.push(ExportRecord::ExportAll {
            from: it.source.value.to_string(),
            line: self.line(it.span),
        });
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        let name = it.name.as_str();
        self.mark_used(name);
        if !self.bindings.declared.contains(name) && !is_global(name) {
            self.code_issues.push(
                Issue::new(
                    IssueKind::UndeclaredIdentifier,
                    format!("Identifier '{}' is not declared.", name),
                    Some(self.line(it.span)),
                )
                .with_identifier(name),
            );
        }
    }

    // JSX element names are handled in visit_jsx_opening_element; suppressing
    // descent here keeps them out of the identifier-reference check.
    fn visit_jsx_element_name(&mut self, _it: &JSXElementName<'a>) {}

    fn visit_jsx_opening_element(&mut self, it: &JSXOpeningElement<'a>) {
        let line = self.line(it.span);
        match &it.name {
            JSXElementName::IdentifierReference(ident) => {
                let name = ident.name.to_string();
                self.mark_used(&name);
                if is_component_name(&name)
                    && !self.bindings.declared.contains(&name)
                    && !is_global(&name)
                {
                    self.code_issues.push(
                        Issue::new(
                            IssueKind::UndeclaredJsxComponent,
                            format!("JSX component '<{}>' is not declared or imported.", name),
                            Some(line),
                        )
                        .with_identifier(name),
                    );
                }
            }
            JSXElementName::Identifier(ident) => {
                let name = ident.name.to_string();
                if is_component_name(&name) {
                    self.mark_used(&name);
                    if !self.bindings.declared.contains(&name) && !is_global(&name) {
                        self.code_issues.push(
                            Issue::new(
                                IssueKind::UndeclaredJsxComponent,
                                format!("JSX component '<{}>' is not declared or imported.", name),
                                Some(line),
                            )
                            .with_identifier(name),
                        );
                    }
                }
            }
            JSXElementName::MemberExpression(member) => {
                // <Foo.Bar/>: the leftmost object is the referenced binding
                if let Some(root) = leftmost_jsx_object(member) {
                    self.mark_used(&root);
                }
            }
            _ => {}
        }
        walk::walk_jsx_opening_element(self, it);
    }

    fn visit_object_expression(&mut self, it: &ObjectExpression<'a>) {
        let mut seen: HashSet<String> = HashSet::new();
        for prop in &it.properties {
            if let ObjectPropertyKind::ObjectProperty(p) = prop
                && !p.computed
                && let Some(key) = static_property_key(&p.key)
            {
                if !seen.insert(key.clone()) {
                    self.code_issues.push(
                        Issue::new(
                            IssueKind::DuplicateObjectKey,
                            format!("Duplicate key '{}' in object literal.", key),
                            Some(self.line(p.key.span())),
                        )
                        .with_identifier(key),
                    );
                }
            }
        }
        walk::walk_object_expression(self, it);
    }

    fn visit_debugger_statement(&mut self, it: &DebuggerStatement) {
        self.code_issues.push(Issue::new(
            IssueKind::DebuggerStatement,
            "'debugger' statement found.",
            Some(self.line(it.span)),
        ));
    }
}

fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn leftmost_jsx_object(member: &JSXMemberExpression) -> Option<String> {
    let mut object = &member.object;
    loop {
        match object {
            JSXMemberExpressionObject::IdentifierReference(id) => return Some(id.name.to_string()),
            JSXMemberExpressionObject::MemberExpression(inner) => object = &inner.object,
            JSXMemberExpressionObject::ThisExpression(_) => return None,
        }
    }
}

fn static_property_key(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        PropertyKey::NumericLiteral(n) => {
            if n.value.fract() == 0.0 && n.value.is_finite() {
                Some(format!("{}", n.value as i64))
            } else {
                Some(format!("{}", n.value))
            }
        }
        _ => None,
    }
}
