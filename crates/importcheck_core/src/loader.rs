//! Loading of executable config modules (babel.config.js, webpack.config.js,
//! vite.config.js) without executing them.
//!
//! The alias aggregator needs the object such a config exports. Evaluating
//! arbitrary project code just to read an alias map is a trust problem, so the
//! capability is a trait: the shipped [`StaticConfigLoader`] parses the config
//! with oxc and folds the statically-known parts of the exported object
//! literal into JSON. Anything dynamic collapses to `null`, which upstream
//! treats as "no aliases from this source".

use anyhow::{Context, Result, anyhow};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser as OxcParser;
use oxc_span::SourceType;
use serde_json::{Map, Value};
use std::{collections::HashMap, fs, path::Path};

/// Capability contract: path of a config module -> its exported object.
///
/// Failure is a normal, recoverable data-absence case for callers.
pub trait ConfigModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Value>;
}

/// Default loader: static extraction only, no code execution.
///
/// Understands `module.exports = <obj>`, `export default <obj>`, a
/// `defineConfig(<obj>)` wrapper, top-level `const`/`let` indirection, and
/// `path.resolve/join(__dirname, "...")` calls (folded to relative paths).
pub struct StaticConfigLoader;

impl ConfigModuleLoader for StaticConfigLoader {
    fn load(&self, path: &Path) -> Result<Value> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let allocator = Allocator::default();
        let ret = OxcParser::new(&allocator, &source, SourceType::default()).parse();
        if ret.panicked || !ret.errors.is_empty() {
            return Err(anyhow!("could not parse {}", path.display()));
        }
        let program = ret.program;

        // Top-level variable initializers, so `module.exports = config` works
        let mut env: HashMap<&str, &Expression> = HashMap::new();
        for stmt in &program.body {
            if let Statement::VariableDeclaration(vd) = stmt {
                for decl in &vd.declarations {
                    if let BindingPatternKind::BindingIdentifier(id) = &decl.id.kind
                        && let Some(init) = &decl.init
                    {
                        env.insert(id.name.as_str(), init);
                    }
                }
            }
        }

        for stmt in &program.body {
            match stmt {
                Statement::ExpressionStatement(es) => {
                    if let Expression::AssignmentExpression(ae) = &es.expression
                        && let AssignmentTarget::StaticMemberExpression(sm) = &ae.left
                        && let Expression::Identifier(obj) = &sm.object
                        && obj.name == "module"
                        && sm.property.name == "exports"
                    {
                        return Ok(eval_expression(&ae.right, &env, 0));
                    }
                }
                Statement::ExportDefaultDeclaration(ed) => {
                    if let Some(expr) = ed.declaration.as_expression() {
                        return Ok(eval_expression(expr, &env, 0));
                    }
                }
                _ => {}
            }
        }

        Err(anyhow!("no exported configuration object found in {}", path.display()))
    }
}

fn eval_expression(expr: &Expression, env: &HashMap<&str, &Expression>, depth: u32) -> Value {
    // Cycle guard for self-referential initializers
    if depth > 16 {
        return Value::Null;
    }
    match expr {
        Expression::StringLiteral(s) => Value::String(s.value.to_string()),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() && t.quasis.len() == 1 => {
            match &t.quasis[0].value.cooked {
                Some(cooked) => Value::String(cooked.to_string()),
                None => Value::Null,
            }
        }
        Expression::NumericLiteral(n) => {
            serde_json::Number::from_f64(n.value).map(Value::Number).unwrap_or(Value::Null)
        }
        Expression::BooleanLiteral(b) => Value::Bool(b.value),
        Expression::NullLiteral(_) => Value::Null,
        Expression::Identifier(id) => {
            if id.name == "__dirname" {
                return Value::String(".".to_string());
            }
            match env.get(id.name.as_str()) {
                Some(init) => eval_expression(init, env, depth + 1),
                None => Value::Null,
            }
        }
        Expression::ObjectExpression(obj) => {
            let mut map = Map::new();
            for prop in &obj.properties {
                if let ObjectPropertyKind::ObjectProperty(p) = prop
                    && !p.computed
                    && let Some(key) = property_key_name(&p.key)
                {
                    map.insert(key, eval_expression(&p.value, env, depth + 1));
                }
            }
            Value::Object(map)
        }
        Expression::ArrayExpression(arr) => Value::Array(
            arr.elements
                .iter()
                .map(|el| match el.as_expression() {
                    Some(e) => eval_expression(e, env, depth + 1),
                    None => Value::Null,
                })
                .collect(),
        ),
        Expression::CallExpression(call) => eval_call(call, env, depth),
        Expression::TSAsExpression(e) => eval_expression(&e.expression, env, depth + 1),
        Expression::TSSatisfiesExpression(e) => eval_expression(&e.expression, env, depth + 1),
        Expression::ParenthesizedExpression(e) => eval_expression(&e.expression, env, depth + 1),
        _ => Value::Null,
    }
}

fn eval_call(call: &CallExpression, env: &HashMap<&str, &Expression>, depth: u32) -> Value {
    // defineConfig({...}) wrapper
    if let Expression::Identifier(callee) = &call.callee
        && callee.name == "defineConfig"
        && let Some(first) = call.arguments.first().and_then(|a| a.as_expression())
    {
        return eval_expression(first, env, depth + 1);
    }

    // path.resolve(__dirname, 'src') / path.join(...) folded to a relative path
    if let Expression::StaticMemberExpression(sm) = &call.callee
        && let Expression::Identifier(obj) = &sm.object
        && obj.name == "path"
        && (sm.property.name == "resolve" || sm.property.name == "join")
    {
        let mut parts: Vec<String> = Vec::new();
        for arg in &call.arguments {
            match arg.as_expression() {
                Some(Expression::Identifier(id)) if id.name == "__dirname" => {}
                Some(Expression::StringLiteral(s)) => parts.push(s.value.to_string()),
                _ => return Value::Null,
            }
        }
        if parts.is_empty() {
            return Value::Null;
        }
        return Value::String(parts.join("/"));
    }

    Value::Null
}

fn property_key_name(key: &PropertyKey) -> Option<String> {
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
