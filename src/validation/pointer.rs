//! JSON Pointer handling (RFC 6901)
//!
//! Instance paths are plain pointers (`/dimension/0`, `""` for the root).
//! Schema paths are URI fragments rooted at `#` (`#/properties/dimension`).

use serde_json::Value;

/// Root of every schema path.
pub const SCHEMA_ROOT: &str = "#";

/// Appends one reference token to a pointer, escaping `~` and `/`.
pub fn child(base: &str, token: &str) -> String {
    let mut out = String::with_capacity(base.len() + token.len() + 1);
    out.push_str(base);
    out.push('/');
    for c in token.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            c => out.push(c),
        }
    }
    out
}

/// Returns the last unescaped reference token of a pointer, if any.
pub fn last_token(pointer: &str) -> Option<String> {
    let (_, token) = pointer.rsplit_once('/')?;
    if token.is_empty() {
        return None;
    }
    Some(token.replace("~1", "/").replace("~0", "~"))
}

/// True if `pointer` is `ancestor` itself or lies below it.
pub fn contains(ancestor: &str, pointer: &str) -> bool {
    match pointer.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// A keyword location resolved against the schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaLocation<'s> {
    /// `#`-rooted pointer, continuing from the target of any local `$ref`
    pub path: String,
    /// The schema value at `path`, when it could be followed
    pub node: Option<&'s Value>,
}

/// Resolves unescaped schema-path tokens against `schema`.
///
/// Errors produced behind a `$ref` carry tokens of the referenced schema with
/// no `$ref` segment. When a token is not a key of a node holding `$ref`, the
/// walk jumps to the reference target. Local targets (`#/definitions/id`)
/// restart the path there. Other targets keep a literal `$ref` segment and stop
/// following the document.
pub fn locate<'s, I>(schema: &'s Value, tokens: I) -> SchemaLocation<'s>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut path = SCHEMA_ROOT.to_string();
    let mut node = Some(schema);

    for token in tokens {
        let token = token.as_ref();
        if let Some(reference) = node.and_then(|n| pending_reference(n, token)) {
            match local_target(schema, reference) {
                Some((target_path, target)) => {
                    path = target_path;
                    node = Some(target);
                }
                None => {
                    path = child(&path, "$ref");
                    node = None;
                }
            }
        }
        path = child(&path, token);
        node = node.and_then(|n| step(n, token));
    }

    SchemaLocation { path, node }
}

/// The `$ref` of `node` when `token` can only come from its target.
fn pending_reference<'s>(node: &'s Value, token: &str) -> Option<&'s str> {
    let object = node.as_object()?;
    let reference = object.get("$ref")?.as_str()?;
    if object.contains_key(token) {
        return None;
    }
    Some(reference)
}

fn local_target<'s>(schema: &'s Value, reference: &str) -> Option<(String, &'s Value)> {
    let fragment = reference.strip_prefix('#')?;
    let target = if fragment.is_empty() {
        schema
    } else {
        schema.pointer(fragment)?
    };
    Some((format!("{}{}", SCHEMA_ROOT, fragment), target))
}

fn step<'s>(node: &'s Value, token: &str) -> Option<&'s Value> {
    match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
