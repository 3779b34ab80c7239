//! Compile-time resolution of `%parameter%` and `%env(...)%` placeholders.
//!
//! A string that consists of exactly one placeholder is replaced by the
//! referenced value and keeps its type, so `'%env(bool:APP_DEBUG)%'` compiles
//! to a YAML boolean. Placeholders embedded in a longer string are substituted
//! textually. `%%` always stands for a literal `%`.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Number, Value};
use std::collections::HashMap;

static PLACEHOLDER_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"%%|%env\((?P<env>[^()%\s]+)\)%|%(?P<param>[^%\s]+)%").unwrap());

/// Looks up an environment variable by name.
pub(crate) type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn process_env(name: &str) -> Option<String> {
  std::env::var(name).ok()
}

/// Resolves every parameter of a raw parameter bag.
pub(crate) fn resolve_all(
  raw: &HashMap<String, Value>,
  env: EnvLookup<'_>,
) -> Result<HashMap<String, Value>> {
  let mut resolver = ParameterResolver::new(raw, env);
  let mut names: Vec<&String> = raw.keys().collect();
  names.sort();
  for name in names {
    resolver.resolve_parameter(name)?;
  }
  Ok(resolver.resolved)
}

struct ParameterResolver<'a> {
  raw: &'a HashMap<String, Value>,
  env: EnvLookup<'a>,
  resolved: HashMap<String, Value>,
  resolving: Vec<String>,
}

impl<'a> ParameterResolver<'a> {
  fn new(raw: &'a HashMap<String, Value>, env: EnvLookup<'a>) -> Self {
    Self {
      raw,
      env,
      resolved: HashMap::with_capacity(raw.len()),
      resolving: Vec::new(),
    }
  }

  fn resolve_parameter(&mut self, name: &str) -> Result<Value> {
    if let Some(value) = self.resolved.get(name) {
      return Ok(value.clone());
    }
    if self.resolving.iter().any(|n| n == name) {
      let mut path = self.resolving.clone();
      path.push(name.to_owned());
      return Err(Error::CircularParameter {
        name: name.to_owned(),
        path: path.join(" -> "),
      });
    }
    let raw = self
      .raw
      .get(name)
      .ok_or_else(|| Error::ParameterNotFound(name.to_owned()))?;

    self.resolving.push(name.to_owned());
    let result = self.resolve_value(raw);
    self.resolving.pop();

    let value = result?;
    self.resolved.insert(name.to_owned(), value.clone());
    Ok(value)
  }

  fn resolve_value(&mut self, value: &Value) -> Result<Value> {
    match value {
      Value::String(s) => self.resolve_string(s),
      Value::Sequence(items) => items
        .iter()
        .map(|item| self.resolve_value(item))
        .collect::<Result<Vec<_>>>()
        .map(Value::Sequence),
      Value::Mapping(map) => {
        let mut out = Mapping::with_capacity(map.len());
        for (key, item) in map {
          out.insert(self.resolve_value(key)?, self.resolve_value(item)?);
        }
        Ok(Value::Mapping(out))
      }
      Value::Tagged(tagged) => {
        let mut tagged = tagged.as_ref().clone();
        tagged.value = self.resolve_value(&tagged.value)?;
        Ok(Value::Tagged(Box::new(tagged)))
      }
      other => Ok(other.clone()),
    }
  }

  fn resolve_string(&mut self, s: &str) -> Result<Value> {
    if let Some(caps) = PLACEHOLDER_REGEX.captures(s) {
      let whole = caps.get(0).map_or(false, |m| m.start() == 0 && m.end() == s.len());
      if whole && &caps[0] != "%%" {
        return self.resolve_placeholder(&caps);
      }
    } else {
      return Ok(Value::String(s.to_owned()));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in PLACEHOLDER_REGEX.captures_iter(s) {
      let Some(m) = caps.get(0) else { continue };
      out.push_str(&s[last..m.start()]);
      last = m.end();
      if m.as_str() == "%%" {
        out.push('%');
        continue;
      }
      let value = self.resolve_placeholder(&caps)?;
      let name = caps
        .name("param")
        .or_else(|| caps.name("env"))
        .map_or("", |g| g.as_str());
      out.push_str(&embed(name, &value, s)?);
    }
    out.push_str(&s[last..]);
    Ok(Value::String(out))
  }

  fn resolve_placeholder(&mut self, caps: &Captures<'_>) -> Result<Value> {
    if let Some(expression) = caps.name("env") {
      return resolve_env(expression.as_str(), self.env);
    }
    match caps.name("param") {
      Some(name) => self.resolve_parameter(name.as_str()),
      None => Ok(Value::String("%".to_owned())),
    }
  }
}

fn embed(name: &str, value: &Value, within: &str) -> Result<String> {
  let kind = match value {
    Value::String(s) => return Ok(s.clone()),
    Value::Number(n) => return Ok(n.to_string()),
    Value::Bool(b) => return Ok(b.to_string()),
    Value::Null => return Ok(String::new()),
    Value::Sequence(_) => "sequence",
    Value::Mapping(_) => "mapping",
    Value::Tagged(_) => "tagged value",
  };
  Err(Error::NonScalarParameter {
    name: name.to_owned(),
    kind,
    value: within.to_owned(),
  })
}

/// Evaluates an `env(...)` expression such as `bool:trim:APP_DEBUG`.
///
/// Processors apply right to left, starting from the raw variable.
pub(crate) fn resolve_env(expression: &str, env: EnvLookup<'_>) -> Result<Value> {
  let mut parts: Vec<&str> = expression.split(':').collect();
  let name = parts.pop().unwrap_or_default();
  let raw = env(name).ok_or_else(|| Error::EnvNotFound(name.to_owned()))?;

  let mut value = Value::String(raw);
  for processor in parts.into_iter().rev() {
    value = apply_processor(processor, value, expression)?;
  }
  Ok(value)
}

fn apply_processor(processor: &str, value: Value, expression: &str) -> Result<Value> {
  let invalid = |message: String| Error::EnvProcessor {
    expression: expression.to_owned(),
    processor: processor.to_owned(),
    message,
  };

  match processor {
    "string" => Ok(Value::String(scalar_text(&value))),
    "trim" => Ok(Value::String(scalar_text(&value).trim().to_owned())),
    "bool" => Ok(Value::Bool(truthy(&value))),
    "not" => Ok(Value::Bool(!truthy(&value))),
    "int" => {
      let text = scalar_text(&value);
      let text = text.trim();
      if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Number(Number::from(i)));
      }
      match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Number(Number::from(f.trunc() as i64))),
        _ => Err(invalid(format!("non-numeric value \"{text}\""))),
      }
    }
    "float" => {
      let text = scalar_text(&value);
      text
        .trim()
        .parse::<f64>()
        .map(|f| Value::Number(Number::from(f)))
        .map_err(|_| invalid(format!("non-numeric value \"{}\"", text.trim())))
    }
    other => Err(Error::UnknownEnvProcessor {
      prefix: other.to_owned(),
      expression: expression.to_owned(),
    }),
  }
}

fn scalar_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    _ => String::new(),
  }
}

fn truthy(value: &Value) -> bool {
  match value {
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
    Value::String(s) => {
      let s = s.trim().to_ascii_lowercase();
      match s.as_str() {
        "true" | "on" | "yes" | "1" => true,
        _ => s.parse::<f64>().map_or(false, |f| f != 0.0),
      }
    }
    _ => false,
  }
}
