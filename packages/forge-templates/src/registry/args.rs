//! Named-argument extraction for template helpers.

use std::collections::HashMap;

use tera::{Error, Result, Value};

pub(crate) type Args = HashMap<String, Value>;

pub(crate) fn required<'a>(func: &str, args: &'a Args, key: &str) -> Result<&'a Value> {
    args.get(key)
        .ok_or_else(|| format!("{} requires argument `{}`", func, key).into())
}

pub(crate) fn string(func: &str, args: &Args, key: &str) -> Result<String> {
    match required(func, args, key)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(format!("{} expects a string for `{}`", func, key).into()),
    }
}

/// Optional string argument; `null` and absence both read as empty
pub(crate) fn string_or_empty(func: &str, args: &Args, key: &str) -> Result<String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("{} expects a string for `{}`", func, key).into()),
    }
}

pub(crate) fn int(func: &str, args: &Args, key: &str) -> Result<i64> {
    required(func, args, key)?
        .as_i64()
        .ok_or_else(|| format!("{} expects an integer for `{}`", func, key).into())
}

pub(crate) fn int_or(func: &str, args: &Args, key: &str, default: i64) -> Result<i64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => int(func, args, key),
    }
}

pub(crate) fn uint(func: &str, args: &Args, key: &str) -> Result<u64> {
    required(func, args, key)?
        .as_u64()
        .ok_or_else(|| format!("{} expects a non-negative integer for `{}`", func, key).into())
}

pub(crate) fn boolean_or(func: &str, args: &Args, key: &str, default: bool) -> Result<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(format!("{} expects a boolean for `{}`", func, key).into()),
    }
}

pub(crate) fn array<'a>(func: &str, args: &'a Args, key: &str) -> Result<&'a Vec<Value>> {
    required(func, args, key)?
        .as_array()
        .ok_or_else(|| format!("{} expects an array for `{}`", func, key).into())
}

/// Array argument, empty when absent
pub(crate) fn array_or_empty(func: &str, args: &Args, key: &str) -> Result<Vec<Value>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => array(func, args, key).cloned(),
    }
}

pub(crate) fn int_list(func: &str, args: &Args, key: &str) -> Result<Vec<i64>> {
    array_or_empty(func, args, key)?
        .iter()
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| Error::msg(format!("{} expects integers in `{}`", func, key)))
        })
        .collect()
}

/// String → string map, e.g. render metadata
pub(crate) fn string_map(func: &str, args: &Args, key: &str) -> Result<HashMap<String, String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), v)
            })
            .collect()),
        Some(_) => Err(format!("{} expects an object for `{}`", func, key).into()),
    }
}
