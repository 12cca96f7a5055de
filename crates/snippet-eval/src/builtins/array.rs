//! `Array` and `Array.prototype`.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::builtins::{arg, define_global, define_methods, relative_index, to_integer};
use crate::error::EvalResult;
use crate::interpreter::{Interpreter, MAX_ARRAY_LENGTH};
use crate::realm::Realm;
use crate::value::{ObjectKind, ObjectRef, Value};

pub(crate) fn install(realm: &Realm) {
    let proto = &realm.intrinsics().array_proto;
    let ctor = realm.new_constructor("Array", Rc::new(array_ctor), proto);
    define_methods(
        realm,
        &ctor,
        &[("isArray", is_array), ("of", array_of), ("from", array_from)],
    );
    define_global(realm, "Array", Value::Object(ctor));

    define_methods(
        realm,
        proto,
        &[
            // Mutators
            ("push", push),
            ("pop", pop),
            ("shift", shift),
            ("unshift", unshift),
            ("splice", splice),
            ("reverse", reverse),
            ("sort", sort),
            ("fill", fill),
            // Accessors
            ("slice", slice),
            ("concat", concat),
            ("join", join),
            ("toString", array_to_string),
            ("indexOf", index_of),
            ("lastIndexOf", last_index_of),
            ("includes", includes),
            ("at", at),
            ("flat", flat),
            // Iteration
            ("forEach", for_each),
            ("map", map),
            ("filter", filter),
            ("find", find),
            ("findIndex", find_index),
            ("findLast", find_last),
            ("findLastIndex", find_last_index),
            ("some", some),
            ("every", every),
            ("reduce", reduce),
            ("reduceRight", reduce_right),
        ],
    );
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn this_array(interp: &Interpreter<'_>, this: &Value, method: &str) -> EvalResult<ObjectRef> {
    match this {
        Value::Object(obj) if obj.is_array() => Ok(obj.clone()),
        _ => Err(interp.type_error(format!(
            "Array.prototype.{method} called on non-array"
        ))),
    }
}

/// Run `f` on the array's element vector.
fn with_items<R>(obj: &ObjectRef, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
    let mut data = obj.borrow_mut();
    match &mut data.kind {
        ObjectKind::Array(items) => f(items),
        _ => f(&mut Vec::new()),
    }
}

fn elements(obj: &ObjectRef) -> Vec<Value> {
    obj.array_elements().unwrap_or_default()
}

fn callback_arg(interp: &Interpreter<'_>, args: &[Value]) -> EvalResult<Value> {
    let callback = arg(args, 0);
    if !callback.is_callable() {
        let shown = interp.display(&callback);
        return Err(interp.type_error(format!("{shown} is not a function")));
    }
    Ok(callback)
}

/// Call `callback(element, index, array)` for each element until `stop`
/// says so. Returns the index it stopped at.
fn scan(
    interp: &mut Interpreter<'_>,
    this: &Value,
    args: &[Value],
    method: &str,
    reverse: bool,
    mut stop: impl FnMut(&Value, Value) -> bool,
) -> EvalResult<Option<usize>> {
    let array = this_array(interp, this, method)?;
    let callback = callback_arg(interp, args)?;
    let receiver = arg(args, 1);
    let items = elements(&array);
    let mut order: Vec<usize> = (0..items.len()).collect();
    if reverse {
        order.reverse();
    }
    for i in order {
        let result = interp.call(
            &callback,
            &receiver,
            &[items[i].clone(), Value::Number(i as f64), this.clone()],
        )?;
        if stop(&items[i], result) {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

// ══════════════════════════════════════════════════════════════════════════════
// Constructor & Statics
// ══════════════════════════════════════════════════════════════════════════════

fn array_ctor(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    if let [Value::Number(n)] = args {
        let len = checked_length(interp, *n)?;
        return Ok(interp.realm().new_array(vec![Value::Undefined; len]));
    }
    Ok(interp.realm().new_array(args.to_vec()))
}

/// A length the array heap can hold.
fn checked_length(interp: &mut Interpreter<'_>, n: f64) -> EvalResult<usize> {
    if n < 0.0 || n.fract() != 0.0 || n > MAX_ARRAY_LENGTH as f64 {
        return Err(interp.range_error("Invalid array length"));
    }
    Ok(n as usize)
}

fn is_array(_interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Object(obj) if obj.is_array())))
}

fn array_of(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(interp.realm().new_array(args.to_vec()))
}

fn array_from(interp: &mut Interpreter<'_>, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let source = arg(args, 0);
    let items = match &source {
        Value::String(_) => interp.iterate(&source)?,
        Value::Object(obj) if obj.is_array() => elements(obj),
        Value::Object(_) => {
            let length = interp.get_property(&source, "length")?;
            let length = to_integer(interp, &length)?.max(0.0);
            let length = checked_length(interp, length)?;
            let mut items = Vec::with_capacity(length);
            for i in 0..length {
                items.push(interp.get_property(&source, &i.to_string())?);
            }
            items
        }
        Value::Undefined | Value::Null => {
            return Err(interp.type_error("Cannot convert undefined or null to object"));
        }
        _ => Vec::new(),
    };
    let mapper = arg(args, 1);
    if mapper.is_undefined() {
        return Ok(interp.realm().new_array(items));
    }
    let mut mapped = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        mapped.push(interp.call(&mapper, &Value::Undefined, &[item, Value::Number(i as f64)])?);
    }
    Ok(interp.realm().new_array(mapped))
}

// ══════════════════════════════════════════════════════════════════════════════
// Mutators
// ══════════════════════════════════════════════════════════════════════════════

fn push(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "push")?;
    let len = with_items(&array, |items| {
        items.extend_from_slice(args);
        items.len()
    });
    Ok(Value::Number(len as f64))
}

fn pop(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "pop")?;
    Ok(with_items(&array, |items| items.pop()).unwrap_or_default())
}

fn shift(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "shift")?;
    Ok(with_items(&array, |items| {
        if items.is_empty() {
            Value::Undefined
        } else {
            items.remove(0)
        }
    }))
}

fn unshift(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "unshift")?;
    let len = with_items(&array, |items| {
        items.splice(0..0, args.iter().cloned());
        items.len()
    });
    Ok(Value::Number(len as f64))
}

fn splice(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "splice")?;
    let len = elements(&array).len();
    let start = relative_index(interp, &arg(args, 0), len, 0)?;
    let delete_count = match args.get(1) {
        None => len - start,
        Some(count) => (to_integer(interp, count)?.max(0.0) as usize).min(len - start),
    };
    let inserted = args.get(2..).unwrap_or_default();
    let removed: Vec<Value> = with_items(&array, |items| {
        items
            .splice(start..start + delete_count, inserted.iter().cloned())
            .collect()
    });
    Ok(interp.realm().new_array(removed))
}

fn reverse(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "reverse")?;
    with_items(&array, |items| items.reverse());
    Ok(this.clone())
}

fn sort(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "sort")?;
    let comparator = arg(args, 0);
    if !comparator.is_undefined() && !comparator.is_callable() {
        return Err(interp.type_error(
            "The comparison function must be either a function or undefined",
        ));
    }
    let sorted = merge_sort(interp, elements(&array), &comparator)?;
    with_items(&array, |items| *items = sorted);
    Ok(this.clone())
}

/// Stable merge sort with a comparator that may throw.
fn merge_sort(
    interp: &mut Interpreter<'_>,
    mut items: Vec<Value>,
    comparator: &Value,
) -> EvalResult<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(interp, items, comparator)?;
    let right = merge_sort(interp, right, comparator)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut l, mut r) = (0, 0);
    while l < left.len() && r < right.len() {
        if compare(interp, &right[r], &left[l], comparator)? == Ordering::Less {
            merged.push(right[r].clone());
            r += 1;
        } else {
            merged.push(left[l].clone());
            l += 1;
        }
    }
    merged.extend_from_slice(&left[l..]);
    merged.extend_from_slice(&right[r..]);
    Ok(merged)
}

/// Sort order: `undefined` last, then the comparator or string order.
fn compare(
    interp: &mut Interpreter<'_>,
    a: &Value,
    b: &Value,
    comparator: &Value,
) -> EvalResult<Ordering> {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => return Ok(Ordering::Equal),
        (Value::Undefined, _) => return Ok(Ordering::Greater),
        (_, Value::Undefined) => return Ok(Ordering::Less),
        _ => {}
    }
    if comparator.is_callable() {
        let result = interp.call(comparator, &Value::Undefined, &[a.clone(), b.clone()])?;
        let n = interp.to_number(&result)?;
        return Ok(n.partial_cmp(&0.0).unwrap_or(Ordering::Equal));
    }
    let a = interp.to_string(a)?;
    let b = interp.to_string(b)?;
    Ok(a.cmp(&b))
}

fn fill(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "fill")?;
    let len = elements(&array).len();
    let start = relative_index(interp, &arg(args, 1), len, 0)?;
    let end = relative_index(interp, &arg(args, 2), len, len)?;
    let value = arg(args, 0);
    with_items(&array, |items| {
        for slot in items.iter_mut().take(end).skip(start) {
            *slot = value.clone();
        }
    });
    Ok(this.clone())
}

// ══════════════════════════════════════════════════════════════════════════════
// Accessors
// ══════════════════════════════════════════════════════════════════════════════

fn slice(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "slice")?;
    let items = elements(&array);
    let start = relative_index(interp, &arg(args, 0), items.len(), 0)?;
    let end = relative_index(interp, &arg(args, 1), items.len(), items.len())?;
    let sliced = items.get(start..end.max(start)).unwrap_or_default().to_vec();
    Ok(interp.realm().new_array(sliced))
}

fn concat(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "concat")?;
    let mut items = elements(&array);
    for value in args {
        match value {
            Value::Object(obj) if obj.is_array() => items.extend(elements(obj)),
            other => items.push(other.clone()),
        }
    }
    Ok(interp.realm().new_array(items))
}

fn join_with(interp: &mut Interpreter<'_>, array: &ObjectRef, separator: &str) -> EvalResult<String> {
    let mut parts = Vec::new();
    for item in elements(array) {
        parts.push(match item {
            Value::Undefined | Value::Null => String::new(),
            other => interp.to_string(&other)?.to_string(),
        });
    }
    Ok(parts.join(separator))
}

fn join(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "join")?;
    let separator = match arg(args, 0) {
        Value::Undefined => Rc::from(","),
        other => interp.to_string(&other)?,
    };
    join_with(interp, &array, &separator).map(Value::from)
}

fn array_to_string(interp: &mut Interpreter<'_>, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "toString")?;
    join_with(interp, &array, ",").map(Value::from)
}

fn index_of(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "indexOf")?;
    let items = elements(&array);
    let start = relative_index(interp, &arg(args, 1), items.len(), 0)?;
    let needle = arg(args, 0);
    let found = items
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, item)| item.strict_equals(&needle))
        .map(|(i, _)| i as f64);
    Ok(Value::Number(found.unwrap_or(-1.0)))
}

fn last_index_of(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "lastIndexOf")?;
    let items = elements(&array);
    let needle = arg(args, 0);
    let found = items
        .iter()
        .rposition(|item| item.strict_equals(&needle))
        .map(|i| i as f64);
    Ok(Value::Number(found.unwrap_or(-1.0)))
}

fn includes(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "includes")?;
    let needle = arg(args, 0);
    Ok(Value::Bool(
        elements(&array).iter().any(|item| item.same_value_zero(&needle)),
    ))
}

fn at(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "at")?;
    let items = elements(&array);
    let index = to_integer(interp, &arg(args, 0))?;
    let resolved = if index < 0.0 { items.len() as f64 + index } else { index };
    if resolved < 0.0 {
        return Ok(Value::Undefined);
    }
    Ok(items.get(resolved as usize).cloned().unwrap_or_default())
}

fn flat(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let array = this_array(interp, this, "flat")?;
    let depth = match arg(args, 0) {
        Value::Undefined => 1.0,
        other => to_integer(interp, &other)?,
    };
    let mut out = Vec::new();
    flatten_into(&elements(&array), depth, &mut out);
    Ok(interp.realm().new_array(out))
}

fn flatten_into(items: &[Value], depth: f64, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Object(obj) if depth >= 1.0 && obj.is_array() => {
                flatten_into(&elements(obj), depth - 1.0, out)
            }
            other => out.push(other.clone()),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Iteration
// ══════════════════════════════════════════════════════════════════════════════

fn for_each(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    scan(interp, this, args, "forEach", false, |_, _| false)?;
    Ok(Value::Undefined)
}

fn map(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut mapped = Vec::new();
    scan(interp, this, args, "map", false, |_, result| {
        mapped.push(result);
        false
    })?;
    Ok(interp.realm().new_array(mapped))
}

fn filter(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut kept = Vec::new();
    scan(interp, this, args, "filter", false, |item, result| {
        if result.truthy() {
            kept.push(item.clone());
        }
        false
    })?;
    Ok(interp.realm().new_array(kept))
}

fn find_impl(
    interp: &mut Interpreter<'_>,
    this: &Value,
    args: &[Value],
    method: &str,
    reverse: bool,
) -> EvalResult<Option<(usize, Value)>> {
    let mut hit = None;
    let index = scan(interp, this, args, method, reverse, |item, result| {
        let matched = result.truthy();
        if matched {
            hit = Some(item.clone());
        }
        matched
    })?;
    Ok(index.zip(hit))
}

fn find(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(find_impl(interp, this, args, "find", false)?
        .map(|(_, item)| item)
        .unwrap_or_default())
}

fn find_index(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let index = find_impl(interp, this, args, "findIndex", false)?.map(|(i, _)| i as f64);
    Ok(Value::Number(index.unwrap_or(-1.0)))
}

fn find_last(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(find_impl(interp, this, args, "findLast", true)?
        .map(|(_, item)| item)
        .unwrap_or_default())
}

fn find_last_index(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let index = find_impl(interp, this, args, "findLastIndex", true)?.map(|(i, _)| i as f64);
    Ok(Value::Number(index.unwrap_or(-1.0)))
}

fn some(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let hit = scan(interp, this, args, "some", false, |_, result| result.truthy())?;
    Ok(Value::Bool(hit.is_some()))
}

fn every(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let miss = scan(interp, this, args, "every", false, |_, result| !result.truthy())?;
    Ok(Value::Bool(miss.is_none()))
}

fn reduce_impl(
    interp: &mut Interpreter<'_>,
    this: &Value,
    args: &[Value],
    method: &str,
    reverse: bool,
) -> EvalResult<Value> {
    let array = this_array(interp, this, method)?;
    let callback = callback_arg(interp, args)?;
    let items = elements(&array);
    let mut order: Vec<usize> = (0..items.len()).collect();
    if reverse {
        order.reverse();
    }
    let mut order = order.into_iter();
    let mut accumulator = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match order.next() {
            Some(first) => items[first].clone(),
            None => {
                return Err(interp.type_error("Reduce of empty array with no initial value"));
            }
        },
    };
    for i in order {
        accumulator = interp.call(
            &callback,
            &Value::Undefined,
            &[accumulator, items[i].clone(), Value::Number(i as f64), this.clone()],
        )?;
    }
    Ok(accumulator)
}

fn reduce(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    reduce_impl(interp, this, args, "reduce", false)
}

fn reduce_right(interp: &mut Interpreter<'_>, this: &Value, args: &[Value]) -> EvalResult<Value> {
    reduce_impl(interp, this, args, "reduceRight", true)
}
