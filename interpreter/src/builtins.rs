use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::callable::Builtin;
use crate::value::{Pairs, Value};

type BuiltinResult = Result<Value, String>;

/// Every native function, keyed by the name scripts call it with. `print` writes to `stdout`.
pub(crate) fn catalog(stdout: Rc<RefCell<dyn Write>>) -> HashMap<&'static str, Rc<Builtin>> {
    let builtins = vec![
        Builtin::new(
            "print",
            Box::new(move |args: &[Value]| print(&stdout, args)),
        ),
        Builtin::new("type", Box::new(type_of)),
        Builtin::new("str", Box::new(to_str)),
        Builtin::new("len", Box::new(len)),
        Builtin::new("reversed", Box::new(reversed)),
        Builtin::new("slice", Box::new(slice)),
        Builtin::new("range", Box::new(range)),
        Builtin::new("lower", Box::new(lower)),
        Builtin::new("upper", Box::new(upper)),
        Builtin::new("split", Box::new(split)),
        Builtin::new("join", Box::new(join)),
        Builtin::new("push", Box::new(push)),
        Builtin::new("unshift", Box::new(unshift)),
        Builtin::new("pop", Box::new(pop)),
        Builtin::new("shift", Box::new(shift)),
        Builtin::new("keys", Box::new(keys)),
        Builtin::new("values", Box::new(values)),
        Builtin::new("delete", Box::new(delete)),
    ];

    builtins
        .into_iter()
        .map(|builtin| (builtin.name(), Rc::new(builtin)))
        .collect()
}

fn check_arity(args: &[Value], want: usize) -> Result<(), String> {
    if args.len() == want {
        Ok(())
    } else {
        Err(format!(
            "Wrong number of arguments. Got={} want={}",
            args.len(),
            want
        ))
    }
}

fn print(stdout: &RefCell<dyn Write>, args: &[Value]) -> BuiltinResult {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<String>>()
        .join(" ");

    writeln!(stdout.borrow_mut(), "{}", line).map_err(|err| format!("Cannot print: {}", err))?;
    Ok(Value::Null)
}

fn type_of(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    Ok(Value::from(args[0].kind().as_str()))
}

fn to_str(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    Ok(Value::from(args[0].to_string()))
}

fn len(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Str(value) => Ok(Value::from(value.chars().count())),
        Value::Array(elements) => Ok(Value::from(elements.len())),
        Value::Hash(pairs) => Ok(Value::from(pairs.len())),
        other => Err(format!(
            "Cannot calculate len for argument of type {}",
            other.kind()
        )),
    }
}

fn reversed(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Str(value) => Ok(Value::from(value.chars().rev().collect::<String>())),
        Value::Array(elements) => Ok(Value::array(elements.iter().rev().cloned().collect())),
        other => Err(format!(
            "Cannot reverse value for argument of type {}",
            other.kind()
        )),
    }
}

// `end` is clamped to the length, a `start` outside of it is an error
fn slice(args: &[Value]) -> BuiltinResult {
    check_arity(args, 3)?;
    let length = match &args[0] {
        Value::Str(value) => value.chars().count(),
        Value::Array(elements) => elements.len(),
        other => {
            return Err(format!(
                "Cannot perform slice on argument of type {}",
                other.kind()
            ))
        }
    } as i64;

    let (start, end) = match (&args[1], &args[2]) {
        (Value::Integer(start), Value::Integer(end)) => (*start, (*end).min(length)),
        (start, end) => {
            return Err(format!(
                "Start and End values should be INTEGER. Got={}, {}",
                start.kind(),
                end.kind()
            ))
        }
    };
    if start < 0 || start > length || start > end {
        return Err(format!(
            "For slicing, (0 <= start <= length) and (start <= end). Got start={}, end={}",
            start, end
        ));
    }

    let (start, end) = (start as usize, end as usize);
    match &args[0] {
        Value::Array(elements) => Ok(Value::array(elements[start..end].to_vec())),
        value => Ok(Value::from(
            value
                .to_string()
                .chars()
                .skip(start)
                .take(end - start)
                .collect::<String>(),
        )),
    }
}

fn range(args: &[Value]) -> BuiltinResult {
    check_arity(args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Integer(start), Value::Integer(end)) if end < start => Err(format!(
            "Need (end >= start). Got start={} end={}",
            start, end
        )),
        (Value::Integer(start), Value::Integer(end)) => {
            Ok(Value::array((*start..*end).map(Value::Integer).collect()))
        }
        (Value::Integer(_), other) | (other, _) => Err(format!(
            "Argument to range must be INTEGER. Got {}",
            other.kind()
        )),
    }
}

fn string_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a str, String> {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Str(value) => Ok(value.as_str()),
        other => Err(format!(
            "Argument to {} must be STRING. Got {}",
            name,
            other.kind()
        )),
    }
}

fn lower(args: &[Value]) -> BuiltinResult {
    Ok(Value::from(string_arg("lower", args)?.to_lowercase()))
}

fn upper(args: &[Value]) -> BuiltinResult {
    Ok(Value::from(string_arg("upper", args)?.to_uppercase()))
}

fn split(args: &[Value]) -> BuiltinResult {
    let value = string_arg("split", args)?;
    Ok(Value::array(value.chars().map(Value::from).collect()))
}

fn join(args: &[Value]) -> BuiltinResult {
    if args.is_empty() || args.len() > 2 {
        return Err(format!(
            "Wrong number of arguments. Got={} want=(min:1, max: 2)",
            args.len()
        ));
    }

    let elements = match &args[0] {
        Value::Array(elements) => elements,
        other => {
            return Err(format!(
                "First argument to join must be ARRAY. Got {}",
                other.kind()
            ))
        }
    };
    let separator = match args.get(1) {
        None => ", ",
        Some(Value::Str(separator)) => separator.as_str(),
        Some(other) => {
            return Err(format!(
                "Separator to join must be STRING. Got {}",
                other.kind()
            ))
        }
    };

    Ok(Value::from(
        elements
            .iter()
            .map(|element| element.to_string())
            .collect::<Vec<String>>()
            .join(separator),
    ))
}

// Array operations below never touch their argument, they return a new array.

fn array_arg<'a>(name: &str, position: &str, value: &'a Value) -> Result<&'a [Value], String> {
    match value {
        Value::Array(elements) => Ok(elements.as_slice()),
        other => Err(format!(
            "{} to {} must be ARRAY. Got {}",
            position,
            name,
            other.kind()
        )),
    }
}

fn check_min_arity(args: &[Value], min: usize) -> Result<(), String> {
    if args.len() < min {
        Err(format!(
            "Wrong number of arguments. Got={} want=minimum {}",
            args.len(),
            min
        ))
    } else {
        Ok(())
    }
}

fn push(args: &[Value]) -> BuiltinResult {
    check_min_arity(args, 2)?;
    let elements = array_arg("push", "First argument", &args[0])?;
    Ok(Value::array(
        elements.iter().chain(&args[1..]).cloned().collect(),
    ))
}

fn unshift(args: &[Value]) -> BuiltinResult {
    check_min_arity(args, 2)?;
    let elements = array_arg("unshift", "First argument", &args[0])?;
    Ok(Value::array(
        args[1..].iter().chain(elements).cloned().collect(),
    ))
}

fn pop(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match array_arg("pop", "Argument", &args[0])? {
        [] => Err(String::from("Cannot pop from an empty array")),
        [rest @ .., _] => Ok(Value::array(rest.to_vec())),
    }
}

fn shift(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match array_arg("shift", "Argument", &args[0])? {
        [] => Err(String::from("Cannot shift from an empty array")),
        [_, rest @ ..] => Ok(Value::array(rest.to_vec())),
    }
}

fn keys(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Hash(pairs) => Ok(Value::array(
            pairs.values().map(|pair| pair.key.clone()).collect(),
        )),
        other => Err(format!(
            "Argument to keys must be HASH. Got {}",
            other.kind()
        )),
    }
}

fn values(args: &[Value]) -> BuiltinResult {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Hash(pairs) => Ok(Value::array(
            pairs.values().map(|pair| pair.value.clone()).collect(),
        )),
        other => Err(format!(
            "Argument to values must be HASH. Got {}",
            other.kind()
        )),
    }
}

fn delete(args: &[Value]) -> BuiltinResult {
    check_arity(args, 2)?;
    let pairs = match &args[0] {
        Value::Hash(pairs) => pairs,
        other => {
            return Err(format!(
                "First argument to delete must be HASH. Got {}",
                other.kind()
            ))
        }
    };
    let key = args[1]
        .hash_key()
        .ok_or_else(|| format!("Key of type {} cannot be hashed", args[1].kind()))?;

    let mut remaining = Pairs::clone(pairs);
    remaining.shift_remove(&key);
    Ok(Value::hash(remaining))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    use crate::builtins::catalog;
    use crate::value::Value;

    fn call(name: &str, args: &[Value]) -> Result<Value, String> {
        let sink: Rc<RefCell<dyn Write>> = Rc::new(RefCell::new(Vec::<u8>::new()));
        catalog(sink)[name].call(args)
    }

    fn ints(values: &[i64]) -> Value {
        Value::array(values.iter().copied().map(Value::Integer).collect())
    }

    fn render(result: Result<Value, String>) -> String {
        match result {
            Ok(value) => value.to_string(),
            Err(msg) => format!("ERROR: {}", msg),
        }
    }

    #[test]
    fn test_print_writes_to_sink() {
        let sink = Rc::new(RefCell::new(Vec::<u8>::new()));
        let builtins = catalog(sink.clone());

        let result = builtins["print"].call(&[Value::from("a"), Value::from(1), Value::from(2.0)]);
        builtins["print"].call(&[]).unwrap();

        assert_eq!(result, Ok(Value::Null));
        assert_eq!(std::str::from_utf8(&sink.borrow()).unwrap(), "a 1 2.0\n\n");
    }

    #[test]
    fn test_catalog() {
        let tests = [
            ("type", vec![Value::from(1.5)], "FLOAT"),
            ("type", vec![Value::Null], "NULL"),
            ("str", vec![ints(&[1, 2])], "[1, 2]"),
            ("len", vec![Value::from("héllo")], "5"),
            ("len", vec![ints(&[1, 2, 3])], "3"),
            (
                "len",
                vec![Value::from(1)],
                "ERROR: Cannot calculate len for argument of type INTEGER",
            ),
            ("reversed", vec![Value::from("abc")], "cba"),
            ("reversed", vec![ints(&[1, 2, 3])], "[3, 2, 1]"),
            (
                "slice",
                vec![Value::from("MochaTek"), Value::from(0), Value::from(5)],
                "Mocha",
            ),
            (
                "slice",
                vec![ints(&[1, 2, 3]), Value::from(1), Value::from(10)],
                "[2, 3]",
            ),
            (
                "slice",
                vec![ints(&[1, 2, 3]), Value::from(3), Value::from(3)],
                "[]",
            ),
            (
                "slice",
                vec![Value::from("abc"), Value::from(2), Value::from(1)],
                "ERROR: For slicing, (0 <= start <= length) and (start <= end). Got start=2, end=1",
            ),
            (
                "slice",
                vec![Value::from("abc"), Value::from(-1), Value::from(1)],
                "ERROR: For slicing, (0 <= start <= length) and (start <= end). Got start=-1, end=1",
            ),
            ("range", vec![Value::from(0), Value::from(4)], "[0, 1, 2, 3]"),
            ("range", vec![Value::from(2), Value::from(2)], "[]"),
            (
                "range",
                vec![Value::from(0), Value::from("5")],
                "ERROR: Argument to range must be INTEGER. Got STRING",
            ),
            (
                "range",
                vec![Value::from(3), Value::from(1)],
                "ERROR: Need (end >= start). Got start=3 end=1",
            ),
            ("lower", vec![Value::from("MoCHa")], "mocha"),
            ("upper", vec![Value::from("MoCHa")], "MOCHA"),
            (
                "upper",
                vec![Value::from(1)],
                "ERROR: Argument to upper must be STRING. Got INTEGER",
            ),
            ("split", vec![Value::from("ab")], "[a, b]"),
            ("join", vec![ints(&[1, 2])], "1, 2"),
            ("join", vec![ints(&[1, 2]), Value::from("-")], "1-2"),
            (
                "join",
                vec![],
                "ERROR: Wrong number of arguments. Got=0 want=(min:1, max: 2)",
            ),
            (
                "push",
                vec![ints(&[1]), Value::from(2), Value::from(3)],
                "[1, 2, 3]",
            ),
            (
                "push",
                vec![ints(&[1])],
                "ERROR: Wrong number of arguments. Got=1 want=minimum 2",
            ),
            (
                "unshift",
                vec![ints(&[3]), Value::from(1), Value::from(2)],
                "[1, 2, 3]",
            ),
            ("pop", vec![ints(&[1, 2, 3])], "[1, 2]"),
            (
                "pop",
                vec![ints(&[])],
                "ERROR: Cannot pop from an empty array",
            ),
            ("shift", vec![ints(&[1, 2, 3])], "[2, 3]"),
            (
                "shift",
                vec![ints(&[])],
                "ERROR: Cannot shift from an empty array",
            ),
            (
                "type",
                vec![],
                "ERROR: Wrong number of arguments. Got=0 want=1",
            ),
        ];

        for (name, args, expected) in tests {
            assert_eq!(render(call(name, &args)), expected, "{}({:?})", name, args);
        }
    }

    #[test]
    fn test_array_builtins_do_not_mutate() {
        let original = ints(&[1, 2]);
        call("push", &[original.clone(), Value::from(3)]).unwrap();
        call("pop", &[original.clone()]).unwrap();

        assert_eq!(original.to_string(), "[1, 2]");
    }

    #[test]
    fn test_hash_builtins() {
        let mut pairs = indexmap::IndexMap::new();
        for (key, value) in [("a", 1), ("b", 2)] {
            let key = Value::from(key);
            pairs.insert(
                key.hash_key().unwrap(),
                crate::value::HashPair {
                    key,
                    value: Value::from(value),
                },
            );
        }
        let hash = Value::hash(pairs);

        assert_eq!(render(call("keys", &[hash.clone()])), "[a, b]");
        assert_eq!(render(call("values", &[hash.clone()])), "[1, 2]");
        assert_eq!(
            render(call("delete", &[hash.clone(), Value::from("a")])),
            "{b: 2}"
        );
        assert_eq!(
            render(call("delete", &[hash.clone(), ints(&[])])),
            "ERROR: Key of type ARRAY cannot be hashed"
        );
        assert_eq!(hash.to_string(), "{a: 1, b: 2}");
        assert_eq!(
            render(call("keys", &[Value::from(1)])),
            "ERROR: Argument to keys must be HASH. Got INTEGER"
        );
    }
}
