/// `Print`, `Println`, `Printf`: write values to the host output.
///
/// ```text
/// Print("a", 1)            // a 1
/// Println("x =", x)        // x = 12\n
/// Printf("{} of {}", 1, 3) // 1 of 3
/// ```
use crate::error::ScriptError;
use crate::functions::{expect_str, join_display, Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

pub struct Print;

impl NativeFunction for Print {
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, host: &mut Host, _line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        host.write(&join_display(&args));
        Ok(Value::Null)
    }
}

pub struct Println;

impl NativeFunction for Println {
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, host: &mut Host, _line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        let mut text = join_display(&args);
        text.push('\n');
        host.write(&text);
        Ok(Value::Null)
    }
}

/// Each `{}` in the format string takes the next argument.
pub struct Printf;

impl NativeFunction for Printf {
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        let Some((format, rest)) = args.split_first() else {
            return Err(ScriptError::func("`Printf` expected a format string", line).into());
        };
        let format = expect_str("Printf", format, line)?;

        let pieces: Vec<&str> = format.split("{}").collect();
        let slots = pieces.len() - 1;
        if slots != rest.len() {
            return Err(ScriptError::func(
                format!("expected {} argument(s), but {} were given", slots, rest.len()),
                line,
            )
            .into());
        }

        let mut text = String::with_capacity(format.len());
        for (i, piece) in pieces.iter().enumerate() {
            text.push_str(piece);
            if let Some(value) = rest.get(i) {
                text.push_str(&value.to_string());
            }
        }
        host.write(&text);
        Ok(Value::Null)
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("Print", Print);
    frame.register("Println", Println);
    frame.register("Printf", Printf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::functions::testing;

    #[test]
    fn print_joins_with_spaces() {
        let mut host = testing::host();
        Print.call(&mut host, 1, vec![Value::from("a"), Value::Int(1)]).unwrap();
        Println.call(&mut host, 1, vec![Value::Float(2.0)]).unwrap();
        Println.call(&mut host, 1, vec![]).unwrap();
        assert_eq!(host.output(), "a 12.0\n\n");
    }

    #[test]
    fn printf_fills_placeholders() {
        let mut host = testing::host();
        let args = vec![Value::from("{} of {}!"), Value::Int(1), Value::from("three")];
        Printf.call(&mut host, 1, args).unwrap();
        assert_eq!(host.output(), "1 of three!");
    }

    #[test]
    fn printf_count_mismatch() {
        let mut host = testing::host();
        let err = Printf
            .call(&mut host, 4, vec![Value::from("{} {}"), Value::Int(1)])
            .unwrap_err();
        match err {
            Signal::Error(err) => {
                assert_eq!(err.kind, ErrorKind::Func);
                assert_eq!(err.details, "expected 2 argument(s), but 1 were given");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn printf_needs_a_string_format() {
        let mut host = testing::host();
        let err = Printf.call(&mut host, 2, vec![Value::Int(3)]).unwrap_err();
        assert!(matches!(err, Signal::Error(e) if e.kind == ErrorKind::Value));
    }
}
