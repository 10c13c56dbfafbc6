use crate::functions::{expect_str, Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

/// `Casefold`: lower-case a string for caseless comparison.
pub struct Casefold;

impl NativeFunction for Casefold {
    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn call(&self, _host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        let text = match args.first() {
            Some(value) => expect_str("Casefold", value, line)?,
            None => "",
        };
        Ok(Value::Str(text.to_lowercase()))
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("Casefold", Casefold);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::testing;

    #[test]
    fn lowers_strings() {
        let mut host = testing::host();
        assert_eq!(
            Casefold.call(&mut host, 1, vec![Value::from("ÀbC")]),
            Ok(Value::from("àbc"))
        );
    }

    #[test]
    fn rejects_other_values() {
        let mut host = testing::host();
        match Casefold.call(&mut host, 2, vec![Value::Int(5)]) {
            Err(Signal::Error(err)) => {
                assert_eq!(err.to_string(), "ValueError on line 2: invalid value for Casefold '5', expected string");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
