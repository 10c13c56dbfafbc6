/// `Rand`: a uniformly random integer in `[min, max]`.
///
/// ```text
/// lt die = Rand(1, 6)
/// ```
use rand::Rng;

use crate::error::ScriptError;
use crate::functions::{Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

pub struct Rand;

impl NativeFunction for Rand {
    fn arity(&self) -> Arity {
        Arity::Fixed(2)
    }

    fn call(&self, _host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        let (min, max) = match args.as_slice() {
            [Value::Int(min), Value::Int(max)] => (*min, *max),
            [min, Value::Int(_)] => {
                return Err(ScriptError::value(
                    format!("invalid value '{}' for arg 'min' of Rand, expected int", min),
                    line,
                )
                .into());
            }
            [Value::Int(_), max] => {
                return Err(ScriptError::value(
                    format!("invalid value '{}' for arg 'max' of Rand, expected int", max),
                    line,
                )
                .into());
            }
            [min, max] => {
                return Err(ScriptError::value(
                    format!(
                        "invalid value '{}' for arg 'min' and '{}' for arg 'max' of Rand, expected int and int",
                        min, max
                    ),
                    line,
                )
                .into());
            }
            _ => return Err(ScriptError::func("`Rand` expected 2 argument(s)", line).into()),
        };

        if min > max {
            return Err(ScriptError::value("arg 'min' cannot be higher than arg 'max' of Rand", line).into());
        }

        Ok(Value::Int(rand::thread_rng().gen_range(min..=max)))
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("Rand", Rand);
}
