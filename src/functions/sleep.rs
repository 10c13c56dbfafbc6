// `Sleep`: block the calling thread for the given number of seconds.
//
// Integers and floats are both accepted, so fractional seconds work.

use std::time::Duration;

use crate::error::ScriptError;
use crate::functions::{Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

pub struct Sleep;

impl NativeFunction for Sleep {
    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn call(&self, _host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        let secs = match args.first() {
            Some(Value::Int(i)) => *i as f64,
            Some(Value::Float(x)) => *x,
            Some(other) => {
                return Err(ScriptError::value(
                    format!("invalid value for Sleep '{}', expected a number of seconds", other),
                    line,
                )
                .into());
            }
            None => return Err(ScriptError::func("`Sleep` expected 1 argument(s), got 0", line).into()),
        };

        let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
            ScriptError::value(format!("Sleep duration must not be negative, got {}", secs), line)
        })?;
        std::thread::sleep(duration);
        Ok(Value::Null)
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("Sleep", Sleep);
}
