/// `GetText`: show a prompt and read one line of input.
///
/// ```text
/// lt name = GetText("name? ")
/// ```
///
/// End of input reads as `null`.
use crate::error::ScriptError;
use crate::functions::{Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

pub struct GetText;

impl NativeFunction for GetText {
    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn call(&self, host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal> {
        if let Some(message) = args.first() {
            host.write(&message.to_string());
        }
        match host.read_line() {
            Ok(Some(text)) => Ok(Value::Str(text)),
            Ok(None) => Ok(Value::Null),
            Err(e) => Err(ScriptError::func(format!("`GetText` could not read input: {}", e), line).into()),
        }
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("GetText", GetText);
}
