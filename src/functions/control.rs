/// `Return` and `Exit`: the only way a script stops a frame early.
///
/// ```text
/// Return()        // hands back null
/// Return(r)       // hands back r
/// Return(a, b)    // hands back the tuple (a, b)
/// Exit()          // stops the whole run
/// ```
use crate::functions::{Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

pub struct Return;

impl NativeFunction for Return {
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, _host: &mut Host, line: usize, mut args: Vec<Value>) -> Result<Value, Signal> {
        let value = match args.len() {
            0 => Value::Null,
            1 => args.remove(0),
            _ => Value::Tuple(args),
        };
        Err(Signal::Return { line, value })
    }
}

pub struct Exit;

impl NativeFunction for Exit {
    fn arity(&self) -> Arity {
        Arity::Fixed(0)
    }

    fn call(&self, _host: &mut Host, line: usize, _args: Vec<Value>) -> Result<Value, Signal> {
        Err(Signal::Exit { line })
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("Return", Return);
    frame.register("Exit", Exit);
}
