use crate::functions::{Arity, NativeFunction};
use crate::host::Host;
use crate::interpreter::Frame;
use crate::signal::Signal;
use crate::value::Value;

/// `IsMain`: `true` at top level, `false` inside any user function.
pub struct IsMain;

impl NativeFunction for IsMain {
    fn arity(&self) -> Arity {
        Arity::Fixed(0)
    }

    fn call(&self, host: &mut Host, _line: usize, _args: Vec<Value>) -> Result<Value, Signal> {
        Ok(Value::Bool(host.is_main()))
    }
}

pub fn register(frame: &mut Frame) {
    frame.register("IsMain", IsMain);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::testing;

    #[test]
    fn follows_the_used_stack() {
        let mut host = testing::host();
        assert_eq!(IsMain.call(&mut host, 1, vec![]), Ok(Value::Bool(true)));
        host.enter("F");
        assert_eq!(IsMain.call(&mut host, 1, vec![]), Ok(Value::Bool(false)));
    }
}
