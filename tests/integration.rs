//! End-to-end tests: source text in, captured output, error messages,
//! completion codes and final scope out.

use pretty_assertions::assert_eq;

use catscript::{InputSource, Interpreter, Options, RunOutcome, Value};

/// Run `source` silently and hand back the interpreter (for its host) and
/// the outcome.
fn run(source: &str) -> (Interpreter, RunOutcome) {
    run_with_input(source, &[])
}

fn run_with_input(source: &str, input: &[&str]) -> (Interpreter, RunOutcome) {
    let options = Options::captured(InputSource::scripted(input.iter().copied()));
    let mut interp = Interpreter::new(&options);
    let outcome = interp.run_source(source);
    (interp, outcome)
}

/// Output of a run that must finish normally.
fn output_of(source: &str) -> String {
    let (interp, outcome) = run(source);
    assert_eq!(interp.host().diagnostics(), &[] as &[String]);
    assert_eq!(outcome.code(), 0);
    interp.host().output().to_string()
}

/// The single error message of a failing run.
fn error_of(source: &str) -> String {
    let (interp, outcome) = run(source);
    assert_eq!(outcome.code(), -1);
    assert!(outcome.frame.is_none());
    let diagnostics = interp.host().diagnostics();
    assert_eq!(diagnostics.len(), 1, "expected exactly one message: {:?}", diagnostics);
    diagnostics[0].clone()
}

fn var(outcome: &RunOutcome, name: &str) -> Option<Value> {
    outcome.frame.as_ref().and_then(|f| f.get(name).cloned())
}

// =============================================================================
// Conditionals
// =============================================================================

mod conditionals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn true_branch_runs_once_and_skips_siblings() {
        let src = "\
lt n = 0
if true {
n = n + 1
} elseif true {
n = n + 10
} else {
n = n + 100
}
Println(n)";
        assert_eq!(output_of(src), "1\n");
    }

    #[test]
    fn false_condition_takes_the_else() {
        let src = "\
lt a = 0
lt b = 0
if false {
a = 1
} else {
b = 1
}
Println(a, b)";
        assert_eq!(output_of(src), "0 1\n");
    }

    #[test]
    fn chain_falls_through_to_else() {
        let src = r#"
lt x = 12
if x == 10 {
Println("hi!")
} elseif x == 11 {
Println("no thank you")
} else {
Println("go away!")
}"#;
        assert_eq!(output_of(src), "go away!\n");
    }

    #[test]
    fn matching_elseif_stops_the_chain() {
        let src = r#"
lt x = 11
if x == 10 {
Println("hi!")
} elseif x == 11 {
Println("no thank you")
} else {
Println("go away!")
}
Println("done")"#;
        assert_eq!(output_of(src), "no thank you\ndone\n");
    }

    #[test]
    fn chain_without_else_can_match_nothing() {
        let src = r#"
lt x = 3
if x == 1 {
Println("one")
} elseif x == 2 {
Println("two")
}
Println("after")"#;
        assert_eq!(output_of(src), "after\n");
    }

    #[test]
    fn chain_inside_a_loop() {
        let src = r#"
for i = 0, 4 {
if i % 2 == 0 {
Print("e")
} else {
Print("o")
}
}"#;
        assert_eq!(output_of(src), "eoeo");
    }

    #[test]
    fn nested_chain_in_a_taken_branch() {
        let template = r#"
lt x = 1
lt y = Y
if x == 1 {
if y == 3 {
Print("a")
} else {
Print("b")
}
} else {
Print("c")
}
Print("!")"#;
        assert_eq!(output_of(&template.replace("Y", "3")), "a!");
        assert_eq!(output_of(&template.replace("Y", "2")), "b!");
    }

    // A single pending-jump slot per frame: re-entering a chain head while its
    // earlier scheduled jump is still pending lets the stale jump fire at the
    // `else` line, so the else body is skipped.
    #[test]
    fn stale_pending_jump_skips_else_after_goto_reentry() {
        let src = "\
lt n = 0
lt seen = 0
if n == 0 {
n = 1
goto 3
} else {
seen = 1
}
Println(seen)";
        assert_eq!(output_of(src), "0\n");
    }

    #[test]
    fn else_after_else_is_a_syntax_error() {
        let src = "\
if false {
} else {
} else {
}";
        assert_eq!(error_of(src), "SyntaxError on line 3: unexpected 'else'");
    }

    #[test]
    fn conditions_can_call_functions() {
        assert_eq!(output_of("if IsMain() {\nPrintln(1)\n}"), "1\n");
        let src = "\
fn Big(n) {
Return(n > 10)
}
lt n = 4
if Big(n) {
Println(\"big\")
} elseif Big(n * 3) {
Println(\"big once tripled\")
} else {
Println(\"small\")
}";
        assert_eq!(output_of(src), "big once tripled\n");
    }

    #[test]
    fn stray_closing_brace_is_a_syntax_error() {
        assert_eq!(error_of("}\nPrintln(1)"), "SyntaxError on line 1: unexpected '}'");
        assert_eq!(
            error_of("if true {\nPrintln(1)\n}\n}"),
            "SyntaxError on line 4: unexpected '}'"
        );
        assert_eq!(
            error_of("lt a = 1\n} else {\n}"),
            "SyntaxError on line 2: unexpected 'else'"
        );
    }

    #[test]
    fn unclosed_if_is_reported_at_its_head() {
        assert_eq!(
            error_of("lt a = 1\nif a == 1 {\nPrintln(a)"),
            "SyntaxError on line 2: block opened here is never closed"
        );
    }
}

// =============================================================================
// Loops
// =============================================================================

mod loops {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_over_half_open_range() {
        let src = "\
lt x = 0
lt y = 3
for i = x, y {
Println(i)
}";
        assert_eq!(output_of(src), "0\n1\n2\n");
    }

    #[test]
    fn body_runs_end_minus_start_times() {
        let (_, outcome) = run("lt c = 0\nfor i = -2, 3 {\nc = c + 1\n}");
        assert_eq!(var(&outcome, "c"), Some(Value::Int(5)));
    }

    #[test]
    fn empty_and_reversed_ranges_do_nothing() {
        assert_eq!(output_of("for i = 3, 3 {\nPrintln(i)\n}\nPrintln(\"end\")"), "end\n");
        assert_eq!(output_of("for i = 5, 2 {\nPrintln(i)\n}\nPrintln(\"end\")"), "end\n");
    }

    #[test]
    fn nested_loops() {
        let src = "\
for i = 0, 2 {
for j = 0, 3 {
Print(i * 10 + j, \"\")
}
}";
        assert_eq!(output_of(src), "0 1 2 10 11 12 ");
    }

    #[test]
    fn non_integer_bounds_are_type_errors() {
        assert_eq!(
            error_of("for i = 0, \"3\" {\n}"),
            "TypeError on line 1: for loop end must be int, got 'str'"
        );
    }

    #[test]
    fn bounds_can_call_functions() {
        assert_eq!(output_of("for i = 0, Rand(2, 2) {\nPrintln(i)\n}"), "0\n1\n");
        let src = "\
fn Twice(n) {
Return(n * 2)
}
lt c = 0
for i = Twice(1), Twice(3) {
c = c + 1
}
Println(c)";
        assert_eq!(output_of(src), "4\n");
    }

    #[test]
    fn discard_name_runs_in_the_caller_frame() {
        let (_, outcome) = run("for _ = 0, 1 {\nlt made = 7\n}");
        assert_eq!(var(&outcome, "made"), Some(Value::Int(7)));
        assert_eq!(
            error_of("for _ = 0, 2 {\nlt made = 7\n}"),
            "VariableError on line 2: cannot create variable 'made', already exists"
        );
    }

    #[test]
    fn goto_inside_a_body_uses_file_line_numbers() {
        let src = "\
lt hits = 0
for i = 0, 2 {
goto 5
hits = hits + 100
hits = hits + 1
}
Println(hits)";
        assert_eq!(output_of(src), "2\n");
        assert_eq!(
            error_of("for i = 0, 1 {\ngoto 1\n}"),
            "OutOfIndexError on line 2: goto target 1 is outside lines 2..3"
        );
    }
}

// =============================================================================
// Variables and scoping
// =============================================================================

mod scoping {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_declaration() {
        assert_eq!(
            error_of("lt a = 1\nlt a = 2"),
            "VariableError on line 2: cannot create variable 'a', already exists"
        );
    }

    #[test]
    fn reassigning_an_undeclared_name() {
        assert_eq!(
            error_of("x = 1"),
            "VariableError on line 1: cannot reassign variable 'x', it doesn't exist"
        );
    }

    #[test]
    fn loop_locals_do_not_leak_but_mutations_do() {
        let src = "\
lt total = 0
for i = 0, 3 {
lt tmp = i * 2
total = total + tmp
}";
        let (_, outcome) = run(src);
        assert_eq!(var(&outcome, "total"), Some(Value::Int(6)));
        assert_eq!(var(&outcome, "tmp"), None);
        assert_eq!(var(&outcome, "i"), None);
    }

    #[test]
    fn function_locals_do_not_leak_but_mutations_do() {
        let src = "\
lt count = 1
fn Bump() {
lt local = 10
count = count + local
}
Bump()";
        let (_, outcome) = run(src);
        assert_eq!(var(&outcome, "count"), Some(Value::Int(11)));
        assert_eq!(var(&outcome, "local"), None);
    }

    #[test]
    fn parameters_shadow_caller_names() {
        let src = "\
lt a = 1
lt b = 1
fn Set(a) {
a = 50
b = a
}
Set(7)
Println(a, b)";
        assert_eq!(output_of(src), "1 50\n");
    }

    #[test]
    fn comments_and_blank_lines_keep_numbering() {
        let src = "// header\n\nlt a = 1 // one\nlt a = 2";
        assert_eq!(
            error_of(src),
            "VariableError on line 4: cannot create variable 'a', already exists"
        );
    }
}

// =============================================================================
// Functions
// =============================================================================

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_argument_is_used() {
        let src = "\
fn Add(a, b = 1) {
lt r = a + b
Return(r)
}
lt v = Add(4)
Println(v)
Println(Add(4, 10))";
        assert_eq!(output_of(src), "5\n14\n");
    }

    #[test]
    fn top_level_return_of_a_call() {
        let src = "\
fn Add(a, b = 1) {
lt r = a + b
Return(r)
}
Return(Add(4))
Println(\"unreachable\")";
        let (interp, outcome) = run(src);
        assert_eq!(outcome.code(), 2);
        assert_eq!(outcome.returned(), Some(&Value::Int(5)));
        assert_eq!(interp.host().output(), "");
        assert!(outcome.frame.is_some());
    }

    #[test]
    fn missing_argument_is_a_func_error() {
        let src = "\
fn Add(a, b = 1) {
Return(a + b)
}
Add()";
        assert_eq!(error_of(src), "FuncError on line 4: `Add` missing argument 'a'");
    }

    #[test]
    fn too_many_arguments_is_a_func_error() {
        let src = "fn One(a) {\n}\nOne(1, 2)";
        assert_eq!(
            error_of(src),
            "FuncError on line 3: `One` expected at most 1 argument(s), got 2"
        );
    }

    #[test]
    fn return_from_inside_a_loop() {
        let src = "\
fn Find(target) {
for i = 0, 10 {
if i == target {
Return(i * 100)
}
}
Return(-1)
}
Println(Find(3))
Println(Find(42))";
        assert_eq!(output_of(src), "300\n-1\n");
    }

    #[test]
    fn recursion() {
        let src = "\
fn Fact(n) {
if n <= 1 {
Return(1)
}
lt rest = Fact(n - 1)
Return(n * rest)
}
Println(Fact(10))";
        assert_eq!(output_of(src), "3628800\n");
    }

    #[test]
    fn redefinition_replaces_the_function() {
        let src = "\
fn F() {
Return(1)
}
fn F() {
Return(2)
}
Println(F())";
        assert_eq!(output_of(src), "2\n");
    }

    #[test]
    fn is_main_inside_and_outside_functions() {
        let src = "\
fn Where() {
Return(IsMain())
}
lt top = IsMain()
lt inner = Where()
Println(top, inner)";
        assert_eq!(output_of(src), "true false\n");
    }

    #[test]
    fn nested_failure_is_printed_once() {
        let src = "\
fn Inner() {
lt z = nope
}
for i = 0, 2 {
Inner()
}";
        assert_eq!(
            error_of(src),
            "EvaluationError on line 2: name 'nope' is not defined"
        );
    }

    #[test]
    fn multiple_return_values_form_a_tuple() {
        let src = "\
fn Pair() {
Return(1, \"b\")
}
lt p = Pair()
Println(p, p[1])";
        assert_eq!(output_of(src), "(1, \"b\") b\n");
    }
}

// =============================================================================
// Jumps and exits
// =============================================================================

mod jumps {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn goto_to_the_current_line() {
        assert_eq!(
            error_of("lt a = 1\ngoto 2"),
            "OutOfIndexError on line 2: cannot goto the current line"
        );
    }

    #[test]
    fn goto_outside_the_program() {
        assert_eq!(
            error_of("goto 5\nPrintln(1)"),
            "OutOfIndexError on line 1: goto target 5 is outside lines 1..3"
        );
        assert_eq!(
            error_of("goto 0"),
            "OutOfIndexError on line 1: goto target 0 is outside lines 1..2"
        );
    }

    #[test]
    fn goto_one_past_the_end_finishes() {
        assert_eq!(output_of("goto 3\nPrintln(1)"), "");
    }

    #[test]
    fn goto_needs_an_integer() {
        assert_eq!(
            error_of("goto \"2\""),
            "ValueError on line 1: goto target must be int, got 'str'"
        );
    }

    #[test]
    fn backward_goto_loops() {
        let src = "\
lt i = 0
i = i + 1
if i < 3 {
goto 2
}
Println(i)";
        assert_eq!(output_of(src), "3\n");
    }

    #[test]
    fn exit_stops_everything() {
        let src = "\
Println(1)
for i = 0, 5 {
if i == 2 {
Exit()
}
Println(i)
}
Println(\"never\")";
        let (interp, outcome) = run(src);
        assert_eq!(outcome.code(), 1);
        assert!(outcome.frame.is_some());
        assert_eq!(interp.host().output(), "1\n0\n1\n");
    }

    #[test]
    fn exit_from_a_function() {
        let src = "fn Quit() {\nExit()\n}\nQuit()\nPrintln(1)";
        let (interp, outcome) = run(src);
        assert_eq!(outcome.code(), 1);
        assert_eq!(interp.host().output(), "");
    }
}

// =============================================================================
// Built-ins and surface syntax
// =============================================================================

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn printf_and_print() {
        let src = "\
lt name = \"cat\"
Printf(\"{} has {} lives\", name, 9)
Print(\"!\")";
        assert_eq!(output_of(src), "cat has 9 lives!");
    }

    #[test]
    fn get_text_reads_scripted_input() {
        let src = "\
lt name = GetText(\"name? \")
Println(\"hi\", name)
lt more = GetText(\"> \")
Println(more)";
        let (interp, outcome) = run_with_input(src, &["Tom"]);
        assert_eq!(outcome.code(), 0);
        assert_eq!(interp.host().output(), "name? hi Tom\n> null\n");
    }

    #[test]
    fn casefold_rejects_non_strings() {
        assert_eq!(
            error_of("Casefold(3)"),
            "ValueError on line 1: invalid value for Casefold '3', expected string"
        );
    }

    #[test]
    fn rand_range_check() {
        assert_eq!(
            error_of("lt r = Rand(5, 1)"),
            "ValueError on line 1: arg 'min' cannot be higher than arg 'max' of Rand"
        );
        let (_, outcome) = run("lt r = Rand(4, 4)");
        assert_eq!(var(&outcome, "r"), Some(Value::Int(4)));
    }

    #[test]
    fn native_arity_mismatch() {
        assert_eq!(
            error_of("IsMain(1)"),
            "FuncError on line 1: `IsMain` expected 0 argument(s), got 1"
        );
    }

    #[test]
    fn single_quotes_are_rejected() {
        assert_eq!(
            error_of("Println('x')"),
            "SyntaxError on line 1: single quotes are reserved, use double quotes"
        );
    }

    #[test]
    fn literals_inside_strings_are_untouched() {
        assert_eq!(output_of("Println(\"true null\", true, null)"), "true null true null\n");
    }

    #[test]
    fn evaluator_failure_is_an_evaluation_error() {
        assert_eq!(
            error_of("lt a = 1 / 0"),
            "EvaluationError on line 1: division by zero"
        );
    }
}

// =============================================================================
// Custom expression evaluators
// =============================================================================

mod custom_evaluator {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;
    use catscript::{EvalError, ExpressionEvaluator, Literal, Scope, StandardEvaluator};

    /// Spells the literals `None`/`True`/`False` and records every
    /// expression it is handed.
    struct Capitalised {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl ExpressionEvaluator for Capitalised {
        fn evaluate(&self, scope: &Scope, expr: &str) -> Result<Value, EvalError> {
            self.seen.borrow_mut().push(expr.to_string());
            let translated = expr
                .replace("None", "null")
                .replace("True", "true")
                .replace("False", "false");
            StandardEvaluator.evaluate(scope, &translated)
        }

        fn native_literal(&self, literal: Literal) -> &str {
            match literal {
                Literal::Null => "None",
                Literal::True => "True",
                Literal::False => "False",
            }
        }
    }

    #[test]
    fn literals_are_respelled_before_evaluation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let evaluator = Capitalised { seen: Rc::clone(&seen) };
        let mut interp = Interpreter::with_evaluator(&Options::captured(InputSource::default()), evaluator);

        let src = "\
lt flag = true
lt nothing = null
if flag {
Println(\"true\", nothing)
}";
        let outcome = interp.run_source(src);
        assert_eq!(outcome.code(), 0);
        assert_eq!(interp.host().output(), "true null\n");

        let seen = seen.borrow();
        assert!(seen.contains(&"True".to_string()), "{:?}", seen);
        assert!(seen.contains(&"None".to_string()), "{:?}", seen);
        assert!(seen.contains(&"\"true\", nothing".to_string()), "{:?}", seen);
    }

    #[test]
    fn prepare_exposes_the_respelled_program() {
        let evaluator = Capitalised {
            seen: Rc::new(RefCell::new(Vec::new())),
        };
        let interp = Interpreter::with_evaluator(&Options::captured(InputSource::default()), evaluator);
        let program = interp.prepare("lt a = false // off\n\nPrintln(\"false\")");
        assert_eq!(program.lines(), ["lt a = False", "", "Println(\"false\")"]);
    }
}
