use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use flagset_core::command_line;
use flagset_core::{ErrorHandling, FlagMode, FlagSet, Handle, ParseError, Value, ValueError};

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn quiet(name: &str) -> FlagSet {
    let mut fs = FlagSet::new(name, ErrorHandling::ContinueOnError);
    fs.set_output(io::sink());
    fs
}

fn register_test_flags(fs: &mut FlagSet, bools: bool, base: i64) {
    fs.bool("test_bool", Some('b'), bools, "bool value", None);
    fs.int("test_int", Some('i'), base as isize, "int value", None);
    fs.int64("test_int64", Some('I'), base, "int64 value", None);
    fs.uint("test_uint", Some('u'), base as usize, "uint value", None);
    fs.uint64("test_uint64", Some('U'), base as u64, "uint64 value", None);
    fs.string("test_string", Some('s'), &base.to_string(), "string value", None);
    fs.float64("test_float64", Some('f'), base as f64, "float64 value", None);
    fs.duration(
        "test_duration",
        Some('d'),
        Duration::from_secs(base as u64),
        "time.Duration value",
        None,
    );
}

fn rendered(fs: &FlagSet) -> Vec<(String, String)> {
    let mut seen = Vec::new();
    fs.visit_all(|_, flag| seen.push((flag.name().to_string(), flag.value().to_string())));
    seen
}

#[test]
fn visit_all_sees_defaults_then_updates() {
    let mut fs = quiet("everything");
    register_test_flags(&mut fs, false, 0);

    let expected = |zero: &str, truth: &str| {
        vec![
            ("test_bool".to_string(), truth.to_string()),
            ("test_duration".to_string(), format!("{zero}s")),
            ("test_float64".to_string(), zero.to_string()),
            ("test_int".to_string(), zero.to_string()),
            ("test_int64".to_string(), zero.to_string()),
            ("test_string".to_string(), zero.to_string()),
            ("test_uint".to_string(), zero.to_string()),
            ("test_uint64".to_string(), zero.to_string()),
        ]
    };
    assert_eq!(rendered(&fs), expected("0", "false"));

    let updates = [
        ("test_bool", "true"),
        ("test_int", "1"),
        ("test_int64", "1"),
        ("test_uint", "1"),
        ("test_uint64", "1"),
        ("test_string", "1"),
        ("test_float64", "1"),
        ("test_duration", "1s"),
    ];
    for (name, raw) in updates {
        fs.lookup_mut(name).unwrap().value_mut().set(raw).unwrap();
    }
    assert_eq!(rendered(&fs), expected("1", "true"));
}

#[test]
fn get_returns_typed_snapshots() {
    let mut fs = quiet("get");
    fs.bool("test_bool", Some('b'), true, "", None);
    fs.int("test_int", Some('i'), 1, "", None);
    fs.int64("test_int64", Some('I'), 2, "", None);
    fs.uint("test_uint", Some('u'), 3, "", None);
    fs.uint64("test_uint64", Some('U'), 4, "", None);
    fs.string("test_string", Some('s'), "5", "", None);
    fs.float64("test_float64", Some('f'), 6.0, "", None);
    fs.duration("test_duration", Some('d'), Duration::from_nanos(7), "", None);

    let get = |name: &str| fs.lookup(name).unwrap().value().get();
    assert_eq!(get("test_bool").downcast_ref::<bool>(), Some(&true));
    assert_eq!(get("test_int").downcast_ref::<isize>(), Some(&1));
    assert_eq!(get("test_int64").downcast_ref::<i64>(), Some(&2));
    assert_eq!(get("test_uint").downcast_ref::<usize>(), Some(&3));
    assert_eq!(get("test_uint64").downcast_ref::<u64>(), Some(&4));
    assert_eq!(get("test_string").downcast_ref::<String>(), Some(&"5".to_string()));
    assert_eq!(get("test_float64").downcast_ref::<f64>(), Some(&6.0));
    assert_eq!(
        get("test_duration").downcast_ref::<Duration>(),
        Some(&Duration::from_nanos(7))
    );
}

fn check_parse(f: &mut FlagSet) {
    assert!(!f.parsed(), "parsed before parse");

    let bool_flag = f.bool("bool", Some('b'), false, "bool value", None);
    let bool2_flag = f.bool("bool2", Some('B'), false, "bool2 value", None);
    let int_flag = f.int("int", Some('i'), 0, "int value", None);
    let int64_flag = f.int64("int64", Some('I'), 0, "int64 value", None);
    let uint_flag = f.uint("uint", Some('u'), 0, "uint value", None);
    let uint64_flag = f.uint64("uint64", Some('U'), 0, "uint64 value", None);
    let string_flag = f.string("string", Some('s'), "0", "string value", None);
    let float64_flag = f.float64("float64", Some('f'), 0.0, "float64 value", None);
    let duration_flag = f.duration(
        "duration",
        Some('d'),
        Duration::from_secs(5),
        "time.Duration value",
        None,
    );

    let extra = "one-extra-argument";
    let args = [
        "--bool",
        extra,
        "--bool2=true",
        "not-flag",
        "--int",
        "22",
        "not-flag",
        "--int64",
        "0x23",
        "--uint",
        "24",
        "not-flag",
        "--uint64",
        "25",
        "--string",
        "hello",
        "--float64",
        "2718e28",
        "not-flag",
        "--duration",
        "2m",
        "not-flag",
    ];
    f.parse(args).unwrap();

    assert!(f.parsed());
    assert!(bool_flag.get());
    assert!(bool2_flag.get());
    assert_eq!(int_flag.get(), 22);
    assert_eq!(int64_flag.get(), 0x23);
    assert_eq!(uint_flag.get(), 24);
    assert_eq!(uint64_flag.get(), 25);
    assert_eq!(string_flag.get(), "hello");
    assert_eq!(float64_flag.get(), 2718e28);
    assert_eq!(duration_flag.get(), Duration::from_secs(120));
    assert_eq!(f.n_arg(), 6);
    assert_eq!(f.arg(0), Some(extra));
}

#[test]
fn parse_flag_set() {
    check_parse(&mut quiet("test"));
}

#[test]
fn parse_command_line() {
    command_line::reset("test-command", ErrorHandling::ContinueOnError);
    command_line::set_output(io::sink());
    command_line::with_command_line(check_parse);
    assert!(command_line::parsed());
    assert_eq!(command_line::n_arg(), 6);
}

#[test]
fn concrete_scenario() {
    let mut fs = quiet("scenario");
    let a = fs.bool("A", Some('a'), false, "", None);
    let b = fs.int("B", Some('b'), 0, "", None);
    let c = fs.float64("C", Some('c'), 0.0, "", None);
    let d = fs.string("D", Some('d'), "", "", None);
    let e = fs.uint64("E", Some('e'), 0, "", None);

    fs.parse([
        "--A", "--B=100", "--C", "10.5", "--D=hello", "--E", "100", "argument-1",
    ])
    .unwrap();

    assert!(a.get());
    assert_eq!(b.get(), 100);
    assert_eq!(c.get(), 10.5);
    assert_eq!(d.get(), "hello");
    assert_eq!(e.get(), 100);
    assert_eq!(fs.args(), ["argument-1"]);
}

#[test]
fn usage_is_called_for_help() {
    for token in ["--help", "-h"] {
        let called = Rc::new(Cell::new(false));
        let mut fs = quiet("usage");
        let flag = Rc::clone(&called);
        fs.set_usage(move |_| flag.set(true));

        assert_eq!(fs.parse([token]), Err(ParseError::HelpRequested));
        assert!(called.get(), "usage not called for {token}");
    }
}

#[test]
fn custom_usage_on_command_line() {
    command_line::reset("usage", ErrorHandling::ContinueOnError);
    let result = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&result);
    command_line::set_usage(move |flags| *sink.borrow_mut() = format!("HELP {}", flags.name()));

    command_line::usage();
    assert_eq!(*result.borrow(), "HELP usage");
}

#[derive(Default)]
struct Accumulate(Vec<String>);

impl fmt::Display for Accumulate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(" "))
    }
}

impl Value for Accumulate {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        self.0.push(raw.to_string());
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.0.clone())
    }
}

#[test]
fn user_defined_value_accumulates() {
    let mut fs = quiet("test");
    fs.var(Accumulate::default(), "v", Some('v'), "usage", None);
    fs.parse(["--v", "1", "-v", "2", "--v=3"]).unwrap();

    let flag = fs.lookup("v").unwrap();
    assert_eq!(flag.value().to_string(), "[1 2 3]");
    assert_eq!(flag.default_value(), "[]");
    assert_eq!(
        flag.value().get().downcast_ref::<Vec<String>>().map(Vec::len),
        Some(3)
    );
}

/// Counts explicit `true` assignments and stops acting as a boolean after
/// two of them.
#[derive(Default)]
struct CountingBool {
    count: usize,
}

impl fmt::Display for CountingBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count)
    }
}

impl Value for CountingBool {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        if raw == "true" {
            self.count += 1;
        }
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.count)
    }

    fn is_bool_flag(&self) -> bool {
        self.count < 2
    }
}

#[test]
fn user_defined_bool_value() {
    let mut fs = quiet("test");
    fs.var(CountingBool::default(), "bool", Some('b'), "usage", None);

    let err = fs
        .parse([
            "-b=true", "--bool=true", "-b=false", "--bool", "-b", "barg", "--bool",
        ])
        .unwrap_err();

    assert_eq!(err, ParseError::MissingArgument("bool".to_string()));
    assert_eq!(fs.lookup("bool").unwrap().value().to_string(), "2");
    assert_eq!(fs.args(), ["barg"]);
}

#[test]
fn bare_boolean_on_non_bool_storage_is_rejected() {
    struct Liar;

    impl fmt::Display for Liar {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("liar")
        }
    }

    impl Value for Liar {
        fn set(&mut self, _raw: &str) -> Result<(), ValueError> {
            Ok(())
        }

        fn get(&self) -> Box<dyn Any> {
            Box::new("not a bool")
        }

        fn is_bool_flag(&self) -> bool {
            true
        }
    }

    let mut fs = quiet("liar");
    fs.var(Liar, "liar", None, "", None);
    assert_eq!(
        fs.parse(["--liar"]),
        Err(ParseError::NotBoolean("liar".to_string()))
    );
    assert_eq!(fs.parse(["--liar=1"]), Ok(()));
}

#[test]
fn set_output_receives_failures() {
    let output = SharedBuffer::default();
    let mut fs = FlagSet::new("test", ErrorHandling::ContinueOnError);
    fs.set_output(output.clone());

    assert!(fs.parse(["--unknown"]).is_err());
    assert_eq!(output.contents(), "unrecognized option `--unknown'\n");
}

#[test]
fn help_flag_handling() {
    let called = Rc::new(Cell::new(false));
    let mut fs = quiet("help test");
    let flag = Rc::clone(&called);
    fs.set_usage(move |_| flag.set(true));
    let regular = fs.bool("flag", None, false, "regular flag", None);

    fs.parse(["--flag=true"]).unwrap();
    assert!(regular.get());
    assert!(!called.get(), "help called for regular flag");

    for token in ["--help", "-h"] {
        assert_eq!(fs.parse([token]), Err(ParseError::HelpRequested));
        assert!(called.get(), "help was not called for {token}");
        called.set(false);
    }

    let help = fs.bool("help", Some('h'), false, "help flag", None);
    fs.parse(["--help"]).unwrap();
    assert!(help.get());
    fs.parse(["-h"]).unwrap();
    assert!(!help.get());
    assert!(!called.get(), "help called although a help flag is defined");
}

#[test]
fn help_request_is_never_escalated() {
    let mut fs = FlagSet::new("panicky", ErrorHandling::PanicOnError);
    fs.set_output(io::sink());
    assert_eq!(fs.parse(["--help"]), Err(ParseError::HelpRequested));
}

fn all_typed_flags(fs: &mut FlagSet) {
    fs.bool("bool", None, false, "", None);
    fs.int("int", None, 0, "", None);
    fs.int64("int64", None, 0, "", None);
    fs.uint("uint", None, 0, "", None);
    fs.uint64("uint64", None, 0, "", None);
    fs.float64("float64", None, 0.0, "", None);
    fs.duration("duration", None, Duration::ZERO, "", None);
}

#[test]
fn invalid_literal_for_each_type() {
    for typ in ["bool", "int", "int64", "uint", "uint64", "float64", "duration"] {
        let mut fs = quiet("parse error test");
        all_typed_flags(&mut fs);

        let err = fs.parse([format!("--{typ}=x")]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                name: typ.to_string(),
                value: "x".to_string(),
                source: ValueError::Syntax,
            }
        );
        assert!(err.to_string().contains("invalid"), "{err}");
    }
}

#[test]
fn out_of_range_literals() {
    for arg in [
        "--int=123456789012345678901",
        "--int64=123456789012345678901",
        "--uint=123456789012345678901",
        "--uint64=123456789012345678901",
        "--float64=1e1000",
    ] {
        let mut fs = quiet("range error test");
        all_typed_flags(&mut fs);

        let err = fs.parse([arg]).unwrap_err();
        assert_eq!(err.value_error(), Some(&ValueError::Range), "{arg}");
        assert!(err.to_string().contains("value out of range"), "{err}");
    }
}

#[test]
fn failed_assignment_keeps_previous_value() {
    let mut fs = quiet("keep");
    let count = fs.int("count", Some('n'), 7, "", None);
    assert!(fs.parse(["-n", "seven"]).is_err());
    assert_eq!(count.get(), 7);
}

#[test]
fn sub_command_names_accumulate() {
    let name = "Test Add Sub Command Name";
    let mut fs = quiet(name);

    let (b, c, d) = (Handle::new(false), Handle::new(false), Handle::new(false));
    let d_cmd = fs.bool_var_sub_command_nested(&d, "D", None, "description", Vec::new());
    let c_cmd = fs.bool_var_sub_command_nested(&c, "C", None, "description", vec![d_cmd]);
    let b_cmd = fs.bool_var_sub_command_nested(&b, "B", None, "description", vec![c_cmd]);
    let a = fs.bool_sub_command("A", None, "description", vec![b_cmd]);

    fs.parse(["A", "B", "C", "D"]).unwrap();

    assert_eq!(fs.name(), format!("{name} A B C D"));
    assert!(a.get() && b.get() && c.get() && d.get());
    assert!(fs.args().is_empty());
}

#[test]
fn sub_command_chains() {
    let table: [(&[&str], [bool; 6]); 4] = [
        (&["A", "-b"], [true, true, false, false, false, false]),
        (&["A", "C", "--D"], [true, false, true, true, false, false]),
        (&["A", "C", "E"], [true, false, true, false, true, false]),
        (&["A", "C", "E", "-f"], [true, false, true, false, true, true]),
    ];

    for (i, (args, expect)) in table.into_iter().enumerate() {
        let mut fs = quiet("chain");
        let handles: Vec<Handle<bool>> = (0..6).map(|_| Handle::new(true)).collect();
        let [a, b, c, d, e, f] = [0, 1, 2, 3, 4, 5].map(|n| &handles[n]);

        let b_flag = fs.bool_var_sub_flag(Some(b), "B", Some('b'), false, "description", None);
        let d_flag = fs.bool_var_sub_flag(Some(d), "D", Some('d'), false, "description", None);
        let f_flag = fs.bool_var_sub_flag(Some(f), "F", Some('f'), false, "description", None);
        let e_cmd = fs.bool_var_sub_command_nested(e, "E", Some('e'), "description", vec![f_flag]);
        let c_cmd =
            fs.bool_var_sub_command_nested(c, "C", Some('c'), "description", vec![d_flag, e_cmd]);
        fs.bool_var_sub_command(a, "A", Some('a'), "description", vec![b_flag, c_cmd]);

        fs.parse(args.iter().copied())
            .unwrap_or_else(|err| panic!("row {i}: {err}"));

        let actual: Vec<bool> = handles.iter().map(Handle::get).collect();
        assert_eq!(actual, expect, "row {i}: {args:?}");
    }
}

#[test]
fn sub_command_entered_by_alias() {
    let mut fs = quiet("alias");
    let force = fs.bool_sub_flag("force", Some('f'), false, "", None);
    let push = fs.bool_sub_command("push", Some('p'), "", vec![force]);

    fs.parse(["p", "-f", "origin"]).unwrap();

    assert!(push.get());
    assert_eq!(fs.name(), "alias push");
    assert_eq!(fs.lookup("force").unwrap().value().to_string(), "true");
    assert_eq!(fs.args(), ["origin"]);
}

#[test]
fn reparse_continues_in_entered_scope() {
    let mut fs = quiet("scope");
    let verbose = fs.bool("verbose", Some('v'), false, "", None);
    fs.bool_sub_command("run", None, "", Vec::new());

    fs.parse(["run"]).unwrap();
    assert_eq!(fs.n_flag(), 0);
    assert_eq!(
        fs.parse(["--verbose"]),
        Err(ParseError::UnrecognizedLong("verbose".to_string()))
    );
    assert!(!verbose.get());
}

#[test]
fn sub_command_tokens_only_lead() {
    let mut fs = quiet("lead");
    let run = fs.bool_sub_command("run", None, "", Vec::new());
    fs.parse(["file", "run"]).unwrap();
    assert!(!run.get());
    assert_eq!(fs.args(), ["file", "run"]);
    assert_eq!(fs.name(), "lead");
}

fn short_flags() -> (FlagSet, [Handle<bool>; 3], Handle<String>) {
    let mut fs = quiet("short");
    let a = fs.bool("A", Some('a'), false, "", None);
    let b = fs.bool("B", Some('b'), false, "", None);
    let c = fs.bool("C", Some('c'), false, "", None);
    let d = fs.string("D", Some('d'), "", "", None);
    (fs, [a, b, c], d)
}

#[test]
fn short_flag_forms() {
    let (mut fs, [a, b, c], _) = short_flags();
    fs.parse(["-abc"]).unwrap();
    assert!(a.get() && b.get() && c.get());

    let (mut fs, _, d) = short_flags();
    fs.parse(["-d=value"]).unwrap();
    assert_eq!(d.get(), "value");

    let (mut fs, _, _) = short_flags();
    assert_eq!(
        fs.parse(["-bcd=value"]),
        Err(ParseError::AmbiguousShortValue("bcd".to_string()))
    );
    assert_eq!(
        ParseError::AmbiguousShortValue("bcd".to_string()).to_string(),
        "ambiguous option `-bcd': a value cannot be assigned to grouped short options"
    );

    let (mut fs, _, _) = short_flags();
    assert_eq!(
        fs.parse(["-z=value"]),
        Err(ParseError::UnrecognizedShort("z".to_string()))
    );
}

#[test]
fn grouped_short_flags_match_separate_flags() {
    let (mut grouped, grouped_bools, grouped_d) = short_flags();
    let (mut separate, separate_bools, separate_d) = short_flags();

    grouped.parse(["-acd", "x", "rest"]).unwrap();
    separate.parse(["-a", "-c", "-d", "x", "rest"]).unwrap();

    let values = |bools: &[Handle<bool>; 3]| bools.iter().map(Handle::get).collect::<Vec<_>>();
    assert_eq!(values(&grouped_bools), values(&separate_bools));
    assert_eq!(grouped_d.get(), separate_d.get());
    assert_eq!(grouped.args(), separate.args());
}

#[test]
fn unrecognized_group_mutates_nothing() {
    let (mut fs, bools, d) = short_flags();
    assert_eq!(fs.parse(["-xyz"]), Err(ParseError::UnrecognizedAlias('x')));
    assert!(bools.iter().all(|flag| !flag.get()));
    assert_eq!(d.get(), "");
}

#[test]
fn earlier_effects_survive_a_later_failure() {
    let (mut fs, [a, b, _], _) = short_flags();
    assert_eq!(fs.parse(["-a", "-bx"]), Err(ParseError::UnrecognizedAlias('x')));
    assert!(a.get());
    assert!(b.get());

    let (mut fs, [a, ..], _) = short_flags();
    assert_eq!(fs.parse(["-ah"]), Err(ParseError::HelpRequested));
    assert!(a.get());
}

#[test]
fn bare_boolean_toggles() {
    let mut fs = quiet("toggle");
    let color = fs.bool("color", None, true, "", None);

    fs.parse(["--color"]).unwrap();
    assert!(!color.get());
    fs.parse(["--color"]).unwrap();
    assert!(color.get());
    fs.parse(["--color=true"]).unwrap();
    assert!(color.get());
}

#[test]
fn callback_runs_after_set() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);

    let mut fs = quiet("callback");
    let port = fs.int(
        "port",
        Some('p'),
        80,
        "",
        Some(Box::new(move |value: &dyn Value| {
            log.borrow_mut().push(value.to_string());
            match value.get().downcast_ref::<isize>() {
                Some(port) if *port < 1024 => Ok(()),
                _ => Err(ValueError::rejected("privileged ports only")),
            }
        })),
    );

    fs.parse(["--port=443"]).unwrap();
    assert_eq!(port.get(), 443);

    assert_eq!(
        fs.parse(["-p", "8080"]),
        Err(ParseError::InvalidValue {
            name: "port".to_string(),
            value: "8080".to_string(),
            source: ValueError::Rejected("privileged ports only".to_string()),
        })
    );
    assert_eq!(port.get(), 8080);
    assert_eq!(*seen.borrow(), vec!["443".to_string(), "8080".to_string()]);
}

#[test]
fn callback_not_run_when_set_fails() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let mut fs = quiet("callback");
    fs.uint(
        "workers",
        None,
        1,
        "",
        Some(Box::new(move |_: &dyn Value| {
            counter.set(counter.get() + 1);
            Ok(())
        })),
    );

    assert!(fs.parse(["--workers=-1"]).is_err());
    assert_eq!(calls.get(), 0);
    fs.parse(["--workers=2"]).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn double_dash_is_not_a_terminator() {
    let mut fs = quiet("dashes");
    fs.bool("b", Some('b'), false, "", None);
    assert_eq!(
        fs.parse(["a", "--", "-b"]),
        Err(ParseError::InvalidSyntax("--".to_string()))
    );
}

#[test]
fn missing_argument_is_reported() {
    let output = SharedBuffer::default();
    let mut fs = FlagSet::new("missing", ErrorHandling::ContinueOnError);
    fs.set_output(output.clone());
    fs.duration("timeout", Some('t'), Duration::ZERO, "", None);

    assert_eq!(
        fs.parse(["-t"]),
        Err(ParseError::MissingArgument("timeout".to_string()))
    );
    assert_eq!(output.contents(), "option `--timeout' requires an argument\n");
}

#[test]
#[should_panic(expected = "unrecognized option `--nope'")]
fn panic_on_error_panics() {
    let mut fs = FlagSet::new("panic", ErrorHandling::PanicOnError);
    fs.set_output(io::sink());
    let _ = fs.parse(["--nope"]);
}

#[test]
fn continue_on_error_returns_every_failure() {
    let failures = [
        ("---x", ParseError::InvalidSyntax("---x".to_string())),
        ("--=x", ParseError::InvalidSyntax("--=x".to_string())),
        ("--missing", ParseError::UnrecognizedLong("missing".to_string())),
        ("-q", ParseError::UnrecognizedAlias('q')),
    ];
    for (token, expected) in failures {
        let mut fs = quiet("continue");
        assert_eq!(fs.parse([token]), Err(expected), "{token}");
    }
}

struct Locked;

impl fmt::Display for Locked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("false")
    }
}

impl Value for Locked {
    fn set(&mut self, _raw: &str) -> Result<(), ValueError> {
        Err(ValueError::Rejected("no entry".to_string()))
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(false)
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

#[test]
fn rejected_sub_command_entry_is_reported_and_scope_kept() {
    let output = SharedBuffer::default();
    let mut fs = FlagSet::new("p", ErrorHandling::ContinueOnError);
    fs.set_output(output.clone());
    let verbose = fs.bool_sub_flag("verbose", Some('v'), false, "", None);
    fs.register(
        Box::new(Locked),
        "run",
        Some('r'),
        "start",
        FlagMode::COMMAND,
        None,
        vec![verbose],
    );

    assert_eq!(
        fs.parse(["run", "x"]),
        Err(ParseError::InvalidValue {
            name: "run".to_string(),
            value: "true".to_string(),
            source: ValueError::Rejected("no entry".to_string()),
        })
    );
    assert_eq!(
        output.contents(),
        "invalid value \"true\" for option `--run': no entry\n"
    );
    assert_eq!(fs.name(), "p run");
    assert!(fs.lookup("run").is_some());
    assert!(fs.lookup("verbose").is_none());
    assert_eq!(fs.n_flag(), 1);
}

#[test]
#[should_panic(expected = "invalid value \"true\" for option `--run': no entry")]
fn rejected_sub_command_entry_panics_under_panic_policy() {
    let mut fs = FlagSet::new("p", ErrorHandling::PanicOnError);
    fs.set_output(io::sink());
    fs.register(
        Box::new(Locked),
        "run",
        None,
        "",
        FlagMode::COMMAND,
        None,
        Vec::new(),
    );
    let _ = fs.parse(["run"]);
}
