// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assertion macros for parser tests.
//!
//! The macros are structural: anything with `message`, `line` and `column`
//! fields works with [`assert_parse_error!`], so this crate does not depend
//! on the parser.

/// Assert that an expression matches a pattern.
///
/// # Example
///
/// ```
/// use quill_macros::assert_matches;
///
/// #[derive(Debug)]
/// enum Node { Number(f64), Name(String) }
///
/// let node = Node::Number(42.0);
/// assert_matches!(node, Node::Number(n) if n > 0.0);
/// ```
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        match $expr {
            $pat => {}
            ref e => panic!(
                "assertion failed: `{}` does not match pattern `{}`\n  value: {:?}",
                stringify!($expr),
                stringify!($pat),
                e
            ),
        }
    };
    ($expr:expr, $pat:pat if $guard:expr) => {
        match $expr {
            $pat if $guard => {}
            ref e => panic!(
                "assertion failed: `{}` does not match pattern `{} if {}`\n  value: {:?}",
                stringify!($expr),
                stringify!($pat),
                stringify!($guard),
                e
            ),
        }
    };
}

/// Assert that a Result is Ok and extract the value.
///
/// # Example
///
/// ```
/// use quill_macros::assert_ok;
///
/// let value = assert_ok!("42".parse::<i32>());
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!(
                "assertion failed: expected Ok, got Err\n  expression: `{}`\n  error: {:?}",
                stringify!($expr),
                e
            ),
        }
    };
}

/// Assert that a Result is Err and extract the error.
///
/// # Example
///
/// ```
/// use quill_macros::assert_err;
///
/// let err = assert_err!("x".parse::<i32>());
/// assert_eq!(err.to_string(), "invalid digit found in string");
/// ```
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!(
                "assertion failed: expected Err, got Ok\n  expression: `{}`\n  value: {:?}",
                stringify!($expr),
                v
            ),
            Err(e) => e,
        }
    };
}

/// Assert that a parse failed with `message`, optionally at a 1-based line
/// and 0-based column.
///
/// # Example
///
/// ```
/// use quill_macros::assert_parse_error;
///
/// #[derive(Debug)]
/// struct Diagnostic { message: String, line: usize, column: usize }
///
/// let result: Result<(), Diagnostic> = Err(Diagnostic {
///     message: "Unexpected token".into(),
///     line: 1,
///     column: 2,
/// });
/// assert_parse_error!(result, "Unexpected token", 1, 2);
/// ```
#[macro_export]
macro_rules! assert_parse_error {
    ($expr:expr, $message:expr) => {{
        let err = $crate::assert_err!($expr);
        assert_eq!(err.message, $message, "wrong message for `{}`", stringify!($expr));
        err
    }};
    ($expr:expr, $message:expr, $line:expr, $column:expr) => {{
        let err = $crate::assert_parse_error!($expr, $message);
        assert_eq!(
            (err.line, err.column),
            ($line, $column),
            "wrong position for `{}`",
            stringify!($expr)
        );
        err
    }};
}

/// Create a test that runs every `source => message` case through a parse
/// function, reporting the failing source.
///
/// # Example
///
/// ```
/// use quill_macros::parse_error_cases;
///
/// #[derive(Debug)]
/// struct Diagnostic { message: String }
///
/// fn parse(src: &str) -> Result<(), Diagnostic> {
///     if src.is_empty() { Ok(()) } else { Err(Diagnostic { message: format!("bad {src}") }) }
/// }
///
/// parse_error_cases!(test_bad_inputs, parse, [
///     "a" => "bad a",
///     "b" => "bad b",
/// ]);
/// ```
#[macro_export]
macro_rules! parse_error_cases {
    ($name:ident, $parse:expr, [$($source:expr => $message:expr),+ $(,)?]) => {
        #[test]
        fn $name() {
            $(
                match $parse($source) {
                    Ok(v) => panic!("expected `{}` to fail, got {:?}", $source, v),
                    Err(e) => assert_eq!(e.message, $message, "source: `{}`", $source),
                }
            )+
        }
    };
}
