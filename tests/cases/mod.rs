// Helper macro to distinguish between patterns and expressions
#[macro_export]
macro_rules! assert_case {
    // Guard patterns - patterns with if conditions
    ($result:expr, { $pattern:pat if $guard:expr }) => {
        match $result {
            $pattern if $guard => {},
            other => panic!("Expected {} if {} but got {:?}", stringify!($pattern), stringify!($guard), other),
        }
    };

    ($result:expr, { Err($($pattern:tt)*) }) => {
        match $result {
            Err($($pattern)*) => {},
            other => panic!("Expected Err({}) but got {:#?}", stringify!($($pattern)*), other),
        }
    };

    // Default case - treat as expression for equality comparison
    ($result:expr, { $expected:expr }) => {
        match $result {
            Ok(actual) => {
                pretty_assertions::assert_eq!($expected, actual, "Expected {:#?} but got {:#?}\n\n< expected / got >", $expected, actual);
            },
            other => panic!("Expected Ok(...) but got {:?}", other),
        }
    };
}

// Helper macro to generate test functions based on field names
#[macro_export]
macro_rules! handle_case {
    ([$($attrs:meta)*] result, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_result() {
            let result = evaluate(input());
            assert_case!(result, $expected);
        }
    };

    ([$($attrs:meta)*] code, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_code() {
            let err = match evaluate(input()) {
                Err(e) => e,
                Ok(value) => panic!("Expected an error, but evaluation returned {value:?}"),
            };
            let result: Result<Option<&str>, ()> = Ok(err.classified().and_then(|e| e.code()));
            assert_case!(result, $expected);
        }
    };

    ([$($attrs:meta)*] error, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_error() {
            // Normalize by stripping trailing whitespace from each line
            fn normalize(s: &str) -> String {
                s.lines()
                    .map(|line| line.trim_end())
                    .collect::<Vec<_>>()
                    .join("\n")
                    + "\n"
            }

            let err = match evaluate(input()) {
                Err(e) => e,
                Ok(value) => panic!("Expected an error, but evaluation returned {value:?}"),
            };
            let mut buf = Vec::new();
            let config = jsonata_sandbox::RenderConfig {
                color: false,
                charset: jsonata_sandbox::CharSet::Ascii,
                ..Default::default()
            };
            jsonata_sandbox::render_error_to(&err, &mut buf, &config).unwrap();
            let err_string = String::from_utf8_lossy(&buf).into_owned();
            let normalized = normalize(&err_string);

            let result: Result<&str, ()> = Ok(normalized.as_str());
            assert_case!(result, $expected);
        }
    };

    // Generic case for unknown field names
    ([$($attrs:meta)*] $field_name:ident, $expected:tt) => {
        compile_error!(concat!("Unknown test case field: ", stringify!($field_name)));
    };
}

// Helper macro to recursively parse assertion fields
#[macro_export]
macro_rules! parse_assertions {
    // Base case: no more fields to parse
    (@parse [$($test_functions:tt)*]) => {
        $($test_functions)*
    };

    (@parse [$($test_functions:tt)*] $(#[$attr:meta])* $field_name:ident: $field_value:tt, $($rest:tt)*) => {
        parse_assertions! {@parse [
            $($test_functions)*
            handle_case! {[$($attr)*] $field_name, $field_value}
        ] $($rest)*}
    };
}

// Main macro - name first, input second, then any order for assertions.
// The including file provides `evaluate(&str) -> Result<HostValue, Error>`.
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $($assertion_fields:tt)*
    ) => {
        mod $name {
            #![allow(unused_imports, dead_code)]

            use super::*;
            use once_cell::sync::OnceCell;

            // Make `$input` available to all test functions
            fn input() -> &'static str {
                static INPUT_CELL: OnceCell<&'static str> = OnceCell::new();
                INPUT_CELL.get_or_init(|| $input)
            }

            // Generate all test functions
            parse_assertions! {@parse [] $($assertion_fields)*}
        }
    };
}
