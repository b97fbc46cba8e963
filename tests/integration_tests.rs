// Parser robustness tests for MedScript
//
// Every case runs under catch_unwind so a panic in the lexer or parser is
// reported as a crash instead of aborting the remaining cases.

use medscript::error::MedScriptError;
use medscript::parser::{parse, MAX_NESTING_DEPTH};
use std::panic;

#[derive(Debug)]
enum Outcome {
    Pass,
    Fail(String),
    Crash(String),
}

#[derive(Debug, Clone)]
struct TestCase {
    name: &'static str,
    input: String,
    should_succeed: bool,
    expected_error_contains: Option<&'static str>,
}

impl TestCase {
    fn should_succeed(name: &'static str, input: &str) -> Self {
        Self {
            name,
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    fn should_fail(name: &'static str, input: &str) -> Self {
        Self {
            should_succeed: false,
            ..Self::should_succeed(name, input)
        }
    }

    fn should_fail_with_message(name: &'static str, input: &str, expected: &'static str) -> Self {
        Self {
            expected_error_contains: Some(expected),
            ..Self::should_fail(name, input)
        }
    }

    fn run(&self) -> Outcome {
        let input = self.input.clone();
        let result = match panic::catch_unwind(move || parse(&input)) {
            Ok(result) => result,
            Err(panic_info) => {
                let message = panic_info
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic_info.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "Unknown panic".to_string());
                return Outcome::Crash(message);
            }
        };

        match (result, self.should_succeed) {
            (Ok(_), true) => Outcome::Pass,
            (Ok(_), false) => Outcome::Fail("Expected parsing to fail, but it succeeded".to_string()),
            (Err(error), true) => Outcome::Fail(format!("Expected parsing to succeed, got: {}", error)),
            (Err(error), false) => self.check_error(&error),
        }
    }

    fn check_error(&self, error: &MedScriptError) -> Outcome {
        if !error.is_syntax() {
            return Outcome::Fail(format!("Expected a syntax error, got {}", error.kind));
        }
        match self.expected_error_contains {
            Some(expected) if !error.message.contains(expected) => Outcome::Fail(format!(
                "Error message '{}' doesn't contain expected text '{}'",
                error.message, expected
            )),
            _ => Outcome::Pass,
        }
    }
}

/// Runs every case and returns the names of the ones that did not pass.
fn run_suite(name: &str, cases: Vec<TestCase>) -> Vec<String> {
    println!("Running test suite: {}", name);
    let mut problems = Vec::new();

    for case in &cases {
        match case.run() {
            Outcome::Pass => println!("  ✓ {}", case.name),
            Outcome::Fail(msg) => {
                println!("  ✗ {}: {}", case.name, msg);
                problems.push(format!("{}::{}: {}", name, case.name, msg));
            }
            Outcome::Crash(msg) => {
                println!("  💥 {}: CRASHED - {}", case.name, msg);
                problems.push(format!("{}::{}: crashed: {}", name, case.name, msg));
            }
        }
    }

    println!("{} of {} passed\n", cases.len() - problems.len(), cases.len());
    problems
}

// ============================================================================
// Suites
// ============================================================================

fn declaration_cases() -> Vec<TestCase> {
    vec![
        TestCase::should_succeed("years", "let age: Years = 25"),
        TestCase::should_succeed("blood_pressure", "let bp: mmHg = 120/80"),
        TestCase::should_succeed("blood_pressure_decimal", "let bp: mmHg = 120.5/80.25"),
        TestCase::should_succeed("blood_pressure_from_variable", "let a: mmHg = 120/80 let b: mmHg = a"),
        TestCase::should_succeed("glucose", "let g: mg/dL = 110"),
        TestCase::should_succeed("glucose_spaced", "let g :  mg/dL = 110"),
        TestCase::should_succeed("text_value", "let sex: Years = \"female\""),
        TestCase::should_succeed("arithmetic_initializer", "let bmi: Years = 70 / 1.75 * 1.75 + 1 - 2"),
        TestCase::should_fail_with_message("blood_pressure_without_pair", "let bp: mmHg = 120", "Expected '/' in blood pressure literal"),
        TestCase::should_fail_with_message("blood_pressure_missing_diastolic", "let bp: mmHg = 120/", "Expected diastolic value"),
        TestCase::should_fail_with_message("blood_pressure_from_string", "let bp: mmHg = \"120/80\"", "Expected blood pressure literal"),
        TestCase::should_fail("blood_pressure_from_property", "let a: mmHg = 120/80 let b: mmHg = a.systolic"),
        TestCase::should_fail_with_message("unknown_type", "let age: InvalidType = 25", "Unknown type 'InvalidType'"),
        TestCase::should_fail_with_message("type_is_case_sensitive", "let age: years = 25", "Unknown type 'years'"),
        TestCase::should_fail_with_message("missing_type", "let age = 25", "Expected ':' and a type after 'age'"),
        TestCase::should_fail_with_message("missing_name", "let : Years = 25", "Expected variable name after 'let'"),
        TestCase::should_fail_with_message("missing_equals", "let age: Years 25", "Expected '=' after type 'Years'"),
        TestCase::should_fail_with_message("missing_value", "let age: Years =", "Unexpected end of input"),
        TestCase::should_fail_with_message("keyword_as_name", "let if: Years = 1", "Expected variable name"),
    ]
}

fn conditional_cases() -> Vec<TestCase> {
    vec![
        TestCase::should_succeed("single_comparison", "if age > 60 { alert \"Elderly\" }"),
        TestCase::should_succeed("and_chain", "if a >= 1 and b <= 2 and c != 3 { recommend \"x\" }"),
        TestCase::should_succeed("property_comparison", "if bp.systolic > 140 and bp.diastolic == 90 { alert \"x\" }"),
        TestCase::should_succeed("empty_body", "if age < 1 { }"),
        TestCase::should_succeed("nested_if", "if a > 1 { if b > 2 { alert \"x\" } recommend \"y\" }"),
        TestCase::should_succeed("declaration_in_body", "if a > 1 { let b: Years = 2 }"),
        TestCase::should_succeed("arithmetic_operands", "if weight / height * height > 30 - 1 { alert \"x\" }"),
        TestCase::should_succeed("newline_insensitive", "if\nage\n>\n60\n{\nalert\n\"x\"\n}"),
        TestCase::should_fail_with_message("missing_braces", "let age: Years = 65\nif age > 60\n    alert \"Elderly\"", "Expected '{' after if condition"),
        TestCase::should_fail_with_message("missing_closing_brace", "if age > 60 { alert \"Elderly\"", "Expected '}' after if body"),
        TestCase::should_fail_with_message("unknown_property", "let bp: mmHg = 120/80\nif bp.invalid > 140 { alert \"Error\" }", "Unknown property 'invalid'"),
        TestCase::should_fail_with_message("property_is_case_sensitive", "if bp.Systolic > 140 { alert \"x\" }", "Unknown property 'Systolic'"),
        TestCase::should_fail_with_message("missing_operator", "if age { alert \"x\" }", "Expected comparison operator"),
        TestCase::should_fail_with_message("missing_right_operand", "if age > { alert \"x\" }", "Expected expression after '>'"),
        TestCase::should_fail_with_message("operand_at_end_of_input", "if age >", "Expected expression after '>', found end of input"),
        TestCase::should_fail_with_message("bad_property_in_right_operand", "if 140 < bp.pulse { alert \"x\" }", "Unknown property 'pulse'"),
        TestCase::should_fail_with_message("bad_property_after_plus", "let a: Years = 1 + bp.pulse", "Unknown property 'pulse'"),
        TestCase::should_fail_with_message("missing_factor", "let a: Years = 2 * }", "Expected expression after '*', found '}'"),
        TestCase::should_fail_with_message("dangling_and", "if age > 1 and { alert \"x\" }", "Expected expression, found '{'"),
        TestCase::should_fail("or_is_not_a_keyword", "if a > 1 or b > 2 { alert \"x\" }"),
        TestCase::should_fail("assignment_in_condition", "if a = 1 { alert \"x\" }"),
    ]
}

fn output_statement_cases() -> Vec<TestCase> {
    vec![
        TestCase::should_succeed("alert", "alert \"Check potassium\""),
        TestCase::should_succeed("recommend", "recommend \"Repeat in 3 months\""),
        TestCase::should_fail_with_message("alert_without_text", "alert", "Expected quoted text after 'alert'"),
        TestCase::should_fail_with_message("recommend_number", "recommend 5", "Expected quoted text after 'recommend'"),
        TestCase::should_fail_with_message("unterminated_string", "alert \"oops", "Unterminated string"),
        TestCase::should_fail_with_message("keywords_are_case_sensitive", "Alert \"x\"", "Expected statement, found 'Alert'"),
    ]
}

fn edge_cases() -> Vec<TestCase> {
    let nested = |depth: usize| "if a > 1 { ".repeat(depth) + &"}".repeat(depth);
    let deep_nesting = nested(64);
    let deepest_allowed = nested(MAX_NESTING_DEPTH);
    let too_deep = nested(5000);
    vec![
        TestCase::should_succeed("empty_input", ""),
        TestCase::should_succeed("only_whitespace", "   \n\t  "),
        TestCase::should_succeed("only_comment", "// nothing here"),
        TestCase::should_succeed("deeply_nested_ifs", &deep_nesting),
        TestCase::should_succeed("nesting_at_limit", &deepest_allowed),
        TestCase::should_fail_with_message("too_deeply_nested_ifs", &too_deep, "If blocks nested too deeply"),
        TestCase::should_fail_with_message("stray_closing_brace", "}", "Expected statement, found '}'"),
        TestCase::should_fail_with_message("bare_expression", "1 + 2", "Expected statement"),
        TestCase::should_fail_with_message("unexpected_character", "let a: Years = 1 @", "Unexpected character: '@'"),
        TestCase::should_fail_with_message("lone_bang", "if a ! 1 { }", "Unexpected character: '!'"),
        TestCase::should_fail("trailing_dot_number", "let a: Years = 42."),
        TestCase::should_fail("leading_dot_number", "let a: Years = .42"),
        TestCase::should_fail("property_at_end", "if bp."),
    ]
}

#[test]
fn comprehensive_parser_tests() {
    let suites = vec![
        ("Declarations", declaration_cases()),
        ("Conditionals", conditional_cases()),
        ("Output Statements", output_statement_cases()),
        ("Edge Cases", edge_cases()),
    ];

    let problems: Vec<String> = suites
        .into_iter()
        .flat_map(|(name, cases)| run_suite(name, cases))
        .collect();

    assert!(problems.is_empty(), "parser suite problems:\n{}", problems.join("\n"));
}
