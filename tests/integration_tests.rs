// Front-end robustness tests: every line goes through the lexer, the syntax
// checker and the tree builder, and must either succeed or fail with an
// error. A panic anywhere counts as a crash.

use linescript::ast::AstNode;
use linescript::checker;
use linescript::error::ScriptError;
use linescript::lexer::Lexer;
use linescript::parser::Parser;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);
        
        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        
        if self.crashed > 0 {
            println!("\n⚠️  WARNING: {} tests caused crashes! Front end robustness needs improvement.", self.crashed);
        }
        
        if self.failed > 0 {
            println!("\n❌ {} tests had unexpected results.", self.failed);
        }
        
        if self.crashed == 0 && self.failed == 0 {
            println!("\n✅ All tests passed! Front end is robust.");
        }
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    // Catch any panics to detect crashes
    let result = std::panic::catch_unwind(|| {
        parse_input(&test.input)
    });

    match result {
        Ok(parse_result) => {
            match (parse_result, test.should_succeed) {
                (Ok(_), true) => TestResult::Pass,
                (Ok(_), false) => TestResult::Fail("Expected the line to be rejected, but it was accepted".to_string()),
                (Err(error), false) => {
                    // Check if error contains expected text
                    if let Some(expected) = &test.expected_error_contains {
                        if error.message.contains(expected) {
                            TestResult::Pass
                        } else {
                            TestResult::Fail(format!(
                                "Error message '{}' doesn't contain expected text '{}'", 
                                error.message, expected
                            ))
                        }
                    } else {
                        TestResult::Pass // Any error is acceptable
                    }
                }
                (Err(error), true) => TestResult::Fail(format!("Expected the line to be accepted, but got error: {}", error.message)),
            }
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            TestResult::Crash(panic_msg)
        }
    }
}

/// Lex, check and parse one line. Blank lines yield `None`.
fn parse_input(input: &str) -> Result<Option<AstNode>, ScriptError> {
    let tokens = Lexer::new(input.to_string()).tokenize()?;
    if tokens.is_empty() {
        return Ok(None);
    }
    checker::check(&tokens)?;
    Parser::new(tokens).parse().map(Some)
}

/// Test case builder for convenience
impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_malformed_expressions_tests() -> TestSuite {
    let mut suite = TestSuite::new("Malformed Expressions");

    // === PARENTHESES TESTS ===

    // Unmatched opening parentheses
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        "missing \")\" corresponding to \"(\"",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_nested",
        "((1 + 2)",
        "missing \")\"",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren_in_assignment",
        "x = (1 + (2 * 3)",
        "missing \")\"",
    ));

    // Unmatched closing parentheses get past the checker and stop in the tree builder
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        "Unmatched ')'",
    ));

    // Empty parentheses
    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "()",
        "Empty parentheses are not allowed",
    ));

    // Two operands with nothing between them
    suite.add_test(TestCase::should_fail_with_message(
        "adjacent_variables",
        "a b",
        "\"b\" is unexpected token",
    ));

    suite.add_test(TestCase::should_fail("adjacent_numbers", "1 2"));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    // Empty input
    suite.add_test(TestCase::should_succeed("empty_input", ""));

    // Only whitespace
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \t  "));

    // Comments
    suite.add_test(TestCase::should_succeed("comment_only", "# nothing to see"));
    suite.add_test(TestCase::should_succeed("trailing_comment", "x = 1 # set x"));

    // End of line right after an operator
    suite.add_test(TestCase::should_fail_with_message(
        "line_ends_after_operator",
        "1 +",
        "Expected operand after '+'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "operator_then_space_at_end",
        "1 + ",
        "any token missing after \"+\"",
    ));
    suite.add_test(TestCase::should_fail("line_ends_after_open_paren", "1 + ("));

    // Characters outside the language
    suite.add_test(TestCase::should_fail_with_message(
        "unknown_character",
        "x @ 1",
        "Unexpected character: '@'",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "letter_inside_number",
        "12abc",
        "in number '12'",
    ));

    // Very deeply nested expressions
    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    suite.add_test(TestCase::should_succeed("deeply_nested_parens", &deep_parens));

    suite
}

fn create_operator_tests() -> TestSuite {
    let mut suite = TestSuite::new("Operator Tests");

    // Missing operands
    suite.add_test(TestCase::should_fail("missing_right_operand", "1 +"));
    suite.add_test(TestCase::should_fail("missing_both_operands", "+"));

    // A leading operator is unary
    suite.add_test(TestCase::should_succeed("unary_plus", "+ 1"));
    suite.add_test(TestCase::should_succeed("unary_minus", "-x"));
    suite.add_test(TestCase::should_succeed("logical_not", "!(a == b)"));

    // The second of two operators is unary
    suite.add_test(TestCase::should_succeed("double_plus", "1 ++ 2")); // 1 + (+2)
    suite.add_test(TestCase::should_succeed("double_minus", "1 -- 2")); // 1 - (-2)
    suite.add_test(TestCase::should_succeed("mixed_operators", "1 +- 2")); // 1 + (-2)

    // Comparison operators
    suite.add_test(TestCase::should_succeed("comparison_equal", "1 == 2"));
    suite.add_test(TestCase::should_succeed("comparison_not_equal", "1 != 2"));
    suite.add_test(TestCase::should_succeed("comparison_less", "1 < 2"));
    suite.add_test(TestCase::should_succeed("comparison_greater", "1 > 2"));
    suite.add_test(TestCase::should_succeed("comparison_less_equal", "1 <= 2"));
    suite.add_test(TestCase::should_succeed("comparison_greater_equal", "1 >= 2"));

    suite
}

fn create_control_flow_tests() -> TestSuite {
    let mut suite = TestSuite::new("Control Flow Tests");

    // If statements
    suite.add_test(TestCase::should_succeed("valid_if", "if (x < 3)"));
    suite.add_test(TestCase::should_fail_with_message(
        "if_missing_condition",
        "if",
        "any token missing after \"if\"",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_without_brackets",
        "if x < 3",
        "\"x\" is unexpected token",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "if_with_trailing_statement",
        "if (x) y = 1",
        "any token can't exist after \")\"",
    ));

    // While loops
    suite.add_test(TestCase::should_succeed("valid_while", "while(i < 3)"));
    suite.add_test(TestCase::should_fail("while_missing_condition", "while"));

    // Block terminators stand alone
    suite.add_test(TestCase::should_succeed("end", "end"));
    suite.add_test(TestCase::should_succeed("else", "else"));
    suite.add_test(TestCase::should_fail_with_message(
        "end_with_trailing_token",
        "end x",
        "any token can't exist after \"end\"",
    ));

    // Return
    suite.add_test(TestCase::should_succeed("bare_return", "return"));
    suite.add_test(TestCase::should_succeed("return_expression", "return a + b"));

    suite
}

fn create_definition_tests() -> TestSuite {
    let mut suite = TestSuite::new("Definition Tests");

    suite.add_test(TestCase::should_succeed("func_with_params", "func add(a, b)"));
    suite.add_test(TestCase::should_succeed("func_without_params", "func main()"));
    suite.add_test(TestCase::should_fail_with_message(
        "func_without_brackets",
        "func add",
        "\"add\" is unexpected token",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "func_expression_param",
        "func add(a + b)",
        "\"+\" is unexpected token",
    ));
    suite.add_test(TestCase::should_fail("func_missing_name", "func"));

    suite
}

fn create_function_call_tests() -> TestSuite {
    let mut suite = TestSuite::new("Function Call Tests");

    // Valid function calls
    suite.add_test(TestCase::should_succeed("simple_function_call", "foo()"));
    suite.add_test(TestCase::should_succeed("function_call_with_args", "foo(1, 2, 3)"));
    suite.add_test(TestCase::should_succeed("print_command", "print x + 1"));
    suite.add_test(TestCase::should_succeed("print_call", "print(1, 2)"));
    suite.add_test(TestCase::should_succeed("print_user_call", "print add(2, 3)"));
    suite.add_test(TestCase::should_succeed("exit", "exit"));
    suite.add_test(TestCase::should_succeed("exit_call", "exit()"));

    // Invalid function calls
    suite.add_test(TestCase::should_fail("missing_closing_paren", "foo(1, 2"));
    suite.add_test(TestCase::should_fail("missing_opening_paren", "foo 1, 2)"));
    suite.add_test(TestCase::should_fail("trailing_comma", "foo(1, 2,)"));
    suite.add_test(TestCase::should_fail("print_without_argument", "print"));
    suite.add_test(TestCase::should_fail("exit_with_argument", "exit 1"));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignment Tests");

    // Valid assignments
    suite.add_test(TestCase::should_succeed("simple_assignment", "x = 1"));
    suite.add_test(TestCase::should_succeed("assignment_with_expression", "x = 1 + 2"));
    suite.add_test(TestCase::should_succeed("compound_assignment", "x += 2"));
    suite.add_test(TestCase::should_succeed("assign_negative", "x=-1"));

    // Invalid assignments
    suite.add_test(TestCase::should_fail("missing_value", "x ="));
    suite.add_test(TestCase::should_fail("missing_value_with_space", "x = "));

    suite
}

fn create_mixed_construct_tests() -> TestSuite {
    let mut suite = TestSuite::new("Mixed Construct Tests");

    // Complex valid expressions
    suite.add_test(TestCase::should_succeed(
        "complex_expression",
        "x = (1 + 2) * 3 + foo(4, 5)",
    ));
    suite.add_test(TestCase::should_succeed(
        "negated_group",
        "y = -(x + 1) * 2",
    ));

    // Complex invalid expressions
    suite.add_test(TestCase::should_fail(
        "unbalanced_call_in_expression",
        "x = foo(1 + (2 * 3)",
    ));

    suite
}

fn create_positive_tests() -> TestSuite {
    let mut suite = TestSuite::new("Positive Tests");

    // These tests verify that valid syntax still parses correctly
    suite.add_test(TestCase::should_succeed("simple_arithmetic", "1 + 2 * 3"));
    suite.add_test(TestCase::should_succeed("parentheses", "(1 + 2) * 3"));
    suite.add_test(TestCase::should_succeed("variable_assignment", "x = 42"));
    suite.add_test(TestCase::should_succeed("modulo", "a = b % 3"));
    suite.add_test(TestCase::should_succeed("increment", "i = i + 1"));
    suite.add_test(TestCase::should_succeed("comparison", "1 < 2"));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_front_end_tests() {
    println!("🧪 Line Front End Robustness Test Suite");
    println!("=======================================\n");

    let mut all_passed = true;

    // Run each test suite
    let suites = vec![
        create_malformed_expressions_tests(),
        create_edge_case_tests(),
        create_operator_tests(),
        create_control_flow_tests(),
        create_definition_tests(),
        create_function_call_tests(),
        create_assignment_tests(),
        create_mixed_construct_tests(),
        create_positive_tests(),
    ];

    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            all_passed = false;
        }
    }

    if all_passed {
        println!("🎉 ALL TESTS PASSED! Every line was accepted or rejected cleanly.");
    } else {
        println!("⚠️  Some tests failed. See output above for details.");
    }
    assert!(all_passed, "front end robustness suite reported failures");
}
