// tests/parser_tests.rs
//! Integration tests for the Teal parser
//!
//! These tests run the parser over complete Teal programs and check that
//! recovery, limits and printing behave together.


use bumpalo::Bump;
use teal::ast::printer::print_block;
use teal::ast::*;
use teal::{ParseErrorKind, ParserConfig};
use test_harness::{TestHarness, parse_source};

const SCRIPTS: &[&str] = &[
    "hello_world.tl",
    "functions.tl",
    "expressions.tl",
    "control_flow.tl",
    "records.tl",
    "declarations.tl",
    "performance/large_800.tl",
];

#[test]
fn test_hello_world() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("hello_world.tl", &arena);

    let block = result.assert_success();
    assert_eq!(block.len(), 2);
}

#[test]
fn test_functions() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("functions.tl", &arena);
    result.assert_success();

    let functions = result.get_functions();
    assert_eq!(functions.len(), 8);

    let method = functions.iter().find(|f| f.is_method()).expect("method declaration");
    assert_eq!(method.name().map(|n| n.name), Some("method"));
    assert!(method.body.returns.is_some_and(|r| r.variadic));

    let variadic = functions.iter().filter(|f| f.body.is_variadic()).count();
    assert_eq!(variadic, 1);

    assert!(
        functions
            .iter()
            .any(|f| f.visibility == Visibility::Global && f.name().map(|n| n.name) == Some("apply"))
    );
}

#[test]
fn test_expressions() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("expressions.tl", &arena);
    result.assert_success();

    let counter = result.count();
    assert!(counter.binary_expr_count >= 30, "got {counter:?}");
    assert_eq!(counter.cast_count, 2);
    assert!(counter.table_count >= 5);
    assert!(counter.paren_count >= 3);
}

#[test]
fn test_control_flow() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("control_flow.tl", &arena);
    result.assert_success();

    let counter = result.count();
    assert_eq!(counter.if_count, 3);
    assert_eq!(counter.while_count, 1);
    assert_eq!(counter.repeat_count, 1);
    assert_eq!(counter.for_count, 3);
}

#[test]
fn test_records_and_types() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("records.tl", &arena);
    result.assert_success();

    let records = result.get_records();
    assert_eq!(records.len(), 5);
    assert!(records.iter().any(|r| r.is_interface));

    let vec = records.iter().find(|r| r.name.name == "Vec").expect("Vec record");
    assert_eq!(vec.visibility, Visibility::Global);
    assert!(vec.body.is_userdata());
    assert!(vec.body.array_element.is_some());

    let guarded = records.iter().find(|r| r.name.name == "Guarded").expect("Guarded record");
    assert!(guarded.body.where_clause.is_some());

    let aliases = result.get_type_aliases();
    assert_eq!(aliases.len(), 7);
    let forward = aliases.last().expect("forward declaration");
    assert_eq!(forward.name.name, "Forward");
    assert!(forward.ty.is_none());

    let counter = result.count();
    // Color, Kind and the inline Mode
    assert_eq!(counter.enum_count, 3);
}

#[test]
fn test_declarations_and_soft_keywords() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("declarations.tl", &arena);
    let block = result.assert_success();

    assert_eq!(block.len(), 13);
    let vars = result.get_var_decls();
    assert_eq!(vars.len(), 11);
    assert!(vars.iter().any(|v| v.names.iter().any(|n| n.attrib.map(|a| a.name) == Some("close"))));
    assert!(matches!(block.stmts[11], Stmt::Assign(_)));
    assert!(matches!(block.stmts[12], Stmt::Assign(_)));
}

#[test]
fn test_recovery_keeps_surrounding_statements() {
    let harness = TestHarness::new();
    let arena = Bump::new();
    let result = harness.load_and_parse("errors.tl", &arena);

    let block = result.recovered_block();
    assert_eq!(block.len(), 4);
    assert_eq!(result.errors.len(), 1);

    let error = result.errors.first().unwrap();
    assert_eq!((error.line(), error.col()), (2, 16));
    assert_eq!(error.kind, ParseErrorKind::ExpectedExpression);
}

#[test]
fn test_malformed_statement_between_good_ones() {
    let arena = Bump::new();
    let result = parse_source("local a = 1\nx = = 2\nlocal b = 2", &arena);

    let block = result.recovered_block();
    assert_eq!(block.len(), 3);
    assert!(matches!(block.stmts[0], Stmt::VarDecl(v) if v.names[0].name.name == "a"));
    assert!(matches!(block.stmts[2], Stmt::VarDecl(v) if v.names[0].name.name == "b"));

    assert_eq!(result.errors.len(), 1, "messages: {:?}", result.messages());
    let error = result.errors.first().unwrap();
    assert_eq!((error.line(), error.col()), (2, 5));
}

#[test]
fn test_name_led_statement_after_error_is_skipped() {
    // Recovery resumes at keywords, so an assignment right after a broken
    // statement is discarded with it.
    let arena = Bump::new();
    let result = parse_source("local x = )\ny = 2\nlocal z = 3", &arena);

    let block = result.recovered_block();
    assert_eq!(result.errors.len(), 1, "messages: {:?}", result.messages());
    let error = result.errors.first().unwrap();
    assert_eq!((error.line(), error.col()), (1, 11));

    assert_eq!(block.len(), 2);
    assert!(matches!(block.stmts[0], Stmt::VarDecl(v) if v.names[0].name.name == "x"));
    assert!(matches!(block.stmts[1], Stmt::VarDecl(v) if v.names[0].name.name == "z"));
}

#[test]
fn test_error_cap_aborts() {
    let source = "local x = )\n".repeat(25);
    let arena = Bump::new();
    let outcome = teal::parse(&source, &arena);

    assert!(outcome.is_aborted());
    assert_eq!(outcome.errors.len(), 11);
    let last = outcome.errors.last().unwrap();
    assert_eq!(last.kind, ParseErrorKind::TooManyErrors);
    assert_eq!(last.message, "too many parsing errors (10)");
}

#[test]
fn test_custom_error_cap() {
    let source = "local x = )\n".repeat(5);
    let arena = Bump::new();

    let outcome = teal::parse_with_config(&source, &arena, ParserConfig::new().with_max_errors(3));
    assert!(outcome.is_aborted());
    assert_eq!(outcome.errors.len(), 4);

    let outcome = teal::parse_with_config(&source, &arena, ParserConfig::new().with_max_errors(50));
    assert!(!outcome.is_aborted());
    assert_eq!(outcome.errors.len(), 5);
    assert_eq!(outcome.block.map(|b| b.len()), Some(5));
}

#[test]
fn test_nesting_limit_aborts_cleanly() {
    let depth = 100;
    let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
    let arena = Bump::new();

    let outcome = teal::parse_with_config(&source, &arena, ParserConfig::new().with_max_depth(50));
    assert!(outcome.is_aborted());
    let last = outcome.errors.last().unwrap();
    assert_eq!(last.kind, ParseErrorKind::NestingTooDeep);
    assert_eq!(last.message, "maximum nesting depth (50) exceeded");
}

#[test]
fn test_default_nesting_limit_on_deep_input() {
    // Runs on the default test thread stack.
    let depth = 1000;
    let source = format!("x = {}1{}", "{".repeat(depth), "}".repeat(depth));
    let arena = Bump::new();
    let outcome = teal::parse(&source, &arena);

    assert!(outcome.is_aborted());
    let last = outcome.errors.last().unwrap();
    assert_eq!(last.kind, ParseErrorKind::NestingTooDeep);
    assert_eq!(last.message, "maximum nesting depth (200) exceeded");
}

#[test]
fn test_deep_valid_nesting_on_default_stack() {
    let depth = 150;
    let source = format!("x = {}1{}", "f(".repeat(depth), ")".repeat(depth));
    let arena = Bump::new();
    let result = parse_source(source, &arena);
    result.assert_success();
    assert_eq!(result.count().call_count, depth);

    let source = format!(
        "local t = {}0{}",
        "{ function() return ".repeat(60),
        " end }".repeat(60)
    );
    let arena = Bump::new();
    parse_source(source, &arena).assert_success();
}

#[test]
fn test_unbalanced_parens_report_without_crashing() {
    let source = format!("x = {}", "(".repeat(100));
    let arena = Bump::new();
    let outcome = teal::parse(&source, &arena);

    assert!(!outcome.errors.is_empty());
    assert!(outcome.errors.len() <= ParserConfig::DEFAULT_MAX_ERRORS + 1);
}

#[test]
fn test_long_concat_chain_costs_no_depth() {
    let parts: Vec<String> = (0..250).map(|i| format!("'p{i}'")).collect();
    let source = format!("local s = {}", parts.join(" .. "));
    let arena = Bump::new();
    let result = parse_source(source, &arena);
    let block = result.assert_success();

    let Stmt::VarDecl(decl) = block.stmts[0] else {
        panic!("Expected variable declaration");
    };
    // Right associative: the spine runs down the right operands.
    let mut node = decl.values[0];
    let mut operands = 1;
    while let Expr::Binary(binary) = node {
        assert_eq!(binary.op, BinaryOp::Concat);
        assert!(matches!(binary.left, Expr::Literal(_)));
        node = binary.right;
        operands += 1;
    }
    assert_eq!(operands, 250);
}

#[test]
fn test_moderate_nesting_is_fine() {
    let depth = 30;
    let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
    let arena = Bump::new();
    let result = parse_source(source, &arena);
    result.assert_success();
    assert_eq!(result.count().paren_count, depth);
}

#[test]
fn test_empty_and_comment_only_sources() {
    for source in ["", "   \n\t\n", "-- just a comment", "--[[ long\ncomment ]]"] {
        let arena = Bump::new();
        let result = parse_source(source, &arena);
        assert!(result.assert_success().is_empty());
    }
}

#[test]
fn test_lexical_errors_are_reported() {
    let arena = Bump::new();
    let result = parse_source("local s = \"unterminated\nlocal t = 1", &arena);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::Lexical)
    );
}

#[test]
fn test_print_and_reparse_is_stable() {
    let harness = TestHarness::new();
    for script in SCRIPTS {
        let arena = Bump::new();
        let first = harness.load_and_parse(script, &arena);
        let printed = print_block(first.assert_success());

        let reparsed = parse_source(printed.clone(), &arena);
        let block = reparsed.assert_success();
        assert_eq!(block.len(), first.recovered_block().len(), "{script}");
        assert_eq!(print_block(block), printed, "{script} is not stable under printing");
    }
}
