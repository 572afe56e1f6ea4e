// Copyright (c) 2018 Fabian Schuiki
extern crate lrscope;

use std::collections::HashSet;

use lrscope::analysis::Analysis;
use lrscope::error::ParseError;
use lrscope::grammar::{Grammar, END};
use lrscope::lr1::{ItemSets, StateId};
use lrscope::parser::{Parser, Step};
use lrscope::table::{Action, ConflictKind, ConflictResolution, ParseTable};
use lrscope::tree::{Label, Node};

const EXPRESSION: &str = include_str!("../grammars/expression.txt");
const DANGLING_ELSE: &str = include_str!("../grammars/dangling-else.txt");
const NULLABLE: &str = include_str!("../grammars/nullable.txt");

struct Built {
    grammar: Grammar,
    analysis: Analysis,
    item_sets: ItemSets,
    table: ParseTable,
}

fn build(src: &str) -> Built {
    let grammar: Grammar = src.parse().unwrap();
    let analysis = Analysis::compute(&grammar).unwrap();
    let item_sets = ItemSets::compute(&grammar, analysis.first()).unwrap();
    let table = ParseTable::compute(&grammar, &item_sets);
    Built {
        grammar,
        analysis,
        item_sets,
        table,
    }
}

fn names(g: &Grammar, node: &Node) -> String {
    node.leaves()
        .into_iter()
        .map(|t| g.terminal_name(t))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn analysis_properties() {
    for src in &[EXPRESSION, DANGLING_ELSE, NULLABLE] {
        let b = build(src);
        for info in b.analysis.nonterminals(&b.grammar) {
            assert_eq!(info.nullable, info.first.has_epsilon(), "{}", info.name);
        }
        assert!(b.analysis.follow()[b.grammar.start()].contains(END));
        assert_eq!(Analysis::compute(&b.grammar).unwrap(), b.analysis);
    }
}

#[test]
fn states_reachable_and_distinct() {
    for src in &[EXPRESSION, DANGLING_ELSE, NULLABLE] {
        let b = build(src);
        let mut seen = HashSet::new();
        let mut todo = vec![StateId::from_usize(0)];
        while let Some(id) = todo.pop() {
            if seen.insert(id) {
                todo.extend(b.item_sets[id].transitions().values().cloned());
            }
        }
        assert_eq!(seen.len(), b.item_sets.len());

        let contents: HashSet<String> = b
            .item_sets
            .states()
            .iter()
            .map(|s| {
                let mut lines: Vec<String> = s
                    .items()
                    .items()
                    .iter()
                    .map(|i| format!("{}", i.pretty(&b.grammar)))
                    .collect();
                lines.sort();
                lines.join("\n")
            })
            .collect();
        assert_eq!(contents.len(), b.item_sets.len());
    }
}

#[test]
fn expression_round_trip() {
    let b = build(EXPRESSION);
    assert!(b.table.conflicts().is_empty());
    let parser = Parser::new(&b.grammar, &b.table);
    for input in &["id", "id + id", "id * id + id", "( id + id ) * id", "( ( id ) )"] {
        let tree = parser.parse_str(input).unwrap();
        assert_eq!(names(&b.grammar, &tree), *input);
        assert_eq!(tree.label(), Label::Nonterminal(b.grammar.start()));
    }
}

#[test]
fn precedence_shape() {
    let b = build(EXPRESSION);
    let tree = Parser::new(&b.grammar, &b.table)
        .parse_str("id + id * id")
        .unwrap();
    // E -> E + T, where T -> T * F holds the multiplication.
    assert_eq!(tree.children().len(), 3);
    let t = &tree.children()[2];
    assert_eq!(t.label(), Label::Nonterminal(b.grammar.nonterminal("T").unwrap()));
    assert_eq!(t.children().len(), 3);
    assert_eq!(names(&b.grammar, t), "id * id");
}

#[test]
fn bad_input_terminates() {
    let b = build(EXPRESSION);
    let parser = Parser::new(&b.grammar, &b.table);
    for input in &[
        "id id",
        "+",
        "( id",
        "id + ",
        ")",
        "id * * id",
        "",
        "id $ + id",
        "( id ) $ * id",
        "id + $ id",
        "$ id",
    ] {
        let tokens = parser.tokenize(input).unwrap();
        let bound = (tokens.len() + 1) * (b.table.num_states() + 1);
        let mut steps = 0;
        let result = parser.parse_observed(tokens, &mut |_: &Step| steps += 1);
        match result {
            Err(ParseError::UnexpectedToken { .. }) => (),
            x => panic!("`{}` gave {:?}", input, x),
        }
        assert!(steps <= bound, "`{}` took {} steps", input, steps);
    }
}

#[test]
fn unexpected_token_message() {
    let b = build(EXPRESSION);
    let err = Parser::new(&b.grammar, &b.table)
        .parse_str("id id")
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("unexpected `id` at position 1"), "{}", msg);
    assert!(msg.contains("expected one of: $, +, *"), "{}", msg);
}

#[test]
fn epsilon_reduction() {
    let b = build("B -> A c\nA -> ''");
    let b_id = b.grammar.nonterminal("B").unwrap();
    assert_eq!(format!("{}", b.analysis.first()[b_id].pretty(&b.grammar)), "{c}");

    let mut shifted = 0;
    let tree = Parser::new(&b.grammar, &b.table)
        .parse_observed(b.grammar.terminal("c"), &mut |step: &Step| {
            if let Action::Shift(_) = step.action {
                shifted += 1;
            }
        })
        .unwrap();
    assert_eq!(shifted, 1);
    let a = &tree.children()[0];
    assert_eq!(a.children().len(), 1);
    assert_eq!(a.children()[0].label(), Label::Epsilon);
}

#[test]
fn nullable_prefixes() {
    let b = build(NULLABLE);
    let parser = Parser::new(&b.grammar, &b.table);
    for input in &["c", "a c", "b c", "a b c"] {
        let tree = parser.parse_str(input).unwrap();
        assert_eq!(names(&b.grammar, &tree), *input);
    }
    assert!(parser.parse_str("b a c").is_err());
}

#[test]
fn nested_epsilon_prefix() {
    let b = build("S -> B B B B B x\nB -> C C C C C\nC -> ''");
    assert!(b.table.conflicts().is_empty());
    let parser = Parser::new(&b.grammar, &b.table);
    let tree = parser.parse_str("x").unwrap();
    assert_eq!(names(&b.grammar, &tree), "x");
    assert!(tree.children()[..5]
        .iter()
        .all(|node| node.children().len() == 5 && node.leaves().is_empty()));
    assert!(parser.parse_str("x x").is_err());
}

#[test]
fn dangling_else_conflict() {
    let b = build(DANGLING_ELSE);
    let conflicts = b.table.conflicts();
    assert!(!conflicts.is_empty());
    let c = &conflicts[0];
    assert_eq!(c.kind(), ConflictKind::ShiftReduce);
    assert_eq!(b.grammar.terminal_name(c.terminal), "else");
    assert!(c.actions.len() >= 2);

    for _ in 0..3 {
        let again = build(DANGLING_ELSE);
        assert_eq!(again.table.conflicts(), conflicts);
    }
}

#[test]
fn dangling_else_resolution() {
    let b = build(DANGLING_ELSE);
    let input = "if cond then if cond then other else other";

    // The reduction is found before the shift, so by default the `else`
    // belongs to the outer `if`.
    let outer = Parser::new(&b.grammar, &b.table).parse_str(input).unwrap();
    assert_eq!(outer.children().len(), 6);
    assert_eq!(outer.children()[3].children().len(), 4);

    let inner = Parser::new(&b.grammar, &b.table)
        .with_resolution(ConflictResolution::PreferShift)
        .parse_str(input)
        .unwrap();
    assert_eq!(inner.children().len(), 4);
    assert_eq!(inner.children()[3].children().len(), 6);

    assert_eq!(names(&b.grammar, &outer), input);
    assert_eq!(names(&b.grammar, &inner), input);
}

#[test]
fn shared_table_independent_runs() {
    let b = build(EXPRESSION);
    let parser = Parser::new(&b.grammar, &b.table);
    let first = parser.parse_str("id + id").unwrap();
    let second = parser.parse_str("id + id").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id().as_usize(), second.id().as_usize());
}
