// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the `kfgc` commands on encoded units.

use kfg_binary::{BinaryWriter, Tag, TokenPosition};
use kfg_flow::{CompilationUnit, ConstValue, DecodeFault, Fragment, Instr, SharedUnit};
use kfgc::commands::{decode_unit, demo_unit, parse_decode_options, string_table, DecodeOptions};
use pretty_assertions::assert_eq;

fn demo() -> (SharedUnit, Vec<usize>) {
    let (bytes, offsets) = demo_unit().unwrap();
    (CompilationUnit::new("demo.kbin", bytes).unwrap(), offsets)
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[test]
fn options_parse_and_merge() {
    let mut options = parse_decode_options(&args(&["--offset=21", "--stats", "--jobs=4"]));
    assert_eq!(options.offsets, vec![21]);
    assert_eq!(options.jobs, Some(4));
    assert!(options.stats);

    options.merge(&parse_decode_options(&args(&[
        "--offset=30",
        "--background",
        "--catch=7",
        "--jobs=nope",
    ])));
    assert_eq!(
        options,
        DecodeOptions {
            offsets: vec![21, 30],
            jobs: Some(4),
            background: true,
            stats: true,
            initializer: false,
            catch_try_index: Some(7),
            verbose: false,
        }
    );
}

#[test]
fn demo_unit_layout() {
    let (unit, offsets) = demo();
    assert_eq!(offsets, vec![21, 22, 24, 27, 28, 30, 32, 34, 35]);
    assert_eq!(unit.bytes().len(), 37);

    let entries = string_table(&unit).unwrap();
    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["main", "3.14", "hello"]);
    assert_eq!(entries.iter().map(|e| e.offset).collect::<Vec<_>>(), vec![5, 10, 15]);
}

#[test]
fn mutator_walk_builds_every_node() {
    let (unit, offsets) = demo();
    let options = DecodeOptions {
        stats: true,
        catch_try_index: Some(3),
        ..DecodeOptions::default()
    };

    let report = decode_unit(&unit, &options).unwrap();

    let found: Vec<usize> = report.nodes.iter().map(|n| n.offset).collect();
    assert_eq!(found, offsets);
    assert_eq!(report.nodes[1].fragment, Fragment::int_constant(42));
    assert_eq!(report.nodes[2].fragment, Fragment::int_constant(-1000));
    assert_eq!(report.nodes[3].fragment, Fragment::int_constant(2));
    assert_eq!(report.nodes[4].fragment, report.nodes[5].fragment);
    let [Instr::Constant(symbol)] = report.nodes[6].fragment.instrs() else {
        panic!("expected a constant, got {}", report.nodes[6].fragment);
    };
    assert_eq!(symbol.value(), &ConstValue::Symbol("hello".into()));

    let rethrow = &report.nodes[8];
    assert!(!rethrow.fragment.is_open());
    assert_eq!(rethrow.end, 37);
    assert_eq!(
        rethrow.fragment.instrs().last(),
        Some(&Instr::RethrowException {
            position: TokenPosition::new(17),
            catch_try_index: 3,
        })
    );

    let stats = report.stats.unwrap();
    assert_eq!(stats.nodes_built, 9);
    assert_eq!((stats.const_cache_misses, stats.const_cache_inserts), (2, 2));
    assert_eq!(stats.const_cache_hits, 0);
    assert_eq!(unit.constants().len(), 2);
}

#[test]
fn background_tasks_read_what_the_mutator_cached() {
    let (unit, offsets) = demo();
    let doubles = vec![offsets[4], offsets[5]];

    let warm = DecodeOptions {
        offsets: doubles.clone(),
        ..DecodeOptions::default()
    };
    decode_unit(&unit, &warm).unwrap();
    let generation = unit.constants().generation();

    let options = DecodeOptions {
        offsets: vec![doubles[0], doubles[1], doubles[0]],
        background: true,
        jobs: Some(2),
        stats: true,
        ..DecodeOptions::default()
    };
    let report = decode_unit(&unit, &options).unwrap();

    let stats = report.stats.unwrap();
    assert_eq!(stats.const_cache_hits, 3);
    assert_eq!(stats.const_cache_inserts, 0);
    assert_eq!(report.strings_scanned, 0);
    assert_eq!(unit.constants().len(), 2);
    assert_eq!(unit.constants().generation(), generation);
    // Results come back in request order.
    assert_eq!(report.nodes[0].fragment, report.nodes[2].fragment);
    assert_eq!(report.nodes[1].offset, doubles[1]);
}

#[test]
fn background_tasks_never_populate_the_cache() {
    let (unit, offsets) = demo();
    let options = DecodeOptions {
        background: true,
        stats: true,
        catch_try_index: Some(0),
        ..DecodeOptions::default()
    };

    let report = decode_unit(&unit, &options).unwrap();

    assert_eq!(report.nodes.len(), offsets.len());
    assert_eq!(report.stats.map(|s| s.const_cache_inserts), Some(0));
    assert!(!unit.constants().exists());
}

#[test]
fn background_stats_count_each_node_once() {
    let (unit, offsets) = demo();
    let options = DecodeOptions {
        background: true,
        stats: true,
        catch_try_index: Some(0),
        ..DecodeOptions::default()
    };

    let report = decode_unit(&unit, &options).unwrap();

    let stats = report.stats.unwrap();
    assert_eq!(report.nodes.len(), offsets.len());
    assert_eq!(stats.nodes_built, 9);
    // One miss per double literal node; nothing was cached to hit.
    assert_eq!((stats.const_cache_misses, stats.const_cache_hits), (2, 0));
}

#[test]
fn initializer_constants_are_not_cached() {
    let (unit, offsets) = demo();
    let options = DecodeOptions {
        offsets: vec![offsets[4]],
        initializer: true,
        ..DecodeOptions::default()
    };

    decode_unit(&unit, &options).unwrap();

    assert!(!unit.constants().exists());
}

#[test]
fn rethrow_needs_a_catch_block() {
    let (unit, offsets) = demo();
    let options = DecodeOptions {
        offsets: vec![offsets[8]],
        ..DecodeOptions::default()
    };
    assert_eq!(
        decode_unit(&unit, &options).unwrap_err(),
        DecodeFault::NoCatchBlock
    );
}

#[test]
fn unsupported_node_fails_the_decode() {
    let mut writer = BinaryWriter::with_strings::<&str>(&[]).unwrap();
    writer.write_tag(Tag::NullLiteral);
    let throw = writer.offset();
    writer.write_tag(Tag::Throw);
    let unit = CompilationUnit::new("throw.kbin", writer.finish()).unwrap();

    let fault = decode_unit(&unit, &DecodeOptions::default()).unwrap_err();

    assert_eq!(
        fault,
        DecodeFault::UnsupportedTag {
            tag: Tag::Throw,
            offset: throw,
        }
    );
}
