use pretty_assertions::assert_eq;

use super::*;
use crate::ConstValue;

fn var(name: &str, index: u32) -> LocalVariable {
    LocalVariable::new(name, index)
}

#[test]
fn empty_fragment_has_no_endpoints() {
    let fragment = Fragment::new();
    assert!(fragment.is_empty());
    assert!(fragment.is_open());
    assert_eq!(fragment.entry(), None);
    assert_eq!(fragment.exit(), None);
}

#[test]
fn single_instruction_is_both_endpoints() {
    let fragment = Fragment::int_constant(5);
    assert_eq!(fragment.len(), 1);
    assert_eq!(fragment.entry(), Some(&Instr::IntConstant(5)));
    assert_eq!(fragment.exit(), Some(&Instr::IntConstant(5)));
}

#[test]
fn append_wires_exit_to_entry() {
    let a = Fragment::int_constant(1) + Fragment::push_argument();
    let b = Fragment::load_local(&var("x", 0)) + Fragment::int_constant(2);

    let ab = a.clone() + b.clone();

    assert_eq!(ab.entry(), a.entry());
    assert_eq!(ab.exit(), b.exit());
    // a's flow-out now flows to b's flow-in
    assert_eq!(ab.successor(a.len() - 1), b.entry());
    assert_eq!(ab.len(), a.len() + b.len());
}

#[test]
fn appending_to_empty_yields_other() {
    let mut fragment = Fragment::new();
    fragment += Fragment::push_argument();
    assert_eq!(fragment, Fragment::push_argument());
}

#[test]
fn rethrow_closes_fragment() {
    let fragment = Fragment::push_argument()
        + Fragment::rethrow_exception(TokenPosition::new(3), 0);
    assert!(!fragment.is_open());
    assert_eq!(fragment.exit(), None);
    assert_eq!(fragment.entry(), Some(&Instr::PushArgument));
}

#[test]
fn closed_fragment_drops_appended_code() {
    let mut fragment = Fragment::rethrow_exception(TokenPosition::new(3), 1);
    fragment += Fragment::int_constant(9);
    assert_eq!(fragment.len(), 1);
    assert!(!fragment.is_open());

    let marked = Fragment::int_constant(1).closed() + Fragment::int_constant(2);
    assert_eq!(marked.instrs(), &[Instr::IntConstant(1)]);
}

#[test]
fn display_lists_instructions() {
    let null = Instance::new(ConstValue::Null);
    let fragment = Fragment::constant(null)
        + Fragment::load_local(&var("e", 2))
        + Fragment::rethrow_exception(TokenPosition::NO_SOURCE, 7);
    assert_eq!(
        fragment.to_string(),
        "    0: Constant(null)\n    1: LoadLocal(e#2)\n    2: ReThrow(try_index: 7) @none\n  (closed)\n"
    );
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod properties {
    use proptest::prelude::*;

    use super::*;

    fn open_instr() -> impl Strategy<Value = Instr> {
        prop_oneof![
            any::<i64>().prop_map(Instr::IntConstant),
            Just(Instr::PushArgument),
            (0..8u32).prop_map(|i| Instr::LoadLocal(var("v", i))),
            (-1..100i32).prop_map(|p| Instr::DebugStepCheck(TokenPosition::new(p))),
        ]
    }

    fn open_fragment() -> impl Strategy<Value = Fragment> {
        prop::collection::vec(open_instr(), 1..6)
            .prop_map(|instrs| instrs.into_iter().map(Fragment::single).fold(Fragment::new(), Fragment::add))
    }

    proptest! {
        #[test]
        fn composition_wires_endpoints(a in open_fragment(), b in open_fragment()) {
            let ab = a.clone() + b.clone();
            prop_assert_eq!(ab.entry(), a.entry());
            prop_assert_eq!(ab.exit(), b.exit());
            prop_assert_eq!(ab.successor(a.len() - 1), b.entry());
            prop_assert_eq!(&ab.instrs()[..a.len()], a.instrs());
            prop_assert!(ab.is_open());
        }
    }
}
