mod support;

use mapgen_build::ContainerBuilderContext;
use mapgen_core::cfg::MapperConfig;
use mapgen_core::diagnostics::{DiagnosticDescriptor, DiagnosticManager};
use mapgen_core::tree::{ContainerId, MappingChild, MappingTree, MemberMappingInfo, OnNullAction};
use mapgen_core::Result;
use pretty_assertions::assert_eq;
use support::{member, nullable_member, path, FakeSymbols};

fn guards_under(tree: &MappingTree, id: ContainerId) -> Vec<ContainerId> {
    tree.node(id)
        .unwrap()
        .children()
        .iter()
        .filter_map(|child| match child {
            MappingChild::Container(guard) => Some(*guard),
            _ => None,
        })
        .collect()
}

fn assignments_under(tree: &MappingTree, id: ContainerId) -> usize {
    tree.node(id)
        .unwrap()
        .children()
        .iter()
        .filter(|child| matches!(child, MappingChild::Assignment(_)))
        .count()
}

#[test]
fn shared_nullable_prefix_produces_one_guard() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    let a = nullable_member("Src", "a", "A");
    let b = nullable_member("A", "b", "B");
    let source_c = path("Src", vec![a.clone(), b.clone(), member("B", "c", "C")]);
    let source_d = path("Src", vec![a, b, member("B", "d", "D")]);

    ctx.add_guarded_assignment(MemberMappingInfo::new(
        source_c,
        path("Dst", vec![member("Dst", "tc", "C")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        source_d,
        path("Dst", vec![member("Dst", "td", "D")]),
    ))?;

    let tree = ctx.finish();
    let guards = guards_under(&tree, tree.root());
    assert_eq!(guards.len(), 1);
    assert_eq!(assignments_under(&tree, guards[0]), 2);
    assert_eq!(assignments_under(&tree, tree.root()), 0);
    Ok(())
}

#[test]
fn guards_nest_under_shared_prefix_guard() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    let a = nullable_member("Src", "a", "A");
    let b = nullable_member("A", "b", "B");
    let e = nullable_member("A", "e", "E");

    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone()]),
        path("Dst", vec![member("Dst", "ta", "A2")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone(), b.clone(), member("B", "c", "C")]),
        path("Dst", vec![member("Dst", "tc", "C")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone(), b, member("B", "d", "D")]),
        path("Dst", vec![member("Dst", "td", "D")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a, e, member("E", "f", "F")]),
        path("Dst", vec![member("Dst", "tf", "F")]),
    ))?;

    let tree = ctx.finish();
    assert_eq!(
        tree.outline(),
        "root\n\
         \x20 guard Src.a\n\
         \x20   assign Dst.ta = Src.a\n\
         \x20   guard Src.a.b\n\
         \x20     assign Dst.tc = Src.a.b.c\n\
         \x20     assign Dst.td = Src.a.b.d\n\
         \x20   guard Src.a.e\n\
         \x20     assign Dst.tf = Src.a.e.f\n"
    );
    Ok(())
}

#[test]
fn unguarded_nullable_ancestor_forces_null_safe_access() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    let a = nullable_member("Src", "a", "A");
    let b = nullable_member("A", "b", "B");

    // no guard exists for Src.a alone, so the Src.a.b condition getter has
    // to traverse a null-conditionally
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a, b, member("B", "c", "C")]),
        path("Dst", vec![member("Dst", "tc", "C")]),
    ))?;

    let tree = ctx.finish();
    let guards = guards_under(&tree, tree.root());
    assert_eq!(guards.len(), 1);
    assert!(tree.guard(guards[0])?.needs_null_safe_access);
    Ok(())
}

#[test]
fn initializer_precedes_dependent_assignment() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    let target = path(
        "Dst",
        vec![
            member("Dst", "x", "X"),
            nullable_member("X", "y", "Y"),
            member("Y", "z", "Z"),
        ],
    );
    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s", "Z")]),
        target,
    ))?;

    let tree = ctx.finish();
    assert_eq!(
        tree.outline(),
        "root\n  init Dst.x.y coalesce\n  assign Dst.x.y.z = Src.s\n"
    );
    Ok(())
}

#[test]
fn initializer_is_emitted_once_per_target_sub_path() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    let x = member("Dst", "x", "X");
    let y = nullable_member("X", "y", "Y");
    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s1", "Z")]),
        path("Dst", vec![x.clone(), y.clone(), member("Y", "z", "Z")]),
    ))?;
    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s2", "W")]),
        path("Dst", vec![x, y, member("Y", "w", "W")]),
    ))?;

    let tree = ctx.finish();
    assert_eq!(
        tree.outline(),
        "root\n\
         \x20 init Dst.x.y coalesce\n\
         \x20 assign Dst.x.y.z = Src.s1\n\
         \x20 assign Dst.x.y.w = Src.s2\n"
    );
    Ok(())
}

#[test]
fn get_check_set_is_used_without_coalesce_support() -> Result<()> {
    let symbols = FakeSymbols::new().without_coalesce("Dst.x.y");
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s", "Z")]),
        path(
            "Dst",
            vec![
                member("Dst", "x", "X"),
                nullable_member("X", "y", "Y"),
                member("Y", "z", "Z"),
            ],
        ),
    ))?;

    let tree = ctx.finish();
    assert_eq!(
        tree.outline(),
        "root\n  init Dst.x.y get-check-set\n  assign Dst.x.y.z = Src.s\n"
    );
    Ok(())
}

#[test]
fn missing_parameterless_constructor_skips_initializer() -> Result<()> {
    let symbols = FakeSymbols::new().without_parameterless_ctor("Y");
    let diagnostics = DiagnosticManager::new();
    let mut ctx = ContainerBuilderContext::new(&symbols, MapperConfig::default(), diagnostics.clone());

    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s", "Z")]),
        path(
            "Dst",
            vec![
                member("Dst", "x", "X"),
                nullable_member("X", "y", "Y"),
                member("Y", "z", "Z"),
            ],
        ),
    ))?;

    let tree = ctx.finish();
    // the assignment is still attempted, without its initializer
    assert_eq!(tree.outline(), "root\n  assign Dst.x.y.z = Src.s\n");
    assert_eq!(
        diagnostics.count_of(DiagnosticDescriptor::NoParameterlessConstructorFound),
        1
    );
    Ok(())
}

#[test]
fn non_settable_intermediate_gets_no_initializer_and_no_diagnostic() -> Result<()> {
    let symbols = FakeSymbols::new();
    let diagnostics = DiagnosticManager::new();
    let mut ctx = ContainerBuilderContext::new(&symbols, MapperConfig::default(), diagnostics.clone());

    ctx.add_member_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "s", "Z")]),
        path(
            "Dst",
            vec![
                member("Dst", "x", "X"),
                nullable_member("X", "y", "Y").read_only(),
                member("Y", "z", "Z"),
            ],
        ),
    ))?;

    let tree = ctx.finish();
    assert_eq!(tree.outline(), "root\n  assign Dst.x.y.z = Src.s\n");
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn mismatch_policy_wins_when_attached_first() -> Result<()> {
    let symbols = FakeSymbols::new();
    let config = MapperConfig::default()
        .with_allow_null_property_assignment(true)
        .with_throw_on_property_mapping_null_mismatch(true);
    let mut ctx = ContainerBuilderContext::new(&symbols, config, DiagnosticManager::new());

    let a = nullable_member("Src", "a", "A");
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone()]),
        path("Dst", vec![member("Dst", "t1", "T1")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a]),
        path("Dst", vec![nullable_member("Dst", "t2", "T2")]),
    ))?;

    let tree = ctx.finish();
    let guards = guards_under(&tree, tree.root());
    assert_eq!(guards.len(), 1);
    assert_eq!(
        tree.guard(guards[0])?.on_null,
        Some(OnNullAction::RaiseMismatch)
    );
    Ok(())
}

#[test]
fn null_assignments_accumulate_on_shared_guard() -> Result<()> {
    let symbols = FakeSymbols::new();
    let config = MapperConfig::default()
        .with_allow_null_property_assignment(true)
        .with_throw_on_property_mapping_null_mismatch(true);
    let mut ctx = ContainerBuilderContext::new(&symbols, config, DiagnosticManager::new());

    let a = nullable_member("Src", "a", "A");
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone(), member("A", "b", "B")]),
        path("Dst", vec![nullable_member("Dst", "t1", "B")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a.clone(), member("A", "c", "C")]),
        path("Dst", vec![nullable_member("Dst", "t2", "C")]),
    ))?;
    // a non-nullable target afterwards must not replace the null assignments
    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![a, member("A", "d", "D")]),
        path("Dst", vec![member("Dst", "t3", "D")]),
    ))?;

    let tree = ctx.finish();
    let guards = guards_under(&tree, tree.root());
    assert_eq!(guards.len(), 1);
    match tree.guard(guards[0])?.on_null.as_ref() {
        Some(OnNullAction::AssignNull(setters)) => {
            assert_eq!(setters.len(), 2);
            assert_eq!(setters[0].path.to_string(), "Dst.t1");
            assert_eq!(setters[1].path.to_string(), "Dst.t2");
        }
        other => panic!("unexpected on-null action: {:?}", other),
    }
    Ok(())
}

#[test]
fn source_without_nullable_steps_is_added_directly() -> Result<()> {
    let symbols = FakeSymbols::new();
    let mut ctx =
        ContainerBuilderContext::new(&symbols, MapperConfig::default(), DiagnosticManager::new());

    ctx.add_guarded_assignment(MemberMappingInfo::new(
        path("Src", vec![member("Src", "a", "A"), member("A", "b", "B")]),
        path("Dst", vec![member("Dst", "t", "B")]),
    ))?;
    ctx.add_guarded_assignment(MemberMappingInfo::without_source(path(
        "Dst",
        vec![member("Dst", "u", "U")],
    )))?;

    let tree = ctx.finish();
    assert!(guards_under(&tree, tree.root()).is_empty());
    assert_eq!(assignments_under(&tree, tree.root()), 2);
    Ok(())
}

#[test]
fn guarded_assignment_with_initializer_and_null_target() -> Result<()> {
    let symbols = FakeSymbols::new();
    let config = MapperConfig::default().with_allow_null_property_assignment(true);
    let diagnostics = DiagnosticManager::new();
    let mut ctx = ContainerBuilderContext::new(&symbols, config, diagnostics.clone());

    let source = path(
        "Src",
        vec![
            member("Src", "A", "TA"),
            nullable_member("TA", "B", "TB"),
            member("TB", "C", "TC"),
        ],
    );
    let target = path(
        "Dst",
        vec![
            member("Dst", "X", "TX"),
            nullable_member("TX", "Y", "TY"),
            nullable_member("TY", "Z", "TC"),
        ],
    );
    ctx.add_guarded_assignment(MemberMappingInfo::new(source, target.clone()))?;

    assert_eq!(ctx.mapped_targets().to_vec(), vec![target]);
    let tree = ctx.finish();
    assert_eq!(
        tree.outline(),
        "root\n\
         \x20 guard Src.A.B on-null: set-null Dst.X.Y.Z\n\
         \x20   init Dst.X.Y coalesce\n\
         \x20   assign Dst.X.Y.Z = Src.A.B.C\n"
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn outline_depends_only_on_insertion_order() -> Result<()> {
    let build = || -> Result<String> {
        let symbols = FakeSymbols::new();
        let mut ctx = ContainerBuilderContext::new(
            &symbols,
            MapperConfig::default(),
            DiagnosticManager::new(),
        );
        let a = nullable_member("Src", "a", "A");
        ctx.add_guarded_assignment(MemberMappingInfo::new(
            path("Src", vec![a.clone(), member("A", "b", "B")]),
            path("Dst", vec![member("Dst", "tb", "B")]),
        ))?;
        ctx.add_guarded_assignment(MemberMappingInfo::new(
            path("Src", vec![a, member("A", "c", "C")]),
            path("Dst", vec![member("Dst", "tc", "C")]),
        ))?;
        Ok(ctx.finish().outline())
    };

    assert_eq!(build()?, build()?);
    Ok(())
}
