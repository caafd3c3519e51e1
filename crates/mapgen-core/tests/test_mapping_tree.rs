use mapgen_core::path::MemberPath;
use mapgen_core::symbol::{AccessMode, MemberDef, MemberGetter, MemberSetter, TypeRef};
use mapgen_core::tree::{AssignmentMapping, GuardMapping, MappingTree};
use mapgen_core::Result;

fn source_path() -> MemberPath {
    let root = TypeRef::new("Src");
    MemberPath::new(
        root.clone(),
        vec![MemberDef::new(root, "order", TypeRef::new("Order")).nullable()],
    )
    .unwrap()
}

fn target_path() -> MemberPath {
    let root = TypeRef::new("Dst");
    MemberPath::new(
        root.clone(),
        vec![MemberDef::new(root, "order_id", TypeRef::new("Id"))],
    )
    .unwrap()
}

fn sample_tree() -> Result<MappingTree> {
    let mut tree = MappingTree::new();
    let guard = tree.add_container(
        tree.root(),
        GuardMapping::new(
            MemberGetter {
                path: source_path(),
                access: AccessMode::Direct,
            },
            false,
        ),
    )?;
    tree.add_assignment(
        guard,
        AssignmentMapping {
            getter: Some(MemberGetter {
                path: source_path(),
                access: AccessMode::Direct,
            }),
            setter: MemberSetter {
                path: target_path(),
                supports_coalesce_assignment: true,
            },
        },
    )?;
    Ok(tree)
}

#[test]
fn json_snapshot_round_trips() -> Result<()> {
    let tree = sample_tree()?;
    let json = tree.to_json()?;
    assert!(json.contains("\"Guard\""));

    let restored: MappingTree = serde_json::from_str(&json)?;
    assert_eq!(restored.outline(), tree.outline());
    Ok(())
}

#[test]
fn outline_matches_handoff_shape() -> Result<()> {
    let tree = sample_tree()?;
    assert_eq!(
        tree.outline(),
        "root\n  guard Src.order\n    assign Dst.order_id = Src.order\n"
    );
    Ok(())
}
