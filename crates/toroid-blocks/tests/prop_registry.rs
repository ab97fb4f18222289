use proptest::prelude::*;
use toroid_blocks::{MaterialId, MaterialRegistry, RegistryError, Transparency, Voxel};

#[test]
fn overrides_keep_builtin_ids_and_append_new_ones() {
    let base = MaterialRegistry::builtin();
    let reg = MaterialRegistry::from_toml_str(
        r#"
        [materials.grass]
        color = [10, 200, 10, 255]

        [materials.basalt]
        transparency = "opaque"
        color = [40, 40, 44, 255]

        [materials.glass]
        transparency = "translucent"
        "#,
    )
    .unwrap();
    assert_eq!(reg.id_by_name("grass"), base.id_by_name("grass"));
    let grass = reg.id_by_name("grass").unwrap();
    assert_eq!(reg.color(grass), [10, 200, 10, 255]);
    assert_eq!(reg.len(), base.len() + 2);
    // new names are appended in sorted order
    let basalt = reg.id_by_name("basalt").unwrap();
    let glass = reg.id_by_name("glass").unwrap();
    assert!(basalt.0 < glass.0);
    assert_eq!(reg.transparency(Voxel::new(glass)), Transparency::Translucent);
}

#[test]
fn air_cannot_become_solid() {
    let err = MaterialRegistry::from_toml_str(
        r#"
        [materials.air]
        transparency = "opaque"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::ReservedAir));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = MaterialRegistry::from_toml_str("[materials.rock\ncolor = 3").unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}

proptest! {
    // every registered id resolves back to its own definition
    #[test]
    fn ids_round_trip_through_names(extra in prop::collection::btree_set("[a-z]{3,8}", 0..12)) {
        let mut src = String::new();
        for name in &extra {
            if name == "air" {
                continue;
            }
            src.push_str(&format!("[materials.{name}]\ncolor = [1, 2, 3, 255]\n"));
        }
        let reg = MaterialRegistry::from_toml_str(&src).unwrap();
        for def in reg.iter() {
            prop_assert_eq!(reg.id_by_name(&def.name), Some(def.id));
            prop_assert_eq!(reg.get(def.id).map(|d| d.id), Some(def.id));
        }
        prop_assert_eq!(reg.id_by_name("air"), Some(MaterialId::AIR));
    }
}
