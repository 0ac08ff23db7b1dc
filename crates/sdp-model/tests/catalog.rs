//! Integration tests for loading a schema catalog from a
//! deserialized definition tree.

use sdp_model::{ModelError, SchemaCatalog, SemanticType};
use serde_json::json;

#[test]
fn catalog_deserializes_from_definition_tree() {
    let catalog: SchemaCatalog = serde_json::from_value(json!({
        "tables": {
            "CELL": {
                "id": "CELL",
                "name": "cell",
                "attributes": [
                    {
                        "id": "LENGTH_A",
                        "output_name": "length_a",
                        "semantic_type": "float",
                        "iterable_separator": null,
                        "enumerated": false,
                        "max_width": null,
                        "null_sentinel": ""
                    },
                    {
                        "id": "SPACE_GROUP",
                        "output_name": "space_group",
                        "semantic_type": "string",
                        "iterable_separator": null,
                        "enumerated": true,
                        "max_width": 16,
                        "null_sentinel": ""
                    }
                ],
                "enum_maps": {
                    "SPACE_GROUP": {"p 1": "P 1"}
                }
            }
        }
    }))
    .unwrap();

    let table = catalog.table("CELL").unwrap();
    assert_eq!(table.attributes.len(), 2);
    assert_eq!(
        table.attribute("LENGTH_A").unwrap().semantic_type,
        SemanticType::Float
    );
    assert_eq!(table.attribute("SPACE_GROUP").unwrap().max_width, Some(16));
    assert_eq!(table.normalize_enum("SPACE_GROUP", "p 1"), Some("P 1"));

    let err = catalog.table("ATOM_SITE").unwrap_err();
    assert!(matches!(err, ModelError::UnknownTable { .. }));
}
