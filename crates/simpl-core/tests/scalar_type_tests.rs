//! Scalar type table tests
//!
//! Tags and names are persisted in pipeline files and must round-trip.

use rstest::rstest;
use simpl_core::ScalarType;

#[rstest]
#[case(ScalarType::Int8, 0, "int8_t", "signed int 8 bit")]
#[case(ScalarType::UInt8, 1, "uint8_t", "unsigned int 8 bit")]
#[case(ScalarType::Int16, 2, "int16_t", "signed int 16 bit")]
#[case(ScalarType::UInt16, 3, "uint16_t", "unsigned int 16 bit")]
#[case(ScalarType::Int32, 4, "int32_t", "signed int 32 bit")]
#[case(ScalarType::UInt32, 5, "uint32_t", "unsigned int 32 bit")]
#[case(ScalarType::Int64, 6, "int64_t", "signed int 64 bit")]
#[case(ScalarType::UInt64, 7, "uint64_t", "unsigned int 64 bit")]
#[case(ScalarType::Float, 8, "float", "Float 32 bit")]
#[case(ScalarType::Double, 9, "double", "Double 64 bit")]
#[case(ScalarType::Bool, 10, "bool", "Bool")]
#[case(ScalarType::SizeT, 11, "size_t", "size_t")]
fn test_tag_table(
    #[case] scalar_type: ScalarType,
    #[case] tag: i32,
    #[case] name: &str,
    #[case] numeric_name: &str,
) {
    assert_eq!(scalar_type.tag(), tag);
    assert_eq!(scalar_type.name(), name);
    assert_eq!(scalar_type.numeric_name(), numeric_name);
    assert_eq!(ScalarType::try_from(tag).unwrap(), scalar_type);
    assert_eq!(name.parse::<ScalarType>().unwrap(), scalar_type);
}

#[test]
fn test_json_serializes_as_type_name() {
    let json = serde_json::to_string(&ScalarType::UInt16).unwrap();
    assert_eq!(json, "\"uint16_t\"");
}

#[test]
fn test_json_accepts_name_or_tag() {
    for scalar_type in ScalarType::ALL {
        let from_name: ScalarType =
            serde_json::from_str(&format!("\"{}\"", scalar_type.name())).unwrap();
        let from_tag: ScalarType = serde_json::from_str(&scalar_type.tag().to_string()).unwrap();
        assert_eq!(from_name, scalar_type);
        assert_eq!(from_tag, scalar_type);
    }
}

#[test]
fn test_json_rejects_unknown_tag() {
    assert!(serde_json::from_str::<ScalarType>("12").is_err());
    assert!(serde_json::from_str::<ScalarType>("-1").is_err());
    assert!(serde_json::from_str::<ScalarType>("\"complex\"").is_err());
}
