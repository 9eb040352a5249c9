//! Parses the self-describing field schema of a table chunk.
//!
//! A schema level is a run of field headers ended by a zero type byte. Each header is
//! a type byte (low nibble: field type, `0x10`: repeated), a gamma key length and the
//! key. Only after a level's sentinel come the nested levels of its struct fields,
//! one full level per struct field, in field order.

use serde::{Serialize, Serializer};
use std::borrow::Cow;

use crate::error::OttxError;
use crate::kernels::gamma;
use crate::stream::{BufferSource, ByteCursor};
use crate::types::FieldType;

//==================================================================================
// 1. Schema Tree
//==================================================================================

/// One field of a table schema.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    #[serde(serialize_with = "serialize_key")]
    pub key: Vec<u8>,
    pub field_type: FieldType,
    pub repeated: bool,
    /// Non-empty only for `FieldType::Struct`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldSchema>,
}

impl FieldSchema {
    /// The key as text, with invalid UTF-8 replaced.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}

fn serialize_key<S: Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(key))
}

/// The ordered field list shared by every record of one table chunk.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Schema {
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields at every nesting level.
    pub fn total_fields(&self) -> usize {
        fn count(fields: &[FieldSchema]) -> usize {
            fields.iter().map(|f| 1 + count(&f.children)).sum()
        }
        count(&self.fields)
    }

    /// Deepest nesting level, 1 for a flat schema.
    pub fn depth(&self) -> usize {
        fn depth(fields: &[FieldSchema]) -> usize {
            1 + fields.iter().map(|f| depth_of(&f.children)).max().unwrap_or(0)
        }
        fn depth_of(children: &[FieldSchema]) -> usize {
            if children.is_empty() {
                0
            } else {
                depth(children)
            }
        }
        depth(&self.fields)
    }

    /// A JSON rendering of the schema tree, for diagnostics.
    pub fn to_json(&self) -> Result<String, OttxError> {
        Ok(serde_json::to_string(self)?)
    }
}

//==================================================================================
// 2. Reader
//==================================================================================

/// Reads a complete schema, failing with `SchemaTooDeep` if struct fields nest more
/// than `max_depth` levels (the top level counts as one).
pub fn read_schema<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
    max_depth: usize,
) -> Result<Schema, OttxError> {
    let fields = read_level(cursor, 0, max_depth)?;
    Ok(Schema { fields })
}

fn read_level<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<FieldSchema>, OttxError> {
    if depth >= max_depth {
        return Err(OttxError::SchemaTooDeep { limit: max_depth });
    }

    let mut fields = Vec::new();
    loop {
        let raw = cursor.read_u8()?;
        let code = raw & FieldType::CODE_MASK;
        if code == 0 {
            break;
        }
        let field_type = FieldType::from_code(code)?;
        let key_len = gamma::decode_one(cursor)? as usize;
        let key = cursor.consume(key_len)?;
        fields.push(FieldSchema {
            key,
            field_type,
            repeated: raw & FieldType::REPEATED_FLAG != 0,
            children: Vec::new(),
        });
    }

    for field in fields
        .iter_mut()
        .filter(|f| f.field_type == FieldType::Struct)
    {
        field.children = read_level(cursor, depth + 1, max_depth)?;
        // Every record field consumes at least one byte.
        if field.children.is_empty() {
            return Err(OttxError::EmptyStructSchema {
                key: field.key_lossy().into_owned(),
            });
        }
    }
    Ok(fields)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::IterSource;
    use crate::test_support::{field, repeated, schema_bytes, split_evenly, structure};

    fn parse(bytes: Vec<u8>, max_depth: usize) -> Result<(Schema, u64), OttxError> {
        let mut cursor = ByteCursor::new(IterSource::new(split_evenly(&bytes, 3)), 64);
        let schema = read_schema(&mut cursor, max_depth)?;
        Ok((schema, cursor.position()))
    }

    #[test]
    fn test_flat_schema() {
        let bytes = schema_bytes(&[field(2, "a"), repeated(6, "list"), field(10, "name")]);
        let (schema, consumed) = parse(bytes.clone(), 8).unwrap();
        assert_eq!(consumed, bytes.len() as u64);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.fields[0].key, b"a");
        assert_eq!(schema.fields[0].field_type, FieldType::UInt8);
        assert!(!schema.fields[0].repeated);
        assert!(schema.fields[1].repeated);
        assert_eq!(schema.fields[1].field_type, FieldType::UInt32);
        assert_eq!(schema.fields[2].field_type, FieldType::String);
        assert!(schema.fields.iter().all(|f| f.children.is_empty()));
    }

    #[test]
    fn test_empty_schema() {
        let (schema, consumed) = parse(vec![0x00], 8).unwrap();
        assert!(schema.is_empty());
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_nested_levels_follow_their_parent_level() {
        // Level 1: [x: Struct, y: Int16, z: Struct]; then x's level, then z's level.
        let fields = [
            structure("x", false, vec![field(1, "x1"), structure("deep", true, vec![field(8, "d")])]),
            field(3, "y"),
            structure("z", true, vec![field(4, "z1")]),
        ];
        let bytes = schema_bytes(&fields);
        let (schema, consumed) = parse(bytes.clone(), 8).unwrap();
        assert_eq!(consumed, bytes.len() as u64);
        assert_eq!(schema.total_fields(), 7);
        assert_eq!(schema.depth(), 3);

        let x = &schema.fields[0];
        assert_eq!(x.field_type, FieldType::Struct);
        assert_eq!(x.children[0].key, b"x1");
        assert_eq!(x.children[1].children[0].key, b"d");
        assert!(x.children[1].repeated);
        let z = &schema.fields[2];
        assert!(z.repeated);
        assert_eq!(z.children[0].field_type, FieldType::UInt16);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let bytes = schema_bytes(&[
            structure("s", false, vec![field(5, "v"), field(10, "t")]),
            repeated(9, "ids"),
        ]);
        let (first, _) = parse(bytes.clone(), 8).unwrap();
        let (second, _) = parse(bytes, 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_depth_limit() {
        let bytes = schema_bytes(&[structure(
            "a",
            false,
            vec![structure("b", false, vec![field(2, "c")])],
        )]);
        assert!(parse(bytes.clone(), 3).is_ok());
        assert!(matches!(
            parse(bytes, 2),
            Err(OttxError::SchemaTooDeep { limit: 2 })
        ));
    }

    #[test]
    fn test_empty_struct_level_is_rejected() {
        let bytes = schema_bytes(&[field(2, "a"), structure("hollow", true, vec![])]);
        match parse(bytes, 8) {
            Err(OttxError::EmptyStructSchema { key }) => assert_eq!(key, "hollow"),
            other => panic!("expected EmptyStructSchema, got {:?}", other),
        }

        let nested = schema_bytes(&[structure(
            "outer",
            false,
            vec![structure("inner", false, vec![])],
        )]);
        assert!(matches!(
            parse(nested, 8),
            Err(OttxError::EmptyStructSchema { key }) if key == "inner"
        ));
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let bytes = vec![0x0C, 0x01, b'k', 0x00];
        assert!(matches!(
            parse(bytes, 8),
            Err(OttxError::UnsupportedFieldType(12))
        ));
    }

    #[test]
    fn test_missing_sentinel_is_truncated() {
        let bytes = vec![0x02, 0x01, b'a'];
        assert!(matches!(
            parse(bytes, 8),
            Err(OttxError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_schema_json() {
        let bytes = schema_bytes(&[field(2, "a"), structure("s", true, vec![field(1, "b")])]);
        let (schema, _) = parse(bytes, 8).unwrap();
        let json = schema.to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#""key":"a""#));
        assert!(json.contains(r#""field_type":"Struct""#));
        assert!(json.contains(r#""children":[{"key":"b""#));
    }
}
