//! Result mapping: project provider entities into uniform result records
//!
//! Commands emit [`ResultRecord`]s, one per logical remote entity, each
//! stamped with the operation's tracking id, the invoking command's
//! description, and the terminal status. Projection is declared per entity
//! variant as a static field table; a new variant registers a table without
//! touching the executor.
//!
//! Mapping is a pure function: it never performs I/O, never mutates its
//! input, and never fails. A malformed entity is populated best-effort with
//! type-appropriate defaults and flagged `incomplete`; the error decision is
//! left to the caller.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::operation::{OperationDescriptor, OperationStatus};

/// Entity variants the mapper knows how to project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    OsImage,
    DataDisk,
    AddOn,
}

impl EntityKind {
    /// The projection table for this variant.
    pub fn fields(&self) -> &'static [FieldMap] {
        match self {
            EntityKind::OsImage => OS_IMAGE_FIELDS,
            EntityKind::DataDisk => DATA_DISK_FIELDS,
            EntityKind::AddOn => ADD_ON_FIELDS,
        }
    }
}

/// Default applied when a source field is absent or mistyped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    EmptyString,
    Zero,
    False,
    /// Absent-optional: the target field is emitted as null
    Null,
}

impl FieldDefault {
    fn value(&self) -> Value {
        match self {
            FieldDefault::EmptyString => Value::String(String::new()),
            FieldDefault::Zero => Value::from(0),
            FieldDefault::False => Value::Bool(false),
            FieldDefault::Null => Value::Null,
        }
    }

    /// Whether a source value is usable as-is for this field.
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldDefault::EmptyString => value.is_string(),
            FieldDefault::Zero => value.is_number(),
            FieldDefault::False => value.is_boolean(),
            FieldDefault::Null => !value.is_null(),
        }
    }
}

/// One row of a projection table
pub struct FieldMap {
    pub source: &'static str,
    pub target: &'static str,
    pub default: FieldDefault,
    /// Optional value transform applied to a present, well-typed source field
    pub transform: Option<fn(&Value) -> Value>,
}

const fn field(source: &'static str, target: &'static str, default: FieldDefault) -> FieldMap {
    FieldMap {
        source,
        target,
        default,
        transform: None,
    }
}

/// Projects an `attachedTo` object (`{role, deployment}`) to "role/deployment".
fn attachment_label(value: &Value) -> Value {
    let role = value.get("role").and_then(Value::as_str).unwrap_or("");
    let deployment = value.get("deployment").and_then(Value::as_str).unwrap_or("");
    if role.is_empty() && deployment.is_empty() {
        Value::String(String::new())
    } else {
        Value::String(format!("{role}/{deployment}"))
    }
}

static OS_IMAGE_FIELDS: &[FieldMap] = &[
    field("name", "imageName", FieldDefault::EmptyString),
    field("label", "label", FieldDefault::EmptyString),
    field("category", "category", FieldDefault::EmptyString),
    field("location", "location", FieldDefault::EmptyString),
    field("mediaLink", "mediaLink", FieldDefault::EmptyString),
    field("os", "os", FieldDefault::EmptyString),
    field("logicalSizeInGB", "logicalSizeInGB", FieldDefault::Zero),
    field("description", "description", FieldDefault::EmptyString),
    field("eula", "eula", FieldDefault::EmptyString),
    field("imageFamily", "imageFamily", FieldDefault::EmptyString),
    field("publishedDate", "publishedDate", FieldDefault::Null),
    field("isPremium", "isPremium", FieldDefault::False),
    field("publisherName", "publisherName", FieldDefault::EmptyString),
    field("recommendedVmSize", "recommendedVmSize", FieldDefault::Null),
];

static DATA_DISK_FIELDS: &[FieldMap] = &[
    field("name", "diskName", FieldDefault::EmptyString),
    field("label", "label", FieldDefault::EmptyString),
    field("location", "location", FieldDefault::EmptyString),
    field("mediaLink", "mediaLink", FieldDefault::EmptyString),
    field("os", "os", FieldDefault::EmptyString),
    field("logicalSizeInGB", "logicalSizeInGB", FieldDefault::Zero),
    field("sourceImageName", "sourceImageName", FieldDefault::Null),
    FieldMap {
        source: "attachedTo",
        target: "attachedTo",
        default: FieldDefault::Null,
        transform: Some(attachment_label),
    },
    field("isCorrupted", "isCorrupted", FieldDefault::False),
];

static ADD_ON_FIELDS: &[FieldMap] = &[
    field("name", "addOnName", FieldDefault::EmptyString),
    field("provider", "provider", FieldDefault::EmptyString),
    field("plan", "plan", FieldDefault::EmptyString),
    field("type", "type", FieldDefault::EmptyString),
    field("location", "location", FieldDefault::EmptyString),
    field("status", "status", FieldDefault::EmptyString),
    field("description", "description", FieldDefault::EmptyString),
];

/// How a dispatch payload maps to records
#[derive(Debug, Clone, Copy)]
pub struct MapSpec {
    pub kind: EntityKind,
    /// List payloads keep their entities under this key; `None` maps the
    /// payload itself (object or array).
    pub collection: Option<&'static str>,
}

impl MapSpec {
    pub fn entity(kind: EntityKind) -> Self {
        MapSpec {
            kind,
            collection: None,
        }
    }

    pub fn collection(kind: EntityKind, key: &'static str) -> Self {
        MapSpec {
            kind,
            collection: Some(key),
        }
    }
}

/// The uniform output unit emitted to the command pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub operation_id: String,
    /// Name of the invoked command, supplied explicitly by the caller
    pub operation_description: String,
    pub operation_status: OperationStatus,
    pub kind: EntityKind,
    /// True when any declared field was absent or mistyped in the source
    pub incomplete: bool,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Project a dispatch payload into result records.
///
/// A list payload of N entities yields N records sharing one descriptor; a
/// single entity yields one record; a null payload yields none.
pub fn map_entities(
    spec: &MapSpec,
    payload: &Value,
    operation: &OperationDescriptor,
    description: &str,
) -> Vec<ResultRecord> {
    let entities: Vec<&Value> = match spec.collection {
        Some(key) => match payload.get(key) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) if !single.is_null() => vec![single],
            _ => Vec::new(),
        },
        None => match payload {
            Value::Array(items) => items.iter().collect(),
            Value::Null => Vec::new(),
            single => vec![single],
        },
    };

    entities
        .into_iter()
        .map(|entity| project(spec.kind, entity, operation, description))
        .collect()
}

fn project(
    kind: EntityKind,
    entity: &Value,
    operation: &OperationDescriptor,
    description: &str,
) -> ResultRecord {
    let mut attributes = Map::new();
    let mut incomplete = !entity.is_object();

    for map in kind.fields() {
        let source = entity.get(map.source);
        let value = match source {
            Some(v) if map.default.accepts(v) => match map.transform {
                Some(f) => f(v),
                None => v.clone(),
            },
            _ => {
                incomplete = true;
                map.default.value()
            }
        };
        attributes.insert(map.target.to_string(), value);
    }

    ResultRecord {
        operation_id: operation.tracking_id.clone(),
        operation_description: description.to_string(),
        operation_status: operation.status,
        kind,
        incomplete,
        attributes,
    }
}
