//! The IR type representation.
//!
//! `IrType` is a closed sum. Identity is structural: two types are the same
//! type exactly when their stable keys are equal. Union types are always
//! normalized (flattened, deduped by key, sorted by key).

use serde::{Deserialize, Serialize};
use tsonic_common::NumericKind;

/// Where an array type came from. Explicit `T[]` annotations emit native CLR
/// arrays in dotnet mode; inferred arrays emit `List<T>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayOrigin {
    Explicit,
    Inferred,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Bool(bool),
}

/// A member of an anonymous object type or the structural part of a
/// reference type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrObjectMember {
    pub name: String,
    pub ty: IrType,
    pub optional: bool,
    pub readonly: bool,
}

/// A parameter of a function type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrParamType {
    pub name: String,
    pub ty: IrType,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrType {
    /// `string`, `number`, `boolean`, `void`, `undefined`, `null`, `object`,
    /// `any`, `unknown`, `never`, or a numeric alias (`int`, `double`, ...).
    #[serde(rename_all = "camelCase")]
    Primitive {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        numeric_intent: Option<NumericKind>,
    },
    Literal { value: LiteralValue },
    /// A reference to a named type.
    #[serde(rename_all = "camelCase")]
    Reference {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved_clr_type: Option<String>,
        type_arguments: Vec<IrType>,
        /// Structural members, when the reference carries them (synthetic
        /// anonymous types keep their shape here).
        #[serde(skip_serializing_if = "Option::is_none")]
        members: Option<Vec<IrObjectMember>>,
    },
    Array {
        element: Box<IrType>,
        origin: ArrayOrigin,
    },
    Tuple { elements: Vec<IrType> },
    /// Keys are constrained to `string` and `number` at validation time.
    Dictionary {
        key: Box<IrType>,
        value: Box<IrType>,
    },
    #[serde(rename_all = "camelCase")]
    Function {
        params: Vec<IrParamType>,
        return_type: Box<IrType>,
    },
    /// Anonymous object type.
    Object { members: Vec<IrObjectMember> },
    /// Always normalized; construct through `normalized_union`.
    Union { types: Vec<IrType> },
    Intersection { types: Vec<IrType> },
    TypeParameter { name: String },
}

impl IrType {
    pub fn primitive(name: &str) -> Self {
        IrType::Primitive {
            name: name.to_string(),
            numeric_intent: NumericKind::from_alias(name),
        }
    }

    pub fn primitive_with_intent(name: &str, intent: NumericKind) -> Self {
        IrType::Primitive {
            name: name.to_string(),
            numeric_intent: Some(intent),
        }
    }

    pub fn reference(name: &str) -> Self {
        IrType::Reference {
            name: name.to_string(),
            type_id: None,
            resolved_clr_type: None,
            type_arguments: Vec::new(),
            members: None,
        }
    }

    pub fn type_parameter(name: &str) -> Self {
        IrType::TypeParameter {
            name: name.to_string(),
        }
    }

    /// The numeric intent carried by this type, if any.
    pub fn numeric_intent(&self) -> Option<NumericKind> {
        match self {
            IrType::Primitive { numeric_intent, .. } => *numeric_intent,
            _ => None,
        }
    }

    /// A copy of this type with the numeric intent replaced.
    #[must_use]
    pub fn with_numeric_intent(&self, intent: NumericKind) -> IrType {
        match self {
            IrType::Primitive { name, .. } => IrType::Primitive {
                name: name.clone(),
                numeric_intent: Some(intent),
            },
            other => other.clone(),
        }
    }

    pub fn is_void_like(&self) -> bool {
        matches!(
            self,
            IrType::Primitive { name, .. } if name == "void" || name == "undefined"
        )
    }

    pub fn stable_key(&self) -> String {
        stable_ir_type_key(self)
    }
}

/// Canonical string key for an `IrType`. Equality of keys is type identity.
pub fn stable_ir_type_key(ty: &IrType) -> String {
    match ty {
        IrType::Primitive {
            name,
            numeric_intent,
        } => match numeric_intent {
            Some(intent) => format!("prim:{name}@{intent:?}"),
            None => format!("prim:{name}"),
        },
        IrType::Literal { value } => match value {
            LiteralValue::String(s) => format!("lit:s:{s}"),
            LiteralValue::Number(n) => format!("lit:n:{n}"),
            LiteralValue::Bool(b) => format!("lit:b:{b}"),
        },
        IrType::Reference {
            name,
            type_id,
            resolved_clr_type,
            type_arguments,
            ..
        } => {
            // The most-resolved identity wins so structurally equal views of
            // the same nominal type share a key.
            let base = type_id
                .as_deref()
                .or(resolved_clr_type.as_deref())
                .unwrap_or(name);
            if type_arguments.is_empty() {
                format!("ref:{base}")
            } else {
                let args: Vec<String> = type_arguments.iter().map(stable_ir_type_key).collect();
                format!("ref:{base}<{}>", args.join(","))
            }
        }
        IrType::Array { element, origin } => {
            let origin = match origin {
                ArrayOrigin::Explicit => "x",
                ArrayOrigin::Inferred => "i",
            };
            format!("arr:{origin}:{}", stable_ir_type_key(element))
        }
        IrType::Tuple { elements } => {
            let parts: Vec<String> = elements.iter().map(stable_ir_type_key).collect();
            format!("tup:[{}]", parts.join(","))
        }
        IrType::Dictionary { key, value } => {
            format!(
                "dict:{}:{}",
                stable_ir_type_key(key),
                stable_ir_type_key(value)
            )
        }
        IrType::Function {
            params,
            return_type,
        } => {
            let parts: Vec<String> = params
                .iter()
                .map(|p| {
                    let opt = if p.optional { "?" } else { "" };
                    format!("{}{}", stable_ir_type_key(&p.ty), opt)
                })
                .collect();
            format!(
                "fn:({})->{}",
                parts.join(","),
                stable_ir_type_key(return_type)
            )
        }
        IrType::Object { members } => format!("obj:{{{}}}", member_keys(members)),
        IrType::Union { types } => {
            let parts: Vec<String> = types.iter().map(stable_ir_type_key).collect();
            format!("union:({})", parts.join("|"))
        }
        IrType::Intersection { types } => {
            let parts: Vec<String> = types.iter().map(stable_ir_type_key).collect();
            format!("isect:({})", parts.join("&"))
        }
        IrType::TypeParameter { name } => format!("tp:{name}"),
    }
}

fn member_keys(members: &[IrObjectMember]) -> String {
    let mut parts: Vec<String> = members
        .iter()
        .map(|m| {
            let opt = if m.optional { "?" } else { "" };
            let ro = if m.readonly { "!" } else { "" };
            format!("{}{}{}:{}", m.name, opt, ro, stable_ir_type_key(&m.ty))
        })
        .collect();
    parts.sort();
    parts.join(",")
}

/// Build a normalized union: flatten nested unions, dedupe by stable key,
/// sort by key. A single surviving member collapses to itself; an empty
/// input produces `never`.
pub fn normalized_union(types: Vec<IrType>) -> IrType {
    let mut flat = Vec::new();
    flatten_union_members(types, &mut flat);

    let mut seen = std::collections::BTreeMap::new();
    for member in flat {
        let key = stable_ir_type_key(&member);
        seen.entry(key).or_insert(member);
    }

    let members: Vec<IrType> = seen.into_values().collect();
    match members.len() {
        0 => IrType::primitive("never"),
        1 => members.into_iter().next().unwrap_or(IrType::primitive("never")),
        _ => IrType::Union { types: members },
    }
}

fn flatten_union_members(types: Vec<IrType>, out: &mut Vec<IrType>) {
    for ty in types {
        match ty {
            IrType::Union { types } => flatten_union_members(types, out),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_distinguish_variants() {
        assert_ne!(
            stable_ir_type_key(&IrType::primitive("int")),
            stable_ir_type_key(&IrType::primitive("number"))
        );
        assert_ne!(
            stable_ir_type_key(&IrType::Array {
                element: Box::new(IrType::primitive("int")),
                origin: ArrayOrigin::Explicit,
            }),
            stable_ir_type_key(&IrType::Array {
                element: Box::new(IrType::primitive("int")),
                origin: ArrayOrigin::Inferred,
            })
        );
    }

    #[test]
    fn object_member_order_is_canonical() {
        let a = IrType::Object {
            members: vec![
                IrObjectMember {
                    name: "b".into(),
                    ty: IrType::primitive("int"),
                    optional: false,
                    readonly: false,
                },
                IrObjectMember {
                    name: "a".into(),
                    ty: IrType::primitive("string"),
                    optional: false,
                    readonly: false,
                },
            ],
        };
        let b = IrType::Object {
            members: vec![
                IrObjectMember {
                    name: "a".into(),
                    ty: IrType::primitive("string"),
                    optional: false,
                    readonly: false,
                },
                IrObjectMember {
                    name: "b".into(),
                    ty: IrType::primitive("int"),
                    optional: false,
                    readonly: false,
                },
            ],
        };
        assert_eq!(stable_ir_type_key(&a), stable_ir_type_key(&b));
    }

    #[test]
    fn union_normalization_flattens_and_dedupes() {
        let nested = normalized_union(vec![
            IrType::primitive("string"),
            IrType::Union {
                types: vec![IrType::primitive("int"), IrType::primitive("string")],
            },
        ]);
        let IrType::Union { types } = &nested else {
            panic!("expected union");
        };
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn union_normalization_is_idempotent() {
        let once = normalized_union(vec![
            IrType::primitive("int"),
            IrType::primitive("string"),
            IrType::primitive("int"),
        ]);
        let IrType::Union { types } = once.clone() else {
            panic!("expected union");
        };
        let twice = normalized_union(types);
        assert_eq!(stable_ir_type_key(&once), stable_ir_type_key(&twice));
    }

    #[test]
    fn singleton_union_collapses() {
        let collapsed = normalized_union(vec![
            IrType::primitive("int"),
            IrType::primitive("int"),
        ]);
        assert!(matches!(collapsed, IrType::Primitive { .. }));
    }

    #[test]
    fn empty_union_is_never() {
        let never = normalized_union(Vec::new());
        assert_eq!(stable_ir_type_key(&never), "prim:never");
    }

    #[test]
    fn serde_round_trip_preserves_key() {
        let ty = IrType::Union {
            types: vec![
                IrType::primitive_with_intent("int", tsonic_common::NumericKind::Int32),
                IrType::Reference {
                    name: "Result".into(),
                    type_id: Some("App.Result".into()),
                    resolved_clr_type: None,
                    type_arguments: vec![IrType::type_parameter("T")],
                    members: None,
                },
            ],
        };
        let json = serde_json::to_string(&ty).expect("serialize");
        let back: IrType = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(stable_ir_type_key(&ty), stable_ir_type_key(&back));
    }
}
