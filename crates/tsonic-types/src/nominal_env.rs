//! Deterministic queries over the nominal catalogue.
//!
//! `NominalEnv` answers three questions: what a type inherits from (in a
//! stable order), how to view a base type's parameters through a derived
//! receiver, and which type in a chain declares a member.

use crate::catalog::UnifiedTypeCatalog;
use crate::ir_type::{IrObjectMember, IrParamType, IrType, normalized_union};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A type-parameter substitution (parameter name -> argument type).
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    map: FxHashMap<String, IrType>,
}

impl Substitution {
    pub fn new(map: FxHashMap<String, IrType>) -> Self {
        Self { map }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_params(params: &[String], args: &[IrType]) -> Self {
        let mut map = FxHashMap::default();
        for (param, arg) in params.iter().zip(args.iter()) {
            map.insert(param.clone(), arg.clone());
        }
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&IrType> {
        self.map.get(name)
    }

    /// Apply this substitution to a type, rebuilding every container.
    pub fn apply(&self, ty: &IrType) -> IrType {
        if self.map.is_empty() {
            return ty.clone();
        }
        match ty {
            IrType::TypeParameter { name } => {
                self.map.get(name).cloned().unwrap_or_else(|| ty.clone())
            }
            IrType::Primitive { .. } | IrType::Literal { .. } => ty.clone(),
            IrType::Reference {
                name,
                type_id,
                resolved_clr_type,
                type_arguments,
                members,
            } => IrType::Reference {
                name: name.clone(),
                type_id: type_id.clone(),
                resolved_clr_type: resolved_clr_type.clone(),
                type_arguments: type_arguments.iter().map(|t| self.apply(t)).collect(),
                members: members.as_ref().map(|ms| self.apply_members(ms)),
            },
            IrType::Array { element, origin } => IrType::Array {
                element: Box::new(self.apply(element)),
                origin: *origin,
            },
            IrType::Tuple { elements } => IrType::Tuple {
                elements: elements.iter().map(|t| self.apply(t)).collect(),
            },
            IrType::Dictionary { key, value } => IrType::Dictionary {
                key: Box::new(self.apply(key)),
                value: Box::new(self.apply(value)),
            },
            IrType::Function {
                params,
                return_type,
            } => IrType::Function {
                params: params
                    .iter()
                    .map(|p| IrParamType {
                        name: p.name.clone(),
                        ty: self.apply(&p.ty),
                        optional: p.optional,
                    })
                    .collect(),
                return_type: Box::new(self.apply(return_type)),
            },
            IrType::Object { members } => IrType::Object {
                members: self.apply_members(members),
            },
            // Re-normalize after substitution so identity-by-key holds.
            IrType::Union { types } => {
                normalized_union(types.iter().map(|t| self.apply(t)).collect())
            }
            IrType::Intersection { types } => IrType::Intersection {
                types: types.iter().map(|t| self.apply(t)).collect(),
            },
        }
    }

    fn apply_members(&self, members: &[IrObjectMember]) -> Vec<IrObjectMember> {
        members
            .iter()
            .map(|m| IrObjectMember {
                name: m.name.clone(),
                ty: self.apply(&m.ty),
                optional: m.optional,
                readonly: m.readonly,
            })
            .collect()
    }

    /// Compose: apply `self` to every value of `inner` (view `inner` through
    /// this substitution).
    pub fn compose(&self, inner: &Substitution) -> Substitution {
        let mut map = FxHashMap::default();
        for (name, ty) in &inner.map {
            map.insert(name.clone(), self.apply(ty));
        }
        Substitution { map }
    }
}

/// Environment answering inheritance questions against the catalogue.
pub struct NominalEnv<'a> {
    catalog: &'a UnifiedTypeCatalog,
}

impl<'a> NominalEnv<'a> {
    pub fn new(catalog: &'a UnifiedTypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &UnifiedTypeCatalog {
        self.catalog
    }

    /// BFS over heritage edges starting at (and including) `stable_id`.
    /// At each node, extends edges come before implements edges, then edges
    /// order by target id. The result is de-duplicated.
    pub fn inheritance_chain(&self, stable_id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut visited = std::collections::BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(stable_id.to_string());

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            chain.push(current.clone());
            let Some(entry) = self.catalog.get(&current) else {
                continue;
            };
            let mut edges: Vec<_> = entry.heritage.iter().collect();
            edges.sort_by(|a, b| {
                a.kind
                    .cmp(&b.kind)
                    .then_with(|| a.target_stable_id.cmp(&b.target_stable_id))
            });
            for edge in edges {
                queue.push_back(edge.target_stable_id.clone());
            }
        }

        chain
    }

    /// The substitution needed to view members declared on `target_id`
    /// through a receiver of `receiver_id<receiver_args>`. `None` when
    /// `target_id` is not in the receiver's inheritance graph.
    pub fn instantiation(
        &self,
        receiver_id: &str,
        receiver_args: &[IrType],
        target_id: &str,
    ) -> Option<Substitution> {
        let receiver = self.catalog.get(receiver_id)?;
        let receiver_subst = Substitution::from_params(&receiver.type_params, receiver_args);
        self.instantiation_walk(receiver_id, &receiver_subst, target_id, &mut Vec::new())
    }

    fn instantiation_walk(
        &self,
        current_id: &str,
        current_subst: &Substitution,
        target_id: &str,
        path: &mut Vec<String>,
    ) -> Option<Substitution> {
        if current_id == target_id {
            return Some(current_subst.clone());
        }
        if path.iter().any(|seen| seen == current_id) {
            return None;
        }
        path.push(current_id.to_string());

        let result = (|| {
            let entry = self.catalog.get(current_id)?;
            let mut edges: Vec<_> = entry.heritage.iter().collect();
            edges.sort_by(|a, b| {
                a.kind
                    .cmp(&b.kind)
                    .then_with(|| a.target_stable_id.cmp(&b.target_stable_id))
            });
            for edge in edges {
                let target_entry = self.catalog.get(&edge.target_stable_id);
                let edge_args: Vec<IrType> = edge
                    .type_arguments
                    .iter()
                    .map(|t| current_subst.apply(t))
                    .collect();
                let edge_subst = match target_entry {
                    Some(target_entry) => {
                        Substitution::from_params(&target_entry.type_params, &edge_args)
                    }
                    None => Substitution::identity(),
                };
                if let Some(found) =
                    self.instantiation_walk(&edge.target_stable_id, &edge_subst, target_id, path)
                {
                    return Some(found);
                }
            }
            None
        })();

        path.pop();
        result
    }

    /// Walk the inheritance chain and return the first type declaring
    /// `member_name`, paired with the composed substitution for viewing that
    /// member through the receiver.
    pub fn find_member_declaring_type(
        &self,
        receiver_id: &str,
        receiver_args: &[IrType],
        member_name: &str,
    ) -> Option<(String, Substitution)> {
        for candidate in self.inheritance_chain(receiver_id) {
            let Some(entry) = self.catalog.get(&candidate) else {
                continue;
            };
            if entry.members.contains_key(member_name) {
                let subst = self.instantiation(receiver_id, receiver_args, &candidate)?;
                return Some((candidate, subst));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HeritageEdge, HeritageKind, MemberInfo, NominalKind, TypeEntry, TypeId};
    use indexmap::IndexMap;

    fn entry(
        id: &str,
        type_params: &[&str],
        members: &[(&str, IrType)],
        heritage: Vec<HeritageEdge>,
    ) -> TypeEntry {
        let mut index = IndexMap::new();
        for (name, ty) in members {
            index.insert(
                (*name).to_string(),
                MemberInfo {
                    name: (*name).to_string(),
                    ty: ty.clone(),
                    optional: false,
                    readonly: false,
                    is_method: false,
                },
            );
        }
        TypeEntry {
            id: TypeId::new(id),
            name: id.rsplit('.').next().unwrap_or(id).to_string(),
            type_params: type_params.iter().map(|p| (*p).to_string()).collect(),
            members: index,
            heritage,
            kind: NominalKind::Interface,
            is_struct: false,
        }
    }

    fn extends(target: &str, args: Vec<IrType>) -> HeritageEdge {
        HeritageEdge {
            target_stable_id: target.to_string(),
            type_arguments: args,
            kind: HeritageKind::Extends,
        }
    }

    fn implements(target: &str, args: Vec<IrType>) -> HeritageEdge {
        HeritageEdge {
            target_stable_id: target.to_string(),
            type_arguments: args,
            kind: HeritageKind::Implements,
        }
    }

    fn sample_catalog() -> UnifiedTypeCatalog {
        let mut catalog = UnifiedTypeCatalog::new();
        catalog.register(entry(
            "app.Base",
            &["T"],
            &[("value", IrType::type_parameter("T"))],
            Vec::new(),
        ));
        catalog.register(entry("app.Marker", &[], &[], Vec::new()));
        catalog.register(entry(
            "app.Mid",
            &["U"],
            &[("extra", IrType::type_parameter("U"))],
            vec![
                extends("app.Base", vec![IrType::Array {
                    element: Box::new(IrType::type_parameter("U")),
                    origin: crate::ir_type::ArrayOrigin::Explicit,
                }]),
                implements("app.Marker", Vec::new()),
            ],
        ));
        catalog.register(entry(
            "app.Leaf",
            &[],
            &[("own", IrType::primitive("int"))],
            vec![extends("app.Mid", vec![IrType::primitive("string")])],
        ));
        catalog
    }

    #[test]
    fn chain_orders_extends_before_implements() {
        let catalog = sample_catalog();
        let env = NominalEnv::new(&catalog);
        assert_eq!(
            env.inheritance_chain("app.Leaf"),
            vec!["app.Leaf", "app.Mid", "app.Base", "app.Marker"]
        );
    }

    #[test]
    fn chain_dedupes_diamonds() {
        let mut catalog = sample_catalog();
        catalog.register(entry(
            "app.Diamond",
            &[],
            &[],
            vec![
                extends("app.Mid", vec![IrType::primitive("int")]),
                implements("app.Marker", Vec::new()),
            ],
        ));
        let env = NominalEnv::new(&catalog);
        let chain = env.inheritance_chain("app.Diamond");
        assert_eq!(
            chain.iter().filter(|id| id.as_str() == "app.Marker").count(),
            1
        );
    }

    #[test]
    fn chain_survives_cycles() {
        let mut catalog = UnifiedTypeCatalog::new();
        catalog.register(entry("app.A", &[], &[], vec![extends("app.B", Vec::new())]));
        catalog.register(entry("app.B", &[], &[], vec![extends("app.A", Vec::new())]));
        let env = NominalEnv::new(&catalog);
        assert_eq!(env.inheritance_chain("app.A"), vec!["app.A", "app.B"]);
    }

    #[test]
    fn instantiation_composes_through_the_chain() {
        let catalog = sample_catalog();
        let env = NominalEnv::new(&catalog);
        // Leaf extends Mid<string>; Mid<U> extends Base<U[]>.
        let subst = env
            .instantiation("app.Leaf", &[], "app.Base")
            .expect("instantiation");
        let viewed = subst.apply(&IrType::type_parameter("T"));
        assert_eq!(
            viewed.stable_key(),
            IrType::Array {
                element: Box::new(IrType::primitive("string")),
                origin: crate::ir_type::ArrayOrigin::Explicit,
            }
            .stable_key()
        );
    }

    #[test]
    fn instantiation_defined_for_every_chain_member() {
        let catalog = sample_catalog();
        let env = NominalEnv::new(&catalog);
        for target in env.inheritance_chain("app.Leaf") {
            assert!(
                env.instantiation("app.Leaf", &[], &target).is_some(),
                "instantiation undefined for {target}"
            );
        }
    }

    #[test]
    fn find_member_walks_outward() {
        let catalog = sample_catalog();
        let env = NominalEnv::new(&catalog);
        let (owner, _) = env
            .find_member_declaring_type("app.Leaf", &[], "own")
            .expect("own");
        assert_eq!(owner, "app.Leaf");
        let (owner, subst) = env
            .find_member_declaring_type("app.Leaf", &[], "value")
            .expect("value");
        assert_eq!(owner, "app.Base");
        let viewed = subst.apply(&IrType::type_parameter("T"));
        assert!(matches!(viewed, IrType::Array { .. }));
    }

    #[test]
    fn substitution_renormalizes_unions() {
        let subst = Substitution::from_params(
            &["T".to_string()],
            &[IrType::primitive("string")],
        );
        let union = IrType::Union {
            types: vec![IrType::type_parameter("T"), IrType::primitive("string")],
        };
        let applied = subst.apply(&union);
        // T -> string collapses the union to a single member.
        assert!(matches!(applied, IrType::Primitive { .. }));
    }
}
