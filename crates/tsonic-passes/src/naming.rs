//! Pass 7: naming-policy collision check.
//!
//! The configured case policy maps source identifiers to emitted C#
//! identifiers per bucket. If two distinct originals collide after the
//! policy is applied, `TSN3003` reports the full (sorted) collision set.
//! A module container colliding with a same-named type declaration renames
//! the container with an idempotent `__Module` suffix.

use crate::PassContext;
use std::collections::BTreeMap;
use tsonic_common::Diagnostic;
use tsonic_common::diagnostics::codes;
use tsonic_common::{NameBucket, NamingPolicy};
use tsonic_ir::{IrClassMember, IrMethodKind, IrProgram, IrStatement};

pub fn run(
    mut program: IrProgram,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    let policy = &ctx.options.naming_policy;

    for module in &mut program.modules {
        // Per-class member collisions.
        for statement in &module.body {
            if let IrStatement::ClassDeclaration(class) = statement {
                let mut methods = Vec::new();
                let mut fields = Vec::new();
                for member in &class.members {
                    match member {
                        IrClassMember::Method(method) => {
                            if method.kind != IrMethodKind::Constructor {
                                methods.push(method.name.as_str());
                            }
                        }
                        IrClassMember::Field(field) => fields.push(field.name.as_str()),
                    }
                }
                report_collisions(
                    policy,
                    NameBucket::Methods,
                    &methods,
                    &module.source_path,
                    ctx,
                    diagnostics,
                );
                report_collisions(
                    policy,
                    NameBucket::Fields,
                    &fields,
                    &module.source_path,
                    ctx,
                    diagnostics,
                );
            }
            if let IrStatement::EnumDeclaration(decl) = statement {
                let names: Vec<&str> = decl.members.iter().map(|m| m.name.as_str()).collect();
                report_collisions(
                    policy,
                    NameBucket::EnumMembers,
                    &names,
                    &module.source_path,
                    ctx,
                    diagnostics,
                );
            }
        }

        // Container-level collisions across top-level value declarations.
        let mut container_values = Vec::new();
        let mut type_names = Vec::new();
        for statement in &module.body {
            match statement {
                IrStatement::FunctionDeclaration(func) => container_values.push(func.name.as_str()),
                IrStatement::VariableDeclaration(decl) => container_values.push(decl.name.as_str()),
                IrStatement::ClassDeclaration(class) => type_names.push(class.name.as_str()),
                IrStatement::InterfaceDeclaration(iface) => type_names.push(iface.name.as_str()),
                IrStatement::EnumDeclaration(decl) => type_names.push(decl.name.as_str()),
                IrStatement::TypeAliasDeclaration(alias) => type_names.push(alias.name.as_str()),
                _ => {}
            }
        }
        report_collisions(
            policy,
            NameBucket::Methods,
            &container_values,
            &module.source_path,
            ctx,
            diagnostics,
        );
        report_collisions(
            policy,
            NameBucket::Classes,
            &type_names,
            &module.source_path,
            ctx,
            diagnostics,
        );

        // The container class collides with a same-named type declaration;
        // rename with an idempotent `__Module` suffix.
        let container_emitted = policy.apply(NameBucket::Classes, &module.container_name);
        let collides = type_names
            .iter()
            .any(|name| policy.apply(NameBucket::Classes, name) == container_emitted);
        if collides && !module.container_name.ends_with("__Module") {
            module.container_name = format!("{}__Module", module.container_name);
        }
    }

    program
}

/// Group originals by their post-policy spelling; ≥2 distinct originals in
/// a group is a collision.
fn report_collisions(
    policy: &NamingPolicy,
    bucket: NameBucket,
    originals: &[&str],
    source_path: &str,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for original in originals {
        groups
            .entry(policy.apply(bucket, original))
            .or_default()
            .push(original);
    }
    for (emitted, mut members) in groups {
        members.sort_unstable();
        members.dedup();
        if members.len() > 1 {
            diagnostics.push(
                Diagnostic::from_template(
                    codes::NAMING_COLLISION,
                    &[&emitted, &members.join(", ")],
                )
                .with_location(ctx.locate(source_path, None)),
            );
        }
    }
}
