//! Deferred type-syntax capture.
//!
//! The IR builder sometimes needs to hold on to a piece of type syntax and
//! resolve it later, once the full type catalogue exists. A handle into this
//! table is the opaque currency for that.

use tsonic_parser::ast::TypeNode;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeSyntaxHandle(u32);

#[derive(Debug, Default)]
pub struct TypeSyntaxTable {
    nodes: Vec<TypeNode>,
}

impl TypeSyntaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a type node for later resolution.
    pub fn capture(&mut self, node: &TypeNode) -> TypeSyntaxHandle {
        let handle = TypeSyntaxHandle(self.nodes.len() as u32);
        self.nodes.push(node.clone());
        handle
    }

    pub fn resolve(&self, handle: TypeSyntaxHandle) -> &TypeNode {
        &self.nodes[handle.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_common::Span;
    use tsonic_parser::ast::{Ident, TypeRef};

    #[test]
    fn capture_and_resolve() {
        let mut table = TypeSyntaxTable::new();
        let node = TypeNode::Ref(TypeRef {
            head: Ident {
                id: 0,
                name: "Widget".to_string(),
                span: Span::dummy(),
            },
            rest: Vec::new(),
            type_args: Vec::new(),
            span: Span::dummy(),
        });
        let handle = table.capture(&node);
        let TypeNode::Ref(resolved) = table.resolve(handle) else {
            panic!("expected reference");
        };
        assert_eq!(resolved.head.name, "Widget");
    }
}
