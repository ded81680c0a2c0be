//! Bridge variable scopes.
//!
//! A tree of scopes binding source names to IR local ids. Scopes are
//! kept in an arena with parent links only; closing a scope moves the
//! cursor back to its parent but leaves the scope in place, so the tree
//! survives for later passes.

use crate::ast::ast_types::AstType;
use crate::ir::ir_nodes::TypeId;
use crate::string_interning::StringId;
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct BridgeVariableTraits: u8 {
        /// Declared `= undef`; contents start unspecified
        const UNDEF = 1 << 0;
        /// Plain-old-data; management functions never run for it
        const POD = 1 << 1;
    }
}

#[derive(Clone, Debug)]
pub struct BridgeVariable {
    pub name: StringId,
    pub ast_type: AstType,
    pub ir_type: TypeId,
    pub id: usize,
    pub traits: BridgeVariableTraits,
}

#[derive(Debug)]
pub struct BridgeScope {
    pub parent: Option<usize>,
    pub variables: Vec<BridgeVariable>,
}

#[derive(Debug)]
pub struct BridgeScopeTree {
    scopes: Vec<BridgeScope>,
    current: usize,
}

impl BridgeScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![BridgeScope {
                parent: None,
                variables: Vec::new(),
            }],
            current: 0,
        }
    }

    pub fn open_scope(&mut self) {
        let child = BridgeScope {
            parent: Some(self.current),
            variables: Vec::new(),
        };
        self.scopes.push(child);
        self.current = self.scopes.len() - 1;
    }

    /// Move back to the parent scope. The root scope never closes.
    pub fn close_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn add_variable(&mut self, variable: BridgeVariable) {
        self.scopes[self.current].variables.push(variable);
    }

    /// Resolve a name through the current scope chain, innermost first.
    pub fn find_variable(&self, name: StringId) -> Option<&BridgeVariable> {
        let mut scope_index = Some(self.current);

        while let Some(index) = scope_index {
            let scope = &self.scopes[index];

            if let Some(variable) = scope
                .variables
                .iter()
                .rev()
                .find(|variable| variable.name == name)
            {
                return Some(variable);
            }

            scope_index = scope.parent;
        }

        None
    }

    /// Variables of the scope the cursor currently sits in
    pub fn current_scope_variables(&self) -> &[BridgeVariable] {
        &self.scopes[self.current].variables
    }

    /// Variables of every open scope, innermost scope first, each
    /// scope's variables in reverse declaration order. This is the
    /// order destruction runs in when a function returns.
    pub fn all_visible_variables(&self) -> Vec<BridgeVariable> {
        let mut collected = Vec::new();
        let mut scope_index = Some(self.current);

        while let Some(index) = scope_index {
            let scope = &self.scopes[index];
            collected.extend(scope.variables.iter().rev().cloned());
            scope_index = scope.parent;
        }

        collected
    }
}

impl Default for BridgeScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ast_types::AstType;
    use crate::string_interning::StringTable;

    fn variable(name: StringId, id: usize) -> BridgeVariable {
        BridgeVariable {
            name,
            ast_type: AstType::unresolved(),
            ir_type: TypeId(0),
            id,
            traits: BridgeVariableTraits::empty(),
        }
    }

    #[test]
    fn inner_scopes_shadow_and_close_back_to_parents() {
        let mut table = StringTable::new();
        let x = table.intern("x");
        let y = table.intern("y");

        let mut tree = BridgeScopeTree::new();
        tree.add_variable(variable(x, 0));

        tree.open_scope();
        tree.add_variable(variable(x, 1));
        tree.add_variable(variable(y, 2));

        assert_eq!(tree.find_variable(x).unwrap().id, 1);
        assert_eq!(tree.find_variable(y).unwrap().id, 2);

        tree.close_scope();
        assert_eq!(tree.find_variable(x).unwrap().id, 0);
        assert!(tree.find_variable(y).is_none());
    }
}
