//! Lexical scope tracking and early binding errors.
//!
//! The parser pushes a [`Scope`] whenever it enters a construct that
//! introduces bindings and declares names into it as soon as a reading is
//! committed. Context questions such as "is `await` an operator here?" are
//! answered by walking the stack rather than by threading flags through
//! every production.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

bitflags! {
    /// Properties of a scope.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScopeFlags: u16 {
        /// Program scope
        const TOP = 1 << 0;
        /// Function, method or arrow body
        const FUNCTION = 1 << 1;
        const ASYNC = 1 << 2;
        const GENERATOR = 1 << 3;
        /// Arrow functions do not bind `this`, `arguments` or `new.target`
        const ARROW = 1 << 4;
        /// `catch (e)` with a plain identifier
        const SIMPLE_CATCH = 1 << 5;
        /// `super.x` is allowed
        const SUPER = 1 << 6;
        /// `super()` is allowed
        const DIRECT_SUPER = 1 << 7;
        const CLASS_STATIC_BLOCK = 1 << 8;
        /// Class field initializer
        const CLASS_FIELD_INIT = 1 << 9;

        /// Scopes that receive `var` declarations
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::CLASS_STATIC_BLOCK.bits();
    }
}

impl ScopeFlags {
    /// Flags for a function body.
    pub fn function(is_async: bool, is_generator: bool) -> Self {
        let mut flags = ScopeFlags::FUNCTION;
        if is_async {
            flags |= ScopeFlags::ASYNC;
        }
        if is_generator {
            flags |= ScopeFlags::GENERATOR;
        }
        flags
    }
}

/// What kind of construct a scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Top level of a script
    Global,
    /// Top level of a module
    Module,
    /// Function or method body
    Function,
    /// Arrow function body
    Arrow,
    /// Block, loop head or switch body
    Block,
    /// `catch` clause
    Catch,
    /// Class field initializer
    ClassFieldInit,
    /// `static { }` block
    ClassStaticBlock,
}

/// How a name is being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `var` declarations and sloppy parameters
    Var,
    /// `let`, `const`, `class`, imports
    Lexical,
    /// Function declarations in sloppy code
    Function,
    /// The parameter of `catch (e)`
    SimpleCatch,
    /// A function expression's own name; not declared anywhere
    Outside,
}

/// An early error raised by the scope tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// A name bound twice in conflicting ways
    #[error("Identifier '{0}' has already been declared")]
    Redeclared(String),
    /// A private name declared twice in one class body
    #[error("Identifier '#{0}' has already been declared")]
    PrivateRedeclared(String),
    /// A private name used outside every class that declares it
    #[error("Private field '#{0}' must be declared in an enclosing class")]
    UndeclaredPrivate(String),
}

/// One lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub flags: ScopeFlags,
    var: FxHashSet<String>,
    lexical: FxHashSet<String>,
    functions: FxHashSet<String>,
    // Name of the simple catch parameter, which a `var` may shadow.
    catch_param: Option<String>,
}

impl Scope {
    fn new(flags: ScopeFlags) -> Self {
        Self {
            flags,
            var: FxHashSet::default(),
            lexical: FxHashSet::default(),
            functions: FxHashSet::default(),
            catch_param: None,
        }
    }

    /// Returns true if `name` is bound in this scope.
    pub fn has_binding(&self, name: &str) -> bool {
        self.var.contains(name) || self.lexical.contains(name) || self.functions.contains(name)
    }
}

/// The stack of scopes for one parse.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    in_module: bool,
    top_level_await: bool,
}

impl ScopeStack {
    /// Creates a stack holding only the program scope.
    pub fn new(in_module: bool, top_level_await: bool) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeFlags::TOP)],
            in_module,
            top_level_await,
        }
    }

    pub fn enter(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope::new(flags));
    }

    pub fn exit(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// The innermost scope.
    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Flags of the innermost scope.
    pub fn flags(&self) -> ScopeFlags {
        self.current().flags
    }

    /// Classifies the innermost scope.
    pub fn kind(&self) -> ScopeKind {
        let flags = self.flags();
        if flags.contains(ScopeFlags::TOP) {
            if self.in_module {
                ScopeKind::Module
            } else {
                ScopeKind::Global
            }
        } else if flags.contains(ScopeFlags::ARROW) {
            ScopeKind::Arrow
        } else if flags.contains(ScopeFlags::FUNCTION) {
            ScopeKind::Function
        } else if flags.contains(ScopeFlags::CLASS_FIELD_INIT) {
            ScopeKind::ClassFieldInit
        } else if flags.contains(ScopeFlags::CLASS_STATIC_BLOCK) {
            ScopeKind::ClassStaticBlock
        } else if flags.contains(ScopeFlags::SIMPLE_CATCH) {
            ScopeKind::Catch
        } else {
            ScopeKind::Block
        }
    }

    /// Number of scopes, including the program scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn var_scope(&self) -> &Scope {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.flags.intersects(ScopeFlags::VAR))
            .unwrap_or(&self.scopes[0])
    }

    fn this_scope(&self) -> &Scope {
        self.scopes
            .iter()
            .rev()
            .find(|s| {
                s.flags.intersects(ScopeFlags::VAR | ScopeFlags::CLASS_FIELD_INIT)
                    && !s.flags.contains(ScopeFlags::ARROW)
            })
            .unwrap_or(&self.scopes[0])
    }

    // Looks for the nearest function-like boundary and reports `flag` on it.
    fn function_flag(&self, flag: ScopeFlags) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT) {
                return false;
            }
            if scope.flags.contains(ScopeFlags::FUNCTION) {
                return scope.flags.contains(flag);
            }
        }
        false
    }

    /// Inside a function body (arrows included).
    pub fn in_function(&self) -> bool {
        self.var_scope().flags.contains(ScopeFlags::FUNCTION)
    }

    /// `yield` is an operator.
    pub fn in_generator(&self) -> bool {
        self.function_flag(ScopeFlags::GENERATOR)
    }

    /// Inside an async function body.
    pub fn in_async(&self) -> bool {
        self.function_flag(ScopeFlags::ASYNC)
    }

    /// `await` is an operator: inside async functions, or at the top level
    /// when top-level await is enabled.
    pub fn can_await(&self) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT) {
                return false;
            }
            if scope.flags.contains(ScopeFlags::FUNCTION) {
                return scope.flags.contains(ScopeFlags::ASYNC);
            }
        }
        self.top_level_await
    }

    /// `super.x` is allowed.
    pub fn allow_super(&self) -> bool {
        self.this_scope().flags.contains(ScopeFlags::SUPER)
    }

    /// `super()` is allowed.
    pub fn allow_direct_super(&self) -> bool {
        self.this_scope().flags.contains(ScopeFlags::DIRECT_SUPER)
    }

    /// `new.target` is allowed.
    pub fn allow_new_target(&self) -> bool {
        self.scopes.iter().any(|s| {
            s.flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT)
                || (s.flags.contains(ScopeFlags::FUNCTION) && !s.flags.contains(ScopeFlags::ARROW))
        })
    }

    /// Directly inside a class static block (not a nested function).
    pub fn in_class_static_block(&self) -> bool {
        self.var_scope().flags.contains(ScopeFlags::CLASS_STATIC_BLOCK)
    }

    /// Inside a field initializer or static block, where `arguments` is
    /// rejected. Arrow functions do not reset this.
    pub fn in_class_field_init(&self) -> bool {
        self.this_scope()
            .flags
            .intersects(ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::CLASS_STATIC_BLOCK)
    }

    fn treat_functions_as_var_in(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION) || (!self.in_module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// Function declarations in this scope behave like `var`.
    pub fn treat_functions_as_var(&self) -> bool {
        self.treat_functions_as_var_in(self.current())
    }

    /// Declares `name`. Returns true when the binding landed in the program
    /// scope, so module code can settle pending exports.
    pub fn declare(&mut self, name: &str, kind: BindingKind) -> Result<bool, ScopeError> {
        let top_index = 0;
        let redeclared;
        let mut reached_top = false;
        match kind {
            BindingKind::Lexical => {
                let scope = self.current();
                redeclared = scope.has_binding(name);
                reached_top = self.scopes.len() - 1 == top_index;
                self.current_mut().lexical.insert(name.to_string());
            }
            BindingKind::SimpleCatch => {
                redeclared = false;
                let scope = self.current_mut();
                scope.lexical.insert(name.to_string());
                scope.catch_param = Some(name.to_string());
            }
            BindingKind::Function => {
                let scope = self.current();
                redeclared = if self.treat_functions_as_var() {
                    scope.lexical.contains(name)
                } else {
                    scope.lexical.contains(name) || scope.var.contains(name)
                };
                reached_top = self.scopes.len() - 1 == top_index;
                self.current_mut().functions.insert(name.to_string());
            }
            BindingKind::Var => {
                let mut conflict = false;
                for index in (0..self.scopes.len()).rev() {
                    let scope = &self.scopes[index];
                    let shadows_catch = scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                        && scope.catch_param.as_deref() == Some(name);
                    if (scope.lexical.contains(name) && !shadows_catch)
                        || (!self.treat_functions_as_var_in(scope) && scope.functions.contains(name))
                    {
                        conflict = true;
                        break;
                    }
                    let is_var_scope = scope.flags.intersects(ScopeFlags::VAR);
                    self.scopes[index].var.insert(name.to_string());
                    if index == top_index {
                        reached_top = true;
                    }
                    if is_var_scope {
                        break;
                    }
                }
                redeclared = conflict;
            }
            BindingKind::Outside => {
                redeclared = false;
            }
        }
        if redeclared {
            return Err(ScopeError::Redeclared(name.to_string()));
        }
        Ok(reached_top)
    }

    /// Returns true if `name` is declared with `var` or a lexical binding in
    /// the program scope.
    pub fn declared_at_top(&self, name: &str) -> bool {
        let top = &self.scopes[0];
        top.lexical.contains(name) || top.var.contains(name)
    }
}

/// Kinds of private class members, for getter/setter pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateMember {
    Field,
    Method,
    Getter { is_static: bool },
    Setter { is_static: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivateSlot {
    Complete,
    Getter { is_static: bool },
    Setter { is_static: bool },
}

/// The private names of one class body.
#[derive(Debug, Default)]
struct PrivateNameEnv {
    declared: FxHashMap<String, PrivateSlot>,
    used: Vec<(String, usize)>,
}

/// The stack of private name environments for nested class bodies.
#[derive(Debug, Default)]
pub struct PrivateNames {
    envs: Vec<PrivateNameEnv>,
}

impl PrivateNames {
    pub fn enter_class_body(&mut self) {
        self.envs.push(PrivateNameEnv::default());
    }

    /// Leaves a class body. Names used but not declared move to the
    /// enclosing class; at the outermost class they are an error carrying
    /// the offset of the first such use.
    pub fn exit_class_body(&mut self) -> Result<(), (ScopeError, usize)> {
        let Some(env) = self.envs.pop() else {
            return Ok(());
        };
        for (name, offset) in env.used {
            if env.declared.contains_key(&name) {
                continue;
            }
            match self.envs.last_mut() {
                Some(parent) => parent.used.push((name, offset)),
                None => return Err((ScopeError::UndeclaredPrivate(name), offset)),
            }
        }
        Ok(())
    }

    /// Declares `#name` in the innermost class body. A getter and a setter
    /// with the same staticness may share a name.
    pub fn declare(&mut self, name: &str, member: PrivateMember) -> Result<(), ScopeError> {
        let Some(env) = self.envs.last_mut() else {
            return Ok(());
        };
        let next = match member {
            PrivateMember::Getter { is_static } => PrivateSlot::Getter { is_static },
            PrivateMember::Setter { is_static } => PrivateSlot::Setter { is_static },
            PrivateMember::Field | PrivateMember::Method => PrivateSlot::Complete,
        };
        match env.declared.get(name).copied() {
            None => {
                env.declared.insert(name.to_string(), next);
                Ok(())
            }
            Some(PrivateSlot::Getter { is_static: a }) if next == (PrivateSlot::Setter { is_static: a }) => {
                env.declared.insert(name.to_string(), PrivateSlot::Complete);
                Ok(())
            }
            Some(PrivateSlot::Setter { is_static: a }) if next == (PrivateSlot::Getter { is_static: a }) => {
                env.declared.insert(name.to_string(), PrivateSlot::Complete);
                Ok(())
            }
            Some(_) => Err(ScopeError::PrivateRedeclared(name.to_string())),
        }
    }

    /// Records a reference to `#name` at `offset`. Fails immediately when
    /// no class body encloses the reference.
    pub fn resolve_private_name(&mut self, name: &str, offset: usize) -> Result<(), ScopeError> {
        match self.envs.last_mut() {
            Some(env) => {
                env.used.push((name.to_string(), offset));
                Ok(())
            }
            None => Err(ScopeError::UndeclaredPrivate(name.to_string())),
        }
    }

    /// Inside at least one class body.
    pub fn in_class(&self) -> bool {
        !self.envs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> ScopeStack {
        ScopeStack::new(false, false)
    }

    #[test]
    fn test_lexical_redeclaration() {
        let mut scopes = script();
        assert_eq!(scopes.declare("a", BindingKind::Lexical), Ok(true));
        assert_eq!(
            scopes.declare("a", BindingKind::Lexical),
            Err(ScopeError::Redeclared("a".into()))
        );
        assert!(scopes.declare("a", BindingKind::Var).is_err());
    }

    #[test]
    fn test_var_conflicts_with_outer_block_lexical() {
        let mut scopes = script();
        scopes.enter(ScopeFlags::function(false, false));
        scopes.declare("x", BindingKind::Lexical).unwrap();
        scopes.enter(ScopeFlags::empty());
        assert!(scopes.declare("x", BindingKind::Var).is_err());
    }

    #[test]
    fn test_var_hoists_past_blocks_to_function() {
        let mut scopes = script();
        scopes.enter(ScopeFlags::function(false, false));
        scopes.enter(ScopeFlags::empty());
        assert_eq!(scopes.declare("x", BindingKind::Var), Ok(false));
        scopes.exit();
        assert!(scopes.declare("x", BindingKind::Lexical).is_err());
    }

    #[test]
    fn test_var_may_shadow_simple_catch_param() {
        let mut scopes = script();
        scopes.enter(ScopeFlags::SIMPLE_CATCH);
        scopes.declare("e", BindingKind::SimpleCatch).unwrap();
        assert!(scopes.declare("e", BindingKind::Var).is_ok());
        assert!(scopes.declare("e", BindingKind::Lexical).is_err());
    }

    #[test]
    fn test_function_declarations() {
        let mut scopes = script();
        scopes.declare("f", BindingKind::Function).unwrap();
        assert!(scopes.declare("f", BindingKind::Function).is_ok());
        assert!(scopes.declare("f", BindingKind::Var).is_ok());

        scopes.enter(ScopeFlags::empty());
        scopes.declare("g", BindingKind::Function).unwrap();
        assert!(scopes.declare("g", BindingKind::Function).is_ok());
        assert!(scopes.declare("g", BindingKind::Var).is_err());
    }

    #[test]
    fn test_module_top_level_functions_are_lexical() {
        let scopes = ScopeStack::new(true, false);
        assert!(!scopes.treat_functions_as_var());
        assert_eq!(scopes.kind(), ScopeKind::Module);
    }

    #[test]
    fn test_await_and_yield_context() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.can_await());
        scopes.enter(ScopeFlags::function(false, true));
        assert!(!scopes.can_await());
        assert!(scopes.in_generator());
        scopes.enter(ScopeFlags::function(true, false) | ScopeFlags::ARROW);
        assert!(scopes.can_await());
        assert!(!scopes.in_generator());
        assert_eq!(scopes.kind(), ScopeKind::Arrow);
    }

    #[test]
    fn test_field_initializer_context() {
        let mut scopes = script();
        scopes.enter(ScopeFlags::function(true, false));
        scopes.enter(ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::SUPER);
        assert!(!scopes.can_await());
        assert!(scopes.allow_super());
        assert!(scopes.allow_new_target());
        assert!(scopes.in_class_field_init());
        scopes.enter(ScopeFlags::function(false, false) | ScopeFlags::ARROW);
        assert!(scopes.allow_super());
        assert!(scopes.in_class_field_init());
    }

    #[test]
    fn test_new_target_outside_function() {
        let mut scopes = script();
        assert!(!scopes.allow_new_target());
        scopes.enter(ScopeFlags::function(false, false) | ScopeFlags::ARROW);
        assert!(!scopes.allow_new_target());
    }

    #[test]
    fn test_private_getter_setter_pairing() {
        let mut names = PrivateNames::default();
        names.enter_class_body();
        names.declare("a", PrivateMember::Getter { is_static: false }).unwrap();
        names.declare("a", PrivateMember::Setter { is_static: false }).unwrap();
        assert!(names.declare("a", PrivateMember::Field).is_err());
        names.declare("b", PrivateMember::Getter { is_static: true }).unwrap();
        assert!(names.declare("b", PrivateMember::Setter { is_static: false }).is_err());
    }

    #[test]
    fn test_private_names_bubble_to_enclosing_class() {
        let mut names = PrivateNames::default();
        names.enter_class_body();
        names.declare("x", PrivateMember::Field).unwrap();
        names.enter_class_body();
        names.resolve_private_name("x", 10).unwrap();
        names.resolve_private_name("y", 20).unwrap();
        assert!(names.exit_class_body().is_ok());
        assert_eq!(
            names.exit_class_body(),
            Err((ScopeError::UndeclaredPrivate("y".into()), 20))
        );
    }

    #[test]
    fn test_private_name_outside_class() {
        let mut names = PrivateNames::default();
        assert!(names.resolve_private_name("x", 0).is_err());
    }
}
