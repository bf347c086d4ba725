use getset::{CopyGetters, Getters};
use multimap::MultiMap;
use std::fmt;

/// 1-based line and character column of a construct in the source file.
#[derive(Clone, Copy, Constructor, CopyGetters, Default, Debug, PartialEq, Eq)]
#[getset(get_copy = "pub")]
pub struct Position {
    line: usize,
    column: usize
}

impl Position {
    pub fn from_offset(source: &str, offset: usize) -> Position {
        let before = &source[..offset.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Position { line, column }
    }
}

/// A numeric literal or a reference to a named value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Constant(String),
    Identifier(String)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Constant(text) => write!(f, "{}", text),
            Value::Identifier(name) => write!(f, "{}", name)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Int,
    UnsignedInt,
    Hyper,
    UnsignedHyper,
    Float,
    Double,
    Quadruple,
    Bool
}

impl Builtin {
    /// Canonical spelling, with the space of `unsigned int` replaced by an underscore.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Int => "int",
            Builtin::UnsignedInt => "unsigned_int",
            Builtin::Hyper => "hyper",
            Builtin::UnsignedHyper => "unsigned_hyper",
            Builtin::Float => "float",
            Builtin::Double => "double",
            Builtin::Quadruple => "quadruple",
            Builtin::Bool => "bool"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Builtin(Builtin),
    Enum,
    Struct,
    Union,
    Typedef,
    Pointer
}

#[derive(Clone, Constructor, Getters, CopyGetters, Debug, PartialEq, Eq)]
pub struct TypeSpecifier {
    #[getset(get = "pub")]
    type_name: String,

    #[getset(get_copy = "pub")]
    kind: TypeKind
}

impl TypeSpecifier {
    pub fn builtin(builtin: Builtin) -> TypeSpecifier {
        TypeSpecifier { type_name: builtin.name().to_string(), kind: TypeKind::Builtin(builtin) }
    }

    pub fn is_builtin(&self) -> bool {
        match self.kind {
            TypeKind::Builtin(_) => true,
            _ => false
        }
    }
}

/// A named member of a struct, union arm or typedef. The name is empty for `void`.
#[derive(Clone, Constructor, Getters, CopyGetters, Debug, PartialEq, Eq)]
pub struct Declaration {
    #[getset(get = "pub")]
    name: String,

    #[getset(get_copy = "pub")]
    position: Position,

    #[getset(get = "pub")]
    which: declaration::Which
}

pub mod declaration {
    use super::{TypeSpecifier, Value};

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Which {
        Basic(TypeSpecifier),
        FixedArray { spec: TypeSpecifier, size: Value },
        VariableArray { spec: TypeSpecifier, maxsize: Option<Value> },
        FixedOpaque { size: Value },
        VariableOpaque { maxsize: Option<Value> },
        String { maxsize: Option<Value> },
        Optional(TypeSpecifier),
        Void
    }
}

impl Declaration {
    pub fn void(position: Position) -> Declaration {
        Declaration { name: String::new(), position, which: declaration::Which::Void }
    }

    pub fn is_void(&self) -> bool {
        self.which == declaration::Which::Void
    }

    pub fn type_specifier(&self) -> Option<&TypeSpecifier> {
        use declaration::Which;

        match &self.which {
            Which::Basic(spec) | Which::Optional(spec) => Some(spec),
            Which::FixedArray { spec, .. } | Which::VariableArray { spec, .. } => Some(spec),
            _ => None
        }
    }
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Constant {
    name: String,
    value: String
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Enumerator {
    name: String,
    value: Value
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Enum {
    name: String,
    enumerators: Vec<Enumerator>
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Struct {
    name: String,
    fields: Vec<Declaration>
}

/// A struct whose last field optionally refers to the struct itself (an XDR linked list).
#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Pointer {
    name: String,
    fields: Vec<Declaration>
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Typedef {
    declaration: Declaration
}

impl Typedef {
    pub fn name(&self) -> &String {
        self.declaration.name()
    }
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct CaseArm {
    values: Vec<Value>,
    declaration: Declaration
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Union {
    name: String,
    discriminant: Declaration,
    arms: Vec<CaseArm>,
    default: Option<Declaration>
}

/// An RPC procedure. A `None` argument or result stands for `void`.
#[derive(Clone, Constructor, Getters, CopyGetters, Debug, PartialEq, Eq)]
pub struct Procedure {
    #[getset(get = "pub")]
    name: String,

    #[getset(get = "pub")]
    number: String,

    #[getset(get = "pub")]
    argument: Option<TypeSpecifier>,

    #[getset(get = "pub")]
    result: Option<TypeSpecifier>,

    #[getset(get_copy = "pub")]
    position: Position
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Version {
    name: String,
    number: String,
    procedures: Vec<Procedure>
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Program {
    name: String,
    number: String,
    versions: Vec<Version>
}

/// Source lines copied to the output with their leading `%` removed.
#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Passthru {
    lines: Vec<String>
}

impl Passthru {
    pub(crate) fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }
}

#[derive(Clone, Constructor, Getters, CopyGetters, Debug, PartialEq, Eq)]
pub struct Definition {
    #[getset(get_copy = "pub")]
    position: Position,

    #[getset(get = "pub")]
    which: definition::Which
}

pub mod definition {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Which {
        Constant(Constant),
        Enum(Enum),
        Pointer(Pointer),
        Typedef(Typedef),
        Struct(Struct),
        Union(Union),
        Program(Program),
        Passthru(Passthru)
    }
}

impl Definition {
    pub fn name(&self) -> Option<&str> {
        use definition::Which;

        match &self.which {
            Which::Constant(c) => Some(c.name()),
            Which::Enum(e) => Some(e.name()),
            Which::Pointer(p) => Some(p.name()),
            Which::Typedef(t) => Some(t.name()),
            Which::Struct(s) => Some(s.name()),
            Which::Union(u) => Some(u.name()),
            Which::Program(p) => Some(p.name()),
            Which::Passthru(_) => None
        }
    }

    /// The XDR keyword that introduced this definition.
    pub fn kind(&self) -> &'static str {
        use definition::Which;

        match &self.which {
            Which::Constant(_) => "const",
            Which::Enum(_) => "enum",
            Which::Pointer(_) => "pointer",
            Which::Typedef(_) => "typedef",
            Which::Struct(_) => "struct",
            Which::Union(_) => "union",
            Which::Program(_) => "program",
            Which::Passthru(_) => "passthru"
        }
    }

    pub(crate) fn which_mut(&mut self) -> &mut definition::Which {
        &mut self.which
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Pragma {
    #[display(fmt = "header")]
    Header,
    #[display(fmt = "exclude")]
    Exclude
}

#[derive(Clone, Constructor, Getters, Debug, PartialEq, Eq)]
#[getset(get = "pub")]
pub struct Specification {
    definitions: Vec<Definition>,
    pragmas: MultiMap<Pragma, String>
}

impl Specification {
    /// The last `pragma header` name, if any.
    pub fn header(&self) -> Option<&str> {
        self.pragmas
            .get_vec(&Pragma::Header)
            .and_then(|names| names.last())
            .map(String::as_str)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.pragmas
            .get_vec(&Pragma::Exclude)
            .map(|names| names.iter().any(|n| n == name))
            .unwrap_or(false)
    }
}

impl Default for Specification {
    fn default() -> Self {
        Specification { definitions: vec!(), pragmas: MultiMap::new() }
    }
}
