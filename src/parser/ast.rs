use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::lexer::TokenKind;
use crate::utils::{path_to_proto_name, upper_first_letter};

/// Concrete kind of a resolved user-defined type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Struct,
    Enum,
}

/// A user-defined type reference, qualified or bare. `resolved` is set by
/// name resolution and is never `None` in a resolved unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub resolved: Option<NamedKind>,
}

/// Variable types of the JCE grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum VarType {
    Bool,
    Byte { unsigned: bool },
    Short { unsigned: bool },
    Int { unsigned: bool },
    Long,
    Float,
    Double,
    String,
    Vector(Box<VarType>),
    Map(Box<VarType>, Box<VarType>),
    Array(Box<VarType>, i64),
    Named(NamedType),
}

impl VarType {
    /// Numeric types accept number literals; bool counts as numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            VarType::Bool
                | VarType::Byte { .. }
                | VarType::Short { .. }
                | VarType::Int { .. }
                | VarType::Long
                | VarType::Float
                | VarType::Double
        )
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, VarType::Named(_))
    }

    #[must_use]
    pub fn resolved_kind(&self) -> Option<NamedKind> {
        match self {
            VarType::Named(named) => named.resolved,
            _ => None,
        }
    }
}

/// A member default as it will be spelled in generated code, plus the
/// literal's token kind (a `Name` kind marks an enum reference that the
/// resolve pass rewrites).
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub text: String,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub tag: i32,
    pub require: bool,
    pub ty: VarType,
    /// Upper-cased member name after the rename pass.
    pub key: String,
    /// Source spelling of the member name.
    pub origin_key: String,
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    pub name: String,
    /// Ordered ascending by tag once the struct body is parsed.
    pub members: Vec<StructMember>,
    /// Modules referenced by member types, excluding the owning module.
    pub depend_modules: BTreeSet<String>,
}

impl StructInfo {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: Vec::new(),
            depend_modules: BTreeSet::new(),
        }
    }

    fn rename(&mut self) {
        self.name = upper_first_letter(&self.name);
        for member in &mut self.members {
            member.origin_key = member.key.clone();
            member.key = upper_first_letter(&member.key);
        }
    }
}

/// The three member forms of an enum body.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    /// `K = 3`
    Explicit(i32),
    /// `K = OtherMember`, referring to an earlier member of the same enum
    Reference(String),
    /// `K` — previous value plus one
    Implicit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub key: String,
    pub value: EnumValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumInfo {
    /// Owning module, stamped at parse time.
    pub module: String,
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumInfo {
    fn rename(&mut self) {
        self.name = upper_first_letter(&self.name);
        for member in &mut self.members {
            member.key = upper_first_letter(&member.key);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstInfo {
    /// Always a primitive type; containers and named types are rejected.
    pub ty: VarType,
    pub name: String,
    /// Rendered literal text (strings pre-quoted, hex preserved).
    pub value: String,
}

impl ConstInfo {
    fn rename(&mut self) {
        self.name = upper_first_letter(&self.name);
    }
}

/// One compilation unit: a physical `.jce` file, or a synthetic derivative
/// when a file declares more than one module.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub source: PathBuf,
    pub module: String,
    pub includes: Vec<String>,
    pub structs: Vec<StructInfo>,
    pub enums: Vec<EnumInfo>,
    pub consts: Vec<ConstInfo>,
    /// Fully parsed and resolved units for every include (and synthetic
    /// sibling modules). Never cyclic; the include chain is checked first.
    pub included_units: Vec<Unit>,
    pub inc_chain: Vec<PathBuf>,
    /// Source file name without directory or `.jce` extension.
    pub proto_name: String,
}

impl Unit {
    #[must_use]
    pub fn new(source: &Path, inc_chain: Vec<PathBuf>) -> Self {
        Self {
            source: source.to_path_buf(),
            module: String::new(),
            includes: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            consts: Vec::new(),
            included_units: Vec::new(),
            inc_chain,
            proto_name: path_to_proto_name(source),
        }
    }

    /// A unit with no declarations produces no output file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty() && self.enums.is_empty() && self.consts.is_empty()
    }

    /// Upper-case every declared name in this unit and all included units.
    /// Runs once, after resolution and before emission; name lookup works
    /// on source spellings, so this pass must not run earlier.
    pub fn rename_all(&mut self) {
        for st in &mut self.structs {
            st.rename();
        }
        for en in &mut self.enums {
            en.rename();
        }
        for cst in &mut self.consts {
            cst.rename();
        }
        for inc in &mut self.included_units {
            inc.rename_all();
        }
    }
}
