use std::collections::HashSet;

use crate::lexer::TokenKind;
use crate::parser::parser::Parser;
use crate::parser::{
    ConstInfo, DefaultValue, EnumInfo, EnumMember, EnumValue, NamedType, ParserError, StructInfo,
    StructMember, VarType,
};

impl Parser {
    /// Parse a type starting at the current token. Recursive for the
    /// `vector<T>` and `map<K, V>` element types.
    pub(crate) fn parse_type(&mut self) -> Result<VarType, ParserError> {
        match self.token.kind {
            TokenKind::Name => Ok(VarType::Named(NamedType {
                name: self.token.text().to_string(),
                resolved: None,
            })),
            TokenKind::TBool => Ok(VarType::Bool),
            TokenKind::TByte => Ok(VarType::Byte { unsigned: false }),
            TokenKind::TShort => Ok(VarType::Short { unsigned: false }),
            TokenKind::TInt => Ok(VarType::Int { unsigned: false }),
            TokenKind::TLong => Ok(VarType::Long),
            TokenKind::TFloat => Ok(VarType::Float),
            TokenKind::TDouble => Ok(VarType::Double),
            TokenKind::TString => Ok(VarType::String),
            TokenKind::TVector => {
                self.expect(TokenKind::AngleLeft)?;
                self.next()?;
                let elem = self.parse_type()?;
                self.expect(TokenKind::AngleRight)?;
                Ok(VarType::Vector(Box::new(elem)))
            }
            TokenKind::TMap => {
                self.expect(TokenKind::AngleLeft)?;
                self.next()?;
                let key = self.parse_type()?;
                self.expect(TokenKind::Comma)?;
                self.next()?;
                let value = self.parse_type()?;
                self.expect(TokenKind::AngleRight)?;
                Ok(VarType::Map(Box::new(key), Box::new(value)))
            }
            TokenKind::Unsigned => {
                self.next()?;
                let inner = self.parse_type()?;
                self.make_unsigned(inner)
            }
            _ => Err(self.syntax("expect type")),
        }
    }

    // `unsigned` only decorates byte, short, and int.
    fn make_unsigned(&self, ty: VarType) -> Result<VarType, ParserError> {
        match ty {
            VarType::Byte { .. } => Ok(VarType::Byte { unsigned: true }),
            VarType::Short { .. } => Ok(VarType::Short { unsigned: true }),
            VarType::Int { .. } => Ok(VarType::Int { unsigned: true }),
            _ => Err(self.syntax("unsigned decoration is not supported for this type")),
        }
    }

    /// `const <primitive-type> NAME = <literal>;`
    pub(crate) fn parse_const(&mut self) -> Result<(), ParserError> {
        self.next()?;
        let ty = match self.token.kind {
            TokenKind::TVector | TokenKind::TMap => {
                return Err(self.syntax("const does not support vector or map"))
            }
            TokenKind::TBool
            | TokenKind::TByte
            | TokenKind::TShort
            | TokenKind::TInt
            | TokenKind::TLong
            | TokenKind::TFloat
            | TokenKind::TDouble
            | TokenKind::TString
            | TokenKind::Unsigned => self.parse_type()?,
            _ => return Err(self.syntax("expect type")),
        };

        self.expect(TokenKind::Name)?;
        let name = self.token.text().to_string();

        self.expect(TokenKind::Eq)?;
        self.next()?;
        let value = match self.token.kind {
            TokenKind::Integer | TokenKind::Float => {
                if !ty.is_numeric() {
                    return Err(self.syntax("type does not accept number"));
                }
                self.token.text().to_string()
            }
            TokenKind::StringLit => {
                if ty.is_numeric() {
                    return Err(self.syntax("type does not accept string"));
                }
                format!("\"{}\"", self.token.text())
            }
            TokenKind::True | TokenKind::False => {
                if ty != VarType::Bool {
                    return Err(self.syntax("default value format error"));
                }
                self.token.kind.to_string()
            }
            _ => return Err(self.syntax("default value format error")),
        };
        self.expect(TokenKind::Semi)?;

        self.unit.consts.push(ConstInfo { ty, name, value });
        Ok(())
    }

    /// `enum Name { K [= <int> | = <earlier-member>], ... };`
    pub(crate) fn parse_enum(&mut self) -> Result<(), ParserError> {
        self.expect(TokenKind::Name)?;
        let name = self.token.text().to_string();
        if self.unit.enums.iter().any(|e| e.name == name) {
            return Err(ParserError::Redefine {
                file: self.file().to_string(),
                line: self.token.line,
                name,
            });
        }

        let mut info = EnumInfo {
            module: self.unit.module.clone(),
            name,
            members: Vec::new(),
        };
        self.expect(TokenKind::BraceLeft)?;

        'body: loop {
            self.next()?;
            match self.token.kind {
                TokenKind::BraceRight => break 'body,
                TokenKind::Name => {
                    let key = self.token.text().to_string();
                    self.next()?;
                    match self.token.kind {
                        TokenKind::Comma => {
                            info.members.push(EnumMember { key, value: EnumValue::Implicit });
                        }
                        TokenKind::BraceRight => {
                            info.members.push(EnumMember { key, value: EnumValue::Implicit });
                            break 'body;
                        }
                        TokenKind::Eq => {
                            self.next()?;
                            let value = match self.token.kind {
                                TokenKind::Integer => EnumValue::Explicit(self.token.int() as i32),
                                TokenKind::Name => {
                                    EnumValue::Reference(self.token.text().to_string())
                                }
                                kind => {
                                    return Err(self.syntax(format!("not expect '{kind}'")))
                                }
                            };
                            info.members.push(EnumMember { key, value });
                            self.next()?;
                            match self.token.kind {
                                TokenKind::BraceRight => break 'body,
                                TokenKind::Comma => {}
                                _ => return Err(self.syntax("expect , or }")),
                            }
                        }
                        _ => return Err(self.syntax("expect , = or }")),
                    }
                }
                _ => return Err(self.syntax("expect member name or }")),
            }
        }
        self.expect(TokenKind::Semi)?;

        self.unit.enums.push(info);
        Ok(())
    }

    /// `struct Name { <member>; ... };`
    pub(crate) fn parse_struct(&mut self) -> Result<(), ParserError> {
        self.expect(TokenKind::Name)?;
        let name = self.token.text().to_string();
        if self.unit.structs.iter().any(|s| s.name == name) {
            return Err(ParserError::Redefine {
                file: self.file().to_string(),
                line: self.token.line,
                name,
            });
        }

        let mut info = StructInfo::new(name);
        self.expect(TokenKind::BraceLeft)?;
        while let Some(member) = self.parse_struct_member()? {
            info.members.push(member);
        }
        self.expect(TokenKind::Semi)?;

        self.check_tags(&info)?;
        info.members.sort_by_key(|m| m.tag);

        self.unit.structs.push(info);
        Ok(())
    }

    /// One struct member:
    /// `<tag> <require|optional> <type> <name> [ "[" <int> "]" | "=" <literal> ] ";"`.
    /// Returns `None` when the closing `}` of the struct body is reached.
    fn parse_struct_member(&mut self) -> Result<Option<StructMember>, ParserError> {
        self.next()?;
        if self.token.kind == TokenKind::BraceRight {
            return Ok(None);
        }
        if self.token.kind != TokenKind::Integer {
            return Err(self.syntax("expect tag"));
        }
        let tag = self.token.int();
        if tag < 0 || tag > i64::from(i32::MAX) {
            return Err(self.syntax(format!("tag {tag} out of range")));
        }
        let tag = tag as i32;

        self.next()?;
        let require = match self.token.kind {
            TokenKind::Require => true,
            TokenKind::Optional => false,
            _ => return Err(self.syntax("expect require or optional")),
        };

        self.next()?;
        if !self.token.kind.is_type()
            && self.token.kind != TokenKind::Name
            && self.token.kind != TokenKind::Unsigned
        {
            return Err(self.syntax("expect type"));
        }
        let mut ty = self.parse_type()?;

        self.expect(TokenKind::Name)?;
        let key = self.token.text().to_string();

        let mut default = None;
        self.next()?;
        match self.token.kind {
            TokenKind::Semi => {}
            TokenKind::SquareLeft => {
                self.expect(TokenKind::Integer)?;
                let length = self.token.int();
                if length < 0 {
                    return Err(self.syntax("array length must be non-negative"));
                }
                ty = VarType::Array(Box::new(ty), length);
                self.expect(TokenKind::SquareRight)?;
                self.expect(TokenKind::Semi)?;
            }
            TokenKind::Eq => {
                if matches!(ty, VarType::Vector(_) | VarType::Map(_, _)) {
                    return Err(self.syntax("map, vector cannot set default value"));
                }
                self.next()?;
                default = Some(self.parse_member_default(&ty)?);
                self.expect(TokenKind::Semi)?;
            }
            _ => return Err(self.syntax("expect ; [ or =")),
        }

        Ok(Some(StructMember {
            tag,
            require,
            ty,
            key,
            origin_key: String::new(),
            default,
        }))
    }

    // Literal default for a struct member. Named defaults are enum member
    // references, resolved after the whole file tree is parsed.
    fn parse_member_default(&self, ty: &VarType) -> Result<DefaultValue, ParserError> {
        let kind = self.token.kind;
        let text = match kind {
            TokenKind::Integer => {
                // enum-typed members take numeric defaults too
                if !ty.is_numeric() && !ty.is_named() {
                    return Err(self.syntax("type does not accept number"));
                }
                self.token.text().to_string()
            }
            TokenKind::Float => {
                if !ty.is_numeric() {
                    return Err(self.syntax("type does not accept number"));
                }
                self.token.text().to_string()
            }
            TokenKind::StringLit => {
                if ty.is_numeric() {
                    return Err(self.syntax("type does not accept string"));
                }
                format!("\"{}\"", self.token.text())
            }
            TokenKind::True | TokenKind::False => {
                if *ty != VarType::Bool {
                    return Err(self.syntax("default value format error"));
                }
                kind.to_string()
            }
            TokenKind::Name => self.token.text().to_string(),
            _ => return Err(self.syntax("default value format error")),
        };
        Ok(DefaultValue { text, kind })
    }

    fn check_tags(&self, info: &StructInfo) -> Result<(), ParserError> {
        let mut seen = HashSet::new();
        for member in &info.members {
            if !seen.insert(member.tag) {
                return Err(ParserError::DuplicateTag {
                    file: self.file().to_string(),
                    line: self.token.line,
                    tag: member.tag,
                });
            }
        }
        Ok(())
    }
}
