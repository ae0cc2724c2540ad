use std::collections::BTreeSet;
use std::path::Path;

use crate::lexer::TokenKind;
use crate::parser::{parse_file, NamedKind, ParserError, Unit, VarType};
use crate::utils::upper_first_letter;

/// Resolve a unit after its body has been parsed: parse every include
/// recursively, then run the default and type-name analysis passes.
/// `included_units` must be fully populated before type names resolve,
/// so includes always go first.
pub(crate) fn analyze_depend(unit: &mut Unit) -> Result<(), ParserError> {
    let dir = unit
        .source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for include in unit.includes.clone() {
        let path = dir.join(&include);
        let parsed = parse_file(&path, &unit.inc_chain)?;
        unit.included_units.push(parsed);
    }

    analyze_defaults(unit)?;
    analyze_type_names(unit)
}

/// Rewrite `Name`-kind member defaults into generated enum constant
/// references: `<EnumName>_<Upper(MemberKey)>`, module-qualified when the
/// enum lives in another module.
fn analyze_defaults(unit: &mut Unit) -> Result<(), ParserError> {
    let module = unit.module.clone();
    let file = unit.source.display().to_string();

    let mut rewrites = Vec::new();
    for (si, st) in unit.structs.iter().enumerate() {
        for (mi, member) in st.members.iter().enumerate() {
            let Some(default) = &member.default else {
                continue;
            };
            if default.kind != TokenKind::Name {
                continue;
            }
            let Some(hit) = find_enum_member(unit, &default.text)? else {
                return Err(ParserError::UnresolvedDefault {
                    file: file.clone(),
                    name: default.text.clone(),
                });
            };
            let mut text = format!("{}_{}", hit.enum_name, upper_first_letter(&hit.member_key));
            if !hit.module.is_empty() && hit.module != module {
                text = format!("{}.{}", hit.module, text);
            }
            rewrites.push((si, mi, text));
        }
    }

    for (si, mi, text) in rewrites {
        if let Some(default) = &mut unit.structs[si].members[mi].default {
            default.text = text;
        }
    }
    Ok(())
}

struct EnumHit {
    enum_name: String,
    member_key: String,
    module: String,
}

// Look up an enum member by (optionally qualified) name: this unit's own
// enums first, with an ambiguity check, then every included unit in order.
fn find_enum_member(unit: &Unit, name: &str) -> Result<Option<EnumHit>, ParserError> {
    let bare = match name.split_once("::") {
        Some((_, rest)) => rest,
        None => name,
    };

    let mut found: Option<EnumHit> = None;
    for en in &unit.enums {
        for member in &en.members {
            if member.key != bare {
                continue;
            }
            if let Some(first) = &found {
                return Err(ParserError::AmbiguousEnumMember {
                    file: unit.source.display().to_string(),
                    name: bare.to_string(),
                    first: format!("{}::{}", first.enum_name, first.member_key),
                    second: format!("{}::{}", en.name, member.key),
                });
            }
            found = Some(EnumHit {
                enum_name: en.name.clone(),
                member_key: member.key.clone(),
                module: en.module.clone(),
            });
        }
    }

    if found.is_none() {
        for inc in &unit.included_units {
            found = find_enum_member(inc, name)?;
            if found.is_some() {
                break;
            }
        }
    }
    Ok(found)
}

/// Resolve every `Named` node of every member type against the unit's own
/// declarations and its includes. Cross-module hits are recorded in the
/// struct's `depend_modules`; same-module qualifiers are stripped.
fn analyze_type_names(unit: &mut Unit) -> Result<(), ParserError> {
    let index = build_type_index(unit);
    let module = unit.module.clone();
    let file = unit.source.display().to_string();

    for st in &mut unit.structs {
        let members = &mut st.members;
        let depends = &mut st.depend_modules;
        for member in members.iter_mut() {
            resolve_type(&mut member.ty, &index, &module, depends, &file)?;
        }
    }
    Ok(())
}

// Qualified name -> (kind, owning module), own declarations before includes
// so the nearest definition wins.
fn build_type_index(unit: &Unit) -> Vec<(String, NamedKind, String)> {
    fn collect(unit: &Unit, out: &mut Vec<(String, NamedKind, String)>) {
        for st in &unit.structs {
            out.push((
                format!("{}::{}", unit.module, st.name),
                NamedKind::Struct,
                unit.module.clone(),
            ));
        }
        for en in &unit.enums {
            out.push((
                format!("{}::{}", unit.module, en.name),
                NamedKind::Enum,
                unit.module.clone(),
            ));
        }
        for inc in &unit.included_units {
            collect(inc, out);
        }
    }
    let mut index = Vec::new();
    collect(unit, &mut index);
    index
}

fn resolve_type(
    ty: &mut VarType,
    index: &[(String, NamedKind, String)],
    module: &str,
    depends: &mut BTreeSet<String>,
    file: &str,
) -> Result<(), ParserError> {
    match ty {
        VarType::Named(named) => {
            let qualified = if named.name.contains("::") {
                named.name.clone()
            } else {
                format!("{module}::{}", named.name)
            };
            let Some((_, kind, owner)) = index.iter().find(|(n, _, _)| *n == qualified) else {
                return Err(ParserError::UnresolvedType {
                    file: file.to_string(),
                    name: named.name.clone(),
                });
            };
            named.resolved = Some(*kind);
            if owner.as_str() != module {
                depends.insert(owner.clone());
            } else {
                named.name = named.name.replacen(&format!("{owner}::"), "", 1);
            }
            Ok(())
        }
        VarType::Vector(elem) | VarType::Array(elem, _) => {
            resolve_type(elem, index, module, depends, file)
        }
        VarType::Map(key, value) => {
            resolve_type(key, index, module, depends, file)?;
            resolve_type(value, index, module, depends, file)
        }
        _ => Ok(()),
    }
}
