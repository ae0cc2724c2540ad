use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::codegen::driver::Options;
use crate::codegen::types::{codec_suffix, go_type};
use crate::codegen::CodegenError;
use crate::parser::{EnumInfo, EnumValue, NamedKind, StructInfo, StructMember, Unit, VarType};
use crate::utils::upper_first_letter;
use crate::VERSION;

/// Import path of the codec runtime library every generated file uses.
const CODEC_PATH: &str = "github.com/edte/erpc/codec/jce";

/// Emits one Go source file for a resolved, renamed compilation unit.
pub struct Generator<'a> {
    unit: &'a Unit,
    opts: &'a Options,
    code: String,
    /// Per-struct counter for unique temporaries in nested container loops.
    vc: usize,
}

impl<'a> Generator<'a> {
    #[must_use]
    pub fn new(unit: &'a Unit, opts: &'a Options) -> Self {
        Self {
            unit,
            opts,
            code: String::new(),
            vc: 0,
        }
    }

    /// Generate the full source text: banner, package, imports, enums,
    /// consts, then structs with their codec methods.
    ///
    /// # Errors
    /// Returns `CodegenError` when an enum member references a member that
    /// is not declared before it.
    pub fn generate(mut self) -> Result<String, CodegenError> {
        self.gen_file_comment();
        self.gen_package();
        for en in &self.unit.enums {
            self.gen_enum(en)?;
        }
        self.gen_consts();
        for st in &self.unit.structs {
            self.gen_struct(st);
        }
        Ok(self.code)
    }

    fn put(&mut self, s: &str) {
        self.code.push_str(s);
    }

    fn gen_file_comment(&mut self) {
        let base = self
            .unit
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.put(&format!(
            "// DO NOT EDIT IT.\n// code generated by jce2go {VERSION}.\n// source: {base}\n"
        ));
    }

    fn gen_package(&mut self) {
        self.put(&format!("package {}\n\n", self.unit.module));
        self.put("import (\n\t\"fmt\"\n\t\"io\"\n\n");
        self.put(&format!("\t\"{CODEC_PATH}\"\n"));

        let mut depends = BTreeSet::new();
        for st in &self.unit.structs {
            depends.extend(st.depend_modules.iter().cloned());
        }
        for module in &depends {
            if let Some(path) = self.struct_import(module) {
                self.put(&format!("\t\"{path}\"\n"));
            }
        }

        self.put(")\n\n");
        self.put("var _ = fmt.Errorf\nvar _ = io.ReadFull\nvar _ = jce.BYTE\n\n");
    }

    // Import path for a dependency module: a suffix match over the
    // caller-supplied import list wins, otherwise the path is composed
    // from the project module path and the output prefix.
    fn struct_import(&self, module: &str) -> Option<String> {
        let suffix = format!("/{module}");
        for path in &self.opts.imports {
            if path.ends_with(&suffix) {
                return Some(path.clone());
            }
        }
        if self.opts.module_path.is_empty() {
            return None;
        }
        let joined = format!(
            "{}/{}",
            self.opts.module_path.trim_end_matches('/'),
            self.opts.outdir
        );
        let root: PathBuf = Path::new(&joined).components().collect();
        Some(format!("{}/{module}", root.display()))
    }

    fn gen_enum(&mut self, en: &EnumInfo) -> Result<(), CodegenError> {
        if en.members.is_empty() {
            return Ok(());
        }

        self.put(&format!("// enum {} implement\n", en.name));
        self.put(&format!("type {} int32\n", en.name));
        self.put("const (\n");

        // Values computed as declared so references inherit correctly
        let mut computed: Vec<(String, i32)> = Vec::new();
        let mut next = 0i32;
        for member in &en.members {
            let cname = make_enum_name(en, &member.key);
            match &member.value {
                EnumValue::Explicit(v) => {
                    self.put(&format!("\t{cname} {} = {v}\n", en.name));
                    computed.push((member.key.clone(), *v));
                    next = v + 1;
                }
                EnumValue::Reference(referent) => {
                    let value = computed
                        .iter()
                        .find(|(key, _)| key == referent)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| CodegenError::EnumForwardReference {
                            enum_name: en.name.clone(),
                            member: member.key.clone(),
                            referent: referent.clone(),
                        })?;
                    let ref_name = make_enum_name(en, referent);
                    self.put(&format!("\t{cname} {} = {ref_name}\n", en.name));
                    computed.push((member.key.clone(), value));
                    next = value + 1;
                }
                EnumValue::Implicit => {
                    self.put(&format!("\t{cname} {} = {next}\n", en.name));
                    computed.push((member.key.clone(), next));
                    next += 1;
                }
            }
        }

        self.put(")\n\n");
        Ok(())
    }

    fn gen_consts(&mut self) {
        if self.unit.consts.is_empty() {
            return;
        }
        self.put("// const implement\nconst (\n");
        for cst in &self.unit.consts {
            self.put(&format!("\t{} {} = {}\n", cst.name, go_type(&cst.ty), cst.value));
        }
        self.put(")\n\n");
    }

    fn gen_struct(&mut self, st: &StructInfo) {
        self.vc = 0;
        self.gen_struct_define(st);
        self.gen_reset_default(st);
        self.gen_read_from(st);
        self.gen_write_to(st);
    }

    fn gen_struct_define(&mut self, st: &StructInfo) {
        self.put(&format!("// {} struct implement\n", st.name));
        self.put(&format!("type {} struct {{\n", st.name));
        for member in &st.members {
            self.put(&format!(
                "\t{} {} {}\n",
                member.key,
                go_type(&member.ty),
                self.field_attribute(member)
            ));
        }
        self.put("}\n\n");
    }

    fn field_attribute(&self, member: &StructMember) -> String {
        if self.opts.json_omit_empty {
            if self.opts.add_tag {
                format!(
                    "`json:\"{},omitempty\" tag:\"{}\"`",
                    member.origin_key, member.tag
                )
            } else {
                format!("`json:\"{},omitempty\"`", member.origin_key)
            }
        } else {
            format!("`json:\"{}\" tag:\"{}\"`", member.origin_key, member.tag)
        }
    }

    fn gen_reset_default(&mut self, st: &StructInfo) {
        self.put(&format!("func (st *{}) resetDefault() {{\n", st.name));
        for member in &st.members {
            if member.ty.resolved_kind() == Some(NamedKind::Struct) {
                self.put(&format!("\tst.{}.resetDefault()\n", member.key));
            }
            if let Some(default) = &member.default {
                self.put(&format!("\tst.{} = {}\n", member.key, default.text));
            }
        }
        self.put("}\n\n");
    }

    fn gen_read_from(&mut self, st: &StructInfo) {
        self.put(&format!(
            "// ReadFrom reads from io.Reader and put into struct.\nfunc (st *{}) ReadFrom(r io.Reader) (n int64, err error) {{\n",
            st.name
        ));
        self.put("\tvar (\n\t\thave bool\n\t\tty   jce.JceEncodeType\n\t)\n\n");
        self.put("\tdecoder := jce.NewDecoder(r)\n\tst.resetDefault()\n\n");

        for member in &st.members {
            let require = member.require || self.opts.no_optional;
            self.gen_read_var(&member.ty, &member.key, member.tag, require, "st.", false);
        }

        self.put("\n\t_ = err\n\t_ = have\n\t_ = ty\n\treturn\n}\n\n");
    }

    fn gen_read_var(
        &mut self,
        ty: &VarType,
        name: &str,
        tag: i32,
        require: bool,
        prefix: &str,
        nested: bool,
    ) {
        self.put(&format!("\t// [step {tag}] read {name}\n"));
        let var = format!("{prefix}{name}");
        let req = bool_str(require);

        match ty {
            // The SimpleList optimization only applies to a member's own
            // byte vector; a byte vector nested in another container goes
            // through the generic LIST path.
            VarType::Vector(elem) if !nested && is_byte(elem) => {
                let call = if byte_unsigned(elem) { "ReadSliceUint8" } else { "ReadSliceInt8" };
                self.put(&format!(
                    "\tif err = decoder.{call}(&{var}, {tag}, {req}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            VarType::Vector(elem) => self.gen_read_seq(elem, name, tag, require, prefix, false),
            VarType::Array(elem, _) => self.gen_read_seq(elem, name, tag, require, prefix, true),
            VarType::Map(key, value) => self.gen_read_map(key, value, name, tag, require, prefix),
            VarType::Named(named) if named.resolved == Some(NamedKind::Enum) => {
                self.put(&format!(
                    "\tif err = decoder.ReadInt32((*int32)(&{var}), {tag}, {req}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            VarType::Named(_) => {
                self.put(&format!(
                    "\tif _, err = {var}.ReadFrom(decoder.Reader()); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            _ => {
                let suffix = codec_suffix(ty);
                self.put(&format!(
                    "\tif err = decoder.Read{suffix}(&{var}, {tag}, {req}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
        }
    }

    // Vector and fixed-array reads share the LIST layout; arrays are value
    // types in Go, so only vectors allocate.
    fn gen_read_seq(
        &mut self,
        elem: &VarType,
        name: &str,
        tag: i32,
        require: bool,
        prefix: &str,
        fixed: bool,
    ) {
        let vc = self.vc;
        self.vc += 1;
        let var = format!("{prefix}{name}");
        let req = bool_str(require);

        self.put(&format!("\tvar length{vc} uint32\n\n"));
        self.put(&format!("\t// [step {tag}.1] read type, tag\n"));
        self.put(&format!(
            "\tif ty, have, err = decoder.ReadHead({tag}, {req}); err != nil || !have {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.2] read list length\n"));
        self.put(&format!(
            "\tif length{vc}, err = decoder.ReadLength(); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.3] read data\n"));
        if !fixed {
            let list_type = go_type(&VarType::Vector(Box::new(elem.clone())));
            self.put(&format!("\t{var} = make({list_type}, length{vc})\n"));
        }
        self.put(&format!(
            "\tfor i{vc} := uint32(0); i{vc} < length{vc}; i{vc}++ {{\n"
        ));

        self.gen_read_var(elem, &format!("{name}[i{vc}]"), 0, false, prefix, true);

        self.put("\t}\n");
    }

    fn gen_read_map(
        &mut self,
        key: &VarType,
        value: &VarType,
        name: &str,
        tag: i32,
        require: bool,
        prefix: &str,
    ) {
        let vc = self.vc;
        self.vc += 1;
        let var = format!("{prefix}{name}");
        let req = bool_str(require);
        let map_type = go_type(&VarType::Map(Box::new(key.clone()), Box::new(value.clone())));

        self.put(&format!("\tvar length{vc} uint32\n\n"));
        self.put(&format!("\t// [step {tag}.1] read type, tag\n"));
        self.put(&format!(
            "\tif ty, have, err = decoder.ReadHead({tag}, {req}); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.2] read length\n"));
        self.put(&format!(
            "\tif length{vc}, err = decoder.ReadLength(); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.3] read data\n"));
        self.put(&format!("\t{var} = make({map_type}, 0)\n"));
        self.put(&format!("\tvar k{vc} {}\n", go_type(key)));
        self.put(&format!("\tvar v{vc} {}\n", go_type(value)));
        self.put(&format!("\tfor i := uint32(0); i < length{vc}; i++ {{\n"));

        self.gen_read_var(key, &format!("k{vc}"), 0, false, "", true);
        self.gen_read_var(value, &format!("v{vc}"), 1, false, "", true);

        self.put(&format!("\t\t{var}[k{vc}] = v{vc}\n\t}}\n"));
    }

    fn gen_write_to(&mut self, st: &StructInfo) {
        self.put(&format!(
            "// WriteTo encode struct to io.Writer\nfunc (st *{}) WriteTo(w io.Writer) (n int64, err error) {{\n",
            st.name
        ));
        self.put("\tencoder := jce.NewEncoder(w)\n\tst.resetDefault()\n\n");

        for member in &st.members {
            self.gen_write_var(&member.ty, &member.key, member.tag, "st.", false);
        }

        self.put("\n\t// flush to io.Writer\n\terr = encoder.Flush()\n\treturn\n}\n\n");
    }

    fn gen_write_var(&mut self, ty: &VarType, name: &str, tag: i32, prefix: &str, nested: bool) {
        self.put(&format!("\t// [step {tag}] write {name}\n"));
        let var = format!("{prefix}{name}");

        match ty {
            VarType::Vector(elem) if !nested && is_byte(elem) => {
                let call = if byte_unsigned(elem) { "WriteSliceUint8" } else { "WriteSliceInt8" };
                self.put(&format!(
                    "\tif err = encoder.{call}({var}, {tag}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            VarType::Vector(elem) | VarType::Array(elem, _) => {
                self.gen_write_seq(elem, &var, tag);
            }
            VarType::Map(key, value) => {
                self.gen_write_map(key, value, &var, tag);
            }
            VarType::Named(named) if named.resolved == Some(NamedKind::Enum) => {
                self.put(&format!(
                    "\tif err = encoder.WriteInt32(int32({var}), {tag}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            VarType::Named(_) => {
                self.put(&format!(
                    "\tif _, err = {var}.WriteTo(encoder.Writer()); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
            _ => {
                let suffix = codec_suffix(ty);
                self.put(&format!(
                    "\tif err = encoder.Write{suffix}({var}, {tag}); err != nil {{\n\t\treturn\n\t}}\n"
                ));
            }
        }
    }

    fn gen_write_seq(&mut self, elem: &VarType, var: &str, tag: i32) {
        let vc = self.vc;
        self.vc += 1;

        self.put(&format!("\t// [step {tag}.1] write type, tag\n"));
        self.put(&format!(
            "\tif err = encoder.WriteHead(jce.LIST, {tag}); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.2] write list length\n"));
        self.put(&format!(
            "\tif err = encoder.WriteLength(uint32(len({var}))); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.3] write data\n"));
        self.put(&format!("\tfor _, v{vc} := range {var} {{\n"));

        self.gen_write_var(elem, &format!("v{vc}"), 0, "", true);

        self.put("\t}\n");
    }

    fn gen_write_map(&mut self, key: &VarType, value: &VarType, var: &str, tag: i32) {
        let vc = self.vc;
        self.vc += 1;

        self.put(&format!("\t// [step {tag}.1] write type, tag\n"));
        self.put(&format!(
            "\tif err = encoder.WriteHead(jce.MAP, {tag}); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.2] write length\n"));
        self.put(&format!(
            "\tif err = encoder.WriteLength(uint32(len({var}))); err != nil {{\n\t\treturn\n\t}}\n"
        ));
        self.put(&format!("\t// [step {tag}.3] write data\n"));
        self.put(&format!("\tfor k{vc}, v{vc} := range {var} {{\n"));

        self.gen_write_var(key, &format!("k{vc}"), 0, "", true);
        self.gen_write_var(value, &format!("v{vc}"), 1, "", true);

        self.put("\t}\n");
    }
}

fn make_enum_name(en: &EnumInfo, member_key: &str) -> String {
    format!(
        "{}{}",
        upper_first_letter(&en.name),
        upper_first_letter(member_key)
    )
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

fn is_byte(ty: &VarType) -> bool {
    matches!(ty, VarType::Byte { .. })
}

fn byte_unsigned(ty: &VarType) -> bool {
    matches!(ty, VarType::Byte { unsigned: true })
}
