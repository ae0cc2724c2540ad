use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use jce2go::codegen::{Compiler, Options, PassthroughFormatter};

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn options(&self) -> Options {
        Options {
            outdir: self.out().display().to_string(),
            ..Options::default()
        }
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn compile(&self, files: &[(&str, &str)], options: Options) {
        let mut compiler = Compiler::new(options, Box::new(PassthroughFormatter));
        let mut root = None;
        for (name, content) in files {
            let path = write_file(self.dir.path(), name, content);
            if root.is_none() {
                root = Some(path);
            }
        }
        compiler
            .compile_file(&root.expect("no fixture files"))
            .expect("compile failed");
    }

    fn output(&self, module: &str, proto: &str) -> String {
        let path = self.out().join(module).join(format!("{proto}.jce.go"));
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing output file {}", path.display()))
    }
}

#[test]
fn minimal_struct_codec() {
    let sb = Sandbox::new();
    sb.compile(
        &[("base.jce", "module base { struct Request { 1 require byte B; }; };")],
        sb.options(),
    );
    let code = sb.output("base", "base");

    assert!(code.starts_with("// DO NOT EDIT IT.\n// code generated by jce2go"));
    assert!(code.contains("// source: base.jce"));
    assert!(code.contains("package base\n"));
    assert!(code.contains("\"github.com/edte/erpc/codec/jce\""));
    assert!(code.contains("type Request struct {"));
    assert!(code.contains("\tB int8 `json:\"B\" tag:\"1\"`"));
    assert!(code.contains("if err = encoder.WriteInt8(st.B, 1); err != nil {"));
    assert!(code.contains("if err = decoder.ReadInt8(&st.B, 1, true); err != nil {"));
}

#[test]
fn enum_mixed_forms() {
    let sb = Sandbox::new();
    sb.compile(
        &[("e.jce", "module m { enum E { A = 5, B, C = A, D }; };")],
        sb.options(),
    );
    let code = sb.output("m", "e");

    assert!(code.contains("type E int32"));
    assert!(code.contains("\tEA E = 5\n"));
    assert!(code.contains("\tEB E = 6\n"));
    assert!(code.contains("\tEC E = EA\n"));
    assert!(code.contains("\tED E = 6\n"));
}

#[test]
fn enum_forward_reference_fails() {
    let sb = Sandbox::new();
    let mut compiler = Compiler::new(sb.options(), Box::new(PassthroughFormatter));
    let path = write_file(sb.dir.path(), "e.jce", "module m { enum E { A = B, B = 1 }; };");
    let err = compiler.compile_file(&path).unwrap_err();
    assert!(err.to_string().contains("not defined before use"));
}

#[test]
fn byte_vector_uses_simple_list() {
    let sb = Sandbox::new();
    sb.compile(
        &[("s.jce", "module m { struct S { 1 optional vector<unsigned byte> Buf; }; };")],
        sb.options(),
    );
    let code = sb.output("m", "s");

    assert!(code.contains("\tBuf []uint8 `json:\"Buf\" tag:\"1\"`"));
    assert!(code.contains("if err = decoder.ReadSliceUint8(&st.Buf, 1, false); err != nil {"));
    assert!(code.contains("if err = encoder.WriteSliceUint8(st.Buf, 1); err != nil {"));
}

#[test]
fn signed_byte_vector_uses_simple_list() {
    let sb = Sandbox::new();
    sb.compile(
        &[("s.jce", "module m { struct S { 1 optional vector<byte> Buf; }; };")],
        sb.options(),
    );
    let code = sb.output("m", "s");
    assert!(code.contains("ReadSliceInt8(&st.Buf, 1, false)"));
    assert!(code.contains("WriteSliceInt8(st.Buf, 1)"));
}

#[test]
fn nested_byte_vector_is_not_simple_list() {
    let sb = Sandbox::new();
    sb.compile(
        &[("s.jce", "module m { struct S { 1 require vector<vector<byte>> Bufs; }; };")],
        sb.options(),
    );
    let code = sb.output("m", "s");

    // the inner byte vector goes through the generic LIST path
    assert!(!code.contains("WriteSlice"));
    assert!(!code.contains("ReadSlice"));
    assert!(code.contains("if err = encoder.WriteHead(jce.LIST, 1); err != nil {"));
    assert!(code.contains("if err = encoder.WriteHead(jce.LIST, 0); err != nil {"));
}

#[test]
fn map_of_named_struct() {
    let sb = Sandbox::new();
    let mut options = sb.options();
    options.imports = vec!["github.com/example/app/base".to_string()];
    sb.compile(
        &[
            (
                "m.jce",
                "#include \"base.jce\"\nmodule m { struct S { 1 require map<string, base::Request> M; }; };",
            ),
            ("base.jce", "module base { struct Request { 1 require byte B; }; };"),
        ],
        options,
    );
    let code = sb.output("m", "m");

    assert!(code.contains("\"github.com/example/app/base\""));
    assert!(code.contains("\tM map[string]base.Request `json:\"M\" tag:\"1\"`"));

    // ReadFrom runs first and takes temporaries 0, WriteTo continues with 1
    assert!(code.contains("if ty, have, err = decoder.ReadHead(1, true); err != nil {"));
    assert!(code.contains("st.M = make(map[string]base.Request, 0)"));
    assert!(code.contains("var k0 string"));
    assert!(code.contains("var v0 base.Request"));
    assert!(code.contains("if err = decoder.ReadString(&k0, 0, false); err != nil {"));
    assert!(code.contains("if _, err = v0.ReadFrom(decoder.Reader()); err != nil {"));
    assert!(code.contains("st.M[k0] = v0"));

    assert!(code.contains("if err = encoder.WriteHead(jce.MAP, 1); err != nil {"));
    assert!(code.contains("if err = encoder.WriteLength(uint32(len(st.M))); err != nil {"));
    assert!(code.contains("for k1, v1 := range st.M {"));
    assert!(code.contains("if err = encoder.WriteString(k1, 0); err != nil {"));
    assert!(code.contains("if _, err = v1.WriteTo(encoder.Writer()); err != nil {"));

    // the dependency file is generated as well
    let base = sb.output("base", "base");
    assert!(base.contains("type Request struct {"));
}

#[test]
fn fixed_array_reads_without_allocation() {
    let sb = Sandbox::new();
    sb.compile(
        &[("a.jce", "module m { struct S { 1 require int X[4]; }; };")],
        sb.options(),
    );
    let code = sb.output("m", "a");

    assert!(code.contains("\tX [4]int32 `json:\"X\" tag:\"1\"`"));
    assert!(!code.contains("make("));
    assert!(code.contains("if ty, have, err = decoder.ReadHead(1, true); err != nil || !have {"));
    assert!(code.contains("if err = decoder.ReadInt32(&st.X[i0], 0, false); err != nil {"));
    assert!(code.contains("if err = encoder.WriteHead(jce.LIST, 1); err != nil {"));
    assert!(code.contains("for _, v1 := range st.X {"));
    assert!(code.contains("if err = encoder.WriteInt32(v1, 0); err != nil {"));
}

#[test]
fn vector_of_int_allocates_and_loops() {
    let sb = Sandbox::new();
    sb.compile(
        &[("v.jce", "module m { struct S { 2 optional vector<int> Nums; }; };")],
        sb.options(),
    );
    let code = sb.output("m", "v");

    assert!(code.contains("var length0 uint32"));
    assert!(code.contains("if ty, have, err = decoder.ReadHead(2, false); err != nil || !have {"));
    assert!(code.contains("st.Nums = make([]int32, length0)"));
    assert!(code.contains("for i0 := uint32(0); i0 < length0; i0++ {"));
    assert!(code.contains("if err = decoder.ReadInt32(&st.Nums[i0], 0, false); err != nil {"));
}

#[test]
fn enum_member_codec_and_default() {
    let sb = Sandbox::new();
    sb.compile(
        &[(
            "e.jce",
            "module m { enum E { A, B }; struct S { 1 optional E lvl = A; }; };",
        )],
        sb.options(),
    );
    let code = sb.output("m", "e");

    assert!(code.contains("func (st *S) resetDefault() {"));
    assert!(code.contains("\tst.Lvl = E_A\n"));
    assert!(code.contains("if err = decoder.ReadInt32((*int32)(&st.Lvl), 1, false); err != nil {"));
    assert!(code.contains("if err = encoder.WriteInt32(int32(st.Lvl), 1); err != nil {"));
}

#[test]
fn nested_struct_reset_and_codec() {
    let sb = Sandbox::new();
    sb.compile(
        &[(
            "n.jce",
            "module m { struct Inner { 1 require int a; }; struct Outer { 1 require Inner i; }; };",
        )],
        sb.options(),
    );
    let code = sb.output("m", "n");

    assert!(code.contains("\tst.I.resetDefault()\n"));
    assert!(code.contains("if _, err = st.I.ReadFrom(decoder.Reader()); err != nil {"));
    assert!(code.contains("if _, err = st.I.WriteTo(encoder.Writer()); err != nil {"));
}

#[test]
fn consts_preserve_literal_text() {
    let sb = Sandbox::new();
    sb.compile(
        &[(
            "c.jce",
            r#"module m { const short VERSION = 0x01; const string NAME = "jce"; };"#,
        )],
        sb.options(),
    );
    let code = sb.output("m", "c");

    assert!(code.contains("// const implement"));
    assert!(code.contains("\tVERSION int16 = 0x01\n"));
    assert!(code.contains("\tNAME string = \"jce\"\n"));
}

#[test]
fn json_flag_controls_field_attributes() {
    let source = "module m { struct S { 1 optional int num; }; };";

    let sb = Sandbox::new();
    sb.compile(&[("s.jce", source)], sb.options());
    assert!(sb.output("m", "s").contains("\tNum int32 `json:\"num\" tag:\"1\"`"));

    let sb = Sandbox::new();
    let mut options = sb.options();
    options.json_omit_empty = true;
    sb.compile(&[("s.jce", source)], options);
    assert!(sb.output("m", "s").contains("\tNum int32 `json:\"num,omitempty\"`"));

    let sb = Sandbox::new();
    let mut options = sb.options();
    options.json_omit_empty = true;
    options.add_tag = true;
    sb.compile(&[("s.jce", source)], options);
    assert!(sb
        .output("m", "s")
        .contains("\tNum int32 `json:\"num,omitempty\" tag:\"1\"`"));
}

#[test]
fn no_optional_decodes_as_required() {
    let source = "module m { struct S { 1 optional int num; }; };";
    let sb = Sandbox::new();
    let mut options = sb.options();
    options.no_optional = true;
    sb.compile(&[("s.jce", source)], options);
    assert!(sb
        .output("m", "s")
        .contains("if err = decoder.ReadInt32(&st.Num, 1, true); err != nil {"));
}

#[test]
fn empty_module_emits_nothing() {
    let sb = Sandbox::new();
    sb.compile(&[("empty.jce", "module empty { };")], sb.options());
    assert!(!sb.out().join("empty").exists());
}

#[test]
fn multiple_modules_emit_multiple_files() {
    let sb = Sandbox::new();
    sb.compile(
        &[(
            "demo.jce",
            r#"module first { struct A { 1 require int x; }; };
               module second { struct B { 1 require int y; }; };"#,
        )],
        sb.options(),
    );

    let first = sb.output("first", "demo");
    assert!(first.contains("package first"));
    assert!(first.contains("type A struct {"));

    let second = sb.output("second", "demo_second");
    assert!(second.contains("package second"));
    assert!(second.contains("type B struct {"));
    // the parent's structs are not duplicated into the synthetic unit
    assert!(!second.contains("type A struct {"));
}

#[test]
fn driver_is_idempotent() {
    let files = [
        (
            "m.jce",
            "#include \"base.jce\"\nmodule m { struct S { 1 require base::Request r; }; };",
        ),
        ("base.jce", "module base { struct Request { 1 require byte B; }; };"),
    ];

    let sb = Sandbox::new();
    sb.compile(&files, sb.options());
    let first_m = sb.output("m", "m");
    let first_base = sb.output("base", "base");

    sb.compile(&files, sb.options());
    assert_eq!(sb.output("m", "m"), first_m);
    assert_eq!(sb.output("base", "base"), first_base);
}

#[test]
fn shared_include_is_emitted_once_per_run() {
    let sb = Sandbox::new();
    write_file(
        sb.dir.path(),
        "base.jce",
        "module base { struct Request { 1 require byte B; }; };",
    );
    let m1 = write_file(
        sb.dir.path(),
        "m1.jce",
        "#include \"base.jce\"\nmodule m1 { struct S { 1 require base::Request r; }; };",
    );
    let m2 = write_file(
        sb.dir.path(),
        "m2.jce",
        "#include \"base.jce\"\nmodule m2 { struct S { 1 require base::Request r; }; };",
    );

    let mut compiler = Compiler::new(sb.options(), Box::new(PassthroughFormatter));
    compiler.compile_file(&m1).expect("compile m1");

    let base_out = sb.out().join("base").join("base.jce.go");
    assert!(base_out.exists());

    // the dedup set suppresses a second emission of the shared include
    fs::remove_file(&base_out).expect("remove base output");
    compiler.compile_file(&m2).expect("compile m2");
    assert!(!base_out.exists());
    assert!(sb.out().join("m2").join("m2.jce.go").exists());
}
