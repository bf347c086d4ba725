use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn spec_file(source: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc.x");
    fs::write(&path, source).unwrap();
    (dir, path)
}

fn xdrgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xdrgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_definitions() {
    let (_dir, path) = spec_file("struct S { int a; unsigned int b<>; };\n");
    let output = xdrgen(&["definitions", path.to_str().unwrap()]);

    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stdout(&output).contains("xdrgen_encode_S("));
    assert!(stdout(&output).contains("#define CALC_S_sz \\\n\t(XDR_int + XDR_unsigned_int)\n"));
    assert!(stderr(&output).is_empty(), "{}", stderr(&output));
}

#[test]
fn test_declarations_for_client() {
    let (_dir, path) = spec_file("const FOO = 42;\nstruct S { int a; };\n");
    let output = xdrgen(&["declarations", "--peer", "client", path.to_str().unwrap()]);

    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stdout(&output).contains("#include <linux/sunrpc/clnt.h>\n"));
    assert!(stdout(&output).contains("bool xdrgen_decode_S(struct xdr_stream *xdr, struct S *ptr);\n"));
}

#[test]
fn test_undefined_type() {
    let (_dir, path) = spec_file("struct S {\n    T t;\n};\n");
    let output = xdrgen(&["definitions", path.to_str().unwrap()]);

    assert_eq!(Some(1), output.status.code());
    assert!(stdout(&output).is_empty(), "{}", stdout(&output));
    assert!(stderr(&output).contains(":2:5: semantic error\nUndefined type 'T'\n    T t;\n    ^"), "{}", stderr(&output));
}

#[test]
fn test_truncated_struct() {
    let (_dir, path) = spec_file("struct S {\n");
    let output = xdrgen(&["lint", path.to_str().unwrap()]);

    assert_eq!(Some(1), output.status.code());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("calc.x:2:1: parse error\nUnexpected end of file"), "{}", stderr(&output));
}

#[test]
fn test_lint_prints_nothing() {
    let (_dir, path) = spec_file("const FOO = 42;\n");
    let output = xdrgen(&["lint", path.to_str().unwrap()]);

    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_idempotent() {
    let (_dir, path) = spec_file("enum color { RED = 0, GREEN = 1 };\ntypedef color palette<8>;\n");
    let first = xdrgen(&["definitions", "--annotate", path.to_str().unwrap()]);
    let second = xdrgen(&["definitions", "--annotate", path.to_str().unwrap()]);

    assert_eq!(Some(0), first.status.code(), "{}", stderr(&first));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.x");
    let output = xdrgen(&["definitions", path.to_str().unwrap()]);

    assert_eq!(Some(1), output.status.code());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).starts_with(&format!("xdrgen: {}: ", path.display())), "{}", stderr(&output));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let (_dir, path) = spec_file("const FOO = 42;\n");
    let output = xdrgen(&["definitions", "--verbose", path.to_str().unwrap()]);

    assert_eq!(Some(0), output.status.code());
    assert!(!stderr(&output).is_empty());
    assert!(stdout(&output).starts_with("/* Generated by xdrgen."), "{}", stdout(&output));
}
