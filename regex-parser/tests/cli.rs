use std::process::{Command, Output};

fn reg2dfa(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reg2dfa"))
        .args(args)
        .output()
        .unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[test]
fn test_success_exits_zero() {
    let output = reg2dfa(&["compile", "-e", "a"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(text(&output.stdout), "# a\nstart: 0\nend: 1\ncount: 2\n0--a-->1\n");
    assert_eq!(text(&output.stderr), "");
}

#[test]
fn test_failed_input_exits_one() {
    let output = reg2dfa(&["compile", "-q", "-e", "a|", "-e", "b"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        text(&output.stderr),
        "error: a|: malformed expression at 2: unexpected end of expression\n"
    );
    // the later input is still processed
    assert_eq!(text(&output.stdout), "# b\nstart: 0\nend: 1\ncount: 2\n0--b-->1\n");
}

#[test]
fn test_deep_nesting_exits_one() {
    let deep = format!("{}a{}", "(".repeat(20000), ")".repeat(20000));
    let output = reg2dfa(&["match", "-q", "-e", &deep, "a"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(text(&output.stderr).contains("nests deeper than"));
}

#[test]
fn test_usage_error_exits_two() {
    for args in [&["match", "abc"][..], &[][..], &["frobnicate"][..]] {
        let output = reg2dfa(args);
        assert_eq!(output.status.code(), Some(2), "{args:?}");
        assert!(output.stdout.is_empty(), "{args:?}");
    }
}
