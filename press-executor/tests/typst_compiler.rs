//! Integration tests for `TypstCompiler` against a shell stand-in for `typst`.
//!
//! The stand-in is run as `sh -c <STUB> typst compile - - ...` by using the
//! global-argument slot, so it receives exactly the arguments real Typst
//! would. It accepts `--jobs N` and `--input key=value`, substitutes the
//! `name` input into the document, and fails on documents containing `#panic`.
//! The real compiler is exercised by the ignored test at the bottom.

use std::sync::Arc;
use std::time::Duration;

use press_core::{CompileRequest, CompileResult};
use press_executor::{ArtifactDigest, Compiler, CompilerConfig, ExecutorError, TypstCompiler};

const STUB: &str = r#"
[ "$1" = compile ] && [ "$2" = - ] && [ "$3" = - ] || { echo "usage: typst compile - -" >&2; exit 2; }
shift 3
name=
while [ $# -gt 0 ]; do
  case "$1" in
    --jobs) shift 2 ;;
    --input)
      case "$2" in name=*) name="${2#name=}" ;; esac
      shift 2 ;;
    *) echo "error: unexpected argument '$1'" >&2; exit 2 ;;
  esac
done
source=$(cat)
case "$source" in
  *'#panic'*) printf 'error: panicked\n  ┌─ <stdin>:1:1\n' >&2; exit 1 ;;
esac
printf '%%PDF-stub\n'
printf '%s\n' "$source" | sed "s/#sys.inputs.name/$name/g"
"#;

fn stub_compiler() -> TypstCompiler {
    let mut config = CompilerConfig::new("sh");
    config.global_args = vec!["-c".to_owned(), STUB.to_owned(), "typst".to_owned()];
    config.timeout = Duration::from_secs(30);
    TypstCompiler::new(config)
}

async fn compile(compiler: &TypstCompiler, request: &CompileRequest) -> CompileResult {
    compiler
        .compile(request)
        .await
        .unwrap_or_else(|e| panic!("compile error: {e}"))
}

#[tokio::test]
async fn input_binding_reaches_the_compiler() {
    let request = CompileRequest::new("Hello, #sys.inputs.name!")
        .with_variable("name", "World")
        .unwrap_or_else(|e| panic!("invalid request: {e}"));

    let compiler = stub_compiler();
    let invocation = compiler.invocation(&request);
    assert!(
        invocation.args.windows(2).any(|w| w[0] == "--input" && w[1] == "name=World"),
        "invocation must carry --input name=World, got {:?}",
        invocation.args
    );

    match compile(&compiler, &request).await {
        CompileResult::Success { artifact } => {
            assert_eq!(artifact, b"%PDF-stub\nHello, World!\n");
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn jobs_flag_is_accepted() {
    let request = CompileRequest::new("= Title")
        .with_jobs(2)
        .unwrap_or_else(|e| panic!("invalid request: {e}"));
    let result = compile(&stub_compiler(), &request).await;
    assert!(result.is_success(), "got {result:?}");
}

#[tokio::test]
async fn nonzero_exit_becomes_failure_with_diagnostics() {
    let result = compile(&stub_compiler(), &CompileRequest::new("#panic")).await;
    assert_eq!(
        result,
        CompileResult::Failure { diagnostics: "error: panicked\n  ┌─ <stdin>:1:1\n".to_owned() }
    );
}

#[tokio::test]
async fn empty_template_is_passed_through() {
    let result = compile(&stub_compiler(), &CompileRequest::new("")).await;
    match result {
        CompileResult::Success { artifact } => assert!(artifact.starts_with(b"%PDF-stub\n")),
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_compiler_is_an_error_not_a_failure() {
    let compiler = TypstCompiler::new(CompilerConfig::new("/nonexistent/press-test/typst"));
    let result = compiler.compile(&CompileRequest::new("Hello")).await;
    assert!(
        matches!(result, Err(ExecutorError::BinaryNotFound { .. })),
        "expected BinaryNotFound, got {result:?}"
    );
    assert!(compiler.health_check().await.is_err());
}

#[tokio::test]
async fn repeated_compilation_is_byte_identical() {
    let compiler = stub_compiler();
    let request = CompileRequest::new("#sys.inputs.name report")
        .with_variable("name", "Quarterly")
        .unwrap_or_else(|e| panic!("invalid request: {e}"));

    let first = compile(&compiler, &request).await;
    let second = compile(&compiler, &request).await;
    match (first, second) {
        (CompileResult::Success { artifact: a }, CompileResult::Success { artifact: b }) => {
            assert_eq!(ArtifactDigest::of(&a), ArtifactDigest::of(&b));
            assert_eq!(a, b);
        }
        other => panic!("expected two successes, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_requests_each_get_their_own_process() {
    let compiler = Arc::new(stub_compiler());
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8u32 {
        let compiler = Arc::clone(&compiler);
        tasks.spawn(async move {
            let request = CompileRequest::new("doc #sys.inputs.name")
                .with_variable("name", format!("n{i}"))
                .unwrap_or_else(|e| panic!("invalid request: {e}"));
            (i, compiler.compile(&request).await)
        });
    }
    while let Some(joined) = tasks.join_next().await {
        let (i, result) = joined.unwrap_or_else(|e| panic!("task panicked: {e}"));
        match result {
            Ok(CompileResult::Success { artifact }) => {
                let expected = format!("%PDF-stub\ndoc n{i}\n");
                assert_eq!(artifact, expected.as_bytes());
            }
            other => panic!("request {i}: expected Success, got {other:?}"),
        }
    }
}

/// Compiles a real document with the installed `typst` binary.
#[tokio::test]
#[ignore = "requires the typst binary in PATH"]
async fn real_typst_produces_pdf() {
    let compiler = TypstCompiler::with_defaults();
    let request = CompileRequest::new("Hello, #sys.inputs.name!")
        .with_variable("name", "World")
        .unwrap_or_else(|e| panic!("invalid request: {e}"));
    match compile(&compiler, &request).await {
        CompileResult::Success { artifact } => assert!(artifact.starts_with(b"%PDF-")),
        other => panic!("expected Success, got {other:?}"),
    }
}
