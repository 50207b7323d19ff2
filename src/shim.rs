// src/shim.rs

//! Interpreter shim for executing submitted code.
//!
//! The Rust side does NOT evaluate Python itself. Each execution spawns the
//! configured interpreter on this script inside a fresh temporary directory.
//!
//! Contract of the shim:
//! - Evaluate the code file in a brand new global namespace
//! - Capture everything written to stdout/stderr during evaluation
//! - Catch any fault (syntax errors included) as data
//! - Write EXACTLY ONE JSON document to the result file
//!
//! The result goes to a file rather than the process stdout, so code that
//! writes to the real stdout cannot corrupt it.
//!
//! The `restricted` builtins profile trims the namespace to a small set of
//! primitives. It is a convenience, not a security boundary: submitted code
//! runs with the privileges of the server process.

/// File name the shim is written to inside the execution directory.
pub const PYTHON_SHIM_NAME: &str = "mcp_exec_runner.py";

/// Python shim.
///
/// Usage (internal):
/// python mcp_exec_runner.py <code.py> <result.json> <restricted|full>
pub fn python_shim() -> &'static str {
    r#"# mcp_exec_runner.py
import builtins
import io
import json
import sys
import traceback
from contextlib import redirect_stderr, redirect_stdout

ALLOWED = [
    "print", "len", "str", "int", "float", "list", "dict", "tuple", "set",
    "range", "enumerate", "zip", "sum", "max", "min", "abs", "round",
    "sorted", "reversed", "type", "isinstance", "hasattr", "getattr",
    "setattr", "bool",
]

EXCEPTIONS = [
    "BaseException", "Exception", "ArithmeticError", "AssertionError",
    "AttributeError", "IndexError", "KeyError", "LookupError", "NameError",
    "NotImplementedError", "RuntimeError", "StopIteration", "TypeError",
    "ValueError", "ZeroDivisionError",
]


def build_namespace(profile):
    if profile == "full":
        return {"__builtins__": builtins, "__name__": "__main__"}

    allowed = {name: getattr(builtins, name) for name in ALLOWED + EXCEPTIONS}
    # `class` statements need the class builder.
    allowed["__build_class__"] = builtins.__build_class__
    return {"__builtins__": allowed, "__name__": "__main__"}


def clean(text):
    # Lone surrogates cannot be represented in a UTF-8 result document.
    return text.encode("utf-8", "backslashreplace").decode("utf-8")


def main():
    code_path, result_path, profile = sys.argv[1], sys.argv[2], sys.argv[3]

    with open(code_path, "r", encoding="utf-8") as f:
        code = f.read()

    out = io.StringIO()
    err = io.StringIO()
    error = None

    try:
        with redirect_stdout(out), redirect_stderr(err):
            exec(compile(code, "<code>", "exec"), build_namespace(profile))
    except BaseException as e:
        error = {
            "type": type(e).__name__,
            "message": clean(str(e)),
            "traceback": clean(traceback.format_exc()),
        }

    with open(result_path, "w", encoding="utf-8") as f:
        json.dump(
            {
                "stdout": clean(out.getvalue()),
                "stderr": clean(err.getvalue()),
                "error": error,
            },
            f,
        )


if __name__ == "__main__":
    main()
"#
}
