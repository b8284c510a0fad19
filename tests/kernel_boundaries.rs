//! Source-level checks that keep kernel policies pure and the dispatcher the
//! only writer of the outbox and task tables.

use std::fs;
use std::path::{Path, PathBuf};

const POLICY_FORBIDDEN: &[&str] = &[
    "repository",
    "diesel",
    "schema::",
    "KernelWriter",
    // Policies read the clock only through `KernelSnapshot::now`.
    "::now()",
    "Utc::now",
    "Utc::today",
    "Local::now",
    "Local::today",
    "chrono::Local",
    "Instant",
    "SystemTime",
    "UNIX_EPOCH",
    "zmq",
    "std::fs",
    "std::net",
    "reqwest",
];

const WRITER_OPERATIONS: &[&str] = &["enqueue_outbox_events", "create_kernel_tasks"];

/// Files allowed to name the kernel writer operations.
const WRITER_ALLOWED: &[&str] = &[
    "src/kernel/dispatcher.rs",
    "src/repository/mod.rs",
    "src/repository/kernel.rs",
    "src/repository/mock.rs",
];

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).expect("readable dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Source with `#[cfg(test)]` modules cut off; tests may use whatever they like.
fn production_source(path: &Path) -> String {
    let source = fs::read_to_string(path).expect("readable source");
    match source.find("#[cfg(test)]") {
        Some(idx) => source[..idx].to_string(),
        None => source,
    }
}

fn relative(path: &Path) -> String {
    path.strip_prefix(crate_root())
        .expect("path inside crate")
        .to_string_lossy()
        .replace('\\', "/")
}

fn forbidden_tokens(source: &str) -> Vec<&'static str> {
    POLICY_FORBIDDEN
        .iter()
        .copied()
        .filter(|token| source.contains(token))
        .collect()
}

#[test]
fn every_clock_source_is_forbidden() {
    for snippet in [
        "let now = chrono::Utc::now();",
        "let now = Local::now();",
        "let started = std::time::Instant::now();",
        "let now = NaiveDateTime::now();",
        "let epoch = SystemTime::now().duration_since(UNIX_EPOCH);",
        "let today = Utc::today();",
    ] {
        assert!(!forbidden_tokens(snippet).is_empty(), "`{snippet}` slipped through");
    }
    assert!(forbidden_tokens("let cutoff = snapshot.now - self.max_age;").is_empty());
}

#[test]
fn policies_have_no_side_effect_imports() {
    let mut files = Vec::new();
    rust_files(&crate_root().join("src/kernel/policies"), &mut files);
    assert!(!files.is_empty(), "policy sources not found");

    let mut violations = Vec::new();
    for file in &files {
        let source = production_source(file);
        for token in forbidden_tokens(&source) {
            violations.push(format!("{} uses `{token}`", relative(file)));
        }
    }

    assert!(violations.is_empty(), "impure policies: {violations:#?}");
}

#[test]
fn only_dispatcher_writes_outbox_and_tasks() {
    let mut files = Vec::new();
    rust_files(&crate_root().join("src"), &mut files);

    let mut violations = Vec::new();
    for file in &files {
        let name = relative(file);
        if WRITER_ALLOWED.contains(&name.as_str()) {
            continue;
        }
        let source = production_source(file);
        for op in WRITER_OPERATIONS {
            if source.contains(op) {
                violations.push(format!("{name} calls `{op}`"));
            }
        }
    }

    assert!(violations.is_empty(), "kernel writes outside the dispatcher: {violations:#?}");
}

#[test]
fn policies_only_emit_decisions() {
    let mut files = Vec::new();
    rust_files(&crate_root().join("src/kernel/policies"), &mut files);

    for file in files.iter().filter(|f| !f.ends_with("mod.rs")) {
        let source = production_source(file);
        assert!(
            source.contains("impl Policy for"),
            "{} does not implement Policy",
            relative(file)
        );
    }
}
