//! End-to-end interpretation of small source trees on disk

use cmake_parser::cmake::{CMakeParser, MessageMode, ParseOutcome, TargetKind};
use cmake_parser::config::Settings;
use cmake_parser::parsing::ErrorKind;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Source tree from `(relative path, contents)` pairs
fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.model.import_environment = false;
    settings
}

fn run(dir: &Path) -> ParseOutcome {
    CMakeParser::new(settings()).parse(dir, dir.join("build"))
}

#[test]
fn test_project_version_components() {
    let dir = tree(&[(
        "CMakeLists.txt",
        "cmake_minimum_required(VERSION 3.10)\n\
         project(Foo VERSION 1.2.3.4 DESCRIPTION \"d\")\n",
    )]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);

    let model = &outcome.model;
    assert_eq!(model.get_variable("CMAKE_MINIMUM_REQUIRED_VERSION"), "3.10");
    assert_eq!(model.get_variable("PROJECT_NAME"), "Foo");
    assert_eq!(model.get_project("Foo").unwrap().version(), "1.2.3.4");
    assert_eq!(model.get_variable("PROJECT_VERSION"), "1.2.3.4");
    assert_eq!(model.get_variable("PROJECT_VERSION_MAJOR"), "1");
    assert_eq!(model.get_variable("PROJECT_VERSION_MINOR"), "2");
    assert_eq!(model.get_variable("PROJECT_VERSION_PATCH"), "3");
    assert_eq!(model.get_variable("PROJECT_VERSION_TWEAK"), "4");
    assert_eq!(model.get_variable("Foo_DESCRIPTION"), "d");
    assert_eq!(model.get_variable("CMAKE_PROJECT_NAME"), "Foo");
    assert_eq!(model.projects().len(), 1);
}

#[test]
fn test_quoted_list_value_is_kept_whole() {
    let dir = tree(&[("CMakeLists.txt", "set(X \"a;b;c\")\nset(Y ${X} d)\n")]);
    let outcome = run(dir.path());
    assert!(outcome.success);
    assert_eq!(outcome.model.get_variable("X"), "a;b;c");
    assert_eq!(outcome.model.get_variable("Y"), "a;b;c;d");
}

#[test]
fn test_accumulated_sources_feed_a_target() {
    let dir = tree(&[(
        "CMakeLists.txt",
        "project(P)\n\
         set(SRCS ${SRCS} a.c)\n\
         set(SRCS ${SRCS} b.c)\n\
         add_executable(app ${SRCS} ${NO_EXTRA_SOURCES} \"c d.c\")\n\
         message(${NO_MODE} \"\\${SRCS} is ${SRCS}\")\n",
    )]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);

    let model = &outcome.model;
    assert_eq!(model.get_variable("SRCS"), "a.c;b.c");
    let (_, app) = model.find_target("app").unwrap();
    assert_eq!(app.sources(), ["a.c", "b.c", "c d.c"]);

    let messages = model.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].mode, MessageMode::Notice);
    assert_eq!(messages[0].text, "${SRCS} is a.c;b.c");
}

#[test]
fn test_status_message_recorded() {
    let dir = tree(&[("CMakeLists.txt", "message(STATUS \"hello \" world)\n")]);
    let outcome = run(dir.path());
    assert!(outcome.success);

    let messages = outcome.model.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].mode, MessageMode::Status);
    assert_eq!(messages[0].text, "hello world");
    assert_eq!(messages[0].location.position(), (1, 1));
}

#[test]
fn test_unknown_message_mode_fails() {
    let dir = tree(&[("CMakeLists.txt", "message(BOGUS \"text\")\nset(AFTER 1)\n")]);
    let outcome = run(dir.path());
    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        outcome.errors[0].kind,
        ErrorKind::InvalidMessageMode(ref mode) if mode == "BOGUS"
    ));
    assert_eq!(outcome.model.get_variable("AFTER"), "");
}

#[test]
fn test_subdirectory_scope_is_isolated() {
    let dir = tree(&[
        ("CMakeLists.txt", "set(X root)\nadd_subdirectory(sub)\n"),
        ("sub/CMakeLists.txt", "set(Y 1)\nset(SEEN ${X})\nset(SEEN ${SEEN} PARENT_SCOPE)\n"),
    ]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);

    let model = &outcome.model;
    assert_eq!(model.directory_depth(), 1);
    assert_eq!(model.find_variable("Y"), None);
    assert_eq!(model.get_variable("SEEN"), "root");
    assert_eq!(model.directories().len(), 2);
}

#[test]
fn test_child_directory_variables() {
    let dir = tree(&[
        ("CMakeLists.txt", "add_subdirectory(sub)\n"),
        (
            "sub/CMakeLists.txt",
            "set(SRC ${CMAKE_CURRENT_SOURCE_DIR} PARENT_SCOPE)\n\
             set(BIN ${CMAKE_CURRENT_BINARY_DIR} PARENT_SCOPE)\n\
             set(PARENT ${CMAKE_PARENT_LIST_FILE} PARENT_SCOPE)\n",
        ),
    ]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);

    let model = &outcome.model;
    let root = dir.path();
    assert_eq!(model.get_variable("SRC"), root.join("sub").display().to_string());
    assert_eq!(
        model.get_variable("BIN"),
        root.join("build").join("sub").display().to_string()
    );
    assert_eq!(
        model.get_variable("PARENT"),
        root.join("CMakeLists.txt").display().to_string()
    );
    assert_eq!(
        model.get_variable("CMAKE_CURRENT_SOURCE_DIR"),
        root.display().to_string()
    );
}

#[test]
fn test_nested_subdirectories_restore_depth() {
    let dir = tree(&[
        ("CMakeLists.txt", "add_subdirectory(a)\nset(DONE yes)\n"),
        ("a/CMakeLists.txt", "add_subdirectory(b)\n"),
        ("a/b/CMakeLists.txt", "set(LEAF 1 PARENT_SCOPE)\n"),
    ]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);
    assert_eq!(outcome.model.directory_depth(), 1);
    assert_eq!(outcome.model.directories().len(), 3);
    assert_eq!(outcome.model.get_variable("DONE"), "yes");
    assert_eq!(outcome.model.find_variable("LEAF"), None);
}

#[test]
fn test_failing_subdirectory_restores_depth() {
    let dir = tree(&[
        ("CMakeLists.txt", "add_subdirectory(a)\nset(AFTER yes)\n"),
        ("a/CMakeLists.txt", "add_subdirectory(b)\n"),
        ("a/b/CMakeLists.txt", "message(FATAL_ERROR \"stop\")\n"),
    ]);
    let outcome = run(dir.path());
    assert!(!outcome.success);
    assert_eq!(outcome.model.directory_depth(), 1);
    assert_eq!(outcome.model.get_variable("AFTER"), "");

    // the fatal error plus one failure per enclosing add_subdirectory
    assert_eq!(outcome.errors.len(), 3);
    assert!(matches!(outcome.errors[0].kind, ErrorKind::Script(ref text) if text == "stop"));
}

#[test]
fn test_missing_subdirectory() {
    let dir = tree(&[("CMakeLists.txt", "add_subdirectory(nowhere)\n")]);
    let outcome = run(dir.path());
    assert!(!outcome.success);
    assert!(matches!(outcome.errors[0].kind, ErrorKind::MissingPath(_)));
    assert_eq!(outcome.model.directory_depth(), 1);
}

#[test]
fn test_recursion_limit() {
    let dir = tree(&[
        ("CMakeLists.txt", "add_subdirectory(a)\n"),
        ("a/CMakeLists.txt", "add_subdirectory(b)\n"),
        ("a/b/CMakeLists.txt", "add_subdirectory(c)\n"),
        ("a/b/c/CMakeLists.txt", "set(DEEP 1)\n"),
    ]);
    let mut settings = settings();
    settings.parser.max_directory_depth = 2;
    let outcome = CMakeParser::new(settings).parse(dir.path(), dir.path().join("build"));

    assert!(!outcome.success);
    assert!(matches!(outcome.errors[0].kind, ErrorKind::RecursionLimit(2)));
    assert_eq!(outcome.model.directory_depth(), 1);
}

#[test]
fn test_targets_across_directories() {
    let dir = tree(&[
        (
            "CMakeLists.txt",
            "project(Top)\nadd_executable(app main.c)\nadd_subdirectory(lib)\n",
        ),
        (
            "lib/CMakeLists.txt",
            "project(Lib)\nadd_library(core STATIC a.c b.c)\nadd_library(Lib::core ALIAS core)\n",
        ),
    ]);
    let outcome = run(dir.path());
    assert!(outcome.success, "{:?}", outcome.errors);

    let model = &outcome.model;
    let (owner, app) = model.find_target("app").unwrap();
    assert_eq!(owner.name(), "Top");
    assert_eq!(app.kind(), TargetKind::Executable);

    let (owner, core) = model.find_target("core").unwrap();
    assert_eq!(owner.name(), "Lib");
    assert_eq!(core.kind(), TargetKind::StaticLibrary);
    assert_eq!(core.sources(), ["a.c", "b.c"]);

    let (_, alias) = model.find_target("Lib::core").unwrap();
    assert_eq!(alias.alias_target(), Some("core"));

    let top = model.projects().find("Top");
    assert_eq!(model.get_project("Lib").unwrap().parent(), top);
    // back at the root, the current project is the top-level one again
    assert_eq!(model.get_variable("PROJECT_NAME"), "Top");
}

#[test]
fn test_duplicate_target_in_subdirectory() {
    let dir = tree(&[
        ("CMakeLists.txt", "project(Top)\nadd_executable(app main.c)\nadd_subdirectory(sub)\n"),
        ("sub/CMakeLists.txt", "add_executable(app other.c)\n"),
    ]);
    let outcome = run(dir.path());
    assert!(!outcome.success);
    assert!(matches!(outcome.errors[0].kind, ErrorKind::Semantic(_)));
}

#[test]
fn test_missing_root_script() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(dir.path());
    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(outcome.errors[0].kind, ErrorKind::Io { .. }));
}
