//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use anyhow::Result;
use licenser::templates::{DEFAULT_LICENSOR, HeaderRegistry};

/// Body shared by every Go fixture.
pub const GO_BODY: &str = "package main

import \"fmt\"

func main() {
\tfmt.Println(\"hello\")
}
";

/// Header lines of a built-in license, rendered for the default licensor.
pub fn header(label: &str) -> String {
  let registry = HeaderRegistry::builtin();
  let rendered = registry.get(label).expect("built-in license").render(DEFAULT_LICENSOR);
  String::from_utf8(rendered.to_bytes()).expect("utf-8 header")
}

/// A Go source file carrying the `label` header.
pub fn licensed_go(label: &str) -> String {
  format!("{}\n{GO_BODY}", header(label))
}

fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(path, contents)?;
  Ok(())
}

/// Builds the `testdata` tree used by the end-to-end tests under `root`.
///
/// ```text
/// testdata/
///   cloud/{doc.go (Cloud), wrong.go}
///   excludedpath/file.go
///   multilevel/{doc.go, main.go}
///   multilevel/sublevel/{autogen.go, doc.go, partial.go}
///   singlelevel/{doc.go, main.go, wrapper.go, zrapper.go (ASL2)}
///   x-pack/{doc.go (Elastic), wrong.go}
/// ```
pub fn create_fixture_tree(root: &Path) -> Result<()> {
  let unlicensed = [
    "testdata/cloud/wrong.go",
    "testdata/excludedpath/file.go",
    "testdata/multilevel/doc.go",
    "testdata/multilevel/main.go",
    "testdata/multilevel/sublevel/doc.go",
    "testdata/singlelevel/doc.go",
    "testdata/singlelevel/main.go",
    "testdata/x-pack/wrong.go",
  ];
  for path in unlicensed {
    write(root, path, GO_BODY)?;
  }

  write(
    root,
    "testdata/multilevel/sublevel/autogen.go",
    &format!("// Code generated by protoc-gen-go. DO NOT EDIT.\n\n{GO_BODY}"),
  )?;
  write(
    root,
    "testdata/multilevel/sublevel/partial.go",
    &format!("// Copyright 2017 Someone Else. All rights reserved.\n\n{GO_BODY}"),
  )?;
  write(
    root,
    "testdata/singlelevel/wrapper.go",
    &format!("// +build linux\n\n{GO_BODY}"),
  )?;
  write(root, "testdata/singlelevel/zrapper.go", &licensed_go("ASL2"))?;
  write(root, "testdata/x-pack/doc.go", &licensed_go("Elastic"))?;
  write(root, "testdata/cloud/doc.go", &licensed_go("Cloud"))?;
  write(root, "testdata/singlelevel/README.md", "# not a go file\n")?;
  Ok(())
}

/// A downloaded module in a fake module cache under `gopath`.
pub fn create_module(gopath: &Path, module_dir: &str, license: &str) -> Result<()> {
  write(&gopath.join("pkg/mod"), &format!("{module_dir}/LICENSE"), license)
}

pub const MIT_TEXT: &str = "MIT License

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND.
";

pub const APACHE_TEXT: &str = "                                 Apache License
                           Version 2.0, January 2004
                        http://www.apache.org/licenses/
";

/// A project with a `go.mod` requiring two modules, both present in a module
/// cache under `gopath`.
pub fn create_go_project(root: &Path, gopath: &Path) -> Result<()> {
  write(
    root,
    "go.mod",
    "module github.com/example/project

go 1.21

require (
\tgithub.com/BurntSushi/toml v1.3.2
\tgithub.com/pkg/errors v0.9.1 // indirect
)
",
  )?;
  write(root, "main.go", &licensed_go("ASL2"))?;
  create_module(gopath, "github.com/!burnt!sushi/toml@v1.3.2", MIT_TEXT)?;
  create_module(gopath, "github.com/pkg/errors@v0.9.1", APACHE_TEXT)?;
  Ok(())
}
