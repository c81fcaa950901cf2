use crate::platform::PlatformTag;
use crate::project::ProjectManifest;

/// Floor for `python_requires` when the project manifest does not pin
/// one. The wheels carry no Python code beyond a thin launcher, so any
/// maintained interpreter works.
pub const DEFAULT_REQUIRES_PYTHON: &str = ">=3.7";

/// Renders the `setup.py` driving the packaging backend for one staged
/// platform build. The descriptor pins the distribution name and
/// version, declares every collected `package_data` entry and binds
/// the console entry points.
pub fn render_setup_py(
    manifest: &ProjectManifest,
    tag: PlatformTag,
    package_data: &[String],
) -> String {
    let package = manifest.package_dir();
    let description = manifest
        .description
        .clone()
        .unwrap_or_else(|| format!("{} toolchain", manifest.name));

    let mut out = format!(
        r#"#!/usr/bin/env python3
"""
Setup script for the {name} package - {tag}
"""
from setuptools import setup, find_packages

def read_readme():
    try:
        with open("README.md", "r", encoding="utf-8") as f:
            return f.read()
    except Exception:
        return "{description}"

setup(
    name="{name}",
    version="{version}",
    description="{description}",
    long_description=read_readme(),
    long_description_content_type="text/markdown",
    author="{author}",
    author_email="{author_email}",
"#,
        name = py_str(&manifest.name),
        tag = tag,
        description = py_str(&description),
        version = py_str(&manifest.version),
        author = py_str(manifest.author().unwrap_or("")),
        author_email = py_str(manifest.author_email().unwrap_or("")),
    );

    if let Some(url) = manifest.homepage() {
        out.push_str(&format!("    url=\"{}\",\n", py_str(url)));
    }
    if let Some(license) = manifest.license_text() {
        out.push_str(&format!("    license=\"{}\",\n", py_str(license)));
    }

    out.push_str("    packages=find_packages(),\n");
    out.push_str("    package_data={\n");
    out.push_str(&format!("        \"{}\": [\n", py_str(&package)));
    for entry in package_data {
        out.push_str(&format!("            \"{}\",\n", py_str(entry)));
    }
    out.push_str("        ]\n");
    out.push_str("    },\n");
    out.push_str("    include_package_data=True,\n");

    out.push_str("    entry_points={\n");
    out.push_str("        \"console_scripts\": [\n");
    for (command, target) in manifest.entry_points() {
        out.push_str(&format!(
            "            \"{}={}\",\n",
            py_str(&command),
            py_str(&target)
        ));
    }
    out.push_str("        ],\n");
    out.push_str("    },\n");

    out.push_str(&format!(
        "    python_requires=\"{}\",\n",
        py_str(
            manifest
                .requires_python
                .as_deref()
                .unwrap_or(DEFAULT_REQUIRES_PYTHON)
        )
    ));
    out.push_str("    zip_safe=False,\n");
    out.push_str(")\n");

    out
}

/// Escapes a value for a double-quoted Python string literal.
fn py_str(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
