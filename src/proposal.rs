// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scaffolding of step definitions for missing steps.

use std::{
    collections::HashSet,
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
};

use lazy_regex::regex_replace_all;

/// Name of the written proposal file.
pub const PROPOSAL_FILE: &str = "steps_proposal.rs";

/// Rust keywords, usable as identifiers only in their raw `r#` form.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "do", "dyn", "else", "enum", "extern", "false", "final", "fn",
    "for", "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod",
    "move", "mut", "override", "priv", "pub", "ref", "return", "static",
    "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords which can't be raw identifiers either.
const RESERVED: &[&str] = &["crate", "self", "super", "_"];

/// Derives a function identifier out of a step `text`: non-word characters
/// become `_` and everything gets lowercased.
///
/// Keywords are returned in their raw `r#` form.
#[must_use]
pub fn identifier(text: &str) -> String {
    let mut ident = regex_replace_all!(r"\W", text, "_").to_lowercase();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Escapes a step `text` into a template matching exactly this text.
#[must_use]
pub fn template(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Renders a stub step definition per `missing` step text, in order.
///
/// Texts normalized into the same identifier get numeric suffixes.
#[must_use]
pub fn render(missing: &[String]) -> String {
    let mut used = HashSet::new();
    let mut out = String::new();
    for text in missing {
        let base = identifier(text);
        let ident = (1..)
            .map(|n| match n {
                1 => base.clone(),
                n => format!("{}_{n}", base.trim_start_matches("r#")),
            })
            .find(|ident| !used.contains(ident))
            .unwrap_or_default();
        _ = used.insert(ident.clone());

        // Writing into a `String` never fails.
        _ = write!(
            out,
            "/// {text}\n\
             pub fn {ident}() -> Step {{\n    \
                 Step::new({template:?}, |_call| {{\n        \
                     anyhow::bail!(\"Not implemented\")\n    \
                 }})\n\
             }}\n\n",
            template = template(text),
        );
    }
    out
}

/// Writes the [`PROPOSAL_FILE`] with a stub per `missing` step text into the
/// given `dir`, returning its path.
///
/// # Errors
///
/// If the file cannot be written.
pub fn generate(dir: &Path, missing: &[String]) -> io::Result<PathBuf> {
    let path = dir.join(PROPOSAL_FILE);
    fs::write(&path, render(missing))?;
    tracing::info!(
        path = %path.display(),
        "proposal for missing steps written",
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert_eq!(identifier("I have 3 and 4"), "i_have_3_and_4");
        assert_eq!(identifier("I'm \"done\"!"), "i_m__done__");
        assert_eq!(identifier("3 apples"), "_3_apples");
        assert_eq!(identifier("Loop"), "r#loop");
        assert_eq!(identifier("Self"), "self_");
        assert_eq!(identifier("!"), "__");
        assert_eq!(identifier(""), "__");
    }

    #[test]
    fn duplicate_identifiers_get_suffixes() {
        let out = render(&[
            "I fly!".into(),
            "I fly?".into(),
            "I fly.".into(),
            "Loop".into(),
            "loop".into(),
        ]);
        for ident in ["i_fly_", "i_fly__2", "i_fly__3", "r#loop", "loop_2"] {
            let signature = format!("pub fn {ident}() -> Step");
            assert!(out.contains(&signature), "{out}");
        }
    }

    #[test]
    fn braces_are_escaped_in_templates() {
        let out = render(&["I see {x} }".into()]);
        let stub = r#"Step::new("I see {{x}} }}", |_call| {"#;
        assert!(out.contains(stub), "{out}");

        let step = crate::Step::new(template("I see {x} }"), |_| Ok(()));
        let def = step.compile().unwrap();
        assert!(def.pattern().placeholders().is_empty());
        assert!(def.pattern().is_match("I see {x} }"));
    }

    #[test]
    fn render_keeps_order_and_escapes_text() {
        let out = render(&["I fly".into(), "I say \"hi\"".into()]);
        let fly = out.find("pub fn i_fly() -> Step").unwrap();
        let say = out.find("pub fn i_say__hi_() -> Step").unwrap();
        assert!(fly < say, "{out}");
        let stub = r#"Step::new("I say \"hi\"", |_call| {"#;
        assert!(out.contains(stub), "{out}");
        assert!(out.contains("anyhow::bail!(\"Not implemented\")"), "{out}");
    }

    #[test]
    fn generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), &["I fly".into()]).unwrap();
        assert_eq!(path, dir.path().join(PROPOSAL_FILE));
        assert!(fs::read_to_string(path).unwrap().contains("i_fly"));
    }
}
