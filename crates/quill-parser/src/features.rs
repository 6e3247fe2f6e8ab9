// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Grammar feature registry.
//!
//! A [`Features`] value is an immutable bitset consulted by the scanner and
//! parser to gate productions. It is `Copy`, so concurrent parses each own
//! their set. Feature names follow the `FEAT_*` convention used by callers
//! configuring the parser from strings (the CLI, fixture harnesses).
//!
//! ```rust
//! use quill_parser::Features;
//!
//! let features = Features::default().off(Features::JSX).on(Features::STRICT);
//! assert!(!features.contains(Features::JSX));
//!
//! let toggled = Features::default().with_toggles(["FEAT_POW=off"]).unwrap();
//! assert!(!toggled.contains(Features::POW));
//! ```

use bitflags::bitflags;

bitflags! {
    /// Named grammar features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// Parse the whole program as strict code.
        const STRICT = 1 << 0;
        /// Parse the program as an ES module.
        const MODULE = 1 << 1;
        /// Allow `await` at the top level.
        const GLOBAL_ASYNC = 1 << 2;
        /// `let` and `const` declarations.
        const LET_CONST = 1 << 3;
        /// Spread and rest elements.
        const SPREAD = 1 << 4;
        /// Async functions and `await`.
        const ASYNC_AWAIT = 1 << 5;
        /// `for await` loops.
        const ASYNC_ITERATION = 1 << 6;
        /// `async function*`.
        const ASYNC_GENERATOR = 1 << 7;
        /// The `**` operator.
        const POW = 1 << 8;
        /// The `??` operator.
        const NULLISH = 1 << 9;
        /// `&&=`, `||=` and `??=`.
        const LOGIC_ASSIGN = 1 << 10;
        /// `import(...)` expressions.
        const DYNAMIC_IMPORT = 1 << 11;
        /// U+2028 and U+2029 inside string literals.
        const JSON_SUPER_SET = 1 << 12;
        /// JSX elements and fragments.
        const JSX = 1 << 13;
        /// Namespaced JSX names (`ns:name`).
        const JSX_NS = 1 << 14;
        /// Optional chaining (`?.`).
        const OPT_EXPR = 1 << 15;
        /// BigInt literals.
        const BIGINT = 1 << 16;
        /// Numeric separators (`1_000`).
        const NUM_SEP = 1 << 17;
        /// Public class fields.
        const CLASS_PUB_FIELD = 1 << 18;
        /// Private class members (`#x`).
        const CLASS_PRIV = 1 << 19;
        /// `static { }` blocks in classes.
        const CLASS_STATIC_BLOCK = 1 << 20;
        /// `catch { }` without a binding.
        const OPTIONAL_CATCH_PARAM = 1 << 21;
        /// Invalid escapes in tagged templates produce `cooked: null`.
        const BAD_ESCAPE_IN_TAGGED_TPL = 1 << 22;
        /// `export * as ns from "m"`.
        const EXPORT_ALL_AS_NS = 1 << 23;
        /// `import.meta` and `new.target`.
        const META_PROPERTY = 1 << 24;
    }
}

/// Contract names of every feature, in declaration order.
const NAMES: &[(&str, Features)] = &[
    ("FEAT_STRICT", Features::STRICT),
    ("FEAT_MODULE", Features::MODULE),
    ("FEAT_GLOBAL_ASYNC", Features::GLOBAL_ASYNC),
    ("FEAT_LET_CONST", Features::LET_CONST),
    ("FEAT_SPREAD", Features::SPREAD),
    ("FEAT_ASYNC_AWAIT", Features::ASYNC_AWAIT),
    ("FEAT_ASYNC_ITERATION", Features::ASYNC_ITERATION),
    ("FEAT_ASYNC_GENERATOR", Features::ASYNC_GENERATOR),
    ("FEAT_POW", Features::POW),
    ("FEAT_NULLISH", Features::NULLISH),
    ("FEAT_LOGIC_ASSIGN", Features::LOGIC_ASSIGN),
    ("FEAT_DYNAMIC_IMPORT", Features::DYNAMIC_IMPORT),
    ("FEAT_JSON_SUPER_SET", Features::JSON_SUPER_SET),
    ("FEAT_JSX", Features::JSX),
    ("FEAT_JSX_NS", Features::JSX_NS),
    ("FEAT_OPT_EXPR", Features::OPT_EXPR),
    ("FEAT_BIGINT", Features::BIGINT),
    ("FEAT_NUM_SEP", Features::NUM_SEP),
    ("FEAT_CLASS_PUB_FIELD", Features::CLASS_PUB_FIELD),
    ("FEAT_CLASS_PRIV", Features::CLASS_PRIV),
    ("FEAT_CLASS_STATIC_BLOCK", Features::CLASS_STATIC_BLOCK),
    ("FEAT_OPTIONAL_CATCH_PARAM", Features::OPTIONAL_CATCH_PARAM),
    ("FEAT_BAD_ESCAPE_IN_TAGGED_TPL", Features::BAD_ESCAPE_IN_TAGGED_TPL),
    ("FEAT_EXPORT_ALL_AS_NS", Features::EXPORT_ALL_AS_NS),
    ("FEAT_META_PROPERTY", Features::META_PROPERTY),
];

/// A feature toggle string that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// The name is not a known `FEAT_*` flag.
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
    /// The value after `=` was not `on` or `off`.
    #[error("invalid toggle `{0}`, expected NAME=on or NAME=off")]
    InvalidToggle(String),
}

impl Default for Features {
    /// Every feature enabled: strict module code with JSX.
    fn default() -> Self {
        Features::all()
    }
}

impl Features {
    /// Returns a copy with `flag` enabled.
    pub fn on(self, flag: Features) -> Self {
        self | flag
    }

    /// Returns a copy with `flag` disabled.
    pub fn off(self, flag: Features) -> Self {
        self - flag
    }

    /// Looks up a flag by contract name. The `FEAT_` prefix is optional and
    /// matching ignores ASCII case.
    pub fn from_feature_name(name: &str) -> Option<Features> {
        let name = name.trim();
        NAMES.iter().find_map(|(full, flag)| {
            let short = &full["FEAT_".len()..];
            (full.eq_ignore_ascii_case(name) || short.eq_ignore_ascii_case(name)).then_some(*flag)
        })
    }

    /// Contract names of the enabled flags.
    pub fn feature_names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Every known contract name.
    pub fn all_feature_names() -> impl Iterator<Item = &'static str> {
        NAMES.iter().map(|(name, _)| *name)
    }

    /// Applies toggles of the form `FEAT_NAME=on`, `FEAT_NAME=off`, or a bare
    /// `FEAT_NAME` (meaning on).
    pub fn with_toggles<I, S>(self, toggles: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        toggles.into_iter().try_fold(self, |acc, toggle| {
            let toggle = toggle.as_ref();
            let (name, value) = match toggle.split_once('=') {
                Some((name, value)) => (name, value.trim()),
                None => (toggle, "on"),
            };
            let flag = Features::from_feature_name(name)
                .ok_or_else(|| FeatureError::UnknownFeature(name.trim().to_string()))?;
            tracing::trace!(feature = name.trim(), value, "feature toggle");
            match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Ok(acc.on(flag)),
                "off" | "false" | "0" => Ok(acc.off(flag)),
                _ => Err(FeatureError::InvalidToggle(toggle.to_string())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let features = Features::default();
        assert!(features.contains(Features::STRICT | Features::MODULE | Features::JSX));
        assert_eq!(features.feature_names().len(), NAMES.len());
    }

    #[test]
    fn test_on_off_are_pure() {
        let base = Features::default();
        let without = base.off(Features::POW);
        assert!(base.contains(Features::POW));
        assert!(!without.contains(Features::POW));
        assert!(without.on(Features::POW).contains(Features::POW));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Features::from_feature_name("FEAT_JSX_NS"), Some(Features::JSX_NS));
        assert_eq!(Features::from_feature_name("jsx_ns"), Some(Features::JSX_NS));
        assert_eq!(Features::from_feature_name("FEAT_NOPE"), None);
    }

    #[test]
    fn test_toggles() {
        let features = Features::default()
            .with_toggles(["FEAT_MODULE=off", "FEAT_STRICT=off", "FEAT_JSX"])
            .unwrap();
        assert!(!features.contains(Features::MODULE));
        assert!(!features.contains(Features::STRICT));
        assert!(features.contains(Features::JSX));
    }

    #[test]
    fn test_bad_toggles() {
        assert_eq!(
            Features::default().with_toggles(["FEAT_FOO=on"]),
            Err(FeatureError::UnknownFeature("FEAT_FOO".into()))
        );
        assert_eq!(
            Features::default().with_toggles(["FEAT_POW=maybe"]),
            Err(FeatureError::InvalidToggle("FEAT_POW=maybe".into()))
        );
    }

    #[test]
    fn test_names_cover_every_flag() {
        let union = NAMES.iter().fold(Features::empty(), |acc, (_, f)| acc | *f);
        assert_eq!(union, Features::all());
    }
}
