//! Record of declarations the builder dropped, grouped by reason.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::BuilderError;

/// Why a declaration was dropped. Declaration order is the order of the
/// groups in the written logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    NotInTypeSystem,
    GenerationDisabled,
    RedefinedToNotClass,
    UnmatchedReturnType,
    UnmatchedArgumentType,
    UnmatchedOperator,
    Deprecated,
}

impl RejectReason {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NotInTypeSystem => "Not in type system",
            Self::GenerationDisabled => "Generation disabled by type system",
            Self::RedefinedToNotClass => "Type redefined to not be a class",
            Self::UnmatchedReturnType => "Unmatched return type",
            Self::UnmatchedArgumentType => "Unmatched argument type",
            Self::UnmatchedOperator => "Unmatched operator",
            Self::Deprecated => "Deprecated",
        }
    }
}

/// One dropped declaration. Two rejections with the same reason and sort
/// key are the same rejection.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub reason: RejectReason,
    pub signature: String,
    pub sort_key: String,
    pub message: String,
}

impl Rejection {
    pub fn new(
        reason: RejectReason,
        signature: impl Into<String>,
        sort_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            reason,
            signature: signature.into(),
            sort_key: sort_key.into(),
            message: message.into(),
        }
    }
}

impl PartialEq for Rejection {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason && self.sort_key == other.sort_key
    }
}

impl Eq for Rejection {}

impl PartialOrd for Rejection {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rejection {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.reason
            .cmp(&other.reason)
            .then_with(|| self.sort_key.cmp(&other.sort_key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCategory {
    Classes,
    Enums,
    Functions,
    Fields,
}

impl RejectCategory {
    pub const ALL: [Self; 4] = [Self::Classes, Self::Enums, Self::Functions, Self::Fields];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classes => "classes",
            Self::Enums => "enums",
            Self::Functions => "functions",
            Self::Fields => "fields",
        }
    }

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Classes => "mjb_rejected_classes.log",
            Self::Enums => "mjb_rejected_enums.log",
            Self::Functions => "mjb_rejected_functions.log",
            Self::Fields => "mjb_rejected_fields.log",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RejectLog {
    classes: BTreeSet<Rejection>,
    enums: BTreeSet<Rejection>,
    functions: BTreeSet<Rejection>,
    fields: BTreeSet<Rejection>,
}

impl RejectLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejection; a repeat of an existing one is ignored.
    pub fn insert(&mut self, category: RejectCategory, rejection: Rejection) {
        tracing::trace!(
            ?category,
            reason = rejection.reason.title(),
            signature = %rejection.signature,
            "reject"
        );
        self.set_mut(category).insert(rejection);
    }

    const fn set(&self, category: RejectCategory) -> &BTreeSet<Rejection> {
        match category {
            RejectCategory::Classes => &self.classes,
            RejectCategory::Enums => &self.enums,
            RejectCategory::Functions => &self.functions,
            RejectCategory::Fields => &self.fields,
        }
    }

    fn set_mut(&mut self, category: RejectCategory) -> &mut BTreeSet<Rejection> {
        match category {
            RejectCategory::Classes => &mut self.classes,
            RejectCategory::Enums => &mut self.enums,
            RejectCategory::Functions => &mut self.functions,
            RejectCategory::Fields => &mut self.fields,
        }
    }

    /// Rejections of one category in log order.
    pub fn entries(&self, category: RejectCategory) -> impl Iterator<Item = &Rejection> {
        self.set(category).iter()
    }

    #[must_use]
    pub fn len(&self, category: RejectCategory) -> usize {
        self.set(category).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        RejectCategory::ALL.iter().all(|c| self.set(*c).is_empty())
    }

    /// Whether any rejection of `category` has this signature.
    #[must_use]
    pub fn contains(&self, category: RejectCategory, signature: &str) -> bool {
        self.set(category).iter().any(|r| r.signature == signature)
    }

    /// Text of one log file.
    #[must_use]
    pub fn render(&self, category: RejectCategory) -> String {
        let mut out = String::new();
        let mut last_reason = None;
        for rejection in self.set(category) {
            if last_reason != Some(rejection.reason) {
                if last_reason.is_some() {
                    out.push('\n');
                }
                let title = rejection.reason.title();
                let frame = "*".repeat(title.len());
                let _ = write!(out, "{frame}\n{title}\n{frame}\n\n");
                last_reason = Some(rejection.reason);
            }
            let _ = write!(out, " - {}", rejection.signature);
            if !rejection.message.is_empty() {
                let _ = write!(out, ": {}", rejection.message);
            }
            out.push('\n');
        }
        out
    }

    /// Write the four log files into `directory`, returning their paths.
    pub fn write_logs(&self, directory: &Path) -> Result<Vec<PathBuf>, BuilderError> {
        let mut written = Vec::with_capacity(RejectCategory::ALL.len());
        for category in RejectCategory::ALL {
            let path = directory.join(category.file_name());
            std::fs::write(&path, self.render(category)).map_err(|source| BuilderError::LogIo {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        tracing::debug!(directory = %directory.display(), "reject logs written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_are_framed_and_sorted() {
        let mut log = RejectLog::new();
        log.insert(
            RejectCategory::Functions,
            Rejection::new(RejectReason::UnmatchedReturnType, "Foo::b()", "Foo::b()", "no type"),
        );
        log.insert(
            RejectCategory::Functions,
            Rejection::new(RejectReason::NotInTypeSystem, "Foo::z()", "Foo::z()", ""),
        );
        log.insert(
            RejectCategory::Functions,
            Rejection::new(RejectReason::NotInTypeSystem, "Foo::a()", "Foo::a()", ""),
        );
        let expected = "\
******************
Not in type system
******************

 - Foo::a()
 - Foo::z()

*********************
Unmatched return type
*********************

 - Foo::b(): no type
";
        assert_eq!(log.render(RejectCategory::Functions), expected);
    }

    #[test]
    fn duplicates_collapse() {
        let mut log = RejectLog::new();
        for _ in 0..3 {
            log.insert(
                RejectCategory::Classes,
                Rejection::new(RejectReason::NotInTypeSystem, "Foo", "Foo", ""),
            );
        }
        assert_eq!(log.len(RejectCategory::Classes), 1);
    }

    #[test]
    fn empty_category_renders_empty() {
        assert_eq!(RejectLog::new().render(RejectCategory::Enums), "");
    }

    #[test]
    fn logs_land_in_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut log = RejectLog::new();
        log.insert(
            RejectCategory::Fields,
            Rejection::new(RejectReason::GenerationDisabled, "int Foo::d", "Foo::d", "rejected"),
        );
        let paths = log.write_logs(dir.path()).expect("write");
        assert_eq!(paths.len(), 4);
        let fields = std::fs::read_to_string(dir.path().join("mjb_rejected_fields.log")).expect("read");
        assert!(fields.contains(" - int Foo::d: rejected"));
    }
}
