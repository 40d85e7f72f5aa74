//! Extension-based file classification.
//!
//! # Responsibility
//! - Map a file extension to its last-known file type, the build phase it
//!   is attached to, and the search-path setting absolute adds update.
//!
//! # Invariants
//! - The extension table is closed; unknown extensions are reported, never
//!   guessed, unless the caller opts into the generic-resource fallback.
//! - Matching ignores ASCII case.

use crate::model::object::PhaseKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Build setting receiving framework directories.
pub const FRAMEWORK_SEARCH_PATHS: &str = "FRAMEWORK_SEARCH_PATHS";
/// Build setting receiving library directories.
pub const LIBRARY_SEARCH_PATHS: &str = "LIBRARY_SEARCH_PATHS";
/// Build setting receiving header directories.
pub const HEADER_SEARCH_PATHS: &str = "HEADER_SEARCH_PATHS";

/// Build-file attribute marking a weakly linked binary.
pub const ATTRIBUTE_WEAK: &str = "Weak";
/// Build-file attribute signing an embedded binary on copy.
pub const ATTRIBUTE_CODE_SIGN_ON_COPY: &str = "CodeSignOnCopy";
/// Build-file attribute stripping headers from an embedded framework.
pub const ATTRIBUTE_REMOVE_HEADERS_ON_COPY: &str = "RemoveHeadersOnCopy";

/// File type used by the generic-resource fallback.
pub const FALLBACK_FILE_TYPE: &str = "text";

/// Which search-path setting an absolute add of this type updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPathKind {
    Framework,
    Library,
    Header,
}

impl SearchPathKind {
    pub fn setting_name(self) -> &'static str {
        match self {
            Self::Framework => FRAMEWORK_SEARCH_PATHS,
            Self::Library => LIBRARY_SEARCH_PATHS,
            Self::Header => HEADER_SEARCH_PATHS,
        }
    }
}

/// Classification of one file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileClass {
    /// `lastKnownFileType` written on the file reference.
    pub file_type: &'static str,
    /// Phase new build files are attached to; `None` means no build file.
    pub phase: Option<PhaseKind>,
    /// Search-path setting updated by absolute adds.
    pub search_path: Option<SearchPathKind>,
    /// Whether the file can additionally be embedded via a copy-files phase.
    pub embeddable: bool,
}

impl FileClass {
    const fn new(file_type: &'static str, phase: Option<PhaseKind>) -> Self {
        Self {
            file_type,
            phase,
            search_path: None,
            embeddable: false,
        }
    }

    fn searched(mut self, kind: SearchPathKind) -> Self {
        self.search_path = Some(kind);
        self
    }

    fn embeddable(mut self) -> Self {
        self.embeddable = true;
        self
    }

    /// Generic-resource classification used for unknown extensions.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_FILE_TYPE, Some(PhaseKind::Resources))
    }

    /// Default `ATTRIBUTES` for the main build file.
    pub fn default_attributes(&self, weak: bool) -> Vec<&'static str> {
        if weak && self.phase == Some(PhaseKind::Frameworks) {
            vec![ATTRIBUTE_WEAK]
        } else {
            Vec::new()
        }
    }

    /// `ATTRIBUTES` for the copy-files build file of an embedded binary.
    pub fn embed_attributes(&self, code_sign_on_copy: bool) -> Vec<&'static str> {
        if code_sign_on_copy {
            vec![ATTRIBUTE_CODE_SIGN_ON_COPY, ATTRIBUTE_REMOVE_HEADERS_ON_COPY]
        } else {
            vec![ATTRIBUTE_REMOVE_HEADERS_ON_COPY]
        }
    }
}

static FILE_CLASSES: Lazy<HashMap<&'static str, FileClass>> = Lazy::new(|| {
    use PhaseKind::{Frameworks, Resources, Sources};

    let sources = |file_type: &'static str| FileClass::new(file_type, Some(Sources));
    let resources = |file_type: &'static str| FileClass::new(file_type, Some(Resources));
    let reference_only = |file_type: &'static str| FileClass::new(file_type, None);

    HashMap::from([
        // Compiled sources.
        ("c", sources("sourcecode.c.c")),
        ("cc", sources("sourcecode.cpp.cpp")),
        ("cpp", sources("sourcecode.cpp.cpp")),
        ("cxx", sources("sourcecode.cpp.cpp")),
        ("m", sources("sourcecode.c.objc")),
        ("mm", sources("sourcecode.cpp.objcpp")),
        ("swift", sources("sourcecode.swift")),
        ("s", sources("sourcecode.asm")),
        ("metal", sources("sourcecode.metal")),
        ("xcdatamodeld", sources("wrapper.xcdatamodel")),
        ("mlmodel", sources("file.mlmodel")),
        ("intentdefinition", sources("file.intentdefinition")),
        // Linked binaries.
        (
            "framework",
            FileClass::new("wrapper.framework", Some(Frameworks))
                .searched(SearchPathKind::Framework)
                .embeddable(),
        ),
        (
            "xcframework",
            FileClass::new("wrapper.xcframework", Some(Frameworks))
                .searched(SearchPathKind::Framework)
                .embeddable(),
        ),
        (
            "a",
            FileClass::new("archive.ar", Some(Frameworks)).searched(SearchPathKind::Library),
        ),
        (
            "dylib",
            FileClass::new("compiled.mach-o.dylib", Some(Frameworks))
                .searched(SearchPathKind::Library),
        ),
        (
            "tbd",
            FileClass::new("sourcecode.text-based-dylib-definition", Some(Frameworks))
                .searched(SearchPathKind::Library),
        ),
        // Headers live in the tree only.
        (
            "h",
            reference_only("sourcecode.c.h").searched(SearchPathKind::Header),
        ),
        (
            "hh",
            reference_only("sourcecode.cpp.h").searched(SearchPathKind::Header),
        ),
        (
            "hpp",
            reference_only("sourcecode.cpp.h").searched(SearchPathKind::Header),
        ),
        ("pch", reference_only("sourcecode.c.h")),
        ("modulemap", reference_only("sourcecode.module-map")),
        // Project plumbing.
        ("xcconfig", reference_only("text.xcconfig")),
        ("entitlements", reference_only("text.plist.entitlements")),
        ("xcodeproj", reference_only("wrapper.pb-project")),
        ("app", reference_only("wrapper.application")),
        ("appex", reference_only("wrapper.app-extension")),
        // Bundled resources.
        ("bundle", resources("wrapper.plug-in")),
        ("xcassets", resources("folder.assetcatalog")),
        ("storyboard", resources("file.storyboard")),
        ("xib", resources("file.xib")),
        ("strings", resources("text.plist.strings")),
        ("stringsdict", resources("text.plist.stringsdict")),
        ("plist", resources("text.plist.xml")),
        ("json", resources("text.json")),
        ("xml", resources("text.xml")),
        ("html", resources("text.html")),
        ("css", resources("text.css")),
        ("js", resources("sourcecode.javascript")),
        ("txt", resources("text")),
        ("md", resources("net.daringfireball.markdown")),
        ("sh", resources("text.script.sh")),
        ("png", resources("image.png")),
        ("jpg", resources("image.jpeg")),
        ("jpeg", resources("image.jpeg")),
        ("gif", resources("image.gif")),
        ("pdf", resources("image.pdf")),
        ("svg", resources("image.svg")),
        ("ttf", resources("file")),
        ("otf", resources("file")),
        ("mp3", resources("audio.mp3")),
        ("wav", resources("audio.wav")),
        ("caf", resources("file")),
        ("mp4", resources("video.mp4")),
        ("mov", resources("video.quicktime")),
        ("zip", resources("archive.zip")),
    ])
});

/// Classifies a file by extension (without the dot).
///
/// Returns `None` for extensions outside the table.
pub fn classify(extension: &str) -> Option<FileClass> {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    FILE_CLASSES.get(normalized.as_str()).copied()
}

/// Lists every known extension, sorted.
pub fn known_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = FILE_CLASSES.keys().copied().collect();
    extensions.sort_unstable();
    extensions
}
