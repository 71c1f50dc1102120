//! Font discovery for the report and its charts.
//!
//! The report needs a proportional family for prose and a fixed-width family for the
//! plain-text tables. The bundled Roboto and RobotoMono files are searched for first;
//! when they cannot be found the system DejaVu (Linux) or Arial/Courier New (Windows)
//! families are used instead.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::warn;

/// Name of the bundled proportional font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Name of the bundled fixed-width font family.
pub const DEFAULT_FIXED_FONT_FAMILY_NAME: &str = "RobotoMono";

const LINUX_FONT_DIRECTORY: &str = "/usr/share/fonts/truetype/dejavu";

/// The four faces of one font family on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyFiles {
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl FamilyFiles {
    fn with_suffixes(directory: &Path, stem: &str, suffixes: [&str; 4]) -> Self {
        let path = |suffix: &str| directory.join(format!("{stem}{suffix}.ttf"));
        Self {
            regular: path(suffixes[0]),
            bold: path(suffixes[1]),
            italic: path(suffixes[2]),
            bold_italic: path(suffixes[3]),
        }
    }

    fn from_names(directory: &Path, names: [&str; 4]) -> Self {
        Self {
            regular: directory.join(names[0]),
            bold: directory.join(names[1]),
            italic: directory.join(names[2]),
            bold_italic: directory.join(names[3]),
        }
    }

    fn paths(&self) -> [&Path; 4] {
        [&self.regular, &self.bold, &self.italic, &self.bold_italic]
    }

    fn missing(&self) -> Vec<&Path> {
        self.paths()
            .into_iter()
            .filter(|path| !path.is_file())
            .collect()
    }

    fn load(&self) -> Result<FontFamily<FontData>, Error> {
        Ok(FontFamily {
            regular: load_font(&self.regular)?,
            bold: load_font(&self.bold)?,
            italic: load_font(&self.italic)?,
            bold_italic: load_font(&self.bold_italic)?,
        })
    }
}

/// Located font files for both report families.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFontFiles {
    pub description: String,
    pub bundled: bool,
    pub proportional: FamilyFiles,
    pub fixed: FamilyFiles,
}

impl ReportFontFiles {
    fn bundled(directory: &Path) -> Self {
        let suffixes = ["-Regular", "-Bold", "-Italic", "-BoldItalic"];
        Self {
            description: format!("bundled fonts in {}", directory.display()),
            bundled: true,
            proportional: FamilyFiles::with_suffixes(directory, DEFAULT_FONT_FAMILY_NAME, suffixes),
            fixed: FamilyFiles::with_suffixes(directory, DEFAULT_FIXED_FONT_FAMILY_NAME, suffixes),
        }
    }

    fn dejavu(directory: &Path) -> Self {
        let suffixes = ["", "-Bold", "-Oblique", "-BoldOblique"];
        Self {
            description: format!("DejaVu fonts in {}", directory.display()),
            bundled: false,
            proportional: FamilyFiles::with_suffixes(directory, "DejaVuSans", suffixes),
            fixed: FamilyFiles::with_suffixes(directory, "DejaVuSansMono", suffixes),
        }
    }

    fn windows(directory: &Path) -> Self {
        Self {
            description: format!("Windows fonts in {}", directory.display()),
            bundled: false,
            proportional: FamilyFiles::from_names(
                directory,
                ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"],
            ),
            fixed: FamilyFiles::from_names(
                directory,
                ["cour.ttf", "courbd.ttf", "couri.ttf", "courbi.ttf"],
            ),
        }
    }

    fn missing(&self) -> Vec<&Path> {
        let mut missing = self.proportional.missing();
        missing.extend(self.fixed.missing());
        missing
    }
}

/// Both report font families, ready to be added to a font cache.
pub struct ReportFonts {
    pub proportional: FontFamily<FontData>,
    pub fixed: FontFamily<FontData>,
}

fn bundled_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = explicit {
        if !path.as_os_str().is_empty() {
            candidates.push(path.to_path_buf());
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn system_candidates() -> Vec<ReportFontFiles> {
    let mut candidates = vec![ReportFontFiles::dejavu(Path::new(LINUX_FONT_DIRECTORY))];
    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env::var_os(var).filter(|value| !value.is_empty()) {
            candidates.push(ReportFontFiles::windows(&PathBuf::from(root).join("Fonts")));
        }
    }
    candidates
}

/// Finds the first complete set of report fonts.
///
/// `explicit` is searched before the directories next to the executable and the
/// crate manifest. System fonts are only used when no bundled set is complete.
pub fn locate_report_fonts(explicit: Option<&Path>) -> Result<ReportFontFiles, Error> {
    let mut attempts = Vec::new();

    let bundled = bundled_directory_candidates(explicit)
        .into_iter()
        .map(|directory| ReportFontFiles::bundled(&directory));
    for (index, candidate) in bundled.chain(system_candidates()).enumerate() {
        if candidate.missing().is_empty() {
            if !candidate.bundled {
                warn!(
                    "Bundled fonts unavailable; falling back to {}",
                    candidate.description
                );
            }
            return Ok(candidate);
        }

        let missing_list = candidate
            .missing()
            .iter()
            .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
            .collect::<Vec<_>>()
            .join(", ");
        attempts.push(format!(
            "{}. {} (missing [{}])",
            index + 1,
            candidate.description,
            missing_list
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate report fonts. Checked: {}. Copy Roboto and RobotoMono into assets/fonts or set BENCHMARK_REPORT_FONTS_DIR.",
            attempts.join("; ")
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts not found"),
    ))
}

fn load_font(path: &Path) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        Error::new(
            format!("Failed to load font at {}: {}", path.display(), err),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Loads the proportional and fixed-width families used by the report.
pub fn load_report_fonts(explicit: Option<&Path>) -> Result<ReportFonts, Error> {
    let files = locate_report_fonts(explicit)?;
    Ok(ReportFonts {
        proportional: files.proportional.load()?,
        fixed: files.fixed.load()?,
    })
}

/// Raw bytes of the regular proportional face, used to draw chart text.
pub fn chart_font_bytes(explicit: Option<&Path>) -> Result<Vec<u8>, Error> {
    let files = locate_report_fonts(explicit)?;
    std::fs::read(&files.proportional.regular).map_err(|err| {
        Error::new(
            format!(
                "Failed to read chart font {}",
                files.proportional.regular.display()
            ),
            err,
        )
    })
}

/// Indicates whether a complete set of report fonts can be found.
pub fn report_fonts_available(explicit: Option<&Path>) -> bool {
    locate_report_fonts(explicit).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_files_follow_family_naming() {
        let files = ReportFontFiles::bundled(Path::new("/fonts"));
        assert_eq!(
            files.proportional.bold_italic,
            PathBuf::from("/fonts/Roboto-BoldItalic.ttf")
        );
        assert_eq!(
            files.fixed.regular,
            PathBuf::from("/fonts/RobotoMono-Regular.ttf")
        );
    }

    #[test]
    fn dejavu_uses_oblique_faces() {
        let files = ReportFontFiles::dejavu(Path::new("/d"));
        assert_eq!(files.proportional.regular, PathBuf::from("/d/DejaVuSans.ttf"));
        assert_eq!(
            files.fixed.italic,
            PathBuf::from("/d/DejaVuSansMono-Oblique.ttf")
        );
    }

    #[test]
    fn explicit_directory_is_searched_first() {
        let dir = Path::new("/opt/report-fonts");
        let candidates = bundled_directory_candidates(Some(dir));
        assert_eq!(candidates.first().map(PathBuf::as_path), Some(dir));
    }

    #[test]
    fn empty_directory_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = ReportFontFiles::bundled(dir.path());
        assert_eq!(files.missing().len(), 8);
    }
}
