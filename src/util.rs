use chrono::NaiveDate;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// `YYYY-MM-DD`, the stamp used in artifact names and mail subjects.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `<dir>/<stem>_<YYYY-MM-DD>.<ext>`
pub fn artifact_path(dir: &Path, stem: &str, date: NaiveDate, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", stem, date_stamp(date), ext))
}

/// Hand a file to the desktop's default viewer. Failures are only logged.
pub fn open_in_viewer(path: &Path) {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    match command.arg(path).spawn() {
        Ok(_) => info!("Opened {}", path.display()),
        Err(e) => warn!("Could not open {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_embed_the_date() {
        let date = NaiveDate::from_ymd_opt(2021, 8, 10).unwrap();
        assert_eq!(date_stamp(date), "2021-08-10");
        assert_eq!(
            artifact_path(Path::new("stockGraphs"), "Lumber_Stock_Prices", date, "png"),
            PathBuf::from("stockGraphs/Lumber_Stock_Prices_2021-08-10.png")
        );
    }
}
