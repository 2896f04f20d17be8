use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Flags that take no value.
const SWITCHES: &[&str] = &["-v", "--version", "--check-assets", "-h", "--help"];
const ASSETS_DIR: &str = "--assets-dir";

/// MarkWrite - a minimal WYSIWYG Markdown editor
#[derive(Parser, Debug)]
#[command(name = "markwrite", disable_version_flag = true)]
pub struct Cli {
    /// Markdown file to open
    pub path: Option<PathBuf>,

    /// Print version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Check that the bundled editor assets are present and exit
    #[arg(long)]
    pub check_assets: bool,

    /// Asset directory (overrides the assets.dir setting)
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments, setting aside any this program does not
    /// know (e.g. the `-psn_...` argument macOS adds when launching from
    /// Finder). Exits on errors in the known ones, like [`Parser::parse`].
    pub fn parse_known() -> (Self, Vec<OsString>) {
        Self::try_parse_known_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_known_from<I, T>(args: I) -> Result<(Self, Vec<OsString>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut known: Vec<OsString> = args.next().into_iter().collect();
        let mut unknown = Vec::new();
        let mut have_path = false;

        while let Some(arg) = args.next() {
            let text = arg.to_string_lossy().into_owned();
            if SWITCHES.contains(&text.as_str()) || text.starts_with("--assets-dir=") {
                known.push(arg);
            } else if text == ASSETS_DIR {
                known.push(arg);
                known.extend(args.next());
            } else if text.starts_with('-') && text.len() > 1 {
                unknown.push(arg);
            } else if !have_path {
                have_path = true;
                known.push(arg);
            } else {
                unknown.push(arg);
            }
        }

        Ok((Self::try_parse_from(known)?, unknown))
    }

    /// The positional path, if it names an existing file.
    pub fn existing_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) if path.is_file() => Some(path.clone()),
            Some(path) => {
                log::warn!("ignoring {}: not an existing file", path.display());
                None
            }
            None => None,
        }
    }
}
