use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Mesh shown when no path is given on the command line.
pub const DEFAULT_MESH_PATH: &str = "models/cube.obj";

const USAGE: &str = "Usage: phong-viewer [mesh.obj] [--summary-only]";

/// Options accepted by the `phong-viewer` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub mesh_path: PathBuf,
    /// Print what was loaded and exit without opening a window.
    pub summary_only: bool,
}

impl CliOptions {
    pub fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parses arguments that do not include the program name.
    pub fn parse_from<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mesh_path = None;
        let mut summary_only = false;
        for arg in args {
            let arg = arg.into();
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "-h" | "--help" => return Err(anyhow!(USAGE)),
                flag if flag.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {flag}. Expected --summary-only\n{USAGE}"
                    ));
                }
                _ if mesh_path.is_some() => {
                    return Err(anyhow!("Only one mesh path may be given\n{USAGE}"));
                }
                _ => mesh_path = Some(PathBuf::from(arg)),
            }
        }
        Ok(Self {
            mesh_path: mesh_path.unwrap_or_else(|| PathBuf::from(DEFAULT_MESH_PATH)),
            summary_only,
        })
    }
}
