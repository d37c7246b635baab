use anyhow::{Context, Result};
use log::info;
use std::env;
use std::path::Path;

use gedcom_fetch::logging;
use gedcom_fetch::{ExportQuery, FileFetcher, OutputTarget, Privacy};

const BASE_URL: &str = "http://BASE_URL/index.php?route=/webtrees/ExtendedImportExport";
const LOCAL_PATH: &str = "c:/temp/gedcom/";
const TREE: &str = "tree1";
const KEY: &str = "hYHBiZM9";
const FILE_NAME: &str = "export";

fn main() -> Result<()> {
    let executable = env::current_exe().context("Failed to locate executable")?;
    let log_file = logging::log_file_path(&executable);
    logging::init(&log_file)?;

    let executed_file = executable
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("Started: {}", executed_file);
    info!("Started: {}", executed_file);

    println!("Downloading: {}", BASE_URL);
    let query = ExportQuery::new(TREE)
        .key(KEY)
        .file(FILE_NAME)
        .privacy(Privacy::User);
    let target = OutputTarget::file(Path::new(LOCAL_PATH).join(query.local_file_name()));
    let spec = query.into_request(BASE_URL);

    let result = FileFetcher::new().download_file(&spec, &target);

    println!("Done");
    info!("Done");
    logging::shutdown();

    if result.is_err() {
        eprintln!("download failed, see {}", log_file.display());
        std::process::exit(1);
    }

    Ok(())
}
