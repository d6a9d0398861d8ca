//! `gwalink init`: write a starter `gwalink.toml`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gwalink_schema::Layer;

use crate::manifest::{GwalinkConfig, CONFIG_FILE};

pub fn run(dir: &Path, layer: Layer) -> Result<()> {
    create_config(dir, layer)?;
    println!("Created {}", dir.join(CONFIG_FILE).display());
    Ok(())
}

pub(crate) fn create_config(dir: &Path, layer: Layer) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    fs::write(&path, GwalinkConfig::template(layer))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
