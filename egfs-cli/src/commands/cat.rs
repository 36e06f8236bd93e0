use anyhow::Result;
use std::io::{self, Write};

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs, name: String) -> Result<()> {
    let mut store = super::open_store(global)?;
    let mut handle = store.open(&name)?;

    let mut stdout = io::stdout().lock();
    io::copy(&mut handle, &mut stdout)?;
    stdout.flush()?;
    handle.close()?;

    Ok(())
}
