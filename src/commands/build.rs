//! Build the static site

use anyhow::Result;
use std::time::Instant;

use crate::generator::Generator;
use crate::Folio;

/// Collect the content and write every page to the public directory
pub fn run(folio: &Folio, clean: bool) -> Result<()> {
    let start = Instant::now();

    if clean {
        super::clean::run(folio)?;
    }

    let collection = folio.collect()?;
    let generator = Generator::new(folio)?;
    let pages = generator.generate(&collection)?;

    tracing::info!(
        "Built {} posts into {} pages in {:?}",
        collection.len(),
        pages,
        start.elapsed()
    );
    Ok(())
}
