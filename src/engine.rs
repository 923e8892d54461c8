use crate::error::Result;
use crate::lister::Lister;
use crate::local::LocalLister;
use crate::options::{Layout, MediaTreeOptions, Source};
use crate::remote::RemoteLister;
use crate::tree::{TreeBuilder, image_names};
use crate::types::Manifest;
#[cfg(feature = "logging")]
use tracing;

/// Generates a manifest using the lister selected by `options.source`.
pub fn generate(options: &MediaTreeOptions) -> Result<Manifest> {
    options.validate()?;
    match &options.source {
        Source::Local => generate_with(LocalLister::new(options)?, options),
        Source::Remote(remote) => {
            let lister = RemoteLister::new(remote, &options.exclude)?;
            generate_with(lister, options)
        }
    }
}

/// Generates a manifest from an arbitrary lister. `options.source` is ignored.
pub fn generate_with<L: Lister>(lister: L, options: &MediaTreeOptions) -> Result<Manifest> {
    #[cfg(feature = "logging")]
    tracing::info!("Scanning '{}' ({:?})", options.root, options.layout);
    if options.layout == Layout::Images {
        let names = image_names(&lister, &options.root)?;
        return Ok(Manifest::Images(names));
    }
    let builder = TreeBuilder::new(lister).public_base_url(options.public_base_url.clone());
    let (tree, flat_list) = builder.build(&options.root)?;
    Ok(Manifest::Tree { tree, flat_list })
}
