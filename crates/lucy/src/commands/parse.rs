//! Parse command

use crate::cli::ParseArgs;
use crate::output;
use anyhow::Result;
use lucy_image::ImageReference;

pub fn run(args: ParseArgs) -> Result<()> {
    let reference = ImageReference::parse(&args.image);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reference)?);
        return Ok(());
    }

    println!("{}", reference);
    output::kv("Registry", &reference.registry);
    output::kv("Repository", &reference.repository);
    output::kv("Tag", reference.tag.as_deref().unwrap_or("-"));
    output::kv("Digest", reference.digest.as_deref().unwrap_or("-"));

    if reference.selector().is_none() {
        output::warning(&format!(
            "{} does not default to latest; add a tag or digest",
            reference.registry
        ));
    }

    Ok(())
}
