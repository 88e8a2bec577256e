//! Check command

use std::process::ExitCode;

use anyhow::{Context, Result};
use camino::Utf8Path;
use lucy_image::{
    check_freshness, FreshnessReport, ImageRequest, LucyConfig, Platform, RegistryClient,
};
use tracing::debug;

use crate::cli::CheckArgs;
use crate::output;

/// Exit code reported when the image is stale
const EXIT_STALE: u8 = 2;

pub async fn run(
    args: CheckArgs,
    config_path: Option<&Utf8Path>,
    quiet: bool,
) -> Result<ExitCode> {
    let mut config = LucyConfig::load(config_path).context("Failed to load configuration")?;
    apply_platform_overrides(&mut config.platform, &args);
    debug!("Default platform: {}", config.platform);

    let client = RegistryClient::new(config).context("Failed to create registry client")?;

    let report = check_freshness(
        &client,
        ImageRequest::new(&args.image).with_token(args.image_token),
        ImageRequest::new(&args.base_image).with_token(args.base_image_token),
    )
    .await
    .with_context(|| format!("Failed to check {} against {}", args.image, args.base_image))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if !quiet {
            for verdict in &report.platforms {
                output::platform_verdict(verdict);
            }
        }
        println!("{}", report.overall);
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// `--os`, `--arch`, `--os-version` and `--variant` replace the matching
/// parts of the configured platform
fn apply_platform_overrides(platform: &mut Platform, args: &CheckArgs) {
    if let Some(os) = &args.os {
        platform.os = os.clone();
    }
    if let Some(arch) = &args.arch {
        platform.architecture = arch.clone();
    }
    if let Some(os_version) = &args.os_version {
        platform.os_version = Some(os_version.clone());
    }
    if let Some(variant) = &args.variant {
        platform.variant = Some(variant.clone());
    }
}

fn exit_status(report: &FreshnessReport) -> u8 {
    if report.is_fresh() {
        0
    } else {
        EXIT_STALE
    }
}
