use clap::Parser;

/// Takes no arguments: locations come from the XMLORG_* environment
/// variables, defaulting to the pipeline's standard data directory.
#[derive(Parser)]
#[command(
    name = "xmlorg-health",
    about = "Daily health report for the XML Organizer processing pipeline",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\n",
        "Build Information:\n",
        "  Timestamp:         ", env!("VERGEN_BUILD_TIMESTAMP"), "\n",
        "  Target Triple:     ", env!("VERGEN_CARGO_TARGET_TRIPLE"), "\n",
        "\n",
        "Source Control:\n",
        "  Commit SHA:        ", env!("VERGEN_GIT_SHA"), "\n",
        "  Commit Timestamp:  ", env!("VERGEN_GIT_COMMIT_TIMESTAMP"), "\n",
        "  Branch:            ", env!("VERGEN_GIT_BRANCH"), "\n",
        "\n",
        "Compiler:\n",
        "  Rustc Version:     ", env!("VERGEN_RUSTC_SEMVER"), "\n",
        "  Rustc Channel:     ", env!("VERGEN_RUSTC_CHANNEL"), "\n",
        "  Host Triple:       ", env!("VERGEN_RUSTC_HOST_TRIPLE"), "\n"
    ),
    disable_help_subcommand = true
)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    xmlorg_health::logging::init();

    if let Err(e) = xmlorg_health::commands::health::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
