fn main() {
    #[cfg(feature = "cli")]
    bytepatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("bytepatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
