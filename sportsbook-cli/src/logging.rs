use std::io::Write;

use log::LevelFilter;

/// Install the stderr logger. `RUST_LOG` overrides the flag-derived level.
pub(crate) fn init(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if !verbose {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

/// Log an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}
