use tracing_subscriber::{fmt, EnvFilter};

/// ログ初期化（stderr出力）
///
/// `RUST_LOG` があればそれを優先。無ければ `warn`、`--verbose` 時は `ecopulse=debug`。
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("warn,ecopulse=debug,ecopulse_common=debug")
    } else {
        EnvFilter::new("warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false).to_string(), "warn");
        assert!(default_filter(true).to_string().contains("ecopulse=debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
