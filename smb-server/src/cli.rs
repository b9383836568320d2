use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[clap(author, version)]
pub struct Arguments {
    /// Specify bot token.
    #[clap(short, long)]
    pub token: String,

    /// Specify path for config file.
    #[clap(short, long, default_value = "./config.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_required() {
        assert!(Arguments::try_parse_from(["smb-server"]).is_err());
    }

    #[test]
    fn parses_short_flags() {
        let args = Arguments::try_parse_from(["smb-server", "-t", "secret", "-c", "/etc/smb.toml"]).expect("valid args");
        assert_eq!(args.token, "secret");
        assert_eq!(args.config, PathBuf::from("/etc/smb.toml"));
    }

    #[test]
    fn config_has_default() {
        let args = Arguments::try_parse_from(["smb-server", "--token", "secret"]).expect("valid args");
        assert_eq!(args.config, PathBuf::from("./config.toml"));
    }
}
