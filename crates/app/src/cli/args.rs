pub use clap::Parser;

use url::Url;

pub const DEFAULT_REMOTE: &str = "https://git-share.artelin.dev";

#[derive(Parser, Debug)]
#[command(name = "git-share", version)]
#[command(about = "Share a payload once, end-to-end encrypted, through an untrusted relay")]
pub struct Args {
    /// Relay to send to or receive from
    #[arg(long, global = true, env = "GIT_SHARE_SERVER", default_value = DEFAULT_REMOTE)]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote() {
        let args = Args::try_parse_from(["git-share", "version"]).unwrap();
        // GIT_SHARE_SERVER may be set in the environment running the tests
        if std::env::var_os("GIT_SHARE_SERVER").is_none() {
            assert_eq!(args.remote.as_str(), "https://git-share.artelin.dev/");
        }
    }

    #[test]
    fn test_remote_flag_is_global() {
        let args =
            Args::try_parse_from(["git-share", "health", "--remote", "http://localhost:3141"])
                .unwrap();
        assert_eq!(args.remote.as_str(), "http://localhost:3141/");
    }

    #[test]
    fn test_receive_accepts_split_code() {
        let args = Args::try_parse_from([
            "git-share", "receive", "k7Xm9pQ2wR", "acid", "bolt", "cafe", "dune",
        ])
        .unwrap();
        match args.command {
            crate::Command::Receive(op) => assert_eq!(op.code.len(), 5),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_receive_requires_code() {
        assert!(Args::try_parse_from(["git-share", "receive"]).is_err());
    }

    #[test]
    fn test_send_sources() {
        let args = Args::try_parse_from(["git-share", "send", "HEAD~3.."]).unwrap();
        match args.command {
            crate::Command::Send(op) => {
                assert_eq!(op.revision.as_deref(), Some("HEAD~3.."));
                assert!(!op.staged);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Args::try_parse_from(["git-share", "send", "--staged"]).is_ok());
        assert!(Args::try_parse_from(["git-share", "send", "--staged", "HEAD"]).is_err());
        assert!(Args::try_parse_from(["git-share", "send", "--input", "a.diff", "HEAD"]).is_err());
        assert!(Args::try_parse_from(["git-share", "send", "--stdin", "--staged"]).is_err());
    }

    #[test]
    fn test_receive_targets() {
        let args =
            Args::try_parse_from(["git-share", "receive", "abc-acid-bolt-cafe-dune", "--commit"])
                .unwrap();
        match args.command {
            crate::Command::Receive(op) => {
                assert!(op.commit);
                assert!(op.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Args::try_parse_from(["git-share", "receive", "abc-x", "--commit", "-o", "a"]).is_err());
        assert!(Args::try_parse_from(["git-share", "receive", "abc-x", "--mode", "append"]).is_err());
        assert!(
            Args::try_parse_from(["git-share", "receive", "abc-x", "-o", "a", "--mode", "append"])
                .is_ok()
        );
    }
}
