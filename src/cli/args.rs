//! CLI argument definitions using clap
//!
//! Commands:
//! - tableset bucketize --config <path> [--bucket <shape>]
//! - tableset join --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::bucket::BucketShape;

/// tableset - in-memory tables, equi-joins and bipartite bucketing
#[derive(Parser, Debug)]
#[command(name = "tableset")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bucketize two tables and report the buckets
    Bucketize {
        /// Path to configuration file
        #[arg(long, default_value = "./bucketize.json")]
        config: PathBuf,

        /// Write this bucket (1:0, 0:1, 1:1, 1:n, n:1, n:m) instead of the summary
        #[arg(long)]
        bucket: Option<BucketShape>,
    },

    /// Join two tables and write the result
    Join {
        /// Path to configuration file
        #[arg(long, default_value = "./join.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucketize() {
        let cli = Cli::try_parse_from(["tableset", "bucketize", "--config", "b.json", "--bucket", "1:n"])
            .unwrap();
        match cli.command {
            Command::Bucketize { config, bucket } => {
                assert_eq!(config, PathBuf::from("b.json"));
                assert_eq!(bucket, Some(BucketShape::OneToMany));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_join_default_config() {
        let cli = Cli::try_parse_from(["tableset", "join"]).unwrap();
        match cli.command {
            Command::Join { config } => assert_eq!(config, PathBuf::from("./join.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_bucket_shape() {
        assert!(Cli::try_parse_from(["tableset", "bucketize", "--bucket", "2:2"]).is_err());
    }
}
