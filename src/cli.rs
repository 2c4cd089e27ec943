use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Build a One Second Everyday compilation from dated clip folders
#[derive(Parser, Debug)]
#[command(name = "ose", author, version, about, long_about = None)]
pub struct Cli {
    /// Print debug output, including every ffmpeg invocation
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile the dated clips into one video (default)
    Compile(CompileArgs),
    /// List recognized date directories and the range they cover
    Dates(DatesArgs),
    /// Show stream metadata and normalization checks for a media file
    Probe(ProbeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    /// Directory holding the dated folders; defaults to the current directory
    #[arg(short = 'C', long = "dir", value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Configuration file; defaults to ./ose.toml, then the user config
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Reuse normalized clips that already match the output profile
    #[arg(long, conflicts_with = "no_reuse")]
    pub reuse: bool,

    /// Rebuild every clip even if the config enables reuse
    #[arg(long)]
    pub no_reuse: bool,

    /// Stream ffmpeg's own output to the terminal
    #[arg(short, long)]
    pub verbose: bool,
}

impl CompileArgs {
    /// Command line flags win over the config file.
    pub fn reuse_override(&self) -> Option<bool> {
        match (self.reuse, self.no_reuse) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DatesArgs {
    /// Directory holding the dated folders; defaults to the current directory
    #[arg(short = 'C', long = "dir", value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Configuration file used to find the clip name
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_default_compile() {
        let cli = Cli::try_parse_from(["ose"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn reuse_flags_override_config() {
        let cli = Cli::try_parse_from(["ose", "compile", "--reuse"]).unwrap();
        let Some(Commands::Compile(args)) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(args.reuse_override(), Some(true));

        let cli = Cli::try_parse_from(["ose", "compile", "--no-reuse", "-C", "/clips"]).unwrap();
        let Some(Commands::Compile(args)) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(args.reuse_override(), Some(false));
        assert_eq!(args.dir, Some(PathBuf::from("/clips")));

        assert!(Cli::try_parse_from(["ose", "compile", "--reuse", "--no-reuse"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["ose", "dates", "--json"]).unwrap();
        assert!(cli.json);
    }
}
