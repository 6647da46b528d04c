use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mindjungle")]
#[command(version, about = "A note editor for ideas, outlines and paper drafts")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new mindjungle notebook in the current directory
    Init,

    /// Create a new note
    New {
        /// Note type (idea, outline, paper)
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Note title (defaults to "New Idea", "New Outline" or "New Paper Draft")
        title: Option<String>,

        /// Tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Authors (can be specified multiple times)
        #[arg(long = "author", short = 'a')]
        authors: Vec<String>,

        /// Publication year
        #[arg(long)]
        year: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes, most recently updated first
    List {
        /// Only notes of this type
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Search query; supports type:, status:, tag: and created:>/< filters
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Show {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit fields of a note
    Edit {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,

        #[arg(long)]
        title: Option<String>,

        /// Note type (idea, outline, paper)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Status (draft, in-progress, final)
        #[arg(long)]
        status: Option<String>,

        /// Comma separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,

        /// Comma separated authors, replacing the current ones
        #[arg(long)]
        authors: Option<String>,

        /// Publication year (empty to clear)
        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        outline: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        references: Option<String>,

        /// Read the value of FIELD from stdin
        #[arg(long, value_name = "FIELD")]
        stdin: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show outgoing links and backlinks of a note
    Links {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a note's content with wikilinks rendered as references
    Render {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,
    },

    /// Export a single note
    Export {
        /// Note reference (UUID prefix like "a1b2c" or title)
        reference: String,

        /// Export format (markdown, apa, json); defaults to the configured one
        #[arg(long)]
        format: Option<String>,

        /// Output file (defaults to a name derived from the title)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Export every note into a directory
    ExportAll {
        /// Target directory
        dir: PathBuf,

        /// Export format (markdown, apa, json); defaults to the configured one
        #[arg(long)]
        format: Option<String>,
    },

    /// Show word, note, tag and backlink counts
    Stats {
        /// Note reference; without it, counts cover the whole notebook
        reference: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new_with_repeated_flags() {
        let cli = Cli::parse_from([
            "mindjungle", "new", "paper", "Draft", "-t", "a", "-t", "b", "--author", "Ada",
        ]);
        match cli.command {
            Commands::New {
                kind, title, tags, authors, ..
            } => {
                assert_eq!(kind, "paper");
                assert_eq!(title.as_deref(), Some("Draft"));
                assert_eq!(tags, vec!["a", "b"]);
                assert_eq!(authors, vec!["Ada"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_all() {
        let cli = Cli::parse_from(["mindjungle", "export-all", "out", "--format", "apa"]);
        assert!(matches!(
            cli.command,
            Commands::ExportAll { format: Some(ref f), .. } if f == "apa"
        ));
    }
}
